//! Remove command for deleting events.

use std::io::Write;

use anyhow::{Context, Result};
use dp_db::Database;

use super::util::parse_event_id;

pub fn run<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = parse_event_id(id)?;
    let deleted = db.delete_event(&id).context("failed to delete event")?;
    if !deleted {
        anyhow::bail!("event not found: {id}");
    }
    tracing::info!(event_id = %id, "event deleted");
    writeln!(writer, "Event deleted successfully")?;
    Ok(())
}
