//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The provided value exceeded its length limit.
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// The color was not a `#RRGGBB` hex string.
    #[error("invalid color format: {value} (expected #RRGGBB)")]
    InvalidColor { value: String },

    /// A timed event was given no start time.
    #[error("timed events require a start time")]
    MissingStart,

    /// An instant outside the years 1 to 9999.
    #[error("{value} is outside the supported range (years 1 to 9999)")]
    OutOfRange { value: NaiveDateTime },

    /// The end time does not come after the start time.
    #[error("end time {end} must be after start time {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated event identifier.
    ///
    /// Event IDs must be non-empty strings. The store generates them as UUIDs and
    /// enforces uniqueness; overlap detection relies on that uniqueness to
    /// exclude an event from its own conflict list.
    EventId, "event ID"
);

/// A display color in `#RRGGBB` form.
///
/// Colors are passed through to layout output untouched; they never influence
/// overlap or layout math.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// The color applied when none is given (`#1976d2`, blue).
    pub const DEFAULT_HEX: &'static str = "#1976d2";

    /// Creates a color after checking the `#RRGGBB` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let bytes = value.as_bytes();
        let valid = bytes.len() == 7
            && bytes[0] == b'#'
            && bytes[1..].iter().all(u8::is_ascii_hexdigit);
        if !valid {
            return Err(ValidationError::InvalidColor { value });
        }
        Ok(Self(value))
    }

    /// Returns the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The palette offered when picking an event color.
    pub fn palette() -> [&'static str; 10] {
        [
            "#1976d2", "#388e3c", "#f57c00", "#d32f2f", "#7b1fa2", "#0288d1", "#689f38",
            "#f9a825", "#c2185b", "#5d4037",
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::DEFAULT_HEX.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl std::str::FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
