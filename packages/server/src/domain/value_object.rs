//! Value objects for the session domain.

use std::fmt;

use rand::Rng;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a chat message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Opaque identifier of a connected participant.
///
/// Assigned by the transport when the connection is accepted and stable for
/// the lifetime of that connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::ParticipantIdEmpty);
        }
        Ok(Self(value))
    }

    /// Generate a fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generated label shown next to a participant's actions. Not unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `User_<n>` with `n` drawn from `0..1000`.
    pub fn generate() -> Self {
        let n: u16 = rand::rng().random_range(0..1000);
        Self(format!("User_{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// CSS color assigned to a participant at connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fully saturated HSL color for the given hue (degrees).
    pub fn from_hue(hue: f64) -> Self {
        Self(format!("hsl({:.0}, 100%, 60%)", hue.rem_euclid(360.0)))
    }

    /// Color with a hue sampled uniformly from `[0, 360)`.
    pub fn random() -> Self {
        Self::from_hue(rand::rng().random_range(0.0..360.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `self` to `later`.
    pub fn millis_until(&self, later: Timestamp) -> i64 {
        later.0 - self.0
    }
}

/// Validated chat message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageContentEmpty);
        }
        let length = value.chars().count();
        if length > MAX_MESSAGE_LENGTH {
            return Err(ValueObjectError::MessageContentTooLong {
                actual: length,
                max: MAX_MESSAGE_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
