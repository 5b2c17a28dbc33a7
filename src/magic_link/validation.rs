use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Reason a magic-link token was rejected during decode.
///
/// The numeric codes are part of the client contract: front-ends branch on
/// them to tell an expired link apart from a broken one.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationError {
    #[default]
    #[error("Invalid payload")]
    Invalid,

    #[error("Token expired")]
    Expired,
}

impl ValidationError {
    pub const INVALID_CODE: u16 = 460;
    pub const EXPIRED_CODE: u16 = 461;

    pub fn code(&self) -> u16 {
        match self {
            ValidationError::Invalid => Self::INVALID_CODE,
            ValidationError::Expired => Self::EXPIRED_CODE,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::Invalid => "Invalid payload",
            ValidationError::Expired => "Token expired",
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", self.message())?;
        state.end()
    }
}
