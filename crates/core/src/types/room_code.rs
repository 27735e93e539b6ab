//! Room join-code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Length of every room code.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Errors that can occur when parsing a [`RoomCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum RoomCodeError {
    /// The input string is empty.
    #[error("room code cannot be empty")]
    Empty,
    /// The input is not exactly [`ROOM_CODE_LENGTH`] characters.
    #[error("room code must be exactly {expected} characters")]
    WrongLength {
        /// Required length.
        expected: usize,
    },
    /// The input contains a character outside `A-Z0-9`.
    #[error("room code may only contain uppercase letters and digits")]
    InvalidCharacter,
}

/// A six-character room join code, e.g. `WKND12`.
///
/// Codes are uppercase alphanumeric so they survive being read aloud or
/// typed from a shared screenshot. Parsing uppercases lowercase input
/// rather than rejecting it.
///
/// ```
/// use shopsync_core::RoomCode;
///
/// assert!(RoomCode::parse("WKND12").is_ok());
/// assert_eq!(RoomCode::parse("wknd12").unwrap().as_str(), "WKND12");
/// assert!(RoomCode::parse("too-long-code").is_err());
/// assert!(RoomCode::parse("AB CD1").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Parse and normalize a room code.
    ///
    /// # Errors
    ///
    /// Returns a [`RoomCodeError`] if the input is empty, has the wrong
    /// length, or contains characters outside `A-Z0-9`.
    pub fn parse(input: &str) -> Result<Self, RoomCodeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RoomCodeError::Empty);
        }
        if trimmed.len() != ROOM_CODE_LENGTH {
            return Err(RoomCodeError::WrongLength {
                expected: ROOM_CODE_LENGTH,
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RoomCodeError::InvalidCharacter);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The normalized code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RoomCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RoomCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RoomCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_codes() {
        assert!(RoomCode::parse("WKND12").is_ok());
        assert!(RoomCode::parse("A1B2C3").is_ok());
        assert!(RoomCode::parse("000000").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let code = RoomCode::parse("  wed456 ").unwrap();
        assert_eq!(code.as_str(), "WED456");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(RoomCode::parse("   "), Err(RoomCodeError::Empty)));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            RoomCode::parse("ABC"),
            Err(RoomCodeError::WrongLength { expected: 6 })
        ));
        assert!(matches!(
            RoomCode::parse("ABCDEFG"),
            Err(RoomCodeError::WrongLength { expected: 6 })
        ));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert!(matches!(
            RoomCode::parse("AB-CD1"),
            Err(RoomCodeError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = RoomCode::parse("WKND12").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"WKND12\"");
        let parsed: RoomCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }
}
