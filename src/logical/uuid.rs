//! The `uuid` logical type on `string` and `fixed(16)`.

use ::uuid::Uuid;

use crate::error::DecodeError;

/// Size of the `fixed` carrying a raw UUID.
pub const UUID_SIZE: usize = 16;

/// Canonical lowercase hyphenated form, 36 characters.
pub fn format_uuid(value: &Uuid) -> String {
    value.hyphenated().to_string()
}

/// Parse the textual form of a UUID.
pub fn parse_uuid(text: &str) -> Result<Uuid, DecodeError> {
    Uuid::parse_str(text)
        .map_err(|e| DecodeError::InvalidData(format!("'{}' is not a UUID: {}", text, e)))
}

/// Read a UUID from its 16 raw bytes.
pub fn uuid_from_bytes(bytes: &[u8]) -> Result<Uuid, DecodeError> {
    Uuid::from_slice(bytes)
        .map_err(|e| DecodeError::InvalidData(format!("invalid UUID bytes: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form() {
        let id = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        let text = format_uuid(&id);
        assert_eq!(text, "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(text.len(), 36);
        assert_eq!(parse_uuid(&text).unwrap(), id);
        assert!(parse_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_raw_bytes() {
        let id = Uuid::from_u128(42);
        assert_eq!(uuid_from_bytes(id.as_bytes()).unwrap(), id);
        assert!(uuid_from_bytes(&[0; 15]).is_err());
    }
}
