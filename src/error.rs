//! Error types for schema handling, codec building and binary encoding/decoding

use thiserror::Error;

/// Errors that can occur while inspecting a schema graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Structurally invalid schema
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// A `Named` reference with no matching definition
    #[error("Unresolved named type reference: '{0}'")]
    UnresolvedReference(String),
    /// Two definitions share one full name
    #[error("Duplicate definition of named type '{0}'")]
    DuplicateName(String),
}

/// Errors raised while building a schema, a type description or a codec.
///
/// A build either returns a complete routine or one of these; partially built
/// routines are never handed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No case in the chain recognizes the schema shape
    #[error("Unsupported schema: {0}")]
    UnsupportedSchema(String),
    /// The schema is recognized but the target type cannot satisfy it
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// The schema graph itself is invalid
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl BuildError {
    /// True when the failure only says the type does not fit the schema.
    ///
    /// Union branch matching treats these as "no match" rather than as fatal.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, BuildError::UnsupportedType(_))
    }
}

/// Errors that can occur while encoding a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Numeric value does not fit the wire width
    #[error("Overflow: {0}")]
    Overflow(String),
    /// Value cannot be represented by the schema
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// Value handed to a routine is not the type it was built for
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

/// Errors that can occur during decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
    /// Decoded number does not fit the target width
    #[error("Overflow: {0}")]
    Overflow(String),
    /// Decoded value is not the type the routine was built for
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
}

impl DecodeError {
    /// True for truncated or structurally invalid input.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidData(_)
                | DecodeError::UnexpectedEof
                | DecodeError::InvalidVarint
                | DecodeError::InvalidUtf8(_)
        )
    }
}

impl From<std::string::FromUtf8Error> for DecodeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DecodeError::InvalidUtf8(err.to_string())
    }
}

/// A type-erased value was not of the expected concrete type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a value of type `{expected}`")]
pub struct TypeMismatch {
    /// Name of the expected type
    pub expected: &'static str,
}

impl From<TypeMismatch> for EncodeError {
    fn from(err: TypeMismatch) -> Self {
        EncodeError::TypeMismatch(err.to_string())
    }
}

impl From<TypeMismatch> for DecodeError {
    fn from(err: TypeMismatch) -> Self {
        DecodeError::TypeMismatch(err.to_string())
    }
}
