//! Error types

use crate::binary::read::ReadEof;
use crate::byte_order::ByteOrder;
use crate::layout::FieldCode;
use std::fmt;

/// Errors that originate when unpacking binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    /// The buffer is shorter than the format requires.
    InsufficientData {
        requested: usize,
        actual: usize,
        layout: String,
    },
    /// Bytes were present but could not be decoded.
    InvalidEncoding,
    /// The field cannot be decoded with the resolved byte order.
    UnsupportedByteOrder { code: FieldCode, order: ByteOrder },
    /// Decoded values could not be extracted as the requested number of values.
    UnexpectedArity { expected: usize, actual: usize },
    /// A decoded value could not be extracted as the requested type.
    UnexpectedValue {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::InvalidEncoding
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InsufficientData {
                requested,
                actual,
                layout,
            } => write!(
                f,
                "insufficient data: format '{}' requires {} bytes, got {}",
                layout, requested, actual
            ),
            ParseError::InvalidEncoding => write!(f, "invalid encoding"),
            ParseError::UnsupportedByteOrder { code, order } => {
                write!(f, "field '{}' does not support byte order {}", code, order)
            }
            ParseError::UnexpectedArity { expected, actual } => {
                write!(f, "expected {} decoded values, got {}", expected, actual)
            }
            ParseError::UnexpectedValue {
                index,
                expected,
                found,
            } => write!(f, "value {}: expected {}, got {}", index, expected, found),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors that originate when packing values
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum WriteError {
    /// The number of values does not match the number of fields.
    ArityMismatch { expected: usize, actual: usize },
    /// A value is of the wrong kind for its field.
    TypeMismatch {
        index: usize,
        expected: FieldCode,
        found: &'static str,
    },
    /// An integer value does not fit in its field.
    ValueOutOfRange { index: usize },
    /// The field cannot be encoded with the resolved byte order.
    UnsupportedByteOrder { code: FieldCode, order: ByteOrder },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::ArityMismatch { expected, actual } => {
                write!(f, "expected {} values, got {}", expected, actual)
            }
            WriteError::TypeMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "value {}: expected a value for field '{}', got {}",
                index, expected, found
            ),
            WriteError::ValueOutOfRange { index } => {
                write!(f, "value {}: out of range for its field", index)
            }
            WriteError::UnsupportedByteOrder { code, order } => {
                write!(f, "field '{}' does not support byte order {}", code, order)
            }
        }
    }
}

impl std::error::Error for WriteError {}

/// Error returned when parsing an unrecognised byte order name
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct InvalidByteOrder(pub String);

impl fmt::Display for InvalidByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid byte order '{}'", self.0)
    }
}

impl std::error::Error for InvalidByteOrder {}

/// Enum that can hold read (`ParseError`), write and byte order errors
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ReadWriteError {
    Read(ParseError),
    Write(WriteError),
    ByteOrder(InvalidByteOrder),
}

impl From<ParseError> for ReadWriteError {
    fn from(error: ParseError) -> Self {
        ReadWriteError::Read(error)
    }
}

impl From<WriteError> for ReadWriteError {
    fn from(error: WriteError) -> Self {
        ReadWriteError::Write(error)
    }
}

impl From<InvalidByteOrder> for ReadWriteError {
    fn from(error: InvalidByteOrder) -> Self {
        ReadWriteError::ByteOrder(error)
    }
}

impl fmt::Display for ReadWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadWriteError::Read(err) => write!(f, "read error: {}", err),
            ReadWriteError::Write(err) => write!(f, "write error: {}", err),
            ReadWriteError::ByteOrder(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ReadWriteError {}
