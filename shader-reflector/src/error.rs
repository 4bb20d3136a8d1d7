use crate::ir::{TypeDescriptor, TypeId};
use std::sync::Arc;

pub type ReflectorResult<T> = Result<T, ReflectorError>;

/// Generic error that contains all the different kinds of errors that may occur during a reflection
/// pass. Any of these aborts the pass, no partial document is produced.
#[derive(Debug, Clone)]
pub enum ReflectorError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    JsonError(Arc<serde_json::Error>),
    /// A shader module must have exactly one entry point
    IncorrectEntryPointCount(usize),
    /// A type id was referenced that the frontend's type table does not contain
    UnknownType(TypeId),
    /// Following type aliases from this type never reached a canonical type
    CyclicTypeAlias(TypeId),
    /// The declared size of a type does not fit in memory
    TypeSizeOverflow(TypeDescriptor),
}

impl std::error::Error for ReflectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            ReflectorError::StringError(_) => None,
            ReflectorError::IoError(ref e) => Some(&**e),
            ReflectorError::JsonError(ref e) => Some(&**e),
            ReflectorError::IncorrectEntryPointCount(_) => None,
            ReflectorError::UnknownType(_) => None,
            ReflectorError::CyclicTypeAlias(_) => None,
            ReflectorError::TypeSizeOverflow(_) => None,
        }
    }
}

impl core::fmt::Display for ReflectorError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            ReflectorError::StringError(ref e) => e.fmt(fmt),
            ReflectorError::IoError(ref e) => e.fmt(fmt),
            ReflectorError::JsonError(ref e) => e.fmt(fmt),
            ReflectorError::IncorrectEntryPointCount(count) => write!(
                fmt,
                "Incorrect number of entrypoints in the shader. Found {} but expected 1.",
                count
            ),
            ReflectorError::UnknownType(type_id) => {
                write!(fmt, "Type {} is not present in the type table", type_id)
            }
            ReflectorError::CyclicTypeAlias(type_id) => {
                write!(fmt, "Type alias chain starting at type {} is cyclic", type_id)
            }
            ReflectorError::TypeSizeOverflow(ref descriptor) => {
                write!(fmt, "Declared size of type {:?} overflows", descriptor)
            }
        }
    }
}

impl From<&str> for ReflectorError {
    fn from(str: &str) -> Self {
        ReflectorError::StringError(str.to_string())
    }
}

impl From<String> for ReflectorError {
    fn from(string: String) -> Self {
        ReflectorError::StringError(string)
    }
}

impl From<std::io::Error> for ReflectorError {
    fn from(error: std::io::Error) -> Self {
        ReflectorError::IoError(Arc::new(error))
    }
}

impl From<serde_json::Error> for ReflectorError {
    fn from(error: serde_json::Error) -> Self {
        ReflectorError::JsonError(Arc::new(error))
    }
}
