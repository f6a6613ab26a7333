//! RPC parameter values

use std::fmt;

use crate::error::{Error, Result};

/// A single RPC value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RpcValue {
    /// Empty result
    #[default]
    Void,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<RpcValue>),
}

impl RpcValue {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Borrow the string value
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(Error::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    /// Get the boolean value
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Boolean(b) => Ok(*b),
            other => Err(Error::TypeMismatch {
                expected: "boolean",
                actual: other.type_name(),
            }),
        }
    }

    /// Get the integer value
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Self::Integer(i) => Ok(*i),
            other => Err(Error::TypeMismatch {
                expected: "integer",
                actual: other.type_name(),
            }),
        }
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<RpcValue>> for RpcValue {
    fn from(value: Vec<RpcValue>) -> Self {
        Self::Array(value)
    }
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("(void)"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "\"{}\"", s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}
