use serde::{Deserialize, Serialize};
use std::fmt;

/// Compile-time constant stored in a chunk's constant pool.
///
/// The runtime object model lives with the execution engine; the compiler
/// only ever produces values of these shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer
    Int(i64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
        }
    }
}
