use std::fmt;

use crate::position::Coordinate;

/// A resolved binding in the symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Produced by `allocSpace`.
    Empty,
    Number(i64),
    /// Points generated by a `LINE` sweep.
    Line(Vec<Coordinate>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "Empty",
            Value::Number(_) => "Number",
            Value::Line(_) => "Line",
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "empty"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Line(points) => {
                write!(f, "[")?;
                for (idx, point) in points.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{point}")?;
                }
                write!(f, "]")
            }
        }
    }
}
