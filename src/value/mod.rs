use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

mod shape;
mod types;

pub use shape::*;
pub use types::*;

/// Runtime value types flowing through a processing chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value was supplied. Distinct from an explicit `Null`.
    Missing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// The element type of a scalar value. Sequences, `Null` and `Missing` have none.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Str(_) => Some(ValueType::Str),
            Value::Path(_) => Some(ValueType::Path),
            Value::Missing | Value::Null | Value::List(_) => None,
        }
    }

    /// The element type of the innermost scalars, if they all agree.
    pub fn element_type(&self) -> Option<ValueType> {
        match self {
            Value::List(items) => {
                let mut found = None;
                for item in items {
                    let ty = item.element_type()?;
                    match found {
                        None => found = Some(ty),
                        Some(prev) if prev == ty => {}
                        Some(_) => return None,
                    }
                }
                found
            }
            other => other.value_type(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts a raw scalar into `target`, element-wise for sequences.
    ///
    /// Strings are parsed (environment variables and JSON inputs arrive as text);
    /// values already of the target type are returned unchanged.
    pub fn coerce(self, target: ValueType) -> Result<Value, String> {
        match (self, target) {
            (Value::List(items), _) => items
                .into_iter()
                .map(|item| item.coerce(target))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (v @ (Value::Missing | Value::Null), _) => Ok(v),
            (Value::Str(s), ValueType::Int) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("'{}' is not a valid integer", s)),
            (Value::Str(s), ValueType::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("'{}' is not a valid number", s)),
            (Value::Str(s), ValueType::Bool) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Value::Bool(true)),
                "0" | "false" | "no" | "off" | "" => Ok(Value::Bool(false)),
                _ => Err(format!("'{}' is not a valid boolean", s)),
            },
            (Value::Str(s), ValueType::Path) => Ok(Value::Path(PathBuf::from(s))),
            (Value::Int(n), ValueType::Float) => Ok(Value::Float(n as f64)),
            (Value::Int(n), ValueType::Str) => Ok(Value::Str(n.to_string())),
            (Value::Float(n), ValueType::Str) => Ok(Value::Str(n.to_string())),
            (Value::Bool(b), ValueType::Str) => Ok(Value::Str(b.to_string())),
            (Value::Path(p), ValueType::Str) => Ok(Value::Str(p.display().to_string())),
            (v, ty) if v.value_type() == Some(ty) => Ok(v),
            (v, ty) => Err(format!("cannot convert {} to {}", v, ty)),
        }
    }

    /// Converts a JSON document into a `Value`.
    ///
    /// Objects have no counterpart and are kept as their JSON text.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Str(obj.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "<missing>"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<PathBuf> for Value {
    fn from(v: PathBuf) -> Self {
        Value::Path(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_requires_agreement() {
        let flat = Value::from(vec!["a", "b"]);
        assert_eq!(flat.element_type(), Some(ValueType::Str));

        let mixed = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(mixed.element_type(), None);
    }

    #[test]
    fn coerce_parses_strings_element_wise() {
        let raw = Value::from(vec!["1", " 2 "]);
        assert_eq!(
            raw.coerce(ValueType::Int),
            Ok(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
        assert!(Value::from("nope").coerce(ValueType::Int).is_err());
        assert_eq!(Value::Missing.coerce(ValueType::Int), Ok(Value::Missing));
    }
}
