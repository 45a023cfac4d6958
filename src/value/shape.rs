use super::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural form of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Scalar,
    /// A sequence of scalars.
    Flat,
    /// A sequence of flat sequences, one per occurrence of a repeated source.
    Nested,
}

impl Shape {
    /// Infers the shape of a runtime value.
    ///
    /// Returns `None` for sequences mixing scalars and sequences, or nesting
    /// deeper than two levels. An empty list is flat.
    pub fn of(value: &Value) -> Option<Shape> {
        let Value::List(items) = value else {
            return Some(Shape::Scalar);
        };
        let groups = items.iter().filter(|v| matches!(v, Value::List(_))).count();
        if groups == 0 {
            return Some(Shape::Flat);
        }
        if groups != items.len() {
            return None;
        }
        let all_flat = items
            .iter()
            .all(|group| Shape::of(group) == Some(Shape::Flat));
        all_flat.then_some(Shape::Nested)
    }

    /// The shape a source takes given its arity settings.
    pub fn from_arity(nargs: usize, multiple: bool) -> Shape {
        match (multiple, nargs) {
            (true, n) if n > 1 => Shape::Nested,
            (true, _) => Shape::Flat,
            (false, 1) => Shape::Scalar,
            (false, _) => Shape::Flat,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Scalar => "scalar",
            Shape::Flat => "flat sequence",
            Shape::Nested => "nested sequence",
        };
        f.write_str(name)
    }
}

/// Position of an element inside a (possibly nested) sequence, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub fn root() -> Self {
        IndexPath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        IndexPath(path)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(v: Vec<usize>) -> Self {
        IndexPath(v)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.0 {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}
