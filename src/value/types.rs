use serde::{Deserialize, Serialize};
use std::fmt;

/// Element types a source can declare and a processor can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    Path,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::Bool,
        ValueType::Int,
        ValueType::Float,
        ValueType::Str,
        ValueType::Path,
    ];

    const fn bit(self) -> u8 {
        match self {
            ValueType::Bool => 1,
            ValueType::Int => 1 << 1,
            ValueType::Float => 1 << 2,
            ValueType::Str => 1 << 3,
            ValueType::Path => 1 << 4,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
            ValueType::Path => "path",
        };
        f.write_str(name)
    }
}

/// A set of `ValueType`s, usable in `const` capability descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);
    pub const ANY: TypeSet = TypeSet(0b1_1111);
    pub const BOOL: TypeSet = TypeSet::of(ValueType::Bool);
    pub const INT: TypeSet = TypeSet::of(ValueType::Int);
    pub const FLOAT: TypeSet = TypeSet::of(ValueType::Float);
    pub const STR: TypeSet = TypeSet::of(ValueType::Str);
    pub const PATH: TypeSet = TypeSet::of(ValueType::Path);
    pub const NUMERIC: TypeSet = TypeSet::INT.union(TypeSet::FLOAT);

    pub const fn of(ty: ValueType) -> Self {
        TypeSet(ty.bit())
    }

    pub const fn union(self, other: TypeSet) -> Self {
        TypeSet(self.0 | other.0)
    }

    pub const fn contains(self, ty: ValueType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_any(self) -> bool {
        self.0 == TypeSet::ANY.0
    }

    pub fn iter(self) -> impl Iterator<Item = ValueType> {
        ValueType::ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("any");
        }
        if *self == TypeSet::EMPTY {
            return f.write_str("nothing");
        }
        let names = itertools::join(self.iter(), " | ");
        f.write_str(&names)
    }
}

impl From<ValueType> for TypeSet {
    fn from(ty: ValueType) -> Self {
        TypeSet::of(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_covers_int_and_float_only() {
        assert!(TypeSet::NUMERIC.contains(ValueType::Int));
        assert!(TypeSet::NUMERIC.contains(ValueType::Float));
        assert!(!TypeSet::NUMERIC.contains(ValueType::Str));
        assert_eq!(TypeSet::NUMERIC.to_string(), "int | float");
        assert_eq!(TypeSet::ANY.to_string(), "any");
    }
}
