//! Static capability descriptors for processors.
//!
//! A descriptor is declared once per processor type (usually as a `static`)
//! and checked against the owning source when the tree is built, so a
//! processor that cannot handle a source's shape or element type is rejected
//! before any value is resolved.

use crate::value::{Shape, TypeSet, ValueType};
use std::fmt;

/// Whether a processor's return value replaces the running value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    /// Returns nothing; failure is reported as an error.
    Validation,
    /// Returns the new running value.
    Transformation,
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorKind::Validation => f.write_str("validation"),
            ProcessorKind::Transformation => f.write_str("transformation"),
        }
    }
}

/// How a processor treats values of one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    Unsupported,
    /// The processor receives the value as a whole. The set constrains the
    /// innermost element types.
    Whole(TypeSet),
    /// The processor is applied to each innermost element individually.
    Each(TypeSet),
}

impl Handling {
    pub fn types(&self) -> Option<TypeSet> {
        match self {
            Handling::Unsupported => None,
            Handling::Whole(types) | Handling::Each(types) => Some(*types),
        }
    }

    pub fn accepts(&self, ty: Option<ValueType>) -> bool {
        match (self.types(), ty) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(types), Some(ty)) => types.contains(ty),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub kind: ProcessorKind,
    pub scalar: Handling,
    pub flat: Handling,
    pub nested: Handling,
    /// Whether the processor runs when no value was supplied. An explicit
    /// `Value::Null` is not an absence: it reaches every processor whole,
    /// without shape or type checks, and the hook decides what it means.
    pub accepts_missing: bool,
    pub supports_tags: bool,
    /// Element type a transformation produces, when it differs from its input.
    pub produces: Option<ValueType>,
}

impl Capabilities {
    const fn base(kind: ProcessorKind) -> Self {
        Self {
            kind,
            scalar: Handling::Unsupported,
            flat: Handling::Unsupported,
            nested: Handling::Unsupported,
            accepts_missing: false,
            supports_tags: false,
            produces: None,
        }
    }

    pub const fn validator() -> Self {
        Self::base(ProcessorKind::Validation)
    }

    pub const fn transformer() -> Self {
        Self::base(ProcessorKind::Transformation)
    }

    pub const fn scalar(self, handling: Handling) -> Self {
        Self {
            scalar: handling,
            ..self
        }
    }

    pub const fn flat(self, handling: Handling) -> Self {
        Self {
            flat: handling,
            ..self
        }
    }

    pub const fn nested(self, handling: Handling) -> Self {
        Self {
            nested: handling,
            ..self
        }
    }

    /// Scalars of `types`, and every element of flat or nested sequences of them.
    pub const fn each(self, types: TypeSet) -> Self {
        self.scalar(Handling::Whole(types))
            .flat(Handling::Each(types))
            .nested(Handling::Each(types))
    }

    /// Any shape, received whole.
    pub const fn whole(self, types: TypeSet) -> Self {
        self.scalar(Handling::Whole(types))
            .flat(Handling::Whole(types))
            .nested(Handling::Whole(types))
    }

    pub const fn with_missing(self) -> Self {
        Self {
            accepts_missing: true,
            ..self
        }
    }

    pub const fn with_tags(self) -> Self {
        Self {
            supports_tags: true,
            ..self
        }
    }

    pub const fn produces(self, ty: ValueType) -> Self {
        Self {
            produces: Some(ty),
            ..self
        }
    }

    pub fn handling(&self, shape: Shape) -> Handling {
        match shape {
            Shape::Scalar => self.scalar,
            Shape::Flat => self.flat,
            Shape::Nested => self.nested,
        }
    }

    /// Checks a chain position. `ty` is the element type flowing into it.
    pub fn check(&self, shape: Shape, ty: Option<ValueType>) -> Result<(), CapabilityMismatch> {
        let handling = self.handling(shape);
        if handling.accepts(ty) {
            Ok(())
        } else {
            Err(CapabilityMismatch {
                shape,
                found: ty,
                expected: handling.types().unwrap_or(TypeSet::EMPTY),
            })
        }
    }

    /// The element type after this processor ran on `ty`.
    pub fn output_type(&self, ty: Option<ValueType>) -> Option<ValueType> {
        match self.kind {
            ProcessorKind::Transformation => self.produces.or(ty),
            ProcessorKind::Validation => ty,
        }
    }
}

/// Why a processor cannot sit at a chain position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMismatch {
    pub shape: Shape,
    pub found: Option<ValueType>,
    pub expected: TypeSet,
}

impl fmt::Display for CapabilityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.found {
            Some(ty) if self.expected != TypeSet::EMPTY => write!(
                f,
                "{} of {} is not accepted (expects {})",
                self.shape, ty, self.expected
            ),
            _ => write!(f, "{} values are not supported", self.shape),
        }
    }
}
