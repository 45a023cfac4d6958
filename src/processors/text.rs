use crate::capability::Capabilities;
use crate::context::Context;
use crate::error::ProcessError;
use crate::node::{ProcessResult, Processor};
use crate::step::Step;
use crate::value::{TypeSet, Value, ValueType};
use std::path::PathBuf;

/// Defines element-wise string transformers from a name and a mapping function.
macro_rules! define_string_transformers {
    ( $( ($struct_name:ident, $name:expr, $map:expr) ),* $(,)? ) => {
        $(
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $struct_name;

            impl Processor for $struct_name {
                fn name(&self) -> &str { $name }

                fn capabilities(&self) -> &Capabilities {
                    static CAPS: Capabilities = Capabilities::transformer().each(TypeSet::STR);
                    &CAPS
                }

                fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
                    let map: fn(&str) -> String = $map;
                    Step::ready(match value {
                        Value::Str(s) => Ok(Some(Value::Str(map(s)))),
                        other => Err(ProcessError::new(format!("expected a string, got {}", other))),
                    })
                }
            }
        )*
    };
}

define_string_transformers! {
    (ToUppercase, "to_uppercase", |s| s.to_uppercase()),
    (ToLowercase, "to_lowercase", |s| s.to_lowercase()),
    (Strip, "strip", |s| s.trim().to_string()),
}

static AFFIX: Capabilities = Capabilities::transformer().each(TypeSet::STR);

#[derive(Debug, Clone)]
pub struct AddPrefix(pub String);

impl AddPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl Processor for AddPrefix {
    fn name(&self) -> &str {
        "add_prefix"
    }

    fn capabilities(&self) -> &Capabilities {
        &AFFIX
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        Step::ready(match value {
            Value::Str(s) if s.starts_with(&self.0) => Ok(None),
            Value::Str(s) => Ok(Some(Value::Str(format!("{}{}", self.0, s)))),
            other => Err(ProcessError::new(format!("expected a string, got {}", other))),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AddSuffix(pub String);

impl AddSuffix {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self(suffix.into())
    }
}

impl Processor for AddSuffix {
    fn name(&self) -> &str {
        "add_suffix"
    }

    fn capabilities(&self) -> &Capabilities {
        &AFFIX
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        Step::ready(match value {
            Value::Str(s) if s.ends_with(&self.0) => Ok(None),
            Value::Str(s) => Ok(Some(Value::Str(format!("{}{}", s, self.0)))),
            other => Err(ProcessError::new(format!("expected a string, got {}", other))),
        })
    }
}

/// Converts strings to paths, optionally requiring that they exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsPath {
    must_exist: bool,
}

impl AsPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn existing() -> Self {
        Self { must_exist: true }
    }
}

impl Processor for AsPath {
    fn name(&self) -> &str {
        "as_path"
    }

    fn capabilities(&self) -> &Capabilities {
        static CAPS: Capabilities = Capabilities::transformer()
            .each(TypeSet::STR.union(TypeSet::PATH))
            .produces(ValueType::Path);
        &CAPS
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        let path = match value {
            Value::Str(s) => PathBuf::from(s),
            Value::Path(p) => p.clone(),
            other => {
                return Step::ready(Err(ProcessError::new(format!(
                    "expected a path, got {}",
                    other
                ))));
            }
        };
        if self.must_exist && !path.exists() {
            return Step::ready(Err(ProcessError::new(format!(
                "path '{}' does not exist",
                path.display()
            ))));
        }
        Step::ready(Ok(Some(Value::Path(path))))
    }
}
