use crate::capability::Capabilities;
use crate::context::Context;
use crate::error::ProcessError;
use crate::node::{ProcessResult, Processor};
use crate::step::Step;
use crate::value::{TypeSet, Value};

/// Fails on zero or negative numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsPositive;

impl Processor for IsPositive {
    fn name(&self) -> &str {
        "is_positive"
    }

    fn capabilities(&self) -> &Capabilities {
        static CAPS: Capabilities = Capabilities::validator().each(TypeSet::NUMERIC);
        &CAPS
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        let positive = match value {
            Value::Int(n) => *n > 0,
            Value::Float(n) => *n > 0.0,
            _ => false,
        };
        Step::ready(if positive {
            Ok(None)
        } else {
            Err(ProcessError::new(format!("{} is not positive", value)))
        })
    }
}

static LENGTH: Capabilities = Capabilities::validator().each(TypeSet::STR);

#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Processor for MinLength {
    fn name(&self) -> &str {
        "min_length"
    }

    fn capabilities(&self) -> &Capabilities {
        &LENGTH
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        let len = value.as_str().map_or(0, |s| s.chars().count());
        Step::ready(if len >= self.0 {
            Ok(None)
        } else {
            Err(ProcessError::new(format!(
                "{} is shorter than {} characters",
                value, self.0
            )))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Processor for MaxLength {
    fn name(&self) -> &str {
        "max_length"
    }

    fn capabilities(&self) -> &Capabilities {
        &LENGTH
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        let len = value.as_str().map_or(0, |s| s.chars().count());
        Step::ready(if len <= self.0 {
            Ok(None)
        } else {
            Err(ProcessError::new(format!(
                "{} is longer than {} characters",
                value, self.0
            )))
        })
    }
}

/// Fails unless the value is one of the given choices.
#[derive(Debug, Clone)]
pub struct Choice(pub Vec<Value>);

impl Choice {
    pub fn new<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self(choices.into_iter().map(Into::into).collect())
    }
}

impl Processor for Choice {
    fn name(&self) -> &str {
        "choice"
    }

    fn capabilities(&self) -> &Capabilities {
        static CAPS: Capabilities = Capabilities::validator().each(TypeSet::ANY);
        &CAPS
    }

    fn process<'a>(&'a self, value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        if self.0.contains(value) {
            return Step::ready(Ok(None));
        }
        let options = itertools::join(self.0.iter(), ", ");
        Step::ready(Err(ProcessError::new(format!(
            "{} is not one of {}",
            value, options
        ))))
    }
}
