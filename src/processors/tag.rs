use crate::capability::Capabilities;
use crate::context::Context;
use crate::error::ProcessError;
use crate::node::{ProcessResult, Processor};
use crate::step::Step;
use crate::value::Value;

// Tag checks support no value shape, so attaching one to a source fails the
// build.
static TAG_CHECK: Capabilities = Capabilities::validator().with_tags();

fn not_on_sources<'a>(name: &str) -> Step<'a, ProcessResult> {
    Step::ready(Err(ProcessError::new(format!(
        "'{}' only validates tags",
        name
    ))))
}

/// At most one source of the tag may be provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exclusive;

impl Processor for Exclusive {
    fn name(&self) -> &str {
        "exclusive"
    }

    fn capabilities(&self) -> &Capabilities {
        &TAG_CHECK
    }

    fn process<'a>(&'a self, _value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        not_on_sources(self.name())
    }

    fn process_tag<'a>(&'a self, ctx: &'a Context<'a>) -> Step<'a, Result<(), ProcessError>> {
        let provided = ctx.provided_values();
        Step::ready(if provided.len() > 1 {
            Err(ProcessError::new(format!(
                "{} cannot be used together",
                itertools::join(provided.names(), ", ")
            )))
        } else {
            Ok(())
        })
    }
}

/// Either every source of the tag is provided or none is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllOrNone;

impl Processor for AllOrNone {
    fn name(&self) -> &str {
        "all_or_none"
    }

    fn capabilities(&self) -> &Capabilities {
        &TAG_CHECK
    }

    fn process<'a>(&'a self, _value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        not_on_sources(self.name())
    }

    fn process_tag<'a>(&'a self, ctx: &'a Context<'a>) -> Step<'a, Result<(), ProcessError>> {
        let Some(tag) = ctx.tag() else {
            return Step::ready(Ok(()));
        };
        let provided = ctx.provided_values();
        if provided.is_empty() || provided.len() == tag.source_names().len() {
            return Step::ready(Ok(()));
        }
        let missing = tag
            .source_names()
            .iter()
            .filter(|name| !provided.contains(name));
        Step::ready(Err(ProcessError::new(format!(
            "{} requires {}",
            itertools::join(provided.names(), ", "),
            itertools::join(missing, ", ")
        ))))
    }
}

/// At least one source of the tag must be provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastOne;

impl Processor for AtLeastOne {
    fn name(&self) -> &str {
        "at_least_one"
    }

    fn capabilities(&self) -> &Capabilities {
        &TAG_CHECK
    }

    fn process<'a>(&'a self, _value: &'a Value, _ctx: &'a Context<'a>) -> Step<'a, ProcessResult> {
        not_on_sources(self.name())
    }

    fn process_tag<'a>(&'a self, ctx: &'a Context<'a>) -> Step<'a, Result<(), ProcessError>> {
        let Some(tag) = ctx.tag() else {
            return Step::ready(Ok(()));
        };
        Step::ready(if ctx.provided_values().is_empty() {
            Err(ProcessError::new(format!(
                "one of {} is required",
                itertools::join(tag.source_names(), ", ")
            )))
        } else {
            Ok(())
        })
    }
}
