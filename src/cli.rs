//! Registers a tree's sources with `clap` and reads raw values back.
//!
//! Parsing, help and usage stay with `clap`. Requiredness is not declared to
//! `clap`, so missing values surface as `ResolveError::MissingValue` like
//! they do for every other provider.

use crate::arguments::CallArgs;
use crate::command::Command;
use crate::error::PipelineError;
use crate::node::{SourceKind, SourceNode};
use crate::tree::Tree;
use crate::value::{Shape, Value, ValueType};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Bridges a `Tree` and a `clap::Command`.
#[derive(Debug, Clone, Copy)]
pub struct ClapAdapter<'a> {
    tree: &'a Tree,
}

impl<'a> ClapAdapter<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    /// A `clap::Command` with one argument per positional or option source.
    /// Environment sources are read by the engine itself.
    pub fn command(&self) -> clap::Command {
        self.tree
            .sources()
            .iter()
            .filter_map(Self::arg_for)
            .fold(clap::Command::new(self.tree.name().to_string()), |cmd, arg| {
                cmd.arg(arg)
            })
    }

    fn arg_for(source: &SourceNode) -> Option<Arg> {
        let mut arg = Arg::new(source.name().to_string());
        match source.kind() {
            SourceKind::Env { .. } => return None,
            SourceKind::Argument => {}
            SourceKind::Option { long, short } => {
                arg = arg.long(long.trim_start_matches("--").to_string());
                if let Some(short) = short {
                    arg = arg.short(*short);
                }
            }
        }
        if let Some(help) = source.help_text() {
            arg = arg.help(help.to_string());
        }

        if source.is_flag() {
            return Some(arg.action(ArgAction::SetTrue));
        }

        arg = match source.element_type() {
            ValueType::Bool => arg.value_parser(value_parser!(bool)),
            ValueType::Int => arg.value_parser(value_parser!(i64)),
            ValueType::Float => arg.value_parser(value_parser!(f64)),
            ValueType::Str => arg.value_parser(value_parser!(String)),
            ValueType::Path => arg.value_parser(value_parser!(PathBuf)),
        };

        let (nargs, multiple) = source.arity();
        let positional = matches!(source.kind(), SourceKind::Argument);
        arg = match (multiple, nargs) {
            (true, 1) if positional => arg.num_args(1..).action(ArgAction::Append),
            (true, n) => arg.num_args(n).action(ArgAction::Append),
            (false, n) => arg.num_args(n).action(ArgAction::Set),
        };
        Some(arg)
    }

    /// Raw values for every source given on the command line. Values `clap`
    /// filled from defaults are left out so sources apply their own.
    pub fn call_args(&self, matches: &ArgMatches) -> CallArgs {
        let mut call = CallArgs::new();
        for source in self.tree.sources() {
            if matches!(source.kind(), SourceKind::Env { .. }) {
                continue;
            }
            let id = source.name();
            if matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let shape = source.shape();
            let value = if source.is_flag() {
                extract::<bool>(matches, id, Shape::Scalar)
            } else {
                match source.element_type() {
                    ValueType::Bool => extract::<bool>(matches, id, shape),
                    ValueType::Int => extract::<i64>(matches, id, shape),
                    ValueType::Float => extract::<f64>(matches, id, shape),
                    ValueType::Str => extract::<String>(matches, id, shape),
                    ValueType::Path => extract::<PathBuf>(matches, id, shape),
                }
            };
            if let Some(value) = value {
                call.set(id, value);
            }
        }
        call
    }

    /// Parses `args` (including the binary name) into raw values.
    pub fn try_parse_from<I, S>(&self, args: I) -> Result<CallArgs, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let matches = self.command().try_get_matches_from(args)?;
        Ok(self.call_args(&matches))
    }
}

fn extract<T>(matches: &ArgMatches, id: &str, shape: Shape) -> Option<Value>
where
    T: Clone + Send + Sync + 'static + Into<Value>,
{
    let list = |items: clap::parser::ValuesRef<'_, T>| {
        Value::List(items.cloned().map(Into::into).collect())
    };
    match shape {
        Shape::Scalar => matches.get_one::<T>(id).cloned().map(Into::into),
        Shape::Flat => matches.get_many::<T>(id).map(list),
        Shape::Nested => matches.get_occurrences::<T>(id).map(|groups| {
            Value::List(
                groups
                    .map(|group| Value::List(group.cloned().map(Into::into).collect()))
                    .collect(),
            )
        }),
    }
}

impl<T: Send + 'static> Command<T> {
    pub fn clap_command(&self) -> clap::Command {
        ClapAdapter::new(self.tree()).command()
    }

    /// Parses `args` with `clap` and runs one invocation on them.
    pub fn run_from<I, S>(&mut self, args: I) -> Result<T, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let call = ClapAdapter::new(self.tree())
            .try_parse_from(args)
            .map_err(|e| PipelineError::Usage(e.to_string()))?;
        self.invoke_blocking(call)
    }
}
