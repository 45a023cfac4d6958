use super::ProcessorNode;
use crate::dispatch;
use crate::error::{PipelineError, ResolveError};
use crate::tree::Tree;
use crate::value::{Shape, Value, ValueType};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Where a source's raw value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A positional value.
    Argument,
    /// A named flag, e.g. `--count` / `-c`.
    Option { long: String, short: Option<char> },
    /// An environment variable.
    Env { var: String },
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Argument => "argument",
            SourceKind::Option { .. } => "option",
            SourceKind::Env { .. } => "env",
        }
    }
}

#[derive(Debug, Default)]
enum Cache {
    #[default]
    Empty,
    Resolving,
    Ready(Value),
}

#[derive(Debug, Default)]
struct SourceState {
    /// A raw value set explicitly, with its `was_provided` flag.
    raw: Option<(Value, bool)>,
    was_provided: bool,
    cache: Cache,
}

/// A node supplying one externally provided value.
///
/// The raw value is resolved lazily and pushed through the owned processor
/// chain once; the result stays cached until the raw value is reset.
#[derive(Debug)]
pub struct SourceNode {
    name: String,
    kind: SourceKind,
    required: bool,
    default: Option<Value>,
    tags: BTreeSet<String>,
    declared_type: Option<ValueType>,
    nargs: usize,
    multiple: bool,
    is_flag: bool,
    help: Option<String>,
    processors: Vec<ProcessorNode>,
    state: Mutex<SourceState>,
}

impl SourceNode {
    fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            tags: BTreeSet::new(),
            declared_type: None,
            nargs: 1,
            multiple: false,
            is_flag: false,
            help: None,
            processors: Vec::new(),
            state: Mutex::new(SourceState::default()),
        }
    }

    /// A positional value. Positional sources are required unless given a default.
    pub fn argument(name: impl Into<String>) -> Self {
        let mut source = Self::new(name, SourceKind::Argument);
        source.required = true;
        source
    }

    /// A named flag. The long form is derived from the name (`dry_run` → `--dry-run`).
    pub fn option(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = format!("--{}", name.replace('_', "-"));
        Self::new(name, SourceKind::Option { long, short: None })
    }

    /// A boolean switch that is `false` unless given.
    pub fn flag(name: impl Into<String>) -> Self {
        let mut source = Self::option(name)
            .value_type(ValueType::Bool)
            .default(false);
        source.is_flag = true;
        source
    }

    /// A value read from the environment variable `var`.
    pub fn env(name: impl Into<String>, var: impl Into<String>) -> Self {
        Self::new(name, SourceKind::Env { var: var.into() })
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        if let SourceKind::Option { long: current, .. } = &mut self.kind {
            let long = long.into();
            *current = if long.starts_with("--") {
                long
            } else {
                format!("--{}", long)
            };
        }
        self
    }

    pub fn short(mut self, short: char) -> Self {
        if let SourceKind::Option { short: current, .. } = &mut self.kind {
            *current = Some(short);
        }
        self
    }

    /// Marks the source as required. Ignored when a default is present.
    pub fn required(mut self) -> Self {
        self.required = self.default.is_none();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the default. A source with a default is never required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn value_type(mut self, ty: ValueType) -> Self {
        self.declared_type = Some(ty);
        self
    }

    /// Number of values per occurrence.
    pub fn nargs(mut self, nargs: usize) -> Self {
        self.nargs = nargs.max(1);
        self
    }

    /// Allows the source to occur more than once.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn arity(&self) -> (usize, bool) {
        (self.nargs, self.multiple)
    }

    pub fn is_flag(&self) -> bool {
        self.is_flag
    }

    pub fn shape(&self) -> Shape {
        Shape::from_arity(self.nargs, self.multiple)
    }

    pub fn declared_type(&self) -> Option<ValueType> {
        self.declared_type
    }

    /// The element type: declared, else inferred from the default, else `Str`.
    pub fn element_type(&self) -> ValueType {
        self.declared_type
            .or_else(|| self.default.as_ref().and_then(Value::element_type))
            .unwrap_or(ValueType::Str)
    }

    pub fn processors(&self) -> &[ProcessorNode] {
        &self.processors
    }

    pub(crate) fn push_processor(&mut self, mut processor: ProcessorNode) {
        processor.set_position(self.processors.len());
        self.processors.push(processor);
    }

    fn lock(&self) -> MutexGuard<'_, SourceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the raw value and records whether it was provided.
    ///
    /// An explicitly set raw value wins; otherwise `Env` sources read their
    /// variable and every other source reports `Missing`. Fails when the
    /// source is required and nothing was supplied.
    pub fn get_raw_value(&self) -> Result<(Value, bool), ResolveError> {
        let mut state = self.lock();
        let (value, provided) = match &state.raw {
            Some((value, provided)) => (value.clone(), *provided),
            None => match &self.kind {
                SourceKind::Env { var } => match std::env::var(var) {
                    Ok(text) => (Value::Str(text), true),
                    Err(_) => (Value::Missing, false),
                },
                _ => (Value::Missing, false),
            },
        };
        state.was_provided = provided;
        if value.is_missing() && self.required {
            return Err(ResolveError::MissingValue(self.name.clone()));
        }
        Ok((value, provided))
    }

    /// Overwrites the raw value and invalidates the cached result.
    pub fn set_raw_value(&self, value: impl Into<Value>, was_provided: bool) {
        let mut state = self.lock();
        state.raw = Some((value.into(), was_provided));
        state.was_provided = was_provided;
        state.cache = Cache::Empty;
    }

    /// Forgets any explicitly set raw value and the cached result.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = SourceState::default();
    }

    pub fn was_provided(&self) -> bool {
        self.lock().was_provided
    }

    /// The cached result, if the source has been resolved.
    pub fn resolved(&self) -> Option<Value> {
        match &self.lock().cache {
            Cache::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Resolves the value: raw value, default substitution, type coercion and
    /// the processor chain. Computed once, then served from the cache.
    pub async fn get_value(&self, tree: &Tree) -> Result<Value, PipelineError> {
        {
            let mut state = self.lock();
            match &state.cache {
                Cache::Ready(value) => return Ok(value.clone()),
                Cache::Resolving => return Err(ResolveError::Cycle(self.name.clone()).into()),
                Cache::Empty => {}
            }
            state.cache = Cache::Resolving;
        }

        let pending = PendingResolution { source: self };
        let outcome = self.compute(tree).await;
        pending.finish(&outcome);
        outcome
    }

    async fn compute(&self, tree: &Tree) -> Result<Value, PipelineError> {
        let value = self.prepare()?;
        log::debug!("Resolving '{}' from {}", self.name, value);
        dispatch::run_source_chain(tree, self, value).await
    }

    /// The value the chain starts from.
    pub(crate) fn prepare(&self) -> Result<Value, ResolveError> {
        let (raw, _) = self.get_raw_value()?;
        let raw = match (raw, &self.default) {
            (Value::Missing, Some(default)) => default.clone(),
            (raw, _) => raw,
        };
        let raw = match (self.shape(), raw) {
            (Shape::Flat, scalar @ (Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Path(_))) => Value::List(vec![scalar]),
            (_, raw) => raw,
        };
        raw.coerce(self.element_type())
            .map_err(|message| ResolveError::InvalidValue {
                source_name: self.name.clone(),
                message,
            })
    }
}

/// Marks a source as resolving. If the resolution future is dropped before
/// it finishes, the cache goes back to empty.
struct PendingResolution<'a> {
    source: &'a SourceNode,
}

impl PendingResolution<'_> {
    fn finish(self, outcome: &Result<Value, PipelineError>) {
        if let Ok(value) = outcome {
            self.source.lock().cache = Cache::Ready(value.clone());
        }
        // Drop clears the cache on failure.
    }
}

impl Drop for PendingResolution<'_> {
    fn drop(&mut self) {
        let mut state = self.source.lock();
        if matches!(state.cache, Cache::Resolving) {
            state.cache = Cache::Empty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clears_required() {
        let source = SourceNode::argument("path").default("x");
        assert!(!source.is_required());
        let source = SourceNode::option("name").default("x").required();
        assert!(!source.is_required());
    }

    #[test]
    fn option_long_form_is_derived() {
        let source = SourceNode::option("dry_run").short('d');
        assert_eq!(
            source.kind(),
            &SourceKind::Option {
                long: "--dry-run".to_string(),
                short: Some('d')
            }
        );
    }

    #[test]
    fn element_type_precedence() {
        assert_eq!(SourceNode::option("a").element_type(), ValueType::Str);
        assert_eq!(SourceNode::option("a").default(3).element_type(), ValueType::Int);
        let declared = SourceNode::option("a")
            .value_type(ValueType::Float)
            .default(3);
        assert_eq!(declared.element_type(), ValueType::Float);
    }

    #[test]
    fn raw_value_tracks_provided_flag() {
        let source = SourceNode::option("count").value_type(ValueType::Int);
        assert_eq!(source.get_raw_value(), Ok((Value::Missing, false)));
        source.set_raw_value(5, true);
        assert_eq!(source.get_raw_value(), Ok((Value::Int(5), true)));
        assert!(source.was_provided());
        source.reset();
        assert!(!source.was_provided());
    }

    #[test]
    fn required_source_without_value_fails() {
        let source = SourceNode::argument("file");
        assert_eq!(
            source.get_raw_value(),
            Err(ResolveError::MissingValue("file".to_string()))
        );
    }

    #[test]
    fn prepare_wraps_scalars_for_flat_sources() {
        let source = SourceNode::option("ids").multiple().value_type(ValueType::Int);
        source.set_raw_value("7", true);
        assert_eq!(source.prepare(), Ok(Value::List(vec![Value::Int(7)])));
    }
}
