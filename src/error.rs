use crate::capability::CapabilityMismatch;
use crate::hooks::HookPhase;
use crate::value::{IndexPath, Value};
use thiserror::Error;

/// Structural errors raised while assembling and validating a tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("A root node has already been registered for this tree (while registering '{0}')")]
    RootExists(String),

    #[error("Processor '{processor}' was declared before any source or tag it could attach to")]
    NoParent { processor: String },

    #[error("The name '{name}' is used by both a {existing} and a {duplicate}")]
    NameExists {
        name: String,
        existing: &'static str,
        duplicate: &'static str,
    },

    #[error("Processor '{processor}' is a transformation and cannot be attached to tag '{tag}'")]
    InvalidChildOnTag { processor: String, tag: String },

    #[error("Processor '{processor}' does not implement tag validation and cannot be attached to tag '{tag}'")]
    UnsupportedOnTag { processor: String, tag: String },

    #[error("Processor '{processor}' at position {position} of '{source_name}': {mismatch}")]
    TypeMismatch {
        processor: String,
        source_name: String,
        position: usize,
        mismatch: CapabilityMismatch,
    },

    #[error("Default value {default} of '{source_name}' does not match its declared {expected}")]
    DefaultTypeMismatch {
        source_name: String,
        default: Value,
        expected: String,
    },

    #[error("A {0} was registered with an empty name")]
    EmptyName(&'static str),
}

/// Errors raised while obtaining a source's raw value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Missing required value for '{0}'")]
    MissingValue(String),

    #[error("Invalid value for '{source_name}': {message}")]
    InvalidValue {
        source_name: String,
        message: String,
    },

    #[error("Source '{0}' depends on its own value while it is being resolved")]
    Cycle(String),
}

/// The error type hooks return. Raised by processors, tag checks and globals.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessError {
    #[error("{0}")]
    Failed(String),

    /// Asks the host to terminate with the given code. Never annotated or
    /// rewrapped by the engine.
    #[error("exit requested with code {0}")]
    Exit(i32),
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        ProcessError::Failed(message.into())
    }
}

/// The variant of a `PipelineError`, without its payload. Error hooks filter on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Build,
    Resolve,
    Processing,
    Unhandled,
    InvalidHandler,
    Global,
    Target,
    Hook,
    Exit,
    Usage,
    Runtime,
}

/// Everything that can abort an invocation, in a user-presentable form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Invalid value for '{owner}{path}': {message} ({processor})")]
    Processing {
        owner: String,
        processor: String,
        path: IndexPath,
        message: String,
        /// The offending value, recorded only in debug mode.
        value: Option<Value>,
    },

    #[error("Processor '{processor}' on '{owner}' cannot handle {found} at '{owner}{path}'")]
    Unhandled {
        owner: String,
        processor: String,
        path: IndexPath,
        found: String,
    },

    #[error("Processor '{processor}' on '{owner}' is validation-only but returned a value")]
    InvalidHandler { owner: String, processor: String },

    #[error("Global '{global}' failed: {message}")]
    Global { global: String, message: String },

    #[error("Command '{command}' failed: {message}")]
    Target { command: String, message: String },

    #[error("Hook '{hook}' failed during the {phase} phase: {message}")]
    Hook {
        hook: String,
        phase: HookPhase,
        message: String,
    },

    #[error("exit requested with code {0}")]
    Exit(i32),

    #[error("{0}")]
    Usage(String),

    #[error("Failed to start the execution scheduler: {0}")]
    Runtime(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Build(_) => ErrorKind::Build,
            PipelineError::Resolve(_) => ErrorKind::Resolve,
            PipelineError::Processing { .. } => ErrorKind::Processing,
            PipelineError::Unhandled { .. } => ErrorKind::Unhandled,
            PipelineError::InvalidHandler { .. } => ErrorKind::InvalidHandler,
            PipelineError::Global { .. } => ErrorKind::Global,
            PipelineError::Target { .. } => ErrorKind::Target,
            PipelineError::Hook { .. } => ErrorKind::Hook,
            PipelineError::Exit(_) => ErrorKind::Exit,
            PipelineError::Usage(_) => ErrorKind::Usage,
            PipelineError::Runtime(_) => ErrorKind::Runtime,
        }
    }

    /// The name of the source, tag or global the error originated from.
    pub fn origin(&self) -> Option<&str> {
        match self {
            PipelineError::Processing { owner, .. }
            | PipelineError::Unhandled { owner, .. }
            | PipelineError::InvalidHandler { owner, .. } => Some(owner),
            PipelineError::Global { global, .. } => Some(global),
            PipelineError::Hook { hook, .. } => Some(hook),
            PipelineError::Resolve(ResolveError::MissingValue(name))
            | PipelineError::Resolve(ResolveError::Cycle(name)) => Some(name),
            PipelineError::Resolve(ResolveError::InvalidValue { source_name, .. }) => {
                Some(source_name)
            }
            _ => None,
        }
    }

    /// The user-facing message. In debug mode processing errors also show
    /// the value that failed.
    pub fn render(&self, debug: bool) -> String {
        match self {
            PipelineError::Processing {
                value: Some(value), ..
            } if debug => format!("{} [value: {}]", self, value),
            _ => self.to_string(),
        }
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, PipelineError::Exit(_))
    }
}
