//! Shape-based dispatch and chain execution.
//!
//! A chain runs strictly in order: each hook's step is driven to completion
//! before the next processor sees the value.

use crate::capability::{Handling, ProcessorKind};
use crate::context::{Context, Owner};
use crate::error::{PipelineError, ProcessError};
use crate::node::{GlobalNode, ProcessorNode, Scope, SourceNode, TagNode};
use crate::tree::Tree;
use crate::value::{IndexPath, Shape, TypeSet, Value};

/// Runs a source's processors over its prepared value.
///
/// A processor that does not accept missing values is skipped while the
/// value is `Missing`.
pub(crate) async fn run_source_chain(
    tree: &Tree,
    source: &SourceNode,
    value: Value,
) -> Result<Value, PipelineError> {
    let owner = Owner::Source(source);
    let mut running = value;
    for processor in source.processors() {
        if running.is_missing() && !processor.capabilities().accepts_missing {
            log::trace!(
                "Skipping '{}' on '{}': no value",
                processor.name(),
                source.name()
            );
            continue;
        }
        running = apply(tree, owner, processor, running).await?;
    }
    Ok(running)
}

/// Runs a tag's validators once over the aggregate view.
pub(crate) async fn run_tag_chain(tree: &Tree, tag: &TagNode) -> Result<(), PipelineError> {
    for processor in tag.processors() {
        log::trace!("Running '{}' on tag '{}'", processor.name(), tag.name());
        let ctx = Context::new(tree, Owner::Tag(tag), processor, IndexPath::root());
        let outcome = processor.processor().process_tag(&ctx).complete().await;
        outcome.map_err(|err| annotate(tree, Owner::Tag(tag), processor, IndexPath::root(), err, None))?;
    }
    Ok(())
}

/// Runs a single global and returns what it produced.
pub(crate) async fn run_global(
    global: &GlobalNode,
    scope: &Scope<'_>,
) -> Result<Option<Value>, PipelineError> {
    log::trace!("Running global '{}'", global.name());
    let outcome = global.global().process(scope).complete().await;
    outcome.map_err(|err| match err {
        ProcessError::Exit(code) => PipelineError::Exit(code),
        ProcessError::Failed(message) => PipelineError::Global {
            global: global.name().to_string(),
            message,
        },
    })
}

/// Routes one value through one processor according to its runtime shape.
async fn apply<'a>(
    tree: &'a Tree,
    owner: Owner<'a>,
    processor: &'a ProcessorNode,
    value: Value,
) -> Result<Value, PipelineError> {
    let caps = processor.capabilities();
    let shape = match &value {
        // No shape to dispatch on. An explicit null is a value and reaches
        // the hook as is.
        Value::Missing | Value::Null => {
            return invoke(tree, owner, processor, value, IndexPath::root()).await;
        }
        // An empty sequence takes the shape its source was configured with.
        Value::List(items) if items.is_empty() => match owner {
            Owner::Source(source) if source.shape() != Shape::Scalar => source.shape(),
            _ => Shape::Flat,
        },
        other => Shape::of(other)
            .ok_or_else(|| unhandled(owner, processor, IndexPath::root(), "a mixed sequence"))?,
    };

    match (caps.handling(shape), value) {
        (Handling::Unsupported, _) => Err(unhandled(
            owner,
            processor,
            IndexPath::root(),
            &shape.to_string(),
        )),
        (Handling::Whole(types), value) => {
            check_element(owner, processor, types, &value, &IndexPath::root())?;
            invoke(tree, owner, processor, value, IndexPath::root()).await
        }
        (Handling::Each(types), Value::List(items)) if shape == Shape::Nested => {
            let mut groups = Vec::with_capacity(items.len());
            for (i, group) in items.into_iter().enumerate() {
                let group_path = IndexPath::root().child(i);
                let Value::List(elements) = group else {
                    return Err(unhandled(owner, processor, group_path, "a scalar group"));
                };
                let mut rebuilt = Vec::with_capacity(elements.len());
                for (j, element) in elements.into_iter().enumerate() {
                    let path = group_path.child(j);
                    check_element(owner, processor, types, &element, &path)?;
                    rebuilt.push(invoke(tree, owner, processor, element, path).await?);
                }
                groups.push(Value::List(rebuilt));
            }
            Ok(Value::List(groups))
        }
        (Handling::Each(types), Value::List(items)) => {
            let mut rebuilt = Vec::with_capacity(items.len());
            for (i, element) in items.into_iter().enumerate() {
                let path = IndexPath::root().child(i);
                check_element(owner, processor, types, &element, &path)?;
                rebuilt.push(invoke(tree, owner, processor, element, path).await?);
            }
            Ok(Value::List(rebuilt))
        }
        (Handling::Each(types), scalar) => {
            check_element(owner, processor, types, &scalar, &IndexPath::root())?;
            invoke(tree, owner, processor, scalar, IndexPath::root()).await
        }
    }
}

/// Calls the hook and applies validation or transformation semantics.
async fn invoke<'a>(
    tree: &'a Tree,
    owner: Owner<'a>,
    processor: &'a ProcessorNode,
    value: Value,
    path: IndexPath,
) -> Result<Value, PipelineError> {
    log::trace!(
        "'{}' on '{}{}' <- {}",
        processor.name(),
        owner.name(),
        path,
        value
    );
    let ctx = Context::new(tree, owner, processor, path.clone());
    let outcome = processor.processor().process(&value, &ctx).complete().await;

    match outcome {
        Ok(None) => Ok(value),
        Ok(Some(_)) if processor.kind() == ProcessorKind::Validation => {
            Err(PipelineError::InvalidHandler {
                owner: owner.name().to_string(),
                processor: processor.name().to_string(),
            })
        }
        Ok(Some(replacement)) => Ok(replacement),
        Err(err) => Err(annotate(tree, owner, processor, path, err, Some(&value))),
    }
}

fn check_element(
    owner: Owner<'_>,
    processor: &ProcessorNode,
    types: TypeSet,
    value: &Value,
    path: &IndexPath,
) -> Result<(), PipelineError> {
    match value.element_type() {
        Some(ty) if !types.contains(ty) => Err(unhandled(owner, processor, path.clone(), &ty.to_string())),
        _ => Ok(()),
    }
}

fn unhandled(owner: Owner<'_>, processor: &ProcessorNode, path: IndexPath, found: &str) -> PipelineError {
    PipelineError::Unhandled {
        owner: owner.name().to_string(),
        processor: processor.name().to_string(),
        path,
        found: found.to_string(),
    }
}

/// Attaches the owner and processor to a hook's error. Exit requests pass
/// through untouched.
fn annotate(
    tree: &Tree,
    owner: Owner<'_>,
    processor: &ProcessorNode,
    path: IndexPath,
    err: ProcessError,
    value: Option<&Value>,
) -> PipelineError {
    match err {
        ProcessError::Exit(code) => PipelineError::Exit(code),
        ProcessError::Failed(message) => PipelineError::Processing {
            owner: owner.name().to_string(),
            processor: processor.name().to_string(),
            path,
            message,
            value: value.filter(|_| tree.data().is_debug()).cloned(),
        },
    }
}
