//! Render graph error types

use thiserror::Error;

use crate::backend::traits::DeviceError;
use crate::render_graph::pass::PassError;

/// Errors that can occur during graph compilation.
///
/// Compilation is all-or-nothing: on error no part of the graph is kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("two nodes are named '{0}'")]
    DuplicateNodeName(String),

    #[error("input '{input}' of node '{node}' matches no declared output")]
    UnresolvedInput { node: String, input: String },

    #[error("input '{input}' of node '{node}' refers to the node's own output")]
    SelfReferencingOutput { node: String, input: String },

    /// The graph contains a cycle; `node` lies on it.
    #[error("render graph contains a cyclic dependency through node '{node}'")]
    CircularDependency { node: String },

    #[error("transient resource '{resource}' is declared by both '{first}' and '{second}'")]
    DuplicateTransientResource {
        resource: String,
        first: String,
        second: String,
    },

    /// Internal invariant violation, never caused by user input.
    #[error("ill-formed lifetime for resource '{resource}': {reason}")]
    IllFormedResourceLifetime { resource: String, reason: String },
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that abort the execution of a frame.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("pass '{pass}' failed in frame {frame}")]
    PassFailed {
        pass: String,
        frame: u64,
        #[source]
        source: PassError,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type ExecuteResult<T> = Result<T, ExecuteError>;
