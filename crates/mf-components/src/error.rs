//! Error types for component resolution and execution.

use mf_core::ParamError;
use mf_table::TableError;
use thiserror::Error;

use crate::component::ComponentKind;

pub type ComponentResult<T> = Result<T, ComponentError>;

/// Errors from the registry and from component calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    /// A referenced component name is not in the registry. Kept distinct
    /// from malformed-spec errors so callers can tell a typo apart from a
    /// structural problem.
    #[error("component {name} is not registered")]
    MissingComponent { name: String },

    #[error("unknown parameter {name} for component {component}")]
    UnknownParameter { name: String, component: String },

    #[error("invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A factory produced an instance whose capability does not match its
    /// registered kind.
    #[error("component {component} is registered as {declared:?} but was built as {built:?}")]
    KindMismatch {
        component: String,
        declared: ComponentKind,
        built: ComponentKind,
    },

    #[error("component is not fitted; call fit before {operation}")]
    NotFitted { operation: &'static str },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error(transparent)]
    Table(#[from] TableError),
}
