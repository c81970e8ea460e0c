//! mf-components: the component-capability contract for modelflow.
//!
//! Provides:
//! - The `Transformer` / `Estimator` / `TargetTransformer` traits and the
//!   closed `ComponentInstance` variant set the engine dispatches on
//! - `ComponentRegistry`: an explicit, init-once registration table
//!   mapping display names to component definitions
//!
//! Concrete components live with their users (the engine's test suites,
//! downstream crates); this crate only fixes the seam between them and
//! the graph engine.

pub mod component;
pub mod error;
pub mod registry;

pub use component::{
    ComponentInstance, ComponentKind, Estimator, TargetTransformer, TransformOutput, Transformer,
};
pub use error::{ComponentError, ComponentResult};
pub use registry::{ComponentDefinition, ComponentRegistry};
