//! mf-graph: the component-graph engine for modelflow pipelines.
//!
//! Provides:
//! - Pipeline specs (`GraphSpec`, `InputRef`) with JSON loading
//! - Validated DAG construction (references, cycles, connectivity,
//!   single terminal) with a deterministic compute order
//! - One-shot instantiation of registry components with per-node
//!   parameters merged over declared defaults
//! - The fit/transform/predict execution engine and the target-transform
//!   inverse chain
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use mf_components::{
//!     ComponentDefinition, ComponentInstance, ComponentKind, ComponentRegistry,
//!     ComponentResult, TransformOutput, Transformer,
//! };
//! use mf_core::Parameters;
//! use mf_graph::{ComponentGraph, GraphSpec};
//! use mf_table::{DataTable, Series};
//!
//! struct PassThrough;
//!
//! impl Transformer for PassThrough {
//!     fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
//!         Ok(())
//!     }
//!
//!     fn transform(&self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<TransformOutput> {
//!         Ok(TransformOutput::features(x.clone()))
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register(ComponentDefinition::new(
//!     "Pass Through",
//!     ComponentKind::Transformer,
//!     Parameters::new(),
//!     |_params, _seed| Ok(ComponentInstance::Transformer(Box::new(PassThrough))),
//! ));
//!
//! let spec = GraphSpec::new()
//!     .node("First", "Pass Through", ["X"])?
//!     .node("Second", "Pass Through", ["First.x"])?;
//! let mut graph = ComponentGraph::new(spec, &registry)?;
//! graph.instantiate(&BTreeMap::new())?;
//! assert_eq!(graph.compute_order(), vec!["First", "Second"]);
//! # Ok::<(), mf_graph::GraphError>(())
//! ```

pub mod error;
pub mod graph;
pub mod spec;

mod engine;
mod order;

pub use engine::GraphOutput;
pub use error::{GraphError, GraphResult};
pub use graph::{ComponentGraph, ComponentNode, NodeDescription};
pub use spec::{Channel, GraphSpec, InputRef, NodeSpec};
