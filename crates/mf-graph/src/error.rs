//! Error types for graph construction, instantiation, and execution.

use mf_components::ComponentError;
use mf_table::TableError;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by the component graph.
///
/// Every failure is immediate and synchronous; none are retried or
/// swallowed. A failed `instantiate` leaves the graph instantiable
/// again; everything else leaves the graph usable as it was.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A JSON spec that is not an object.
    #[error("pipeline spec must be a mapping which specifies the components and edges between components")]
    SpecNotAMapping,

    /// A JSON node entry that is not an array.
    #[error("all component information for {name} should be passed in as a list")]
    SpecNotAList { name: String },

    /// A JSON node entry with no component name.
    #[error("component information for {name} must start with a component name")]
    SpecEmptyInfo { name: String },

    /// A JSON node entry containing something other than component names
    /// and input-reference strings.
    #[error("component information for {name} may only contain component names and input references")]
    SpecEntry { name: String },

    /// A node named after one of the reserved root tokens.
    #[error("{name} is reserved for the graph roots and cannot name a node")]
    ReservedNodeName { name: String },

    /// An input reference pointing at a node that is not in the spec.
    #[error("input {reference} for {name} does not name a node in the graph")]
    UnknownInputReference { name: String, reference: String },

    #[error("the given graph contains a cycle")]
    Cycle,

    #[error("the given graph is not completely connected")]
    Disconnected,

    #[error("the given graph has more than one final (childless) component")]
    MultipleFinalComponents,

    #[error("cannot get last component from edgeless graph")]
    EdgelessGraph,

    /// A component factory rejected the merged parameters.
    #[error("error received when instantiating component {name}")]
    Instantiate {
        name: String,
        #[source]
        source: ComponentError,
    },

    #[error("cannot reinstantiate a component graph that was previously instantiated")]
    Reinstantiate,

    #[error("all components must be instantiated before fitting or predicting")]
    NotInstantiated,

    #[error("cannot get estimators until the component graph is instantiated")]
    EstimatorsNotInstantiated,

    #[error("cannot have multiple y parents for a single component {name}")]
    MultipleYParents { name: String },

    #[error("component {name} is not in the graph")]
    UnknownComponent { name: String },

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Table(#[from] TableError),
}
