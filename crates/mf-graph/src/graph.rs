//! The component graph: construction, instantiation, introspection, and
//! the target-transform inverse chain.

use std::collections::{BTreeMap, BTreeSet};

use mf_components::{
    ComponentDefinition, ComponentInstance, ComponentKind, ComponentRegistry, TargetTransformer,
};
use mf_core::{Parameters, RandomSeed};
use mf_table::Series;
use petgraph::dot::{Config, Dot};
use petgraph::graph::DiGraph;
use serde::Serialize;
use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::order::generate_order;
use crate::spec::{Channel, GraphSpec, InputRef};

/// A single node: its definition, declared inputs, and (after
/// instantiation) the live component plus its bound parameters.
#[derive(Debug)]
pub struct ComponentNode {
    name: String,
    definition: ComponentDefinition,
    inputs: Vec<InputRef>,
    parameters: Parameters,
    pub(crate) instance: Option<ComponentInstance>,
}

impl ComponentNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name of the registered component this node runs.
    pub fn component_name(&self) -> &str {
        self.definition.name()
    }

    pub fn kind(&self) -> ComponentKind {
        self.definition.kind()
    }

    pub fn inputs(&self) -> &[InputRef] {
        &self.inputs
    }

    /// Parameters bound at instantiation; empty beforehand.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn instance(&self) -> Option<&ComponentInstance> {
        self.instance.as_ref()
    }
}

/// Machine-readable `describe` entry for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescription {
    pub component: String,
    pub parameters: Parameters,
}

/// A directed acyclic graph of pipeline components.
///
/// Built from a [`GraphSpec`] plus a [`ComponentRegistry`], validated at
/// construction (references, cycles, connectivity, single terminal), and
/// scheduled once into a deterministic `compute_order`. Components are
/// instantiated exactly once; fit/predict walk the order, wiring each
/// node's declared inputs to upstream outputs.
pub struct ComponentGraph {
    pub(crate) nodes: BTreeMap<String, ComponentNode>,
    pub(crate) compute_order: Vec<String>,
    random_seed: RandomSeed,
    pub(crate) instantiated: bool,
    pub(crate) input_feature_names: BTreeMap<String, Vec<String>>,
    pub(crate) feature_provenance: BTreeMap<String, BTreeSet<String>>,
}

impl Default for ComponentGraph {
    /// The empty graph: fit and predict are identity passthroughs.
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            compute_order: Vec::new(),
            random_seed: 0,
            instantiated: false,
            input_feature_names: BTreeMap::new(),
            feature_provenance: BTreeMap::new(),
        }
    }
}

impl ComponentGraph {
    pub fn new(spec: GraphSpec, registry: &ComponentRegistry) -> GraphResult<Self> {
        Self::with_seed(spec, registry, 0)
    }

    pub fn with_seed(
        spec: GraphSpec,
        registry: &ComponentRegistry,
        random_seed: RandomSeed,
    ) -> GraphResult<Self> {
        // Resolve component references before looking at topology, so a
        // typo surfaces as MissingComponent rather than a graph error.
        let mut nodes = BTreeMap::new();
        for (name, node_spec) in spec.iter() {
            let definition = registry.resolve(&node_spec.component)?.clone();
            nodes.insert(
                name.to_string(),
                ComponentNode {
                    name: name.to_string(),
                    definition,
                    inputs: node_spec.inputs.clone(),
                    parameters: Parameters::new(),
                    instance: None,
                },
            );
        }
        let compute_order = generate_order(&spec)?;
        Ok(Self {
            nodes,
            compute_order,
            random_seed,
            instantiated: false,
            input_feature_names: BTreeMap::new(),
            feature_provenance: BTreeMap::new(),
        })
    }

    /// Build directly from a JSON spec document.
    pub fn from_json(
        value: &serde_json::Value,
        registry: &ComponentRegistry,
    ) -> GraphResult<Self> {
        Self::new(GraphSpec::from_json(value)?, registry)
    }

    pub fn random_seed(&self) -> RandomSeed {
        self.random_seed
    }

    /// The validated execution order. Deterministic: Kahn's algorithm
    /// with ready nodes scheduled in lexicographic name order; the
    /// terminal node is always last. Empty for edgeless multi-node
    /// graphs.
    pub fn compute_order(&self) -> &[String] {
        &self.compute_order
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_instantiated(&self) -> bool {
        self.instantiated
    }

    /// Declared defaults, keyed by component display name.
    pub fn default_parameters(&self) -> BTreeMap<String, Parameters> {
        let mut defaults = BTreeMap::new();
        for node in self.nodes.values() {
            if !node.definition.default_parameters().is_empty() {
                defaults.insert(
                    node.component_name().to_string(),
                    node.definition.default_parameters().clone(),
                );
            }
        }
        defaults
    }

    /// Instantiate every component, merging `parameters` (keyed by node
    /// name) over each component's declared defaults.
    ///
    /// All instances are built before any are committed, so a factory
    /// failure leaves the graph un-instantiated and a corrected retry
    /// can succeed. A second call after a successful one is an error.
    pub fn instantiate(&mut self, parameters: &BTreeMap<String, Parameters>) -> GraphResult<()> {
        if self.instantiated {
            return Err(GraphError::Reinstantiate);
        }
        let no_overrides = Parameters::new();
        let mut built = BTreeMap::new();
        for (name, node) in &self.nodes {
            let overrides = parameters.get(name).unwrap_or(&no_overrides);
            let instance = node
                .definition
                .instantiate(overrides, self.random_seed)
                .map_err(|source| GraphError::Instantiate {
                    name: name.clone(),
                    source,
                })?;
            let bound = node.definition.default_parameters().merged(overrides);
            built.insert(name.clone(), (instance, bound));
        }
        for (name, node) in self.nodes.iter_mut() {
            if let Some((instance, bound)) = built.remove(name) {
                node.instance = Some(instance);
                node.parameters = bound;
            }
        }
        self.instantiated = true;
        Ok(())
    }

    /// Look up a node by name.
    pub fn get_component(&self, name: &str) -> GraphResult<&ComponentNode> {
        self.nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownComponent {
                name: name.to_string(),
            })
    }

    /// Declared input references for a node, order-preserving.
    pub fn get_inputs(&self, name: &str) -> GraphResult<&[InputRef]> {
        self.get_component(name).map(ComponentNode::inputs)
    }

    /// The terminal node: last in compute order.
    pub fn get_last_component(&self) -> GraphResult<&ComponentNode> {
        let Some(last) = self.compute_order.last() else {
            return Err(GraphError::EdgelessGraph);
        };
        self.get_component(last)
    }

    /// Every estimator node, in name order. Errors before instantiation.
    pub fn get_estimators(&self) -> GraphResult<Vec<&ComponentNode>> {
        if !self.instantiated {
            return Err(GraphError::EstimatorsNotInstantiated);
        }
        Ok(self
            .nodes
            .values()
            .filter(|node| node.kind() == ComponentKind::Estimator)
            .collect())
    }

    /// Column names each node saw on its most recent fit/predict.
    /// Empty until the first pass.
    pub fn input_feature_names(&self) -> &BTreeMap<String, Vec<String>> {
        &self.input_feature_names
    }

    /// For each original input column, the derived columns that reached
    /// the terminal node. Rebuilt on every fit.
    pub fn feature_provenance(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.feature_provenance
    }

    /// Summarize every node: component name plus bound parameters. One
    /// line per component is also logged at `info`.
    pub fn describe(&self) -> BTreeMap<String, NodeDescription> {
        let mut summary = BTreeMap::new();
        for (position, (name, node)) in self.nodes.iter().enumerate() {
            info!("{}. {}", position + 1, node.component_name());
            summary.insert(
                name.clone(),
                NodeDescription {
                    component: node.component_name().to_string(),
                    parameters: node.parameters().clone(),
                },
            );
        }
        summary
    }

    /// Render the graph in Graphviz DOT form.
    pub fn to_dot(&self) -> String {
        let mut graph = DiGraph::<&str, &str>::new();
        let mut indices = BTreeMap::new();
        for name in self.nodes.keys() {
            indices.insert(name.as_str(), graph.add_node(name.as_str()));
        }
        let mut edges = BTreeSet::new();
        for (name, node) in &self.nodes {
            for input in node.inputs() {
                if let Some(parent) = input.node_name() {
                    edges.insert((parent, name.as_str()));
                }
            }
        }
        for (parent, child) in edges {
            if let (Some(&parent), Some(&child)) = (indices.get(parent), indices.get(child)) {
                graph.add_edge(parent, child, "");
            }
        }
        Dot::with_config(&graph, &[Config::EdgeNoLabel]).to_string()
    }

    /// Iterate nodes in compute order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentNode> {
        self.compute_order
            .iter()
            .filter_map(|name| self.nodes.get(name))
    }

    /// Apply every target transformer on the terminal node's target
    /// chain, in reverse of the forward traversal order, mapping
    /// predictions back into the original label space.
    ///
    /// Transformers that mutate the target without being target
    /// transformers (samplers) are skipped.
    pub fn inverse_transform(&self, y: &Series) -> GraphResult<Series> {
        let Some(last) = self.compute_order.last() else {
            return Err(GraphError::EdgelessGraph);
        };
        let mut data = y.clone();
        let mut current = last.as_str();
        while let Some(parent) = self.target_parent(current)? {
            let node = self.get_component(parent)?;
            if node.kind() == ComponentKind::TargetTransformer {
                match node.instance() {
                    Some(ComponentInstance::TargetTransformer(transformer)) => {
                        data = transformer.inverse_transform(&data)?;
                    }
                    None => return Err(GraphError::NotInstantiated),
                    // Factories are kind-checked at instantiation.
                    Some(_) => {}
                }
            }
            current = parent;
        }
        Ok(data)
    }

    /// First `.y`-channel parent of a node, if any.
    fn target_parent(&self, name: &str) -> GraphResult<Option<&str>> {
        let node = self.get_component(name)?;
        Ok(node.inputs().iter().find_map(|input| match input {
            InputRef::Node {
                name,
                channel: Some(Channel::Target),
            } => Some(name.as_str()),
            _ => None,
        }))
    }

    /// Canonical edge set for equality: (node, input reference) pairs,
    /// declaration order and duplicates ignored.
    fn canonical_edges(&self) -> BTreeSet<(&str, String)> {
        let mut edges = BTreeSet::new();
        for (name, node) in &self.nodes {
            for input in node.inputs() {
                edges.insert((name.as_str(), input.to_string()));
            }
        }
        edges
    }
}

impl PartialEq for ComponentGraph {
    /// Canonicalized comparison: node set (name and component), edge
    /// set, instantiation status, bound parameters, and random seed.
    /// Declaration order and instance identity do not participate.
    fn eq(&self, other: &Self) -> bool {
        if self.random_seed != other.random_seed || self.instantiated != other.instantiated {
            return false;
        }
        if self.nodes.len() != other.nodes.len() {
            return false;
        }
        for (name, node) in &self.nodes {
            match other.nodes.get(name) {
                Some(theirs)
                    if theirs.component_name() == node.component_name()
                        && theirs.parameters() == node.parameters() => {}
                _ => return false,
            }
        }
        self.canonical_edges() == other.canonical_edges()
    }
}

impl std::fmt::Debug for ComponentGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentGraph")
            .field("compute_order", &self.compute_order)
            .field("random_seed", &self.random_seed)
            .field("instantiated", &self.instantiated)
            .finish_non_exhaustive()
    }
}
