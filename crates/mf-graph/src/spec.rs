//! Pipeline specifications: node declarations and input references.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::Value;

use crate::error::{GraphError, GraphResult};

/// The two reserved root tokens.
pub(crate) const ROOT_FEATURES: &str = "X";
pub(crate) const ROOT_TARGET: &str = "y";

/// Output channel of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// Transformed features (`.x`).
    Features,
    /// Transformed target (`.y`).
    Target,
}

/// A declared input edge for a node.
///
/// String forms: the reserved root tokens `X` and `y`, a bare node name
/// (whole output, defaulting to the node's primary channel), or
/// `<node>.x` / `<node>.y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputRef {
    /// The original call-level feature table.
    RootFeatures,
    /// The original call-level target series.
    RootTarget,
    /// Output of another node in the graph.
    Node {
        name: String,
        channel: Option<Channel>,
    },
}

impl InputRef {
    pub fn parse(reference: &str) -> Self {
        match reference {
            ROOT_FEATURES => InputRef::RootFeatures,
            ROOT_TARGET => InputRef::RootTarget,
            _ => {
                if let Some(name) = reference.strip_suffix(".x") {
                    InputRef::Node {
                        name: name.to_string(),
                        channel: Some(Channel::Features),
                    }
                } else if let Some(name) = reference.strip_suffix(".y") {
                    InputRef::Node {
                        name: name.to_string(),
                        channel: Some(Channel::Target),
                    }
                } else {
                    InputRef::Node {
                        name: reference.to_string(),
                        channel: None,
                    }
                }
            }
        }
    }

    /// Node this reference points at, when it is not a root token.
    pub fn node_name(&self) -> Option<&str> {
        match self {
            InputRef::Node { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for `y` and `<node>.y` references.
    pub fn is_target(&self) -> bool {
        matches!(
            self,
            InputRef::RootTarget
                | InputRef::Node {
                    channel: Some(Channel::Target),
                    ..
                }
        )
    }
}

impl fmt::Display for InputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRef::RootFeatures => write!(f, "{ROOT_FEATURES}"),
            InputRef::RootTarget => write!(f, "{ROOT_TARGET}"),
            InputRef::Node {
                name,
                channel: None,
            } => write!(f, "{name}"),
            InputRef::Node {
                name,
                channel: Some(Channel::Features),
            } => write!(f, "{name}.x"),
            InputRef::Node {
                name,
                channel: Some(Channel::Target),
            } => write!(f, "{name}.y"),
        }
    }
}

impl From<&str> for InputRef {
    fn from(reference: &str) -> Self {
        InputRef::parse(reference)
    }
}

/// Declaration of a single node: which component it runs and where its
/// inputs come from. No inputs means "attach to the graph roots".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub component: String,
    pub inputs: Vec<InputRef>,
}

/// The full pipeline declaration: node name to component plus inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSpec {
    nodes: BTreeMap<String, NodeSpec>,
}

impl GraphSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node, replacing any previous declaration with the same
    /// name. Names may not shadow the reserved root tokens.
    pub fn node<I, R>(
        mut self,
        name: impl Into<String>,
        component: impl Into<String>,
        inputs: I,
    ) -> GraphResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<InputRef>,
    {
        let name = name.into();
        if name == ROOT_FEATURES || name == ROOT_TARGET {
            return Err(GraphError::ReservedNodeName { name });
        }
        let inputs = inputs.into_iter().map(Into::into).collect();
        self.nodes.insert(
            name,
            NodeSpec {
                component: component.into(),
                inputs,
            },
        );
        Ok(self)
    }

    /// Parse a JSON pipeline declaration of the form
    /// `{"Node": ["Component Name", "Parent.x", ...], ...}`.
    pub fn from_json(value: &Value) -> GraphResult<Self> {
        let Some(object) = value.as_object() else {
            return Err(GraphError::SpecNotAMapping);
        };
        let mut spec = GraphSpec::new();
        for (name, info) in object {
            let Some(items) = info.as_array() else {
                return Err(GraphError::SpecNotAList { name: name.clone() });
            };
            let Some((component, inputs)) = items.split_first() else {
                return Err(GraphError::SpecEmptyInfo { name: name.clone() });
            };
            let Some(component) = component.as_str() else {
                return Err(GraphError::SpecEntry { name: name.clone() });
            };
            let mut references = Vec::with_capacity(inputs.len());
            for input in inputs {
                let Some(input) = input.as_str() else {
                    return Err(GraphError::SpecEntry { name: name.clone() });
                };
                references.push(InputRef::parse(input));
            }
            spec = spec.node(name.clone(), component, references)?;
        }
        Ok(spec)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeSpec)> {
        self.nodes.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Directed edges implied by the input references, deduplicated.
    pub(crate) fn edges(&self) -> BTreeSet<(&str, &str)> {
        let mut edges = BTreeSet::new();
        for (name, node) in self.iter() {
            for input in &node.inputs {
                if let Some(parent) = input.node_name() {
                    edges.insert((parent, name));
                }
            }
        }
        edges
    }

    /// Every non-root reference must point at a declared node.
    pub(crate) fn validate_references(&self) -> GraphResult<()> {
        for (name, node) in self.iter() {
            for input in &node.inputs {
                if let Some(parent) = input.node_name() {
                    if !self.nodes.contains_key(parent) {
                        return Err(GraphError::UnknownInputReference {
                            name: name.to_string(),
                            reference: input.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
