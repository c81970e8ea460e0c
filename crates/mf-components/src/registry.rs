//! The component registry.
//!
//! An explicit registration table mapping display names to component
//! definitions. Built once at startup, read-only afterwards, and passed
//! into graph construction; there is no process-global registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mf_core::{Parameters, RandomSeed};

use crate::component::{ComponentInstance, ComponentKind};
use crate::error::{ComponentError, ComponentResult};

type ComponentFactory =
    Arc<dyn Fn(&Parameters, RandomSeed) -> ComponentResult<ComponentInstance> + Send + Sync>;

/// A registered component: display name, capability, declared default
/// parameters, and the factory that builds live instances.
///
/// The factory receives the defaults merged with any per-node overrides
/// and must reject unknown options and invalid values.
#[derive(Clone)]
pub struct ComponentDefinition {
    name: String,
    kind: ComponentKind,
    defaults: Parameters,
    factory: ComponentFactory,
}

impl ComponentDefinition {
    pub fn new(
        name: impl Into<String>,
        kind: ComponentKind,
        defaults: Parameters,
        factory: impl Fn(&Parameters, RandomSeed) -> ComponentResult<ComponentInstance>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            defaults,
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn default_parameters(&self) -> &Parameters {
        &self.defaults
    }

    /// Merge `overrides` over the declared defaults and build the live
    /// instance, verifying that the factory honored the registered kind.
    pub fn instantiate(
        &self,
        overrides: &Parameters,
        seed: RandomSeed,
    ) -> ComponentResult<ComponentInstance> {
        let merged = self.defaults.merged(overrides);
        let instance = (self.factory)(&merged, seed)?;
        if instance.kind() != self.kind {
            return Err(ComponentError::KindMismatch {
                component: self.name.clone(),
                declared: self.kind,
                built: instance.kind(),
            });
        }
        Ok(instance)
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

/// Display-name keyed table of component definitions.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its display name, replacing any
    /// previous entry with the same name.
    pub fn register(&mut self, definition: ComponentDefinition) -> &mut Self {
        self.entries
            .insert(definition.name().to_string(), definition);
        self
    }

    /// Look up a definition by display name.
    pub fn resolve(&self, name: &str) -> ComponentResult<&ComponentDefinition> {
        self.entries
            .get(name)
            .ok_or_else(|| ComponentError::MissingComponent {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
