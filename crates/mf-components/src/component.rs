//! Core traits for pipeline components.
//!
//! The engine treats every node as a capability-typed black box: a
//! transformer rewrites the feature table (and possibly the target), an
//! estimator fits and predicts, and a target transformer additionally
//! knows how to map predictions back into the original label space.
//! Dispatch happens over the closed `ComponentInstance` set rather than
//! open-ended dynamic lookup.

use std::collections::BTreeMap;
use std::fmt;

use mf_table::{DataTable, Series};
use serde::{Deserialize, Serialize};

use crate::error::ComponentResult;

/// Capability tag of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Rewrites the feature table; may also rewrite the target.
    Transformer,
    /// Fits against features and target, then predicts.
    Estimator,
    /// A transformer that rewrites the target and can invert the mapping.
    TargetTransformer,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Transformer => write!(f, "transformer"),
            ComponentKind::Estimator => write!(f, "estimator"),
            ComponentKind::TargetTransformer => write!(f, "target transformer"),
        }
    }
}

/// Output of a transformer call: rewritten features plus, when the
/// component touches the label, a rewritten target.
///
/// `target: None` means "this component did not emit a target", not
/// "the target became empty" — the engine keeps the running target
/// unchanged in that case.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub features: DataTable,
    pub target: Option<Series>,
}

impl TransformOutput {
    /// Features only; the target flows through untouched.
    pub fn features(features: DataTable) -> Self {
        Self {
            features,
            target: None,
        }
    }

    /// Features plus a rewritten target.
    pub fn with_target(features: DataTable, target: Series) -> Self {
        Self {
            features,
            target: Some(target),
        }
    }
}

/// A component that rewrites the feature table.
pub trait Transformer: Send + Sync {
    /// Learn any state needed by `transform`.
    fn fit(&mut self, x: &DataTable, y: Option<&Series>) -> ComponentResult<()>;

    /// Rewrite the features (and possibly the target).
    fn transform(&self, x: &DataTable, y: Option<&Series>) -> ComponentResult<TransformOutput>;

    /// Fit, then transform the same data.
    fn fit_transform(
        &mut self,
        x: &DataTable,
        y: Option<&Series>,
    ) -> ComponentResult<TransformOutput> {
        self.fit(x, y)?;
        self.transform(x, y)
    }

    /// Mapping from each input column to the columns this component
    /// created from it, for provenance reporting after a fit. Components
    /// that create no columns return an empty map.
    fn feature_provenance(&self) -> BTreeMap<String, Vec<String>> {
        BTreeMap::new()
    }
}

/// A component that fits against features and target, then predicts.
pub trait Estimator: Send + Sync {
    fn fit(&mut self, x: &DataTable, y: Option<&Series>) -> ComponentResult<()>;

    fn predict(&self, x: &DataTable) -> ComponentResult<Series>;
}

/// A transformer that rewrites the target and supports mapping
/// predictions back into the original label space.
pub trait TargetTransformer: Transformer {
    fn inverse_transform(&self, y: &Series) -> ComponentResult<Series>;
}

/// A live component, tagged by capability.
///
/// The set is closed on purpose: the engine switches on the tag, and a
/// new capability means a new engine branch, not a silently ignored
/// method.
pub enum ComponentInstance {
    Transformer(Box<dyn Transformer>),
    Estimator(Box<dyn Estimator>),
    TargetTransformer(Box<dyn TargetTransformer>),
}

impl ComponentInstance {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentInstance::Transformer(_) => ComponentKind::Transformer,
            ComponentInstance::Estimator(_) => ComponentKind::Estimator,
            ComponentInstance::TargetTransformer(_) => ComponentKind::TargetTransformer,
        }
    }

    /// View as a transformer when the capability applies (target
    /// transformers transform too).
    pub fn as_transformer(&self) -> Option<&dyn Transformer> {
        match self {
            ComponentInstance::Transformer(t) => Some(&**t),
            ComponentInstance::TargetTransformer(t) => Some(&**t as &dyn Transformer),
            ComponentInstance::Estimator(_) => None,
        }
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentInstance({:?})", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;

    impl Transformer for Identity {
        fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
            Ok(())
        }

        fn transform(
            &self,
            x: &DataTable,
            _y: Option<&Series>,
        ) -> ComponentResult<TransformOutput> {
            Ok(TransformOutput::features(x.clone()))
        }
    }

    struct Negate;

    impl Transformer for Negate {
        fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
            Ok(())
        }

        fn transform(&self, x: &DataTable, y: Option<&Series>) -> ComponentResult<TransformOutput> {
            match y {
                Some(y) => Ok(TransformOutput::with_target(x.clone(), y.map(|v| -v))),
                None => Ok(TransformOutput::features(x.clone())),
            }
        }
    }

    impl TargetTransformer for Negate {
        fn inverse_transform(&self, y: &Series) -> ComponentResult<Series> {
            Ok(y.map(|v| -v))
        }
    }

    #[test]
    fn kinds_follow_variants() {
        let transformer = ComponentInstance::Transformer(Box::new(Identity));
        assert_eq!(transformer.kind(), ComponentKind::Transformer);
        assert!(transformer.as_transformer().is_some());

        let target = ComponentInstance::TargetTransformer(Box::new(Negate));
        assert_eq!(target.kind(), ComponentKind::TargetTransformer);
        assert!(target.as_transformer().is_some());
    }

    #[test]
    fn fit_transform_default_chains() {
        let mut identity = Identity;
        let table = DataTable::empty();
        let output = identity.fit_transform(&table, None).unwrap();
        assert!(output.features.is_empty());
        assert!(output.target.is_none());
    }
}
