//! The execution engine: one synchronous pass over the compute order.
//!
//! Each pass resolves every node's declared inputs against the outputs
//! cached earlier in the same pass (or the call's root inputs), invokes
//! the component, and caches its outputs for downstream consumers. The
//! cache lives and dies with the pass; nothing is shared across calls.

use std::collections::{BTreeMap, BTreeSet};

use mf_components::{ComponentInstance, ComponentKind, Estimator, Transformer};
use mf_table::{concat_columns, Column, ColumnType, DataTable, Series};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::ComponentGraph;
use crate::spec::InputRef;

/// Cached output of one executed node.
enum NodeOutput {
    Transformed {
        features: DataTable,
        target: Option<Series>,
    },
    /// Estimator predictions. The terminal estimator is not cached on
    /// fitting passes (nothing consumes it).
    Predicted(Series),
}

type OutputCache = BTreeMap<String, NodeOutput>;

/// Result of a full predict pass: predictions when the terminal node is
/// an estimator, the transformed table when it is a transformer.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOutput {
    Features(DataTable),
    Predictions(Series),
}

impl GraphOutput {
    pub fn features(&self) -> Option<&DataTable> {
        match self {
            GraphOutput::Features(table) => Some(table),
            GraphOutput::Predictions(_) => None,
        }
    }

    pub fn predictions(&self) -> Option<&Series> {
        match self {
            GraphOutput::Predictions(series) => Some(series),
            GraphOutput::Features(_) => None,
        }
    }

    pub fn into_features(self) -> Option<DataTable> {
        match self {
            GraphOutput::Features(table) => Some(table),
            GraphOutput::Predictions(_) => None,
        }
    }

    pub fn into_predictions(self) -> Option<Series> {
        match self {
            GraphOutput::Predictions(series) => Some(series),
            GraphOutput::Features(_) => None,
        }
    }
}

impl ComponentGraph {
    /// Fit every component in compute order.
    pub fn fit(&mut self, x: &DataTable, y: &Series) -> GraphResult<()> {
        let order = self.compute_order().to_vec();
        self.compute_features(&order, x, Some(y), true)?;
        self.rebuild_feature_provenance(x);
        Ok(())
    }

    /// Run the fitted graph forward. An empty or edgeless graph returns
    /// the input unchanged.
    pub fn predict(&mut self, x: &DataTable) -> GraphResult<GraphOutput> {
        if self.compute_order().is_empty() {
            return Ok(GraphOutput::Features(x.clone()));
        }
        let order = self.compute_order().to_vec();
        let mut cache = self.compute_features(&order, x, None, false)?;
        let last = &order[order.len() - 1];
        let output = cache
            .remove(last)
            .expect("every scheduled node caches an output on non-fitting passes");
        Ok(match output {
            NodeOutput::Predicted(predictions) => GraphOutput::Predictions(predictions),
            NodeOutput::Transformed { features, .. } => GraphOutput::Features(features),
        })
    }

    /// Fit every component but the terminal one and return the feature
    /// table that would feed it.
    pub fn fit_features(&mut self, x: &DataTable, y: &Series) -> GraphResult<DataTable> {
        self.transform_features_helper(x, Some(y), true)
    }

    /// Transform through every component but the terminal one and return
    /// the feature table that would feed it. Target-channel outputs are
    /// never part of the returned table.
    pub fn compute_final_component_features(
        &mut self,
        x: &DataTable,
        y: Option<&Series>,
    ) -> GraphResult<DataTable> {
        self.transform_features_helper(x, y, false)
    }

    fn transform_features_helper(
        &mut self,
        x: &DataTable,
        y: Option<&Series>,
        fit: bool,
    ) -> GraphResult<DataTable> {
        if self.compute_order.len() <= 1 {
            if let Some(name) = self.compute_order.first().cloned() {
                self.input_feature_names
                    .insert(name, column_names(x));
            }
            return Ok(x.clone());
        }
        let order = self.compute_order.to_vec();
        let last = &order[order.len() - 1];
        let prior = &order[..order.len() - 1];
        let cache = self.compute_features(prior, x, y, fit)?;
        let final_features = self.resolve_feature_inputs(last, prior, &cache, x)?;
        if fit {
            self.input_feature_names
                .insert(last.clone(), column_names(&final_features));
        }
        Ok(final_features)
    }

    /// Walk `order`, resolving inputs, dispatching on each node's
    /// capability tag, and caching outputs for downstream nodes.
    fn compute_features(
        &mut self,
        order: &[String],
        x: &DataTable,
        y: Option<&Series>,
        fit: bool,
    ) -> GraphResult<OutputCache> {
        let mut cache = OutputCache::new();
        let mut most_recent_y = y.cloned();
        for (index, name) in order.iter().enumerate() {
            let executed = &order[..index];
            let input_x = self.resolve_feature_inputs(name, executed, &cache, x)?;
            let input_y =
                self.resolve_target_input(name, &cache, y, most_recent_y.as_ref())?;
            self.input_feature_names
                .insert(name.clone(), column_names(&input_x));
            // The graph's terminal node, not the last entry of `order`:
            // helper passes walk a prefix of the compute order.
            let is_terminal = self.compute_order.last() == Some(name);
            debug!(component = %name, fit, "executing node");
            let Some(node) = self.nodes.get_mut(name) else {
                return Err(GraphError::UnknownComponent { name: name.clone() });
            };
            match node.instance.as_mut() {
                None => return Err(GraphError::NotInstantiated),
                Some(ComponentInstance::Transformer(transformer)) => {
                    let output = if fit {
                        transformer.fit_transform(&input_x, input_y.as_ref())?
                    } else {
                        transformer.transform(&input_x, input_y.as_ref())?
                    };
                    if output.target.is_some() {
                        most_recent_y = output.target.clone();
                    }
                    cache.insert(
                        name.clone(),
                        NodeOutput::Transformed {
                            features: output.features,
                            target: output.target,
                        },
                    );
                }
                Some(ComponentInstance::TargetTransformer(transformer)) => {
                    let output = if fit {
                        transformer.fit_transform(&input_x, input_y.as_ref())?
                    } else {
                        transformer.transform(&input_x, input_y.as_ref())?
                    };
                    if output.target.is_some() {
                        most_recent_y = output.target.clone();
                    }
                    cache.insert(
                        name.clone(),
                        NodeOutput::Transformed {
                            features: output.features,
                            target: output.target,
                        },
                    );
                }
                Some(ComponentInstance::Estimator(estimator)) => {
                    if fit {
                        estimator.fit(&input_x, input_y.as_ref())?;
                    }
                    // The terminal estimator is not asked to predict
                    // while fitting.
                    if !(fit && is_terminal) {
                        let predictions = estimator.predict(&input_x)?;
                        cache.insert(name.clone(), NodeOutput::Predicted(predictions));
                    }
                }
            }
        }
        Ok(cache)
    }

    /// Resolve a node's feature input from its non-target references.
    ///
    /// With no explicit feature-flavored reference, the input defaults
    /// to the accumulated outputs of every prior node (see
    /// `accumulated_features`); with no prior outputs either, the
    /// original `x`.
    fn resolve_feature_inputs(
        &self,
        name: &str,
        executed: &[String],
        cache: &OutputCache,
        x: &DataTable,
    ) -> GraphResult<DataTable> {
        let node = self.get_component(name)?;
        let mut x_inputs: Vec<DataTable> = Vec::new();
        for input in node.inputs() {
            if input.is_target() {
                continue;
            }
            match input {
                InputRef::RootFeatures => x_inputs.push(x.clone()),
                InputRef::Node { name: parent, .. } => match cache.get(parent) {
                    Some(NodeOutput::Transformed { features, .. }) => {
                        x_inputs.push(features.clone());
                    }
                    Some(NodeOutput::Predicted(predictions)) => {
                        // Upstream predictions become a single named
                        // feature column.
                        x_inputs.push(DataTable::from_series(
                            &predictions.clone().with_name(parent.clone()),
                            ColumnType::Double,
                        ));
                    }
                    None => {}
                },
                InputRef::RootTarget => {}
            }
        }
        if x_inputs.is_empty() {
            self.accumulated_features(name, executed, cache, x)
        } else {
            Ok(concat_columns(&x_inputs)?)
        }
    }

    /// Default feature input for a node without explicit feature
    /// references: every prior transformer output concatenated in
    /// compute order (later outputs replace same-named columns), plus —
    /// for estimator nodes — each prior estimator's predictions as a
    /// column named after that node.
    fn accumulated_features(
        &self,
        name: &str,
        executed: &[String],
        cache: &OutputCache,
        x: &DataTable,
    ) -> GraphResult<DataTable> {
        let node = self.get_component(name)?;
        let include_predictions = node.kind() == ComponentKind::Estimator;
        let mut columns: Vec<Column> = Vec::new();
        let mut positions: BTreeMap<String, usize> = BTreeMap::new();
        for parent in executed {
            match cache.get(parent) {
                Some(NodeOutput::Transformed { features, .. }) => {
                    for column in features.columns() {
                        upsert_column(&mut columns, &mut positions, column.clone());
                    }
                }
                Some(NodeOutput::Predicted(predictions)) if include_predictions => {
                    upsert_column(
                        &mut columns,
                        &mut positions,
                        Column::new(
                            parent.clone(),
                            ColumnType::Double,
                            predictions.values().to_vec(),
                        ),
                    );
                }
                _ => {}
            }
        }
        if columns.is_empty() {
            return Ok(x.clone());
        }
        Ok(DataTable::new(columns)?)
    }

    /// Resolve a node's target input from its target-flavored
    /// references. Falls back to the most recent target emitted earlier
    /// in the pass, then to the call's original `y`.
    fn resolve_target_input(
        &self,
        name: &str,
        cache: &OutputCache,
        y: Option<&Series>,
        most_recent: Option<&Series>,
    ) -> GraphResult<Option<Series>> {
        let node = self.get_component(name)?;
        let mut y_input: Option<Series> = None;
        for input in node.inputs() {
            if !input.is_target() {
                continue;
            }
            if y_input.is_some() {
                return Err(GraphError::MultipleYParents {
                    name: name.to_string(),
                });
            }
            y_input = match input {
                InputRef::RootTarget => y.cloned(),
                InputRef::Node { name: parent, .. } => match cache.get(parent) {
                    Some(NodeOutput::Transformed { target, .. }) => target.clone(),
                    _ => None,
                },
                InputRef::RootFeatures => None,
            };
        }
        Ok(y_input.or_else(|| most_recent.cloned()))
    }

    /// Recompute, from each transformer's declared provenance, which
    /// derived columns each original input column contributed to the
    /// terminal node's input.
    fn rebuild_feature_provenance(&mut self, x: &DataTable) {
        if self.compute_order.is_empty() {
            self.feature_provenance = BTreeMap::new();
            return;
        }
        let mut provenance: BTreeMap<String, BTreeSet<String>> = x
            .column_names()
            .into_iter()
            .map(|name| (name.to_string(), BTreeSet::new()))
            .collect();
        for name in &self.compute_order {
            let Some(transformer) = self
                .nodes
                .get(name)
                .and_then(|node| node.instance())
                .and_then(ComponentInstance::as_transformer)
            else {
                continue;
            };
            for (input, outputs) in transformer.feature_provenance() {
                if provenance.contains_key(&input) {
                    if let Some(children) = provenance.get_mut(&input) {
                        children.extend(outputs.iter().cloned());
                    }
                } else {
                    // The input was itself derived: credit the original
                    // columns it descends from.
                    let owners: Vec<String> = provenance
                        .iter()
                        .filter(|(_, children)| children.contains(&input))
                        .map(|(owner, _)| owner.clone())
                        .collect();
                    for owner in owners {
                        if let Some(children) = provenance.get_mut(&owner) {
                            children.extend(outputs.iter().cloned());
                        }
                    }
                }
            }
        }
        let final_features: BTreeSet<String> = self
            .compute_order
            .last()
            .and_then(|last| self.input_feature_names.get(last))
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();
        self.feature_provenance = provenance
            .into_iter()
            .map(|(original, children)| {
                let kept: BTreeSet<String> =
                    children.intersection(&final_features).cloned().collect();
                (original, kept)
            })
            .filter(|(_, children)| !children.is_empty())
            .collect();
    }
}

fn column_names(table: &DataTable) -> Vec<String> {
    table
        .column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

fn upsert_column(
    columns: &mut Vec<Column>,
    positions: &mut BTreeMap<String, usize>,
    column: Column,
) {
    match positions.get(column.name()) {
        Some(&index) => columns[index] = column,
        None => {
            positions.insert(column.name().to_string(), columns.len());
            columns.push(column);
        }
    }
}
