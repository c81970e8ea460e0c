//! Shared fixture components for the engine test suites.
//!
//! These are deliberately small, deterministic stand-ins for real
//! preprocessing and modeling components; the engine only ever sees
//! their capability tags.

#![allow(dead_code)]

use std::collections::BTreeMap;

use mf_components::{
    ComponentDefinition, ComponentError, ComponentInstance, ComponentKind, ComponentRegistry,
    ComponentResult, Estimator, TargetTransformer, TransformOutput, Transformer,
};
use mf_core::Parameters;
use mf_graph::GraphSpec;
use mf_table::{Column, ColumnType, DataTable, Series};

/// Features in, features out.
pub struct PassThrough;

impl Transformer for PassThrough {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn transform(&self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<TransformOutput> {
        Ok(TransformOutput::features(x.clone()))
    }
}

/// Renames every column by appending a suffix.
pub struct ColumnSuffixer {
    suffix: String,
    seen: Vec<String>,
}

impl Transformer for ColumnSuffixer {
    fn fit(&mut self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        self.seen = x.column_names().into_iter().map(String::from).collect();
        Ok(())
    }

    fn transform(&self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<TransformOutput> {
        let columns = x
            .columns()
            .iter()
            .map(|column| {
                column
                    .clone()
                    .renamed(format!("{}{}", column.name(), self.suffix))
            })
            .collect();
        Ok(TransformOutput::features(DataTable::new(columns)?))
    }

    fn feature_provenance(&self) -> BTreeMap<String, Vec<String>> {
        self.seen
            .iter()
            .map(|name| (name.clone(), vec![format!("{name}{}", self.suffix)]))
            .collect()
    }
}

/// Learns per-column means at fit time and fills NaN with them.
pub struct MeanImputer {
    means: BTreeMap<String, f64>,
}

impl Transformer for MeanImputer {
    fn fit(&mut self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        self.means.clear();
        for column in x.columns() {
            let present: Vec<f64> = column
                .values()
                .iter()
                .copied()
                .filter(|value| !value.is_nan())
                .collect();
            let mean = if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            };
            self.means.insert(column.name().to_string(), mean);
        }
        Ok(())
    }

    fn transform(&self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<TransformOutput> {
        if self.means.is_empty() && !x.is_empty() {
            return Err(ComponentError::NotFitted {
                operation: "transform",
            });
        }
        let columns = x
            .columns()
            .iter()
            .map(|column| {
                let mean = self.means.get(column.name()).copied().unwrap_or(0.0);
                let values = column
                    .values()
                    .iter()
                    .map(|&value| if value.is_nan() { mean } else { value })
                    .collect();
                Column::new(column.name(), column.column_type(), values)
            })
            .collect();
        Ok(TransformOutput::features(DataTable::new(columns)?))
    }
}

/// Keeps the first `top_n` columns.
pub struct TopColumns {
    top_n: usize,
}

impl Transformer for TopColumns {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn transform(&self, x: &DataTable, _y: Option<&Series>) -> ComponentResult<TransformOutput> {
        let keep: Vec<&str> = x
            .column_names()
            .into_iter()
            .take(self.top_n)
            .collect();
        Ok(TransformOutput::features(x.select(&keep)?))
    }
}

/// Predicts a constant, ignoring the data.
pub struct ConstantEstimator {
    value: f64,
}

impl Estimator for ConstantEstimator {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn predict(&self, x: &DataTable) -> ComponentResult<Series> {
        Ok(Series::new("predictions", vec![self.value; x.num_rows()]))
    }
}

/// Predicts the mean of the target it was fitted on.
pub struct MeanBaseline {
    mean: f64,
}

impl Estimator for MeanBaseline {
    fn fit(&mut self, _x: &DataTable, y: Option<&Series>) -> ComponentResult<()> {
        self.mean = match y {
            Some(y) if !y.is_empty() => y.values().iter().sum::<f64>() / y.len() as f64,
            _ => 0.0,
        };
        Ok(())
    }

    fn predict(&self, x: &DataTable) -> ComponentResult<Series> {
        Ok(Series::new("predictions", vec![self.mean; x.num_rows()]))
    }
}

/// Target transformer: y -> ln(y), inverse exp.
pub struct LogTransform;

impl Transformer for LogTransform {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn transform(&self, x: &DataTable, y: Option<&Series>) -> ComponentResult<TransformOutput> {
        match y {
            Some(y) => Ok(TransformOutput::with_target(x.clone(), y.map(f64::ln))),
            None => Ok(TransformOutput::features(x.clone())),
        }
    }
}

impl TargetTransformer for LogTransform {
    fn inverse_transform(&self, y: &Series) -> ComponentResult<Series> {
        Ok(y.map(f64::exp))
    }
}

/// Target transformer: y -> 2y, inverse y/2.
pub struct DoubleTransform;

impl Transformer for DoubleTransform {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn transform(&self, x: &DataTable, y: Option<&Series>) -> ComponentResult<TransformOutput> {
        match y {
            Some(y) => Ok(TransformOutput::with_target(x.clone(), y.map(|v| v * 2.0))),
            None => Ok(TransformOutput::features(x.clone())),
        }
    }
}

impl TargetTransformer for DoubleTransform {
    fn inverse_transform(&self, y: &Series) -> ComponentResult<Series> {
        Ok(y.map(|v| v / 2.0))
    }
}

/// Keeps the first `rows` rows of both features and target, the way a
/// sampler does. Mutates the target without being a target transformer.
pub struct RowSubsetter {
    rows: usize,
}

impl Transformer for RowSubsetter {
    fn fit(&mut self, _x: &DataTable, _y: Option<&Series>) -> ComponentResult<()> {
        Ok(())
    }

    fn transform(&self, x: &DataTable, y: Option<&Series>) -> ComponentResult<TransformOutput> {
        let columns = x
            .columns()
            .iter()
            .map(|column| {
                let values = column.values().iter().copied().take(self.rows).collect();
                Column::new(column.name(), column.column_type(), values)
            })
            .collect();
        let features = DataTable::new(columns)?;
        match y {
            Some(y) => {
                let target = Series::new(
                    y.name(),
                    y.values().iter().copied().take(self.rows).collect(),
                );
                Ok(TransformOutput::with_target(features, target))
            }
            None => Ok(TransformOutput::features(features)),
        }
    }
}

fn reject_unknown(params: &Parameters, component: &str, known: &[&str]) -> ComponentResult<()> {
    for name in params.names() {
        if !known.contains(&name) {
            return Err(ComponentError::UnknownParameter {
                name: name.to_string(),
                component: component.to_string(),
            });
        }
    }
    Ok(())
}

/// Registry with every fixture component registered.
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(ComponentDefinition::new(
        "Pass Through",
        ComponentKind::Transformer,
        Parameters::new(),
        |params, _seed| {
            reject_unknown(params, "Pass Through", &[])?;
            Ok(ComponentInstance::Transformer(Box::new(PassThrough)))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Column Suffixer",
        ComponentKind::Transformer,
        Parameters::new().with("suffix", "_new"),
        |params, _seed| {
            reject_unknown(params, "Column Suffixer", &["suffix"])?;
            Ok(ComponentInstance::Transformer(Box::new(ColumnSuffixer {
                suffix: params.get_str("suffix")?.to_string(),
                seen: Vec::new(),
            })))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Mean Imputer",
        ComponentKind::Transformer,
        Parameters::new(),
        |params, _seed| {
            reject_unknown(params, "Mean Imputer", &[])?;
            Ok(ComponentInstance::Transformer(Box::new(MeanImputer {
                means: BTreeMap::new(),
            })))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Top Columns",
        ComponentKind::Transformer,
        Parameters::new().with("top_n", 10),
        |params, _seed| {
            reject_unknown(params, "Top Columns", &["top_n"])?;
            Ok(ComponentInstance::Transformer(Box::new(TopColumns {
                top_n: params.get_usize("top_n")?,
            })))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Constant Estimator",
        ComponentKind::Estimator,
        Parameters::new().with("value", 1.0),
        |params, _seed| {
            reject_unknown(params, "Constant Estimator", &["value"])?;
            Ok(ComponentInstance::Estimator(Box::new(ConstantEstimator {
                value: params.get_f64("value")?,
            })))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Mean Baseline",
        ComponentKind::Estimator,
        Parameters::new(),
        |params, _seed| {
            reject_unknown(params, "Mean Baseline", &[])?;
            Ok(ComponentInstance::Estimator(Box::new(MeanBaseline {
                mean: 0.0,
            })))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Log Transform",
        ComponentKind::TargetTransformer,
        Parameters::new(),
        |params, _seed| {
            reject_unknown(params, "Log Transform", &[])?;
            Ok(ComponentInstance::TargetTransformer(Box::new(LogTransform)))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Double Transform",
        ComponentKind::TargetTransformer,
        Parameters::new(),
        |params, _seed| {
            reject_unknown(params, "Double Transform", &[])?;
            Ok(ComponentInstance::TargetTransformer(Box::new(
                DoubleTransform,
            )))
        },
    ));
    registry.register(ComponentDefinition::new(
        "Row Subsetter",
        ComponentKind::Transformer,
        Parameters::new().with("rows", 50),
        |params, _seed| {
            reject_unknown(params, "Row Subsetter", &["rows"])?;
            Ok(ComponentInstance::Transformer(Box::new(RowSubsetter {
                rows: params.get_usize("rows")?,
            })))
        },
    ));
    registry
}

/// The stacked-ensemble example: two encoder branches feeding two
/// estimators whose predictions feed a final estimator.
pub fn example_spec() -> GraphSpec {
    GraphSpec::new()
        .node("Imputer", "Mean Imputer", Vec::<&str>::new())
        .unwrap()
        .node("OneHot_RandomForest", "Top Columns", ["Imputer.x"])
        .unwrap()
        .node("OneHot_ElasticNet", "Top Columns", ["Imputer.x"])
        .unwrap()
        .node("Random Forest", "Constant Estimator", ["OneHot_RandomForest.x"])
        .unwrap()
        .node("Elastic Net", "Constant Estimator", ["OneHot_ElasticNet.x"])
        .unwrap()
        .node(
            "Logistic Regression",
            "Mean Baseline",
            ["Random Forest", "Elastic Net"],
        )
        .unwrap()
}

/// Compute order of `example_spec` under the lexicographic tie-break.
pub fn example_order() -> Vec<&'static str> {
    vec![
        "Imputer",
        "OneHot_ElasticNet",
        "Elastic Net",
        "OneHot_RandomForest",
        "Random Forest",
        "Logistic Regression",
    ]
}

/// Three-row feature table with an integer and a double column.
pub fn sample_table() -> DataTable {
    DataTable::new(vec![
        Column::new("age", ColumnType::Integer, vec![34.0, 21.0, 45.0]),
        Column::new("income", ColumnType::Double, vec![52_000.0, 48_500.0, 61_200.0]),
    ])
    .unwrap()
}

/// Target aligned with `sample_table`.
pub fn sample_target() -> Series {
    Series::new("target", vec![1.0, 0.0, 1.0])
}

/// Per-node override map from pairs.
pub fn overrides(pairs: &[(&str, Parameters)]) -> BTreeMap<String, Parameters> {
    pairs
        .iter()
        .map(|(name, params)| (name.to_string(), params.clone()))
        .collect()
}
