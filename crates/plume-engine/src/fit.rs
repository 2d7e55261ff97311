//! Fitting dataset statistics over a training dataset.

use indexmap::IndexMap;
use plume_norm::StatsAccumulator;
use plume_store::{Category, ChannelStack, DatasetInfo, RunStore, VariableInfo};
use tracing::info;

use crate::error::{DomainError, PrepareError};

/// Per-category accumulators in channel order.
#[derive(Default)]
struct Channels {
    names: Vec<String>,
    acc: Vec<StatsAccumulator>,
}

impl Channels {
    fn feed(&mut self, run_id: &str, stack: &ChannelStack) -> Result<(), PrepareError> {
        if self.names.is_empty() {
            self.names = stack.channels().to_vec();
            self.acc = vec![StatsAccumulator::new(); self.names.len()];
        }
        for (name, acc) in self.names.iter().zip(&mut self.acc) {
            let values = stack.channel(name).ok_or_else(|| DomainError::MissingChannel {
                run_id: run_id.to_string(),
                channel: name.clone(),
            })?;
            acc.extend(values);
        }
        Ok(())
    }

    fn finish(&self) -> Result<IndexMap<String, VariableInfo>, PrepareError> {
        let mut out = IndexMap::with_capacity(self.names.len());
        for (index, (name, acc)) in self.names.iter().zip(&self.acc).enumerate() {
            let mut v = VariableInfo::new(index, acc.finish(name)?);
            v.min = acc.min();
            v.max = acc.max();
            out.insert(name.clone(), v);
        }
        Ok(out)
    }
}

/// Fit `(mean, std, min, max)` of every channel over all runs of a
/// training dataset.
///
/// Channel order comes from the first run; later runs must carry the
/// same channels. Every run must share the first run's grid. The result
/// describes the data as stored, so `normalized` is `false`.
pub fn fit_dataset_info(
    store: &dyn RunStore,
    cell_size: Option<f64>,
) -> Result<DatasetInfo, PrepareError> {
    let mut inputs = Channels::default();
    let mut labels = Channels::default();
    let mut dims: Option<Vec<usize>> = None;
    let runs = store.list_runs()?;

    for run_id in &runs {
        let stack = store.load(run_id, Category::Inputs)?;
        match &dims {
            None => dims = Some(stack.spatial_shape().to_vec()),
            Some(d) if d.as_slice() != stack.spatial_shape() => {
                return Err(DomainError::ShapeMismatch {
                    run_id: run_id.clone(),
                    what: "inputs".into(),
                    expected: d.clone(),
                    got: stack.spatial_shape().to_vec(),
                }
                .into())
            }
            Some(_) => {}
        }
        inputs.feed(run_id, &stack)?;
        if store.contains(run_id, Category::Labels) {
            labels.feed(run_id, &store.load(run_id, Category::Labels)?)?;
        }
    }

    let info = DatasetInfo {
        inputs: inputs.finish()?,
        labels: labels.finish()?,
        cell_size,
        dimensions: dims,
        normalized: false,
    };
    info!(
        runs = runs.len(),
        inputs = info.inputs.len(),
        labels = info.labels.len(),
        "fitted dataset statistics"
    );
    Ok(info)
}
