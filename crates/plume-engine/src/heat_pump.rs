//! A box around one heat pump and its two prediction passes.

use plume_core::{Coord, InferenceError, InferenceModel, PhysicalField, QuantityKey, Tensor};
use plume_space::Window;
use plume_stitch::{Layer, Stitcher};
use plume_store::{Category, ChannelStack, RunStore};

use crate::error::PrepareError;

/// Prefix of the box's own prediction channel.
pub const PRIMARY_PREFIX: &str = "Primary";
/// Prefix of the stitched neighbour channel.
pub const OTHER_PREFIX: &str = "Other";

/// One fixed-size box cut out of a domain around a heat pump.
///
/// `primary` is filled by the first pass ([`apply_nn`](Self::apply_nn)),
/// `other` by the second ([`get_other_temp_field`](Self::get_other_temp_field))
/// once every box of the domain has a primary.
#[derive(Clone, Debug)]
pub struct HeatPumpBox {
    index: usize,
    location: Coord,
    window: Window,
    inputs: Tensor,
    label: Option<ChannelStack>,
    primary: Option<PhysicalField>,
    other: Option<PhysicalField>,
    background_value: f32,
}

impl HeatPumpBox {
    /// A box with no predictions yet.
    pub fn new(
        index: usize,
        location: Coord,
        window: Window,
        inputs: Tensor,
        label: Option<ChannelStack>,
        background_value: f32,
    ) -> Self {
        Self {
            index,
            location,
            window,
            inputs,
            label,
            primary: None,
            other: None,
            background_value,
        }
    }

    /// Position in the domain's scan order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The heat pump's cell in the domain frame.
    pub fn location(&self) -> &[i32] {
        &self.location
    }

    /// The box in the domain frame.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Standardized `[C, *window_shape]` model input.
    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    /// Label window, if the run has labels.
    pub fn label(&self) -> Option<&ChannelStack> {
        self.label.as_ref()
    }

    /// This box's own prediction.
    pub fn primary(&self) -> Option<&PhysicalField> {
        self.primary.as_ref()
    }

    /// The stitched predictions of every other box.
    pub fn other(&self) -> Option<&PhysicalField> {
        self.other.as_ref()
    }

    /// Fill value where no other box contributes.
    pub fn background_value(&self) -> f32 {
        self.background_value
    }

    /// Set the primary prediction.
    pub fn set_primary(&mut self, field: PhysicalField) {
        self.primary = Some(field);
    }

    /// Set the stitched field.
    pub fn set_other(&mut self, field: PhysicalField) {
        self.other = Some(field);
    }

    /// Remove and return the primary prediction.
    pub fn take_primary(&mut self) -> Option<PhysicalField> {
        self.primary.take()
    }

    /// Remove and return the stitched field.
    pub fn take_other(&mut self) -> Option<PhysicalField> {
        self.other.take()
    }

    /// Run `model` on this box's inputs.
    ///
    /// The output must be `[1, *window_shape]` or `window_shape`; it is
    /// returned in standardized units, keyed as `property`.
    pub fn apply_nn(
        &self,
        model: &dyn InferenceModel,
        property: &QuantityKey,
    ) -> Result<PhysicalField, PrepareError> {
        let output = model.infer(&self.inputs)?;
        let spatial = self.window.shape();
        let shape = output.shape();
        let fits = shape == spatial
            || (shape.len() == spatial.len() + 1 && shape[0] == 1 && &shape[1..] == spatial);
        if !fits {
            let mut expected = Vec::with_capacity(spatial.len() + 1);
            expected.push(1);
            expected.extend_from_slice(spatial);
            return Err(InferenceError::ShapeMismatch {
                expected,
                got: shape.to_vec(),
            }
            .into());
        }
        Ok(PhysicalField::new(property.clone(), spatial, output.into_data())?)
    }

    /// Stitch the primaries of every other overlapping box into this
    /// box's frame.
    ///
    /// Each other box's primary is reprojected by the offset between
    /// the windows; cells it does not cover stay unset and fall back to
    /// the background. This box's own primary never contributes. Every
    /// box in `all` must already have a primary.
    pub fn get_other_temp_field(
        &self,
        all: &[HeatPumpBox],
        stitcher: &Stitcher,
    ) -> Result<PhysicalField, PrepareError> {
        let own = self
            .primary
            .as_ref()
            .ok_or(PrepareError::PrimaryMissing { index: self.index })?;

        let mut projected = Vec::new();
        for other in all {
            if other.index == self.index {
                continue;
            }
            let primary = other
                .primary
                .as_ref()
                .ok_or(PrepareError::PrimaryMissing { index: other.index })?;
            if self.window.intersect(&other.window).is_none() {
                continue;
            }
            projected.push(self.window.reproject(&other.window, primary.values())?);
        }

        let layers: Vec<Layer<'_>> = projected
            .iter()
            .map(|(values, mask)| Layer::masked(values, mask))
            .collect();
        let merged = stitcher.merge(&layers, self.window.cell_count())?;
        Ok(PhysicalField::new(own.key().clone(), self.window.shape(), merged)?)
    }

    /// The stacked `[primary, other]` input of the next stage.
    pub fn stacked_inputs(&self) -> Result<ChannelStack, PrepareError> {
        let primary = self
            .primary
            .as_ref()
            .ok_or(PrepareError::PrimaryMissing { index: self.index })?;
        let other = self
            .other
            .as_ref()
            .ok_or(PrepareError::OtherMissing { index: self.index })?;
        let primary_name = primary.key().with_prefix(PRIMARY_PREFIX);
        let other_name = other.key().with_prefix(OTHER_PREFIX);
        Ok(ChannelStack::from_channels(
            &[
                (primary_name.id(), primary.values()),
                (other_name.id(), other.values()),
            ],
            self.window.shape(),
        )?)
    }

    /// Persist the stacked inputs (and the label window, if any) under
    /// `"{run_id}_{index}"`. Saving again overwrites.
    pub fn save(&self, store: &dyn RunStore, run_id: &str) -> Result<String, PrepareError> {
        let key = format!("{run_id}_{}", self.index);
        store.save(&key, Category::Inputs, &self.stacked_inputs()?)?;
        if let Some(label) = &self.label {
            store.save(&key, Category::Labels, label)?;
        }
        Ok(key)
    }
}
