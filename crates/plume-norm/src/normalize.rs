//! Applying and reversing standardization.

use plume_core::{NormStats, PhysicalField};

use crate::error::{check_usable, NormError};

/// Standardize `values` in place: `(x - mean) / std`.
///
/// Arithmetic is done in `f64` and stored back as `f32`.
pub fn normalize_values(
    quantity: &str,
    values: &mut [f32],
    stats: NormStats,
) -> Result<(), NormError> {
    check_usable(quantity, stats.mean, stats.std)?;
    for v in values.iter_mut() {
        *v = ((*v as f64 - stats.mean) / stats.std) as f32;
    }
    Ok(())
}

/// Reverse [`normalize_values`] in place: `x * std + mean`.
pub fn denormalize_values(
    quantity: &str,
    values: &mut [f32],
    stats: NormStats,
) -> Result<(), NormError> {
    check_usable(quantity, stats.mean, stats.std)?;
    for v in values.iter_mut() {
        *v = (*v as f64 * stats.std + stats.mean) as f32;
    }
    Ok(())
}

/// Standardize a field in place, attaching `stats` to it.
///
/// Fails with [`NormError::ZeroStd`] if `stats.std == 0`, and with
/// [`NormError::Field`] if the field already carries different
/// statistics. Only values change; key and shape are untouched.
pub fn normalize(field: &mut PhysicalField, stats: NormStats) -> Result<(), NormError> {
    let quantity = field.key().id().to_string();
    check_usable(&quantity, stats.mean, stats.std)?;
    field.attach_stats(stats)?;
    normalize_values(&quantity, field.values_mut(), stats)
}

/// Reverse [`normalize`] in place.
pub fn denormalize(field: &mut PhysicalField, stats: NormStats) -> Result<(), NormError> {
    let quantity = field.key().id().to_string();
    check_usable(&quantity, stats.mean, stats.std)?;
    field.attach_stats(stats)?;
    denormalize_values(&quantity, field.values_mut(), stats)
}
