//! Diffusion describes how a quantity changes from its base-year value to its end value over the
//! simulated years.
use anyhow::{Result, bail};
use serde_string_enum::DeserializeLabeledStringEnum;

/// The type of diffusion between the base-year and end-year values
#[derive(DeserializeLabeledStringEnum, Debug, PartialEq, Eq, Default, Clone, Copy)]
pub enum DiffusionMethod {
    /// Linear change over time towards the end value
    #[default]
    #[string = "linear"]
    Linear,
    /// Sigmoid change over time towards the end value.
    ///
    /// Not yet implemented: selecting it is allowed, but evaluating it is an error.
    #[string = "sigmoid"]
    Sigmoid,
}

impl DiffusionMethod {
    /// Calculate the fraction of the change from 0 to 1 reached in `curr_yr`.
    ///
    /// # Arguments
    ///
    /// * `base_yr` - Base year of the simulation
    /// * `curr_yr` - Current simulation year
    /// * `yr_until_changed` - Year by which the change is fully implemented
    pub fn fraction(self, base_yr: u32, curr_yr: u32, yr_until_changed: u32) -> Result<f64> {
        match self {
            Self::Linear => Ok(linear_diff(base_yr, curr_yr, 0.0, 1.0, yr_until_changed)),
            Self::Sigmoid => bail!("Sigmoid diffusion is not implemented"),
        }
    }
}

/// Calculate a linear diffusion for the current year.
///
/// If the current year is the base year, the diffusion window is empty or the start and end values
/// are identical, `value_start` is returned. Otherwise the value moves linearly from `value_start`
/// in `base_yr` to `value_end` in `yr_until_changed`. The result is not clamped, so years after
/// `yr_until_changed` extrapolate past `value_end`.
///
/// # Arguments
///
/// * `base_yr` - Base year of the simulation
/// * `curr_yr` - Current simulation year
/// * `value_start` - Value in the base year
/// * `value_end` - Value in `yr_until_changed`
/// * `yr_until_changed` - Year by which the change is fully implemented
#[allow(clippy::float_cmp)]
pub fn linear_diff(
    base_yr: u32,
    curr_yr: u32,
    value_start: f64,
    value_end: f64,
    yr_until_changed: u32,
) -> f64 {
    if curr_yr == base_yr || yr_until_changed == base_yr || value_end == value_start {
        return value_start;
    }

    // No change happens in the base year itself, so it isn't counted as a step
    let steps = f64::from(yr_until_changed) - f64::from(base_yr);
    let elapsed = f64::from(curr_yr) - f64::from(base_yr);

    value_start + (value_end - value_start) * elapsed / steps
}
