//! The interface through which the sector model retrieves its inputs.
//!
//! An orchestration layer running the model for a sequence of years provides an implementation of
//! [`DataHandle`]. [`Model`](crate::model::Model) implements it for a model directory.
use crate::region::RegionID;
use anyhow::{Result, ensure};

/// Values for every region (rows, in region order) and every interval (columns)
pub type IntervalArray = Vec<Vec<f64>>;

/// Name of the array containing the number of EV trips starting in each region in each hour
pub const TRIPS_DATA_NAME: &str = "trips";

/// Name of the array containing electricity demand (kWh) in each region in each hour
pub const ELECTRICITY_DATA_NAME: &str = "electricity";

/// Name of the parameter giving the year by which the end-year load profile is fully adopted
pub const YR_UNTIL_CHANGED_PARAMETER: &str = "yr_until_changed";

/// Provides access to the regions, per-timestep data and parameters for a model run
pub trait DataHandle {
    /// The names of all regions, in the order used for the rows of every [`IntervalArray`]
    fn region_names(&self) -> &[RegionID];

    /// Get the named array of data for the current timestep.
    ///
    /// Returns an error if there is no array with this name.
    fn get_timestep_data(&self, name: &str) -> Result<IntervalArray>;

    /// Get the named scalar parameter.
    ///
    /// Returns an error if there is no parameter with this name.
    fn get_parameter(&self, name: &str) -> Result<f64>;
}

/// Interpret a scalar parameter as a year.
///
/// The value must be a non-negative whole number.
#[allow(clippy::float_cmp)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn parameter_as_year(name: &str, value: f64) -> Result<u32> {
    ensure!(
        value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) && value.fract() == 0.0,
        "Parameter {name} must be a year (found {value})"
    );

    Ok(value as u32)
}
