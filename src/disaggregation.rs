//! Temporal disaggregation of regional demand onto hourly load profiles.
//!
//! The load profile for the simulation year is found by diffusing from a base-year profile towards
//! an end-year profile (e.g. as a new charging regime is adopted). Each region's annual demand is
//! then spread over the hours of the year according to that profile.
use crate::diffusion::DiffusionMethod;
use crate::load_profile::{HOURS_PER_YEAR, LoadProfile, YearShape};
use crate::region::RegionID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::debug;
use std::borrow::Cow;

/// Relative tolerance used when checking that disaggregation conserves energy
const ENERGY_CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Hourly demand for every hour of the year (day-major), keyed by region
pub type RegionHourlyDemandMap = IndexMap<RegionID, Vec<f64>>;

/// Get the year shape to use for the current simulation year.
///
/// The base-year shape is used in (or before) the base year and the end-year shape from
/// `yr_until_changed` onwards. In between, the shapes are interpolated elementwise according to
/// the diffusion fraction, which is only evaluated for years in between.
///
/// # Arguments
///
/// * `curr_yr` - Current simulation year
/// * `base_yr` - Base year of the simulation
/// * `yr_until_changed` - Year by which the end-year profile is fully adopted
/// * `base_profile` - Load profile for the base year
/// * `end_profile` - Load profile once the change is complete
/// * `diffusion` - How to diffuse between the two profiles
pub fn current_year_shape<'a>(
    curr_yr: u32,
    base_yr: u32,
    yr_until_changed: u32,
    base_profile: &'a LoadProfile,
    end_profile: &'a LoadProfile,
    diffusion: DiffusionMethod,
) -> Result<Cow<'a, YearShape>> {
    let shape = if curr_yr <= base_yr {
        Cow::Borrowed(&base_profile.shape_yh)
    } else if curr_yr >= yr_until_changed {
        Cow::Borrowed(&end_profile.shape_yh)
    } else {
        let fraction = diffusion.fraction(base_yr, curr_yr, yr_until_changed)?;
        debug!("Diffusion fraction for {curr_yr}: {fraction}");
        Cow::Owned(
            base_profile
                .shape_yh
                .interpolate(&end_profile.shape_yh, fraction),
        )
    };

    Ok(shape)
}

/// Assign each region's demand to an hourly load profile for the current year.
///
/// The demand given for each region may be at any temporal resolution (e.g. one value per hour of
/// the year, one value per hour of a day or a single annual total): it is summed to give the total
/// to be disaggregated.
///
/// # Arguments
///
/// * `curr_yr` - Current simulation year
/// * `base_yr` - Base year of the simulation
/// * `yr_until_changed` - Year by which the end-year profile is fully adopted
/// * `service_demand_by_region` - Demand to disaggregate for every region
/// * `base_profile` - Load profile for the base year
/// * `end_profile` - Load profile once the change is complete
/// * `regions` - The regions to disaggregate demand for, in output order
/// * `diffusion` - How to diffuse between the two profiles
///
/// # Returns
///
/// Hourly demand for every region, or an error if demand is missing for one of `regions`.
#[allow(clippy::too_many_arguments)]
pub fn disaggregate<D: AsRef<[f64]>>(
    curr_yr: u32,
    base_yr: u32,
    yr_until_changed: u32,
    service_demand_by_region: &IndexMap<RegionID, D>,
    base_profile: &LoadProfile,
    end_profile: &LoadProfile,
    regions: &[RegionID],
    diffusion: DiffusionMethod,
) -> Result<RegionHourlyDemandMap> {
    let shape = current_year_shape(
        curr_yr,
        base_yr,
        yr_until_changed,
        base_profile,
        end_profile,
        diffusion,
    )?;
    debug!(
        "Load profile for {curr_yr} has total fraction {}",
        shape.sum()
    );

    regions
        .iter()
        .map(|region_id| {
            let demand = service_demand_by_region
                .get(region_id)
                .with_context(|| format!("No demand provided for region {region_id}"))?;
            let total: f64 = demand.as_ref().iter().sum();

            Ok((region_id.clone(), shape.scale(total)))
        })
        .collect()
}

/// Check that the hourly demand for a region adds up to the total which was disaggregated
pub fn check_energy_conserved(region_id: &RegionID, total: f64, hourly: &[f64]) -> Result<()> {
    ensure!(
        hourly.len() == HOURS_PER_YEAR,
        "Expected {HOURS_PER_YEAR} hourly values for region {region_id}, found {}",
        hourly.len()
    );

    let hourly_total: f64 = hourly.iter().sum();
    let tolerance = ENERGY_CONSERVATION_TOLERANCE * total.abs().max(hourly_total.abs());
    ensure!(
        (hourly_total - total).abs() <= tolerance,
        "Energy not conserved for region {region_id}: disaggregated {total}, \
        but hourly values sum to {hourly_total}"
    );

    Ok(())
}
