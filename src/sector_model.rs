//! The electric-transport sector model.
//!
//! For each simulated year, the model estimates the battery capacity EVs can offer for V2G/G2V
//! in every region and disaggregates each region's electricity demand onto an hourly load profile
//! for the year. All inputs which vary between runs are obtained through a [`DataHandle`].
use crate::data_handle::{
    DataHandle, ELECTRICITY_DATA_NAME, TRIPS_DATA_NAME, YR_UNTIL_CHANGED_PARAMETER,
    parameter_as_year,
};
use crate::diffusion::DiffusionMethod;
use crate::disaggregation::{RegionHourlyDemandMap, check_energy_conserved, disaggregate};
use crate::load_profile::{LoadProfile, LoadProfileMap, get_load_profile};
use crate::model::Model;
use crate::v2g::{RegionCapacityMap, V2GAssumptions, estimate_v2g_capacity};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{debug, info};

/// The results of simulating a single year
#[derive(Debug, PartialEq)]
pub struct SectorModelOutputs {
    /// Flexible battery capacity (kWh) available for V2G/G2V in each region
    pub v2g_capacity: RegionCapacityMap,
    /// Electricity demand (kWh) for every hour of the year in each region
    pub electricity_yh: RegionHourlyDemandMap,
}

/// Configuration for the sector model which is fixed for the whole run
#[derive(Debug, Clone)]
pub struct SectorModel {
    base_year: u32,
    diffusion: DiffusionMethod,
    v2g: V2GAssumptions,
    base_profile: LoadProfile,
    end_profile: LoadProfile,
}

impl SectorModel {
    /// Create a new sector model.
    ///
    /// # Arguments
    ///
    /// * `base_year` - Base year of the simulation
    /// * `diffusion` - How to diffuse between the base-year and end-year load profiles
    /// * `v2g` - Assumptions about the EV fleet
    /// * `base_profile` - Load profile for the base year
    /// * `end_profile` - Load profile once the change in charging behaviour is complete
    pub fn new(
        base_year: u32,
        diffusion: DiffusionMethod,
        v2g: V2GAssumptions,
        base_profile: LoadProfile,
        end_profile: LoadProfile,
    ) -> Self {
        Self {
            base_year,
            diffusion,
            v2g,
            base_profile,
            end_profile,
        }
    }

    /// Create a sector model from the parameters and load profiles of a model.
    pub fn from_model(model: &Model) -> Result<Self> {
        let params = &model.parameters;
        Self::with_profiles(
            params.base_year,
            params.diffusion,
            params.v2g.clone(),
            &model.load_profiles,
            &params.base_profile.0,
            &params.end_profile.0,
        )
    }

    /// Create a sector model, looking up the named profiles in `profiles`.
    pub fn with_profiles(
        base_year: u32,
        diffusion: DiffusionMethod,
        v2g: V2GAssumptions,
        profiles: &LoadProfileMap,
        base_profile: &str,
        end_profile: &str,
    ) -> Result<Self> {
        let base_profile = get_load_profile(profiles, base_profile)?.clone();
        let end_profile = get_load_profile(profiles, end_profile)?.clone();

        Ok(Self::new(
            base_year,
            diffusion,
            v2g,
            base_profile,
            end_profile,
        ))
    }

    /// Simulate the given year.
    ///
    /// # Arguments
    ///
    /// * `data` - Provides the regions, hourly trip and electricity data and parameters
    /// * `year` - The year to simulate
    ///
    /// # Returns
    ///
    /// V2G capacity and hourly electricity demand for every region, or an error if any of the
    /// required inputs are missing or invalid.
    pub fn simulate(&self, data: &impl DataHandle, year: u32) -> Result<SectorModelOutputs> {
        let regions = data.region_names();
        let trips = data.get_timestep_data(TRIPS_DATA_NAME)?;
        let electricity = data.get_timestep_data(ELECTRICITY_DATA_NAME)?;

        info!("Estimating V2G capacity for {year}");
        let v2g_capacity = estimate_v2g_capacity(regions, &trips, &electricity, &self.v2g)
            .context("Failed to estimate V2G capacity")?;

        let yr_until_changed = parameter_as_year(
            YR_UNTIL_CHANGED_PARAMETER,
            data.get_parameter(YR_UNTIL_CHANGED_PARAMETER)?,
        )?;
        ensure!(
            yr_until_changed >= self.base_year,
            "{YR_UNTIL_CHANGED_PARAMETER} ({yr_until_changed}) cannot be before the base year \
            ({})",
            self.base_year
        );

        ensure!(
            electricity.len() == regions.len(),
            "Expected electricity data for {} regions (found {})",
            regions.len(),
            electricity.len()
        );
        let demand_by_region: IndexMap<_, _> = regions.iter().cloned().zip(electricity).collect();

        info!("Disaggregating electricity demand for {year}");
        let electricity_yh = disaggregate(
            year,
            self.base_year,
            yr_until_changed,
            &demand_by_region,
            &self.base_profile,
            &self.end_profile,
            regions,
            self.diffusion,
        )
        .context("Failed to disaggregate electricity demand")?;

        for (region_id, hourly) in &electricity_yh {
            let total: f64 = demand_by_region[region_id].iter().sum();
            check_energy_conserved(region_id, total, hourly)?;
            debug!("Electricity demand for region {region_id} in {year}: {total} kWh");
        }

        Ok(SectorModelOutputs {
            v2g_capacity,
            electricity_yh,
        })
    }
}
