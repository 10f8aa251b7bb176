//! The model represents the static input data provided by the user.
use crate::data_handle::{DataHandle, IntervalArray};
use crate::input::interval::read_timestep_data;
use crate::input::load_profile::read_load_profiles;
use crate::input::region::read_regions;
use crate::load_profile::LoadProfileMap;
use crate::region::{RegionID, RegionMap};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Regions for the simulation
    pub regions: RegionMap,
    /// IDs of all regions, in the same order as [`Model::regions`]
    pub region_ids: Vec<RegionID>,
    /// The base-year and end-year load profiles
    pub load_profiles: LoadProfileMap,
    /// Hourly per-region data, keyed by name (e.g. "trips")
    pub timestep_data: HashMap<String, IntervalArray>,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The loaded model or an error if any of the input files are missing or invalid.
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ModelParameters::from_path(model_dir)?;
        let regions = read_regions(model_dir)?;
        let load_profiles = read_load_profiles(
            model_dir,
            [&parameters.base_profile, &parameters.end_profile],
        )?;
        let timestep_data = read_timestep_data(model_dir, &regions)?;
        let region_ids = regions.keys().cloned().collect();

        Ok(Model {
            parameters,
            regions,
            region_ids,
            load_profiles,
            timestep_data,
        })
    }

    /// Iterate over the model's milestone years.
    pub fn iter_years(&self) -> impl Iterator<Item = u32> + '_ {
        self.parameters.milestone_years.iter().copied()
    }
}

impl DataHandle for Model {
    fn region_names(&self) -> &[RegionID] {
        &self.region_ids
    }

    fn get_timestep_data(&self, name: &str) -> Result<IntervalArray> {
        self.timestep_data
            .get(name)
            .cloned()
            .with_context(|| format!("No timestep data named {name}"))
    }

    fn get_parameter(&self, name: &str) -> Result<f64> {
        self.parameters
            .parameters
            .get(name)
            .copied()
            .with_context(|| format!("No parameter named {name}"))
    }
}
