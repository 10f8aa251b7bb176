//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::data_handle::{YR_UNTIL_CHANGED_PARAMETER, parameter_as_year};
use crate::diffusion::DiffusionMethod;
use crate::input::{input_err_msg, is_sorted_and_unique, read_toml};
use crate::load_profile::{LoadProfileID, year_from_profile_name};
use crate::v2g::V2GAssumptions;
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_id_param_default {
    ($name:ident, $value: expr) => {
        fn $name() -> LoadProfileID {
            LoadProfileID::new($value)
        }
    };
}

define_id_param_default!(default_base_profile, "av_lp_2015");
define_id_param_default!(default_end_profile, "av_lp_2050");

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Milestone years
    pub milestone_years: Vec<u32>,
    /// The base year of the simulation, in which the base-year load profile applies
    pub base_year: u32,
    /// How load profiles change between the base year and `yr_until_changed`
    #[serde(default)]
    pub diffusion: DiffusionMethod,
    /// Name of the load profile used in the base year
    #[serde(default = "default_base_profile")]
    pub base_profile: LoadProfileID,
    /// Name of the load profile used once the change in charging behaviour is complete
    #[serde(default = "default_end_profile")]
    pub end_profile: LoadProfileID,
    /// Assumptions about the EV fleet for V2G capacity estimation
    #[serde(default)]
    pub v2g: V2GAssumptions,
    /// Named scalar parameters (e.g. `yr_until_changed`)
    #[serde(default)]
    pub parameters: HashMap<String, f64>,
}

/// Check that the `milestone_years` parameter is valid
fn check_milestone_years(years: &[u32], base_year: u32) -> Result<()> {
    ensure!(!years.is_empty(), "`milestone_years` is empty");

    ensure!(
        is_sorted_and_unique(years),
        "`milestone_years` must be composed of unique values in order"
    );

    ensure!(
        years[0] >= base_year,
        "`milestone_years` cannot be before `base_year` ({base_year})"
    );

    Ok(())
}

/// Check that the `yr_until_changed` parameter is present and valid
fn check_yr_until_changed(parameters: &HashMap<String, f64>, base_year: u32) -> Result<()> {
    let value = *parameters
        .get(YR_UNTIL_CHANGED_PARAMETER)
        .with_context(|| format!("Missing parameter: {YR_UNTIL_CHANGED_PARAMETER}"))?;
    let yr_until_changed = parameter_as_year(YR_UNTIL_CHANGED_PARAMETER, value)?;
    ensure!(
        yr_until_changed >= base_year,
        "{YR_UNTIL_CHANGED_PARAMETER} ({yr_until_changed}) cannot be before `base_year` \
        ({base_year})"
    );

    Ok(())
}

/// Check that all parameter values are finite numbers
fn check_parameters_finite(parameters: &HashMap<String, f64>) -> Result<()> {
    for (name, value) in parameters {
        ensure!(
            value.is_finite(),
            "Parameter {name} must be a finite number"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // milestone_years
        check_milestone_years(&self.milestone_years, self.base_year)?;

        // diffusion
        if self.diffusion == DiffusionMethod::Sigmoid {
            warn!(
                "The diffusion method is set to 'sigmoid', which is not yet implemented. \
                Simulating any year between the base year and {YR_UNTIL_CHANGED_PARAMETER} \
                will fail."
            );
        }

        // base_profile and end_profile
        for id in [&self.base_profile, &self.end_profile] {
            year_from_profile_name(&id.0)?;
        }

        // v2g already validated during deserialisation

        // parameters
        check_parameters_finite(&self.parameters)?;
        check_yr_until_changed(&self.parameters, self.base_year)?;

        Ok(())
    }
}
