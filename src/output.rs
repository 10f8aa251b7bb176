//! The module responsible for writing output data to disk.
use crate::region::RegionID;
use crate::sector_model::SectorModelOutputs;
use crate::units::Energy;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "evflex_results";

/// The output file name for V2G capacity
const V2G_CAPACITY_FILE_NAME: &str = "v2g_capacity.csv";

/// The output file name for hourly electricity demand
const ELECTRICITY_DEMAND_FILE_NAME: &str = "electricity_demand.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // The model name is the name of the model folder
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model.
///
/// If the directory already exists and is not empty, its contents are deleted if
/// `allow_overwrite` is true, otherwise an error is returned.
///
/// # Returns
///
/// Whether an existing directory was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the V2G capacity CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct V2GCapacityRow {
    milestone_year: u32,
    region_id: RegionID,
    capacity: Energy,
}

/// Represents a row in the electricity demand CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ElectricityDemandRow {
    milestone_year: u32,
    region_id: RegionID,
    hour: usize,
    demand: f64,
}

/// An object for writing the results of the sector model to file
pub struct DataWriter {
    v2g_capacity_writer: csv::Writer<File>,
    electricity_demand_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            v2g_capacity_writer: new_writer(V2G_CAPACITY_FILE_NAME)?,
            electricity_demand_writer: new_writer(ELECTRICITY_DEMAND_FILE_NAME)?,
        })
    }

    /// Write the results for one milestone year
    pub fn write(&mut self, milestone_year: u32, outputs: &SectorModelOutputs) -> Result<()> {
        for (region_id, capacity) in &outputs.v2g_capacity {
            let row = V2GCapacityRow {
                milestone_year,
                region_id: region_id.clone(),
                capacity: *capacity,
            };
            self.v2g_capacity_writer.serialize(row)?;
        }

        for (region_id, hourly) in &outputs.electricity_yh {
            for (hour, demand) in hourly.iter().enumerate() {
                let row = ElectricityDemandRow {
                    milestone_year,
                    region_id: region_id.clone(),
                    hour,
                    demand: *demand,
                };
                self.electricity_demand_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.v2g_capacity_writer.flush()?;
        self.electricity_demand_writer.flush()?;

        Ok(())
    }
}
