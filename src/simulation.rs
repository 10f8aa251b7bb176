//! Functionality for running the simulation.
use crate::model::Model;
use crate::output::DataWriter;
use crate::sector_model::SectorModel;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Run the simulation.
///
/// The sector model is run for each milestone year in turn and the results are written to CSV
/// files in `output_path`.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    let sector_model = SectorModel::from_model(model)?;
    let mut writer = DataWriter::create(output_path)?;

    for year in model.iter_years() {
        info!("Milestone year: {year}");

        let outputs = sector_model
            .simulate(model, year)
            .with_context(|| format!("Simulation failed for milestone year {year}"))?;
        for (region_id, capacity) in &outputs.v2g_capacity {
            info!("V2G capacity for region {region_id}: {capacity} kWh");
        }

        writer.write(year, &outputs)?;
    }

    writer.flush()?;

    Ok(())
}
