//! Common functionality for evflex, a sector model for electric vehicle flexibility and charging
//! load profiles.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod data_handle;
pub mod diffusion;
pub mod disaggregation;
pub mod id;
pub mod input;
pub mod load_profile;
pub mod log;
pub mod model;
pub mod output;
pub mod region;
pub mod sector_model;
pub mod settings;
pub mod simulation;
pub mod units;
pub mod v2g;

#[cfg(test)]
mod fixture;

/// Get the path to the folder where program configuration files are stored.
///
/// Falls back to the current directory if the user's config folder cannot be determined.
pub fn get_evflex_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("evflex");

    path
}
