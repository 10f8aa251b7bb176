//! Integration tests for the `run` command.
use evflex::cli::{RunOpts, handle_run_command};
use evflex::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("EVFLEX_LOG_LEVEL", "off") };

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(&get_model_dir(), &opts, Some(Settings::default())).unwrap();

    for file_name in [
        "v2g_capacity.csv",
        "electricity_demand.csv",
        "evflex_info.log",
        "evflex_error.log",
    ] {
        assert!(output_dir.join(file_name).is_file());
    }
    let contents = fs::read_to_string(output_dir.join("v2g_capacity.csv")).unwrap();
    assert!(contents.starts_with("milestone_year,region_id,capacity\n"));

    // Second time will fail because the output folder isn't empty
    let error = handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
        .unwrap_err()
        .chain()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(
        error,
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    );

    // With --overwrite, it will fail because the logging is already initialised
    let opts = RunOpts {
        output_dir: Some(output_dir),
        overwrite: true,
    };
    assert_eq!(
        handle_run_command(&get_model_dir(), &opts, Some(Settings::default()))
            .unwrap_err()
            .chain()
            .next()
            .unwrap()
            .to_string(),
        "Failed to initialise logging."
    );
}
