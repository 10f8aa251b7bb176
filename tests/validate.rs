//! Integration tests for the `validate` command.
use evflex::cli::handle_validate_command;
use evflex::log::is_logger_initialised;
use evflex::settings::Settings;
use std::path::PathBuf;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/simple")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("EVFLEX_LOG_LEVEL", "off") };

    assert!(!is_logger_initialised());

    handle_validate_command(&get_model_dir(), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());
}
