//! Code related to the example models and the CLI commands for interacting with them.
use super::{RunOpts, handle_run_command};
use crate::settings::Settings;
use anyhow::{Context, Result, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the example models.
static EXAMPLES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/demos");

/// The available subcommands for managing example models.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available examples.
    List,
    /// Provide information about the specified example.
    Info {
        /// The name of the example.
        name: String,
    },
    /// Extract an example model configuration to a new directory.
    Extract {
        /// The name of the example to extract.
        name: String,
        /// The destination folder for the example.
        new_path: Option<PathBuf>,
    },
    /// Run an example.
    Run {
        /// The name of the example to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run { name, opts } => handle_example_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// Get the names of all the bundled example models
pub fn example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES_DIR
        .dirs()
        .filter_map(|dir| dir.path().file_name()?.to_str())
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for name in example_names() {
        println!("{name}");
    }
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    println!("{}", example_readme(name)?);

    Ok(())
}

/// Get the contents of the README file for the given example
fn example_readme(name: &str) -> Result<&'static str> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    EXAMPLES_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified example to a new directory
fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in EXAMPLES_DIR whose name matches `name`.
    let sub_dir = EXAMPLES_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    extract_dir(sub_dir, sub_dir.path(), new_path)
}

/// Copy the contents of `dir` into `dest`, including subdirectories (e.g. load profiles).
///
/// Paths of embedded entries are given relative to the root of [`EXAMPLES_DIR`], so `root` is
/// stripped from each of them.
fn extract_dir(dir: &Dir, root: &Path, dest: &Path) -> Result<()> {
    let dir_path = dest.join(dir.path().strip_prefix(root)?);
    fs::create_dir_all(&dir_path)?;

    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub_dir) => extract_dir(sub_dir, root, dest)?,
            DirEntry::File(f) => {
                let file_path = dest.join(f.path().strip_prefix(root)?);
                fs::write(&file_path, f.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(name);
    extract_example(name, &model_path)?;
    handle_run_command(&model_path, opts, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::input::load_model;
    use itertools::Itertools;
    use tempfile::tempdir;

    #[test]
    fn test_example_names() {
        assert!(example_names().contains(&"simple"));
    }

    #[test]
    fn test_example_readme() {
        assert!(!example_readme("simple").unwrap().is_empty());
        assert_error!(example_readme("missing"), "Example not found.");
    }

    #[test]
    fn test_extract_example() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("simple");
        extract_example("simple", &dest).unwrap();
        assert!(dest.join("model.toml").is_file());
        assert!(dest.join("load_profiles").join("av_lp_2015.csv").is_file());

        // Extracted model should be valid
        load_model(&dest).unwrap();

        // Can't extract over an existing folder
        assert!(extract_example("simple", &dest).is_err());
    }

    #[test]
    fn test_extract_example_missing() {
        let dir = tempdir().unwrap();
        assert_error!(
            extract_example("missing", &dir.path().join("missing")),
            "Example not found."
        );
    }

    #[test]
    fn test_all_examples_valid() {
        for name in example_names() {
            let dir = tempdir().unwrap();
            let dest = dir.path().join(name);
            extract_example(name, &dest).unwrap();
            load_model(&dest).unwrap();
        }
    }
}
