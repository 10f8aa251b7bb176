//! Code for reading load profiles from CSV files.
use super::*;
use crate::load_profile::{
    DailyShape, HOURS_PER_DAY, LoadProfile, LoadProfileID, LoadProfileMap, year_from_profile_name,
};
use anyhow::bail;
use std::path::Path;

/// The folder within the model directory containing load profile files
const LOAD_PROFILES_DIR_NAME: &str = "load_profiles";

/// Read the named load profiles from the model directory.
///
/// Each profile is read from `load_profiles/<name>.csv`.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `names` - Names of the load profiles to read
pub fn read_load_profiles<'a, I>(model_dir: &Path, names: I) -> Result<LoadProfileMap>
where
    I: IntoIterator<Item = &'a LoadProfileID>,
{
    let dir_path = model_dir.join(LOAD_PROFILES_DIR_NAME);
    let mut profiles = LoadProfileMap::new();
    for id in names {
        if profiles.contains_key(id) {
            continue;
        }

        let file_path = dir_path.join(format!("{id}.csv"));
        let profile =
            read_load_profile(&file_path, id).with_context(|| input_err_msg(&file_path))?;
        profiles.insert(id.clone(), profile);
    }

    Ok(profiles)
}

/// Read a single load profile from the specified CSV file
fn read_load_profile(file_path: &Path, id: &LoadProfileID) -> Result<LoadProfile> {
    let year = year_from_profile_name(&id.0)?;
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    let shape_dh = read_daily_shape(reader)?;

    Ok(LoadProfile::from_daily_shape(id.clone(), year, &shape_dh))
}

/// Read a daily load shape from CSV data.
///
/// The header row gives the hour of the day (0 to 23) for each column and there must be a single
/// row of data, giving the percentage of the day's energy used in each hour. The percentages are
/// converted to fractions, which must sum to one.
fn read_daily_shape<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<DailyShape> {
    let hours: Vec<usize> = reader
        .headers()?
        .iter()
        .map(|header| {
            header
                .parse()
                .ok()
                .filter(|hour| *hour < HOURS_PER_DAY)
                .with_context(|| format!("Invalid hour of day in header: '{header}'"))
        })
        .try_collect()?;
    ensure!(
        hours.len() == HOURS_PER_DAY && hours.iter().all_unique(),
        "Header must contain each hour of the day (0 to {}) exactly once",
        HOURS_PER_DAY - 1
    );

    let mut records = reader.records();
    let Some(record) = records.next() else {
        bail!("No load profile data found");
    };
    let record = record?;
    ensure!(
        records.next().is_none(),
        "Load profile must contain a single row of data"
    );

    let mut shape_dh = [0.0; HOURS_PER_DAY];
    for (hour, field) in hours.into_iter().zip(record.iter()) {
        let percentage: f64 = field
            .parse()
            .with_context(|| format!("Invalid value for hour {hour}: '{field}'"))?;
        ensure!(
            percentage.is_finite() && percentage >= 0.0,
            "Value for hour {hour} must be a non-negative number"
        );
        shape_dh[hour] = percentage / 100.0;
    }

    check_fractions_sum_to_one(shape_dh.iter().copied())
        .context("Load profile percentages must sum to 100")?;

    // Remove rounding errors from the input data so that disaggregation conserves energy
    let total: f64 = shape_dh.iter().sum();
    for fraction in &mut shape_dh {
        *fraction /= total;
    }

    Ok(shape_dh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use std::fs;
    use tempfile::tempdir;

    fn reader(contents: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes())
    }

    /// A header row with hours in order and a row with the given percentages
    fn profile_csv(percentages: &[f64]) -> String {
        format!(
            "{}\n{}\n",
            (0..HOURS_PER_DAY).join(","),
            percentages.iter().join(",")
        )
    }

    #[test]
    fn test_read_daily_shape() {
        let mut percentages = vec![0.0; HOURS_PER_DAY];
        percentages[8] = 40.0;
        percentages[18] = 60.0;
        let shape = read_daily_shape(reader(&profile_csv(&percentages))).unwrap();
        assert_approx_eq!(f64, shape[8], 0.4);
        assert_approx_eq!(f64, shape[18], 0.6);
        assert_eq!(shape[0], 0.0);
    }

    #[test]
    fn test_read_daily_shape_column_order() {
        // Columns given in reverse order of hours
        let header = (0..HOURS_PER_DAY).rev().join(",");
        let values = (0..HOURS_PER_DAY)
            .map(|i| if i == 0 { "100" } else { "0" })
            .join(",");
        let shape = read_daily_shape(reader(&format!("{header}\n{values}\n"))).unwrap();
        assert_eq!(shape[HOURS_PER_DAY - 1], 1.0);
        assert_eq!(shape[0], 0.0);
    }

    #[test]
    fn test_read_daily_shape_normalised() {
        // Percentages which don't quite sum to 100
        let percentages = vec![100.0 / 24.0 + 1e-8; HOURS_PER_DAY];
        let shape = read_daily_shape(reader(&profile_csv(&percentages))).unwrap();
        let total: f64 = shape.iter().sum();
        assert_approx_eq!(f64, total, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_read_daily_shape_invalid() {
        // Doesn't sum to 100
        let percentages = vec![1.0; HOURS_PER_DAY];
        assert_error!(
            read_daily_shape(reader(&profile_csv(&percentages))),
            "Load profile percentages must sum to 100"
        );

        // Negative value
        let mut percentages = vec![0.0; HOURS_PER_DAY];
        percentages[0] = 110.0;
        percentages[1] = -10.0;
        assert_error!(
            read_daily_shape(reader(&profile_csv(&percentages))),
            "Value for hour 1 must be a non-negative number"
        );

        // Bad header
        let csv = format!("{},24\n", (0..23).join(","));
        assert_error!(
            read_daily_shape(reader(&csv)),
            "Invalid hour of day in header: '24'"
        );

        // Missing hour
        let csv = format!("{}\n", (0..23).join(","));
        assert_error!(
            read_daily_shape(reader(&csv)),
            "Header must contain each hour of the day (0 to 23) exactly once"
        );

        // No data
        let csv = format!("{}\n", (0..HOURS_PER_DAY).join(","));
        assert_error!(read_daily_shape(reader(&csv)), "No load profile data found");

        // Too much data
        let percentages = vec![100.0 / 24.0; HOURS_PER_DAY];
        let csv = format!(
            "{}{}\n",
            profile_csv(&percentages),
            percentages.iter().join(",")
        );
        assert_error!(
            read_daily_shape(reader(&csv)),
            "Load profile must contain a single row of data"
        );
    }

    #[test]
    fn test_read_load_profiles() {
        let dir = tempdir().unwrap();
        let profiles_dir = dir.path().join(LOAD_PROFILES_DIR_NAME);
        fs::create_dir(&profiles_dir).unwrap();
        let percentages = vec![100.0 / 24.0; HOURS_PER_DAY];
        for name in ["av_lp_2015", "av_lp_2050"] {
            fs::write(
                profiles_dir.join(format!("{name}.csv")),
                profile_csv(&percentages),
            )
            .unwrap();
        }

        let ids: [LoadProfileID; 3] = [
            "av_lp_2015".into(),
            "av_lp_2050".into(),
            "av_lp_2015".into(),
        ];
        let profiles = read_load_profiles(dir.path(), &ids).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles["av_lp_2015"].year, 2015);
        assert_eq!(profiles["av_lp_2050"].year, 2050);
        assert_approx_eq!(f64, profiles["av_lp_2050"].shape_yh.sum(), 1.0, epsilon = 1e-9);

        // Missing file
        assert!(read_load_profiles(dir.path(), &["av_lp_2030".into()]).is_err());
    }
}
