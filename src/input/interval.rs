//! Code for reading hourly per-region data (e.g. trips and electricity demand) from CSV files.
use super::*;
use crate::data_handle::{ELECTRICITY_DATA_NAME, IntervalArray, TRIPS_DATA_NAME};
use crate::load_profile::HOURS_PER_DAY;
use crate::region::RegionMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A single value for a region and hour of the day, as read from a CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct IntervalValueRaw {
    region_id: String,
    hour: usize,
    value: f64,
}

/// Read all arrays of per-timestep data from the model directory.
///
/// For each array (e.g. "trips") the data are read from a CSV file of the same name (e.g.
/// `trips.csv`).
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `regions` - All regions in the model
///
/// # Returns
///
/// A map of arrays keyed by name
pub fn read_timestep_data(
    model_dir: &Path,
    regions: &RegionMap,
) -> Result<HashMap<String, IntervalArray>> {
    [TRIPS_DATA_NAME, ELECTRICITY_DATA_NAME]
        .into_iter()
        .map(|name| {
            let file_path = model_dir.join(format!("{name}.csv"));
            let array = read_interval_array(&file_path, regions)?;
            Ok((name.to_string(), array))
        })
        .collect()
}

/// Read an array of hourly values for each region from the specified CSV file
fn read_interval_array(file_path: &Path, regions: &RegionMap) -> Result<IntervalArray> {
    let values = read_csv(file_path)?;
    read_interval_array_from_iter(values, regions).with_context(|| input_err_msg(file_path))
}

/// Read an array of hourly values for each region from an iterator.
///
/// Every region must have exactly one value for every hour of the day. Values must be finite and
/// non-negative.
fn read_interval_array_from_iter<I>(iter: I, regions: &RegionMap) -> Result<IntervalArray>
where
    I: Iterator<Item = IntervalValueRaw>,
{
    let mut array = vec![vec![None; HOURS_PER_DAY]; regions.len()];
    for raw in iter {
        let (row, region_id, _) = regions
            .get_full(raw.region_id.as_str())
            .with_context(|| format!("Unknown ID {} found", raw.region_id))?;
        ensure!(
            raw.hour < HOURS_PER_DAY,
            "Invalid hour {} for region {region_id}: must be between 0 and {}",
            raw.hour,
            HOURS_PER_DAY - 1
        );
        ensure!(
            raw.value.is_finite() && raw.value >= 0.0,
            "Invalid value for region {region_id}, hour {}: must be a non-negative number",
            raw.hour
        );
        ensure!(
            array[row][raw.hour].replace(raw.value).is_none(),
            "Duplicate entry for region {region_id}, hour {}",
            raw.hour
        );
    }

    regions
        .keys()
        .zip(array)
        .map(|(region_id, row)| {
            row.into_iter()
                .enumerate()
                .map(|(hour, value)| {
                    value.with_context(|| {
                        format!("Missing value for region {region_id}, hour {hour}")
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, regions};
    use itertools::iproduct;
    use rstest::rstest;
    use std::fs;
    use tempfile::tempdir;

    /// A value for every region and hour, equal to `10 * row + hour`
    fn complete_values(regions: &RegionMap) -> Vec<IntervalValueRaw> {
        iproduct!(regions.keys().enumerate(), 0..HOURS_PER_DAY)
            .map(|((row, region_id), hour)| IntervalValueRaw {
                region_id: region_id.to_string(),
                hour,
                value: (10 * row + hour) as f64,
            })
            .collect()
    }

    #[rstest]
    fn test_read_interval_array_from_iter(regions: RegionMap) {
        // Order of the input rows shouldn't matter
        let mut values = complete_values(&regions);
        values.reverse();

        let array = read_interval_array_from_iter(values.into_iter(), &regions).unwrap();
        assert_eq!(array.len(), regions.len());
        for (row, values) in array.iter().enumerate() {
            assert_eq!(values.len(), HOURS_PER_DAY);
            assert_eq!(values[3], (10 * row + 3) as f64);
        }
    }

    #[rstest]
    fn test_read_interval_array_from_iter_missing(regions: RegionMap) {
        let mut values = complete_values(&regions);
        values.retain(|raw| !(raw.region_id == "GBR" && raw.hour == 7));
        assert_error!(
            read_interval_array_from_iter(values.into_iter(), &regions),
            "Missing value for region GBR, hour 7"
        );
    }

    #[rstest]
    fn test_read_interval_array_from_iter_duplicate(regions: RegionMap) {
        let mut values = complete_values(&regions);
        values.push(IntervalValueRaw {
            region_id: "GBR".into(),
            hour: 0,
            value: 1.0,
        });
        assert_error!(
            read_interval_array_from_iter(values.into_iter(), &regions),
            "Duplicate entry for region GBR, hour 0"
        );
    }

    #[rstest]
    #[case("FRA", 0, 1.0, "Unknown ID FRA found")]
    #[case("GBR", 24, 1.0, "Invalid hour 24 for region GBR: must be between 0 and 23")]
    #[case(
        "GBR",
        2,
        -1.0,
        "Invalid value for region GBR, hour 2: must be a non-negative number"
    )]
    #[case(
        "GBR",
        2,
        f64::NAN,
        "Invalid value for region GBR, hour 2: must be a non-negative number"
    )]
    fn test_read_interval_array_from_iter_invalid(
        regions: RegionMap,
        #[case] region_id: &str,
        #[case] hour: usize,
        #[case] value: f64,
        #[case] msg: &str,
    ) {
        let raw = IntervalValueRaw {
            region_id: region_id.into(),
            hour,
            value,
        };
        assert_error!(
            read_interval_array_from_iter(std::iter::once(raw), &regions),
            msg
        );
    }

    #[rstest]
    fn test_read_timestep_data(regions: RegionMap) {
        let dir = tempdir().unwrap();
        let mut contents = "region_id,hour,value\n".to_string();
        for raw in complete_values(&regions) {
            contents.push_str(&format!("{},{},{}\n", raw.region_id, raw.hour, raw.value));
        }
        fs::write(dir.path().join("trips.csv"), &contents).unwrap();

        // Electricity file missing
        assert!(read_timestep_data(dir.path(), &regions).is_err());

        fs::write(dir.path().join("electricity.csv"), &contents).unwrap();
        let data = read_timestep_data(dir.path(), &regions).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[TRIPS_DATA_NAME], data[ELECTRICITY_DATA_NAME]);
        assert_eq!(data[TRIPS_DATA_NAME][1][23], 33.0);
    }
}
