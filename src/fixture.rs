//! Fixtures for tests

use crate::load_profile::{HOURS_PER_DAY, LoadProfile, YearShape};
use crate::region::{Region, RegionID, RegionMap};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn region_ids() -> Vec<RegionID> {
    vec!["GBR".into(), "USA".into()]
}

#[fixture]
pub fn regions(region_ids: Vec<RegionID>) -> RegionMap {
    region_ids
        .into_iter()
        .map(|id| {
            let region = Region {
                id: id.clone(),
                description: format!("Region {id}"),
            };
            (id, region)
        })
        .collect()
}

/// A profile spreading energy evenly over every hour of the year
#[fixture]
pub fn base_profile() -> LoadProfile {
    LoadProfile {
        id: "av_lp_2015".into(),
        year: 2015,
        shape_yd: vec![1.0 / 365.0; 365],
        shape_yh: YearShape::flat(),
    }
}

/// A profile where the energy used in each hour of the day is proportional to the hour
#[fixture]
pub fn end_profile() -> LoadProfile {
    let total: f64 = (0..HOURS_PER_DAY).map(|hour| hour as f64).sum();
    let shape_dh = std::array::from_fn(|hour| hour as f64 / total);
    LoadProfile::from_daily_shape("av_lp_2050".into(), 2050, &shape_dh)
}
