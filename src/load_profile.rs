//! Load profiles describe how energy use is distributed across the hours of a year.
//!
//! A profile is defined by a daily shape (the fraction of a day's energy used in each hour) which
//! is spread uniformly across every day of the year to give a year shape of 365 × 24 fractions
//! summing to one. Multiplying an annual total by the year shape gives hourly demand.
use crate::id::{define_id_getter, define_id_type};
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Number of hours in a day
pub const HOURS_PER_DAY: usize = 24;

/// Number of days in a (modelled) year
pub const DAYS_PER_YEAR: usize = 365;

/// Number of hours in a (modelled) year
pub const HOURS_PER_YEAR: usize = HOURS_PER_DAY * DAYS_PER_YEAR;

define_id_type! {LoadProfileID}

/// A map of [`LoadProfile`]s, keyed by name
pub type LoadProfileMap = IndexMap<LoadProfileID, LoadProfile>;

/// The fraction of a day's energy used in each hour
pub type DailyShape = [f64; HOURS_PER_DAY];

/// The fraction of a year's energy used in each hour of each day.
///
/// Stored day-major, i.e. `self.0[day][hour]`.
#[derive(Debug, Clone, PartialEq)]
pub struct YearShape(Vec<DailyShape>);

impl YearShape {
    /// Create a year shape by evaluating `f(day, hour)` for every hour of the year
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        Self(
            (0..DAYS_PER_YEAR)
                .map(|day| std::array::from_fn(|hour| f(day, hour)))
                .collect(),
        )
    }

    /// A year shape where every hour carries the same fraction of energy
    pub fn flat() -> Self {
        Self::from_fn(|_, _| 1.0 / HOURS_PER_YEAR as f64)
    }

    /// Get the fraction for the given day and hour
    pub fn get(&self, day: usize, hour: usize) -> f64 {
        self.0[day][hour]
    }

    /// Iterate over the fractions for every hour of the year, day-major
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().flatten().copied()
    }

    /// The sum of all fractions (one for a well-formed shape)
    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Linearly interpolate towards `end` by `fraction`, elementwise.
    ///
    /// Gives `self + (end - self) * fraction`.
    pub fn interpolate(&self, end: &YearShape, fraction: f64) -> Self {
        Self::from_fn(|day, hour| {
            let start = self.get(day, hour);
            start + (end.get(day, hour) - start) * fraction
        })
    }

    /// Multiply every fraction by `total`, giving one value per hour of the year (day-major)
    pub fn scale(&self, total: f64) -> Vec<f64> {
        self.iter().map(|fraction| total * fraction).collect()
    }
}

/// A named load profile for a reference year
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProfile {
    /// The name of the profile (e.g. "av_lp_2015")
    pub id: LoadProfileID,
    /// The reference year of the profile
    pub year: u32,
    /// Fraction of annual energy for each day of the year
    pub shape_yd: Vec<f64>,
    /// Fraction of annual energy for each hour of each day
    pub shape_yh: YearShape,
}
define_id_getter! {LoadProfile, LoadProfileID}

impl LoadProfile {
    /// Create a load profile which uses the same daily shape for every day of the year.
    ///
    /// # Arguments
    ///
    /// * `id` - Name of the profile
    /// * `year` - Reference year of the profile
    /// * `shape_dh` - Fraction of daily energy for each hour of the day
    pub fn from_daily_shape(id: LoadProfileID, year: u32, shape_dh: &DailyShape) -> Self {
        let shape_yd = vec![1.0 / DAYS_PER_YEAR as f64; DAYS_PER_YEAR];
        let shape_yh = YearShape::from_fn(|day, hour| shape_yd[day] * shape_dh[hour]);

        Self {
            id,
            year,
            shape_yd,
            shape_yh,
        }
    }
}

/// Get the reference year of a load profile from its name.
///
/// The year is given by the last four characters of the name (e.g. `av_lp_2015` → 2015).
pub fn year_from_profile_name(name: &str) -> Result<u32> {
    let year = name
        .len()
        .checked_sub(4)
        .and_then(|start| name.get(start..))
        .and_then(|s| s.parse().ok())
        .with_context(|| format!("Load profile name '{name}' does not end with a year"))?;

    Ok(year)
}

/// Look up a load profile by name
pub fn get_load_profile<'a>(profiles: &'a LoadProfileMap, name: &str) -> Result<&'a LoadProfile> {
    profiles
        .get(name)
        .with_context(|| format!("Load profile {name} not found"))
}
