//! Estimation of the battery capacity electric vehicles can offer for vehicle-to-grid (V2G) and
//! grid-to-vehicle (G2V) services.
//!
//! For each region, the number of EVs available is estimated from the trips starting in the hour
//! of peak electricity demand. The battery capacity of these vehicles, less the capacity already
//! used at the peak hour or reserved for their average state of charge, is the capacity which can
//! be used flexibly.
use crate::input::{deserialise_non_negative, deserialise_proportion};
use crate::region::RegionID;
use crate::units::{Dimensionless, Energy, EnergyPerVehicle, Vehicles};
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde::Deserialize;

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

define_unit_param_default!(default_nr_ev_per_trip, Dimensionless, 1.0);
define_unit_param_default!(default_v2g_capable_fraction, Dimensionless, 1.0);
define_unit_param_default!(default_average_soc, Dimensionless, 0.5);
define_unit_param_default!(default_battery_capacity, EnergyPerVehicle, 30.0);
define_unit_param_default!(default_safety_margin, Dimensionless, 0.1);

/// V2G capacity per region
pub type RegionCapacityMap = IndexMap<RegionID, Energy>;

/// Assumptions about the EV fleet used when estimating V2G capacity
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct V2GAssumptions {
    /// Number of EVs per trip
    #[serde(default = "default_nr_ev_per_trip")]
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub nr_ev_per_trip: Dimensionless,
    /// Fraction of EVs which are capable of V2G and G2V
    #[serde(default = "default_v2g_capable_fraction")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub v2g_capable_fraction: Dimensionless,
    /// Assumed average state of charge of EVs before the peak hour
    #[serde(default = "default_average_soc")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub average_soc: Dimensionless,
    /// Average usable battery capacity of an EV (kWh)
    #[serde(default = "default_battery_capacity")]
    #[serde(deserialize_with = "deserialise_non_negative")]
    pub battery_capacity: EnergyPerVehicle,
    /// Safety margin, as a fraction of total battery capacity, which must remain charged
    #[serde(default = "default_safety_margin")]
    #[serde(deserialize_with = "deserialise_proportion")]
    pub safety_margin: Dimensionless,
}

impl Default for V2GAssumptions {
    fn default() -> Self {
        Self {
            nr_ev_per_trip: default_nr_ev_per_trip(),
            v2g_capable_fraction: default_v2g_capable_fraction(),
            average_soc: default_average_soc(),
            battery_capacity: default_battery_capacity(),
            safety_margin: default_safety_margin(),
        }
    }
}

/// Find the hour of peak demand and the demand in that hour.
///
/// If the peak occurs in more than one hour, the first is returned. Returns `None` if `values` is
/// empty.
pub fn find_peak(values: &[f64]) -> Option<(usize, f64)> {
    let (first, rest) = values.split_first()?;
    let mut peak = (0, *first);
    for (hour, value) in rest.iter().enumerate() {
        if *value > peak.1 {
            peak = (hour + 1, *value);
        }
    }

    Some(peak)
}

/// Estimate the flexible battery capacity available for V2G/G2V in each region.
///
/// # Arguments
///
/// * `regions` - The regions, in the same order as the rows of the arrays
/// * `reg_trips_24h` - Number of EV trips starting in each region in each hour
/// * `reg_elec_24h` - Electricity demand (kWh) of each region in each hour
/// * `assumptions` - Assumptions about the EV fleet
///
/// # Returns
///
/// The available capacity for each region (never negative) or an error if the arrays don't match
/// the regions.
pub fn estimate_v2g_capacity(
    regions: &[RegionID],
    reg_trips_24h: &[Vec<f64>],
    reg_elec_24h: &[Vec<f64>],
    assumptions: &V2GAssumptions,
) -> Result<RegionCapacityMap> {
    ensure!(
        reg_trips_24h.len() == regions.len() && reg_elec_24h.len() == regions.len(),
        "Expected trip and electricity data for {} regions (found {} and {})",
        regions.len(),
        reg_trips_24h.len(),
        reg_elec_24h.len()
    );

    regions
        .iter()
        .zip(reg_trips_24h.iter().zip(reg_elec_24h))
        .map(|(region_id, (trips, elec))| {
            ensure!(
                !elec.is_empty() && trips.len() == elec.len(),
                "Trip and electricity data for region {region_id} must cover the same, \
                non-zero number of hours (found {} and {})",
                trips.len(),
                elec.len()
            );

            let capacity = estimate_region_capacity(trips, elec, assumptions);
            Ok((region_id.clone(), capacity))
        })
        .collect()
}

/// Estimate the flexible battery capacity for a single region.
///
/// `trips` and `elec` must be non-empty and of equal length.
fn estimate_region_capacity(trips: &[f64], elec: &[f64], assumptions: &V2GAssumptions) -> Energy {
    // 1. Hour of peak electricity demand
    let (peak_hour, peak_demand) = find_peak(elec).unwrap_or_default();
    let peak_demand = Energy(peak_demand);

    // 2. Number of EVs in the peak hour, estimated from the number of trips
    let max_nr_ev = Vehicles(trips[peak_hour]) * assumptions.nr_ev_per_trip;

    // 3. Battery capacity of all vehicles which can do V2G
    let nr_v2g_ev = max_nr_ev * assumptions.v2g_capable_fraction;
    let mut average_demand_per_vehicle = peak_demand / max_nr_ev;
    if !average_demand_per_vehicle.is_finite() {
        // No vehicles on the road at the peak hour
        average_demand_per_vehicle = EnergyPerVehicle(0.0);
    }
    let peak_demand_v2g = average_demand_per_vehicle * nr_v2g_ev;
    let max_capacity_v2g = nr_v2g_ev * assumptions.battery_capacity;

    // 4. Capacity left over for V2G/G2V
    let safety_margin_capacity = max_capacity_v2g * assumptions.safety_margin;
    let used_capacity_incl_margin = peak_demand_v2g + safety_margin_capacity;

    // Used capacity cannot exceed the demand in the peak hour. NB: this means the safety margin
    // never contributes unless it is negative.
    let used_capacity = if used_capacity_incl_margin > peak_demand_v2g {
        peak_demand_v2g
    } else {
        used_capacity_incl_margin
    };

    let average_soc_capacity = max_capacity_v2g * assumptions.average_soc;
    let available = if used_capacity > average_soc_capacity {
        max_capacity_v2g - used_capacity
    } else {
        max_capacity_v2g - average_soc_capacity
    };

    if available > Energy(0.0) {
        available
    } else {
        Energy(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn region_ids(ids: &[&str]) -> Vec<RegionID> {
        ids.iter().map(|id| RegionID::new(id)).collect()
    }

    #[test]
    fn test_estimate_v2g_capacity() {
        let regions = region_ids(&["A", "B", "C"]);
        let trips = vec![vec![0.0, 10.0, 0.0], vec![5.0, 0.0, 5.0], vec![2.0, 2.0, 0.0]];
        let elec = trips.clone();

        let capacity =
            estimate_v2g_capacity(&regions, &trips, &elec, &V2GAssumptions::default()).unwrap();
        assert!(capacity.keys().eq(regions.iter()));
        assert_eq!(
            capacity.values().copied().collect::<Vec<_>>(),
            [Energy(150.0), Energy(75.0), Energy(30.0)]
        );
    }

    #[rstest]
    #[case(&[0.0, 10.0, 0.0], &[0.0, 10.0, 0.0], 150.0)] // Limited by average SOC
    #[case(&[10.0], &[200.0], 100.0)] // Limited by demand at peak hour
    #[case(&[10.0], &[500.0], 0.0)] // Demand exceeds total capacity
    #[case(&[0.0, 0.0], &[3.0, 1.0], 0.0)] // No trips at peak hour
    #[case(&[4.0, 0.0], &[0.0, 0.0], 60.0)] // No demand: peak is first hour
    #[case(&[1.0, 0.0, 9.0], &[5.0, 0.0, 5.0], 15.0)] // Tie broken by first hour
    fn test_estimate_region_capacity(
        #[case] trips: &[f64],
        #[case] elec: &[f64],
        #[case] expected: f64,
    ) {
        let capacity = estimate_region_capacity(trips, elec, &V2GAssumptions::default());
        assert_approx_eq!(Energy, capacity, Energy(expected));
    }

    #[test]
    fn test_estimate_region_capacity_assumptions() {
        let assumptions = V2GAssumptions {
            nr_ev_per_trip: Dimensionless(2.0),
            v2g_capable_fraction: Dimensionless(0.5),
            average_soc: Dimensionless(0.25),
            battery_capacity: EnergyPerVehicle(40.0),
            safety_margin: Dimensionless(0.0),
        };

        // 10 EVs, 5 with V2G, 200 kWh capacity, 50 kWh needed for SOC, 30 kWh used at peak
        let capacity = estimate_region_capacity(&[5.0], &[60.0], &assumptions);
        assert_approx_eq!(Energy, capacity, Energy(150.0));

        // Used capacity above the SOC floor
        let capacity = estimate_region_capacity(&[5.0], &[240.0], &assumptions);
        assert_approx_eq!(Energy, capacity, Energy(80.0));
    }

    #[rstest]
    #[case(&[0.0, 10.0, 0.0], Some((1, 10.0)))]
    #[case(&[5.0, 0.0, 5.0], Some((0, 5.0)))]
    #[case(&[-1.0, -2.0], Some((0, -1.0)))]
    #[case(&[], None)]
    fn test_find_peak(#[case] values: &[f64], #[case] expected: Option<(usize, f64)>) {
        assert_eq!(find_peak(values), expected);
    }

    #[test]
    fn test_capacity_never_negative() {
        let assumptions = V2GAssumptions::default();
        for trips in [0.0, 0.5, 1.0, 7.0, 100.0] {
            for demand in [0.0, 1.0, 15.0, 150.0, 1e6] {
                let capacity =
                    estimate_region_capacity(&[trips, 1.0], &[demand, 0.0], &assumptions);
                assert!(capacity >= Energy(0.0));
                if trips == 0.0 {
                    assert_eq!(capacity, Energy(0.0));
                }
            }
        }
    }

    #[test]
    fn test_estimate_v2g_capacity_region_mismatch() {
        let regions = region_ids(&["A", "B"]);
        let rows = vec![vec![1.0, 2.0]];
        assert_error!(
            estimate_v2g_capacity(&regions, &rows, &rows, &V2GAssumptions::default()),
            "Expected trip and electricity data for 2 regions (found 1 and 1)"
        );
    }

    #[rstest]
    #[case(vec![1.0], vec![1.0, 2.0])]
    #[case(vec![], vec![])]
    fn test_estimate_v2g_capacity_hour_mismatch(#[case] trips: Vec<f64>, #[case] elec: Vec<f64>) {
        let regions = region_ids(&["A"]);
        assert!(
            estimate_v2g_capacity(&regions, &[trips], &[elec], &V2GAssumptions::default())
                .is_err()
        );
    }

    #[test]
    fn test_v2g_assumptions_deserialise() {
        let assumptions: V2GAssumptions = toml::from_str("").unwrap();
        assert_eq!(assumptions, V2GAssumptions::default());

        let assumptions: V2GAssumptions =
            toml::from_str("battery_capacity = 60.0\naverage_soc = 0.8").unwrap();
        assert_eq!(assumptions.battery_capacity, EnergyPerVehicle(60.0));
        assert_eq!(assumptions.average_soc, Dimensionless(0.8));
        assert_eq!(assumptions.safety_margin, Dimensionless(0.1));

        assert!(toml::from_str::<V2GAssumptions>("average_soc = 1.5").is_err());
        assert!(toml::from_str::<V2GAssumptions>("battery_capacity = -30.0").is_err());
    }
}
