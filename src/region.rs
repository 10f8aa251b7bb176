//! Regions represent the geographical areas for which demand and trip data are provided.
use crate::id::{define_id_getter, define_id_type};
use indexmap::IndexMap;
use serde::Deserialize;

define_id_type! {RegionID}

/// A map of [`Region`]s, keyed by region ID.
///
/// The order of the map is the order in which regions were defined and it determines the row
/// order of every per-region array.
pub type RegionMap = IndexMap<RegionID, Region>;

/// Represents a region with an ID and a longer description.
#[derive(Debug, Deserialize, PartialEq)]
pub struct Region {
    /// A unique identifier for a region (e.g. "E06000001").
    pub id: RegionID,
    /// A text description of the region (e.g. "Hartlepool").
    pub description: String,
}
define_id_getter! {Region, RegionID}
