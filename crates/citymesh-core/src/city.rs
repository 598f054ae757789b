//! City records as handed to the graph builder.

use crate::geo::LatLon;
use serde::{Deserialize, Serialize};

/// One row of the city dataset.
///
/// A record's identity is the `"name, country; region"` string returned by
/// [`CityRecord::id`]. The `"name, country"` prefix ([`CityRecord::label`])
/// is what free-text lookups are matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    /// Country code as found in the dataset (e.g. "es").
    pub country: String,
    pub region: String,
    pub population: u64,
    pub location: LatLon,
}

impl CityRecord {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        region: impl Into<String>,
        population: u64,
        location: LatLon,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            region: region.into(),
            population,
            location,
        }
    }

    /// The canonical identifier, `"name, country; region"`.
    pub fn id(&self) -> String {
        format!("{}, {}; {}", self.name, self.country, self.region)
    }

    /// The `"name, country"` part of the identifier.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}
