//! Reader for the `worldcitiespop` CSV layout.
//!
//! Only the columns the graph needs are read: `Country`, `AccentCity`
//! (falling back to `City`), `Region`, `Population`, `Latitude` and
//! `Longitude`. Column order does not matter; extra columns are ignored.
//!
//! Populations are sanitized rather than rejected: an empty or unparsable
//! field becomes 0 and a fractional value is truncated. Coordinates are
//! not sanitized. A record with a coordinate that does not parse or is out
//! of range fails the whole read.

use crate::city::CityRecord;
use crate::error::{DatasetError, Result};
use crate::geo::LatLon;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

struct Columns {
    country: usize,
    name: usize,
    region: usize,
    population: usize,
    latitude: usize,
    longitude: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &'static str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(DatasetError::MissingColumn(name));

        Ok(Self {
            country: require("Country")?,
            name: find("AccentCity")
                .or_else(|| find("City"))
                .ok_or(DatasetError::MissingColumn("AccentCity"))?,
            region: require("Region")?,
            population: require("Population")?,
            latitude: require("Latitude")?,
            longitude: require("Longitude")?,
        })
    }
}

/// Reads all city records from a CSV file.
pub fn read_cities(path: impl AsRef<Path>) -> Result<Vec<CityRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let records = read_cities_from(file)?;
    info!("Loaded {} city records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads all city records from any CSV source with a header row.
pub fn read_cities_from<R: Read>(reader: R) -> Result<Vec<CityRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns::locate(csv.headers()?)?;
    let mut cities = Vec::new();

    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let record = index as u64 + 1;
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let lat = parse_coordinate(field(columns.latitude), record, "latitude", 90.0)?;
        let lon = parse_coordinate(field(columns.longitude), record, "longitude", 180.0)?;

        cities.push(CityRecord {
            name: field(columns.name).to_string(),
            country: field(columns.country).to_string(),
            region: field(columns.region).to_string(),
            population: sanitize_population(field(columns.population)),
            location: LatLon::new(lat, lon),
        });
    }

    debug!("Parsed {} CSV records", cities.len());
    Ok(cities)
}

fn parse_coordinate(value: &str, record: u64, field: &'static str, limit: f64) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= limit => Ok(v),
        _ => Err(DatasetError::InvalidCoordinate {
            record,
            field,
            value: value.to_string(),
        }),
    }
}

/// Turns a raw population field into a count. Anything unusable is 0.
pub fn sanitize_population(value: &str) -> u64 {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return n;
    }
    value
        .split('.')
        .next()
        .and_then(|whole| whole.parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
Country,City,AccentCity,Region,Population,Latitude,Longitude
es,barcelona,Barcelona,56,1581595,41.3833333,2.1833333
es,sabadell,Sabadell,56,,41.55,2.1
ad,andorra la vella,Andorra la Vella,07,20430.0,42.5,1.5166667
";

    #[test]
    fn test_reads_sample() {
        let cities = read_cities_from(SAMPLE.as_bytes()).unwrap();
        assert_eq!(cities.len(), 3);
        assert_eq!(cities[0].id(), "Barcelona, es; 56");
        assert_eq!(cities[0].population, 1_581_595);
        assert_eq!(cities[1].population, 0);
        assert_eq!(cities[2].population, 20_430);
        assert!((cities[2].location.lon - 1.5166667).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_population() {
        assert_eq!(sanitize_population("42"), 42);
        assert_eq!(sanitize_population(" 42 "), 42);
        assert_eq!(sanitize_population("42.9"), 42);
        assert_eq!(sanitize_population(""), 0);
        assert_eq!(sanitize_population("n/a"), 0);
        assert_eq!(sanitize_population("-7"), 0);
    }

    #[test]
    fn test_missing_column() {
        let data = "Country,City,Region,Population,Latitude\nes,x,1,2,3\n";
        let err = read_cities_from(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Longitude")));
    }

    #[test]
    fn test_falls_back_to_city_column() {
        let data = "Country,City,Region,Population,Latitude,Longitude\nes,girona,57,96000,41.98,2.82\n";
        let cities = read_cities_from(data.as_bytes()).unwrap();
        assert_eq!(cities[0].name, "girona");
    }

    #[test]
    fn test_rejects_bad_coordinate() {
        let data = "Country,AccentCity,Region,Population,Latitude,Longitude\n\
                    es,A,1,10,0,0\n\
                    es,B,1,10,91.5,0\n";
        let err = read_cities_from(data.as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidCoordinate { record, field, .. } => {
                assert_eq!(record, 2);
                assert_eq!(field, "latitude");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cities = read_cities(file.path()).unwrap();
        assert_eq!(cities.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_cities("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
