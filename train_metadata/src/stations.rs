use serde::Deserialize;
use std::collections::HashMap;

shared_kernel::string_key!(StationCode);

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub station_short_code: Option<String>,
    pub station_name: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct StationRegistry {
    names: HashMap<StationCode, String>,
}

impl StationRegistry {
    pub fn load(stations: Vec<StationDto>) -> Self {
        let names = stations
            .into_iter()
            .filter_map(|station| match (station.station_short_code, station.station_name) {
                (Some(code), Some(name)) => Some((StationCode::new(code), name)),
                _ => None,
            })
            .collect();
        Self { names }
    }

    /// Display name of a station, or the code itself when it is not known.
    pub fn name_for(&self, code: &str) -> String {
        self.names
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_owned())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
