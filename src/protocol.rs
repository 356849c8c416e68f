//! JSON shapes exchanged with the game backend.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClientError;

/// Full state of a city as returned by `GET /api/city`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub id: String,
    #[serde(rename = "cityName")]
    pub name: String,
    pub buildings: BTreeMap<String, i64>,
    pub resources: BTreeMap<String, i64>,
    #[serde(rename = "buildingsQueue", default, deserialize_with = "null_as_empty")]
    pub queue: Vec<QueueEntry>,
}

impl CitySnapshot {
    pub fn level_of(&self, building: &str) -> Option<i64> {
        self.buildings.get(building).copied()
    }
}

/// A pending building upgrade. `complete_time` stays `None` until the
/// backend has scheduled it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub building: String,
    pub level: i64,
    #[serde(
        rename = "completeTime",
        default,
        deserialize_with = "unscheduled_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub complete_time: Option<String>,
}

impl QueueEntry {
    pub fn provisional(building: &str, level: i64) -> QueueEntry {
        QueueEntry { building: building.to_string(), level, complete_time: None }
    }
}

/// Body of `POST /api/city/building`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpgradeRequest {
    #[serde(rename = "cityID")]
    pub city_id: String,
    pub building: String,
    pub level: i64,
}

/// Trainer demo counters from `GET /api/foobar`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct FooBar {
    pub foo: i64,
    pub bar: i64,
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    Ok(serde_json::from_str(body)?)
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

// Go encodes an unset time.Time as its zero value rather than omitting it.
const GO_ZERO_TIME: &str = "0001-01-01T00:00:00";

fn unscheduled_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.filter(|t| !t.is_empty() && !t.starts_with(GO_ZERO_TIME)))
}
