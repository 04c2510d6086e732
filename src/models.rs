use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type MovieId = i64;
pub type ContestId = i64;
pub type LocationId = i64;

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(vs) => vs,
        }
    }
}

// Raw inputs, as written by the scraping scripts.

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovie {
    pub id: MovieId,
    pub original_title: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovieMeta {
    pub id: MovieId,
    pub original_title: String,
    #[serde(default)]
    pub directors: Option<OneOrMany<String>>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub runtime_min: Option<i64>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    pub location_id: LocationId,
    pub location_name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContest {
    pub contest_id: ContestId,
    pub contest_name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScreening {
    pub movie_ids: Option<OneOrMany<MovieId>>,
    #[serde(default)]
    pub movie_titles: Vec<String>,
    pub contest_id: Option<ContestId>,
    pub place_id: Option<LocationId>,
    pub starts_at: String,
    pub accreditation_needed: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicket {
    pub screening_id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub room: String,
    pub place: String,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
}

// Operator-maintained side files.

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible_in_filters: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ContestsOverride {
    #[serde(rename = "$version", default = "default_version")]
    pub version: i64,
    #[serde(default)]
    pub items: BTreeMap<ContestId, ContestOverride>,
}

impl Default for ContestsOverride {
    fn default() -> Self {
        Self { version: default_version(), items: BTreeMap::new() }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RuntimeValue {
    Minutes(i64),
    Text(String),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuntimesOverride {
    #[serde(rename = "$version", default = "default_version")]
    pub version: i64,
    #[serde(default)]
    pub runtimes: BTreeMap<String, RuntimeValue>,
}

fn default_version() -> i64 {
    1
}

// Canonical dataset.

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: MovieId,
    pub original_title: String,
    pub year: Option<i32>,
    pub runtime_min: Option<u32>,
    pub directors: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRecord {
    pub id: ContestId,
    pub name: String,
    pub is_visible_in_filters: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
    pub id: String,
    pub movie_ids: Vec<MovieId>,
    pub contest_id: Option<ContestId>,
    pub location_id: Option<LocationId>,
    pub starts_at: String,
    pub accreditation_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movie_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indexes {
    pub contest_id_to_movie_ids: BTreeMap<ContestId, Vec<MovieId>>,
    pub movie_id_to_contest_ids: BTreeMap<MovieId, Vec<ContestId>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDb {
    #[serde(rename = "$schemaVersion")]
    pub schema_version: String,
    pub generated_at: jiff::Timestamp,
    pub movies_by_id: BTreeMap<MovieId, MovieRecord>,
    pub contests_by_id: BTreeMap<ContestId, ContestRecord>,
    pub locations_by_id: BTreeMap<LocationId, LocationRecord>,
    pub screenings: Vec<ScreeningRecord>,
    pub indexes: Indexes,
}

#[derive(Clone, Debug, Default)]
pub struct RawInputs {
    pub movie_list: Vec<RawMovie>,
    pub movies_meta: Vec<RawMovieMeta>,
    pub locations: Vec<RawLocation>,
    pub contests: Vec<RawContest>,
    pub screenings: Vec<RawScreening>,
    pub tickets: Vec<RawTicket>,
}
