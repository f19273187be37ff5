use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the `people/` collection.
///
/// Fields are kept as the API sends them; nothing here is interpreted or
/// validated. Anything missing decodes to an empty value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Person {
    pub name: String,
    pub birth_year: String,
    pub eye_color: String,
    pub gender: String,
    pub hair_color: String,
    pub height: String,
    pub mass: String,
    pub skin_color: String,
    pub homeworld: String,
    pub created: String,
    pub edited: String,
    pub url: String,
    pub films: Vec<String>,
    pub species: Vec<String>,
    pub starships: Vec<String>,
    pub vehicles: Vec<String>,
}

/// Opaque server-supplied pointer to a page. For SWAPI this is an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One batch of records plus pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Person>,
    pub total_count: u64,
    pub next_cursor: Option<Cursor>,
    pub previous_cursor: Option<Cursor>,
}

/// Body of a `people/` response exactly as it comes over the wire.
#[derive(Debug, Deserialize)]
pub struct PeopleResponse {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Person>,
}

impl From<PeopleResponse> for Page {
    fn from(resp: PeopleResponse) -> Self {
        // Treat an empty string the same as null; neither points anywhere.
        let cursor = |v: Option<String>| v.filter(|s| !s.is_empty()).map(Cursor);
        Page {
            items: resp.results,
            total_count: resp.count,
            next_cursor: cursor(resp.next),
            previous_cursor: cursor(resp.previous),
        }
    }
}
