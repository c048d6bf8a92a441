//! Serde adapter that stores a [`Uuid`] as its hyphenated string, so stored
//! documents and `doc! { "_id": id.to_string() }` filters always agree.
//!
//! ```ignore
//! #[serde(rename = "_id", with = "database::mongodb::uuid_as_string")]
//! pub id: Uuid,
//! ```

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
use uuid::Uuid;

pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&id.hyphenated())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Uuid::parse_str(&raw).map_err(D::Error::custom)
}
