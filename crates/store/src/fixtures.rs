//! JSON fixture loading for [`crate::MemoryStore`].
//!
//! `users.json` and `properties.json` are objects keyed by id (the shape the
//! LightBnB seed files use); a row without an `id` field takes its key.
//! Plain arrays are accepted too. The optional `reservations.json` and
//! `property_reviews.json` are arrays.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use db::models::{Property, PropertyReview, Reservation, User};

use crate::StoreError;

pub const USERS_FILE: &str = "users.json";
pub const PROPERTIES_FILE: &str = "properties.json";
pub const RESERVATIONS_FILE: &str = "reservations.json";
pub const REVIEWS_FILE: &str = "property_reviews.json";

/// Everything a fixture directory contributes to a store.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub users: Vec<User>,
    pub properties: Vec<Property>,
    pub reservations: Vec<Reservation>,
    pub reviews: Vec<PropertyReview>,
}

impl Fixtures {
    /// Load every fixture file in `dir`. Users and properties are required.
    pub async fn load_dir(dir: &Path) -> Result<Self, StoreError> {
        let fixtures = Self {
            users: read_table(&dir.join(USERS_FILE)).await?,
            properties: read_table(&dir.join(PROPERTIES_FILE)).await?,
            reservations: read_optional_table(&dir.join(RESERVATIONS_FILE)).await?,
            reviews: read_optional_table(&dir.join(REVIEWS_FILE)).await?,
        };
        info!(
            dir = %dir.display(),
            users = fixtures.users.len(),
            properties = fixtures.properties.len(),
            reservations = fixtures.reservations.len(),
            reviews = fixtures.reviews.len(),
            "Loaded fixtures"
        );
        Ok(fixtures)
    }
}

/// Parse one fixture table from JSON text.
pub fn parse_table<T: DeserializeOwned>(path: &Path, json: &str) -> Result<Vec<T>, StoreError> {
    let invalid = |message: String| StoreError::Fixture {
        path: path.to_path_buf(),
        message,
    };

    let rows = match serde_json::from_str::<Value>(json).map_err(|err| invalid(err.to_string()))? {
        Value::Object(keyed) => keyed
            .into_iter()
            .map(|(key, mut row)| {
                if let (Some(fields), Ok(id)) = (row.as_object_mut(), key.parse::<i64>()) {
                    fields.entry("id").or_insert_with(|| Value::from(id));
                }
                row
            })
            .collect(),
        Value::Array(rows) => rows,
        _ => return Err(invalid("expected an object keyed by id or an array".into())),
    };

    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|err| invalid(err.to_string()))
}

async fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let json = tokio::fs::read_to_string(path).await.map_err(|source| StoreError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    parse_table(path, &json)
}

async fn read_optional_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => read_table(path).await,
        Ok(false) => {
            debug!(path = %path.display(), "optional fixture missing");
            Ok(Vec::new())
        }
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
