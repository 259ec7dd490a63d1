use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::database::Database;
use crate::driver::DriverRegistry;
use crate::error::DbError;
use crate::results::Row;
use crate::types::RowValues;

const SELECT_BY_ID: &str = "SELECT id, name FROM region WHERE id = $1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

impl TryFrom<&Row> for Region {
    type Error = LookupError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        let id = row
            .get("id")
            .and_then(RowValues::as_int)
            .copied()
            .ok_or_else(|| LookupError::MalformedRow("region row has no integer id".into()))?;
        let name = row
            .get("name")
            .and_then(RowValues::as_text)
            .ok_or_else(|| LookupError::MalformedRow("region row has no text name".into()))?
            .to_string();
        Ok(Region { id, name })
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Region {0} not found")]
    NotFound(i64),

    #[error("Malformed region row: {0}")]
    MalformedRow(String),
}

/// Read access to regions, as used by the HTTP layer.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Region, LookupError>;
}

/// Looks regions up with a fresh connection per call.
#[derive(Debug, Clone)]
pub struct RegionRepository {
    registry: Arc<DriverRegistry>,
    config: Arc<DatabaseConfig>,
}

impl RegionRepository {
    /// # Errors
    /// Returns `DbError::UnknownDriver` if the configured engine is not in `registry`.
    pub fn new(registry: Arc<DriverRegistry>, config: Arc<DatabaseConfig>) -> Result<Self, DbError> {
        if !registry.contains(&config.db_driver) {
            return Err(DbError::UnknownDriver(config.db_driver.clone()));
        }
        Ok(Self { registry, config })
    }

    fn open(&self) -> Result<Database, DbError> {
        Database::from_registry(&self.registry, &self.config)
    }
}

#[async_trait]
impl RegionLookup for RegionRepository {
    async fn get_by_id(&self, id: i64) -> Result<Region, LookupError> {
        let mut db = self.open()?;
        db.scoped(move |db| {
            Box::pin(async move {
                let rows = db.select(SELECT_BY_ID, &[RowValues::Int(id)]).await?;
                let row = rows.first().ok_or(LookupError::NotFound(id))?;
                Region::try_from(row)
            })
        })
        .await
    }
}
