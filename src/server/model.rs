//! JSON bodies returned by the HTTP layer.
//!
//! Every body carries `success`; failures add `error`, region lookups add the
//! region's fields alongside.

use serde::Serialize;

use crate::region::Region;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Base {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Base {
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionBody {
    #[serde(flatten)]
    pub base: Base,
    pub id: i64,
    pub name: String,
}

impl From<Region> for RegionBody {
    fn from(region: Region) -> Self {
        Self {
            base: Base {
                success: true,
                error: None,
            },
            id: region.id,
            name: region.name,
        }
    }
}
