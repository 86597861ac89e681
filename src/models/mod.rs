mod building;

pub use building::{Building, BuildingInfo, BuildingKind, Complex, House, MultiApartment, Section};

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Timestamp as sent by the API, offset preserved
pub type Timestamp = DateTime<FixedOffset>;

/// Who created/edited an entity and when
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub created_by: String,
    pub created_at: Timestamp,
    pub edited_by: String,
    pub updated_at: Timestamp,
}

/// Uploaded file (photo or agreement scan)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub link: String,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Agreement signed for a building
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: i64,
    pub files: Vec<Attachment>,
    pub sign_date: Timestamp,
    pub expires: Timestamp,
    pub auto_extend: bool,
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
}

/// Postal address container.
///
/// The buildings listed here are embedded copies, independent from any
/// building that references this housing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Housing {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub buildings: Vec<Building>,
    #[serde(flatten)]
    pub audit: Audit,
}
