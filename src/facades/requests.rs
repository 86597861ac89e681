//! Request bodies and query parameters sent by the buildings facade.

use serde::{Serialize, Serializer};

use crate::models::Timestamp;

/// Search and paging parameters, passed through as query pairs.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Vec<String>,
}

impl ListQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(search) = &self.search {
            pairs.push(("q".to_string(), search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if !self.sort.is_empty() {
            let mut unique: Vec<&str> = Vec::with_capacity(self.sort.len());
            for field in &self.sort {
                if !unique.contains(&field.as_str()) {
                    unique.push(field);
                }
            }
            pairs.push(("sort".to_string(), unique.join(",")));
        }

        pairs
    }
}

/// Dates in agreement bodies use `YYYY-MM-DD HH:MM:SS`.
fn wire_date<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn wire_date_opt<S: Serializer>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => wire_date(value, serializer),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewHousing {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HousingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewHouse {
    pub name: String,
    pub floors: Option<i64>,
    pub google_place_id: Option<String>,
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HouseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMultiApartment {
    pub name: String,
    pub floors: Option<i64>,
    pub rooms: Option<i64>,
    pub google_place_id: Option<String>,
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MultiApartmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSection {
    pub name: String,
    pub section_number: Option<String>,
    pub floors: Option<i64>,
    pub rooms: Option<i64>,
    pub google_place_id: Option<String>,
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComplex {
    pub name: String,
    pub google_place_id: Option<String>,
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplexUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

/// Agreement to attach to a building. `attachments` are file links.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgreement {
    pub auto_extend: bool,
    #[serde(serialize_with = "wire_date")]
    pub expires: Timestamp,
    #[serde(serialize_with = "wire_date")]
    pub sign_date: Timestamp,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgreementUpdate {
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire_date_opt")]
    pub sign_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "wire_date_opt")]
    pub expires: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_extend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}
