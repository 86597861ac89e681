use serde::Serialize;

use super::{Agreement, Attachment, Audit, Competitor, Housing};

/// Wire discriminant carried in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuildingKind {
    Complex,
    MultiApartment,
    Section,
    House,
}

impl BuildingKind {
    pub fn from_discriminant(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Complex),
            2 => Some(Self::MultiApartment),
            3 => Some(Self::Section),
            4 => Some(Self::House),
            _ => None,
        }
    }

    pub fn discriminant(self) -> i64 {
        match self {
            Self::Complex => 1,
            Self::MultiApartment => 2,
            Self::Section => 3,
            Self::House => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complex => "Complex",
            Self::MultiApartment => "MultiApartment",
            Self::Section => "Section",
            Self::House => "House",
        }
    }
}

/// Fields every kind of building carries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInfo {
    pub id: String,
    pub name: String,
    /// Free-form tag such as "BH"
    pub object_type: Option<String>,
    pub google_place_id: Option<String>,
    pub photos: Vec<Attachment>,
    pub housing: Option<Box<Housing>>,
    pub agreements: Vec<Agreement>,
    pub competitors: Vec<Competitor>,
    #[serde(flatten)]
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Complex {
    #[serde(flatten)]
    pub info: BuildingInfo,
    pub multi_apartments: Vec<MultiApartment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiApartment {
    #[serde(flatten)]
    pub info: BuildingInfo,
    pub floors: Option<i64>,
    pub rooms: Option<i64>,
    pub sections: Vec<Section>,
}

/// Part of a multi-apartment building
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(flatten)]
    pub info: BuildingInfo,
    pub floors: Option<i64>,
    pub rooms: Option<i64>,
    pub section_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    #[serde(flatten)]
    pub info: BuildingInfo,
    pub floors: Option<i64>,
}

/// Any building returned by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Building {
    Complex(Complex),
    MultiApartment(MultiApartment),
    Section(Section),
    House(House),
}

impl Building {
    pub fn kind(&self) -> BuildingKind {
        match self {
            Self::Complex(_) => BuildingKind::Complex,
            Self::MultiApartment(_) => BuildingKind::MultiApartment,
            Self::Section(_) => BuildingKind::Section,
            Self::House(_) => BuildingKind::House,
        }
    }

    pub fn info(&self) -> &BuildingInfo {
        match self {
            Self::Complex(b) => &b.info,
            Self::MultiApartment(b) => &b.info,
            Self::Section(b) => &b.info,
            Self::House(b) => &b.info,
        }
    }

    pub fn id(&self) -> &str {
        &self.info().id
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn as_house(&self) -> Option<&House> {
        match self {
            Self::House(house) => Some(house),
            _ => None,
        }
    }

    pub fn as_multi_apartment(&self) -> Option<&MultiApartment> {
        match self {
            Self::MultiApartment(ma) => Some(ma),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&Complex> {
        match self {
            Self::Complex(complex) => Some(complex),
            _ => None,
        }
    }
}
