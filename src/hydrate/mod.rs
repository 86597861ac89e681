//! Recursive construction of typed buildings from parsed API responses.
//!
//! The wire format is a tree: a housing embedded in a building carries its
//! own copy of the buildings it lists, never a reference back to the
//! enclosing one. Nothing here detects cycles; instead every walk is bounded
//! by [`HydrationOptions::max_depth`] so a malformed or hostile document
//! fails with [`HydrationReason::DepthExceeded`] instead of recursing
//! without limit.
//!
//! Collections (`photos`, `agreements`, `competitors`, `sections`,
//! `multi_apartment`, `buildings`, `files`) always come out as a `Vec`,
//! empty when the key is absent, null or `[]`.

mod node;

use serde_json::Value;
use tracing::warn;

use crate::config::{HydrationOptions, UnknownDiscriminant};
use crate::error::{HydrationError, HydrationReason};
use crate::models::{
    Agreement, Attachment, Building, BuildingInfo, BuildingKind, Competitor, Complex, House,
    Housing, MultiApartment, Section,
};

use node::Node;
pub(crate) use node::WHOLE_NODE;

type Result<T> = std::result::Result<T, HydrationError>;

/// Stateless converter from JSON nodes to domain entities.
///
/// Each call builds a fresh, independent object graph.
#[derive(Debug, Clone, Default)]
pub struct Hydrator {
    options: HydrationOptions,
}

impl Hydrator {
    pub fn new(options: HydrationOptions) -> Self {
        Self { options }
    }

    pub fn attachment(&self, value: &Value) -> Result<Attachment> {
        self.attachment_at(value, 0)
    }

    pub fn agreement(&self, value: &Value) -> Result<Agreement> {
        self.agreement_at(value, 0)
    }

    pub fn competitor(&self, value: &Value) -> Result<Competitor> {
        self.competitor_at(value, 0)
    }

    pub fn housing(&self, value: &Value) -> Result<Housing> {
        self.housing_at(value, 0)
    }

    /// Dispatch on the `type` discriminant.
    ///
    /// Returns `Ok(None)` for an unknown discriminant when the options say
    /// to skip it; callers leave such entries out of their collections.
    pub fn building(&self, value: &Value) -> Result<Option<Building>> {
        self.building_at(value, 0)
    }

    /// Hydrate a list of buildings, dropping skipped entries.
    pub fn buildings(&self, values: &[Value]) -> Result<Vec<Building>> {
        self.buildings_at(values, 0)
    }

    pub fn house(&self, value: &Value) -> Result<House> {
        self.house_at(value, 0)
    }

    pub fn multi_apartment(&self, value: &Value) -> Result<MultiApartment> {
        self.multi_apartment_at(value, 0)
    }

    pub fn complex(&self, value: &Value) -> Result<Complex> {
        self.complex_at(value, 0)
    }

    /// Hydrate a section whatever its own discriminant says.
    pub fn section(&self, value: &Value) -> Result<Section> {
        self.section_at(value, 0)
    }

    fn enter<'a>(&self, entity: &'static str, value: &'a Value, depth: usize) -> Result<Node<'a>> {
        if depth > self.options.max_depth {
            return Err(HydrationError::new(
                entity,
                WHOLE_NODE,
                HydrationReason::DepthExceeded(self.options.max_depth),
            ));
        }
        Node::new(entity, value)
    }

    fn attachment_at(&self, value: &Value, depth: usize) -> Result<Attachment> {
        let node = self.enter("Attachment", value, depth)?;
        Ok(Attachment {
            id: node.int("id")?,
            link: node.string("link")?,
            audit: node.audit()?,
        })
    }

    fn attachments_at(&self, node: &Node<'_>, key: &'static str, depth: usize) -> Result<Vec<Attachment>> {
        node.list(key)?
            .iter()
            .map(|item| self.attachment_at(item, depth + 1))
            .collect()
    }

    fn agreement_at(&self, value: &Value, depth: usize) -> Result<Agreement> {
        let node = self.enter("Agreement", value, depth)?;
        Ok(Agreement {
            id: node.int("id")?,
            files: self.attachments_at(&node, "files", depth)?,
            sign_date: node.timestamp("sign_date")?,
            expires: node.timestamp("expires")?,
            auto_extend: node.bool("auto_extend")?,
            audit: node.audit()?,
        })
    }

    fn competitor_at(&self, value: &Value, depth: usize) -> Result<Competitor> {
        let node = self.enter("Competitor", value, depth)?;
        Ok(Competitor {
            id: node.int("id")?,
            name: node.string("name")?,
            audit: node.audit()?,
        })
    }

    fn housing_at(&self, value: &Value, depth: usize) -> Result<Housing> {
        let node = self.enter("Housing", value, depth)?;
        Ok(Housing {
            id: node.int("id")?,
            name: node.string("name")?,
            address: node.string("address")?,
            buildings: self.buildings_at(node.list("buildings")?, depth + 1)?,
            audit: node.audit()?,
        })
    }

    fn buildings_at(&self, values: &[Value], depth: usize) -> Result<Vec<Building>> {
        let mut buildings = Vec::with_capacity(values.len());
        for value in values {
            if let Some(building) = self.building_at(value, depth)? {
                buildings.push(building);
            }
        }
        Ok(buildings)
    }

    fn building_at(&self, value: &Value, depth: usize) -> Result<Option<Building>> {
        let node = self.enter("Building", value, depth)?;
        let discriminant = node.int("type")?;

        let kind = match BuildingKind::from_discriminant(discriminant) {
            Some(kind) => kind,
            None => return self.unknown_discriminant(&node, discriminant),
        };

        let building = match kind {
            BuildingKind::House => Building::House(self.house_at(value, depth)?),
            BuildingKind::MultiApartment => {
                Building::MultiApartment(self.multi_apartment_at(value, depth)?)
            }
            BuildingKind::Complex => Building::Complex(self.complex_at(value, depth)?),
            BuildingKind::Section => Building::Section(self.section_at(value, depth)?),
        };
        Ok(Some(building))
    }

    fn unknown_discriminant(&self, node: &Node<'_>, discriminant: i64) -> Result<Option<Building>> {
        match self.options.unknown_discriminant {
            UnknownDiscriminant::Skip => {
                let id = node.opt_string("id").ok().flatten().unwrap_or_default();
                warn!(
                    discriminant,
                    id = %id,
                    "Skipping building of unknown type"
                );
                Ok(None)
            }
            UnknownDiscriminant::Reject => Err(node.error(
                "type",
                HydrationReason::UnknownDiscriminant(discriminant),
            )),
        }
    }

    /// Fields shared by all building kinds, hydrated before the kind-specific ones.
    fn building_info(&self, node: &Node<'_>, depth: usize) -> Result<BuildingInfo> {
        let photos = self.attachments_at(node, "photos", depth)?;

        let housing = match node.child("housing")? {
            Some(child) => Some(Box::new(self.housing_at(child, depth + 1)?)),
            None => None,
        };

        let agreements = node
            .list("agreements")?
            .iter()
            .map(|item| self.agreement_at(item, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        let competitors = node
            .list("competitors")?
            .iter()
            .map(|item| self.competitor_at(item, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(BuildingInfo {
            id: node.string("id")?,
            name: node.string("name")?,
            object_type: node.opt_string("object_type")?,
            google_place_id: node.opt_string("google_place_id")?,
            photos,
            housing,
            agreements,
            competitors,
            audit: node.audit()?,
        })
    }

    fn house_at(&self, value: &Value, depth: usize) -> Result<House> {
        let node = self.enter("House", value, depth)?;
        let info = self.building_info(&node, depth)?;
        Ok(House {
            info,
            floors: node.opt_int("floors")?,
        })
    }

    fn multi_apartment_at(&self, value: &Value, depth: usize) -> Result<MultiApartment> {
        let node = self.enter("MultiApartment", value, depth)?;
        let info = self.building_info(&node, depth)?;
        let sections = node
            .list("sections")?
            .iter()
            .map(|item| self.section_at(item, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(MultiApartment {
            info,
            floors: node.opt_int("floors")?,
            rooms: node.opt_int("rooms")?,
            sections,
        })
    }

    fn complex_at(&self, value: &Value, depth: usize) -> Result<Complex> {
        let node = self.enter("Complex", value, depth)?;
        let info = self.building_info(&node, depth)?;
        let multi_apartments = node
            .list("multi_apartment")?
            .iter()
            .map(|item| self.multi_apartment_at(item, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Complex {
            info,
            multi_apartments,
        })
    }

    fn section_at(&self, value: &Value, depth: usize) -> Result<Section> {
        let node = self.enter("Section", value, depth)?;
        let info = self.building_info(&node, depth)?;
        Ok(Section {
            info,
            floors: node.opt_int("floors")?,
            rooms: node.opt_int("rooms")?,
            section_number: node.opt_string("section_number")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const AT: &str = "2018-02-20T12:34:52+02:00";

    fn audited(mut value: Value) -> Value {
        let fields = value.as_object_mut().unwrap();
        fields.insert("created_by".into(), json!("admin"));
        fields.insert("created_at".into(), json!(AT));
        fields.insert("edited_by".into(), json!("admin"));
        fields.insert("updated_at".into(), json!(AT));
        value
    }

    fn attachment(id: i64, link: &str) -> Value {
        audited(json!({"id": id, "link": link}))
    }

    fn agreement(files: Vec<Value>) -> Value {
        audited(json!({
            "id": 16,
            "files": files,
            "sign_date": "2018-01-29T17:02:05+02:00",
            "expires": "2018-01-29T17:02:05+02:00",
            "auto_extend": false
        }))
    }

    fn building(kind: i64, id: &str) -> Value {
        audited(json!({
            "type": kind,
            "id": id,
            "name": format!("Building {}", id),
            "google_place_id": null,
            "object_type": "BH"
        }))
    }

    fn with(mut value: Value, key: &str, field: Value) -> Value {
        value.as_object_mut().unwrap().insert(key.into(), field);
        value
    }

    #[test]
    fn house_scenario() {
        let input = json!({
            "type": 4, "id": "h1", "name": "N", "floors": 2,
            "google_place_id": null, "photos": [], "housing": null,
            "agreements": [], "competitors": [],
            "created_by": "a", "created_at": "2020-01-01T00:00:00+00:00",
            "edited_by": "a", "updated_at": "2020-01-01T00:00:00+00:00",
            "object_type": "BH"
        });

        let building = Hydrator::default().building(&input).unwrap().unwrap();
        let house = building.as_house().expect("house");
        assert_eq!(house.info.id, "h1");
        assert_eq!(house.info.name, "N");
        assert_eq!(house.floors, Some(2));
        assert_eq!(house.info.object_type.as_deref(), Some("BH"));
        assert_eq!(house.info.google_place_id, None);
        assert!(house.info.photos.is_empty());
        assert!(house.info.housing.is_none());
        assert_eq!(house.info.audit.created_by, "a");
    }

    #[test]
    fn collections_are_empty_when_absent_null_or_empty() {
        let hydrator = Hydrator::default();
        for kind in 1..=4 {
            for missing in [None, Some(Value::Null), Some(json!([]))] {
                let mut input = building(kind, "b");
                if let Some(value) = &missing {
                    for key in ["photos", "agreements", "competitors"] {
                        input = with(input, key, value.clone());
                    }
                }
                let hydrated = hydrator.building(&input).unwrap().unwrap();
                let info = hydrated.info();
                assert!(info.photos.is_empty());
                assert!(info.agreements.is_empty());
                assert!(info.competitors.is_empty());
            }
        }
    }

    #[test]
    fn dispatches_each_known_discriminant() {
        let hydrator = Hydrator::default();
        let expected = [
            (1, BuildingKind::Complex),
            (2, BuildingKind::MultiApartment),
            (3, BuildingKind::Section),
            (4, BuildingKind::House),
        ];
        for (discriminant, kind) in expected {
            let hydrated = hydrator.building(&building(discriminant, "x")).unwrap().unwrap();
            assert_eq!(hydrated.kind(), kind);
        }
    }

    #[test]
    fn unknown_discriminant_is_skipped_in_collections() {
        let hydrator = Hydrator::default();
        let values = vec![building(4, "a"), building(9, "b"), building(2, "c")];
        let buildings = hydrator.buildings(&values).unwrap();
        let ids: Vec<_> = buildings.iter().map(Building::id).collect();
        assert_eq!(ids, ["a", "c"]);

        let housing = with(
            audited(json!({"id": 11, "name": "Test", "address": "Main st"})),
            "buildings",
            json!([building(7, "z"), building(1, "y")]),
        );
        let housing = hydrator.housing(&housing).unwrap();
        assert_eq!(housing.buildings.len(), 1);
        assert_eq!(housing.buildings[0].kind(), BuildingKind::Complex);
    }

    #[test]
    fn unknown_discriminant_rejected_in_strict_mode() {
        let hydrator = Hydrator::new(HydrationOptions {
            unknown_discriminant: UnknownDiscriminant::Reject,
            ..HydrationOptions::default()
        });
        let err = hydrator.buildings(&[building(9, "b")]).unwrap_err();
        assert_eq!(err.field, "type");
        assert_eq!(err.reason, HydrationReason::UnknownDiscriminant(9));
    }

    #[test]
    fn nested_fidelity_through_complex() {
        let section = with(
            building(3, "s1"),
            "agreements",
            json!([agreement(vec![attachment(26, "first"), attachment(27, "second")])]),
        );
        let multi = with(building(2, "m1"), "sections", json!([section]));
        let complex = with(building(1, "c1"), "multi_apartment", json!([multi]));

        let hydrated = Hydrator::default().building(&complex).unwrap().unwrap();
        let complex = hydrated.as_complex().expect("complex");
        let files = &complex.multi_apartments[0].sections[0].info.agreements[0].files;
        assert_eq!(files.len(), 2);
        assert_eq!((files[0].id, files[0].link.as_str()), (26, "first"));
        assert_eq!((files[1].id, files[1].link.as_str()), (27, "second"));
    }

    #[test]
    fn sections_ignore_their_own_discriminant() {
        let multi = with(building(2, "m"), "sections", json!([building(4, "s")]));
        let multi = Hydrator::default().multi_apartment(&multi).unwrap();
        assert_eq!(multi.sections[0].info.id, "s");
    }

    #[test]
    fn housing_buildings_are_redispatched() {
        let house = with(building(4, "h"), "floors", json!(3));
        let housing = with(
            audited(json!({"id": "11", "name": "Test", "address": "Main st"})),
            "buildings",
            json!([house, building(2, "m")]),
        );
        let owner = with(building(4, "owner"), "housing", housing);

        let hydrated = Hydrator::default().house(&owner).unwrap();
        let housing = hydrated.info.housing.as_ref().expect("housing");
        assert_eq!(housing.id, 11);
        assert_eq!(housing.buildings[0].as_house().unwrap().floors, Some(3));
        assert_eq!(housing.buildings[1].kind(), BuildingKind::MultiApartment);
    }

    #[test]
    fn missing_required_field_fails_whole_call() {
        let mut photo = attachment(1, "x");
        photo.as_object_mut().unwrap().remove("updated_at");
        let input = with(building(4, "h"), "photos", json!([photo]));

        let err = Hydrator::default().building(&input).unwrap_err();
        assert_eq!(err.entity, "Attachment");
        assert_eq!(err.field, "updated_at");
        assert_eq!(err.reason, HydrationReason::Missing);
    }

    #[test]
    fn malformed_timestamp_is_reported() {
        let input = with(building(4, "h"), "created_at", json!("yesterday"));
        let err = Hydrator::default().building(&input).unwrap_err();
        assert_eq!(err.entity, "House");
        assert_eq!(err.field, "created_at");
        assert!(matches!(err.reason, HydrationReason::InvalidTimestamp(_)));
    }

    #[test]
    fn depth_guard_stops_runaway_nesting() {
        let mut value = building(4, "leaf");
        for level in 0..10 {
            let housing = with(
                audited(json!({"id": level, "name": "H", "address": "A"})),
                "buildings",
                json!([value]),
            );
            value = with(building(4, "outer"), "housing", housing);
        }

        let shallow = Hydrator::new(HydrationOptions {
            max_depth: 5,
            ..HydrationOptions::default()
        });
        let err = shallow.building(&value).unwrap_err();
        assert_eq!(err.reason, HydrationReason::DepthExceeded(5));

        assert!(Hydrator::default().building(&value).unwrap().is_some());
    }

    #[test]
    fn hydrating_twice_gives_equal_independent_graphs() {
        let input = with(
            building(2, "m"),
            "photos",
            json!([attachment(1, "a"), attachment(2, "b")]),
        );
        let hydrator = Hydrator::default();
        let first = hydrator.building(&input).unwrap().unwrap();
        let second = hydrator.building(&input).unwrap().unwrap();
        assert_eq!(first, second);
        assert!(!std::ptr::eq(
            first.info().photos.as_ptr(),
            second.info().photos.as_ptr()
        ));
    }
}
