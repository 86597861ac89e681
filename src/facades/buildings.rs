use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::requests::{
    AgreementUpdate, ComplexUpdate, HouseUpdate, HousingUpdate, ListQuery, MultiApartmentUpdate,
    NewAgreement, NewComplex, NewHouse, NewHousing, NewMultiApartment, NewSection, SectionUpdate,
};
use crate::config::ClientConfig;
use crate::error::{FacadeError, HydrationError, HydrationReason, Result};
use crate::hydrate::{Hydrator, WHOLE_NODE};
use crate::models::{
    Agreement, Attachment, Building, Competitor, Complex, House, Housing, MultiApartment,
};
use crate::normalize::normalize;
use crate::transport::{HttpRequest, Transport};

/// A building that competitors, agreements and housings can be linked to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingRef<'a> {
    House(&'a str),
    MultiApartment(&'a str),
    Complex(&'a str),
}

impl BuildingRef<'_> {
    fn path(&self) -> String {
        match self {
            Self::House(id) => format!("/houses/{}", id),
            Self::MultiApartment(id) => format!("/multi-apartments/{}", id),
            Self::Complex(id) => format!("/complexes/{}", id),
        }
    }
}

/// Anything that can carry uploaded attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentOwner<'a> {
    Building(BuildingRef<'a>),
    Section {
        multi_apartment: &'a str,
        section: &'a str,
    },
}

impl AttachmentOwner<'_> {
    fn path(&self) -> String {
        match self {
            Self::Building(building) => building.path(),
            Self::Section {
                multi_apartment,
                section,
            } => format!("/multi-apartments/{}/sections/{}", multi_apartment, section),
        }
    }
}

impl<'a> From<BuildingRef<'a>> for AttachmentOwner<'a> {
    fn from(building: BuildingRef<'a>) -> Self {
        Self::Building(building)
    }
}

fn hydrate_all<V>(
    items: &[Value],
    hydrate: impl Fn(&Value) -> std::result::Result<V, HydrationError>,
) -> Result<Vec<V>> {
    Ok(items.iter().map(hydrate).collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Listing bodies must be arrays; an empty body is an empty list.
fn into_list(data: Option<Value>) -> Result<Vec<Value>> {
    match data {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(HydrationError::new(
            "Response",
            WHOLE_NODE,
            HydrationReason::InvalidType { expected: "array" },
        )
        .into()),
    }
}

/// Client for the buildings catalog API
pub struct BuildingsFacade<T: Transport> {
    transport: T,
    base_url: String,
    hydrator: Hydrator,
}

impl<T: Transport> BuildingsFacade<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            hydrator: Hydrator::new(config.hydration.clone()),
        }
    }

    async fn call(
        &self,
        token: &str,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = HttpRequest::new(method, url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.transport.perform(request).await?;
        normalize(response.status, &response.body)
    }

    /// Call an endpoint that must answer with an entity.
    async fn fetch(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        self.call(token, method, path, Vec::new(), body)
            .await?
            .ok_or(FacadeError::EmptyResponse)
    }

    /// Call a listing endpoint; an empty body is an empty list.
    async fn fetch_list(&self, token: &str, path: &str, query: &ListQuery) -> Result<Vec<Value>> {
        let data = self.call(token, Method::GET, path, query.to_pairs(), None).await?;
        into_list(data)
    }

    /// Call an endpoint whose answer is only a status.
    async fn execute(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<()> {
        self.call(token, method, path, Vec::new(), body).await?;
        Ok(())
    }

    fn encode<B: Serialize>(body: &B) -> Result<Value> {
        serde_json::to_value(body).map_err(|e| FacadeError::RequestEncoding(e.to_string()))
    }

    /// Every building, whatever its kind.
    pub async fn get_buildings(&self, token: &str) -> Result<Vec<Building>> {
        let items = self.fetch_list(token, "/buildings", &ListQuery::default()).await?;
        let buildings = self.hydrator.buildings(&items)?;
        info!("Fetched {} of {} buildings", buildings.len(), items.len());
        Ok(buildings)
    }

    // Competitors

    pub async fn get_competitors(&self, token: &str, query: &ListQuery) -> Result<Vec<Competitor>> {
        let items = self.fetch_list(token, "/competitors", query).await?;
        hydrate_all(&items, |item| self.hydrator.competitor(item))
    }

    pub async fn get_competitor(&self, token: &str, id: i64) -> Result<Competitor> {
        let data = self
            .fetch(token, Method::GET, &format!("/competitors/{}", id), None)
            .await?;
        Ok(self.hydrator.competitor(&data)?)
    }

    pub async fn new_competitor(&self, token: &str, name: &str) -> Result<Competitor> {
        let data = self
            .fetch(token, Method::POST, "/competitors", Some(json!({ "name": name })))
            .await?;
        Ok(self.hydrator.competitor(&data)?)
    }

    pub async fn update_competitor(&self, token: &str, id: i64, name: Option<&str>) -> Result<()> {
        let body = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        self.execute(token, Method::PUT, &format!("/competitors/{}", id), Some(body))
            .await
    }

    pub async fn delete_competitor(&self, token: &str, id: i64) -> Result<()> {
        self.execute(token, Method::DELETE, &format!("/competitors/{}", id), None)
            .await
    }

    // Housings

    pub async fn get_housings(&self, token: &str, query: &ListQuery) -> Result<Vec<Housing>> {
        let items = self.fetch_list(token, "/housings", query).await?;
        hydrate_all(&items, |item| self.hydrator.housing(item))
    }

    pub async fn get_housing(&self, token: &str, id: i64) -> Result<Housing> {
        let data = self
            .fetch(token, Method::GET, &format!("/housings/{}", id), None)
            .await?;
        Ok(self.hydrator.housing(&data)?)
    }

    pub async fn new_housing(&self, token: &str, housing: &NewHousing) -> Result<Housing> {
        let data = self
            .fetch(token, Method::POST, "/housings", Some(Self::encode(housing)?))
            .await?;
        Ok(self.hydrator.housing(&data)?)
    }

    pub async fn update_housing(&self, token: &str, id: i64, update: &HousingUpdate) -> Result<()> {
        let body = Self::encode(update)?;
        self.execute(token, Method::PUT, &format!("/housings/{}", id), Some(body))
            .await
    }

    pub async fn delete_housing(&self, token: &str, id: i64) -> Result<()> {
        self.execute(token, Method::DELETE, &format!("/housings/{}", id), None)
            .await
    }

    // Houses

    pub async fn get_houses(&self, token: &str, query: &ListQuery) -> Result<Vec<House>> {
        let items = self.fetch_list(token, "/houses", query).await?;
        hydrate_all(&items, |item| self.hydrator.house(item))
    }

    pub async fn get_house(&self, token: &str, id: &str) -> Result<House> {
        let data = self
            .fetch(token, Method::GET, &format!("/houses/{}", id), None)
            .await?;
        Ok(self.hydrator.house(&data)?)
    }

    pub async fn new_house(&self, token: &str, house: &NewHouse) -> Result<House> {
        let data = self
            .fetch(token, Method::POST, "/houses", Some(Self::encode(house)?))
            .await?;
        Ok(self.hydrator.house(&data)?)
    }

    pub async fn update_house(&self, token: &str, id: &str, update: &HouseUpdate) -> Result<()> {
        let body = Self::encode(update)?;
        self.execute(token, Method::PUT, &format!("/houses/{}", id), Some(body))
            .await
    }

    pub async fn delete_house(&self, token: &str, id: &str) -> Result<()> {
        self.execute(token, Method::DELETE, &format!("/houses/{}", id), None)
            .await
    }

    // Multi-apartment buildings and their sections

    pub async fn get_multi_apartments(
        &self,
        token: &str,
        query: &ListQuery,
    ) -> Result<Vec<MultiApartment>> {
        let items = self.fetch_list(token, "/multi-apartments", query).await?;
        hydrate_all(&items, |item| self.hydrator.multi_apartment(item))
    }

    pub async fn get_multi_apartment(&self, token: &str, id: &str) -> Result<MultiApartment> {
        let data = self
            .fetch(token, Method::GET, &format!("/multi-apartments/{}", id), None)
            .await?;
        Ok(self.hydrator.multi_apartment(&data)?)
    }

    pub async fn new_multi_apartment(
        &self,
        token: &str,
        multi_apartment: &NewMultiApartment,
    ) -> Result<MultiApartment> {
        let body = Self::encode(multi_apartment)?;
        let data = self
            .fetch(token, Method::POST, "/multi-apartments", Some(body))
            .await?;
        Ok(self.hydrator.multi_apartment(&data)?)
    }

    pub async fn update_multi_apartment(
        &self,
        token: &str,
        id: &str,
        update: &MultiApartmentUpdate,
    ) -> Result<()> {
        let body = Self::encode(update)?;
        self.execute(token, Method::PUT, &format!("/multi-apartments/{}", id), Some(body))
            .await
    }

    pub async fn delete_multi_apartment(&self, token: &str, id: &str) -> Result<()> {
        self.execute(token, Method::DELETE, &format!("/multi-apartments/{}", id), None)
            .await
    }

    /// Add a section; the server answers with the updated parent building.
    pub async fn new_section(
        &self,
        token: &str,
        multi_apartment_id: &str,
        section: &NewSection,
    ) -> Result<MultiApartment> {
        let path = format!("/multi-apartments/{}/sections", multi_apartment_id);
        let data = self
            .fetch(token, Method::POST, &path, Some(Self::encode(section)?))
            .await?;
        Ok(self.hydrator.multi_apartment(&data)?)
    }

    pub async fn update_section(
        &self,
        token: &str,
        multi_apartment_id: &str,
        section_id: &str,
        update: &SectionUpdate,
    ) -> Result<()> {
        let path = format!("/multi-apartments/{}/sections/{}", multi_apartment_id, section_id);
        self.execute(token, Method::PUT, &path, Some(Self::encode(update)?))
            .await
    }

    pub async fn delete_section(
        &self,
        token: &str,
        multi_apartment_id: &str,
        section_id: &str,
    ) -> Result<()> {
        let path = format!("/multi-apartments/{}/sections/{}", multi_apartment_id, section_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    // Complexes

    pub async fn get_complexes(&self, token: &str, query: &ListQuery) -> Result<Vec<Complex>> {
        let items = self.fetch_list(token, "/complexes", query).await?;
        hydrate_all(&items, |item| self.hydrator.complex(item))
    }

    pub async fn get_complex(&self, token: &str, id: &str) -> Result<Complex> {
        let data = self
            .fetch(token, Method::GET, &format!("/complexes/{}", id), None)
            .await?;
        Ok(self.hydrator.complex(&data)?)
    }

    pub async fn new_complex(&self, token: &str, complex: &NewComplex) -> Result<Complex> {
        let data = self
            .fetch(token, Method::POST, "/complexes", Some(Self::encode(complex)?))
            .await?;
        Ok(self.hydrator.complex(&data)?)
    }

    pub async fn update_complex(&self, token: &str, id: &str, update: &ComplexUpdate) -> Result<()> {
        let body = Self::encode(update)?;
        self.execute(token, Method::PUT, &format!("/complexes/{}", id), Some(body))
            .await
    }

    /// Delete a complex, optionally together with its multi-apartment buildings.
    pub async fn delete_complex(
        &self,
        token: &str,
        id: &str,
        with_multi_apartment: bool,
    ) -> Result<()> {
        let body = json!({ "with_multi_apartment": with_multi_apartment });
        self.execute(token, Method::DELETE, &format!("/complexes/{}", id), Some(body))
            .await
    }

    pub async fn add_multi_apartment_to_complex(
        &self,
        token: &str,
        complex_id: &str,
        multi_apartment_id: &str,
    ) -> Result<()> {
        let path = format!("/complexes/{}/multi-apartments/{}", complex_id, multi_apartment_id);
        self.execute(token, Method::POST, &path, None).await
    }

    pub async fn remove_multi_apartment_from_complex(
        &self,
        token: &str,
        complex_id: &str,
        multi_apartment_id: &str,
    ) -> Result<()> {
        let path = format!("/complexes/{}/multi-apartments/{}", complex_id, multi_apartment_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    // Links shared by houses, multi-apartment buildings and complexes

    pub async fn add_competitor(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        competitor_id: i64,
    ) -> Result<()> {
        let path = format!("{}/competitors/{}", building.path(), competitor_id);
        self.execute(token, Method::POST, &path, None).await
    }

    pub async fn remove_competitor(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        competitor_id: i64,
    ) -> Result<()> {
        let path = format!("{}/competitors/{}", building.path(), competitor_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    pub async fn new_agreement(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        agreement: &NewAgreement,
    ) -> Result<Agreement> {
        let path = format!("{}/agreements", building.path());
        let data = self
            .fetch(token, Method::POST, &path, Some(Self::encode(agreement)?))
            .await?;
        Ok(self.hydrator.agreement(&data)?)
    }

    pub async fn update_agreement(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        agreement_id: i64,
        update: &AgreementUpdate,
    ) -> Result<()> {
        let path = format!("{}/agreements/{}", building.path(), agreement_id);
        self.execute(token, Method::PUT, &path, Some(Self::encode(update)?))
            .await
    }

    pub async fn delete_agreement(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        agreement_id: i64,
    ) -> Result<()> {
        let path = format!("{}/agreements/{}", building.path(), agreement_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    pub async fn add_housing(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        housing_id: i64,
    ) -> Result<()> {
        let path = format!("{}/housings/{}", building.path(), housing_id);
        self.execute(token, Method::POST, &path, None).await
    }

    pub async fn remove_housing(
        &self,
        token: &str,
        building: BuildingRef<'_>,
        housing_id: i64,
    ) -> Result<()> {
        let path = format!("{}/housings/{}", building.path(), housing_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    // Attachments

    /// Register uploaded files (by link) on a building or section.
    pub async fn new_attachments<'a>(
        &self,
        token: &str,
        owner: impl Into<AttachmentOwner<'a>>,
        links: &[String],
    ) -> Result<Vec<Attachment>> {
        let path = format!("{}/attachments", owner.into().path());
        let data = self
            .call(token, Method::POST, &path, Vec::new(), Some(json!(links)))
            .await?;

        let items = into_list(data)?;
        hydrate_all(&items, |item| self.hydrator.attachment(item))
    }

    pub async fn remove_attachment<'a>(
        &self,
        token: &str,
        owner: impl Into<AttachmentOwner<'a>>,
        attachment_id: i64,
    ) -> Result<()> {
        let path = format!("{}/attachments/{}", owner.into().path(), attachment_id);
        self.execute(token, Method::DELETE, &path, None).await
    }

    /// Delete an attachment wherever it is attached.
    pub async fn delete_attachment(&self, token: &str, id: i64) -> Result<()> {
        self.execute(token, Method::DELETE, &format!("/attachments/{}", id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::RawResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays one canned outcome and records what was asked.
    struct MockTransport {
        outcome: std::result::Result<RawResponse, TransportError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl MockTransport {
        fn respond(status: u16, body: &str) -> Self {
            Self {
                outcome: Ok(RawResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn fail(error: TransportError) -> Self {
            Self {
                outcome: Err(error),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn perform(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<RawResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }

    fn facade(transport: MockTransport) -> BuildingsFacade<MockTransport> {
        BuildingsFacade::new(transport, &ClientConfig::with_base_url("http://some.host/api/"))
    }

    #[tokio::test]
    async fn requests_carry_token_and_json_headers() {
        let facade = facade(MockTransport::respond(204, ""));
        facade
            .add_competitor("some-token", BuildingRef::House("25"), 14)
            .await
            .unwrap();

        let seen = facade.transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "http://some.host/api/houses/25/competitors/14");
        assert!(request
            .headers
            .contains(&("Authorization".to_string(), "Bearer some-token".to_string())));
        assert!(request
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn section_attachments_use_nested_path() {
        let facade = facade(MockTransport::respond(200, "[]"));
        let owner = AttachmentOwner::Section {
            multi_apartment: "m1",
            section: "s1",
        };
        let attachments = facade
            .new_attachments("t", owner, &["link".to_string()])
            .await
            .unwrap();
        assert!(attachments.is_empty());

        let seen = facade.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].url,
            "http://some.host/api/multi-apartments/m1/sections/s1/attachments"
        );
        assert_eq!(seen[0].json, Some(json!(["link"])));
    }

    #[tokio::test]
    async fn transport_failures_are_wrapped() {
        let facade = facade(MockTransport::fail(
            TransportError::new("connection refused"),
        ));
        let err = facade.get_buildings("t").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.message(), "connection refused");
    }

    #[tokio::test]
    async fn entity_calls_reject_empty_bodies() {
        let facade = facade(MockTransport::respond(204, ""));
        let err = facade.get_house("t", "h1").await.unwrap_err();
        assert!(matches!(err, FacadeError::EmptyResponse));
    }

    #[tokio::test]
    async fn list_calls_accept_empty_bodies() {
        let facade = facade(MockTransport::respond(204, ""));
        assert!(facade.get_buildings("t").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_query_is_forwarded() {
        let facade = facade(MockTransport::respond(200, "[]"));
        let query = ListQuery {
            search: Some("Test".into()),
            limit: Some(10),
            ..ListQuery::default()
        };
        facade.get_housings("t", &query).await.unwrap();

        let seen = facade.transport.seen.lock().unwrap();
        assert_eq!(
            seen[0].query,
            vec![
                ("q".to_string(), "Test".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn hydration_errors_surface_as_facade_errors() {
        let facade = facade(MockTransport::respond(200, r#"{"id": 1}"#));
        let err = facade.get_competitor("t", 1).await.unwrap_err();
        match err {
            FacadeError::Hydration(err) => {
                assert_eq!(err.entity, "Competitor");
                assert_eq!(err.field, "name");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn listing_an_object_is_a_whole_response_error() {
        let facade = facade(MockTransport::respond(200, r#"{"id": 1}"#));
        match facade.get_houses("t", &ListQuery::default()).await.unwrap_err() {
            FacadeError::Hydration(err) => {
                assert_eq!(err.entity, "Response");
                assert_eq!(err.field, WHOLE_NODE);
                assert_eq!(err.reason, HydrationReason::InvalidType { expected: "array" });
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
