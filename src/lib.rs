//! Typed client for the buildings catalog API.
//!
//! Responses pass through [`normalize::normalize`], which turns error
//! statuses into [`FacadeError`]s, and then through the [`Hydrator`], which
//! rebuilds the discriminated JSON tree into [`Building`] values.

pub mod config;
pub mod error;
pub mod facades;
pub mod hydrate;
pub mod models;
pub mod normalize;
pub mod transport;

pub use config::{ClientConfig, HydrationOptions, UnknownDiscriminant};
pub use error::{FacadeError, HydrationError, HydrationReason, TransportError};
pub use facades::{AttachmentOwner, BuildingRef, BuildingsFacade, ListQuery};
pub use hydrate::Hydrator;
pub use models::{
    Agreement, Attachment, Audit, Building, BuildingInfo, BuildingKind, Competitor, Complex,
    House, Housing, MultiApartment, Section,
};
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport};
