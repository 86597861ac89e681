pub mod buildings;
pub mod requests;

pub use buildings::{AttachmentOwner, BuildingRef, BuildingsFacade};
pub use requests::{
    AgreementUpdate, ComplexUpdate, HouseUpdate, HousingUpdate, ListQuery, MultiApartmentUpdate,
    NewAgreement, NewComplex, NewHouse, NewHousing, NewMultiApartment, NewSection, SectionUpdate,
};
