pub mod catalog;
pub mod manifest;
pub mod registration;

pub use catalog::{CatalogResponse, SOURCE_ADDON_FIELD};
pub use manifest::{AddonManifest, BehaviorHints, CatalogDescriptor, CombinedCatalog, CombinedManifest, ManifestInfo};
pub use registration::{CatalogRegistration, RegistrationStatus};
