pub mod composite_id;
pub mod shuffle;
pub mod compositor;
pub mod router;

pub use composite_id::{composite_catalog_id, candidate_fragment, COMPOSITE_SEPARATOR};
pub use shuffle::{shuffle, shuffle_with};
pub use compositor::ManifestCompositor;
pub use router::{CatalogRequest, CatalogRouter, ResolvedCatalog, resolve_catalog, tag_and_order};
