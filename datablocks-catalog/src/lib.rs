//! Glossary storage and on-disk catalog materialization.
//!
//! The pipeline is one-directional: glossarizers accumulate resource and
//! glossary files through [`store`]; [`materialize`] turns a glossary into a
//! `catalog/` + `tasks/` folder tree; [`finalize`] prunes entries that still
//! need hand-written transforms. Workflow construction over the resulting
//! tree lives in `datablocks-workflow`.

pub mod datapackage;
pub mod error;
pub mod finalize;
pub mod index;
pub mod layout;
pub mod materialize;
pub mod slug;
pub mod store;

pub use datapackage::{DataPackage, ManifestPath, make_package, make_package_with};
pub use error::{CatalogError, StoreError};
pub use finalize::{FinalizeReport, finalize};
pub use layout::CatalogLayout;
pub use materialize::{MaterializeReport, init_catalog, init_catalog_entries};
pub use slug::{NameResolver, slugify};
pub use store::{load_glossary, load_resources, load_todo, sync_resource_flags, write_glossary, write_resources};
