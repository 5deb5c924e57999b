//! Shared data model for the open-data catalog pipeline.
//!
//! Portal glossarizers emit [`Resource`] records; sizing turns them into
//! [`GlossaryEntry`] records; everything downstream (catalog materialization,
//! workflow construction) consumes glossary entries.

pub mod error;
pub mod record;
pub mod settings;

pub use error::SchemaError;
pub use record::{Filesize, Flag, GlossaryEntry, READY_FORMATS, Resource, STANDALONE_DATASET};
pub use settings::Settings;
