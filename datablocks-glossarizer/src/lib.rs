//! Generic "download and sniff" glossarization.
//!
//! A [`Sizer`] fetches a resource and reports the datasets it contains;
//! [`glossarize_resource`] turns that into glossary entries and resource
//! flags; [`run_glossarize`] drives it over a whole resource file.
//! [`HttpSizer`] is the production sizer.

pub mod error;
pub mod glossarize;
pub mod http;
pub mod progress;
pub mod sizing;

pub use error::{GlossarizeError, SizingError};
pub use glossarize::{GlossarizeReport, Glossarized, Outcome, glossarize_resource, run_glossarize};
pub use http::HttpSizer;
pub use progress::{GlossarizeProgress, LogProgress, SilentProgress};
pub use sizing::{Sizer, Sizing};
