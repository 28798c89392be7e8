#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

//! Builds a static site's show collection: every show of a registry, with the episodes of its
//! YouTube playlist export and the dates the show pages display.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod episode;
pub mod registry;
pub mod source;
pub mod util;

pub use aggregate::{ShowCollection, ShowRecord, ShowSummary, aggregate};
pub use config::{CacheDuration, EpisodeLimit};
pub use registry::{Registry, ShowMetadata, load_registry};
pub use source::EpisodeSource;
