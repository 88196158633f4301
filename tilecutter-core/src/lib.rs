//! Turns a GeoJSON dataset into a pyramid of vector tiles.
//!
//! The pipeline runs in two passes:
//!
//! 1. **Ingest** ([`ingest`], [`geojson_ingest`]): every feature is projected,
//!    given a minzoom, and appended to a temp-file pair (`coord.rs`,
//!    `tempstream.rs`) via the [`GeomProcessor`]/[`PropertyProcessor`]/
//!    [`FeatureProcessor`] visitor traits.
//! 2. **Recursion** ([`recursor`]): the temp files are walked level by level,
//!    each tile is encoded ([`tile_encoder`]) and written to the archive
//!    ([`archive`]) via the external `mvt`/`pmtiles2` crates.
pub mod archive;
pub mod context;
pub mod coord;
pub mod error;
pub mod feature_processor;
pub mod geojson_ingest;
pub mod geometry_processor;
pub mod ingest;
pub mod metadata;
pub mod ops;
pub mod pipeline;
pub mod property;
pub mod property_processor;
pub mod recursor;
pub mod tempstream;
pub mod tile_encoder;

pub use error::{Result, TcError};
pub use feature_processor::FeatureProcessor;
pub use geometry_processor::GeomProcessor;
pub use property_processor::{PropertyProcessor, PropertyValue};

/// Feature processor implementation that does nothing; useful for testing
/// just the traversal of a dataset without caring about the result.
#[derive(Default)]
pub struct ProcessorSink;

impl GeomProcessor for ProcessorSink {}
impl PropertyProcessor for ProcessorSink {}
impl FeatureProcessor for ProcessorSink {}
