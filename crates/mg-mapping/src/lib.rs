//! Bidirectional type mappers with atomic metrics and a concurrent registry.
//!
//! This crate converts between hand-written wrapper models and the loosely
//! typed records produced by a generated REST client, and measures every
//! conversion it performs.
//!
//! # Overview
//!
//! - [`TypeMapper`]: the two conversion hooks an entity pair implements
//! - [`Mapper`]: wraps a [`TypeMapper`] with input validation, error wrapping,
//!   panic isolation, and a [`MapperMetrics`] collector
//! - [`MapperRegistry`]: a [`DashMap`](dashmap::DashMap)-backed store keyed by
//!   [`MapperKey`]
//! - [`convert`]: field helpers shared by mapper implementations (identifier
//!   and string normalisation, currency rounding, timestamp parsing)
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mg_mapping::{
//!     BidirectionalMapper, BoxError, MapperInfo, MapperRegistry, ModelType, TypeMapper,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Tag(String);
//! impl ModelType for Tag {
//!     const TYPE_NAME: &'static str = "Tag";
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct TagDto { label: Option<String> }
//! impl ModelType for TagDto {
//!     const TYPE_NAME: &'static str = "TagDto";
//! }
//!
//! struct TagMapper;
//! impl TypeMapper for TagMapper {
//!     type Wrapper = Tag;
//!     type Generated = TagDto;
//!
//!     fn to_wrapper(&self, source: &TagDto) -> Result<Tag, BoxError> {
//!         Ok(Tag(source.label.clone().unwrap_or_default()))
//!     }
//!
//!     fn to_generated(&self, source: &Tag) -> Result<TagDto, BoxError> {
//!         Ok(TagDto { label: Some(source.0.clone()) })
//!     }
//! }
//!
//! let registry = Arc::new(MapperRegistry::new());
//! registry.register_mapper(TagMapper);
//!
//! let mapper = registry.get_mapper::<Tag, TagDto>().unwrap();
//! let tag = mapper.map_to_wrapper(Some(&TagDto { label: Some("urgent".into()) })).unwrap();
//! assert_eq!(tag, Tag("urgent".into()));
//! assert_eq!(mapper.metrics().snapshot().to_wrapper.calls, 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! MapperRegistry (DashMap<MapperKey, entry>)
//!     │
//!     ├── Arc<dyn MapperInfo>                    (enumeration, metrics)
//!     └── Arc<dyn BidirectionalMapper<W, G>>     (typed lookup)
//!             │
//!             └── Mapper<M: TypeMapper>
//!                     ├── M::to_wrapper / M::to_generated
//!                     └── MapperMetrics (AtomicU64 counters per direction)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod ext;
pub mod mapper;
pub mod metrics;
pub mod registry;

pub use error::{BoxError, FieldError, MappingError, RegistryError};
pub use ext::CollectionError;
pub use mapper::{BidirectionalMapper, Mapper, MapperInfo, MapperKey, ModelType, TypeMapper};
pub use metrics::{Direction, DirectionSnapshot, MapperMetrics, MetricsSnapshot, ValidationResult};
pub use registry::{MapperPerformanceReport, MapperRegistry};
