//! Concurrent mapper registry.
//!
//! This module provides [`MapperRegistry`], a thread-safe store of
//! [`Mapper`]s keyed by [`MapperKey`] and backed by [`DashMap`].
//!
//! # Safety Pattern
//!
//! To avoid `DashMap` deadlocks, the registry:
//!
//! - **Never exposes `Ref` types** publicly
//! - **Clones `Arc` handles** out of the map before using them
//! - **Never holds a shard guard** while calling into a mapper
//!
//! # Replacement
//!
//! Registering a second mapper under an existing key replaces the first.
//! Callers that already hold the old `Arc` keep a working mapper, but every
//! lookup after the replacement returns the new one.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::mapper::{BidirectionalMapper, Mapper, MapperInfo, MapperKey, ModelType, TypeMapper};
use crate::metrics::{MetricsSnapshot, ValidationResult};

#[derive(Clone)]
struct Entry {
    info: Arc<dyn MapperInfo>,
    /// An `Arc<dyn BidirectionalMapper<W, G>>` for the key's `W`/`G`.
    typed: Arc<dyn Any + Send + Sync>,
}

/// Performance verdict for one registered mapper.
#[derive(Debug, Clone, Serialize)]
pub struct MapperPerformanceReport {
    /// The mapper's key.
    pub key: MapperKey,
    /// Short name of the mapper implementation.
    pub mapper_name: &'static str,
    /// Threshold checks against the requested targets.
    pub validation: ValidationResult,
    /// The counters the checks were computed from.
    pub metrics: MetricsSnapshot,
}

/// A thread-safe registry of mappers.
///
/// The registry is an ordinary value: construct one, share it behind an
/// `Arc`, and pass it to whatever needs conversions.
///
/// # Examples
///
/// ```
/// use mg_mapping::{BoxError, MapperKey, MapperRegistry, ModelType, TypeMapper};
///
/// struct Meters(f64);
/// impl ModelType for Meters { const TYPE_NAME: &'static str = "Meters"; }
/// struct Feet(f64);
/// impl ModelType for Feet { const TYPE_NAME: &'static str = "Feet"; }
///
/// struct LengthMapper;
/// impl TypeMapper for LengthMapper {
///     type Wrapper = Meters;
///     type Generated = Feet;
///     fn to_wrapper(&self, f: &Feet) -> Result<Meters, BoxError> { Ok(Meters(f.0 * 0.3048)) }
///     fn to_generated(&self, m: &Meters) -> Result<Feet, BoxError> { Ok(Feet(m.0 / 0.3048)) }
/// }
///
/// let registry = MapperRegistry::new();
/// registry.register_mapper(LengthMapper);
///
/// assert!(registry.contains(&MapperKey::of::<Meters, Feet>()));
/// assert_eq!(registry.mappers_for_wrapper_type("Meters").len(), 1);
/// assert!(registry.try_get_mapper::<Feet, Meters>().is_none());
/// ```
#[derive(Default)]
pub struct MapperRegistry {
    mappers: DashMap<MapperKey, Entry>,
}

impl MapperRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mapper`, replacing any mapper under the same key.
    ///
    /// Returns the displaced mapper, if there was one.
    pub fn register<M: TypeMapper>(&self, mapper: Arc<Mapper<M>>) -> Option<Arc<dyn MapperInfo>> {
        let key = mapper.key();
        let name = mapper.name();
        let typed: Arc<dyn BidirectionalMapper<M::Wrapper, M::Generated>> = Arc::clone(&mapper) as _;
        let entry = Entry {
            info: mapper,
            typed: Arc::new(typed),
        };

        let previous = self.mappers.insert(key, entry).map(|old| old.info);
        match &previous {
            Some(old) => info!(%key, mapper = name, replaced = old.name(), "Replaced mapper"),
            None => debug!(%key, mapper = name, "Registered mapper"),
        }
        previous
    }

    /// Wraps `inner` in a [`Mapper`], registers it, and returns the handle.
    pub fn register_mapper<M: TypeMapper>(&self, inner: M) -> Arc<Mapper<M>> {
        let mapper = Arc::new(Mapper::new(inner));
        self.register(Arc::clone(&mapper));
        mapper
    }

    /// Returns the mapper for `W`/`G`.
    pub fn get_mapper<W: ModelType, G: ModelType>(
        &self,
    ) -> Result<Arc<dyn BidirectionalMapper<W, G>>, RegistryError> {
        let key = MapperKey::of::<W, G>();
        let typed = self
            .mappers
            .get(&key)
            .map(|entry| Arc::clone(&entry.typed))
            .ok_or(RegistryError::NotRegistered { key })?;

        typed
            .downcast_ref::<Arc<dyn BidirectionalMapper<W, G>>>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch { key })
    }

    /// Returns the mapper for `W`/`G`, or `None`.
    pub fn try_get_mapper<W: ModelType, G: ModelType>(
        &self,
    ) -> Option<Arc<dyn BidirectionalMapper<W, G>>> {
        self.get_mapper().ok()
    }

    /// Returns the mapper registered under a runtime key.
    pub fn get_mapper_by_key(&self, key: &MapperKey) -> Result<Arc<dyn MapperInfo>, RegistryError> {
        self.try_get_mapper_by_key(key)
            .ok_or(RegistryError::NotRegistered { key: *key })
    }

    /// Returns the mapper registered under a runtime key, or `None`.
    pub fn try_get_mapper_by_key(&self, key: &MapperKey) -> Option<Arc<dyn MapperInfo>> {
        self.mappers.get(key).map(|entry| Arc::clone(&entry.info))
    }

    /// Returns `true` if a mapper is registered under `key`.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &MapperKey) -> bool {
        self.mappers.contains_key(key)
    }

    /// Returns every registered mapper, ordered by key.
    #[must_use]
    pub fn all_mappers(&self) -> Vec<Arc<dyn MapperInfo>> {
        self.collect_where(|_| true)
    }

    /// Returns the mappers whose wrapper type is `wrapper`, ordered by key.
    #[must_use]
    pub fn mappers_for_wrapper_type(&self, wrapper: &str) -> Vec<Arc<dyn MapperInfo>> {
        self.collect_where(|key| key.wrapper == wrapper)
    }

    /// Returns the mappers whose generated type is `generated`, ordered by key.
    #[must_use]
    pub fn mappers_for_generated_type(&self, generated: &str) -> Vec<Arc<dyn MapperInfo>> {
        self.collect_where(|key| key.generated == generated)
    }

    /// Returns every registered key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<MapperKey> {
        let mut keys: Vec<MapperKey> = self.mappers.iter().map(|entry| *entry.key()).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered mappers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Returns `true` if no mapper is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Removes every mapper.
    pub fn clear(&self) {
        self.mappers.clear();
        debug!("Cleared mapper registry");
    }

    /// Checks every registered mapper against the same two thresholds.
    #[must_use]
    pub fn validate_performance(
        &self,
        target_average_ms: f64,
        max_error_rate: f64,
    ) -> Vec<MapperPerformanceReport> {
        self.all_mappers()
            .into_iter()
            .map(|mapper| {
                let metrics = mapper.metrics().snapshot();
                MapperPerformanceReport {
                    key: mapper.key(),
                    mapper_name: mapper.name(),
                    validation: metrics.validate(target_average_ms, max_error_rate),
                    metrics,
                }
            })
            .collect()
    }

    /// Resets the metrics of every registered mapper.
    pub fn reset_metrics(&self) {
        for mapper in self.all_mappers() {
            mapper.metrics().reset();
        }
    }

    fn collect_where(&self, predicate: impl Fn(&MapperKey) -> bool) -> Vec<Arc<dyn MapperInfo>> {
        let mut found: Vec<(MapperKey, Arc<dyn MapperInfo>)> = self
            .mappers
            .iter()
            .filter(|entry| predicate(entry.key()))
            .map(|entry| (*entry.key(), Arc::clone(&entry.value().info)))
            .collect();
        found.sort_unstable_by_key(|(key, _)| *key);
        found.into_iter().map(|(_, mapper)| mapper).collect()
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
