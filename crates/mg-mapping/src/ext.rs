//! Collection helpers on top of [`BidirectionalMapper`] and [`MapperRegistry`].
//!
//! The strict helpers stop at the first failure. The lenient `try_` helpers
//! skip items that fail to convert; each skipped item is still counted in
//! the mapper's metrics.

use crate::error::{MappingError, RegistryError};
use crate::mapper::{BidirectionalMapper, ModelType};
use crate::registry::MapperRegistry;

/// Converts every generated record, stopping at the first failure.
pub fn map_all_to_wrapper<W, G>(
    mapper: &dyn BidirectionalMapper<W, G>,
    items: &[G],
) -> Result<Vec<W>, MappingError> {
    items
        .iter()
        .map(|item| mapper.map_to_wrapper(Some(item)))
        .collect()
}

/// Converts every wrapper model, stopping at the first failure.
pub fn map_all_to_generated<W, G>(
    mapper: &dyn BidirectionalMapper<W, G>,
    items: &[W],
) -> Result<Vec<G>, MappingError> {
    items
        .iter()
        .map(|item| mapper.map_to_generated(Some(item)))
        .collect()
}

/// Converts the generated records that can be converted, in order.
pub fn try_map_all_to_wrapper<W, G>(
    mapper: &dyn BidirectionalMapper<W, G>,
    items: &[G],
) -> Vec<W> {
    items
        .iter()
        .filter_map(|item| mapper.try_map_to_wrapper(Some(item)))
        .collect()
}

/// Converts the wrapper models that can be converted, in order.
pub fn try_map_all_to_generated<W, G>(
    mapper: &dyn BidirectionalMapper<W, G>,
    items: &[W],
) -> Vec<G> {
    items
        .iter()
        .filter_map(|item| mapper.try_map_to_generated(Some(item)))
        .collect()
}

/// Error from a registry-driven collection conversion.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// No usable mapper for the pair.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// An item failed to convert.
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl MapperRegistry {
    /// Converts generated records through the registered `W`/`G` mapper.
    pub fn map_all_to_wrapper<W: ModelType, G: ModelType>(
        &self,
        items: &[G],
    ) -> Result<Vec<W>, CollectionError> {
        let mapper = self.get_mapper::<W, G>()?;
        Ok(map_all_to_wrapper(mapper.as_ref(), items)?)
    }

    /// Converts wrapper models through the registered `W`/`G` mapper.
    pub fn map_all_to_generated<W: ModelType, G: ModelType>(
        &self,
        items: &[W],
    ) -> Result<Vec<G>, CollectionError> {
        let mapper = self.get_mapper::<W, G>()?;
        Ok(map_all_to_generated(mapper.as_ref(), items)?)
    }
}
