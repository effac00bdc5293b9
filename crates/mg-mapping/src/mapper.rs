//! Mapper traits and the instrumented [`Mapper`] wrapper.
//!
//! An entity pair implements [`TypeMapper`], which holds only the conversion
//! logic. Wrapping it in [`Mapper`] adds the behaviour every mapper shares:
//!
//! - absent input is rejected with [`MappingError::InvalidArgument`]
//! - hook errors are wrapped once in [`MappingError::Conversion`]
//! - panics inside a hook are caught and reported as conversion failures
//! - every call, including rejected ones, is timed into [`MapperMetrics`]
//!
//! Registry lookups hand out [`Mapper`]s as `Arc<dyn BidirectionalMapper<W, G>>`
//! (typed) or `Arc<dyn MapperInfo>` (type-erased, for enumeration).

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::error::{BoxError, ConversionPanic, MappingError};
use crate::metrics::{Direction, MapperMetrics};

/// A model type that can take part in a mapping.
///
/// `TYPE_NAME` identifies the type in [`MapperKey`]s, error messages, and
/// reports. It must be unique among the types registered in one
/// [`MapperRegistry`](crate::MapperRegistry).
pub trait ModelType: Send + Sync + 'static {
    /// Stable, human-readable type name.
    const TYPE_NAME: &'static str;
}

/// Identity of a mapper: the (wrapper, generated) type-name pair.
///
/// # Examples
///
/// ```
/// use mg_mapping::MapperKey;
///
/// let key = MapperKey::new("CostCode", "CostCodeDto");
/// assert_eq!(key.to_string(), "CostCode<->CostCodeDto");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MapperKey {
    /// Wrapper model type name.
    pub wrapper: &'static str,
    /// Generated record type name.
    pub generated: &'static str,
}

impl MapperKey {
    /// Creates a key from two type names.
    #[inline]
    #[must_use]
    pub const fn new(wrapper: &'static str, generated: &'static str) -> Self {
        Self { wrapper, generated }
    }

    /// Creates the key for the `W`/`G` pair.
    #[inline]
    #[must_use]
    pub const fn of<W: ModelType, G: ModelType>() -> Self {
        Self::new(W::TYPE_NAME, G::TYPE_NAME)
    }
}

impl fmt::Display for MapperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.wrapper, self.generated)
    }
}

/// Conversion logic for one wrapper/generated pair.
///
/// Hooks receive present input only and may fail with any error. Expected
/// gaps in the input (missing ids, strings, timestamps) should be filled with
/// defaults rather than reported; see [`crate::convert`].
///
/// Returning a [`FieldError`](crate::FieldError) names the offending field in
/// the resulting [`MappingError`].
pub trait TypeMapper: Send + Sync + 'static {
    /// Hand-written domain model.
    type Wrapper: ModelType;
    /// Record type produced by the generated client.
    type Generated: ModelType;

    /// Converts a generated record into the wrapper model.
    fn to_wrapper(&self, source: &Self::Generated) -> Result<Self::Wrapper, BoxError>;

    /// Converts a wrapper model into the generated record.
    fn to_generated(&self, source: &Self::Wrapper) -> Result<Self::Generated, BoxError>;
}

/// Type-erased view of a registered mapper.
pub trait MapperInfo: Send + Sync {
    /// The (wrapper, generated) identity of this mapper.
    fn key(&self) -> MapperKey;

    /// Short name of the mapper implementation, e.g. `CostCodeMapper`.
    fn name(&self) -> &'static str;

    /// The mapper's metrics collector.
    fn metrics(&self) -> &MapperMetrics;
}

/// Typed, object-safe conversion interface for the `W`/`G` pair.
///
/// Strict variants return [`MappingError`]; `try_` variants collapse every
/// failure, absent input included, into `None`.
pub trait BidirectionalMapper<W, G>: MapperInfo {
    /// Converts a generated record into the wrapper model.
    fn map_to_wrapper(&self, source: Option<&G>) -> Result<W, MappingError>;

    /// Converts a wrapper model into the generated record.
    fn map_to_generated(&self, source: Option<&W>) -> Result<G, MappingError>;

    /// Like [`map_to_wrapper`](Self::map_to_wrapper), discarding the error.
    fn try_map_to_wrapper(&self, source: Option<&G>) -> Option<W> {
        self.map_to_wrapper(source).ok()
    }

    /// Like [`map_to_generated`](Self::map_to_generated), discarding the error.
    fn try_map_to_generated(&self, source: Option<&W>) -> Option<G> {
        self.map_to_generated(source).ok()
    }
}

/// A [`TypeMapper`] with validation, error wrapping, and metrics.
///
/// # Examples
///
/// ```
/// use mg_mapping::{BidirectionalMapper, BoxError, Mapper, MapperInfo, ModelType, TypeMapper};
///
/// #[derive(Debug)]
/// struct Celsius(f64);
/// impl ModelType for Celsius { const TYPE_NAME: &'static str = "Celsius"; }
/// struct Fahrenheit(f64);
/// impl ModelType for Fahrenheit { const TYPE_NAME: &'static str = "Fahrenheit"; }
///
/// struct TemperatureMapper;
/// impl TypeMapper for TemperatureMapper {
///     type Wrapper = Celsius;
///     type Generated = Fahrenheit;
///     fn to_wrapper(&self, f: &Fahrenheit) -> Result<Celsius, BoxError> {
///         Ok(Celsius((f.0 - 32.0) * 5.0 / 9.0))
///     }
///     fn to_generated(&self, c: &Celsius) -> Result<Fahrenheit, BoxError> {
///         Ok(Fahrenheit(c.0 * 9.0 / 5.0 + 32.0))
///     }
/// }
///
/// let mapper = Mapper::new(TemperatureMapper);
/// let boiling = mapper.map_to_generated(Some(&Celsius(100.0))).unwrap();
/// assert!((boiling.0 - 212.0).abs() < 1e-9);
///
/// assert!(mapper.map_to_wrapper(None).unwrap_err().is_invalid_argument());
/// assert_eq!(mapper.metrics().snapshot().total_calls(), 2);
/// ```
pub struct Mapper<M: TypeMapper> {
    inner: M,
    metrics: MapperMetrics,
    name: &'static str,
}

impl<M: TypeMapper> Mapper<M> {
    /// Wraps `inner` with a fresh metrics collector.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            metrics: MapperMetrics::new(),
            name: short_type_name::<M>(),
        }
    }

    /// Returns the wrapped conversion logic.
    #[inline]
    pub const fn inner(&self) -> &M {
        &self.inner
    }

    fn run<S, T>(
        &self,
        direction: Direction,
        source: Option<&S>,
        hook: impl FnOnce(&S) -> Result<T, BoxError>,
    ) -> Result<T, MappingError>
    where
        S: ModelType,
        T: ModelType,
    {
        let start = Instant::now();

        let result = match source {
            None => Err(MappingError::invalid_argument(S::TYPE_NAME, T::TYPE_NAME)),
            Some(source) => match panic::catch_unwind(AssertUnwindSafe(|| hook(source))) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(cause)) => Err(MappingError::wrap(S::TYPE_NAME, T::TYPE_NAME, cause)),
                Err(payload) => Err(MappingError::wrap(
                    S::TYPE_NAME,
                    T::TYPE_NAME,
                    Box::new(ConversionPanic(panic_message(payload.as_ref()))),
                )),
            },
        };

        let failed = result
            .as_ref()
            .err()
            .is_some_and(MappingError::counts_as_mapper_error);
        self.metrics.record(direction, start.elapsed(), !failed);

        if let Err(err) = &result {
            debug!(mapper = self.name, %direction, error = %err, "Mapping failed");
        }

        result
    }
}

impl<M: TypeMapper> MapperInfo for Mapper<M> {
    fn key(&self) -> MapperKey {
        MapperKey::of::<M::Wrapper, M::Generated>()
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn metrics(&self) -> &MapperMetrics {
        &self.metrics
    }
}

impl<M: TypeMapper> BidirectionalMapper<M::Wrapper, M::Generated> for Mapper<M> {
    fn map_to_wrapper(&self, source: Option<&M::Generated>) -> Result<M::Wrapper, MappingError> {
        self.run(Direction::ToWrapper, source, |s| self.inner.to_wrapper(s))
    }

    fn map_to_generated(&self, source: Option<&M::Wrapper>) -> Result<M::Generated, MappingError> {
        self.run(Direction::ToGenerated, source, |s| self.inner.to_generated(s))
    }
}

impl<M: TypeMapper> fmt::Debug for Mapper<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("name", &self.name)
            .field("key", &self.key())
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

/// Last path segment of a type name, e.g. `CostCodeMapper`.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: i64,
    }

    impl ModelType for Widget {
        const TYPE_NAME: &'static str = "Widget";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct WidgetDto {
        id: Option<i64>,
    }

    impl ModelType for WidgetDto {
        const TYPE_NAME: &'static str = "WidgetDto";
    }

    /// Fails on negative ids, panics on `i64::MIN`.
    struct WidgetMapper;

    #[allow(clippy::panic)]
    impl TypeMapper for WidgetMapper {
        type Wrapper = Widget;
        type Generated = WidgetDto;

        fn to_wrapper(&self, source: &WidgetDto) -> Result<Widget, BoxError> {
            match source.id {
                Some(i64::MIN) => panic!("id underflow"),
                Some(id) if id < 0 => Err(FieldError::new("id", "negative").into()),
                id => Ok(Widget { id: id.unwrap_or(0) }),
            }
        }

        fn to_generated(&self, source: &Widget) -> Result<WidgetDto, BoxError> {
            if source.id < 0 {
                return Err("negative id".into());
            }
            Ok(WidgetDto { id: Some(source.id) })
        }
    }

    #[test]
    fn test_round_trip() {
        let mapper = Mapper::new(WidgetMapper);
        let widget = Widget { id: 7 };
        let dto = mapper.map_to_generated(Some(&widget)).unwrap();
        assert_eq!(mapper.map_to_wrapper(Some(&dto)).unwrap(), widget);
    }

    #[test]
    fn test_missing_field_defaults_without_error() {
        let mapper = Mapper::new(WidgetMapper);
        let widget = mapper.map_to_wrapper(Some(&WidgetDto { id: None })).unwrap();
        assert_eq!(widget.id, 0);
        assert_eq!(mapper.metrics().to_wrapper_errors(), 0);
        assert_eq!(mapper.metrics().to_wrapper_calls(), 1);
    }

    #[test]
    fn test_absent_input_is_invalid_argument() {
        let mapper = Mapper::new(WidgetMapper);
        let err = mapper.map_to_wrapper(None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.source_type(), "WidgetDto");
        assert_eq!(err.target_type(), "Widget");

        // Timed and counted, but not a mapper error.
        let snap = mapper.metrics().snapshot();
        assert_eq!(snap.to_wrapper.calls, 1);
        assert_eq!(snap.to_wrapper.errors, 0);
    }

    #[test]
    fn test_hook_error_is_wrapped_with_field() {
        let mapper = Mapper::new(WidgetMapper);
        let err = mapper
            .map_to_wrapper(Some(&WidgetDto { id: Some(-3) }))
            .unwrap_err();
        assert_eq!(err.field(), Some("id"));
        assert_eq!(err.source_type(), "WidgetDto");
        assert_eq!(mapper.metrics().to_wrapper_errors(), 1);
    }

    #[test]
    fn test_panic_is_caught_and_counted() {
        let mapper = Mapper::new(WidgetMapper);
        let err = mapper
            .map_to_wrapper(Some(&WidgetDto { id: Some(i64::MIN) }))
            .unwrap_err();
        assert!(err.to_string().contains("id underflow"));
        assert!(err.counts_as_mapper_error());
        assert_eq!(mapper.metrics().to_wrapper_errors(), 1);

        // The mapper stays usable after a caught panic.
        assert!(mapper.map_to_wrapper(Some(&WidgetDto { id: Some(1) })).is_ok());
    }

    #[test]
    fn test_try_variants_never_fail_loudly() {
        let mapper = Mapper::new(WidgetMapper);
        assert!(mapper.try_map_to_generated(None).is_none());
        assert!(mapper.try_map_to_generated(Some(&Widget { id: -1 })).is_none());
        assert_eq!(
            mapper.try_map_to_generated(Some(&Widget { id: 4 })),
            Some(WidgetDto { id: Some(4) })
        );

        let snap = mapper.metrics().snapshot();
        assert_eq!(snap.to_generated.calls, 3);
        assert_eq!(snap.to_generated.errors, 1);
    }

    #[test]
    fn test_mapper_info() {
        let mapper = Mapper::new(WidgetMapper);
        assert_eq!(mapper.name(), "WidgetMapper");
        assert_eq!(mapper.key(), MapperKey::of::<Widget, WidgetDto>());
        assert!(format!("{mapper:?}").contains("WidgetMapper"));
    }

    #[test]
    fn test_concurrent_calls_share_metrics() {
        let mapper = Mapper::new(WidgetMapper);
        std::thread::scope(|scope| {
            for t in 0..8 {
                let mapper = &mapper;
                scope.spawn(move || {
                    for i in 0..250 {
                        let id = if i % 50 == 0 { -1 } else { t * 1000 + i };
                        let _ = mapper.map_to_generated(Some(&Widget { id }));
                    }
                });
            }
        });
        let snap = mapper.metrics().snapshot();
        assert_eq!(snap.to_generated.calls, 2000);
        assert_eq!(snap.to_generated.errors, 40);
    }
}
