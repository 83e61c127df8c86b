//! Operation Registry and Discovery
//!
//! A type exposes its benchmarkable operations through [`Benchmarkable`],
//! which hands back an [`OperationRegistry`]. The registry is usually
//! generated by `#[benchmarks]` from `#[benchmark]` markers, but can be built
//! by hand:
//!
//! ```ignore
//! impl Benchmarkable for Hashes {
//!     fn operations() -> OperationRegistry<Self> {
//!         OperationRegistry::builder("Hashes")
//!             .benchmark("sha256", |h: &Hashes| h.sha256())
//!             .operation("reset_count", |h: &Hashes| h.reset_count())
//!             .build()
//!     }
//! }
//! ```
//!
//! Operations keep insertion order. Only tagged operations are discovered;
//! every operation, tagged or not, can be resolved by exact name.

use crate::error::{BoxError, HarnessError, Result};
use std::borrow::Cow;
use std::fmt;

type Invoker<T> = Box<dyn Fn(&T) -> std::result::Result<(), BoxError>>;

/// Types whose operations can be discovered and measured.
pub trait Benchmarkable: Sized {
    /// Build a fresh registry of this type's operations.
    fn operations() -> OperationRegistry<Self>;
}

/// Name and tag state of a registered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    /// Operation name
    pub name: String,
    /// Whether the operation is marked for automatic discovery
    pub tagged: bool,
}

struct Operation<T> {
    name: Cow<'static, str>,
    tagged: bool,
    invoke: Invoker<T>,
}

/// Ordered set of operations a type exposes.
pub struct OperationRegistry<T> {
    target: &'static str,
    operations: Vec<Operation<T>>,
}

impl<T> OperationRegistry<T> {
    /// Start building a registry for the type named `target`.
    pub fn builder(target: &'static str) -> OperationRegistryBuilder<T> {
        OperationRegistryBuilder {
            registry: OperationRegistry {
                target,
                operations: Vec::new(),
            },
        }
    }

    /// Name of the type the registry describes
    pub fn target_name(&self) -> &'static str {
        self.target
    }

    /// Number of registered operations, tagged or not
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Metadata for every operation in registration order
    pub fn infos(&self) -> Vec<OperationInfo> {
        self.operations
            .iter()
            .map(|op| OperationInfo {
                name: op.name.to_string(),
                tagged: op.tagged,
            })
            .collect()
    }

    /// Bind every tagged operation to `target`, keeping registration order.
    pub fn bind_tagged(self, target: &T) -> Vec<DiscoveredOperation<'_, T>> {
        self.operations
            .into_iter()
            .filter(|op| op.tagged)
            .map(|op| DiscoveredOperation {
                name: op.name,
                invoke: op.invoke,
                target,
            })
            .collect()
    }

    /// Bind the first operation named exactly `name` to `target`.
    pub fn bind<'a>(self, target: &'a T, name: &str) -> Result<DiscoveredOperation<'a, T>> {
        let type_name = self.target;
        self.operations
            .into_iter()
            .find(|op| op.name == name)
            .map(|op| DiscoveredOperation {
                name: op.name,
                invoke: op.invoke,
                target,
            })
            .ok_or_else(|| HarnessError::OperationNotFound {
                target: type_name,
                name: name.to_string(),
            })
    }
}

impl<T> fmt::Debug for OperationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("target", &self.target)
            .field("operations", &self.infos())
            .finish()
    }
}

/// Builder for [`OperationRegistry`].
pub struct OperationRegistryBuilder<T> {
    registry: OperationRegistry<T>,
}

impl<T> OperationRegistryBuilder<T> {
    fn push(
        mut self,
        name: impl Into<Cow<'static, str>>,
        tagged: bool,
        invoke: Invoker<T>,
    ) -> Self {
        self.registry.operations.push(Operation {
            name: name.into(),
            tagged,
            invoke,
        });
        self
    }

    /// Register a tagged operation; its return value is discarded.
    pub fn benchmark<R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&T) -> R + 'static,
    {
        self.push(name, true, infallible(f))
    }

    /// Register a tagged operation whose `Err` counts as an invocation failure.
    pub fn try_benchmark<R, E, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<R, E> + 'static,
        E: Into<BoxError>,
    {
        self.push(name, true, fallible(f))
    }

    /// Register an untagged operation: resolvable by name, never discovered.
    pub fn operation<R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&T) -> R + 'static,
    {
        self.push(name, false, infallible(f))
    }

    /// Register an untagged fallible operation.
    pub fn try_operation<R, E, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<R, E> + 'static,
        E: Into<BoxError>,
    {
        self.push(name, false, fallible(f))
    }

    /// Finish the registry
    pub fn build(self) -> OperationRegistry<T> {
        self.registry
    }
}

fn infallible<T, R, F>(f: F) -> Invoker<T>
where
    F: Fn(&T) -> R + 'static,
{
    Box::new(move |target: &T| {
        std::hint::black_box(f(target));
        Ok(())
    })
}

fn fallible<T, R, E, F>(f: F) -> Invoker<T>
where
    F: Fn(&T) -> std::result::Result<R, E> + 'static,
    E: Into<BoxError>,
{
    Box::new(move |target: &T| {
        std::hint::black_box(f(target).map_err(Into::<BoxError>::into)?);
        Ok(())
    })
}

/// An operation bound to one target instance.
pub struct DiscoveredOperation<'a, T> {
    name: Cow<'static, str>,
    invoke: Invoker<T>,
    target: &'a T,
}

impl<T> DiscoveredOperation<'_, T> {
    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the operation on its bound target.
    pub fn invoke(&self) -> std::result::Result<(), BoxError> {
        (self.invoke)(self.target)
    }
}

impl<T> fmt::Debug for DiscoveredOperation<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredOperation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Tagged operations of `target`, in registration order.
pub fn discover_operations<T: Benchmarkable>(target: &T) -> Vec<DiscoveredOperation<'_, T>> {
    T::operations().bind_tagged(target)
}

/// Like [`discover_operations`], for callers holding an optional target.
pub fn try_discover_operations<T: Benchmarkable>(
    target: Option<&T>,
) -> Result<Vec<DiscoveredOperation<'_, T>>> {
    let target = target.ok_or_else(|| {
        HarnessError::InvalidTarget(format!(
            "no instance of {} was supplied",
            std::any::type_name::<T>()
        ))
    })?;
    Ok(discover_operations(target))
}

/// Find the operation named exactly `name` (case-sensitive) on `target`.
pub fn resolve_operation<'a, T: Benchmarkable>(
    target: &'a T,
    name: &str,
) -> Result<DiscoveredOperation<'a, T>> {
    T::operations().bind(target, name)
}

/// Metadata for every operation of `T`, without an instance.
pub fn list_operations<T: Benchmarkable>() -> Vec<OperationInfo> {
    T::operations().infos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        hits: Cell<u32>,
    }

    impl Counter {
        fn bump(&self) -> u32 {
            self.hits.set(self.hits.get() + 1);
            self.hits.get()
        }
    }

    impl Benchmarkable for Counter {
        fn operations() -> OperationRegistry<Self> {
            OperationRegistry::builder("Counter")
                .benchmark("zeta", |c: &Counter| c.bump())
                .operation("helper", |c: &Counter| c.hits.get())
                .benchmark("alpha", |c: &Counter| c.bump())
                .try_benchmark("fails", |_: &Counter| Err::<(), _>("nope"))
                .build()
        }
    }

    struct Plain;

    impl Benchmarkable for Plain {
        fn operations() -> OperationRegistry<Self> {
            OperationRegistry::builder("Plain")
                .operation("untagged", |_: &Plain| ())
                .build()
        }
    }

    fn counter() -> Counter {
        Counter { hits: Cell::new(0) }
    }

    #[test]
    fn test_discovery_returns_tagged_in_order() {
        let c = counter();
        let names: Vec<_> = discover_operations(&c)
            .iter()
            .map(|op| op.name().to_string())
            .collect();
        assert_eq!(names, ["zeta", "alpha", "fails"]);
    }

    #[test]
    fn test_discovery_order_is_stable() {
        let a = counter();
        let b = counter();
        let first: Vec<_> = discover_operations(&a).iter().map(|o| o.name().to_string()).collect();
        let second: Vec<_> = discover_operations(&b).iter().map(|o| o.name().to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_untagged_type_discovers_nothing() {
        assert!(discover_operations(&Plain).is_empty());
        assert_eq!(list_operations::<Plain>().len(), 1);
    }

    #[test]
    fn test_discovered_operation_is_bound() {
        let c = counter();
        let ops = discover_operations(&c);
        ops[0].invoke().unwrap();
        ops[1].invoke().unwrap();
        assert_eq!(c.hits.get(), 2);
    }

    #[test]
    fn test_resolve_untagged_by_name() {
        let c = counter();
        let op = resolve_operation(&c, "helper").unwrap();
        assert_eq!(op.name(), "helper");
        op.invoke().unwrap();
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let c = counter();
        let err = resolve_operation(&c, "Alpha").unwrap_err();
        match err {
            HarnessError::OperationNotFound { target, name } => {
                assert_eq!(target, "Counter");
                assert_eq!(name, "Alpha");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fallible_operation_surfaces_error() {
        let c = counter();
        let op = resolve_operation(&c, "fails").unwrap();
        let err = op.invoke().unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_missing_target_is_invalid() {
        let err = try_discover_operations::<Counter>(None).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidTarget(_)));

        let c = counter();
        assert_eq!(try_discover_operations(Some(&c)).unwrap().len(), 3);
    }

    #[test]
    fn test_infos_mark_tags() {
        let infos = list_operations::<Counter>();
        let tagged: Vec<_> = infos
            .iter()
            .filter(|i| i.tagged)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(tagged, ["zeta", "alpha", "fails"]);
        assert_eq!(
            infos[1],
            OperationInfo {
                name: "helper".into(),
                tagged: false,
            }
        );
    }
}
