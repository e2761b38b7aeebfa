// src/future/dependency.rs

//! Type-erased view of a future that a job waits on.
//!
//! A job's dependency list mixes futures of different value types (a
//! `SettableFuture<bool>` from a radio check next to a
//! `SettableFuture<String>` from a metadata poller). The executor only needs
//! to know *whether* and *how* each one settled, never the value itself.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::DependencyError;
use crate::future::settable::SettableFuture;

/// Something the executor can wait on before running a job.
pub trait Dependency: Send + Sync {
    /// Diagnostic name, used in straggler reports and errors.
    fn name(&self) -> &str;

    /// Non-blocking check: `None` while still pending.
    fn check(&self) -> Option<Result<(), DependencyError>>;

    /// Completes once the dependency reaches a terminal state.
    fn settled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Shared, type-erased dependency handle.
pub type DynDependency = Arc<dyn Dependency>;

impl<T: Clone + Send + 'static> Dependency for SettableFuture<T> {
    fn name(&self) -> &str {
        SettableFuture::name(self)
    }

    fn check(&self) -> Option<Result<(), DependencyError>> {
        self.status().map(|r| r.map_err(DependencyError::from))
    }

    fn settled(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.until_done())
    }
}

impl<T: Clone + Send + 'static> SettableFuture<T> {
    /// Erase the value type so this future can sit in a dependency list.
    pub fn dependency(&self) -> DynDependency {
        Arc::new(self.clone())
    }
}

impl<T: Clone + Send + 'static> From<&SettableFuture<T>> for DynDependency {
    fn from(fut: &SettableFuture<T>) -> Self {
        fut.dependency()
    }
}

/// Names of the given dependencies, in order.
pub fn names(deps: &[DynDependency]) -> Vec<String> {
    deps.iter().map(|d| d.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_value_types_share_one_list() {
        let radio = SettableFuture::<bool>::new("radio");
        let host = SettableFuture::<String>::new("hostname");
        let deps: Vec<DynDependency> = vec![radio.dependency(), (&host).into()];

        assert_eq!(names(&deps), vec!["radio", "hostname"]);
        assert!(deps.iter().all(|d| d.check().is_none()));

        radio.resolve(true);
        host.cancel();

        assert!(matches!(deps[0].check(), Some(Ok(()))));
        match deps[1].check() {
            Some(Err(err)) => assert!(err.is_cancelled()),
            other => panic!("expected cancelled dependency, got {other:?}"),
        }
    }
}
