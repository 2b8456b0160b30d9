//! Interceptor chains.
//!
//! A [`Chain<T>`] is an ordered list of stages folded over a value. Each stage
//! sees the output of the previous one and returns a [`Stage<T>`]:
//!
//! - [`Stage::Pass`]: keep the current value
//! - [`Stage::Replace`]: hand a new value to the next stage
//! - [`Stage::Pending`]: await a producer; `Ok(None)` keeps the current value
//!
//! A stage that returns `Err` stops the fold. Three chains are configured
//! per client: requests (`Chain<Request>`), successful responses
//! (`Chain<Response>`) and failures (`Chain<Fault>`).
//!
//! # Example
//!
//! ```rust
//! use resource_client::rest::{Chain, Stage};
//! use resource_client::clients::{Method, Request};
//!
//! let mut chain: Chain<Request> = Chain::new();
//! chain.push(|request: &Request| {
//!     let mut next = request.clone();
//!     next.headers.set("x-trace", "1");
//!     Ok(Stage::Replace(next))
//! });
//!
//! # tokio_test::block_on(async {
//! let request = Request::builder(Method::Get, "https://api.test/users").build();
//! let request = chain.run(request).await.unwrap();
//! assert_eq!(request.headers.get("x-trace"), Some("1"));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::trace;

use crate::clients::{BoxError, Response};
use crate::rest::errors::ResourceError;

/// The outcome of one interceptor stage.
pub enum Stage<T> {
    /// Leave the value unchanged.
    Pass,
    /// Replace the value for the next stage.
    Replace(T),
    /// Await a producer. `Ok(None)` leaves the value unchanged.
    Pending(BoxFuture<'static, Result<Option<T>, BoxError>>),
}

impl<T> Stage<T> {
    /// Wraps an async producer.
    pub fn pending<F>(producer: F) -> Self
    where
        F: Future<Output = Result<Option<T>, BoxError>> + Send + 'static,
    {
        Self::Pending(Box::pin(producer))
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Pass"),
            Self::Replace(_) => f.write_str("Replace(..)"),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A single stage.
pub type Interceptor<T> = Arc<dyn Fn(&T) -> Result<Stage<T>, BoxError> + Send + Sync>;

/// An ordered list of interceptor stages.
pub struct Chain<T> {
    stages: Vec<Interceptor<T>>,
}

impl<T> Chain<T> {
    /// Creates an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn push<F>(&mut self, stage: F)
    where
        F: Fn(&T) -> Result<Stage<T>, BoxError> + Send + Sync + 'static,
    {
        self.stages.push(Arc::new(stage));
    }

    /// Appends an already shared stage.
    pub fn push_shared(&mut self, stage: Interceptor<T>) {
        self.stages.push(stage);
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Removes every stage.
    pub fn clear(&mut self) {
        self.stages.clear();
    }

    /// Folds `value` through every stage in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a stage or by an awaited producer.
    /// Remaining stages are not run.
    pub async fn run(&self, value: T) -> Result<T, BoxError> {
        let mut current = value;
        for (index, stage) in self.stages.iter().enumerate() {
            match stage(&current)? {
                Stage::Pass => {}
                Stage::Replace(next) => current = next,
                Stage::Pending(producer) => {
                    if let Some(next) = producer.await? {
                        current = next;
                    }
                }
            }
            trace!(stage = index, "Interceptor stage completed");
        }
        Ok(current)
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
        }
    }
}

impl<T> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// The value folded through the error chain.
///
/// A failure stays [`Fault::Raised`] unless a stage explicitly replaces it
/// with [`Fault::Resolved`], which hands a response to the response body
/// handler as if the request had succeeded.
#[derive(Debug)]
pub enum Fault {
    /// The (possibly transformed) failure.
    Raised(ResourceError),
    /// A response that settles the pipeline successfully.
    Resolved(Response),
}

impl Fault {
    /// Returns the status of an application failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Raised(error) => error.status(),
            Self::Resolved(_) => None,
        }
    }

    /// Returns the failure, if still raised.
    #[must_use]
    pub const fn error(&self) -> Option<&ResourceError> {
        match self {
            Self::Raised(error) => Some(error),
            Self::Resolved(_) => None,
        }
    }

    /// Returns `true` if a stage resolved the failure.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{Headers, Method, Request};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> Request {
        Request::builder(Method::Get, "https://api.test/users").build()
    }

    #[tokio::test]
    async fn test_empty_chain_returns_value() {
        let chain: Chain<Request> = Chain::new();
        let out = chain.run(request()).await.unwrap();
        assert_eq!(out, request());
    }

    #[tokio::test]
    async fn test_stages_fold_in_registration_order() {
        let mut chain: Chain<Request> = Chain::new();
        chain.push(|r: &Request| {
            let mut next = r.clone();
            next.headers.set("h", "1");
            Ok(Stage::Replace(next))
        });
        chain.push(|r: &Request| {
            let h: u32 = r.headers.get("h").unwrap_or("0").parse()?;
            let mut next = r.clone();
            next.headers.set("h2", (h + 1).to_string());
            Ok(Stage::Replace(next))
        });

        let out = chain.run(request()).await.unwrap();

        assert_eq!(out.headers.get("h"), Some("1"));
        assert_eq!(out.headers.get("h2"), Some("2"));
    }

    #[tokio::test]
    async fn test_pass_and_empty_pending_keep_value() {
        let mut chain: Chain<Request> = Chain::new();
        chain.push(|_: &Request| Ok(Stage::Pass));
        chain.push(|_: &Request| Ok(Stage::pending(async { Ok(None) })));

        let out = chain.run(request()).await.unwrap();
        assert_eq!(out, request());
    }

    #[tokio::test]
    async fn test_pending_stage_is_awaited() {
        let mut chain: Chain<Request> = Chain::new();
        chain.push(|r: &Request| {
            let mut next = r.clone();
            Ok(Stage::pending(async move {
                tokio::task::yield_now().await;
                next.headers.set("async", "yes");
                Ok(Some(next))
            }))
        });
        chain.push(|r: &Request| {
            assert_eq!(r.headers.get("async"), Some("yes"));
            Ok(Stage::Pass)
        });

        let out = chain.run(request()).await.unwrap();
        assert_eq!(out.headers.get("async"), Some("yes"));
    }

    #[tokio::test]
    async fn test_failing_stage_stops_the_fold() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut chain: Chain<Request> = Chain::new();
        chain.push(|_: &Request| Err("rejected".into()));
        chain.push(move |_: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Stage::Pass)
        });

        let error = chain.run(request()).await.unwrap_err();

        assert_eq!(error.to_string(), "rejected");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_chain_can_resolve_a_fault() {
        let mut chain: Chain<Fault> = Chain::new();
        chain.push(|fault: &Fault| {
            if fault.status() == Some(404) {
                Ok(Stage::Replace(Fault::Resolved(Response::new(
                    204,
                    Headers::new(),
                    "",
                ))))
            } else {
                Ok(Stage::Pass)
            }
        });

        let not_found = ResourceError::from(crate::rest::ApplicationError::from_response(
            &Response::new(404, Headers::new(), ""),
        ));
        let out = chain.run(Fault::Raised(not_found)).await.unwrap();
        assert!(out.is_resolved());

        let out = chain.run(Fault::Raised(ResourceError::Cancelled)).await.unwrap();
        assert!(out.error().is_some_and(ResourceError::is_cancelled));
    }

    #[test]
    fn test_chain_clone_shares_stages() {
        let mut chain: Chain<Request> = Chain::new();
        chain.push(|_: &Request| Ok(Stage::Pass));
        let cloned = chain.clone();
        assert_eq!(cloned.len(), 1);
        assert!(!cloned.is_empty());
        assert_eq!(format!("{cloned:?}"), "Chain { stages: 1 }");
    }
}
