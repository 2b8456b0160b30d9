//! The request pipeline shared by every verb.
//!
//! A verb call returns a [`Pending`] value. Nothing happens until it is first
//! polled; then the pipeline runs to completion:
//!
//! 1. build the request from a fresh configuration snapshot
//! 2. fold it through the request interceptors
//! 3. hand it to the transport
//! 4. fold a successful response through the response interceptors, or a
//!    failure through the error interceptors
//! 5. decode the body with the response body handler
//! 6. materialize the decoded value onto the node
//!
//! Aborting (through [`Pending::abort_handle`]) or dropping an unsettled
//! pipeline after its request was built invokes the configured abort callback
//! once with the in-flight request.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::clients::{Headers, Method, QueryParams, Request};
use crate::config::{AbortCallback, Settings};
use crate::rest::codec::Body;
use crate::rest::errors::{ChainKind, ResourceError};
use crate::rest::interceptor::Fault;
use crate::rest::resource::ResourceNode;

/// A lazily started, cancellable pipeline.
///
/// Resolves to `Err(ResourceError::Cancelled)` once aborted.
///
/// # Example
///
/// ```rust,ignore
/// let pending = user.get(None, None);
/// let handle = pending.abort_handle();
///
/// // from elsewhere: handle.abort();
///
/// match pending.await {
///     Err(ResourceError::Cancelled) => println!("aborted"),
///     other => println!("{other:?}"),
/// }
/// ```
#[must_use = "pipelines do nothing unless awaited"]
pub struct Pending<'a, T> {
    inner: Abortable<BoxFuture<'a, Result<T, ResourceError>>>,
    handle: AbortHandle,
}

impl<'a, T> Pending<'a, T> {
    pub(crate) fn new<F>(pipeline: F) -> Self
    where
        F: Future<Output = Result<T, ResourceError>> + Send + 'a,
    {
        let (handle, registration) = AbortHandle::new_pair();
        Self {
            inner: Abortable::new(Box::pin(pipeline), registration),
            handle,
        }
    }

    /// Returns a handle that cancels this pipeline.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.clone()
    }

    /// Cancels the pipeline.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Returns `true` if the pipeline was aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.handle.is_aborted()
    }

    /// Converts the pipeline into a single-element stream.
    pub fn into_stream(self) -> BoxStream<'a, Result<T, ResourceError>>
    where
        T: Send + 'a,
    {
        stream::once(self).boxed()
    }
}

impl<T> Future for Pending<'_, T> {
    type Output = Result<T, ResourceError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(Aborted)) => Poll::Ready(Err(ResourceError::Cancelled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for Pending<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("aborted", &self.handle.is_aborted())
            .finish_non_exhaustive()
    }
}

/// Invokes the abort callback if dropped while armed.
struct AbortGuard {
    request: Option<Request>,
    callback: Option<AbortCallback>,
}

impl AbortGuard {
    fn arm(request: &Request, callback: Option<AbortCallback>) -> Self {
        Self {
            request: Some(request.clone()),
            callback,
        }
    }

    fn track(&mut self, request: &Request) {
        self.request = Some(request.clone());
    }

    fn disarm(mut self) {
        self.request = None;
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            warn!(method = %request.method, url = %request.url, "Request abandoned before settling");
            if let Some(callback) = self.callback.take() {
                callback(&request);
            }
        }
    }
}

/// One request/response exchange, ready to run.
pub(crate) struct Exchange {
    settings: Settings,
    method: Method,
    url: String,
    query: QueryParams,
    headers: Headers,
    body: Body,
}

impl Exchange {
    /// Snapshots the configuration and the node's merged parameters.
    pub(crate) fn prepare<N: ResourceNode + ?Sized>(node: &N, method: Method, body: Body) -> Self {
        let settings = node.config().snapshot();
        let id = node.trailing_id(&settings.identifier);
        let url = node
            .route()
            .render(settings.base_url.as_ref(), id.as_deref());
        let query = node.core().params.merged_query_params(&settings.query_params);
        let headers = node.core().params.merged_headers(&settings.headers);

        Self {
            settings,
            method,
            url,
            query,
            headers,
            body,
        }
    }

    /// Runs the exchange and returns the decoded body.
    pub(crate) async fn run(self) -> Result<Value, ResourceError> {
        let Self {
            settings,
            method,
            url,
            query,
            headers,
            body,
        } = self;

        debug!(%method, %url, "Building request");
        let payload = (settings.request_body_handler)(body)?;
        let mut builder = Request::builder(method, url)
            .query(query)
            .headers(headers)
            .body(payload);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder.build();

        let mut guard = AbortGuard::arm(&request, settings.abort_callback.clone());
        let outcome = dispatch(&settings, request, &mut guard).await;
        guard.disarm();

        match &outcome {
            Ok(_) => debug!(%method, "Request settled"),
            Err(error) => warn!(%method, %error, "Request failed"),
        }
        outcome
    }
}

async fn dispatch(
    settings: &Settings,
    request: Request,
    guard: &mut AbortGuard,
) -> Result<Value, ResourceError> {
    let request = settings
        .request_interceptors
        .run(request)
        .await
        .map_err(|e| ResourceError::interceptor(ChainKind::Request, e))?;
    guard.track(&request);

    debug!(method = %request.method, url = %request.url, "Dispatching request");
    let decoded = match settings.transport.fetch(request).await {
        Ok(response) if response.is_ok() => {
            debug!(status = response.status, "Received response");
            let response = settings
                .response_interceptors
                .run(response)
                .await
                .map_err(|e| ResourceError::interceptor(ChainKind::Response, e))?;
            (settings.response_body_handler)(response).await
        }
        Ok(response) => {
            debug!(status = response.status, "Received failing response");
            (settings.response_body_handler)(response).await
        }
        Err(error) => Err(error.into()),
    };

    match decoded {
        Err(error) if error.is_recoverable() => recover(settings, error).await,
        other => other,
    }
}

async fn recover(settings: &Settings, error: ResourceError) -> Result<Value, ResourceError> {
    if settings.error_interceptors.is_empty() {
        return Err(error);
    }

    debug!(%error, "Offering failure to error interceptors");
    let fault = settings
        .error_interceptors
        .run(Fault::Raised(error))
        .await
        .map_err(|e| ResourceError::interceptor(ChainKind::Error, e))?;

    match fault {
        Fault::Resolved(response) => {
            debug!(status = response.status, "Error interceptors resolved the failure");
            (settings.response_body_handler)(response).await
        }
        Fault::Raised(error) => Err(error),
    }
}
