//! Node-local query parameters and headers.
//!
//! Each node owns a [`ParamStore`] holding its local layer. The global layer
//! lives in the shared [`Config`](crate::Config); the effective values for a
//! request are the global layer overlaid with the local one, local keys
//! winning.

use crate::clients::{Headers, QueryParams};

/// The local query-parameter and header layer of one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamStore {
    query: QueryParams,
    headers: Headers,
}

impl ParamStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the local query parameters.
    #[must_use]
    pub const fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// Replaces the local query parameters.
    pub fn set_query_params(&mut self, params: impl Into<QueryParams>) {
        self.query = params.into();
    }

    /// Returns the local headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Replaces the local headers.
    pub fn set_headers(&mut self, headers: impl Into<Headers>) {
        self.headers = headers.into();
    }

    /// Returns `global` overlaid with the local query parameters.
    #[must_use]
    pub fn merged_query_params(&self, global: &QueryParams) -> QueryParams {
        global.overlay(&self.query)
    }

    /// Returns `global` overlaid with the local headers.
    #[must_use]
    pub fn merged_headers(&self, global: &Headers) -> Headers {
        global.overlay(&self.headers)
    }
}
