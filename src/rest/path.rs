//! Routes: the ordered path segments that address a resource.
//!
//! A [`Route`] is a list of [`Segment`]s, each a resource name with an
//! optional identifier. Rendering joins the segments under a base URL:
//!
//! - `users` renders as `/users`
//! - `users(1)` then `posts` renders as `/users/1/posts`
//!
//! Identifiers are percent-encoded; names are used as given.
//!
//! # Example
//!
//! ```rust
//! use resource_client::rest::Route;
//!
//! let route = Route::new().join("users", Some("a b")).join("posts", None);
//! assert_eq!(route.path(None), "/users/a%20b/posts");
//! assert_eq!(route.path(Some("7")), "/users/a%20b/posts/7");
//! ```

use std::fmt;

use crate::config::BaseUrl;

/// One path segment: a resource name and an optional identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    /// The resource name.
    pub name: String,
    /// The identifier, if the segment addresses a single resource.
    pub id: Option<String>,
}

impl Segment {
    /// Creates a segment.
    pub fn new(name: impl Into<String>, id: Option<&str>) -> Self {
        Self {
            name: name.into(),
            id: id.map(ToString::to_string),
        }
    }
}

/// An ordered list of segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Route {
    segments: Vec<Segment>,
}

impl Route {
    /// Creates an empty route.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Appends a segment.
    pub fn push(&mut self, name: impl Into<String>, id: Option<&str>) {
        self.segments.push(Segment::new(name, id));
    }

    /// Returns a copy of this route with one more segment.
    #[must_use]
    pub fn join(&self, name: impl Into<String>, id: Option<&str>) -> Self {
        let mut route = self.clone();
        route.push(name, id);
        route
    }

    /// Returns a copy of this route whose last segment carries `id`, unless
    /// it already has one.
    #[must_use]
    pub fn resolve(&self, id: Option<&str>) -> Self {
        let mut route = self.clone();
        if let (Some(last), Some(id)) = (route.segments.last_mut(), id) {
            if last.id.is_none() {
                last.id = Some(id.to_string());
            }
        }
        route
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the last segment.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the name of the last segment.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.last().map(|s| s.name.as_str())
    }

    /// Returns the explicit identifier of the last segment.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.last().and_then(|s| s.id.as_deref())
    }

    /// Returns `true` if the route has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Renders the path.
    ///
    /// `trailing_id` is used for the last segment when it has no explicit
    /// identifier.
    #[must_use]
    pub fn path(&self, trailing_id: Option<&str>) -> String {
        let last = self.segments.len().saturating_sub(1);
        let mut path = String::new();
        for (index, segment) in self.segments.iter().enumerate() {
            path.push('/');
            path.push_str(&segment.name);
            let id = segment
                .id
                .as_deref()
                .or(if index == last { trailing_id } else { None });
            if let Some(id) = id {
                path.push('/');
                path.push_str(&urlencoding::encode(id));
            }
        }
        path
    }

    /// Renders the absolute URL under `base`.
    #[must_use]
    pub fn render(&self, base: Option<&BaseUrl>, trailing_id: Option<&str>) -> String {
        let path = self.path(trailing_id);
        match base {
            Some(base) => format!("{base}{path}"),
            None => path,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path(None))
    }
}
