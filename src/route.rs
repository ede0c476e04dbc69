//! Route descriptors and route selection.

use crate::config::SelectionConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// HTTP methods a route can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Parses a method name, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared route, as the application's router reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// URI pattern, e.g. `api/users/{id}`
    pub uri: String,
    /// Methods in declaration order; the first one is used for the sample request
    pub methods: Vec<HttpMethod>,
    /// `Type@method` or a function name
    pub handler: String,
    #[serde(default)]
    pub name: String,
}

impl Route {
    pub fn new(
        uri: impl Into<String>,
        methods: impl IntoIterator<Item = HttpMethod>,
        handler: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            methods: methods.into_iter().collect(),
            handler: handler.into(),
            name: String::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Picks the routes to document, by name or by URI pattern.
#[derive(Debug, Clone)]
pub struct RouteSelector {
    prefix: Option<String>,
    names: Vec<String>,
}

impl RouteSelector {
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when neither a prefix nor a route name is given.
    pub fn new(prefix: Option<String>, names: Vec<String>) -> Result<Self> {
        if prefix.is_none() && names.is_empty() {
            return Err(Error::InvalidArgument(
                "You must provide either a route prefix or a route to generate the documentation."
                    .to_string(),
            ));
        }
        Ok(Self { prefix, names })
    }

    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        Self::new(config.prefix.clone(), config.routes.clone())
    }

    /// True if the route is named in the selection or its URI matches the prefix.
    pub fn matches(&self, route: &Route) -> bool {
        if !route.name.is_empty() && self.names.iter().any(|name| *name == route.name) {
            return true;
        }
        self.prefix
            .as_deref()
            .is_some_and(|pattern| wildcard_match(pattern, &route.uri))
    }

    /// Keeps the selected routes, preserving their order.
    pub fn select<'r>(&self, routes: impl IntoIterator<Item = &'r Route>) -> Vec<&'r Route> {
        routes.into_iter().filter(|route| self.matches(route)).collect()
    }
}

/// Whole-string match where `*` stands for any run of characters. Leading
/// slashes are ignored on both sides.
fn wildcard_match(pattern: &str, uri: &str) -> bool {
    let pattern = pattern.trim_start_matches('/');
    let uri = uri.trim_start_matches('/');

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == uri;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !uri.starts_with(first) || uri.len() < first.len() + last.len() || !uri.ends_with(last) {
        return false;
    }

    let mut rest = &uri[first.len()..uri.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(position) => rest = &rest[position + part.len()..],
            None => return false,
        }
    }
    true
}
