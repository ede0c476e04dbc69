//! In-process request simulation.
//!
//! The sample response of a route is captured by building a synthetic request
//! and handing it to the application's own request pipeline, the [`Kernel`].
//! No socket is opened.
//!
//! This runs real handler code: anything the handler writes to its backing
//! store is really written, once per documented route. Generate documentation
//! against disposable state only.

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response};
use log::{debug, warn};

/// Per-run settings handed to the kernel with every simulated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationContext {
    /// Skip the application's global middleware and run only the route's
    /// own handler stack
    pub disable_middleware: bool,
    /// User the kernel should authenticate simulated requests as
    pub acting_user: Option<String>,
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self {
            disable_middleware: true,
            acting_user: None,
        }
    }
}

/// An application's request pipeline, driven in-process.
pub trait Kernel {
    /// Serves one request through the application's routing and handlers.
    fn handle(
        &mut self,
        request: &Request<String>,
        context: &SimulationContext,
    ) -> anyhow::Result<Response<String>>;

    /// Runs whatever the application defers until a response is complete.
    /// Called after every [`Kernel::handle`], before the response is read.
    fn terminate(&mut self, _request: &Request<String>, _response: &Response<String>) {}
}

/// Body of a simulated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    /// `Content-Type` the response declared, empty if none
    pub content_type: String,
    /// Pretty-printed JSON for JSON responses, the raw body otherwise
    pub body: String,
}

/// Dispatches synthetic requests through a [`Kernel`].
pub struct RequestSimulator<'k> {
    kernel: &'k mut dyn Kernel,
    context: SimulationContext,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
}

impl<'k> RequestSimulator<'k> {
    pub fn new(kernel: &'k mut dyn Kernel, context: SimulationContext) -> Self {
        Self {
            kernel,
            context,
            extra_headers: Vec::new(),
        }
    }

    /// Builds a simulator from configuration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if a configured header name or value is not
    /// valid HTTP.
    pub fn from_config(kernel: &'k mut dyn Kernel, config: &SimulationConfig) -> Result<Self> {
        let mut simulator = Self::new(
            kernel,
            SimulationContext {
                disable_middleware: config.disable_middleware,
                acting_user: config.acting_user.clone(),
            },
        );
        for (name, value) in &config.headers {
            simulator = simulator.with_header(name, value)?;
        }
        Ok(simulator)
    }

    /// Adds a header sent with every simulated request. `Accept` and
    /// `Content-Type` are always forced to JSON and cannot be overridden.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidArgument(format!("header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidArgument(format!("header value for {}: {}", name, e)))?;
        self.extra_headers.push((name, value));
        Ok(self)
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Sends `method uri` through the kernel and captures the response body.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRoute`] if the request cannot be built from `method`
    /// and `uri`; [`Error::Simulation`] with whatever the kernel failed with.
    pub fn capture(&mut self, method: Method, uri: &str) -> Result<CapturedResponse> {
        let request = self.build_request(method, uri)?;
        debug!("Simulating {} {}", request.method(), request.uri());

        let response = self
            .kernel
            .handle(&request, &self.context)
            .map_err(Error::Simulation)?;
        self.kernel.terminate(&request, &response);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        debug!(
            "Simulated {} {} answered {} ({})",
            request.method(),
            request.uri(),
            response.status(),
            content_type
        );

        let body = if is_json(&content_type) {
            pretty_json(response.body())
        } else {
            response.into_body()
        };

        Ok(CapturedResponse { content_type, body })
    }

    fn build_request(&self, method: Method, uri: &str) -> Result<Request<String>> {
        let path = if uri.starts_with('/') {
            uri.to_string()
        } else {
            format!("/{}", uri)
        };
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in &self.extra_headers {
            if *name != ACCEPT && *name != CONTENT_TYPE {
                builder = builder.header(name, value);
            }
        }
        builder
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(String::new())
            .map_err(|e| Error::InvalidRoute(format!("cannot build request for {}: {}", uri, e)))
    }
}

/// True for `application/json` and `+json` media types, ignoring parameters.
fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Re-serializes a JSON body with indentation. A body that is not valid JSON
/// is returned unchanged.
fn pretty_json(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
    {
        Ok(pretty) => pretty,
        Err(e) => {
            warn!("Response declared JSON but could not be parsed: {}", e);
            body.to_string()
        }
    }
}
