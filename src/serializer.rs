//! Serialization of documented routes for the rendering step.

use crate::generator::RouteDocumentation;
use anyhow::{Context, Result};
use log::debug;

/// Serializes documented routes to pretty-printed JSON.
///
/// # Example
///
/// ```
/// use route_apidoc::serializer::serialize_json;
///
/// let json = serialize_json(&[]).unwrap();
/// assert_eq!(json, "[]");
/// ```
pub fn serialize_json(routes: &[RouteDocumentation]) -> Result<String> {
    debug!("Serializing {} documented routes to JSON", routes.len());
    serde_json::to_string_pretty(routes).context("Failed to serialize route documentation to JSON")
}

/// Serializes documented routes to YAML.
pub fn serialize_yaml(routes: &[RouteDocumentation]) -> Result<String> {
    debug!("Serializing {} documented routes to YAML", routes.len());
    serde_yaml::to_string(routes).context("Failed to serialize route documentation to YAML")
}
