//! Route API documentation generator.
//!
//! This library documents the routes of a web application from three sources
//! of truth that already exist in the application:
//!
//! - the doc comment on each route's handler, read from the application's
//!   source tree;
//! - the validation rules of the request type the handler accepts, which are
//!   turned into a parameter table;
//! - a sample response, obtained by sending a synthetic request through the
//!   application's own request pipeline in-process.
//!
//! # Architecture
//!
//! 1. [`scanner`] and [`parser`] - find and parse the application sources
//! 2. [`handler_index`] - index handler functions and methods by identifier
//! 3. [`introspector`] - split a handler's doc comment into title and description
//! 4. [`validation`] - locate the handler's validation-capable parameter
//! 5. [`rules`] - parse validation rules and map them to parameter documentation
//! 6. [`simulator`] - capture a sample response through a [`simulator::Kernel`]
//! 7. [`generator`] - compose everything per route
//! 8. [`serializer`] - hand the result to a renderer as JSON or YAML
//!
//! Sample requests run real handler code. Point the kernel at disposable state.
//!
//! # Example Usage
//!
//! ```no_run
//! use route_apidoc::{
//!     config::GeneratorConfig,
//!     generator::ApiDocGenerator,
//!     route::{HttpMethod, Route, RouteSelector},
//!     serializer::serialize_json,
//!     simulator::{Kernel, SimulationContext},
//!     validation::ValidationRegistry,
//! };
//! use http::{Request, Response};
//! use std::path::Path;
//!
//! struct App;
//!
//! impl Kernel for App {
//!     fn handle(
//!         &mut self,
//!         _request: &Request<String>,
//!         _context: &SimulationContext,
//!     ) -> anyhow::Result<Response<String>> {
//!         Ok(Response::new("[]".to_string()))
//!     }
//! }
//!
//! let config = GeneratorConfig::load(Path::new("apidoc.yaml")).unwrap();
//! let routes = vec![Route::new("api/users", [HttpMethod::Get], "UserController@index")];
//! let selector = RouteSelector::from_config(&config.selection).unwrap();
//!
//! let mut app = App;
//! let mut generator =
//!     ApiDocGenerator::from_config(&config, ValidationRegistry::new(), &mut app).unwrap();
//! let documented = generator.process_routes(selector.select(&routes)).unwrap();
//! println!("{}", serialize_json(&documented).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod handler_index;
pub mod introspector;
pub mod parser;
pub mod route;
pub mod rules;
pub mod scanner;
pub mod serializer;
pub mod simulator;
pub mod validation;
