use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::handler_index::HandlerIndex;
use crate::introspector::RouteIntrospector;
use crate::route::{HttpMethod, Route};
use crate::rules::document_attribute;
use crate::rules::mapper::{DescriptionMapper, ParameterSpec};
use crate::simulator::{Kernel, RequestSimulator};
use crate::validation::{ValidationRegistry, ValidationRuleExtractor};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything documented about one route, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDocumentation {
    /// Summary line of the handler's doc comment
    pub title: String,
    /// Remaining doc comment text
    pub description: String,
    pub methods: Vec<HttpMethod>,
    pub uri: String,
    /// Request attributes in the order the validator declares them
    pub parameters: IndexMap<String, ParameterSpec>,
    /// Sample response body
    pub response: String,
}

/// Builds [`RouteDocumentation`] records for routes.
///
/// Routes are processed one at a time, in the order given, and each sample
/// request runs real handler code through the kernel. A route can therefore
/// observe what earlier routes wrote.
pub struct ApiDocGenerator<'k> {
    index: HandlerIndex,
    registry: ValidationRegistry,
    mapper: DescriptionMapper,
    simulator: RequestSimulator<'k>,
}

impl<'k> ApiDocGenerator<'k> {
    pub fn new(
        index: HandlerIndex,
        registry: ValidationRegistry,
        simulator: RequestSimulator<'k>,
    ) -> Self {
        Self {
            index,
            registry,
            mapper: DescriptionMapper::new(),
            simulator,
        }
    }

    /// Indexes the configured source root and wires a simulator for `kernel`.
    pub fn from_config(
        config: &GeneratorConfig,
        registry: ValidationRegistry,
        kernel: &'k mut dyn Kernel,
    ) -> Result<Self> {
        info!("Indexing handlers below {}", config.source_root.display());
        let index = HandlerIndex::from_directory(&config.source_root, &config.skip_dirs)?;
        info!("Indexed {} handlers", index.len());

        let simulator = RequestSimulator::from_config(kernel, &config.simulation)?;
        Ok(Self::new(index, registry, simulator))
    }

    /// Replaces the rule vocabulary.
    pub fn with_mapper(mut self, mapper: DescriptionMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Gives access to the rule vocabulary, e.g. to register extra rules.
    pub fn mapper_mut(&mut self) -> &mut DescriptionMapper {
        &mut self.mapper
    }

    /// Documents one route.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRoute`] if the route declares no method
    /// - [`Error::Simulation`] if the handler fails on the sample request
    /// - [`Error::HandlerResolution`] if the handler is not in the sources
    pub fn process_route(&mut self, route: &Route) -> Result<RouteDocumentation> {
        let method = *route
            .methods
            .first()
            .ok_or_else(|| Error::InvalidRoute(format!("{} declares no HTTP method", route.uri)))?;

        let response = self.simulator.capture(method.into(), &route.uri)?;
        let description = RouteIntrospector::new(&self.index).describe(&route.handler)?;
        let rules = ValidationRuleExtractor::new(&self.index, &self.registry)
            .extract_rules(&route.handler)?;

        let parameters: IndexMap<String, ParameterSpec> = rules
            .iter()
            .map(|(attribute, rules)| (attribute.clone(), document_attribute(&self.mapper, rules)))
            .collect();
        debug!(
            "Documented {} {} with {} parameters",
            method,
            route.uri,
            parameters.len()
        );

        Ok(RouteDocumentation {
            title: description.short,
            description: description.long,
            methods: route.methods.clone(),
            uri: route.uri.clone(),
            parameters,
            response: response.body,
        })
    }

    /// Documents routes strictly in order, stopping at the first failure.
    pub fn process_routes<'r>(
        &mut self,
        routes: impl IntoIterator<Item = &'r Route>,
    ) -> Result<Vec<RouteDocumentation>> {
        let mut documented = Vec::new();
        for route in routes {
            documented.push(self.process_route(route)?);
            info!("Processed route: {}", route.uri);
        }
        Ok(documented)
    }
}
