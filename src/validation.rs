//! Validation-capable request types and rule extraction.
//!
//! A request type documents its input by implementing
//! [`ProvidesValidationRules`] and being registered in a
//! [`ValidationRegistry`] under its type name. When a handler declares a
//! parameter mentioning that type, its rules become the route's parameter
//! table.
//!
//! # Example
//!
//! ```
//! use route_apidoc::validation::{ProvidesValidationRules, Rules, ValidationRegistry};
//!
//! #[derive(Default)]
//! struct StorePostRequest;
//!
//! impl ProvidesValidationRules for StorePostRequest {
//!     fn rules(&self) -> Rules {
//!         Rules::new()
//!             .field("title", "required|string|max:255")
//!             .field("status", ["in:draft,published"])
//!     }
//! }
//!
//! let mut registry = ValidationRegistry::new();
//! registry.register_type::<StorePostRequest>();
//! assert!(registry.contains("StorePostRequest"));
//! ```

use crate::error::Result;
use crate::handler_index::HandlerIndex;
use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;

/// Rule strings keyed by attribute name, in declaration order.
pub type RuleSet = IndexMap<String, Vec<String>>;

/// The rules declared for one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleList {
    /// `"required|string|max:255"`
    Piped(String),
    /// One rule per entry; entries are never split on `|`
    Listed(Vec<String>),
}

impl RuleList {
    fn explode(self) -> Vec<String> {
        match self {
            RuleList::Piped(rules) => rules
                .split('|')
                .filter(|rule| !rule.is_empty())
                .map(str::to_string)
                .collect(),
            RuleList::Listed(rules) => rules,
        }
    }
}

impl From<&str> for RuleList {
    fn from(rules: &str) -> Self {
        RuleList::Piped(rules.to_string())
    }
}

impl From<String> for RuleList {
    fn from(rules: String) -> Self {
        RuleList::Piped(rules)
    }
}

impl From<Vec<String>> for RuleList {
    fn from(rules: Vec<String>) -> Self {
        RuleList::Listed(rules)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for RuleList {
    fn from(rules: [S; N]) -> Self {
        RuleList::Listed(rules.into_iter().map(Into::into).collect())
    }
}

/// Rules as a request type declares them, before pipe strings are exploded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    fields: Vec<(String, RuleList)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the rules for `attribute`. Redeclaring an attribute replaces
    /// its rules but keeps its original position.
    pub fn field(mut self, attribute: impl Into<String>, rules: impl Into<RuleList>) -> Self {
        self.fields.push((attribute.into(), rules.into()));
        self
    }
}

/// Validator built from a set of rules, exposing them in exploded form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    rules: RuleSet,
}

impl Validator {
    /// Builds a validator, exploding pipe-delimited rule strings.
    pub fn make(rules: Rules) -> Self {
        let mut exploded = RuleSet::new();
        for (attribute, list) in rules.fields {
            exploded.insert(attribute, list.explode());
        }
        Self { rules: exploded }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn into_rules(self) -> RuleSet {
        self.rules
    }
}

/// Capability of a request type to describe its own validation.
pub trait ProvidesValidationRules {
    /// Rules keyed by attribute, in declaration order.
    fn rules(&self) -> Rules;

    /// A fully configured validator. When this returns `Some`, its rules are
    /// used instead of [`ProvidesValidationRules::rules`].
    fn validator(&self) -> Option<Validator> {
        None
    }
}

/// Validation-capable request types, keyed by type name.
#[derive(Default)]
pub struct ValidationRegistry {
    providers: HashMap<String, Box<dyn ProvidesValidationRules>>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `type_name`, the name handlers use for it.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        provider: impl ProvidesValidationRules + 'static,
    ) {
        let type_name = type_name.into();
        debug!("Registering validation rules for {}", type_name);
        self.providers.insert(type_name, Box::new(provider));
    }

    /// Registers a default instance of `T` under its unqualified type name.
    /// Generic arguments are dropped: `app::Paged<app::Post>` registers as
    /// `Paged`, the name a handler signature mentions first.
    pub fn register_type<T>(&mut self)
    where
        T: ProvidesValidationRules + Default + 'static,
    {
        self.register(short_type_name(std::any::type_name::<T>()), T::default());
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.providers.contains_key(type_name)
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn ProvidesValidationRules> {
        self.providers.get(type_name).map(|provider| &**provider)
    }
}

fn short_type_name(full_name: &str) -> &str {
    let path = full_name.split('<').next().unwrap_or(full_name);
    path.rsplit("::").next().unwrap_or(path)
}

/// Finds a handler's validation-capable parameter and returns its rules.
pub struct ValidationRuleExtractor<'a> {
    index: &'a HandlerIndex,
    registry: &'a ValidationRegistry,
}

impl<'a> ValidationRuleExtractor<'a> {
    pub fn new(index: &'a HandlerIndex, registry: &'a ValidationRegistry) -> Self {
        Self { index, registry }
    }

    /// Returns the rules of the first declared parameter whose type is
    /// registered, or an empty set when no parameter qualifies.
    ///
    /// # Errors
    ///
    /// [`crate::error::Error::HandlerResolution`] if the handler is unknown.
    pub fn extract_rules(&self, handler: &str) -> Result<RuleSet> {
        let decl = self.index.resolve(handler)?;

        let provider = decl
            .parameter_types
            .iter()
            .flat_map(|names| names.iter())
            .find_map(|name| self.registry.get(name).map(|provider| (name, provider)));

        let Some((type_name, provider)) = provider else {
            debug!("Handler {} has no validation-capable parameter", handler);
            return Ok(RuleSet::new());
        };

        debug!("Using validation rules of {} for {}", type_name, handler);
        let validator = provider
            .validator()
            .unwrap_or_else(|| Validator::make(provider.rules()));
        Ok(validator.into_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::SourceParser;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct StorePostRequest;

    impl ProvidesValidationRules for StorePostRequest {
        fn rules(&self) -> Rules {
            Rules::new()
                .field("title", "required|string|max:255")
                .field("body", ["required", "regex:/^(a|b)$/"])
                .field("notes", "")
        }
    }

    #[derive(Default)]
    struct ImportRequest;

    impl ProvidesValidationRules for ImportRequest {
        fn rules(&self) -> Rules {
            Rules::new().field("ignored", "required")
        }

        fn validator(&self) -> Option<Validator> {
            Some(Validator::make(Rules::new().field("file", "required|mimes:csv")))
        }
    }

    fn index() -> HandlerIndex {
        let source = SourceParser::parse_source(
            "posts.rs",
            r#"
            pub struct PostController;
            impl PostController {
                pub fn index(&self, query: Query<ListPosts>) {}
                pub fn store(&self, user: &User, request: Json<StorePostRequest>) {}
                pub fn import(&self, request: ImportRequest, other: StorePostRequest) {}
            }
            "#,
        )
        .unwrap();
        HandlerIndex::from_sources(&[source])
    }

    fn registry() -> ValidationRegistry {
        let mut registry = ValidationRegistry::new();
        registry.register_type::<StorePostRequest>();
        registry.register_type::<ImportRequest>();
        registry
    }

    #[test]
    fn test_validator_explodes_piped_rules() {
        let validator = Validator::make(StorePostRequest.rules());
        let rules = validator.rules();

        assert_eq!(
            rules.keys().collect::<Vec<_>>(),
            vec!["title", "body", "notes"]
        );
        assert_eq!(rules["title"], vec!["required", "string", "max:255"]);
        assert_eq!(rules["body"], vec!["required", "regex:/^(a|b)$/"]);
        assert!(rules["notes"].is_empty());
    }

    #[test]
    fn test_redeclared_field_keeps_its_position() {
        let rules = Rules::new()
            .field("title", "required")
            .field("body", "string")
            .field("title", "nullable|max:80");

        let validator = Validator::make(rules);
        assert_eq!(
            validator.rules().keys().collect::<Vec<_>>(),
            vec!["title", "body"]
        );
        assert_eq!(validator.rules()["title"], vec!["nullable", "max:80"]);
    }

    #[derive(Default)]
    struct Paged<T>(std::marker::PhantomData<T>);

    impl<T> ProvidesValidationRules for Paged<T> {
        fn rules(&self) -> Rules {
            Rules::new().field("page", "integer|min:1")
        }
    }

    #[test]
    fn test_register_generic_type() {
        let mut registry = ValidationRegistry::new();
        registry.register_type::<Paged<StorePostRequest>>();

        assert!(registry.contains("Paged"));
        assert!(!registry.contains("StorePostRequest>"));
        assert_eq!(short_type_name("app::Wrapper<app::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_register_type_uses_short_name() {
        let registry = registry();
        assert!(registry.contains("StorePostRequest"));
        assert!(registry.contains("ImportRequest"));
        assert!(!registry.contains("tests::StorePostRequest"));
    }

    #[test]
    fn test_extract_rules_from_wrapped_parameter() {
        let index = index();
        let registry = registry();
        let extractor = ValidationRuleExtractor::new(&index, &registry);

        let rules = extractor.extract_rules("PostController@store").unwrap();
        assert_eq!(rules["title"], vec!["required", "string", "max:255"]);
    }

    #[test]
    fn test_validator_factory_is_preferred() {
        let index = index();
        let registry = registry();
        let extractor = ValidationRuleExtractor::new(&index, &registry);

        let rules = extractor.extract_rules("PostController@import").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules["file"], vec!["required", "mimes:csv"]);
    }

    #[test]
    fn test_no_capable_parameter_gives_empty_rules() {
        let index = index();
        let registry = registry();
        let extractor = ValidationRuleExtractor::new(&index, &registry);

        assert!(extractor.extract_rules("PostController@index").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_handler_is_an_error() {
        let index = index();
        let registry = registry();
        let extractor = ValidationRuleExtractor::new(&index, &registry);

        assert!(matches!(
            extractor.extract_rules("PostController@destroy"),
            Err(Error::HandlerResolution { .. })
        ));
    }
}
