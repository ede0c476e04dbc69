//! Validation-rule interpretation.
//!
//! Rules are short declarative strings such as `required`, `in:draft,published`
//! or `between:1,10`. [`parser::RuleParser`] tokenizes one rule and
//! [`mapper::DescriptionMapper`] folds it into the [`mapper::ParameterSpec`] of
//! the attribute it constrains.
//!
//! # Example
//!
//! ```
//! use route_apidoc::rules::{document_attribute, mapper::{DescriptionMapper, ParamType}};
//!
//! let mapper = DescriptionMapper::new();
//! let spec = document_attribute(&mapper, &["required", "in:draft,published"]);
//! assert!(spec.required);
//! assert_eq!(spec.param_type, ParamType::String);
//! assert_eq!(spec.description, vec!["`draft` or `published`"]);
//! ```

pub mod mapper;
pub mod parser;

use mapper::{DescriptionMapper, ParameterSpec};
use parser::RuleParser;

/// Builds the documentation of one attribute by folding its rules, in order,
/// into a fresh [`ParameterSpec`].
pub fn document_attribute<S: AsRef<str>>(mapper: &DescriptionMapper, rules: &[S]) -> ParameterSpec {
    let mut spec = ParameterSpec::default();
    for rule in rules {
        mapper.apply(&RuleParser::parse(rule.as_ref()), &mut spec);
    }
    spec
}
