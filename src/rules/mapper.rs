use crate::rules::parser::Rule;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Documentation type inferred for a request attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Boolean,
    Integer,
    Numeric,
    Date,
    Url,
    Ip,
    Array,
    Email,
}

impl ParamType {
    /// Returns the type a bare type rule (`string`, `integer`, ...) declares.
    pub fn from_rule_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ParamType::String),
            "boolean" => Some(ParamType::Boolean),
            "integer" => Some(ParamType::Integer),
            "numeric" => Some(ParamType::Numeric),
            "date" => Some(ParamType::Date),
            "url" => Some(ParamType::Url),
            "ip" => Some(ParamType::Ip),
            "array" => Some(ParamType::Array),
            "email" => Some(ParamType::Email),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Integer => "integer",
            ParamType::Numeric => "numeric",
            ParamType::Date => "date",
            ParamType::Url => "url",
            ParamType::Ip => "ip",
            ParamType::Array => "array",
            ParamType::Email => "email",
        }
    }
}

/// Documentation accumulated for one request attribute.
///
/// Rules are folded in declaration order and a later rule overwrites the
/// `param_type` or `required` flag set by an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub default: String,
    /// Human-readable constraint sentences, in rule order
    pub description: Vec<String>,
}

impl ParameterSpec {
    pub fn describe(&mut self, text: impl Into<String>) {
        self.description.push(text.into());
    }
}

/// Handler invoked for a rule name.
pub type RuleHandler = fn(&Rule, &mut ParameterSpec);

/// Interprets parsed rules against a [`ParameterSpec`].
///
/// Dispatch goes through a name-to-handler table. [`DescriptionMapper::new`]
/// fills it with the built-in vocabulary and [`DescriptionMapper::register`]
/// adds or replaces entries. Rule names with no entry leave the spec untouched.
pub struct DescriptionMapper {
    handlers: HashMap<String, RuleHandler>,
}

impl Default for DescriptionMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptionMapper {
    /// Creates a mapper that knows the built-in rule vocabulary.
    pub fn new() -> Self {
        let mut mapper = Self::empty();

        mapper.register("required", |_, spec| spec.required = true);
        mapper.register("accepted", |_, spec| spec.param_type = ParamType::Boolean);
        for name in [
            "boolean", "array", "date", "email", "string", "integer", "numeric", "url", "ip",
        ] {
            mapper.register(name, set_type_from_rule_name);
        }
        mapper.register("active_url", |_, spec| spec.param_type = ParamType::Url);

        mapper.register("alpha", |_, spec| {
            spec.describe("Only alphabetic characters allowed")
        });
        mapper.register("alpha_dash", |_, spec| {
            spec.describe("Allowed: alpha-numeric characters, as well as dashes and underscores.")
        });
        mapper.register("alpha_num", |_, spec| {
            spec.describe("Only alpha-numeric characters allowed")
        });
        mapper.register("image", |_, spec| {
            spec.describe("Must be an image (jpeg, png, bmp, gif, or svg)")
        });
        mapper.register("timezone", |_, spec| {
            spec.describe("Must be a valid timezone identifier")
        });

        mapper.register("in", |rule, spec| {
            spec.describe(fancy_join(&rule.parameters, ", ", " or "))
        });
        mapper.register("not_in", |rule, spec| {
            spec.describe(format!("Not in: {}", fancy_join(&rule.parameters, ", ", " or ")))
        });
        mapper.register("mimetypes", describe_mime_types);
        mapper.register("mimes", describe_mime_types);
        mapper.register("required_with", |rule, spec| {
            spec.describe(format!(
                "Required if the parameters {} are present.",
                fancy_join(&rule.parameters, ", ", " or ")
            ))
        });
        mapper.register("required_with_all", |rule, spec| {
            spec.describe(format!(
                "Required if the parameters {} are present.",
                fancy_join(&rule.parameters, ", ", " and ")
            ))
        });
        mapper.register("required_without", |rule, spec| {
            spec.describe(format!(
                "Required if the parameters {} are not present.",
                fancy_join(&rule.parameters, ", ", " or ")
            ))
        });
        mapper.register("required_without_all", |rule, spec| {
            spec.describe(format!(
                "Required if the parameters {} are not present.",
                fancy_join(&rule.parameters, ", ", " and ")
            ))
        });

        mapper.register("min", |rule, spec| {
            spec.describe(format!("Minimum: `{}`", rule.param(0)))
        });
        mapper.register("max", |rule, spec| {
            spec.describe(format!("Maximum: `{}`", rule.param(0)))
        });
        mapper.register("between", |rule, spec| {
            spec.param_type = ParamType::Numeric;
            spec.describe(format!(
                "Between: `{}` and `{}`",
                rule.param(0),
                rule.param(1)
            ));
        });
        mapper.register("size", |rule, spec| {
            spec.describe(format!("Must have the size of `{}`", rule.param(0)))
        });
        mapper.register("same", |rule, spec| {
            spec.describe(format!("Must be the same as `{}`", rule.param(0)))
        });
        mapper.register("different", |rule, spec| {
            spec.describe(format!(
                "Must have a different value than parameter: `{}`",
                rule.param(0)
            ))
        });

        mapper.register("after", |rule, spec| {
            spec.param_type = ParamType::Date;
            spec.describe(format!(
                "Must be a date after: `{}`",
                long_date(rule.param(0))
            ));
        });
        mapper.register("before", |rule, spec| {
            spec.param_type = ParamType::Date;
            spec.describe(format!(
                "Must be a date preceding: `{}`",
                long_date(rule.param(0))
            ));
        });
        mapper.register("date_format", |rule, spec| {
            spec.param_type = ParamType::Date;
            spec.describe(format!("Date format: `{}`", rule.param(0)));
        });

        mapper.register("digits", |rule, spec| {
            spec.param_type = ParamType::Numeric;
            spec.describe(format!("Must have an exact length of `{}`", rule.param(0)));
        });
        mapper.register("digits_between", |rule, spec| {
            spec.param_type = ParamType::Numeric;
            spec.describe(format!(
                "Must have a length between `{}` and `{}`",
                rule.param(0),
                rule.param(1)
            ));
        });

        mapper.register("required_if", |rule, spec| {
            spec.describe(format!(
                "Required if `{}` is `{}`",
                rule.param(0),
                rule.param(1)
            ))
        });
        mapper.register("required_unless", |rule, spec| {
            spec.describe(format!(
                "Required unless `{}` is `{}`",
                rule.param(0),
                rule.param(1)
            ))
        });

        mapper.register("json", |_, spec| {
            spec.param_type = ParamType::String;
            spec.describe("Must be a valid JSON string.");
        });
        mapper.register("regex", |rule, spec| {
            spec.param_type = ParamType::String;
            spec.describe(format!(
                "Must match this regular expression: `{}`",
                rule.param(0)
            ));
        });
        mapper.register("exists", |rule, spec| {
            spec.describe(format!(
                "Valid {} {}",
                singular(rule.param(0)),
                rule.param(1)
            ))
        });

        mapper
    }

    /// Creates a mapper with no rules registered.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `name`, replacing any previous handler.
    pub fn register(&mut self, name: impl Into<String>, handler: RuleHandler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Returns true if a handler exists for `name`.
    pub fn knows(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Folds `rule` into `spec`. Unknown rule names are ignored.
    pub fn apply(&self, rule: &Rule, spec: &mut ParameterSpec) {
        match self.handlers.get(rule.name.as_str()) {
            Some(handler) => handler(rule, spec),
            None => trace!("No description mapping for rule: {}", rule.name),
        }
    }
}

fn set_type_from_rule_name(rule: &Rule, spec: &mut ParameterSpec) {
    if let Some(param_type) = ParamType::from_rule_name(&rule.name) {
        spec.param_type = param_type;
    }
}

fn describe_mime_types(rule: &Rule, spec: &mut ParameterSpec) {
    spec.describe(format!(
        "Allowed mime types: {}",
        fancy_join(&rule.parameters, ", ", " or ")
    ))
}

/// Backtick-quotes every value and joins them, using `last` between the final
/// two and `separator` everywhere else.
///
/// `["a", "b", "c"]` with `", "` and `" or "` renders as ``"`a`, `b` or `c`"``.
pub fn fancy_join<S: AsRef<str>>(values: &[S], separator: &str, last: &str) -> String {
    let mut quoted: Vec<String> = values
        .iter()
        .map(|value| format!("`{}`", value.as_ref()))
        .collect();

    if quoted.len() >= 2 {
        let tail = quoted.split_off(quoted.len() - 2);
        quoted.push(tail.join(last));
    }

    quoted.join(separator)
}

const LONG_DATE_FORMAT: &str = "%A, %d %B %Y %H:%M:%S %Z";

/// Renders a rule's date parameter in a long, human-readable form such as
/// `Saturday, 01 January 2022 00:00:00 UTC`. Values without a timezone are
/// read as UTC; values that do not parse are returned unchanged.
pub fn long_date(value: &str) -> String {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.format(LONG_DATE_FORMAT).to_string();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return parsed.format(LONG_DATE_FORMAT).to_string();
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return parsed.and_utc().format(LONG_DATE_FORMAT).to_string();
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return midnight.and_utc().format(LONG_DATE_FORMAT).to_string();
    }

    trace!("Unrecognized date parameter, keeping it verbatim: {}", value);
    value.to_string()
}

/// Lower-case English singular of a table name, used as a display hint only.
pub fn singular(word: &str) -> String {
    const UNCOUNTABLE: &[&str] = &[
        "data", "equipment", "information", "news", "series", "sheep", "species", "fish",
    ];
    const IRREGULAR: &[(&str, &str)] = &[
        ("people", "person"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("teeth", "tooth"),
        ("feet", "foot"),
    ];

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return lower;
    }
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return single.to_string();
    }

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &lower[..lower.len() - 3]);
    }
    if ["sses", "shes", "ches", "xes", "zzes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return lower[..lower.len() - 2].to_string();
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return lower;
    }
    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parser::RuleParser;
    use pretty_assertions::assert_eq;

    fn apply_all(rules: &[&str]) -> ParameterSpec {
        let mapper = DescriptionMapper::new();
        let mut spec = ParameterSpec::default();
        for rule in rules {
            mapper.apply(&RuleParser::parse(rule), &mut spec);
        }
        spec
    }

    #[test]
    fn test_default_spec() {
        let spec = ParameterSpec::default();
        assert!(!spec.required);
        assert_eq!(spec.param_type, ParamType::String);
        assert_eq!(spec.default, "");
        assert!(spec.description.is_empty());
    }

    #[test]
    fn test_required_sets_flag_only() {
        let spec = apply_all(&["required"]);
        assert!(spec.required);
        assert_eq!(spec.param_type, ParamType::String);
        assert!(spec.description.is_empty());
    }

    #[test]
    fn test_type_rules() {
        assert_eq!(apply_all(&["accepted"]).param_type, ParamType::Boolean);
        assert_eq!(apply_all(&["bool"]).param_type, ParamType::Boolean);
        assert_eq!(apply_all(&["int"]).param_type, ParamType::Integer);
        assert_eq!(apply_all(&["email"]).param_type, ParamType::Email);
        assert_eq!(apply_all(&["array"]).param_type, ParamType::Array);
        assert_eq!(apply_all(&["ip"]).param_type, ParamType::Ip);
        assert_eq!(apply_all(&["active_url"]).param_type, ParamType::Url);
    }

    #[test]
    fn test_last_type_rule_wins() {
        assert_eq!(apply_all(&["string", "integer"]).param_type, ParamType::Integer);
        assert_eq!(apply_all(&["integer", "string"]).param_type, ParamType::String);
    }

    #[test]
    fn test_in_rule() {
        let spec = apply_all(&["in:a,b,c"]);
        assert_eq!(spec.description, vec!["`a`, `b` or `c`"]);
    }

    #[test]
    fn test_not_in_and_mimes() {
        let spec = apply_all(&["not_in:x,y", "mimes:jpeg,png"]);
        assert_eq!(
            spec.description,
            vec!["Not in: `x` or `y`", "Allowed mime types: `jpeg` or `png`"]
        );
    }

    #[test]
    fn test_required_with_variants() {
        let spec = apply_all(&[
            "required_with:a,b",
            "required_with_all:a,b,c",
            "required_without:a",
            "required_without_all:a,b",
        ]);
        assert_eq!(
            spec.description,
            vec![
                "Required if the parameters `a` or `b` are present.",
                "Required if the parameters `a`, `b` and `c` are present.",
                "Required if the parameters `a` are not present.",
                "Required if the parameters `a` and `b` are not present.",
            ]
        );
    }

    #[test]
    fn test_between_sets_numeric() {
        let spec = apply_all(&["between:1,10"]);
        assert_eq!(spec.param_type, ParamType::Numeric);
        assert_eq!(spec.description, vec!["Between: `1` and `10`"]);
    }

    #[test]
    fn test_bound_rules() {
        let spec = apply_all(&["min:3", "max:255", "size:4", "same:password", "different:old"]);
        assert_eq!(
            spec.description,
            vec![
                "Minimum: `3`",
                "Maximum: `255`",
                "Must have the size of `4`",
                "Must be the same as `password`",
                "Must have a different value than parameter: `old`",
            ]
        );
        assert_eq!(spec.param_type, ParamType::String);
    }

    #[test]
    fn test_digit_rules() {
        let spec = apply_all(&["digits:4"]);
        assert_eq!(spec.param_type, ParamType::Numeric);
        assert_eq!(spec.description, vec!["Must have an exact length of `4`"]);

        let spec = apply_all(&["digits_between:2,6"]);
        assert_eq!(spec.description, vec!["Must have a length between `2` and `6`"]);
    }

    #[test]
    fn test_date_rules() {
        let spec = apply_all(&["after:2022-01-01"]);
        assert_eq!(spec.param_type, ParamType::Date);
        assert_eq!(
            spec.description,
            vec!["Must be a date after: `Saturday, 01 January 2022 00:00:00 UTC`"]
        );

        let spec = apply_all(&["before:2021-12-24 18:30:00"]);
        assert_eq!(
            spec.description,
            vec!["Must be a date preceding: `Friday, 24 December 2021 18:30:00 UTC`"]
        );

        let spec = apply_all(&["date_format:Y-m-d H:i"]);
        assert_eq!(spec.param_type, ParamType::Date);
        assert_eq!(spec.description, vec!["Date format: `Y-m-d H:i`"]);
    }

    #[test]
    fn test_long_date_keeps_unparseable_value() {
        assert_eq!(long_date("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_conditional_requirements() {
        let spec = apply_all(&["required_if:type,company", "required_unless:type,person"]);
        assert_eq!(
            spec.description,
            vec![
                "Required if `type` is `company`",
                "Required unless `type` is `person`",
            ]
        );
        assert!(!spec.required);
    }

    #[test]
    fn test_json_and_regex() {
        let spec = apply_all(&["integer", "json"]);
        assert_eq!(spec.param_type, ParamType::String);
        assert_eq!(spec.description, vec!["Must be a valid JSON string."]);

        let spec = apply_all(&["integer", "regex:/^[0-9]+:[a-z]+$/"]);
        assert_eq!(spec.param_type, ParamType::String);
        assert_eq!(
            spec.description,
            vec!["Must match this regular expression: `/^[0-9]+:[a-z]+$/`"]
        );
    }

    #[test]
    fn test_exists_singularizes_table() {
        let spec = apply_all(&["integer", "exists:users,id"]);
        assert_eq!(spec.description, vec!["Valid user id"]);
        assert_eq!(spec.param_type, ParamType::Integer);
    }

    #[test]
    fn test_descriptive_only_rules_keep_type() {
        let spec = apply_all(&["integer", "alpha", "alpha_dash", "alpha_num", "image", "timezone"]);
        assert_eq!(spec.param_type, ParamType::Integer);
        assert_eq!(spec.description.len(), 5);
    }

    #[test]
    fn test_unknown_rule_is_noop() {
        let mapper = DescriptionMapper::new();
        let mut spec = apply_all(&["required", "min:2"]);
        let before = spec.clone();
        mapper.apply(&RuleParser::parse("frobnicate:1,2"), &mut spec);
        assert_eq!(spec, before);
    }

    #[test]
    fn test_missing_parameters_do_not_panic() {
        let spec = apply_all(&["between:5"]);
        assert_eq!(spec.description, vec!["Between: `5` and ``"]);
    }

    #[test]
    fn test_register_custom_rule() {
        let mut mapper = DescriptionMapper::new();
        assert!(!mapper.knows("uuid"));
        mapper.register("uuid", |_, spec| spec.describe("Must be a valid UUID"));

        let mut spec = ParameterSpec::default();
        mapper.apply(&RuleParser::parse("uuid"), &mut spec);
        assert_eq!(spec.description, vec!["Must be a valid UUID"]);
    }

    #[test]
    fn test_fancy_join() {
        assert_eq!(fancy_join(&["a"], ", ", " or "), "`a`");
        assert_eq!(fancy_join(&["a", "b"], ", ", " or "), "`a` or `b`");
        assert_eq!(fancy_join(&["a", "b", "c"], ", ", " or "), "`a`, `b` or `c`");
        assert_eq!(
            fancy_join(&["a", "b", "c", "d"], ", ", " and "),
            "`a`, `b`, `c` and `d`"
        );
        assert_eq!(fancy_join::<&str>(&[], ", ", " or "), "");
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("users"), "user");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("news"), "news");
        assert_eq!(singular("user"), "user");
    }

    #[test]
    fn test_spec_serializes_type_lowercase() {
        let spec = apply_all(&["required", "numeric"]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "numeric");
        assert_eq!(json["required"], true);
    }
}
