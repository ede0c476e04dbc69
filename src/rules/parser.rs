use log::trace;

/// A single validation directive such as `between:1,10`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Lower-cased, trimmed and normalized rule name
    pub name: String,
    /// Rule parameters in declaration order
    pub parameters: Vec<String>,
}

impl Rule {
    /// Returns the parameter at `index`, or an empty string when the rule was
    /// declared with fewer parameters than its description needs.
    pub fn param(&self, index: usize) -> &str {
        self.parameters.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Tokenizer for the `{rule}:{parameters}` rule language.
pub struct RuleParser;

impl RuleParser {
    /// Parses one rule expression. Any input is accepted.
    ///
    /// The name is everything before the first `:`. Parameters are split on
    /// commas with CSV quoting, except for `regex` whose whole remainder is a
    /// single parameter because patterns routinely contain `:` and `,`.
    pub fn parse(rule: &str) -> Rule {
        let (raw_name, raw_parameters) = match rule.split_once(':') {
            Some((name, rest)) => (name, Some(rest)),
            None => (rule, None),
        };

        let name = Self::normalize(&raw_name.trim().to_lowercase());
        let parameters = match raw_parameters {
            None => Vec::new(),
            Some(rest) if name == "regex" => vec![rest.to_string()],
            Some(rest) => split_csv(rest),
        };

        trace!("Parsed rule {:?} into {} {:?}", rule, name, parameters);
        Rule { name, parameters }
    }

    /// Maps shorthand names onto their canonical rule.
    fn normalize(name: &str) -> String {
        match name {
            "int" => "integer".to_string(),
            "bool" => "boolean".to_string(),
            other => other.to_string(),
        }
    }
}

/// Splits a single CSV record on `,`.
///
/// A field that opens with `"` runs to the matching close quote and may hold
/// commas; `""` inside it is a literal quote. Unquoted fields are verbatim.
fn split_csv(input: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }
    fields.push(field);

    fields
}
