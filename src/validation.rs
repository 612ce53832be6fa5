//! Declarative field rules for article request bodies.
//!
//! Each field lists its rules in evaluation order. Checking a field stops at
//! its first failing rule, so a report holds at most one violation per field.

use crate::models::ArticleStatus;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use validator::{validate_length, ValidationError, Validator};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rule {
    Required,
    MinLength(u64),
    OneOf(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSchema {
    pub name: &'static str,
    pub rules: &'static [Rule],
}

pub const STATUS_RULES: &[Rule] = &[Rule::Required, Rule::OneOf(&ArticleStatus::NAMES)];

pub const ARTICLE_SCHEMA: &[FieldSchema] = &[
    FieldSchema {
        name: "title",
        rules: &[Rule::Required, Rule::MinLength(20)],
    },
    FieldSchema {
        name: "content",
        rules: &[Rule::Required, Rule::MinLength(200)],
    },
    FieldSchema {
        name: "category",
        rules: &[Rule::Required, Rule::MinLength(3)],
    },
    FieldSchema {
        name: "status",
        rules: STATUS_RULES,
    },
];

pub const STATUS_SCHEMA: &[FieldSchema] = &[FieldSchema {
    name: "status",
    rules: STATUS_RULES,
}];

/// Anything whose string fields can be looked up by name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&str>;
}

impl Rule {
    fn code(self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::MinLength(_) => "min_length",
            Rule::OneOf(_) => "one_of",
        }
    }

    fn passes(self, value: Option<&str>) -> bool {
        match (self, value) {
            (Rule::Required, value) => value.map_or(false, |v| !v.is_empty()),
            (Rule::MinLength(min), value) => validate_length(
                Validator::Length {
                    min: Some(min),
                    max: None,
                    equal: None,
                },
                value.unwrap_or_default(),
            ),
            (Rule::OneOf(values), Some(value)) => values.contains(&value),
            (Rule::OneOf(_), None) => false,
        }
    }

    fn violation(self, field: &str) -> ValidationError {
        let mut error = ValidationError::new(self.code());
        let message = match self {
            Rule::Required => format!("Field '{}' is required", field),
            Rule::MinLength(min) => {
                error.add_param(Cow::Borrowed("min"), &min);
                format!("Field '{}' must be at least {} characters", field, min)
            }
            Rule::OneOf(values) => {
                error.add_param(Cow::Borrowed("values"), &values);
                format!("Field '{}' must be one of: {}", field, values.join(" "))
            }
        };
        error.message = Some(Cow::Owned(message));
        error
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct FieldViolation {
    pub field: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub error: ValidationError,
}

impl FieldViolation {
    fn new(field: &'static str, rule: Rule) -> Self {
        Self {
            field,
            index: None,
            error: rule.violation(field),
        }
    }

    pub fn code(&self) -> &str {
        &self.error.code
    }

    pub fn message(&self) -> &str {
        self.error.message.as_deref().unwrap_or("invalid field")
    }
}

/// Ordered list of violations; its `Display` is the comma-joined messages.
#[derive(Clone, Debug)]
pub struct ValidationReport {
    violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<&str> {
        self.violations.iter().map(FieldViolation::message).collect()
    }

    /// Tags every violation with the position of the offending batch item.
    pub fn at_index(mut self, index: usize) -> Self {
        for violation in &mut self.violations {
            violation.index = Some(index);
        }
        self
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(", "))
    }
}

pub fn validate<T: FieldSource + ?Sized>(
    value: &T,
    schema: &[FieldSchema],
) -> Result<(), ValidationReport> {
    let violations: Vec<FieldViolation> = schema
        .iter()
        .filter_map(|field| {
            let raw = value.field(field.name);
            field
                .rules
                .iter()
                .find(|rule| !rule.passes(raw))
                .map(|rule| FieldViolation::new(field.name, *rule))
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { violations })
    }
}

/// Turns an already validated status string into its enum value.
pub fn parse_status(raw: Option<&str>) -> Result<ArticleStatus, ValidationReport> {
    raw.unwrap_or_default().parse().map_err(|_| ValidationReport {
        violations: vec![FieldViolation::new("status", STATUS_RULES[1])],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fields(HashMap<&'static str, &'static str>);

    impl FieldSource for Fields {
        fn field(&self, name: &str) -> Option<&str> {
            self.0.get(name).copied()
        }
    }

    fn fields(pairs: &[(&'static str, &'static str)]) -> Fields {
        Fields(pairs.iter().copied().collect())
    }

    #[test]
    fn test_all_fields_missing() {
        let report = validate(&fields(&[]), ARTICLE_SCHEMA).unwrap_err();
        let codes: Vec<(&str, &str)> = report
            .violations()
            .iter()
            .map(|v| (v.field, v.code()))
            .collect();
        assert_eq!(
            codes,
            vec![
                ("title", "required"),
                ("content", "required"),
                ("category", "required"),
                ("status", "required"),
            ]
        );
    }

    #[test]
    fn test_messages_are_joined_in_schema_order() {
        let content: &'static str = Box::leak("B".repeat(200).into_boxed_str());
        let report = validate(
            &fields(&[
                ("title", "too short"),
                ("content", content),
                ("category", "ab"),
                ("status", "archived"),
            ]),
            ARTICLE_SCHEMA,
        )
        .unwrap_err();
        assert_eq!(
            report.to_string(),
            "Field 'title' must be at least 20 characters, \
             Field 'category' must be at least 3 characters, \
             Field 'status' must be one of: publish draft trash"
        );
    }

    #[test]
    fn test_min_length_counts_characters() {
        // 20 multi-byte characters satisfy a 20 character minimum
        let title: &'static str = Box::leak("é".repeat(20).into_boxed_str());
        assert!(validate(&fields(&[("title", title)]), &ARTICLE_SCHEMA[..1]).is_ok());
        let title: &'static str = Box::leak("é".repeat(19).into_boxed_str());
        assert!(validate(&fields(&[("title", title)]), &ARTICLE_SCHEMA[..1]).is_err());
    }

    #[test]
    fn test_min_length_boundaries() {
        for schema in &ARTICLE_SCHEMA[..3] {
            let min = match schema.rules[1] {
                Rule::MinLength(min) => min as usize,
                other => panic!("unexpected rule {:?}", other),
            };
            let exact: &'static str = Box::leak("x".repeat(min).into_boxed_str());
            let short: &'static str = Box::leak("x".repeat(min - 1).into_boxed_str());
            let one = std::slice::from_ref(schema);
            assert!(validate(&fields(&[(schema.name, exact)]), one).is_ok());
            let report = validate(&fields(&[(schema.name, short)]), one).unwrap_err();
            assert_eq!(report.violations()[0].code(), "min_length");
        }
    }

    #[test]
    fn test_violation_params() {
        let report = validate(&fields(&[("title", "short")]), &ARTICLE_SCHEMA[..1]).unwrap_err();
        let violation = &report.violations()[0];
        assert_eq!(violation.error.params["min"], serde_json::json!(20));

        let report = validate(&fields(&[("status", "archived")]), STATUS_SCHEMA).unwrap_err();
        let violation = &report.violations()[0];
        assert_eq!(
            violation.error.params["values"],
            serde_json::json!(["publish", "draft", "trash"])
        );
    }

    #[test]
    fn test_status_schema_ignores_other_fields() {
        assert!(validate(&fields(&[("status", "trash")]), STATUS_SCHEMA).is_ok());
    }

    #[test]
    fn test_at_index_and_serialization() {
        let report = validate(&fields(&[("status", "draft")]), STATUS_SCHEMA);
        assert!(report.is_ok());

        let report = validate(&fields(&[]), STATUS_SCHEMA)
            .unwrap_err()
            .at_index(3);
        let json = serde_json::to_value(report.violations()).unwrap();
        assert_eq!(json[0]["field"], "status");
        assert_eq!(json[0]["index"], 3);
        assert_eq!(json[0]["code"], "required");
        assert_eq!(json[0]["message"], "Field 'status' is required");
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status(Some("publish")).unwrap(), ArticleStatus::Publish);
        let report = parse_status(Some("archived")).unwrap_err();
        assert_eq!(report.violations()[0].code(), "one_of");
    }
}
