//! Structured filters and their compilation to backend query fragments
//!
//! The query builder never looks inside a compiled fragment; it only
//! embeds it. [`BoolQueryCompiler`] is the stock compiler and produces
//! `bool`/`term`/`range`/`wildcard` clauses.

use serde_json::{json, Value as JsonValue};

/// Comparison operator of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// Wildcard match: `*` any run, `?` one character
    Like,
}

/// Literal compared against a property
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// String or text
    String(String),
    /// Integer
    Int(i64),
    /// Float
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// RFC 3339 date
    Date(String),
}

impl FilterValue {
    fn to_json(&self) -> JsonValue {
        match self {
            FilterValue::String(s) | FilterValue::Date(s) => JsonValue::String(s.clone()),
            FilterValue::Int(i) => json!(i),
            FilterValue::Number(n) => json!(n),
            FilterValue::Boolean(b) => json!(b),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Int(i)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Boolean(b)
    }
}

/// Boolean expression over class properties
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// All operands must match
    And(Vec<Filter>),
    /// At least one operand must match
    Or(Vec<Filter>),
    /// Operand must not match
    Not(Box<Filter>),
    /// Compare one property against a value
    Clause {
        /// Property name
        path: String,
        /// Comparison
        operator: Operator,
        /// Right-hand side
        value: FilterValue,
    },
}

impl Filter {
    /// Build a clause
    pub fn clause(path: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Filter::Clause {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality clause
    pub fn eq(path: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::clause(path, Operator::Equal, value)
    }
}

/// Compiles a [`Filter`] into a backend query fragment
pub trait FilterCompiler: Send + Sync {
    /// Compile `filter`; errors describe what is unsupported or malformed
    fn compile(&self, filter: &Filter) -> Result<JsonValue, String>;
}

/// Fragment matching every document
pub fn match_all() -> JsonValue {
    json!({ "match_all": {} })
}

/// Compiler producing `bool` queries
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolQueryCompiler;

impl BoolQueryCompiler {
    fn compile_clause(path: &str, operator: Operator, value: &FilterValue) -> Result<JsonValue, String> {
        if path.is_empty() {
            return Err("filter path cannot be empty".to_string());
        }
        let v = value.to_json();
        let range = |op: &str| json!({ "range": { path: { op: v.clone() } } });

        Ok(match operator {
            Operator::Equal => json!({ "term": { path: v } }),
            Operator::NotEqual => json!({ "bool": { "must_not": [ { "term": { path: v } } ] } }),
            Operator::GreaterThan => range("gt"),
            Operator::GreaterThanEqual => range("gte"),
            Operator::LessThan => range("lt"),
            Operator::LessThanEqual => range("lte"),
            Operator::Like => match value {
                FilterValue::String(pattern) => json!({ "wildcard": { path: pattern } }),
                other => {
                    return Err(format!(
                        "operator Like on '{}' requires a string, got {:?}",
                        path, other
                    ))
                }
            },
        })
    }

    fn compile_all(&self, operands: &[Filter], what: &str) -> Result<Vec<JsonValue>, String> {
        if operands.is_empty() {
            return Err(format!("{} filter needs at least one operand", what));
        }
        operands.iter().map(|f| self.compile(f)).collect()
    }
}

impl FilterCompiler for BoolQueryCompiler {
    fn compile(&self, filter: &Filter) -> Result<JsonValue, String> {
        match filter {
            Filter::Clause {
                path,
                operator,
                value,
            } => Self::compile_clause(path, *operator, value),
            Filter::And(operands) => {
                let compiled = self.compile_all(operands, "And")?;
                Ok(json!({ "bool": { "filter": compiled } }))
            }
            Filter::Or(operands) => {
                let compiled = self.compile_all(operands, "Or")?;
                Ok(json!({ "bool": { "should": compiled, "minimum_should_match": 1 } }))
            }
            Filter::Not(inner) => {
                let compiled = self.compile(inner)?;
                Ok(json!({ "bool": { "must_not": [compiled] } }))
            }
        }
    }
}
