//! Condition compiler: property filters → predicate expressions.
//!
//! A block's filters compile to [`Condition`]s bound to that block's anchor.
//! Each condition then renders to a predicate, binding its operand(s) as
//! parameters. Unrecognized operator names fall back to `EQUALS`.

use crate::cypher::ast::{BinaryOp, Expr, StringOp};
use crate::cypher::Parameters;
use crate::model::Value;
use crate::{Error, Result};

use super::block::{PropertyFilter, PropertyFilters};

/// Comparison operator of a property filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    NotBetween,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Strict lookup of a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "EQUALS" => Operator::Equals,
            "NOT_EQUALS" => Operator::NotEquals,
            "GREATER_THAN" => Operator::GreaterThan,
            "LESS_THAN" => Operator::LessThan,
            "GREATER_OR_EQUAL" | "GREATER_THAN_OR_EQUAL" => Operator::GreaterOrEqual,
            "LESS_OR_EQUAL" | "LESS_THAN_OR_EQUAL" => Operator::LessOrEqual,
            "BETWEEN" => Operator::Between,
            "NOT_BETWEEN" => Operator::NotBetween,
            "CONTAINS" => Operator::Contains,
            "STARTS_WITH" => Operator::StartsWith,
            "ENDS_WITH" => Operator::EndsWith,
            "IS_NULL" => Operator::IsNull,
            "IS_NOT_NULL" => Operator::IsNotNull,
            _ => return None,
        })
    }

    /// Permissive lookup: absent, empty and unknown names all mean `EQUALS`.
    pub fn resolve(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            None | Some("") => Operator::Equals,
            Some(n) => Operator::from_name(n).unwrap_or_else(|| {
                tracing::warn!(operator = n, "unrecognized filter operator, using EQUALS");
                Operator::Equals
            }),
        }
    }

    /// Operators whose textual operands are lower-cased in case-insensitive mode.
    fn folds_case(self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::Contains
                | Operator::StartsWith
                | Operator::EndsWith
                | Operator::GreaterThan
                | Operator::LessThan
        )
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `IS_NULL` / `IS_NOT_NULL`.
    None,
    Scalar(Value),
    /// Inclusive `[min, max]` for `BETWEEN` / `NOT_BETWEEN`.
    Range { min: Value, max: Value },
}

/// One property predicate bound to a pattern anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub anchor: String,
    pub key: String,
    pub operator: Operator,
    pub operand: Operand,
}

/// Compile a block's filters into conditions on `anchor`.
///
/// Fails on a `BETWEEN`-family filter whose value is not a two-element list.
pub fn compile(anchor: &str, filters: &PropertyFilters) -> Result<Vec<Condition>> {
    filters
        .iter()
        .map(|(key, filter)| compile_one(anchor, key, filter))
        .collect()
}

fn compile_one(anchor: &str, key: &str, filter: &PropertyFilter) -> Result<Condition> {
    let (operator, raw) = match filter {
        PropertyFilter::Literal(v) => (Operator::Equals, Some(v)),
        PropertyFilter::Structured(s) => (Operator::resolve(s.operator.as_deref()), s.value.as_ref()),
    };

    let operand = match operator {
        Operator::IsNull | Operator::IsNotNull => Operand::None,
        Operator::Between | Operator::NotBetween => match raw {
            Some(serde_json::Value::Array(pair)) if pair.len() == 2 => Operand::Range {
                min: Value::from(&pair[0]),
                max: Value::from(&pair[1]),
            },
            other => {
                let got = other.map_or_else(|| "nothing".to_owned(), |v| v.to_string());
                return Err(Error::InvalidInput(format!(
                    "{anchor}.{key}: BETWEEN needs a [min, max] pair, got {got}"
                )));
            }
        },
        _ => Operand::Scalar(raw.map(Value::from).unwrap_or(Value::Null)),
    };

    Ok(Condition { anchor: anchor.to_owned(), key: key.to_owned(), operator, operand })
}

impl Condition {
    /// Render this condition as a predicate, binding operands into `params`.
    pub fn predicate(&self, params: &mut Parameters, case_insensitive: bool) -> Expr {
        let prop = Expr::property(&self.anchor, &self.key);

        match &self.operand {
            Operand::None => Expr::IsNull {
                expr: Box::new(prop),
                negated: self.operator == Operator::IsNotNull,
            },
            Operand::Range { min, max } => {
                let lo = Expr::binary(prop.clone(), BinaryOp::Gte, params.bind(min.clone()));
                let hi = Expr::binary(prop, BinaryOp::Lte, params.bind(max.clone()));
                let range = lo.and(hi);
                if self.operator == Operator::NotBetween { range.not() } else { range }
            }
            Operand::Scalar(value) => {
                let (lhs, value) = match value {
                    Value::String(s) if case_insensitive && self.operator.folds_case() => {
                        (Expr::call("toLower", vec![prop]), Value::String(s.to_lowercase()))
                    }
                    _ => (prop, value.clone()),
                };
                let rhs = params.bind(value);
                match self.operator {
                    Operator::NotEquals => Expr::binary(lhs, BinaryOp::Neq, rhs),
                    Operator::GreaterThan => Expr::binary(lhs, BinaryOp::Gt, rhs),
                    Operator::LessThan => Expr::binary(lhs, BinaryOp::Lt, rhs),
                    Operator::GreaterOrEqual => Expr::binary(lhs, BinaryOp::Gte, rhs),
                    Operator::LessOrEqual => Expr::binary(lhs, BinaryOp::Lte, rhs),
                    Operator::Contains => string_op(lhs, StringOp::Contains, rhs),
                    Operator::StartsWith => string_op(lhs, StringOp::StartsWith, rhs),
                    Operator::EndsWith => string_op(lhs, StringOp::EndsWith, rhs),
                    _ => Expr::binary(lhs, BinaryOp::Eq, rhs),
                }
            }
        }
    }
}

fn string_op(left: Expr, op: StringOp, right: Expr) -> Expr {
    Expr::StringOp { left: Box::new(left), op, right: Box::new(right) }
}
