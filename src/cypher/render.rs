//! AST → Cypher text.
//!
//! Every AST type renders through `Display`. Labels, relationship types,
//! property keys and aliases go through [`escape_name`], so a user-supplied
//! label can never close the pattern it sits in.

use std::borrow::Cow;
use std::fmt;

use super::ast::*;

/// Quote a symbolic name with back-ticks unless it is a plain identifier.
/// Embedded back-ticks are doubled.
pub fn escape_name(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if plain {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('`', "``")))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.matches.iter().enumerate() {
            if i > 0 { writeln!(f)?; }
            write!(f, "{clause}")?;
        }
        write!(f, "\n{}", self.return_clause)?;
        if let Some(limit) = &self.limit {
            write!(f, "\nLIMIT {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MatchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional { write!(f, "OPTIONAL ")?; }
        write!(f, "MATCH {}", self.pattern)?;
        if let Some(predicate) = &self.where_clause {
            write!(f, "\nWHERE {predicate}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path_variable {
            write!(f, "{} = ", escape_name(path))?;
        }
        for element in &self.elements {
            match element {
                PatternElement::Node(node) => write!(f, "{node}")?,
                PatternElement::Relationship(rel) => write!(f, "{rel}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if let Some(alias) = &self.alias {
            write!(f, "{}", escape_name(alias))?;
        }
        for label in &self.labels {
            write!(f, ":{}", escape_name(label))?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for RelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.direction {
            PatternDirection::Right => ("-[", "]->"),
            PatternDirection::Left => ("<-[", "]-"),
            PatternDirection::Both => ("-[", "]-"),
        };
        write!(f, "{open}")?;
        if let Some(alias) = &self.alias {
            write!(f, "{}", escape_name(alias))?;
        }
        for (i, rel_type) in self.rel_types.iter().enumerate() {
            write!(f, "{}{}", if i == 0 { ":" } else { "|" }, escape_name(rel_type))?;
        }
        write!(f, "{close}")
    }
}

impl fmt::Display for ReturnClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RETURN ")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{}", item.expr)?;
            if let Some(alias) = &item.alias {
                write!(f, " AS {}", escape_name(alias))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Binding strength, loosest first.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp { op: BinaryOp::And, .. } => 2,
        Expr::UnaryOp { op: UnaryOp::Not, .. } => 3,
        Expr::BinaryOp { .. } | Expr::StringOp { .. } | Expr::IsNull { .. } => 4,
        _ => 5,
    }
}

struct Operand<'a> {
    expr: &'a Expr,
    parenthesize: bool,
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parenthesize {
            write!(f, "({})", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

fn operand<'a>(child: &'a Expr, parent: &Expr, strict: bool) -> Operand<'a> {
    let (c, p) = (precedence(child), precedence(parent));
    Operand { expr: child, parenthesize: if strict { c <= p } else { c < p } }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(name) => write!(f, "{}", escape_name(name)),
            Expr::Property { expr, key } => {
                write!(f, "{}.{}", operand(expr, self, false), escape_name(key))
            }
            Expr::Parameter(name) => write!(f, "${}", escape_name(name)),
            Expr::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expr::BinaryOp { left, op, right } => {
                let associative = *op == BinaryOp::And;
                write!(
                    f,
                    "{} {op} {}",
                    operand(left, self, false),
                    operand(right, self, !associative),
                )
            }
            Expr::UnaryOp { op: UnaryOp::Not, expr } => {
                write!(f, "NOT {}", operand(expr, self, true))
            }
            Expr::IsNull { expr, negated } => {
                let suffix = if *negated { "IS NOT NULL" } else { "IS NULL" };
                write!(f, "{} {suffix}", operand(expr, self, true))
            }
            Expr::StringOp { left, op, right } => {
                write!(f, "{} {op} {}", operand(left, self, true), operand(right, self, true))
            }
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "=",
            BinaryOp::Neq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "AND",
        })
    }
}

impl fmt::Display for StringOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StringOp::StartsWith => "STARTS WITH",
            StringOp::EndsWith => "ENDS WITH",
            StringOp::Contains => "CONTAINS",
        })
    }
}
