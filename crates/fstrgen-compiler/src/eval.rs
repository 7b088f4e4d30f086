//! Constant evaluation of enumerator initialisers.
//!
//! Handles the expression subset enumerators use in practice: integer and character
//! literals, unary and binary arithmetic, shifts, bit operations, and
//! references to earlier enumerators of the same enum. Anything else (casts,
//! `std::numeric_limits<..>::max()`, braced functional casts) reports
//! [`EvalError`] and the caller falls back to the implicit-increment rule.

use arborium_tree_sitter as tree_sitter;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unsupported expression `{0}`")]
    Unsupported(String),
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),
    #[error("malformed literal `{0}`")]
    MalformedLiteral(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("shift amount out of range")]
    ShiftOutOfRange,
}

/// Evaluate an initialiser expression. `known` maps earlier enumerators of
/// the enum under evaluation to their concrete values.
pub fn eval(
    node: tree_sitter::Node,
    source: &str,
    known: &IndexMap<String, i128>,
) -> Result<i128, EvalError> {
    let text = |n: tree_sitter::Node| n.utf8_text(source.as_bytes()).unwrap_or_default();

    match node.kind() {
        "number_literal" => parse_number(text(node)),
        "char_literal" => parse_char(text(node)),
        "true" => Ok(1),
        "false" => Ok(0),
        "identifier" => {
            let name = text(node);
            known
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnknownIdentifier(name.to_string()))
        }
        "parenthesized_expression" => {
            let inner = node
                .named_child(0)
                .ok_or_else(|| EvalError::Unsupported(node.kind().to_string()))?;
            eval(inner, source, known)
        }
        "unary_expression" => {
            let operand = node
                .child_by_field_name("argument")
                .ok_or_else(|| EvalError::Unsupported(node.kind().to_string()))?;
            let value = eval(operand, source, known)?;
            let op = node
                .child_by_field_name("operator")
                .map(text)
                .unwrap_or_default();
            match op {
                "-" => Ok(-value),
                "+" => Ok(value),
                "~" => Ok(!value),
                "!" => Ok(i128::from(value == 0)),
                other => Err(EvalError::Unsupported(other.to_string())),
            }
        }
        "binary_expression" => {
            let lhs = node
                .child_by_field_name("left")
                .ok_or_else(|| EvalError::Unsupported(node.kind().to_string()))?;
            let rhs = node
                .child_by_field_name("right")
                .ok_or_else(|| EvalError::Unsupported(node.kind().to_string()))?;
            let left = eval(lhs, source, known)?;
            let right = eval(rhs, source, known)?;
            let op = node
                .child_by_field_name("operator")
                .map(text)
                .unwrap_or_default();
            apply_binary(op, left, right)
        }
        other => Err(EvalError::Unsupported(other.to_string())),
    }
}

fn apply_binary(op: &str, left: i128, right: i128) -> Result<i128, EvalError> {
    match op {
        "+" => Ok(left.wrapping_add(right)),
        "-" => Ok(left.wrapping_sub(right)),
        "*" => Ok(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(left.wrapping_div(right))
            }
        }
        "%" => {
            if right == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(left.wrapping_rem(right))
            }
        }
        "<<" => shift_amount(right).map(|s| left.wrapping_shl(s)),
        ">>" => shift_amount(right).map(|s| left.wrapping_shr(s)),
        "&" => Ok(left & right),
        "|" => Ok(left | right),
        "^" => Ok(left ^ right),
        other => Err(EvalError::Unsupported(other.to_string())),
    }
}

fn shift_amount(value: i128) -> Result<u32, EvalError> {
    u32::try_from(value)
        .ok()
        .filter(|&s| s < 128)
        .ok_or(EvalError::ShiftOutOfRange)
}

/// Parse a C++ integer literal: optional base prefix, `'` digit separators,
/// integer suffixes.
fn parse_number(raw: &str) -> Result<i128, EvalError> {
    let cleaned: String = raw.chars().filter(|&c| c != '\'').collect();
    let body = cleaned
        .trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .to_string();

    let parsed = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        i128::from_str_radix(bin, 2)
    } else if body.len() > 1 && body.starts_with('0') {
        i128::from_str_radix(&body[1..], 8)
    } else {
        body.parse()
    };

    parsed.map_err(|_| EvalError::MalformedLiteral(raw.to_string()))
}

/// Value of a character literal, including the usual escapes.
fn parse_char(raw: &str) -> Result<i128, EvalError> {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| EvalError::MalformedLiteral(raw.to_string()))?;

    let mut chars = inner.chars();
    let value = match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => 10,
            Some('t') => 9,
            Some('r') => 13,
            Some('0') => 0,
            Some('\\') => 92,
            Some('\'') => 39,
            Some('"') => 34,
            Some('a') => 7,
            Some('b') => 8,
            Some('f') => 12,
            Some('v') => 11,
            Some('x') => {
                let hex: String = chars.by_ref().collect();
                return i128::from_str_radix(&hex, 16)
                    .map_err(|_| EvalError::MalformedLiteral(raw.to_string()));
            }
            _ => return Err(EvalError::MalformedLiteral(raw.to_string())),
        },
        Some(c) => c as i128,
        None => return Err(EvalError::MalformedLiteral(raw.to_string())),
    };

    if chars.next().is_some() {
        return Err(EvalError::MalformedLiteral(raw.to_string()));
    }
    Ok(value)
}
