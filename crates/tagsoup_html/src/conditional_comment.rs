//! Evaluator for Internet Explorer conditional comments
//!
//! Conditions look like `IE`, `lt IE 9`, `!(IE 7)`, `(gt IE 5)&(lte IE 8)` or `true`. Only the
//! `IE` feature is known; any other feature (`mso`, `vml`, ...) evaluates to false.
//!
//! ```text
//! expression := and ( "|" and )*
//! and        := unary ( "&" unary )*
//! unary      := "!" unary | primary
//! primary    := "(" expression ")" | "true" | "false" | feature
//! feature    := [ ("lt" | "lte" | "gt" | "gte") ] name [ version ]
//! ```
use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{alphanumeric1, char, digit1, multispace0, multispace1};
use nom::combinator::{all_consuming, map, opt, recognize, value};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};
use std::cmp::Ordering;
use tagsoup_config::BrowserVersion;
use thiserror::Error;

/// A condition that could not be evaluated. The scanner degrades the whole comment to text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("invalid conditional expression: {0}")]
    Syntax(String),

    #[error("comparison on '{0}' without a version")]
    MissingVersion(String),

    #[error("invalid version number: {0}")]
    InvalidVersion(String),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Clone, Debug, PartialEq)]
enum Expression {
    Bool(bool),
    Feature {
        comparison: Option<Comparison>,
        name: String,
        version: Option<String>,
    },
    Not(Box<Expression>),
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

/// Evaluates the condition of `<!--[if condition]>` for the given browser
pub fn evaluate(condition: &str, browser: &BrowserVersion) -> Result<bool, EvaluationError> {
    let (_, expression) = all_consuming(delimited(multispace0, expression, multispace0))
        .parse(condition)
        .map_err(|_| EvaluationError::Syntax(condition.to_string()))?;

    eval(&expression, browser)
}

fn eval(expression: &Expression, browser: &BrowserVersion) -> Result<bool, EvaluationError> {
    match expression {
        Expression::Bool(b) => Ok(*b),
        Expression::Not(inner) => Ok(!eval(inner, browser)?),
        Expression::And(list) => {
            let mut result = true;
            for e in list {
                result &= eval(e, browser)?;
            }
            Ok(result)
        }
        Expression::Or(list) => {
            let mut result = false;
            for e in list {
                result |= eval(e, browser)?;
            }
            Ok(result)
        }
        Expression::Feature {
            comparison,
            name,
            version,
        } => eval_feature(*comparison, name, version.as_deref(), browser),
    }
}

fn eval_feature(
    comparison: Option<Comparison>,
    name: &str,
    version: Option<&str>,
    browser: &BrowserVersion,
) -> Result<bool, EvaluationError> {
    if comparison.is_some() && version.is_none() {
        return Err(EvaluationError::MissingVersion(name.to_string()));
    }

    if !name.eq_ignore_ascii_case("ie") || !browser.is_ie {
        return Ok(false);
    }

    let Some(version) = version else {
        return Ok(true);
    };

    // "IE 8" matches any 8.x, "IE 5.5" compares the full version
    let ordering = if version.contains('.') {
        let wanted: f32 = version
            .parse()
            .map_err(|_| EvaluationError::InvalidVersion(version.to_string()))?;
        browser
            .version
            .partial_cmp(&wanted)
            .ok_or_else(|| EvaluationError::InvalidVersion(version.to_string()))?
    } else {
        let wanted: u32 = version
            .parse()
            .map_err(|_| EvaluationError::InvalidVersion(version.to_string()))?;
        browser.major_version().cmp(&wanted)
    };

    Ok(match comparison {
        None => ordering == Ordering::Equal,
        Some(Comparison::Lt) => ordering == Ordering::Less,
        Some(Comparison::Lte) => ordering != Ordering::Greater,
        Some(Comparison::Gt) => ordering == Ordering::Greater,
        Some(Comparison::Gte) => ordering != Ordering::Less,
    })
}

fn expression(input: &str) -> IResult<&str, Expression> {
    map(
        (
            and_expression,
            many0(preceded((multispace0, char('|'), multispace0), and_expression)),
        ),
        |(first, mut rest)| {
            if rest.is_empty() {
                first
            } else {
                rest.insert(0, first);
                Expression::Or(rest)
            }
        },
    )
    .parse(input)
}

fn and_expression(input: &str) -> IResult<&str, Expression> {
    map(
        (
            unary,
            many0(preceded((multispace0, char('&'), multispace0), unary)),
        ),
        |(first, mut rest)| {
            if rest.is_empty() {
                first
            } else {
                rest.insert(0, first);
                Expression::And(rest)
            }
        },
    )
    .parse(input)
}

fn unary(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded((char('!'), multispace0), unary), |e| {
            Expression::Not(Box::new(e))
        }),
        primary,
    ))
    .parse(input)
}

fn primary(input: &str) -> IResult<&str, Expression> {
    alt((
        delimited(
            (char('('), multispace0),
            expression,
            (multispace0, char(')')),
        ),
        value(Expression::Bool(true), terminated(tag_no_case("true"), word_end)),
        value(Expression::Bool(false), terminated(tag_no_case("false"), word_end)),
        feature,
    ))
    .parse(input)
}

fn word_end(input: &str) -> IResult<&str, ()> {
    match input.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
        _ => Ok((input, ())),
    }
}

fn comparison(input: &str) -> IResult<&str, Comparison> {
    alt((
        value(Comparison::Lte, tag_no_case("lte")),
        value(Comparison::Lt, tag_no_case("lt")),
        value(Comparison::Gte, tag_no_case("gte")),
        value(Comparison::Gt, tag_no_case("gt")),
    ))
    .parse(input)
}

fn version(input: &str) -> IResult<&str, &str> {
    recognize((digit1, opt((char('.'), digit1)))).parse(input)
}

fn feature(input: &str) -> IResult<&str, Expression> {
    map(
        (
            opt(terminated(comparison, multispace1)),
            alphanumeric1,
            opt(preceded(multispace1, version)),
        ),
        |(comparison, name, version): (Option<Comparison>, &str, Option<&str>)| {
            Expression::Feature {
                comparison,
                name: name.to_string(),
                version: version.map(str::to_string),
            }
        },
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn ie(version: f32) -> BrowserVersion {
        BrowserVersion::new("IE", "Internet Explorer", version, true)
    }

    fn firefox() -> BrowserVersion {
        BrowserVersion::new("FF", "Firefox", 31.0, false)
    }

    #[test_case("IE", 8.0, true)]
    #[test_case("ie", 8.0, true)]
    #[test_case("IE 8", 8.0, true)]
    #[test_case("IE 7", 8.0, false)]
    #[test_case("lt IE 9", 8.0, true)]
    #[test_case("lt IE 9", 9.0, false)]
    #[test_case("lte IE 9", 9.0, true)]
    #[test_case("gt IE 5.5", 6.0, true)]
    #[test_case("gte IE 5.5", 5.5, true)]
    #[test_case("gt IE 8", 8.0, false)]
    #[test_case("!IE", 8.0, false)]
    #[test_case("! IE 7", 8.0, true)]
    #[test_case("(gt IE 5)&(lt IE 7)", 6.0, true)]
    #[test_case("(gt IE 5)&(lt IE 7)", 8.0, false)]
    #[test_case("(IE 6)|(IE 8)", 8.0, true)]
    #[test_case("true", 8.0, true)]
    #[test_case("false", 8.0, false)]
    #[test_case("gte mso 9", 8.0, false)]
    #[test_case("vml", 8.0, false)]
    fn evaluates_for_ie(condition: &str, version: f32, expected: bool) {
        assert_eq!(evaluate(condition, &ie(version)), Ok(expected));
    }

    #[test_case("IE")]
    #[test_case("lt IE 9")]
    #[test_case("gte IE 5")]
    fn ie_conditions_fail_elsewhere(condition: &str) {
        assert_eq!(evaluate(condition, &firefox()), Ok(false));
        assert_eq!(evaluate(&format!("!({condition})"), &firefox()), Ok(true));
    }

    #[test]
    fn missing_version() {
        assert_eq!(
            evaluate("gte IE", &ie(8.0)),
            Err(EvaluationError::MissingVersion("IE".to_string()))
        );
    }

    #[test_case("")]
    #[test_case("IE 8 )")]
    #[test_case("(IE 8")]
    #[test_case("IE & ")]
    #[test_case("lt IE 9 foo")]
    fn syntax_errors(condition: &str) {
        assert_eq!(
            evaluate(condition, &ie(8.0)),
            Err(EvaluationError::Syntax(condition.to_string()))
        );
    }
}
