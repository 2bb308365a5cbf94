//! Parser for plugin specifications.
//!
//! A specification is a call expression restricted to literals:
//!
//! ```text
//! spec     := call
//! call     := ident '(' [argument (',' argument)*] ')'
//! argument := string | call | number
//! string   := '"' chars '"' | '\'' chars '\''
//! ```
//!
//! Nothing is evaluated; the parsed call is resolved against a fixed
//! registry of plugin names.

use collector_model::{CollectorError, Result};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{all_consuming, map, recognize},
    multi::{many0_count, separated_list0},
    number::complete::double,
    sequence::{delimited, pair},
};

/// A parsed call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginCall {
    pub name: String,
    pub args: Vec<Arg>,
}

/// A literal or nested call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Number(f64),
    Call(PluginCall),
}

impl Arg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&PluginCall> {
        match self {
            Self::Call(call) => Some(call),
            _ => None,
        }
    }
}

/// Parse a complete plugin specification such as `RemoveKey("a", "b")`.
pub fn parse_plugin_call(spec: &str) -> Result<PluginCall> {
    all_consuming(ws(call))(spec)
        .map(|(_, parsed)| parsed)
        .map_err(|err| CollectorError::PluginSyntax {
            spec: spec.to_string(),
            message: match err {
                nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                    if inner.input.is_empty() {
                        "unexpected end of input".to_string()
                    } else {
                        format!("unexpected input at {:?}", inner.input)
                    }
                }
                nom::Err::Incomplete(_) => "incomplete input".to_string(),
            },
        })
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// "some text" or 'some text'
fn quoted_string(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))(input)
}

fn call(input: &str) -> IResult<&str, PluginCall> {
    map(
        pair(
            identifier,
            delimited(
                ws(char('(')),
                separated_list0(char(','), argument),
                ws(char(')')),
            ),
        ),
        |(name, args)| PluginCall {
            name: name.to_string(),
            args,
        },
    )(input)
}

fn argument(input: &str) -> IResult<&str, Arg> {
    ws(alt((
        map(quoted_string, |value: &str| Arg::Str(value.to_string())),
        map(call, Arg::Call),
        map(double, Arg::Number),
    )))(input)
}
