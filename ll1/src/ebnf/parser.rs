use nom::{
    branch::alt,
    bytes::complete::{
        escaped_transform,
        tag,
        take_until,
        take_while,
        take_while_m_n,
    },
    character::complete::{
        char,
        multispace1,
        none_of,
    },
    combinator::{
        all_consuming,
        cut,
        map,
        map_opt,
        opt,
        value,
    },
    error::{
        context,
        ErrorKind,
        ParseError,
        VerboseError,
    },
    multi::{
        many0,
        many0_count,
        many1,
        separated_list1,
    },
    sequence::{
        delimited,
        pair,
        preceded,
        terminated,
        tuple,
    },
    IResult,
};

use super::ast::{
    Expression,
    Grammar,
    Literal,
    Name,
    Production,
};
use crate::utils::identifier_len;

type Res<'a, U> = IResult<&'a str, U, VerboseError<&'a str>>;

/// consumes a single `// ...` comment
fn consume_line_comment(input: &str) -> Res<()> {
    value((), pair(tag("//"), take_while(|c: char| c != '\r' && c != '\n')))(input)
}

/// consumes a single `/* ... */` comment
fn consume_block_comment(input: &str) -> Res<()> {
    value((), tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// consumes whitespace and comments
fn consume_wsc(input: &str) -> Res<()> {
    value(
        (),
        many0_count(alt((
            value((), multispace1),
            consume_line_comment,
            consume_block_comment,
        ))),
    )(input)
}

/// consumes all whitespace and comments before calling the parser `f`
fn wsc<'a, U>(f: impl FnMut(&'a str) -> Res<'a, U>) -> impl FnMut(&'a str) -> Res<'a, U> {
    preceded(consume_wsc, f)
}

pub(super) fn parse_grammar_complete(input: &str) -> Res<Grammar> {
    all_consuming(terminated(parse_grammar, consume_wsc))(input)
}

fn parse_grammar(input: &str) -> Res<Grammar> {
    context("grammar", map(many0(parse_production), Grammar))(input)
}

fn parse_production(input: &str) -> Res<Production> {
    context(
        "production",
        map(
            tuple((
                parse_name,
                wsc(char('=')),
                cut(parse_expression),
                cut(wsc(char('.'))),
            )),
            |(name, _, expr, _)| Production { name, expr },
        ),
    )(input)
}

fn parse_name(input: &str) -> Res<Name> {
    context(
        "name",
        map(wsc(identifier), Name::from),
    )(input)
}

fn identifier(input: &str) -> Res<&str> {
    match identifier_len(input) {
        Some(n) => {
            let (id, rest) = input.split_at(n);
            Ok((rest, id))
        }
        None => {
            Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::AlphaNumeric,
            )))
        }
    }
}

fn parse_expression(input: &str) -> Res<Expression> {
    context(
        "expression",
        map(separated_list1(wsc(char('|')), parse_sequence), |mut list| {
            if list.len() == 1 {
                list.remove(0)
            }
            else {
                Expression::Alternative(list)
            }
        }),
    )(input)
}

fn parse_sequence(input: &str) -> Res<Expression> {
    context(
        "sequence",
        map(many1(parse_term), |mut list| {
            if list.len() == 1 {
                list.remove(0)
            }
            else {
                Expression::Sequence(list)
            }
        }),
    )(input)
}

fn parse_term(input: &str) -> Res<Expression> {
    context(
        "term",
        alt((
            parse_token_or_range,
            map(parse_group, Expression::group),
            map(parse_option, Expression::option),
            map(parse_repetition, Expression::repetition),
            map(parse_name, Expression::Name),
        )),
    )(input)
}

fn parse_token_or_range(input: &str) -> Res<Expression> {
    map(
        pair(
            parse_literal,
            opt(preceded(wsc(tag("…")), cut(parse_literal))),
        ),
        |(begin, end)| {
            match end {
                Some(end) => Expression::Range { begin, end },
                None => Expression::Token(begin),
            }
        },
    )(input)
}

fn parse_literal(input: &str) -> Res<Literal> {
    context(
        "literal",
        wsc(map(alt((parse_interpreted, parse_raw)), Literal)),
    )(input)
}

fn parse_interpreted(input: &str) -> Res<String> {
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                none_of("\"\r\n\\"),
                '\\',
                parse_literal_escape,
            )),
            cut(char('"')),
        ),
        Option::unwrap_or_default,
    )(input)
}

fn parse_raw(input: &str) -> Res<String> {
    map(
        delimited(char('`'), take_while(|c: char| c != '`'), cut(char('`'))),
        str::to_owned,
    )(input)
}

/// `\xHH`, `\uHHHH` or `\UHHHHHHHH`, with exactly that many hex digits.
fn parse_code_point_escape(input: &str) -> Res<char> {
    context(
        "code point escape",
        map_opt(
            alt((
                preceded(char('x'), hex_digits(2)),
                preceded(char('u'), hex_digits(4)),
                preceded(char('U'), hex_digits(8)),
            )),
            |digits: &str| u32::from_str_radix(digits, 16).ok().and_then(char::from_u32),
        ),
    )(input)
}

fn hex_digits<'a>(n: usize) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    take_while_m_n(n, n, |c: char| c.is_ascii_hexdigit())
}

fn parse_literal_escape(input: &str) -> Res<char> {
    context(
        "literal escape",
        alt((
            char('\\'),
            char('"'),
            char('\''),
            value('\u{07}', char('a')),
            value('\u{08}', char('b')),
            value('\u{0c}', char('f')),
            value('\n', char('n')),
            value('\r', char('r')),
            value('\t', char('t')),
            value('\u{0b}', char('v')),
            parse_code_point_escape,
        )),
    )(input)
}

fn parse_group(input: &str) -> Res<Expression> {
    delimited(wsc(char('(')), cut(parse_expression), cut(wsc(char(')'))))(input)
}

fn parse_option(input: &str) -> Res<Expression> {
    delimited(wsc(char('[')), cut(parse_expression), cut(wsc(char(']'))))(input)
}

fn parse_repetition(input: &str) -> Res<Expression> {
    delimited(wsc(char('{')), cut(parse_expression), cut(wsc(char('}'))))(input)
}
