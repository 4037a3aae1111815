//! Tokenizer for tag soup.
//!
//! Never fails: anything that does not lex as markup is text.

use std::borrow::Cow;

use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while, take_while1},
    character::complete::{char, multispace0, satisfy},
    combinator::{map, opt, recognize, rest, value},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Element attributes in source order.
pub type Attrs = IndexMap<String, String>;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    StartTag {
        name: String,
        attrs: Attrs,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    /// Text with entities decoded.
    Text(Cow<'a, str>),
}

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title"];

/// Tag or attribute name (letter followed by letters, digits, `-`, `:`).
fn name(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c: char| c.is_ascii_alphabetic()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'),
        )),
        |s: &str| s.to_ascii_lowercase(),
    )(input)
}

fn attr_name(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '"' | '\'' | '<')),
        |s: &str| s.to_ascii_lowercase(),
    )(input)
}

fn attr_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
        take_while1(|c: char| !c.is_whitespace() && c != '>'),
    ))(input)
}

/// `name`, `name=value`, `name="value"`, or `name='value'`.
fn attribute(input: &str) -> IResult<&str, (String, String)> {
    map(
        pair(
            preceded(take_while(|c: char| c.is_whitespace() || c == '/'), attr_name),
            opt(preceded(tuple((multispace0, char('='), multispace0)), attr_value)),
        ),
        |(key, val)| (key, val.map(decode).unwrap_or_default()),
    )(input)
}

fn start_tag(input: &str) -> IResult<&str, Token<'_>> {
    map(
        tuple((
            preceded(char('<'), name),
            many0(attribute),
            preceded(multispace0, opt(char('/'))),
            char('>'),
        )),
        |(name, list, slash, _)| {
            let mut attrs = Attrs::new();
            for (key, val) in list {
                attrs.entry(key).or_insert(val);
            }
            Token::StartTag {
                name,
                attrs,
                self_closing: slash.is_some(),
            }
        },
    )(input)
}

fn end_tag(input: &str) -> IResult<&str, Token<'_>> {
    map(
        terminated(
            preceded(tag("</"), name),
            pair(take_till(|c: char| c == '>' || c == '<'), char('>')),
        ),
        |name| Token::EndTag { name },
    )(input)
}

/// `<!-- ... -->`, unterminated comments run to the end of input.
fn comment(input: &str) -> IResult<&str, ()> {
    value(
        (),
        preceded(tag("<!--"), alt((terminated(take_until("-->"), tag("-->")), rest))),
    )(input)
}

/// `<!DOCTYPE ...>`, `<![CDATA[...]]>`, `<?xml ...?>` and similar.
fn declaration(input: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((alt((tag("<!"), tag("<?"))), take_till(|c: char| c == '>'), opt(char('>')))),
    )(input)
}

fn markup(input: &str) -> IResult<&str, Option<Token<'_>>> {
    alt((
        value(None, comment),
        value(None, declaration),
        map(end_tag, Some),
        map(start_tag, Some),
    ))(input)
}

fn decode(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Split the raw content of a raw-text element off `input`.
fn raw_text<'a>(input: &'a str, element: &str) -> (&'a str, &'a str) {
    let end = input
        .match_indices("</")
        .map(|(i, _)| i)
        .find(|&i| is_end_tag_of(&input[i..], element))
        .unwrap_or(input.len());
    input.split_at(end)
}

fn is_end_tag_of(input: &str, element: &str) -> bool {
    preceded(tag::<_, _, nom::error::Error<&str>>("</"), tag_no_case(element))(input).is_ok()
}

/// Tokenize `input`.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() {
        if let Ok((after, token)) = markup(remaining) {
            remaining = after;
            let Some(token) = token else { continue };
            if let Token::StartTag {
                name,
                self_closing: false,
                ..
            } = &token
            {
                if RAW_TEXT.contains(&name.as_str()) {
                    let (raw, after) = raw_text(remaining, name);
                    let element = name.clone();
                    tokens.push(token);
                    if !raw.is_empty() {
                        tokens.push(Token::Text(Cow::Borrowed(raw)));
                    }
                    remaining = after;
                    if !is_end_tag_of(remaining, &element) {
                        tokens.push(Token::EndTag { name: element });
                    }
                    continue;
                }
            }
            tokens.push(token);
            continue;
        }

        // Text up to the next `<`; a `<` that failed to lex is text too.
        let skip = usize::from(remaining.starts_with('<'));
        let end = remaining[skip..].find('<').map_or(remaining.len(), |i| i + skip);
        let (text, after) = remaining.split_at(end);
        tokens.push(Token::Text(html_escape::decode_html_entities(text)));
        remaining = after;
    }

    merge_text(tokens)
}

/// Join adjacent text tokens.
fn merge_text(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
    let mut merged: Vec<Token<'_>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Token::Text(next) = &token {
            if let Some(Token::Text(prev)) = merged.last_mut() {
                prev.to_mut().push_str(next);
                continue;
            }
        }
        merged.push(token);
    }
    merged
}
