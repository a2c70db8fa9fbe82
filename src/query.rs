//! Spotify search filter grammar.
//!
//! A [`SearchQuery`] is a list of field filters understood by the Spotify
//! search endpoint:
//!
//! ```text
//! artist:"Taylor Swift" album:Thriller genre:rock year:2010-2020 tag:new isrc:USUM71703861 upc:00602547202871
//! ```
//!
//! Model replies are parsed leniently. Tokens outside the grammar (free text,
//! mood or tempo filters, commentary) are collected in
//! [`ParsedQuery::dropped`] and never reach the catalog.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRange {
    Single(u16),
    Span(u16, u16),
}

impl YearRange {
    fn parse(value: &str) -> Option<Self> {
        match value.split_once('-') {
            Some((from, to)) => {
                let from = parse_year(from)?;
                let to = parse_year(to)?;
                (from <= to).then_some(YearRange::Span(from, to))
            }
            None => parse_year(value).map(YearRange::Single),
        }
    }
}

fn parse_year(value: &str) -> Option<u16> {
    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearRange::Single(year) => write!(f, "{}", year),
            YearRange::Span(from, to) => write!(f, "{}-{}", from, to),
        }
    }
}

/// Editorial tags the search endpoint accepts on album searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorialTag {
    New,
    Hipster,
}

impl fmt::Display for EditorialTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorialTag::New => write!(f, "new"),
            EditorialTag::Hipster => write!(f, "hipster"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Artist(String),
    Album(String),
    Genre(String),
    Year(YearRange),
    Tag(EditorialTag),
    Isrc(String),
    Upc(String),
}

impl Filter {
    /// Field names of the grammar, in the form they appear before the colon.
    pub const FIELDS: [&'static str; 7] =
        ["artist", "album", "genre", "year", "tag", "isrc", "upc"];

    fn parse(field: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        match field.to_ascii_lowercase().as_str() {
            "artist" => Some(Filter::Artist(value.to_string())),
            "album" => Some(Filter::Album(value.to_string())),
            "genre" => Some(Filter::Genre(value.to_string())),
            "year" => YearRange::parse(value).map(Filter::Year),
            "tag" => match value.to_ascii_lowercase().as_str() {
                "new" => Some(Filter::Tag(EditorialTag::New)),
                "hipster" => Some(Filter::Tag(EditorialTag::Hipster)),
                _ => None,
            },
            "isrc" => (value.len() == 12 && value.chars().all(|c| c.is_ascii_alphanumeric()))
                .then(|| Filter::Isrc(value.to_ascii_uppercase())),
            "upc" => ((12..=13).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit()))
                .then(|| Filter::Upc(value.to_string())),
            _ => None,
        }
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, field: &str, value: &str) -> fmt::Result {
    if value.chars().any(char::is_whitespace) {
        write!(f, "{}:\"{}\"", field, value)
    } else {
        write!(f, "{}:{}", field, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Artist(v) => write_value(f, "artist", v),
            Filter::Album(v) => write_value(f, "album", v),
            Filter::Genre(v) => write_value(f, "genre", v),
            Filter::Year(range) => write!(f, "year:{}", range),
            Filter::Tag(tag) => write!(f, "tag:{}", tag),
            Filter::Isrc(v) => write!(f, "isrc:{}", v),
            Filter::Upc(v) => write!(f, "upc:{}", v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    filters: Vec<Filter>,
}

/// Result of parsing a model reply into the filter grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub query: SearchQuery,
    pub dropped: Vec<String>,
}

impl SearchQuery {
    pub fn new(filters: Vec<Filter>) -> Self {
        SearchQuery { filters }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Parses free text into filters, keeping every token that fits the grammar.
    ///
    /// Handles the usual model slips: a space after the colon
    /// (`genre: jazz`), trailing commas, backticks around the whole reply
    /// and quoted values (`artist:"Norah Jones"`).
    pub fn parse(text: &str) -> ParsedQuery {
        let cleaned = text.trim().trim_matches('`');
        let tokens = tokenize(cleaned);

        let mut filters = Vec::new();
        let mut dropped = Vec::new();
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            // A stray quote means the value boundary is unknown.
            if token.matches('"').count() % 2 == 1 {
                dropped.push(token);
                continue;
            }

            let Some((field, value)) = token.split_once(':') else {
                dropped.push(token.clone());
                continue;
            };

            let mut value = value.to_string();
            let mut raw = token.clone();
            let known_field = Filter::FIELDS
                .iter()
                .any(|name| name.eq_ignore_ascii_case(field));
            if value.is_empty() && known_field {
                if let Some(next) = iter.next_if(|t| !t.contains(':')) {
                    raw = format!("{} {}", token, next);
                    value = next;
                }
            }

            match Filter::parse(field, &unquote(&value)) {
                Some(filter) => filters.push(filter),
                None => dropped.push(raw),
            }
        }

        ParsedQuery {
            query: SearchQuery { filters },
            dropped,
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

// Splits on whitespace outside double quotes and drops separator commas. A
// quote left open at the end does not group: the rest is split plainly.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut token_start = 0;
    let mut open_quote_token = 0;

    for (i, c) in text.char_indices() {
        if current.is_empty() {
            token_start = i;
        }
        match c {
            '"' => {
                if !in_quotes {
                    open_quote_token = token_start;
                }
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                push_token(&mut tokens, &mut current);
            }
            ',' if !in_quotes => push_token(&mut tokens, &mut current),
            c => current.push(c),
        }
    }

    if in_quotes {
        tokens.extend(
            text[open_quote_token..]
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
        return tokens;
    }

    push_token(&mut tokens, &mut current);
    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
