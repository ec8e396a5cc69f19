//! Rich text markup helpers
//!
//! Note content is stored as markup, search and text exports work on the text content of it

use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("Valid comment pattern"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").expect("Valid tag pattern"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9A-Fa-f]{1,6})|([A-Za-z][A-Za-z0-9]*));")
        .expect("Valid entity pattern")
});

/// Text content of markup
///
/// Comments and tags are dropped, entities are decoded. No whitespace is added in place of
/// block elements, `<p>a</p><p>b</p>` becomes `ab` and `<b>Hello</b> world` becomes
/// `Hello world`.
pub fn plain_text(markup: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(markup, "");
    let without_tags = TAG_RE.replace_all(&without_comments, "");

    ENTITY_RE
        .replace_all(&without_tags, |captures: &Captures| decode_entity(captures))
        .into_owned()
}

fn decode_entity(captures: &Captures) -> String {
    if let Some(decimal) = captures.get(1) {
        return decode_code_point(decimal.as_str().parse().ok());
    }

    if let Some(hexadecimal) = captures.get(2) {
        return decode_code_point(u32::from_str_radix(hexadecimal.as_str(), 16).ok());
    }

    let decoded = match &captures[3] {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        // a plain space keeps search and exports predictable
        "nbsp" => " ",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "euro" => "\u{20ac}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        _ => return captures[0].to_string(),
    };

    decoded.to_string()
}

fn decode_code_point(code_point: Option<u32>) -> String {
    code_point
        .and_then(char::from_u32)
        .filter(|ch| *ch != '\0')
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}
