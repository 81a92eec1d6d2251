//! Extraction of values the site embeds as inline script variables.
//!
//! Story and chapter pages both carry a block of `var name = value;`
//! assignments. Each field has its own single-capture pattern; integers are
//! matched as `\d+`, strings as a single-quoted literal running to the last
//! `';` on the line. A pattern that does not match is a fatal
//! [`ScraperError::MissingField`].

use crate::error::ScraperError;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static STORY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+storyid\s*=\s*(\d+);").unwrap());
static CHAPTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+chapter\s*=\s*(\d+);").unwrap());
static CHAPTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+chapters\s*=\s*(\d+);").unwrap());
static WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+words\s*=\s*(\d+);").unwrap());
static USER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+userid\s*=\s*(\d+);").unwrap());
static DISPLAY_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+title_t\s*=\s*'(.+)';").unwrap());
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+summary\s*=\s*'(.+)';").unwrap());
static CATEGORY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+categoryid\s*=\s*(\d+);").unwrap());
static CATEGORY_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+cat_title\s*=\s*'(.+)';").unwrap());
static DATE_PUBLISHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+datep\s*=\s*'(.+)';").unwrap());
static DATE_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+dateu\s*=\s*'(.+)';").unwrap());
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+author\s*=\s*'(.+)';").unwrap());

/// `review_url` ends in the chapter's text id, used to build review links.
static STORY_TEXT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+review_url\s*=\s*'.*storytextid=(\d+)';").unwrap());

/// One backslash escape of a quote or backslash.
static JS_ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\\(['"\\])"#).unwrap());

/// Returns the first capture group of `pattern`, or `MissingField(field)`.
fn capture<'s>(pattern: &Regex, field: &str, source: &'s str) -> Result<&'s str, ScraperError> {
    pattern
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ScraperError::MissingField(field.to_string()))
}

/// Parses the first capture group of `pattern` as an integer.
pub fn parse_integer<T>(pattern: &Regex, field: &str, source: &str) -> Result<T, ScraperError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let digits = capture(pattern, field, source)?;
    digits.parse::<T>().map_err(|e| ScraperError::ParseError {
        field: field.to_string(),
        message: format!("{digits:?}: {e}"),
    })
}

/// Returns the first capture group of `pattern` verbatim.
pub fn parse_string(pattern: &Regex, field: &str, source: &str) -> Result<String, ScraperError> {
    capture(pattern, field, source).map(str::to_string)
}

/// Removes JavaScript string escaping from a single-quoted literal body.
///
/// `\'`, `\"` and `\\` are rewritten in one left-to-right pass, so `\\'`
/// becomes `\'` rather than collapsing twice. Other escapes are left as-is.
pub fn unescape_javascript_string(literal: &str) -> String {
    JS_ESCAPE.replace_all(literal, "$1").into_owned()
}

fn parse_unescaped(pattern: &Regex, field: &str, source: &str) -> Result<String, ScraperError> {
    capture(pattern, field, source).map(unescape_javascript_string)
}

pub fn story_id(source: &str) -> Result<u64, ScraperError> {
    parse_integer(&STORY_ID, "storyid", source)
}

/// Index of the chapter the page is showing (1-based).
pub fn chapter_number(source: &str) -> Result<u32, ScraperError> {
    parse_integer(&CHAPTER, "chapter", source)
}

pub fn chapter_count(source: &str) -> Result<u32, ScraperError> {
    parse_integer(&CHAPTERS, "chapters", source)
}

pub fn word_count(source: &str) -> Result<u64, ScraperError> {
    parse_integer(&WORDS, "words", source)
}

pub fn author_id(source: &str) -> Result<u64, ScraperError> {
    parse_integer(&USER_ID, "userid", source)
}

/// Human-readable title (`var title_t`), unescaped.
pub fn display_title(source: &str) -> Result<String, ScraperError> {
    parse_unescaped(&DISPLAY_TITLE, "title_t", source)
}

pub fn summary(source: &str) -> Result<String, ScraperError> {
    parse_unescaped(&SUMMARY, "summary", source)
}

pub fn category_id(source: &str) -> Result<u64, ScraperError> {
    parse_integer(&CATEGORY_ID, "categoryid", source)
}

pub fn category(source: &str) -> Result<String, ScraperError> {
    parse_unescaped(&CATEGORY_TITLE, "cat_title", source)
}

/// Publication date exactly as the page writes it.
pub fn date_published(source: &str) -> Result<String, ScraperError> {
    parse_string(&DATE_PUBLISHED, "datep", source)
}

/// Last-update date exactly as the page writes it.
pub fn date_updated(source: &str) -> Result<String, ScraperError> {
    parse_string(&DATE_UPDATED, "dateu", source)
}

pub fn author(source: &str) -> Result<String, ScraperError> {
    parse_unescaped(&AUTHOR, "author", source)
}

pub fn story_text_id(source: &str) -> Result<u64, ScraperError> {
    parse_integer(&STORY_TEXT_ID, "review_url storytextid", source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"<script>
var storyid = 4242;
var chapter = 3;
var chapters = 17;
var words = 123456;
var userid = 987;
var title = 'It%27s+Fine';
var title_t = 'It\'s \"Fine\"';
var summary = 'A story about a \\ backslash, and a \'quote\'.';
var categoryid = 224;
var cat_title = 'Harry Potter';
var datep = '01-15-10';
var dateu = '03-02-11';
var author = 'Some O\'Writer';
var review_url = '/r/4242/?storytextid=555111';
</script>"#;

    #[test]
    fn test_integer_fields() {
        assert_eq!(story_id(SCRIPT).unwrap(), 4242);
        assert_eq!(chapter_number(SCRIPT).unwrap(), 3);
        assert_eq!(chapter_count(SCRIPT).unwrap(), 17);
        assert_eq!(word_count(SCRIPT).unwrap(), 123_456);
        assert_eq!(author_id(SCRIPT).unwrap(), 987);
        assert_eq!(category_id(SCRIPT).unwrap(), 224);
        assert_eq!(story_text_id(SCRIPT).unwrap(), 555_111);
    }

    #[test]
    fn test_chapter_does_not_match_chapters() {
        let source = "var chapters = 9;\nvar chapter = 2;";
        assert_eq!(chapter_number(source).unwrap(), 2);
        assert_eq!(chapter_count(source).unwrap(), 9);
    }

    #[test]
    fn test_string_fields_are_unescaped() {
        assert_eq!(display_title(SCRIPT).unwrap(), r#"It's "Fine""#);
        assert_eq!(
            summary(SCRIPT).unwrap(),
            r"A story about a \ backslash, and a 'quote'."
        );
        assert_eq!(category(SCRIPT).unwrap(), "Harry Potter");
        assert_eq!(author(SCRIPT).unwrap(), "Some O'Writer");
    }

    #[test]
    fn test_dates_are_verbatim() {
        assert_eq!(date_published(SCRIPT).unwrap(), "01-15-10");
        assert_eq!(date_updated(SCRIPT).unwrap(), "03-02-11");
    }

    #[test]
    fn test_title_t_is_not_confused_with_title() {
        let source = "var title = 'Slug+Form';\nvar title_t = 'Display';";
        assert_eq!(display_title(source).unwrap(), "Display");
        assert!(matches!(
            display_title("var title = 'Slug+Form';"),
            Err(ScraperError::MissingField(ref f)) if f == "title_t"
        ));
    }

    #[test]
    fn test_string_literal_is_greedy_to_last_quote() {
        let source = "var summary = 'one'; two';";
        assert_eq!(summary(source).unwrap(), "one'; two");
    }

    #[test]
    fn test_unescape_javascript_string() {
        assert_eq!(
            unescape_javascript_string(r#"It\'s \"ok\"\\"#),
            r#"It's "ok"\"#
        );
    }

    #[test]
    fn test_unescape_single_pass() {
        // `\\` followed by `'` is an escaped backslash then a bare quote.
        assert_eq!(unescape_javascript_string(r"a\\'b"), r"a\'b");
        assert_eq!(unescape_javascript_string(r"\\\\"), r"\\");
        assert_eq!(unescape_javascript_string(r"line\nbreak"), r"line\nbreak");
    }

    #[test]
    fn test_missing_field() {
        let err = story_id("<html></html>").unwrap_err();
        assert!(matches!(err, ScraperError::MissingField(ref f) if f == "storyid"));
        assert!(err.to_string().contains("storyid"));
    }

    #[test]
    fn test_integer_overflow_is_parse_error() {
        let source = "var chapters = 99999999999999;";
        assert!(matches!(
            chapter_count(source),
            Err(ScraperError::ParseError { .. })
        ));
    }
}
