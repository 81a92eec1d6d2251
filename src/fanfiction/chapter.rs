//! Chapter title and body extraction from a parsed chapter page.

use super::metadata;
use crate::error::ScraperError;
use dom_query::{Document, Selection};

/// CSS for the story body container.
const STORY_TEXT_CSS: &str = "div#storytext";

/// Chapter navigation drop-down, only present once a second chapter exists.
const CHAPTER_SELECT_CSS: &str = r#"select[name="chapter"]"#;

/// Option of the chapter currently shown.
const SELECTED_OPTION_CSS: &str = "option[selected]";

/// AddToAny share buttons injected at the top of the body.
const SHARE_BUTTONS_CSS: &str = r#"div[class*="a2a_kit"]"#;

/// Legacy presentational attributes the site still puts on `<hr>`.
const HR_LEGACY_ATTRS: [&str; 2] = ["size", "noshade"];

/// Title and normalized body of one chapter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBody {
    pub title: String,
    /// Inner HTML of the body container.
    pub text: String,
}

impl ChapterBody {
    /// Extracts the chapter title and body from a page source.
    ///
    /// `source` is also searched for the story title when the page has no
    /// chapter drop-down (one-shots, or only one chapter posted so far).
    pub fn extract(source: &str) -> Result<Self, ScraperError> {
        let doc = Document::from(source);

        let title = match selected_chapter_title(&doc)? {
            Some(title) => title,
            None => metadata::display_title(source)?,
        };

        let container = doc.select(STORY_TEXT_CSS).first();
        if !container.exists() {
            return Err(ScraperError::MissingField(STORY_TEXT_CSS.to_string()));
        }

        Ok(Self {
            title,
            text: normalize_body(&container),
        })
    }
}

/// Title of the selected chapter option with its `N.` label dropped.
///
/// `Ok(None)` when the page has no chapter drop-down.
fn selected_chapter_title(doc: &Document) -> Result<Option<String>, ScraperError> {
    let select = doc.select(CHAPTER_SELECT_CSS).first();
    if !select.exists() {
        return Ok(None);
    }

    let option = select.select(SELECTED_OPTION_CSS).first();
    if !option.exists() {
        return Err(ScraperError::MissingField(
            "selected chapter option".to_string(),
        ));
    }

    let text = option.text();
    let text = text.trim();
    let title = match text.split_once(char::is_whitespace) {
        Some((_label, rest)) => rest.trim(),
        None => text,
    };

    Ok(Some(title.to_string()))
}

/// Drops the share buttons and legacy `<hr>` attributes, then serializes
/// the container's children.
fn normalize_body(body: &Selection<'_>) -> String {
    let share_buttons = body.select(SHARE_BUTTONS_CSS).first();
    if share_buttons.exists() {
        share_buttons.remove();
    } else {
        tracing::warn!("no share buttons in story body");
    }

    let rules = body.select("hr");
    for attr in HR_LEGACY_ATTRS {
        rules.remove_attr(attr);
    }

    body.inner_html().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_CHAPTER: &str = r#"<html><head><script>
var storyid = 100;
var chapter = 2;
var title_t = 'Story \'Title\'';
</script></head><body>
<select id="chap_select" name="chapter"><option value="1">1. Beginnings</option><option value="2" selected>2. The Long Road Home</option></select>
<div class="storytext xcontrast_txt nocopy" id="storytext"><div class="a2a_kit a2a_kit_size_24 a2a_default_style"><a class="a2a_button_facebook"></a></div><p>Hello</p><hr size="1" noshade=""><p>World</p></div>
</body></html>"#;

    const ONE_SHOT: &str = r#"<html><head><script>
var storyid = 101;
var chapter = 1;
var title_t = 'It\'s a \"One-Shot\"';
</script></head><body>
<div id="storytext"><p>Only chapter.</p><hr noshade><p>Fin.</p></div>
</body></html>"#;

    #[test]
    fn test_multi_chapter_title() {
        let body = ChapterBody::extract(MULTI_CHAPTER).unwrap();
        assert_eq!(body.title, "The Long Road Home");
    }

    #[test]
    fn test_single_chapter_falls_back_to_story_title() {
        let body = ChapterBody::extract(ONE_SHOT).unwrap();
        assert_eq!(body.title, r#"It's a "One-Shot""#);
    }

    #[test]
    fn test_share_buttons_removed() {
        let body = ChapterBody::extract(MULTI_CHAPTER).unwrap();
        assert!(!body.text.contains("a2a_kit"));
        assert!(!body.text.contains("a2a_button_facebook"));
        assert!(body.text.contains("<p>Hello</p>"));
        assert!(body.text.contains("<p>World</p>"));
    }

    #[test]
    fn test_missing_share_buttons_is_fine() {
        let body = ChapterBody::extract(ONE_SHOT).unwrap();
        assert!(body.text.contains("<p>Only chapter.</p>"));
        assert!(body.text.contains("<p>Fin.</p>"));
    }

    #[test]
    fn test_hr_attributes_stripped() {
        for source in [MULTI_CHAPTER, ONE_SHOT] {
            let body = ChapterBody::extract(source).unwrap();
            assert!(body.text.contains("<hr>"), "{}", body.text);
            assert!(!body.text.contains("noshade"));
            assert!(!body.text.contains("size="));
        }
    }

    #[test]
    fn test_text_is_inner_html() {
        let body = ChapterBody::extract(ONE_SHOT).unwrap();
        assert!(!body.text.contains("storytext"));
        assert!(body.text.starts_with("<p>"));
    }

    #[test]
    fn test_option_without_label_keeps_text() {
        let source = r#"<select name="chapter"><option selected>Prologue</option></select><div id="storytext">x</div>"#;
        let body = ChapterBody::extract(source).unwrap();
        assert_eq!(body.title, "Prologue");
    }

    #[test]
    fn test_option_text_includes_nested_markup() {
        let source = r#"<select name="chapter"><option value="3" selected>3. <b>Bold</b> Move</option></select><div id="storytext"><p>x</p></div>"#;
        let body = ChapterBody::extract(source).unwrap();
        assert_eq!(body.title, "Bold Move");
        assert_eq!(body.text, "<p>x</p>");
    }

    #[test]
    fn test_missing_story_text() {
        let source = r#"<select name="chapter"><option selected>1. A</option></select>"#;
        assert!(matches!(
            ChapterBody::extract(source),
            Err(ScraperError::MissingField(ref f)) if f == STORY_TEXT_CSS
        ));
    }

    #[test]
    fn test_select_without_selected_option() {
        let source = r#"<select name="chapter"><option>1. A</option></select><div id="storytext">x</div>"#;
        assert!(matches!(
            ChapterBody::extract(source),
            Err(ScraperError::MissingField(_))
        ));
    }

    #[test]
    fn test_no_select_and_no_title() {
        let source = r#"<div id="storytext">x</div>"#;
        assert!(matches!(
            ChapterBody::extract(source),
            Err(ScraperError::MissingField(ref f)) if f == "title_t"
        ));
    }
}
