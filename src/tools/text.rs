//! HTML to plain text reduction.
//!
//! With the `html` feature the document is parsed with `scraper` and walked
//! element by element; without it a regex tag stripper is used instead.
//! Both paths are pure and never fail.

use lazy_static::lazy_static;
use regex::Regex;

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Elements whose text never reaches the output.
pub const EXCLUDED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "head", "title", "noscript", "template",
];

#[cfg(feature = "html")]
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li",
    "main", "ol", "p", "pre", "section", "summary", "table", "td", "th", "tr", "ul",
];

lazy_static! {
    static ref PHRASE_BREAK: Regex = Regex::new(r"\s{2,}").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref EXCLUDED_BLOCK: Regex = Regex::new(
        r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<nav\b.*?</nav\s*>|<footer\b.*?</footer\s*>|<header\b.*?</header\s*>|<head\b.*?</head\s*>|<noscript\b.*?</noscript\s*>"
    )
    .unwrap();
}

#[cfg(not(feature = "html"))]
lazy_static! {
    static ref TITLE: Regex = Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap();
}

/// Title and readable text of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Parses `html` once and reduces it to the first `<title>` and readable
/// text of at most `max_length` characters plus [`TRUNCATION_MARKER`].
pub fn extract_page(html: &str, max_length: usize) -> PageText {
    #[cfg(feature = "html")]
    {
        let document = scraper::Html::parse_document(html);
        PageText {
            title: document_title(&document),
            text: truncate_with_marker(collapse_whitespace(&visible_text(&document)), max_length),
        }
    }

    #[cfg(not(feature = "html"))]
    {
        log::warn!("HTML parser not available, using basic text extraction");
        let title = TITLE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| WHITESPACE.replace_all(m.as_str(), " ").trim().to_string());
        PageText {
            title,
            text: strip_tags(html, max_length),
        }
    }
}

/// Regex fallback: drops tags and collapses every whitespace run to one space.
#[cfg_attr(feature = "html", allow(dead_code))]
pub fn strip_tags(html: &str, max_length: usize) -> String {
    let without_blocks = EXCLUDED_BLOCK.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_blocks, "");
    let text = WHITESPACE.replace_all(&without_tags, " ").trim().to_string();
    truncate_with_marker(text, max_length)
}

#[cfg(feature = "html")]
fn document_title(document: &scraper::Html) -> Option<String> {
    let selector = scraper::Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string());
    title
}

#[cfg(feature = "html")]
enum Step<N> {
    Visit(N),
    BlockEnd,
}

/// Depth-first walk with an explicit stack, so nesting depth is bounded by
/// the heap rather than the thread stack.
#[cfg(feature = "html")]
fn visible_text(document: &scraper::Html) -> String {
    use scraper::Node;

    let mut out = String::new();
    let mut stack: Vec<Step<_>> = document
        .root_element()
        .children()
        .rev()
        .map(Step::Visit)
        .collect();

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::BlockEnd => {
                out.push('\n');
                continue;
            }
            Step::Visit(node) => node,
        };
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if EXCLUDED_ELEMENTS.contains(&name) {
                    continue;
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                    stack.push(Step::BlockEnd);
                }
                stack.extend(node.children().rev().map(Step::Visit));
            }
            _ => {}
        }
    }
    out
}

/// Trims every line, splits on runs of two or more whitespace characters,
/// drops empty fragments and rejoins with single newlines.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .flat_map(|line| PHRASE_BREAK.split(line.trim()))
        .map(|fragment| fragment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `text` to `max_length` characters and appends [`TRUNCATION_MARKER`] once.
pub fn truncate_with_marker(text: String, max_length: usize) -> String {
    truncate_with(text, max_length, TRUNCATION_MARKER)
}

pub fn truncate_with(mut text: String, max_length: usize, marker: &str) -> String {
    if let Some((cut, _)) = text.char_indices().nth(max_length) {
        text.truncate(cut);
        text.push_str(marker);
    }
    text
}

/// First `max_length` characters of `text`, without a marker.
pub fn take_chars(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_text(html: &str, max_length: usize) -> String {
        extract_page(html, max_length).text
    }

    fn extract_title(html: &str) -> Option<String> {
        extract_page(html, usize::MAX).title
    }

    const PAGE: &str = "<html><head><title>T</title></head><body><script>x</script><p>Hello   World</p></body></html>";

    #[test]
    #[cfg(feature = "html")]
    fn extracts_paragraph_without_script() {
        assert_eq!(extract_text(PAGE, 1000), "Hello\nWorld");
        assert_eq!(extract_title(PAGE).as_deref(), Some("T"));
    }

    #[test]
    #[cfg(feature = "html")]
    fn excluded_elements_never_leak() {
        let html = r#"<html><body>
            <header>Site header</header>
            <nav><a href="/">Home</a></nav>
            <style>.a { color: red }</style>
            <main><h1>Heading</h1><p>Body text</p></main>
            <footer>Copyright</footer>
            <script type="text/javascript">var secret = 1;</script>
        </body></html>"#;

        let text = extract_text(html, 1000);
        for leaked in ["Site header", "Home", "color", "Copyright", "secret"] {
            assert!(!text.contains(leaked), "{leaked:?} leaked into {text:?}");
        }
        assert_eq!(text, "Heading\nBody text");
    }

    #[test]
    #[cfg(feature = "html")]
    fn adjacent_blocks_do_not_run_together() {
        let text = extract_text("<div>one</div><div>two</div><ul><li>a</li><li>b</li></ul>", 100);
        assert_eq!(text, "one\ntwo\na\nb");
    }

    #[test]
    fn inline_elements_keep_single_spaces() {
        let text = extract_text("<p>Rust is <b>fast</b> and <i>safe</i>.</p>", 100);
        assert_eq!(text, "Rust is fast and safe.");
    }

    #[test]
    #[cfg(feature = "html")]
    fn blank_line_runs_are_removed() {
        let text = extract_text("<pre>a\n\n\n   \n\tb</pre>", 100);
        assert_eq!(text, "a\nb");
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn malformed_markup_degrades_to_text() {
        let text = extract_text("<p>unclosed <b>bold <div>inner</p></span>tail", 100);
        assert!(text.contains("unclosed"));
        assert!(text.contains("inner"));
        assert!(text.contains("tail"));
    }

    #[test]
    fn truncation_is_exact_and_applied_once() {
        let html = format!("<p>{}</p>", "x".repeat(50));

        let cut = extract_text(&html, 10);
        assert_eq!(cut, format!("{}{}", "x".repeat(10), TRUNCATION_MARKER));
        assert_eq!(cut.chars().count(), 10 + TRUNCATION_MARKER.chars().count());
        assert_eq!(cut.matches(TRUNCATION_MARKER).count(), 1);

        let exact = extract_text(&html, 50);
        assert_eq!(exact, "x".repeat(50));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let cut = truncate_with_marker("ééééé".to_string(), 3);
        assert_eq!(cut, format!("ééé{}", TRUNCATION_MARKER));
        assert_eq!(take_chars("ééééé", 2), "éé");
        assert_eq!(take_chars("ab", 5), "ab");
    }

    #[test]
    fn output_never_exceeds_bound() {
        let pages = [
            PAGE.to_string(),
            "<p>".repeat(40),
            format!("<body>{}</body>", "word  ".repeat(300)),
            String::new(),
        ];
        for page in &pages {
            for max in [1, 5, 64, 4096] {
                let text = extract_text(page, max);
                assert!(text.chars().count() <= max + TRUNCATION_MARKER.chars().count());
            }
        }
    }

    #[test]
    fn extraction_is_idempotent() {
        let html = "<body><p>Alpha  beta</p><script>gamma</script><p>delta</p></body>";
        assert_eq!(extract_text(html, 7), extract_text(html, 7));
    }

    #[test]
    fn missing_title_yields_none() {
        assert_eq!(extract_title("<html><body>no head</body></html>"), None);
    }

    #[test]
    fn regex_fallback_strips_tags_and_collapses_whitespace() {
        let text = strip_tags(
            "<div>\n  Hello <b>there</b>\n\n<script>evil()</script> friend </div>",
            1000,
        );
        assert_eq!(text, "Hello there friend");

        let cut = strip_tags("<p>abcdef</p>", 3);
        assert_eq!(cut, format!("abc{}", TRUNCATION_MARKER));
    }

    #[test]
    fn collapse_splits_on_wide_gaps_and_nbsp() {
        assert_eq!(collapse_whitespace("  a  b \n\n c\u{a0}\u{a0}d "), "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn deeply_nested_markup_does_not_overflow_the_stack() {
        let depth = 100_000;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));

        let page = tokio::spawn(async move { extract_page(&html, 100) })
            .await
            .unwrap();
        assert_eq!(page.text, "deep");
        assert_eq!(page.title, None);
    }

    #[test]
    fn one_parse_yields_title_and_text() {
        let page = extract_page(PAGE, 1000);
        assert_eq!(
            page,
            PageText {
                title: Some("T".to_string()),
                text: if cfg!(feature = "html") { "Hello\nWorld" } else { "Hello World" }.to_string(),
            }
        );
    }
}
