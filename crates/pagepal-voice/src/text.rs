//! Text preprocessing for read-aloud.
//!
//! Assistant answers cite their sources inline. Those citations are noise
//! when spoken, so links are reduced to their label and raw URLs and
//! parenthesized domains are dropped before the text reaches the provider.

use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link pattern is valid"));

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("url pattern is valid"));

// Swallows one leading space or tab so "Tesla (tesla.com)." reads "Tesla.".
// Line breaks before the citation are kept.
static CITED_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \t]?\([a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\)").expect("domain pattern is valid")
});

/// Clean text for speech synthesis.
///
/// - `[label](url)` → `label`
/// - `http://…` / `https://…` → removed
/// - `(example.com)` → removed
///
/// Whitespace is otherwise left untouched.
#[must_use]
pub fn clean_for_speech(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = MARKDOWN_LINK.replace_all(text, "$1");
    let text = BARE_URL.replace_all(&text, "");
    CITED_DOMAIN.replace_all(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_urls_links_and_cited_domains() {
        let input = "Check https://example.com (example.com) for [details](https://x.com/y)";
        assert_eq!(clean_for_speech(input), "Check  for details");
    }

    #[test]
    fn link_label_survives() {
        assert_eq!(
            clean_for_speech("See [the docs](https://docs.rs/regex) now."),
            "See the docs now."
        );
    }

    #[test]
    fn citation_before_punctuation() {
        assert_eq!(
            clean_for_speech("Tesla is based in Austin (tesla.com)."),
            "Tesla is based in Austin."
        );
    }

    #[test]
    fn citation_on_its_own_line_keeps_the_line_break() {
        assert_eq!(clean_for_speech("line\n(example.com)"), "line\n");
        assert_eq!(
            clean_for_speech("First.\r\n(example.com) Second."),
            "First.\r\n Second."
        );
        assert_eq!(clean_for_speech("tab\t(example.com)"), "tab");
    }

    #[test]
    fn url_inside_parentheses_keeps_closing_paren_out() {
        assert_eq!(
            clean_for_speech("source (https://a.example/b) here"),
            "source () here"
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        let input = "Nothing to strip (really), just words.";
        assert_eq!(clean_for_speech(input), input);
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_for_speech(""), "");
    }
}
