use salterio_core::error::AppError;
use salterio_core::text::collapse_whitespace;
use salterio_core::traits::Cleaner;
use scraper::{ElementRef, Html, Node};

/// Elements whose text never reaches the reader.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Rendered HTML fragment to plain text.
///
/// Text nodes are joined with a single space, hidden elements dropped and
/// whitespace collapsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCleaner;

impl HtmlCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl Cleaner for HtmlCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        let fragment = Html::parse_fragment(html);
        Ok(visible_text(fragment.root_element()))
    }
}

/// Visible text below `root`, whitespace collapsed.
pub(crate) fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| HIDDEN_TAGS.contains(&el.value().name()));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}
