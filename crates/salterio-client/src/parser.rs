use std::sync::Arc;

use salterio_core::error::AppError;
use salterio_core::traits::{PageParser, ParsedPage};
use scraper::{Html, Selector};

use crate::cleaner::visible_text;

/// Most specific first; the first non-empty hit wins.
const TITLE_SELECTORS: &[&str] = &["h1.entry-title", "h1", "title"];
const BODY_SELECTORS: &[&str] = &["div.entry-content", "div.post-content", "article", "main"];

/// DOM heuristics for a WordPress post page.
#[derive(Clone)]
pub struct HtmlPageParser {
    title: Arc<Vec<Selector>>,
    body: Arc<Vec<Selector>>,
}

impl HtmlPageParser {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            title: Arc::new(compile(TITLE_SELECTORS)?),
            body: Arc::new(compile(BODY_SELECTORS)?),
        })
    }
}

fn compile(chain: &[&str]) -> Result<Vec<Selector>, AppError> {
    chain
        .iter()
        .map(|css| {
            Selector::parse(css).map_err(|e| AppError::ParseError(format!("selector {css}: {e}")))
        })
        .collect()
}

/// Text of the first element, across the chain, that has any.
fn first_text(document: &Html, chain: &[Selector]) -> Option<String> {
    chain.iter().find_map(|selector| {
        document
            .select(selector)
            .map(visible_text)
            .find(|text| !text.is_empty())
    })
}

impl PageParser for HtmlPageParser {
    fn parse(&self, html: &str) -> Result<ParsedPage, AppError> {
        let document = Html::parse_document(html);
        Ok(ParsedPage {
            title: first_text(&document, &self.title),
            body_text: first_text(&document, &self.body),
            full_text: visible_text(document.root_element()),
        })
    }
}
