//! Full-text extraction of the main article body.
//!
//! News pages wrap the story in a handful of well-known containers. Each
//! candidate is scored by the amount of paragraph text it holds, ignoring
//! paragraphs that live in navigation, headers, footers, asides or forms.
//! Explicit story markup (`itemprop="articleBody"`, `<article>`) wins as soon
//! as it holds any paragraph text. Otherwise the first candidate kind (in
//! priority order) that carries a real article's worth of text wins, falling
//! back to the richest candidate overall.

use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Paragraph text a container needs before it is trusted over later candidates.
const MIN_ARTICLE_CHARS: usize = 200;

/// Elements whose paragraphs are boilerplate rather than story text.
const BOILERPLATE_ANCESTORS: &[&str] = &["nav", "header", "footer", "aside", "form"];

/// Elements whose text never belongs to the article.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Leading entries of [`CONTAINER_SELECTORS`] that mark the story itself.
const STORY_MARKUP_SELECTORS: usize = 2;

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"[itemprop="articleBody"]"#,
        "article",
        ".article-body",
        ".article-content",
        ".story-body",
        ".entry-content",
        ".post-content",
        "main",
        "#content",
        "body",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extract the readable body text of an article page.
///
/// Paragraphs are whitespace-normalized and joined with a blank line. A
/// container without any `<p>` falls back to its visible text. Returns an
/// empty string when the page has no text at all.
#[instrument(level = "debug", skip_all, fields(html_bytes = html.len()))]
pub fn extract_fulltext(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut best: Option<(usize, Vec<String>)> = None;
    for (rank, selector) in CONTAINER_SELECTORS.iter().enumerate() {
        let mut best_for_kind: Option<(usize, Vec<String>)> = None;
        for container in document.select(selector) {
            let paragraphs = paragraphs_in(container);
            let score: usize = paragraphs.iter().map(|p| p.len()).sum();
            if best_for_kind.as_ref().is_none_or(|(s, _)| score > *s) {
                best_for_kind = Some((score, paragraphs));
            }
        }

        let Some((score, paragraphs)) = best_for_kind else {
            continue;
        };
        if score >= MIN_ARTICLE_CHARS || (rank < STORY_MARKUP_SELECTORS && score > 0) {
            debug!(rank, score, paragraphs = paragraphs.len(), "Selected article container");
            return paragraphs.join("\n\n");
        }
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, paragraphs));
        }
    }

    match best {
        Some((score, paragraphs)) if score > 0 => paragraphs.join("\n\n"),
        _ => document
            .select(&CONTAINER_SELECTORS[CONTAINER_SELECTORS.len() - 1])
            .next()
            .map(visible_text)
            .unwrap_or_default(),
    }
}

fn paragraphs_in(container: ElementRef<'_>) -> Vec<String> {
    container
        .select(&PARAGRAPH)
        .filter(|p| !inside_boilerplate(*p))
        .map(visible_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn inside_boilerplate(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| BOILERPLATE_ANCESTORS.contains(&e.name()))
    })
}

/// Text of an element with scripts and styles removed and whitespace collapsed.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| NON_TEXT_ELEMENTS.contains(&name));
            (!hidden).then_some(&**text)
        })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}
