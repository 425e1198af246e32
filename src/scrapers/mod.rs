//! HTML scraping helpers used by the fetch-extract worker.
//!
//! | Concern | Module | Method |
//! |---------|--------|--------|
//! | Article body | [`article`] | Best content container, paragraphs joined by blank lines |
//! | Publication date | [`dates`] | JSON-LD, meta tags, `<time>`, then the URL path |
//! | Request identity | [`user_agent`] | Random desktop (macOS / Linux) User-Agent |
//!
//! All extractors work on an already downloaded HTML string and never touch
//! the network themselves.

pub mod article;
pub mod dates;
pub mod user_agent;
