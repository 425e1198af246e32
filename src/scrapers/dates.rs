//! Best-effort publication date extraction.
//!
//! Sources are tried in this order, first parseable value wins:
//! 1. JSON-LD `datePublished` / `dateModified` (including `@graph` arrays)
//! 2. OpenGraph-style `<meta property="article:published_time">`
//! 3. Generic `<meta name="...">` tags (`date`, `pubdate`, `DC.date.issued`, ...)
//! 4. `itemprop="datePublished"` and HTML5 `<time datetime="...">`
//! 5. A `/YYYY/MM/DD/` style date embedded in the article URL

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument};

const META_PROPERTIES: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "article:published",
];

const META_NAMES: &[&str] = &[
    "date",
    "publish_date",
    "pubdate",
    "publish-date",
    "DC.date.issued",
    "dcterms.created",
    "parsely-pub-date",
    "sailthru.date",
];

const JSON_LD_KEYS: &[&str] = &["datePublished", "dateCreated", "dateModified"];

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[content]").unwrap());
static ITEMPROP_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop="datePublished"]"#).unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());

static URL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[/_-])((?:19|20)\d{2})[/_-](\d{1,2})[/_-](\d{1,2})(?:[/_.-]|$)")
        .expect("valid regex")
});

/// Extract the publication date of an article page.
///
/// `url` is only consulted after every in-page source came up empty.
#[instrument(level = "debug", skip(html), fields(html_bytes = html.len()))]
pub fn extract_published_date(html: &str, url: Option<&str>) -> Option<DateTime<Utc>> {
    let document = Html::parse_document(html);

    let found = json_ld_date(&document)
        .or_else(|| meta_date(&document, "property", META_PROPERTIES))
        .or_else(|| meta_date(&document, "name", META_NAMES))
        .or_else(|| markup_date(&document))
        .or_else(|| url.and_then(url_date));

    debug!(date = ?found, "Publication date lookup finished");
    found
}

/// Parse a date string into `DateTime<Utc>`, trying the formats news sites use.
///
/// Values without an offset are taken as UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

fn json_ld_date(document: &Html) -> Option<DateTime<Utc>> {
    document.select(&JSON_LD).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value = serde_json::from_str::<Value>(raw.trim()).ok()?;
        json_ld_value_date(&value)
    })
}

fn json_ld_value_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Array(items) => items.iter().find_map(json_ld_value_date),
        Value::Object(map) => JSON_LD_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).and_then(parse_date))
            .or_else(|| map.get("@graph").and_then(json_ld_value_date)),
        _ => None,
    }
}

/// First parseable `content` of a `<meta>` whose `attr` matches one of `keys`.
///
/// Keys are matched case-insensitively and tried in priority order.
fn meta_date(document: &Html, attr: &str, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| {
        document.select(&META).find_map(|meta| {
            let element = meta.value();
            if !element.attr(attr)?.eq_ignore_ascii_case(key) {
                return None;
            }
            parse_date(element.attr("content")?)
        })
    })
}

fn markup_date(document: &Html) -> Option<DateTime<Utc>> {
    document
        .select(&ITEMPROP_PUBLISHED)
        .find_map(|element| {
            let element = element.value();
            element
                .attr("content")
                .or_else(|| element.attr("datetime"))
                .and_then(parse_date)
        })
        .or_else(|| {
            document
                .select(&TIME)
                .find_map(|time| time.value().attr("datetime").and_then(parse_date))
        })
}

/// Date embedded in the URL path, e.g. `https://example.com/2019/03/01/story`.
pub fn url_date(url: &str) -> Option<DateTime<Utc>> {
    let path = url::Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let caps = URL_DATE.captures(&path)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}
