//! Locale-chain selection and localized field lookup
//!
//! An app record's `localized` map is keyed by locale tag (`en-US`,
//! `de`, `zh-CN`, ...). The chain of locales to consult is computed once
//! per record from the keys that are actually present and the caller's
//! preference list, then reused for every field lookup on that record.
//!
//! Chain construction, per preferred tag in order: the exact key first,
//! then any key sharing the language subtag. `en-US` and `en` are always
//! appended as the final fallbacks when present.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::index::LocalizedFields;

/// Compute the ordered locale chain for one `localized` map.
pub fn select_locales<V>(localized: &BTreeMap<String, V>, preferred: &[String]) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();

    let mut push = |tag: &str| {
        if !chain.iter().any(|t| t == tag) {
            chain.push(tag.to_string());
        }
    };

    for pref in preferred {
        if localized.contains_key(pref) {
            push(pref);
        }
        let lang = language_of(pref);
        for key in localized.keys() {
            if language_of(key) == lang {
                push(key);
            }
        }
    }

    for fallback in ["en-US", "en"] {
        if localized.contains_key(fallback) {
            push(fallback);
        }
    }

    chain
}

/// First non-empty value of one field along the locale chain.
///
/// Returns the locale tag that supplied the value together with the value;
/// icon resolution needs the tag to build the per-locale asset path.
pub fn lookup<'a>(
    localized: &'a BTreeMap<String, LocalizedFields>,
    locales: &[String],
    field: impl Fn(&LocalizedFields) -> Option<&str>,
) -> Option<(&'a str, &'a str)> {
    for tag in locales {
        if let Some((key, fields)) = localized.get_key_value(tag.as_str()) {
            if let Some(value) = field(fields) {
                if !value.is_empty() {
                    return Some((key.as_str(), value));
                }
            }
        }
    }
    None
}

/// Preferred locales of the host, derived from `LC_ALL`/`LANG`.
///
/// `de_DE.UTF-8` becomes `de-DE`; an unset or `C`/`POSIX` environment
/// yields an empty preference list, leaving only the `en` fallbacks.
pub fn system_locales() -> Vec<String> {
    let raw = std::env::var("LC_ALL")
        .or_else(|_| std::env::var("LANG"))
        .unwrap_or_default();

    let tag = raw.split('.').next().unwrap_or("").replace('_', "-");
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        Vec::new()
    } else {
        vec![tag]
    }
}

fn language_of(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

static BREAK_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static PARA_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</p>").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li>").unwrap());
static OTHER_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static EXCESS_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Flatten the lightweight HTML used in repo descriptions into plain text.
pub fn format_description(raw: &str) -> String {
    let text = BREAK_TAGS.replace_all(raw, "\n");
    let text = PARA_CLOSE.replace_all(&text, "\n\n");
    let text = LIST_ITEM.replace_all(&text, "\n\u{2022} ");
    let text = OTHER_TAGS.replace_all(&text, "");
    let text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    EXCESS_BLANKS.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(keys: &[&str]) -> BTreeMap<String, LocalizedFields> {
        keys.iter()
            .map(|k| (k.to_string(), LocalizedFields::default()))
            .collect()
    }

    #[test]
    fn exact_match_comes_first() {
        let localized = map(&["de", "de-AT", "en-US"]);
        let chain = select_locales(&localized, &["de-AT".to_string()]);
        assert_eq!(chain, vec!["de-AT", "de", "en-US"]);
    }

    #[test]
    fn language_match_without_exact_key() {
        let localized = map(&["fr-FR", "en-US", "en"]);
        let chain = select_locales(&localized, &["fr-CA".to_string()]);
        assert_eq!(chain, vec!["fr-FR", "en-US", "en"]);
    }

    #[test]
    fn english_fallback_only() {
        let localized = map(&["en-US"]);
        let chain = select_locales(&localized, &[]);
        assert_eq!(chain, vec!["en-US"]);
    }

    #[test]
    fn lookup_skips_empty_values() {
        let mut localized = map(&["de", "en-US"]);
        localized.get_mut("de").unwrap().name = Some(String::new());
        localized.get_mut("en-US").unwrap().name = Some("Browser".to_string());

        let chain = select_locales(&localized, &["de".to_string()]);
        let (tag, value) = lookup(&localized, &chain, |f| f.name.as_deref()).unwrap();
        assert_eq!(tag, "en-US");
        assert_eq!(value, "Browser");
    }

    #[test]
    fn lookup_returns_supplying_locale() {
        let mut localized = map(&["de", "en-US"]);
        localized.get_mut("de").unwrap().icon = Some("icon_de.png".to_string());

        let chain = select_locales(&localized, &["de".to_string()]);
        let (tag, value) = lookup(&localized, &chain, |f| f.icon.as_deref()).unwrap();
        assert_eq!((tag, value), ("de", "icon_de.png"));
    }

    #[test]
    fn formats_description_markup() {
        let raw = "<p>Fast &amp; private.</p><p>Features:</p><ul><li>Ad blocking</li><li>Sync</li></ul>";
        let formatted = format_description(raw);
        assert_eq!(
            formatted,
            "Fast & private.\n\nFeatures:\n\n\u{2022} Ad blocking\n\u{2022} Sync"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(format_description("Just text."), "Just text.");
    }
}
