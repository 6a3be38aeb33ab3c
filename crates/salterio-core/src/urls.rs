//! URL normalization and WordPress permalink helpers.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static DATED_PERMALINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/([^/?#]+)").expect("valid permalink pattern")
});

/// Strip fragment, query string and trailing slashes.
///
/// This is the dedup key for every candidate and persisted record.
/// Idempotent: `normalize_url(&normalize_url(x)) == normalize_url(x)`.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split('#').next().unwrap_or(url);
    let url = url.split('?').next().unwrap_or(url);
    url.trim_end_matches(|c: char| c == '/' || c.is_whitespace()).to_string()
}

/// `(yyyymmdd, slug)` of a `/<yyyy>/<mm>/<dd>/<slug>/` permalink.
pub fn post_date_slug(url: &str) -> Option<(String, String)> {
    let caps = DATED_PERMALINK.captures(url)?;
    let date = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
    Some((date, caps[4].to_string()))
}

/// Append query parameters to a URL that may already carry some
/// (e.g. `?rest_route=/wp/v2/posts`).
pub fn with_query(base: &str, params: &[(&str, String)]) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn test_normalize_url_is_idempotent(url in "\\PC{0,60}") {
            let once = normalize_url(&url);
            prop_assert_eq!(normalize_url(&once), once);
        }

        #[test]
        fn test_normalize_url_of_permalink_variants(
            slug in "[a-z0-9-]{1,20}",
            query in "[a-z=&]{0,10}",
            frag in "\\PC{0,10}",
        ) {
            let bare = format!("https://blog.example/2024/03/10/{slug}");
            prop_assert_eq!(normalize_url(&format!("{bare}/?{query}#{frag}")), bare.clone());
            prop_assert_eq!(normalize_url(&format!(" {bare}// ")), bare);
        }
    }

    #[test]
    fn test_normalize_collapses_variants() {
        assert_eq!(
            normalize_url("https://x.com/p/?utm=1#frag"),
            normalize_url("https://x.com/p/")
        );
        assert_eq!(normalize_url("https://x.com/p/"), "https://x.com/p");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for url in [
            "https://x.com/2024/01/02/a/",
            "https://x.com/a//#b",
            "https://x.com/?q=1",
            "",
        ] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once);
        }
    }

    #[test]
    fn test_post_date_slug() {
        assert_eq!(
            post_date_slug("https://blog.example/2021/12/24/nochebuena/"),
            Some(("20211224".to_string(), "nochebuena".to_string()))
        );
        assert_eq!(post_date_slug("https://blog.example/about/"), None);
    }

    #[test]
    fn test_with_query_preserves_existing_params() {
        let url = with_query(
            "https://x.com/?rest_route=/wp/v2/posts",
            &[("page", "2".to_string()), ("per_page", "50".to_string())],
        )
        .unwrap();
        assert!(url.contains("rest_route=%2Fwp%2Fv2%2Fposts") || url.contains("rest_route=/wp/v2/posts"));
        assert!(url.contains("page=2"));
        assert!(url.contains("per_page=50"));
    }

    #[test]
    fn test_with_query_rejects_relative() {
        assert_eq!(with_query("not a url", &[]), None);
    }
}
