//! Cache key composition.

use std::collections::BTreeMap;

/// Key of a cached render result.
///
/// Built from a component name and the request URL. Query parameters are
/// sorted so equivalent URLs share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderCacheKey {
    key: String,
}

impl RenderCacheKey {
    /// Key for the whole-page render of `url`.
    pub fn for_url(url: &str) -> Self {
        Self::component("page", url)
    }

    /// Key for a named component rendered for `url`.
    pub fn component(name: &str, url: &str) -> Self {
        Self {
            key: format!("{}::{}", name, normalize_url(url)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for RenderCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

fn normalize_url(url: &str) -> String {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };
    let path = if path.is_empty() { "/" } else { path };

    let params: BTreeMap<&str, &str> = query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split_once('=').unwrap_or((p, "")))
        .collect();

    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
