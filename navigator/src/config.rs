use crate::index::model::DEFAULT_LANGUAGE;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_QUICK_NAV_LIMIT: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LANGUAGE_ENV: &str = "DOCNAV_DEFAULT_LANGUAGE";
const PAGE_SIZE_ENV: &str = "DOCNAV_PAGE_SIZE";
const QUICK_NAV_LIMIT_ENV: &str = "DOCNAV_QUICK_NAV_LIMIT";
const REQUEST_TIMEOUT_ENV: &str = "DOCNAV_REQUEST_TIMEOUT_SECS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorConfig {
    pub default_language: String,
    pub page_size: usize,
    pub quick_nav_limit: usize,
    pub request_timeout: Duration,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            quick_nav_limit: DEFAULT_QUICK_NAV_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl NavigatorConfig {
    /// Defaults overridden by `DOCNAV_*` variables. Unparsable or zero values
    /// are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str, fallback: usize| {
            lookup(key)
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(fallback)
        };
        Self {
            default_language: lookup(LANGUAGE_ENV)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(defaults.default_language),
            page_size: positive(PAGE_SIZE_ENV, defaults.page_size),
            quick_nav_limit: positive(QUICK_NAV_LIMIT_ENV, defaults.quick_nav_limit),
            request_timeout: lookup(REQUEST_TIMEOUT_ENV)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}
