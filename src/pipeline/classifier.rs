// URL classification - free-text extraction and platform matching

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"https?://[^\s]+").unwrap();
}

/// Platforms whose share links must go through the resolver service.
///
/// Matching is by host suffix, so `tiktok.com` also covers `www.tiktok.com`,
/// `vm.tiktok.com` and any other subdomain.
const DEFAULT_PLATFORM_DOMAINS: &[&str] = &[
    "facebook.com",
    "tiktok.com",
    "x.com",
    "twitter.com",
    "instagram.com",
    "pinterest.com",
    "drive.google.com",
    "capcut.com",
    "likee.video",
    "threads.net",
];

/// Finds the first absolute http(s) URL in free text, if any.
///
/// The match runs to the next whitespace character, so trailing punctuation
/// glued to the URL is kept as part of it.
pub fn extract_url(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// Set of domains treated as resolver-backed platforms.
#[derive(Debug, Clone)]
pub struct PlatformSet {
    domains: Vec<String>,
}

impl PlatformSet {
    /// Builds a set from explicit domain entries. Entries are lowercased;
    /// each one matches its own host and every subdomain of it.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(|d| d.into().to_lowercase()).collect(),
        }
    }

    /// True when `url` parses as http(s) and its host is one of the platform
    /// domains or a subdomain of one.
    pub fn matches(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return false,
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        let host = match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => return false,
        };

        self.domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }
}

impl Default for PlatformSet {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM_DOMAINS.iter().copied())
    }
}
