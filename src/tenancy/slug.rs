use regex_lite::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::config::TenancyConfig;

/// DNS label limit
const MAX_SLUG_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("subdomain is required")]
    Empty,
    #[error("subdomain may only contain lowercase letters, numbers and hyphens")]
    InvalidFormat,
    #[error("subdomain '{0}' is reserved")]
    Reserved(String),
}

fn slug_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").ok()).as_ref()
}

pub(super) fn is_slug_format(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN
        && slug_re().is_some_and(|re| re.is_match(slug))
        && !slug.starts_with('-')
        && !slug.ends_with('-')
}

/// Normalize a requested slug and check it can be registered.
/// Availability against stored tenants and requests is checked separately.
pub fn validate_slug(raw: &str, cfg: &TenancyConfig) -> Result<String, SlugError> {
    let slug = raw.trim().to_ascii_lowercase();
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    if !is_slug_format(&slug) {
        return Err(SlugError::InvalidFormat);
    }
    if cfg.is_reserved(&slug) {
        return Err(SlugError::Reserved(slug));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        let cfg = TenancyConfig::default();
        assert_eq!(validate_slug("acme", &cfg), Ok("acme".to_string()));
        assert_eq!(validate_slug("  Sunrise-Hostel-2 ", &cfg), Ok("sunrise-hostel-2".to_string()));
    }

    #[test]
    fn test_invalid_format() {
        let cfg = TenancyConfig::default();
        assert_eq!(validate_slug("", &cfg), Err(SlugError::Empty));
        assert_eq!(validate_slug("acme hostel", &cfg), Err(SlugError::InvalidFormat));
        assert_eq!(validate_slug("acme.hostel", &cfg), Err(SlugError::InvalidFormat));
        assert_eq!(validate_slug("acme_hostel", &cfg), Err(SlugError::InvalidFormat));
        assert_eq!(validate_slug("-acme", &cfg), Err(SlugError::InvalidFormat));
        assert_eq!(validate_slug(&"a".repeat(64), &cfg), Err(SlugError::InvalidFormat));
    }

    #[test]
    fn test_reserved_words_rejected() {
        let cfg = TenancyConfig::default();
        assert_eq!(validate_slug("www", &cfg), Err(SlugError::Reserved("www".to_string())));
        assert_eq!(validate_slug("Admin", &cfg), Err(SlugError::Reserved("admin".to_string())));
        assert!(validate_slug("signup", &cfg).is_err());
    }
}
