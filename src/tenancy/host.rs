use std::net::IpAddr;

use crate::config::TenancyConfig;

use super::slug::is_slug_format;

/// What a `Host` header points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostTarget {
    /// Apex, `www`, localhost or anything unparseable: the public surface
    Root,
    /// A candidate tenant slug taken from the leftmost label
    Tenant(String),
}

/// Strip a trailing `:port`, including the bracketed IPv6 form.
pub fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Map a raw `Host` header value to the public surface or a candidate slug.
///
/// Malformed hosts fail closed to [`HostTarget::Root`]: they never produce a
/// slug that could match a tenant.
pub fn parse_host(raw: &str, cfg: &TenancyConfig) -> HostTarget {
    let host = strip_port(raw.trim()).trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() || host.parse::<IpAddr>().is_ok() {
        return HostTarget::Root;
    }
    if is_root_host(&host, cfg) {
        return HostTarget::Root;
    }

    let host = host.strip_prefix("www.").unwrap_or(&host);
    if is_root_host(host, cfg) {
        return HostTarget::Root;
    }

    let slug = match host.split('.').next() {
        Some(label) => label,
        None => return HostTarget::Root,
    };
    // A bare hostname has no subdomain at all
    if slug.is_empty() || slug == host || is_root_host(slug, cfg) || !is_slug_format(slug) {
        return HostTarget::Root;
    }
    HostTarget::Tenant(slug.to_string())
}

fn is_root_host(host: &str, cfg: &TenancyConfig) -> bool {
    cfg.root_hosts.iter().any(|h| h == host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> TenancyConfig {
        TenancyConfig::default()
    }

    fn tenant(slug: &str) -> HostTarget {
        HostTarget::Tenant(slug.to_string())
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("acme.hostelhub.app:8080"), "acme.hostelhub.app");
        assert_eq!(strip_port("acme.hostelhub.app"), "acme.hostelhub.app");
        assert_eq!(strip_port("[::1]:3000"), "::1");
        assert_eq!(strip_port("localhost:"), "localhost:");
    }

    #[test]
    fn test_root_hosts() {
        assert_eq!(parse_host("localhost", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("localhost:3000", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("hostelhub.app", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("www.hostelhub.app", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("HostelHub.App.", &cfg()), HostTarget::Root);
    }

    #[test]
    fn test_subdomain_is_candidate_slug() {
        assert_eq!(parse_host("acme.hostelhub.app", &cfg()), tenant("acme"));
        assert_eq!(parse_host("ACME.hostelhub.app:443", &cfg()), tenant("acme"));
        assert_eq!(parse_host("www.acme.hostelhub.app", &cfg()), tenant("acme"));
        assert_eq!(parse_host("acme.localhost:3000", &cfg()), tenant("acme"));
    }

    #[test]
    fn test_malformed_hosts_fail_closed() {
        assert_eq!(parse_host("", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("intranet", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("192.168.1.10:8080", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("[::1]:8080", &cfg()), HostTarget::Root);
        assert_eq!(parse_host("ac_me.hostelhub.app", &cfg()), HostTarget::Root);
        assert_eq!(parse_host(".hostelhub.app", &cfg()), HostTarget::Root);
    }
}
