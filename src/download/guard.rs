use std::net::IpAddr;

use reqwest::Url;

use crate::error::ValidationError;

const BLOCKED_HOSTS: [&str; 2] = ["127.0.0.1", "localhost"];
const BLOCKED_PREFIXES: [&str; 1] = ["192.168."];
const STRICT_BLOCKED_PREFIXES: [&str; 2] = ["10.", "172."];

/// Decides whether a song URL may be fetched.
///
/// Every remote fetch goes through [`UrlPolicy::check`] first; it is the only
/// barrier between attacker-supplied catalog data and the local network.
#[derive(Debug, Clone, Copy)]
pub struct UrlPolicy {
    strict: bool,
    allow_loopback: bool,
}

impl UrlPolicy {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            allow_loopback: false,
        }
    }

    /// Lets unit tests reach a mock server on 127.0.0.1.
    #[cfg(test)]
    pub(crate) fn allowing_loopback() -> Self {
        Self {
            strict: true,
            allow_loopback: true,
        }
    }

    pub fn check(&self, url: &str) -> Result<(), ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::Empty);
        }

        let lower = url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(ValidationError::Scheme);
        }

        let parsed = Url::parse(url).map_err(|_| ValidationError::Malformed)?;
        let host = parsed
            .host_str()
            .ok_or(ValidationError::Malformed)?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_ascii_lowercase();
        // "localhost." is the same name as "localhost"
        let host = host.strip_suffix('.').unwrap_or(&host).to_string();

        if self.is_blocked(&host) {
            return Err(ValidationError::Blocked(host));
        }
        Ok(())
    }

    /// `(valid, reason)` form of [`UrlPolicy::check`]; `reason` is empty when valid.
    pub fn verdict(&self, url: &str) -> (bool, String) {
        match self.check(url) {
            Ok(()) => (true, String::new()),
            Err(e) => (false, e.to_string()),
        }
    }

    fn is_blocked(&self, host: &str) -> bool {
        if self.allow_loopback && host == "127.0.0.1" {
            return false;
        }
        if host == "::1" || BLOCKED_HOSTS.iter().any(|h| host == *h) {
            return true;
        }
        if host.ends_with(".localhost") {
            return true;
        }
        if BLOCKED_PREFIXES.iter().any(|p| host.starts_with(p)) {
            return true;
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            if is_local_ip(ip) {
                return true;
            }
        }
        self.strict && STRICT_BLOCKED_PREFIXES.iter().any(|p| host.starts_with(p))
    }
}

/// Loopback, unspecified and link-local addresses, including IPv4 mapped into IPv6.
fn is_local_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_unspecified() || v4.is_link_local(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_local_ip(IpAddr::V4(v4)),
            None => v6.is_loopback() || v6.is_unspecified(),
        },
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}
