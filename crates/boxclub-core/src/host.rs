//! Hostname normalization
//!
//! Request `Host` values arrive in many shapes (`Shop.Example.com:443`,
//! `localhost:3000`, `[::1]:3000`, `example.com.`). Everything that compares
//! hosts goes through [`normalize_host`] first so the comparison is exact.

/// Hosts treated as local development machines
pub const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];

/// Normalize a raw `Host` value: trim, lowercase, strip port and trailing dot
///
/// Returns `None` for malformed input (empty, bad port, unexpected characters).
///
/// # Examples
/// ```
/// use boxclub_core::host::normalize_host;
///
/// assert_eq!(normalize_host("Shop.Example.COM:8080").as_deref(), Some("shop.example.com"));
/// assert_eq!(normalize_host("[::1]:3000").as_deref(), Some("::1"));
/// assert_eq!(normalize_host("example.com:http"), None);
/// ```
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Bracketed IPv6, optionally with a port
    if let Some(rest) = raw.strip_prefix('[') {
        let (inner, after) = rest.split_once(']')?;
        if !after.is_empty() {
            let port = after.strip_prefix(':')?;
            if !is_port(port) {
                return None;
            }
        }
        let inner = inner.to_ascii_lowercase();
        if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
            return None;
        }
        return Some(inner);
    }

    let host = match raw.matches(':').count() {
        0 => raw,
        1 => {
            let (host, port) = raw.split_once(':')?;
            if !is_port(port) {
                return None;
            }
            host
        }
        // Bare IPv6 without brackets cannot carry a port
        _ => {
            let lower = raw.to_ascii_lowercase();
            if lower.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
                return Some(lower);
            }
            return None;
        }
    };

    let host = host.strip_suffix('.').unwrap_or(host).to_ascii_lowercase();
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return None;
    }

    Some(host)
}

fn is_port(port: &str) -> bool {
    !port.is_empty() && port.len() <= 5 && port.chars().all(|c| c.is_ascii_digit())
}

/// Whether a normalized host can be bound to a tenant as a dedicated domain
///
/// IP addresses, single-label names and names whose top-level label is not
/// alphabetic never match.
pub fn is_domain_candidate(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let well_formed = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_alpha = labels
        .last()
        .is_some_and(|tld| tld.chars().all(|c| c.is_ascii_alphabetic()));

    well_formed && tld_alpha
}

/// Whether a normalized host is a local development host
pub fn is_local_host(host: &str) -> bool {
    LOCAL_HOSTS.contains(&host) || host.ends_with(".localhost")
}
