//! Slug extraction from request paths
//!
//! A tenant slug can travel in two places:
//! - the `tenant` query parameter (`/?tenant=brewjaria`), decoded by the server
//! - the `/t/{slug}` path prefix (`/t/brewjaria/planos`)
//!
//! The query parameter wins when both are present and valid.

use boxclub_core::is_valid_slug;

/// Path prefix for slug-addressed storefronts
pub const TENANT_PATH_PREFIX: &str = "/t/";

/// Lowercase a candidate slug and keep it only if it is URL-safe
fn clean_slug(raw: &str) -> Option<String> {
    let slug = raw.trim().to_ascii_lowercase();
    is_valid_slug(&slug).then_some(slug)
}

/// Extract the slug from a `/t/{slug}` or `/t/{slug}/...` path
///
/// # Examples
/// ```
/// use boxclub_routing::path::slug_from_path;
///
/// assert_eq!(slug_from_path("/t/brewjaria").as_deref(), Some("brewjaria"));
/// assert_eq!(slug_from_path("/t/Brewjaria/planos?x=1").as_deref(), Some("brewjaria"));
/// assert_eq!(slug_from_path("/planos"), None);
/// ```
pub fn slug_from_path(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let rest = path.strip_prefix(TENANT_PATH_PREFIX)?;
    let segment = rest.split('/').next().unwrap_or_default();
    clean_slug(segment)
}

/// Derive the slug for a request: query parameter first, then path
///
/// Invalid values are treated as absent, so an unusable `tenant` parameter
/// does not hide a valid `/t/{slug}` path.
pub fn derive_slug(tenant_param: Option<&str>, path: Option<&str>) -> Option<String> {
    tenant_param
        .and_then(clean_slug)
        .or_else(|| path.and_then(slug_from_path))
}
