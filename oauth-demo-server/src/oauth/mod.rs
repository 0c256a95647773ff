//! OAuth 2.0 Authorization Code client flow.
//!
//! ## Components
//! - [`metadata`]: resolves endpoints from the provider's discovery document
//! - [`token`]: authorization code and refresh token grants
//! - [`organizations`]: detects organizations that still need a connection consent
//! - [`resource`]: authenticated GET against the resource server
//! - [`flow`]: orchestrates the above for each browser session
//!
//! Access tokens are never validated here. [`claims`] decodes them for
//! display only.

pub mod claims;
pub mod flow;
pub mod metadata;
pub mod models;
pub mod organizations;
pub mod resource;
pub mod token;

use url::form_urlencoded;

/// Appends form-urlencoded query pairs to a URL, keeping any existing query
pub(crate) fn append_query(base: &str, pairs: &[(&str, &str)]) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}
