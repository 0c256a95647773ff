//! Session id cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;

/// Returns the session id carried by the request, minting a new one (and
/// adding its cookie to the jar) when the browser has none yet.
pub fn ensure_session_id(jar: CookieJar, cookie_name: &str) -> (CookieJar, String) {
    if let Some(existing) = jar.get(cookie_name) {
        if !existing.value().is_empty() {
            let id = existing.value().to_string();
            return (jar, id);
        }
    }

    let id = generate_session_id();
    let cookie = Cookie::build((cookie_name.to_string(), id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    log::debug!("Started new browser session");
    (jar.add(cookie), id)
}

fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    URL_SAFE_NO_PAD.encode(bytes)
}
