//! Small input checks shared by the API and the store.

use url::Url;

/// `true` iff `input` parses as an absolute URL with both a scheme and a
/// host, e.g. `https://hooks.example.org/pantry`.
pub fn is_valid_url(input: &str) -> bool {
  Url::parse(input).map(|u| u.has_host()).unwrap_or(false)
}
