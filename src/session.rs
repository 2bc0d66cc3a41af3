//! Per-request session context, built by the HTTP layer and handed to the store
//! selection. Progress and badge logic only ever see a plain user id.

use axum::http::{header::AUTHORIZATION, HeaderMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
  pub user_id: String,
  /// User access token for the hosted backend, if the caller sent one.
  pub access_token: Option<String>,
}

impl SessionContext {
  pub fn from_request(user_id: &str, headers: &HeaderMap) -> Self {
    let access_token = headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_string);

    Self { user_id: user_id.trim().to_string(), access_token }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn bearer_token_is_picked_up() {
    let mut h = HeaderMap::new();
    h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
    let s = SessionContext::from_request(" u1 ", &h);
    assert_eq!(s.user_id, "u1");
    assert_eq!(s.access_token.as_deref(), Some("abc.def"));
  }

  #[test]
  fn other_schemes_and_blank_tokens_are_ignored() {
    let mut h = HeaderMap::new();
    h.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
    assert!(SessionContext::from_request("u1", &h).access_token.is_none());
    h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
    assert!(SessionContext::from_request("u1", &h).access_token.is_none());
  }
}
