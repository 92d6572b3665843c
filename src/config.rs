use std::collections::BTreeMap;

use gotrue_admin::api::AdminClient;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use secrecy::{ExposeSecret, Secret};
use url::Url;

use crate::diagnostics::{Diagnostic, Diagnostics};

pub const GOTRUE_URL_ENV: &str = "GOTRUE_URL";

const PROVISIONER_USER_AGENT: &str = concat!("gotrue-provisioner/", env!("CARGO_PKG_VERSION"));

lazy_static! {
  static ref LOOPBACK_HOST: Regex = Regex::new("^(localhost|127(\\.[0-9]{1,3}){3})$").unwrap();
}

/// Connection settings for one remote GoTrue deployment. Header values
/// commonly carry a service-role credential, so they stay wrapped until the
/// header map is built.
#[derive(Clone, Debug)]
pub struct ProviderSetting {
  pub url: String,
  pub headers: BTreeMap<String, Secret<String>>,
}

impl ProviderSetting {
  pub fn new(url: &str) -> Self {
    Self {
      url: url.to_owned(),
      headers: BTreeMap::new(),
    }
  }

  /// Reads the base URL from `GOTRUE_URL` when not configured explicitly.
  pub fn from_env() -> Self {
    Self::new(&get_env_var(GOTRUE_URL_ENV, ""))
  }

  pub fn header(mut self, name: &str, value: Secret<String>) -> Self {
    self.headers.insert(name.to_owned(), value);
    self
  }

  /// Connection-level validation, independent of any resource operation.
  pub fn validate(&self) -> Diagnostics {
    let mut diags = Diagnostics::new();

    if self.url.is_empty() {
      diags.push(Diagnostic::error("GoTrue URL is empty").with_field("url"));
      return diags;
    }

    let parsed = match Url::parse(&self.url) {
      Ok(parsed) => parsed,
      Err(e) => {
        diags.push(
          Diagnostic::error("GoTrue URL is not valid")
            .with_detail(format!("Unable to parse URL: {}", e))
            .with_field("url"),
        );
        return diags;
      },
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
      diags.push(
        Diagnostic::error(format!("GoTrue URL is not HTTP(S): {:?}", parsed.scheme()))
          .with_field("url"),
      );
    }

    let host = parsed.host_str().unwrap_or_default();
    if parsed.scheme() == "http" && !LOOPBACK_HOST.is_match(host) {
      diags.push(
        Diagnostic::warning("GoTrue URL does not use HTTPS")
          .with_detail("Communication with GoTrue should occur over HTTPS whenever possible")
          .with_field("url"),
      );
    }

    diags
  }

  /// Builds the admin client from these settings. Configuration problems
  /// come back as diagnostics; warnings alone still yield a client.
  pub fn admin_client(&self, http_client: reqwest::Client) -> (Option<AdminClient>, Diagnostics) {
    let mut diags = self.validate();
    if diags.has_errors() {
      return (None, diags);
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &self.headers {
      let header_name = match HeaderName::from_bytes(name.as_bytes()) {
        Ok(header_name) => header_name,
        Err(e) => {
          diags.push(
            Diagnostic::error(format!("Invalid header name {:?}", name)).with_detail(e.to_string()),
          );
          continue;
        },
      };
      match HeaderValue::from_str(value.expose_secret()) {
        Ok(header_value) => {
          headers.insert(header_name, header_value);
        },
        Err(e) => {
          diags.push(
            Diagnostic::error(format!("Invalid value for header {:?}", name))
              .with_detail(e.to_string()),
          );
        },
      }
    }

    headers.insert(USER_AGENT, HeaderValue::from_static(PROVISIONER_USER_AGENT));

    if !headers.contains_key(AUTHORIZATION) {
      diags.push(
        Diagnostic::warning("No Authorization header, requests may fail").with_detail(
          "There was no Authorization header configured, requests may fail (depending on setup)",
        ),
      );
    }

    if diags.has_errors() {
      return (None, diags);
    }

    (Some(AdminClient::new(http_client, &self.url, headers)), diags)
  }
}

fn get_env_var(key: &str, default: &str) -> String {
  std::env::var(key).unwrap_or_else(|e| {
    tracing::debug!(
      "failed to read environment variable:{}:{}, using default value: {}",
      e,
      key,
      default
    );
    default.to_owned()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::Severity;

  fn severities(diags: &Diagnostics) -> Vec<Severity> {
    diags.iter().map(|d| d.severity).collect()
  }

  #[test]
  fn empty_url_is_an_error() {
    let diags = ProviderSetting::new("").validate();
    assert!(diags.has_errors());
    assert_eq!(diags.len(), 1);
  }

  #[test]
  fn relative_url_is_an_error() {
    let diags = ProviderSetting::new("gotrue.example.com").validate();
    assert!(diags.has_errors());
  }

  #[test]
  fn non_http_scheme_is_an_error() {
    let diags = ProviderSetting::new("ftp://gotrue.example.com").validate();
    assert!(diags.has_errors());
  }

  #[test]
  fn plain_http_to_remote_host_warns() {
    let diags = ProviderSetting::new("http://gotrue.example.com").validate();
    assert!(!diags.has_errors());
    assert_eq!(severities(&diags), vec![Severity::Warning]);
  }

  #[test]
  fn plain_http_to_loopback_does_not_warn() {
    for url in ["http://localhost:9999", "http://127.0.0.1:9999"] {
      let diags = ProviderSetting::new(url).validate();
      assert!(diags.is_empty(), "expected no diagnostics for {:?}", url);
    }
  }

  #[test]
  fn https_url_is_clean() {
    assert!(ProviderSetting::new("https://gotrue.example.com").validate().is_empty());
  }

  #[test]
  fn missing_authorization_header_warns_but_builds_client() {
    let setting = ProviderSetting::new("https://gotrue.example.com");
    let (client, diags) = setting.admin_client(reqwest::Client::new());
    assert!(client.is_some());
    assert_eq!(severities(&diags), vec![Severity::Warning]);
  }

  #[test]
  fn authorization_header_suppresses_the_warning() {
    let setting = ProviderSetting::new("https://gotrue.example.com")
      .header("Authorization", Secret::new("Bearer admin-key".to_owned()));
    let (client, diags) = setting.admin_client(reqwest::Client::new());
    assert!(client.is_some());
    assert!(diags.is_empty());
  }

  #[test]
  fn invalid_header_name_is_an_error() {
    let setting = ProviderSetting::new("https://gotrue.example.com")
      .header("bad header", Secret::new("x".to_owned()));
    let (client, diags) = setting.admin_client(reqwest::Client::new());
    assert!(client.is_none());
    assert!(diags.has_errors());
  }

  #[test]
  fn invalid_url_never_builds_a_client() {
    let (client, diags) = ProviderSetting::new("not a url").admin_client(reqwest::Client::new());
    assert!(client.is_none());
    assert!(diags.has_errors());
  }
}
