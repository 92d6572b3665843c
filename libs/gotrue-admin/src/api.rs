use anyhow::anyhow;
use gotrue_admin_entity::error::{AdminError, ApiError, ErrorPayload};
use gotrue_admin_entity::sso::{
  IdentityProviderList, IdentityProviderRequest, IdentityProviderResponse,
};
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};

/// HTTP binding for the identity-provider admin collection.
///
/// Holds only immutable configuration (transport, base address, default
/// header set), so it is cheap to clone and safe to share across concurrent
/// operations.
#[derive(Clone)]
pub struct AdminClient {
  client: reqwest::Client,
  base_url: String,
  headers: HeaderMap,
}

impl AdminClient {
  pub fn new(client: reqwest::Client, base_url: &str, headers: HeaderMap) -> Self {
    Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
      headers,
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn get_identity_provider(
    &self,
    id: &str,
  ) -> Result<IdentityProviderResponse, AdminError> {
    let url = format!("{}/admin/sso/providers/{}", self.base_url, id);
    let resp = self.request(Method::GET, &url).send().await?;
    let resp = expect_status(
      resp,
      StatusCode::OK,
      &format!("fetching identity provider with id {:?}", id),
    )
    .await?;
    from_body(resp).await
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn create_identity_provider(
    &self,
    template: &IdentityProviderRequest,
  ) -> Result<IdentityProviderResponse, AdminError> {
    let url = format!("{}/admin/sso/providers", self.base_url);
    let resp = self
      .request(Method::POST, &url)
      .json(template)
      .send()
      .await?;
    let resp = expect_status(resp, StatusCode::CREATED, "creating new identity provider").await?;
    from_body(resp).await
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn update_identity_provider(
    &self,
    id: &str,
    template: &IdentityProviderRequest,
  ) -> Result<IdentityProviderResponse, AdminError> {
    let url = format!("{}/admin/sso/providers/{}", self.base_url, id);
    let resp = self.request(Method::PUT, &url).json(template).send().await?;
    let resp = expect_status(
      resp,
      StatusCode::OK,
      &format!("updating identity provider with id {:?}", id),
    )
    .await?;
    from_body(resp).await
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn delete_identity_provider(&self, id: &str) -> Result<(), AdminError> {
    let url = format!("{}/admin/sso/providers/{}", self.base_url, id);
    let resp = self.request(Method::DELETE, &url).send().await?;
    let resp = expect_status(
      resp,
      StatusCode::OK,
      &format!("deleting identity provider with id {:?}", id),
    )
    .await?;
    resp.bytes().await?;
    Ok(())
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn list_identity_providers(&self) -> Result<IdentityProviderList, AdminError> {
    let url = format!("{}/admin/sso/providers", self.base_url);
    let resp = self.request(Method::GET, &url).send().await?;
    let resp = expect_status(resp, StatusCode::OK, "listing identity providers").await?;
    from_body(resp).await
  }

  // Every request starts from a private copy of the default header set, so
  // request-specific headers never leak back into the client.
  fn request(&self, method: Method, url: &str) -> RequestBuilder {
    self
      .client
      .request(method, url)
      .headers(self.headers.clone())
  }
}

async fn expect_status(
  resp: reqwest::Response,
  expected: StatusCode,
  op: &str,
) -> Result<reqwest::Response, AdminError> {
  let actual = resp.status();
  if actual == expected {
    return Ok(resp);
  }

  let body = resp.text().await?;
  let payload = match serde_json::from_str::<ErrorPayload>(&body) {
    Ok(payload) => payload,
    // not the structured error shape, keep the raw text as the message
    Err(_) => ErrorPayload {
      code: actual.as_u16() as i64,
      msg: body,
      error_id: None,
    },
  };

  Err(
    ApiError {
      op: op.to_owned(),
      expected,
      actual,
      payload,
    }
    .into(),
  )
}

async fn from_body<T>(resp: reqwest::Response) -> Result<T, AdminError>
where
  T: serde::de::DeserializeOwned,
{
  let status = resp.status();
  let bytes = resp.bytes().await?;
  serde_json::from_slice(&bytes).map_err(|e| {
    AdminError::Unhandled(anyhow!(
      "deserialize error: {}, status: {}, body: {}",
      e,
      status,
      String::from_utf8_lossy(&bytes)
    ))
  })
}
