use std::collections::BTreeSet;

use chrono::SecondsFormat;
use gotrue_admin::api::AdminClient;
use gotrue_admin_entity::sso::{
  AttributeMapping, IdentityProviderRequest, IdentityProviderResponse, SAML_PROVIDER_TYPE,
};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::record::IdentityProviderRecord;

/// CRUD reconciliation for the SAML identity-provider resource. The client
/// is injected once at construction and shared by every operation; the
/// record is mutated in place on success.
pub struct IdentityProviderResource {
  client: AdminClient,
}

impl IdentityProviderResource {
  pub fn new(client: AdminClient) -> Self {
    Self { client }
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn create(&self, record: &mut IdentityProviderRecord) -> Result<(), Diagnostics> {
    let mut template = IdentityProviderRequest {
      provider_type: SAML_PROVIDER_TYPE.to_owned(),
      ..Default::default()
    };

    if !record.desired.metadata_url.is_empty() {
      template.metadata_url = record.desired.metadata_url.clone();
    } else if !record.desired.metadata_xml.is_empty() {
      template.metadata_xml = record.desired.metadata_xml.clone();
    }

    if let Some(domains) = &record.desired.domains {
      template.domains = Some(domains.iter().cloned().collect());
    }

    if !record.desired.attribute_mapping.is_empty() {
      template.attribute_mapping =
        Some(parse_attribute_mapping(&record.desired.attribute_mapping)?);
    }

    let provider = self.client.create_identity_provider(&template).await?;
    sync_record(record, &provider)
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn read(&self, record: &mut IdentityProviderRecord) -> Result<(), Diagnostics> {
    let provider = self.client.get_identity_provider(record.id()).await?;
    sync_record(record, &provider)
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn update(&self, record: &mut IdentityProviderRecord) -> Result<(), Diagnostics> {
    let mut template = IdentityProviderRequest::default();

    // URL wins when both metadata fields changed, matching the create and
    // synchronization precedence.
    if record.metadata_url_changed() {
      template.metadata_url = record.desired.metadata_url.clone();
    } else if record.metadata_xml_changed() {
      template.metadata_xml = record.desired.metadata_xml.clone();
    }

    if record.domains_changed() {
      template.domains = record
        .desired
        .domains
        .as_ref()
        .map(|domains| domains.iter().cloned().collect());
    }

    if record.attribute_mapping_changed() && !record.desired.attribute_mapping.is_empty() {
      template.attribute_mapping =
        Some(parse_attribute_mapping(&record.desired.attribute_mapping)?);
    }

    let provider = self
      .client
      .update_identity_provider(record.id(), &template)
      .await?;
    sync_record(record, &provider)
  }

  #[tracing::instrument(skip_all, err)]
  pub async fn delete(&self, record: &mut IdentityProviderRecord) -> Result<(), Diagnostics> {
    self.client.delete_identity_provider(record.id()).await?;
    record.clear_id();
    Ok(())
  }
}

// The attribute mapping travels as a JSON string inside the declarative
// record; a malformed value must fail before any request goes out.
fn parse_attribute_mapping(value: &str) -> Result<AttributeMapping, Diagnostics> {
  serde_json::from_str(value).map_err(|e| {
    Diagnostics::from(
      Diagnostic::error("attribute_mapping must be valid JSON")
        .with_detail(format!("JSON parsing failed: {}", e))
        .with_field("attribute_mapping"),
    )
  })
}

/// Writes a response back into the declarative record and resets its change
/// baseline: identifier, metadata source (URL preferred over XML), RFC 3339
/// UTC timestamps, the deduplicated ordered domain set, and the attribute
/// mapping re-encoded into the record's JSON string field.
fn sync_record(
  record: &mut IdentityProviderRecord,
  provider: &IdentityProviderResponse,
) -> Result<(), Diagnostics> {
  record.set_id(&provider.id);

  match (&provider.saml.metadata_url, &provider.saml.metadata_xml) {
    (Some(url), _) if !url.is_empty() => record.desired.metadata_url = url.clone(),
    (_, Some(xml)) if !xml.is_empty() => record.desired.metadata_xml = xml.clone(),
    _ => {},
  }

  if let Some(created_at) = provider.created_at {
    record.created_at = created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
  }
  if let Some(updated_at) = provider.updated_at {
    record.updated_at = updated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
  }

  record.desired.domains = Some(
    provider
      .domains
      .iter()
      .map(|domain| domain.domain.clone())
      .collect::<BTreeSet<String>>(),
  );

  record.desired.attribute_mapping = serde_json::to_string(&provider.saml.attribute_mapping)?;

  record.commit();
  Ok(())
}
