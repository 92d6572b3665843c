use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider type accepted by the admin API on create.
pub const SAML_PROVIDER_TYPE: &str = "saml";

/// Sparse outbound payload: only populated fields reach the wire, so an
/// update can carry exactly the fields that changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IdentityProviderRequest {
  #[serde(skip_serializing_if = "String::is_empty")]
  pub id: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub resource_id: String,

  #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
  pub provider_type: String,

  /// `None` means "no change"; `Some(vec![])` replaces the remote set with
  /// nothing.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub domains: Option<Vec<String>>,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub metadata_xml: String,
  #[serde(skip_serializing_if = "String::is_empty")]
  pub metadata_url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attribute_mapping: Option<AttributeMapping>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityProviderResponse {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub resource_id: String,

  #[serde(default)]
  pub domains: Vec<Domain>,

  #[serde(default)]
  pub saml: Saml,

  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Saml {
  #[serde(default)]
  pub metadata_xml: Option<String>,
  #[serde(default)]
  pub metadata_url: Option<String>,
  #[serde(default)]
  pub attribute_mapping: AttributeMapping,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Domain {
  #[serde(default)]
  pub domain: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityProviderList {
  pub items: Option<Vec<IdentityProviderResponse>>,
}

/// Rules for deriving user attributes from SAML assertion claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMapping {
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub keys: BTreeMap<String, Attribute>,
}

impl AttributeMapping {
  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }
}

/// A single mapping entry. At least one of `name`, a non-empty `names` list
/// or `default` must be set for the entry to be usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub names: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<serde_json::Value>,
}
