use std::collections::BTreeSet;

use crate::diagnostics::Diagnostics;
use crate::validation::{validate_attribute_mapping, validate_domains};

/// User-authored desired state for a single SAML identity provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityProviderSpec {
  pub metadata_url: String,
  pub metadata_xml: String,
  /// `None` means the field is not configured; an empty set clears the
  /// remote domain list on apply.
  pub domains: Option<BTreeSet<String>>,
  /// JSON-encoded attribute mapping; empty string means unset.
  pub attribute_mapping: String,
}

/// Declarative record for one identity provider: the desired spec plus the
/// last applied snapshot, which is what field-level change detection runs
/// against.
#[derive(Debug, Clone, Default)]
pub struct IdentityProviderRecord {
  id: String,
  pub desired: IdentityProviderSpec,
  applied: IdentityProviderSpec,
  pub created_at: String,
  pub updated_at: String,
}

impl IdentityProviderRecord {
  /// A record that has never been applied; every configured field counts
  /// as changed.
  pub fn new(desired: IdentityProviderSpec) -> Self {
    Self {
      desired,
      ..Default::default()
    }
  }

  /// A record restored from stored state. Change detection is relative to
  /// `state` until `desired` is edited.
  pub fn with_state(id: &str, state: IdentityProviderSpec) -> Self {
    Self {
      id: id.to_owned(),
      desired: state.clone(),
      applied: state,
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  /// Server-assigned identifier; empty until the provider is created.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn exists(&self) -> bool {
    !self.id.is_empty()
  }

  pub fn metadata_url_changed(&self) -> bool {
    self.desired.metadata_url != self.applied.metadata_url
  }

  pub fn metadata_xml_changed(&self) -> bool {
    self.desired.metadata_xml != self.applied.metadata_xml
  }

  pub fn domains_changed(&self) -> bool {
    self.desired.domains != self.applied.domains
  }

  pub fn attribute_mapping_changed(&self) -> bool {
    self.desired.attribute_mapping != self.applied.attribute_mapping
  }

  /// Configuration-time validation of the desired spec; accumulates every
  /// violation instead of stopping at the first.
  pub fn validate(&self) -> Diagnostics {
    let mut diags = Diagnostics::new();
    if let Some(domains) = &self.desired.domains {
      diags.extend(validate_domains(domains.iter().map(String::as_str)));
    }
    diags.extend(validate_attribute_mapping(&self.desired.attribute_mapping));
    diags
  }

  pub(crate) fn set_id(&mut self, id: &str) {
    self.id = id.to_owned();
  }

  pub(crate) fn clear_id(&mut self) {
    self.id.clear();
  }

  /// Snapshots the desired spec as the new change baseline, called after a
  /// successful synchronization.
  pub(crate) fn commit(&mut self) {
    self.applied = self.desired.clone();
  }
}
