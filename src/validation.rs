use gotrue_admin_entity::sso::AttributeMapping;
use lazy_static::lazy_static;
use regex::Regex;

use crate::diagnostics::{Diagnostic, Diagnostics};

lazy_static! {
  // Lowercase alphanumeric segments separated by single dots; hyphens are
  // allowed inside a segment but not at its edges.
  static ref DOMAIN_PATTERN: Regex =
    Regex::new("^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)*$").unwrap();
}

pub fn validate_domain(value: &str) -> Diagnostics {
  let mut diags = Diagnostics::new();
  if !DOMAIN_PATTERN.is_match(value) {
    diags.push(
      Diagnostic::error(format!("Value {:?} is not a valid domain", value)).with_field("domains"),
    );
  }
  diags
}

/// Validates every entry, one diagnostic per invalid value.
pub fn validate_domains<'a, I>(values: I) -> Diagnostics
where
  I: IntoIterator<Item = &'a str>,
{
  let mut diags = Diagnostics::new();
  for value in values {
    diags.extend(validate_domain(value));
  }
  diags
}

/// Validates the JSON-encoded attribute mapping carried by the declarative
/// record. An empty value is fine (the field is optional); anything else
/// must parse and every key must be usable.
pub fn validate_attribute_mapping(value: &str) -> Diagnostics {
  let mut diags = Diagnostics::new();
  if value.is_empty() {
    return diags;
  }

  let mapping: AttributeMapping = match serde_json::from_str(value) {
    Ok(mapping) => mapping,
    Err(e) => {
      diags.push(
        Diagnostic::error("attribute_mapping must be valid JSON")
          .with_detail(format!("JSON parsing failed: {}", e))
          .with_field("attribute_mapping"),
      );
      return diags;
    },
  };

  for (key, attribute) in &mapping.keys {
    let has_name = attribute.name.as_deref().map_or(false, |name| !name.is_empty());
    let names = attribute.names.as_deref().unwrap_or_default();

    if !has_name && names.is_empty() && attribute.default.is_none() {
      diags.push(
        Diagnostic::error(format!(
          "Attribute mapping key {:?} must have at least one property set: name, names or default",
          key
        ))
        .with_field("attribute_mapping"),
      );
    } else {
      for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
          diags.push(
            Diagnostic::error(format!(
              "Attribute mapping name under {:?}.names at position {} is empty",
              key, i
            ))
            .with_field("attribute_mapping"),
          );
        }
      }
    }
  }

  diags
}
