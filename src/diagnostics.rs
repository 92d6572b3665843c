use std::fmt::{Display, Formatter};

use gotrue_admin_entity::error::AdminError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
  Error,
  Warning,
}

/// A single validation or operation finding, attributable to the offending
/// field so the host can render it in context.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
  pub severity: Severity,
  pub summary: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl Diagnostic {
  pub fn error(summary: impl Into<String>) -> Self {
    Self {
      severity: Severity::Error,
      summary: summary.into(),
      detail: None,
      field: None,
    }
  }

  pub fn warning(summary: impl Into<String>) -> Self {
    Self {
      severity: Severity::Warning,
      summary: summary.into(),
      detail: None,
      field: None,
    }
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

/// Accumulated findings for one operation. Warnings do not fail an
/// operation; any error does.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, diagnostic: Diagnostic) {
    self.0.push(diagnostic);
  }

  pub fn extend(&mut self, other: Diagnostics) {
    self.0.extend(other.0);
  }

  pub fn has_errors(&self) -> bool {
    self.0.iter().any(|d| d.severity == Severity::Error)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
    self.0.iter()
  }
}

impl Display for Diagnostics {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for (i, diagnostic) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      f.write_str(&diagnostic.summary)?;
      if let Some(detail) = &diagnostic.detail {
        write!(f, " ({})", detail)?;
      }
    }
    Ok(())
  }
}

impl From<Diagnostic> for Diagnostics {
  fn from(diagnostic: Diagnostic) -> Self {
    Self(vec![diagnostic])
  }
}

impl From<AdminError> for Diagnostics {
  fn from(err: AdminError) -> Self {
    Diagnostic::error(err.to_string()).into()
  }
}

impl From<serde_json::Error> for Diagnostics {
  fn from(err: serde_json::Error) -> Self {
    Diagnostic::error(err.to_string()).into()
  }
}

impl IntoIterator for Diagnostics {
  type Item = Diagnostic;
  type IntoIter = std::vec::IntoIter<Diagnostic>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl<'a> IntoIterator for &'a Diagnostics {
  type Item = &'a Diagnostic;
  type IntoIter = std::slice::Iter<'a, Diagnostic>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}
