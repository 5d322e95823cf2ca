//! Beneficiaries: households and organizations that receive donations.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  document::{DocumentKind, format_document, is_valid_document},
  patch::nullable,
};

/// What kind of entity a beneficiary is. The kind picks the document
/// checksum: households carry an individual id, organizations an
/// organization id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeneficiaryKind {
  Household,
  Organization,
}

impl BeneficiaryKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Household => "household",
      Self::Organization => "organization",
    }
  }

  pub fn document_kind(self) -> DocumentKind {
    match self {
      Self::Household => DocumentKind::Individual,
      Self::Organization => DocumentKind::Organization,
    }
  }
}

impl FromStr for BeneficiaryKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "household" => Ok(Self::Household),
      "organization" => Ok(Self::Organization),
      other => Err(Error::UnknownVariant {
        kind:  "beneficiary kind",
        value: other.to_owned(),
      }),
    }
  }
}

impl fmt::Display for BeneficiaryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
  pub id:                 Uuid,
  pub name:               String,
  pub kind:               BeneficiaryKind,
  pub document:           Option<String>,
  pub address:            Option<String>,
  pub contact_info:       Option<String>,
  pub responsible_person: Option<String>,
  pub active:             bool,
  pub created_at:         DateTime<Utc>,
}

/// Check `document` against `kind` and return it in display format.
/// Blank documents collapse to `None`.
fn normalize_document(document: Option<String>, kind: BeneficiaryKind) -> Result<Option<String>> {
  match document.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(doc) => {
      let doc_kind = kind.document_kind();
      if !is_valid_document(doc, doc_kind) {
        return Err(Error::InvalidDocument { kind: kind.as_str(), value: doc.to_owned() });
      }
      Ok(Some(format_document(doc, doc_kind)))
    }
  }
}

// ─── NewBeneficiary ──────────────────────────────────────────────────────────

/// Input to [`crate::store::PantryStore::create_beneficiary`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewBeneficiary {
  pub name:               String,
  pub kind:               BeneficiaryKind,
  pub document:           Option<String>,
  pub address:            Option<String>,
  pub contact_info:       Option<String>,
  pub responsible_person: Option<String>,
  #[serde(default = "default_active")]
  pub active:             bool,
}

fn default_active() -> bool { true }

impl NewBeneficiary {
  pub fn new(name: impl Into<String>, kind: BeneficiaryKind) -> Self {
    Self {
      name: name.into(),
      kind,
      document: None,
      address: None,
      contact_info: None,
      responsible_person: None,
      active: true,
    }
  }

  /// Validate the document against the kind and store it formatted.
  pub fn normalized(mut self) -> Result<Self> {
    self.document = normalize_document(self.document, self.kind)?;
    Ok(self)
  }
}

// ─── BeneficiaryPatch ────────────────────────────────────────────────────────

/// Partial update; absent fields are left untouched and an explicit `null`
/// clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeneficiaryPatch {
  pub name:               Option<String>,
  pub kind:               Option<BeneficiaryKind>,
  #[serde(default, deserialize_with = "nullable")]
  pub document:           Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub address:            Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub contact_info:       Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub responsible_person: Option<Option<String>>,
  pub active:             Option<bool>,
}

impl BeneficiaryPatch {
  /// Validate the patch against the record it will be applied to.
  ///
  /// A document is checked against the kind it will end up with. Changing
  /// only the kind re-checks the existing document.
  pub fn normalized(mut self, current: &Beneficiary) -> Result<Self> {
    let kind = self.kind.unwrap_or(current.kind);
    match self.document.take() {
      Some(doc) => self.document = Some(normalize_document(doc, kind)?),
      None if kind != current.kind => {
        self.document = Some(normalize_document(current.document.clone(), kind)?);
      }
      None => {}
    }
    Ok(self)
  }

  /// Apply the patch to `target` in place.
  pub fn apply(self, target: &mut Beneficiary) {
    if let Some(v) = self.name {
      target.name = v;
    }
    if let Some(v) = self.kind {
      target.kind = v;
    }
    if let Some(v) = self.document {
      target.document = v;
    }
    if let Some(v) = self.address {
      target.address = v;
    }
    if let Some(v) = self.contact_info {
      target.contact_info = v;
    }
    if let Some(v) = self.responsible_person {
      target.responsible_person = v;
    }
    if let Some(v) = self.active {
      target.active = v;
    }
  }
}
