//! Tax-identifier validation, display formatting and masking.
//!
//! Two identifier families are supported: the 11-digit individual id (used
//! for households) and the 14-digit organization id. Every function here is
//! total: malformed input yields `false` or a best-effort string, never a
//! panic.

use serde::{Deserialize, Serialize};

/// Placeholder shown in place of an absent document.
pub const MISSING_DOCUMENT: &str = "---";

const INDIVIDUAL_LEN: usize = 11;
const ORGANIZATION_LEN: usize = 14;

const ORG_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const ORG_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which identifier family a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
  Individual,
  Organization,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Only the ASCII digits of `input`.
pub fn strip_non_digits(input: &str) -> String {
  input.chars().filter(char::is_ascii_digit).collect()
}

/// Every ASCII digit of `input`, in order, as numeric values.
fn ascii_digits(input: &str) -> Vec<u32> {
  input
    .chars()
    .filter(char::is_ascii_digit)
    .filter_map(|c| c.to_digit(10))
    .collect()
}

fn all_same(digits: &[u32]) -> bool {
  digits.windows(2).all(|w| w[0] == w[1])
}

/// `sum * 10 mod 11`, with 10 folded to 0.
fn individual_check(digits: &[u32], top_weight: u32) -> u32 {
  let sum: u32 = digits
    .iter()
    .enumerate()
    .map(|(i, d)| d * (top_weight - i as u32))
    .sum();
  match (sum * 10) % 11 {
    10 => 0,
    r => r,
  }
}

fn organization_check(digits: &[u32], weights: &[u32]) -> u32 {
  let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
  match sum % 11 {
    r if r < 2 => 0,
    r => 11 - r,
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check an individual id: 11 digits, not all identical, both check digits
/// correct. Non-digit characters are ignored.
pub fn is_valid_individual_id(input: &str) -> bool {
  let d = ascii_digits(input);
  if d.len() != INDIVIDUAL_LEN || all_same(&d) {
    return false;
  }
  individual_check(&d[..9], 10) == d[9] && individual_check(&d[..10], 11) == d[10]
}

/// Check an organization id: 14 digits, not all identical, both check digits
/// correct. Non-digit characters are ignored.
pub fn is_valid_organization_id(input: &str) -> bool {
  let d = ascii_digits(input);
  if d.len() != ORGANIZATION_LEN || all_same(&d) {
    return false;
  }
  organization_check(&d[..12], &ORG_WEIGHTS_FIRST) == d[12]
    && organization_check(&d[..13], &ORG_WEIGHTS_SECOND) == d[13]
}

/// Validate `input` against the checksum rules of `kind`.
pub fn is_valid_document(input: &str, kind: DocumentKind) -> bool {
  match kind {
    DocumentKind::Individual => is_valid_individual_id(input),
    DocumentKind::Organization => is_valid_organization_id(input),
  }
}

// ─── Formatting ──────────────────────────────────────────────────────────────

/// Lay `digits` out in groups of `sizes`, writing `separators[i]` between
/// group `i` and group `i + 1`. A separator is written only when at least one
/// digit follows it, so partial input formats progressively.
fn group(digits: &str, sizes: &[usize], separators: &[char]) -> String {
  let mut out = String::with_capacity(digits.len() + separators.len());
  let mut rest = digits;
  for (i, size) in sizes.iter().enumerate() {
    if rest.is_empty() {
      break;
    }
    if i > 0 {
      out.push(separators[i - 1]);
    }
    let take = (*size).min(rest.len());
    out.push_str(&rest[..take]);
    rest = &rest[take..];
  }
  out
}

/// Format as `000.000.000-00`, keeping at most 11 digits.
pub fn format_individual_id(value: &str) -> String {
  let digits: String = strip_non_digits(value).chars().take(INDIVIDUAL_LEN).collect();
  group(&digits, &[3, 3, 3, 2], &['.', '.', '-'])
}

/// Format as `00.000.000/0000-00`, keeping at most 14 digits.
pub fn format_organization_id(value: &str) -> String {
  let digits: String = strip_non_digits(value).chars().take(ORGANIZATION_LEN).collect();
  group(&digits, &[2, 3, 3, 4, 2], &['.', '.', '/', '-'])
}

/// Format `value` according to an explicit identifier family.
pub fn format_document(value: &str, kind: DocumentKind) -> String {
  match kind {
    DocumentKind::Individual => format_individual_id(value),
    DocumentKind::Organization => format_organization_id(value),
  }
}

// ─── Masking ─────────────────────────────────────────────────────────────────

fn clamped<'a>(s: &'a str, from: usize, to: usize) -> &'a str {
  let end = to.min(s.len());
  let start = from.min(end);
  &s[start..end]
}

/// Mask a document for display, revealing at most three middle digits.
///
/// Up to 11 digits are treated as an individual id, anything longer as an
/// organization id. An absent or empty document yields [`MISSING_DOCUMENT`].
pub fn mask_document(doc: Option<&str>) -> String {
  let doc = match doc {
    Some(d) if !d.is_empty() => d,
    _ => return MISSING_DOCUMENT.to_owned(),
  };
  let digits = strip_non_digits(doc);
  if digits.len() <= INDIVIDUAL_LEN {
    format!("***.{}.***-**", clamped(&digits, 3, 6))
  } else {
    format!("**.***.{}/****-**", clamped(&digits, 4, 7))
  }
}
