//! Name types for Endoors.
//!
//! - [`Label`]: one user-supplied segment, e.g. `alice`
//! - [`ParentDomain`]: the fixed domain every label is registered under
//! - [`Node`]: the 32-byte namehash identifier of a full name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PARENT_DOMAIN, LABEL_CHARSET_DESCRIPTION, NODE_SIZE};
use crate::error::{EndoorsError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// LABEL
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated subdomain label.
///
/// Only lowercase ASCII letters, digits and underscores are accepted, and
/// the label must be non-empty. Labels are never normalized: `"Alice"` is
/// rejected rather than lower-cased, so what the user typed is exactly what
/// gets registered.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Parses and validates a label.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(EndoorsError::InvalidLabel {
                label: s.to_string(),
                reason: "label cannot be empty".into(),
            });
        }

        if let Some(bad) = s.chars().find(|c| !Self::is_allowed_char(*c)) {
            return Err(EndoorsError::InvalidLabel {
                label: s.to_string(),
                reason: format!(
                    "character {:?} not allowed; use only {}",
                    bad, LABEL_CHARSET_DESCRIPTION
                ),
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Returns true if `s` would parse as a label.
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty() && s.chars().all(Self::is_allowed_char)
    }

    fn is_allowed_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
    }

    /// Returns the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the label, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Label {
    type Err = EndoorsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Label {
    type Error = EndoorsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARENT DOMAIN
// ═══════════════════════════════════════════════════════════════════════════════

/// The registrable parent domain, e.g. `endoors.eth`.
///
/// Supplied once at startup and immutable afterwards.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParentDomain(String);

impl ParentDomain {
    /// Parses a parent domain (trimmed, lower-cased).
    ///
    /// It must have at least two non-empty labels of letters, digits,
    /// underscores or hyphens.
    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();

        let labels: Vec<&str> = normalized.split('.').collect();
        if labels.len() < 2 {
            return Err(EndoorsError::ConfigError(format!(
                "parent domain '{}' must have at least two labels",
                normalized
            )));
        }

        for label in &labels {
            let ok = !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
            if !ok {
                return Err(EndoorsError::ConfigError(format!(
                    "parent domain '{}' has an invalid label '{}'",
                    normalized, label
                )));
            }
        }

        Ok(Self(normalized))
    }

    /// Returns the domain text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain's labels, leaf first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Number of labels in the domain.
    pub fn label_count(&self) -> usize {
        self.labels().count()
    }

    /// Formats `label` as a full subdomain of this domain.
    pub fn subdomain(&self, label: &Label) -> String {
        format!("{}.{}", label.as_str(), self.0)
    }

    /// Extracts the leading label from `<label>.<this domain>`.
    ///
    /// The name is compared exactly, with no trimming or case folding. It
    /// must have at least
    /// three components, exactly one of which precedes the parent domain, and
    /// that component must be a valid [`Label`].
    pub fn extract_label(&self, full_name: &str) -> Result<Label> {
        let parts: Vec<&str> = full_name.split('.').collect();

        if parts.len() < 3 {
            return Err(EndoorsError::InvalidName(format!(
                "'{}' is not a subdomain of {}",
                full_name, self.0
            )));
        }

        if parts.len() != self.label_count() + 1 || parts[1..].join(".") != self.0 {
            return Err(EndoorsError::InvalidName(format!(
                "'{}' is not a direct subdomain of {}",
                full_name, self.0
            )));
        }

        Label::parse(parts[0]).map_err(|e| EndoorsError::InvalidName(e.to_string()))
    }
}

impl Default for ParentDomain {
    fn default() -> Self {
        Self(DEFAULT_PARENT_DOMAIN.to_string())
    }
}

impl FromStr for ParentDomain {
    type Err = EndoorsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ParentDomain {
    type Error = EndoorsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ParentDomain> for String {
    fn from(domain: ParentDomain) -> Self {
        domain.0
    }
}

impl fmt::Debug for ParentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParentDomain({})", self.0)
    }
}

impl fmt::Display for ParentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte namehash node.
///
/// Always derived from a name; never a source of truth on its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Node([u8; NODE_SIZE]);

impl Node {
    /// The root node (namehash of the empty name).
    pub const ROOT: Node = Node([0u8; NODE_SIZE]);

    /// Creates a node from a fixed-size array.
    pub const fn from_array(bytes: [u8; NODE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a node from a slice of exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; NODE_SIZE] = bytes.try_into().map_err(|_| {
            EndoorsError::InvalidName(format!(
                "node must be {} bytes, got {}",
                NODE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Parses a node from hex (with or without `0x`).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the fixed-size array.
    pub fn as_array(&self) -> &[u8; NODE_SIZE] {
        &self.0
    }

    /// Returns `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns true for the root node.
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl TryFrom<String> for Node {
    type Error = EndoorsError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Node> for String {
    fn from(node: Node) -> Self {
        node.to_hex()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.to_hex())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("alice" ; "letters")]
    #[test_case("bob_42" ; "underscore and digits")]
    #[test_case("0" ; "single digit")]
    #[test_case("___" ; "only underscores")]
    fn test_label_accepts(input: &str) {
        assert_eq!(Label::parse(input).unwrap().as_str(), input);
        assert!(Label::is_valid(input));
    }

    #[test_case("" ; "empty")]
    #[test_case("Alice!" ; "uppercase and punctuation")]
    #[test_case("Alice" ; "uppercase")]
    #[test_case("al ice" ; "space")]
    #[test_case("al-ice" ; "hyphen")]
    #[test_case("alice.eth" ; "dot")]
    #[test_case("ålice" ; "non ascii")]
    fn test_label_rejects(input: &str) {
        let err = Label::parse(input).unwrap_err();
        assert!(err.is_validation_error());
        assert!(!Label::is_valid(input));
    }

    #[test]
    fn test_label_serde_validates() {
        let label: Label = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(label.as_str(), "carol");
        assert!(serde_json::from_str::<Label>("\"Carol\"").is_err());
    }

    #[test]
    fn test_parent_domain_default() {
        let parent = ParentDomain::default();
        assert_eq!(parent.as_str(), "endoors.eth");
        assert_eq!(parent.label_count(), 2);
    }

    #[test]
    fn test_parent_domain_normalizes() {
        let parent = ParentDomain::parse("  Endoors.ETH ").unwrap();
        assert_eq!(parent.as_str(), "endoors.eth");
    }

    #[test_case("eth" ; "single label")]
    #[test_case("endoors..eth" ; "empty label")]
    #[test_case("endo ors.eth" ; "space")]
    fn test_parent_domain_rejects(input: &str) {
        assert!(matches!(
            ParentDomain::parse(input),
            Err(EndoorsError::ConfigError(_))
        ));
    }

    #[test]
    fn test_subdomain_format() {
        let parent = ParentDomain::default();
        let label = Label::parse("alice").unwrap();
        assert_eq!(parent.subdomain(&label), "alice.endoors.eth");
    }

    #[test]
    fn test_extract_label() {
        let parent = ParentDomain::default();
        assert_eq!(
            parent.extract_label("alice.endoors.eth").unwrap().as_str(),
            "alice"
        );
        assert!(parent.extract_label("  Alice.Endoors.eth ").is_err());
        assert!(parent.extract_label("alice.Endoors.eth").is_err());
    }

    #[test_case("alice.other.eth" ; "wrong parent")]
    #[test_case("alice" ; "bare label")]
    #[test_case("endoors.eth" ; "parent only")]
    #[test_case("a.alice.endoors.eth" ; "nested subdomain")]
    #[test_case("al-ice.endoors.eth" ; "invalid label")]
    #[test_case(".endoors.eth" ; "empty label")]
    fn test_extract_label_invalid(input: &str) {
        let parent = ParentDomain::default();
        assert!(matches!(
            parent.extract_label(input),
            Err(EndoorsError::InvalidName(_))
        ));
    }

    #[test]
    fn test_node_hex_roundtrip_and_root() {
        assert!(Node::ROOT.is_root());
        assert_eq!(Node::ROOT.to_hex(), format!("0x{}", "00".repeat(32)));

        let node = Node::from_array([0xab; 32]);
        assert_eq!(Node::from_hex(&node.to_hex()).unwrap(), node);
        assert!(Node::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_node_serializes_as_hex_string() {
        let node = Node::from_array([1u8; 32]);
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(32)));
    }
}
