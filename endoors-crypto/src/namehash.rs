//! ENS namehash.
//!
//! ```text
//! namehash("")        = 0x00…00
//! namehash(l || rest) = keccak256(namehash(rest) || keccak256(l))
//! ```
//!
//! Labels are processed from the root-most (`eth`) to the leaf. The output
//! must match the on-chain derivation byte for byte, so no normalization
//! happens here; callers validate labels before hashing.

use endoors_core::types::{Label, Node, ParentDomain};

use crate::hash::{keccak256_concat, labelhash};

/// Computes the namehash of a dotted name.
///
/// Pure and deterministic. The empty name yields [`Node::ROOT`].
pub fn namehash(name: &str) -> Node {
    if name.is_empty() {
        return Node::ROOT;
    }

    name.rsplit('.')
        .fold(Node::ROOT, |node, label| child_node(&node, label))
}

/// Computes the node of `label` directly beneath `parent`.
pub fn child_node(parent: &Node, label: &str) -> Node {
    let label_hash = labelhash(label);
    Node::from_array(keccak256_concat(&[parent.as_bytes(), &label_hash]))
}

/// Computes the node of `label.parent`.
pub fn subdomain_node(label: &Label, parent: &ParentDomain) -> Node {
    child_node(&namehash(parent.as_str()), label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ETH_NODE: &str = "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae";
    const FOO_ETH_NODE: &str = "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f";
    const ENDOORS_ETH_NODE: &str =
        "0x42d8bf715d5483e562255ee6ea3cde63fbfd4e5a8c202f5683b3f91600ad8e0c";
    const ALICE_ENDOORS_ETH_NODE: &str =
        "0x1e5e16395416076656f4ee99daff877bfd4a86e2cbf544ca847c4899ac3f4381";

    #[test]
    fn test_empty_name_is_root() {
        assert_eq!(namehash(""), Node::ROOT);
        assert!(namehash("").is_root());
    }

    #[test]
    fn test_reference_vectors() {
        assert_eq!(namehash("eth").to_hex(), ETH_NODE);
        assert_eq!(namehash("foo.eth").to_hex(), FOO_ETH_NODE);
        assert_eq!(namehash("endoors.eth").to_hex(), ENDOORS_ETH_NODE);
        assert_eq!(namehash("alice.endoors.eth").to_hex(), ALICE_ENDOORS_ETH_NODE);
    }

    #[test]
    fn test_single_label_is_one_step_from_root() {
        assert_eq!(namehash("eth"), child_node(&Node::ROOT, "eth"));
    }

    #[test]
    fn test_subdomain_node_matches_full_name() {
        let label = Label::parse("alice").unwrap();
        let parent = ParentDomain::default();
        assert_eq!(subdomain_node(&label, &parent), namehash("alice.endoors.eth"));
    }

    #[test]
    fn test_distinct_corpus() {
        let corpus = [
            "",
            "eth",
            "endoors.eth",
            "alice.endoors.eth",
            "bob.endoors.eth",
            "alice.other.eth",
            "endoors.alice.eth",
            "alice_1.endoors.eth",
            "alice1.endoors.eth",
            "eth.endoors",
        ];

        let nodes: std::collections::HashSet<Node> = corpus.iter().map(|n| namehash(n)).collect();
        assert_eq!(nodes.len(), corpus.len());
    }

    proptest! {
        #[test]
        fn prop_deterministic(name in "[a-z0-9_]{1,12}(\\.[a-z0-9_]{1,12}){0,3}") {
            prop_assert_eq!(namehash(&name), namehash(&name));
        }

        #[test]
        fn prop_recursive_structure(label in "[a-z0-9_]{1,16}", parent in "[a-z0-9_]{1,12}\\.eth") {
            let full = format!("{}.{}", label, parent);
            prop_assert_eq!(namehash(&full), child_node(&namehash(&parent), &label));
        }

        #[test]
        fn prop_distinct_labels_distinct_nodes(a in "[a-z0-9_]{1,16}", b in "[a-z0-9_]{1,16}") {
            prop_assume!(a != b);
            let a = format!("{}.endoors.eth", a);
            let b = format!("{}.endoors.eth", b);
            prop_assert_ne!(namehash(&a), namehash(&b));
        }
    }
}
