use std::fmt;

/// A node in a derivation tree: a label and the subtrees it derives, in
/// left-to-right derivation order. A node without children is a leaf.
///
/// `Display` renders the subtree in bracket notation:
///
/// ```
/// use cnformata::tree::DerivationTree;
///
/// let tree = DerivationTree::with_children(
///     "S",
///     vec![
///         DerivationTree::with_children("NP", vec![DerivationTree::new("n")]),
///         DerivationTree::with_children("VP", vec![DerivationTree::new("v")]),
///     ],
/// );
///
/// assert_eq!(tree.to_string(), "(S (NP n) (VP v))");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationTree {
    pub label: String,
    pub children: Vec<DerivationTree>,
}

impl DerivationTree {
    /// A leaf with the given label.
    pub fn new<L: Into<String>>(label: L) -> DerivationTree {
        DerivationTree {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// An inner node with the given label and subtrees.
    pub fn with_children<L: Into<String>>(
        label: L,
        children: Vec<DerivationTree>,
    ) -> DerivationTree {
        DerivationTree {
            label: label.into(),
            children,
        }
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.children.is_empty() {
            return write!(f, "{}", self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}
