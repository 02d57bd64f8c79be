//! Rewrites a [`Pcfg`] into Chomsky normal form and undoes the
//! binarization on derivation trees that a parser built from the rewritten
//! grammar.

use fnv::FnvHashSet;
use num_traits::{One, Zero};
use std::error::Error;
use std::fmt;

use crate::pcfg::Pcfg;
use crate::tree::DerivationTree;

/// Marks a non-terminal that was introduced during binarization. Symbol
/// names of the input grammar never contain it.
pub const SYNTHETIC_MARKER: char = '*';

/// Joins the symbols that are grouped on either side of the marker.
const GROUP_JOINT: &str = "-";

/// A violated invariant reported by [`CnfTransformer::transform`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Some non-terminal's productions sum to neither 0 nor 1 within
    /// [`Pcfg::TOLERANCE`]. Malformed input when reported on entry, a
    /// rewrite defect when reported after a phase.
    InvariantViolation { head: String, sum: f64 },
    /// The scan after binarization found a production that is neither
    /// binary nor a single terminal. Always a defect in the rewrite
    /// phases, never a property of the input.
    NotFullyTransformed { head: String, production: String },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TransformError::InvariantViolation { ref head, sum } => {
                write!(f, "{}'s productions sum up to {}", head, sum)
            }
            TransformError::NotFullyTransformed {
                ref head,
                ref production,
            } => write!(
                f,
                "{} → [{}] is neither binary nor a single terminal",
                head, production
            ),
        }
    }
}

impl Error for TransformError {}

/// Transforms a [`Pcfg`] into Chomsky normal form: unary chains are folded
/// into the productions they ultimately resolve to (unless configured
/// otherwise) and longer productions are split into left-branching chains
/// of binary productions. The probability mass reachable from every
/// non-terminal of the input is preserved.
///
/// ```
/// use cnformata::pcfg::Pcfg;
/// use cnformata::transform::CnfTransformer;
///
/// let grammar: Pcfg = "S → [A, B, C]\n\
///                      A → [a]\n\
///                      B → [X]\n\
///                      X → [x]\n\
///                      C → [c]".parse().unwrap();
/// let transformer = CnfTransformer::new(|symbol: &str| {
///     symbol.chars().all(char::is_lowercase)
/// });
/// let cnf = transformer.transform(&grammar).unwrap();
///
/// assert_eq!(cnf.get("S").map(|p| p["A A*B-C"]), Some(1.0));
/// assert_eq!(cnf.get("A*B-C").map(|p| p["B C"]), Some(1.0));
/// assert_eq!(cnf.get("B").map(|p| p["x"]), Some(1.0));
/// ```
pub struct CnfTransformer<F>
where
    F: Fn(&str) -> bool,
{
    is_terminal: F,
    omit_unaries: bool,
}

impl<F> CnfTransformer<F>
where
    F: Fn(&str) -> bool,
{
    /// Creates a transformer that eliminates unary productions. The
    /// predicate classifies symbol names as terminal; it must be total and
    /// deterministic.
    pub fn new(is_terminal: F) -> Self {
        CnfTransformer {
            is_terminal,
            omit_unaries: true,
        }
    }

    /// Creates a transformer that leaves unary productions untouched and
    /// only binarizes.
    pub fn keeping_unaries(is_terminal: F) -> Self {
        CnfTransformer {
            is_terminal,
            omit_unaries: false,
        }
    }

    /// Returns the Chomsky normal form of `grammar`. The input is never
    /// mutated; every call operates on its own working copy. The sum-to-one
    /// invariant is checked on entry and re-checked after every rewrite
    /// phase.
    pub fn transform(&self, grammar: &Pcfg) -> Result<Pcfg, TransformError> {
        let mut working = grammar.clone();
        check_sums(&working)?;

        if self.omit_unaries {
            for head in working.keys().cloned().collect::<Vec<_>>() {
                for (production, weight) in snapshot(&working, &head) {
                    if weight.is_zero() || !self.is_unary(&production) {
                        continue;
                    }
                    if let Some(productions) = working.get_mut(&head) {
                        productions.insert(production.clone(), 0.0);
                    }
                    let mut visited = FnvHashSet::default();
                    self.percolate(&mut working, &head, &production, weight, &mut visited);
                }
            }
        }
        check_sums(&working)?;

        for head in working.keys().cloned().collect::<Vec<_>>() {
            for (production, weight) in snapshot(&working, &head) {
                if !weight.is_zero() && production.split(' ').count() > 2 {
                    binarize(&mut working, &head, &production);
                }
            }
        }
        self.check_transformed(&working)?;
        check_sums(&working)?;

        let mut clean = Pcfg::new();
        for (head, productions) in working {
            for (production, weight) in productions {
                if !weight.is_zero() {
                    clean
                        .entry(head.clone())
                        .or_default()
                        .insert(production, weight);
                }
            }
        }
        check_sums(&clean)?;
        Ok(clean)
    }

    /// A unary production consists of a single non-terminal symbol. A
    /// single terminal symbol is already in normal form.
    fn is_unary(&self, production: &str) -> bool {
        !production.contains(' ') && !(self.is_terminal)(production)
    }

    /// Folds every production reachable from `rhs` into `lhs`'s table,
    /// scaled by `mass`, following unary productions transitively.
    /// Contributions of converging chains accumulate on the target
    /// production. `visited` expands each non-terminal at most once per
    /// elimination, so mass flowing around a unary cycle that does not pass
    /// through `lhs` is truncated rather than summed in closed form.
    fn percolate(
        &self,
        rules: &mut Pcfg,
        lhs: &str,
        rhs: &str,
        mass: f64,
        visited: &mut FnvHashSet<String>,
    ) {
        // a rule deriving itself contributes nothing
        if lhs == rhs {
            return;
        }
        visited.insert(rhs.to_owned());
        for (production, weight) in snapshot(rules, rhs) {
            if weight.is_zero() || visited.contains(&production) {
                continue;
            }
            if self.is_unary(&production) {
                self.percolate(rules, lhs, &production, mass * weight, visited);
            } else {
                *rules
                    .entry(lhs.to_owned())
                    .or_default()
                    .entry(production)
                    .or_insert(0.0) += mass * weight;
            }
        }
    }

    /// Asserts that every nonzero production is binary or a single
    /// terminal (a remaining unary production is accepted when the
    /// transformer keeps unaries).
    fn check_transformed(&self, rules: &Pcfg) -> Result<(), TransformError> {
        for (head, productions) in rules.iter() {
            for (production, weight) in productions {
                if weight.is_zero() {
                    continue;
                }
                if production.split(' ').count() > 2
                    || (self.omit_unaries && self.is_unary(production))
                {
                    return Err(TransformError::NotFullyTransformed {
                        head: head.clone(),
                        production: production.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Replaces the production `head → s_0 … s_{n-1}` (n > 2) by a
/// left-branching chain of binary productions through synthetic
/// non-terminals. The original probability stays on the first link and
/// every further link is certain, so the mass reachable from `head` does
/// not change. Synthetic names are pure functions of the grouped symbols,
/// so an identical sequence elsewhere in the grammar reuses the same chain.
fn binarize(rules: &mut Pcfg, head: &str, production: &str) {
    let symbols: Vec<&str> = production.split(' ').collect();
    let mut head = head.to_owned();
    let mut weight = rules
        .get_mut(&head)
        .and_then(|productions| productions.insert(production.to_owned(), 0.0))
        .unwrap_or_default();

    for i in 0..symbols.len() - 2 {
        let group = format!(
            "{}{}{}",
            symbols[..i + 1].join(GROUP_JOINT),
            SYNTHETIC_MARKER,
            symbols[i + 1..].join(GROUP_JOINT)
        );
        rules
            .entry(head)
            .or_default()
            .insert(format!("{} {}", symbols[i], group), weight);
        head = group;
        weight = f64::one();
    }
    rules
        .entry(head)
        .or_default()
        .insert(symbols[symbols.len() - 2..].join(" "), f64::one());
}

/// The production table of `head` at call time, cloned so the table can be
/// rewritten while its old entries are iterated.
fn snapshot(rules: &Pcfg, head: &str) -> Vec<(String, f64)> {
    rules
        .get(head)
        .map(|productions| {
            productions
                .iter()
                .map(|(production, &weight)| (production.clone(), weight))
                .collect()
        })
        .unwrap_or_default()
}

fn check_sums(rules: &Pcfg) -> Result<(), TransformError> {
    match rules.sum_violation() {
        Some((head, sum)) => Err(TransformError::InvariantViolation {
            head: head.to_owned(),
            sum,
        }),
        None => Ok(()),
    }
}

/// Removes the binarization artifacts from a derivation tree in place.
///
/// Synthetic nodes are recognized purely by the [`SYNTHETIC_MARKER`] in
/// their label and replaced by their children, preserving left-to-right
/// derivation order. Unary-chain elimination is not undone: that rewrite
/// merges probability mass and has no inverse. Calling this on an already
/// clean tree is a no-op.
///
/// The tree must stem from a parse under a grammar produced by
/// [`CnfTransformer::transform`]; in particular a leaf never carries a
/// synthetic label.
pub fn detransform(node: &mut DerivationTree) {
    if node.children.is_empty() {
        return;
    }
    while node
        .children
        .last()
        .map_or(false, |child| child.label.contains(SYNTHETIC_MARKER))
    {
        if let Some(synthetic) = node.children.pop() {
            node.children.extend(synthetic.children);
        }
    }
    for child in &mut node.children {
        detransform(child);
    }
}
