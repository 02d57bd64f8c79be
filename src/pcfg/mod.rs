use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

mod from_str;

/// The probability table of a single non-terminal, keyed by production.
///
/// A production is stored as the space-joined sequence of its symbol names;
/// splitting the key on `' '` reproduces the symbols in their original
/// order and multiplicity.
pub type ProductionMap = BTreeMap<String, f64>;

/// A probabilistic context-free grammar: a map from each non-terminal to
/// the probability table of its productions.
///
/// For every non-terminal the probabilities of its productions sum to 1
/// (within [`Pcfg::TOLERANCE`]); a sum of exactly 0 is also permitted and
/// denotes a rule that has been cleared but not repopulated. A probability
/// of exactly 0 on a single production marks it as absorbed by a rewrite;
/// such entries are purged before a grammar is handed back to a caller.
///
/// ```
/// use cnformata::pcfg::Pcfg;
///
/// let grammar: Pcfg = "S → [NP, VP] # 0.7\n\
///                      S → [VP]     # 0.3\n\
///                      VP → [v]".parse().unwrap();
///
/// assert_eq!(grammar.get("S").map(|p| p["NP VP"]), Some(0.7));
/// assert_eq!(grammar.get("VP").map(|p| p["v"]), Some(1.0));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pcfg {
    rules: BTreeMap<String, ProductionMap>,
}

impl Pcfg {
    /// The tolerated deviation of a probability sum from 1.
    pub const TOLERANCE: f64 = 0.02;

    pub fn new() -> Pcfg {
        Pcfg { rules: BTreeMap::new() }
    }

    /// Returns the first non-terminal whose probabilities sum to neither 0
    /// nor 1 within [`Pcfg::TOLERANCE`], together with the offending sum.
    pub fn sum_violation(&self) -> Option<(&str, f64)> {
        for (head, productions) in &self.rules {
            let sum: f64 = productions.values().sum();
            if sum != 0.0 && (1.0 - sum).abs() >= Pcfg::TOLERANCE {
                return Some((head, sum));
            }
        }
        None
    }
}

impl From<BTreeMap<String, ProductionMap>> for Pcfg {
    fn from(rules: BTreeMap<String, ProductionMap>) -> Self {
        Pcfg { rules }
    }
}

impl Deref for Pcfg {
    type Target = BTreeMap<String, ProductionMap>;

    fn deref(&self) -> &Self::Target {
        &self.rules
    }
}

impl DerefMut for Pcfg {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.rules
    }
}

impl IntoIterator for Pcfg {
    type Item = (String, ProductionMap);
    type IntoIter = btree_map::IntoIter<String, ProductionMap>;

    fn into_iter(self) -> btree_map::IntoIter<String, ProductionMap> {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a Pcfg {
    type Item = (&'a String, &'a ProductionMap);
    type IntoIter = btree_map::Iter<'a, String, ProductionMap>;

    fn into_iter(self) -> btree_map::Iter<'a, String, ProductionMap> {
        (&self.rules).into_iter()
    }
}

impl fmt::Display for Pcfg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (head, productions) in &self.rules {
            for (production, weight) in productions {
                writeln!(
                    f,
                    "{} → [{}] # {}",
                    head,
                    production.split(' ').collect::<Vec<_>>().join(", "),
                    weight
                )?;
            }
        }
        Ok(())
    }
}
