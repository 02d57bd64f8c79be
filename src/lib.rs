//! Transformation of probabilistic context-free grammars into Chomsky
//! normal form, and the reverse transformation of derivation trees that
//! were built from the transformed grammar.

#[macro_use]
extern crate nom;
#[macro_use]
extern crate serde_derive;

pub mod pcfg;
pub mod transform;
pub mod tree;
pub mod util;
