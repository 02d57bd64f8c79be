use nom::{is_space, IResult};
use num_traits::One;
use std::collections::BTreeMap;
use std::str::{from_utf8, FromStr};

use crate::pcfg::{Pcfg, ProductionMap};
use crate::util::parsing::{parse_symbol, parse_symbols};

/// Reads a grammar with one rule per line, e.g.
///
/// ```text
/// % a comment
/// S → [NP, VP] # 0.7
/// S → [VP]     # 0.3
/// VP → [v]
/// ```
///
/// The rule arrow may be written `→`, `->` or `=>`; a missing weight
/// defaults to 1; `%` starts a comment; blank lines are skipped. A later
/// rule with the same head and production replaces the earlier one.
impl FromStr for Pcfg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rules: BTreeMap<String, ProductionMap> = BTreeMap::new();

        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            let (head, production, weight) = match parse_pcfg_rule(line.as_bytes()) {
                IResult::Done(_, result) => result,
                _ => return Err(format!("Could not parse \'{}\'", line)),
            };
            if production.is_empty() {
                return Err(format!("Empty production in \'{}\'", line));
            }
            rules
                .entry(head)
                .or_insert_with(ProductionMap::new)
                .insert(production, weight);
        }

        Ok(Pcfg::from(rules))
    }
}

fn parse_pcfg_rule(input: &[u8]) -> IResult<&[u8], (String, String, f64)> {
    do_parse!(
        input,
        head: parse_symbol
            >> take_while!(is_space)
            >> alt!(tag!("→") | tag!("->") | tag!("=>"))
            >> take_while!(is_space)
            >> symbols: parse_symbols
            >> take_while!(is_space)
            >> weight_o:
                opt!(complete!(do_parse!(
                    tag!("#")
                        >> take_while!(is_space)
                        >> weight_s: map_res!(is_not!(" "), from_utf8)
                        >> weight: expr_res!(weight_s.parse())
                        >> (weight)
                )))
            >> take_while!(is_space)
            >> alt!(eof!() | preceded!(tag!("%"), take_while!(|_| true)))
            >> ((head, symbols.join(" "), weight_o.unwrap_or(f64::one())))
    )
}
