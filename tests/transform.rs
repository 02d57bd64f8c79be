use cnformata::pcfg::Pcfg;
use cnformata::transform::{detransform, CnfTransformer, TransformError, SYNTHETIC_MARKER};
use cnformata::tree::DerivationTree;

fn lexical(symbol: &str) -> bool {
    symbol.chars().all(|c| c.is_lowercase() || c == '\'')
}

fn example_transformer() -> CnfTransformer<fn(&str) -> bool> {
    CnfTransformer::new(lexical)
}

fn treebank_grammar() -> Pcfg {
    "S → [NP, VP]    # 0.7\n\
     S → [VP]        # 0.3\n\
     NP → [d, n]     # 0.6\n\
     NP → [n]        # 0.4\n\
     VP → [v, NP, PP] # 0.2\n\
     VP → [v, NP]    # 0.5\n\
     VP → [v]        # 0.3\n\
     PP → [p, NP]"
        .parse()
        .unwrap()
}

#[test]
fn test_transform_preserves_mass() {
    let grammar = treebank_grammar();
    let cnf = example_transformer().transform(&grammar).unwrap();

    for head in grammar.keys() {
        let sum: f64 = cnf
            .get(head)
            .expect("non-terminal lost by the transformation")
            .values()
            .sum();
        assert!(
            (1.0 - sum).abs() < Pcfg::TOLERANCE,
            "{} sums up to {}",
            head,
            sum
        );
    }
}

#[test]
fn test_transform_output_is_binary_or_terminal() {
    let cnf = example_transformer()
        .transform(&treebank_grammar())
        .unwrap();

    for (head, productions) in &cnf {
        for (production, weight) in productions {
            let symbols: Vec<&str> = production.split(' ').collect();
            assert!(*weight > 0.0, "{} kept a zero entry", head);
            match symbols.len() {
                1 => assert!(lexical(symbols[0]), "unary {} → {}", head, production),
                2 => (),
                _ => panic!("{} → [{}] is not binary", head, production),
            }
        }
    }
}

#[test]
fn test_transform_folds_unary_mass_into_head() {
    let cnf = example_transformer()
        .transform(&treebank_grammar())
        .unwrap();

    // S → VP (0.3) is distributed over VP's productions
    let s = cnf.get("S").unwrap();
    assert!((s["v"] - 0.09).abs() < 1e-10);
    assert!((s["v NP"] - 0.15).abs() < 1e-10);
    assert!((s["v v*NP-PP"] - 0.06).abs() < 1e-10);
    assert_eq!(s.get("VP"), None);

    // the chain introduced for the ternary production is shared with VP
    assert_eq!(cnf.get("v*NP-PP").map(|p| p["NP PP"]), Some(1.0));
}

#[test]
fn test_transformed_grammar_drives_a_parse_round_trip() {
    let cnf = example_transformer()
        .transform(&treebank_grammar())
        .unwrap();

    // the binary derivation of "v d n p n" under VP, as a chart parser
    // would build it from the transformed rules
    assert!(cnf.get("VP").unwrap().contains_key("v v*NP-PP"));
    assert!(cnf.get("v*NP-PP").unwrap().contains_key("NP PP"));
    let mut tree = DerivationTree::with_children(
        "VP",
        vec![
            DerivationTree::new("v"),
            DerivationTree::with_children(
                "v*NP-PP",
                vec![
                    DerivationTree::with_children(
                        "NP",
                        vec![DerivationTree::new("d"), DerivationTree::new("n")],
                    ),
                    DerivationTree::with_children(
                        "PP",
                        vec![
                            DerivationTree::new("p"),
                            DerivationTree::with_children(
                                "NP",
                                vec![DerivationTree::new("n")],
                            ),
                        ],
                    ),
                ],
            ),
        ],
    );

    detransform(&mut tree);

    assert_eq!(tree.to_string(), "(VP v (NP d n) (PP p (NP n)))");
    assert!(!format!("{}", tree).contains(SYNTHETIC_MARKER));
}

#[test]
fn test_transform_reports_malformed_input() {
    let grammar: Pcfg = "S → [NP, VP] # 0.7\n\
                         S → [VP] # 0.1"
        .parse()
        .unwrap();

    match example_transformer().transform(&grammar) {
        Err(TransformError::InvariantViolation { head, sum }) => {
            assert_eq!(head, "S");
            assert!((sum - 0.8).abs() < 1e-10);
        }
        other => panic!("expected an invariant violation, got {:?}", other.map(|g| g.to_string())),
    }
}

#[test]
fn test_transformed_grammar_serializes() {
    let cnf = example_transformer()
        .transform(&treebank_grammar())
        .unwrap();

    let json = serde_json::to_string(&cnf).unwrap();
    let back: Pcfg = serde_json::from_str(&json).unwrap();

    assert_eq!(cnf, back);
}
