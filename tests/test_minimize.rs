//! Minimization and technology-mapping properties over sample equations

use lut_synth::expression::Equation;
use lut_synth::mapping::{LutArity, MappingOptions};
use lut_synth::minimize;
use lut_synth::truth_table::{TruthTable, DEFAULT_MAX_LITERALS};
use lut_synth::Form;

const SAMPLES: &[&str] = &[
    "F = a*b + a'*b'",
    "F = a*b*c + a*b*c'",
    "F = a",
    "F = a'*b' + a*b'*c",
    "F = a*b + b*c + a*c",
    "F = a*b'*c + a'*b*c + a*b*c' + a*b*c",
    "F = (a + b) * (a' + c)",
    "F = a*b*c*d + a'*b'*c'*d' + a*b'*c*d'",
    "F = a*b*c + d*e*f + a'*g",
    "F = a*b*c*d*e*f*g*h",
];

fn synthesized(text: &str) -> Equation {
    let mut eq = Equation::parse(text).unwrap();
    eq.synthesize(DEFAULT_MAX_LITERALS).unwrap();
    eq
}

/// All assignments of `width` literals, in minterm order
fn assignments(width: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..1usize << width)
        .map(move |m| (0..width).map(|p| (m >> (width - 1 - p)) & 1 == 1).collect())
}

/// Value of `table` under an assignment given for `literals`
fn value_under(table: &TruthTable, literals: &[std::sync::Arc<str>], values: &[bool]) -> bool {
    let own: Vec<bool> = table
        .literals()
        .iter()
        .map(|l| {
            let p = literals.iter().position(|x| x == l).unwrap();
            values[p]
        })
        .collect();
    table.evaluate(&own)
}

// ========== Minimization ==========

#[test]
fn test_minimized_function_is_unchanged() {
    for text in SAMPLES {
        let mut eq = synthesized(text);
        let original = eq.table().unwrap().clone();
        eq.minimize().unwrap();
        let reduced = eq.table().unwrap();

        // Re-parse the rendered expression rather than trusting the table
        let rendered = Equation::parse(&eq.to_string());
        for values in assignments(original.width()) {
            let want = original.evaluate(&values);
            let got = value_under(reduced, original.literals(), &values);
            assert_eq!(got, want, "{}", text);
            if let Ok(mut again) = rendered.clone() {
                again.synthesize(DEFAULT_MAX_LITERALS).unwrap();
                let table = again.table().unwrap();
                assert_eq!(value_under(table, original.literals(), &values), want, "{}", eq);
            }
        }
    }
}

#[test]
fn test_minimization_is_idempotent() {
    for text in SAMPLES {
        let mut eq = synthesized(text);
        let first = eq.minimize().unwrap().clone();
        let second = eq.minimize().unwrap();
        assert_eq!(first.expression(), second.expression(), "{}", text);

        // Re-parsing may reorder literals but never finds a cheaper cover
        let mut again = synthesized(&format!("F = {}", first.expression()));
        let third = again.minimize().unwrap();
        assert_eq!(first.complexity(), third.complexity(), "{}", text);
    }
}

#[test]
fn test_never_more_complex_than_input() {
    for text in SAMPLES {
        let mut eq = synthesized(text);
        let before = eq.terms().literals().len();
        let after = eq.minimize().unwrap().complexity();
        assert!(after <= before, "{}: {} > {}", text, after, before);
    }
}

#[test]
fn test_majority_function() {
    let mut eq = synthesized("F = a*b + b*c + a*c + a*b*c");
    assert_eq!(eq.minimize().unwrap().expression(), "a*b + a*c + b*c");
}

#[test]
fn test_product_of_sums_form() {
    let table = synthesized("F = a*b + a*c").table().unwrap().clone();
    let pos = minimize::minimize(&table, Form::Pos);
    assert_eq!(pos.form(), Form::Pos);
    assert_eq!(pos.complexity(), 3);
    assert_eq!(pos.expression(), "(b+c) * a");
}

// ========== Technology mapping ==========

#[test]
fn test_mapping_matches_table() {
    for arity in [LutArity::Four, LutArity::Six] {
        for text in SAMPLES {
            let mut eq = synthesized(text);
            eq.minimize();
            let table = eq.table().unwrap().clone();
            let mapping = eq.map(arity, &MappingOptions::default()).unwrap();

            for lut in mapping.luts() {
                assert_eq!(lut.config.len(), arity.config_len());
                assert!(lut.inputs.len() <= arity.inputs());
            }
            for values in assignments(table.width()) {
                assert_eq!(
                    mapping.simulate(table.literals(), &values),
                    Some(table.evaluate(&values)),
                    "{} at arity {}",
                    text,
                    arity.inputs()
                );
            }
        }
    }
}

#[test]
fn test_mapping_requires_synthesis() {
    let mut eq = Equation::parse("F = a*b").unwrap();
    assert!(eq.map(LutArity::Four, &MappingOptions::default()).is_err());
}
