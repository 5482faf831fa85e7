//! Tests for the Quine-McCluskey minimizer

use super::*;
use crate::expression::{parse_flat, parse_normalized, parse_terms, ParseMode};

fn table_of(text: &str) -> TruthTable {
    let terms = parse_terms(text, ParseMode::Auto).unwrap();
    TruthTable::synthesize(&terms).unwrap()
}

/// Re-synthesize the minimized expression and compare against the original
fn assert_sound(text: &str, form: Form) {
    let table = table_of(text);
    let result = minimize(&table, form);
    let rebuilt = TruthTable::synthesize(&result.to_term_list()).unwrap();
    let expected = table.project(rebuilt.literals());
    assert_eq!(
        rebuilt.bits(),
        expected.bits(),
        "{} minimized to {}",
        text,
        result.expression()
    );
    // Every dropped literal must be irrelevant
    for (p, lit) in table.literals().iter().enumerate() {
        if !result.literals().contains(lit) {
            assert!(!table.depends_on(p), "{} dropped relevant {}", text, lit);
        }
    }
}

// ========== Cubes ==========

#[test]
fn test_cube_merge() {
    let a = Cube::minterm(0b101);
    let b = Cube::minterm(0b100);
    let merged = a.merge(&b).unwrap();
    assert_eq!(merged, Cube { bits: 0b100, mask: 0b001 });

    // Two differing positions do not merge
    assert!(Cube::minterm(0b101).merge(&Cube::minterm(0b110)).is_none());
    // Different masks do not merge
    assert!(merged.merge(&Cube::minterm(0b000)).is_none());
    // Identical cubes do not merge
    assert!(a.merge(&a).is_none());
}

#[test]
fn test_cube_covers_and_inputs() {
    let cube = Cube { bits: 0b100, mask: 0b001 };
    assert!(cube.covers(0b100));
    assert!(cube.covers(0b101));
    assert!(!cube.covers(0b110));
    assert_eq!(cube.literal_count(3), 2);
    assert_eq!(cube.inputs(3), vec![Some(true), Some(false), None]);
}

// ========== Prime Implicants and Covering ==========

#[test]
fn test_prime_implicants_cyclic() {
    // Classic cyclic function: six primes, none essential
    let minterms = [0, 1, 2, 5, 6, 7];
    let primes = prime_implicants(3, &minterms);
    assert_eq!(primes.len(), 6);
    assert!(primes.iter().all(|p| p.literal_count(3) == 2));
    assert!(essential_primes(&primes, &minterms).is_empty());

    let cover = unate_cover(3, &primes, &minterms);
    assert_eq!(cover.len(), 3);
    assert_eq!(complexity(3, &cover), 6);
    for m in minterms {
        assert!(cover.iter().any(|c| c.covers(m)));
    }
}

#[test]
fn test_prime_implicants_full_merge() {
    let primes = prime_implicants(2, &[0, 1, 2, 3]);
    assert_eq!(primes, vec![Cube { bits: 0, mask: 0b11 }]);
}

#[test]
fn test_essential_primes() {
    // f = a'b' + ab: both primes are essential
    let minterms = [0b00, 0b11];
    let primes = prime_implicants(2, &minterms);
    assert_eq!(essential_primes(&primes, &minterms), primes);
}

#[test]
fn test_essential_primes_are_kept_with_branching() {
    // f(a,b,c) = m(0,1,2,5,6,7) + m(3): b is essential after merging
    let minterms = [0, 1, 2, 3, 5, 6, 7];
    let primes = prime_implicants(3, &minterms);
    let cover = unate_cover(3, &primes, &minterms);
    for m in minterms {
        assert!(cover.iter().any(|c| c.covers(m)));
    }
    assert!(complexity(3, &cover) <= 4);
}

#[test]
fn test_greedy_cover_completes() {
    let minterms = [0, 1, 2, 5, 6, 7];
    let primes = prime_implicants(3, &minterms);
    let chosen = greedy_cover(3, &primes, &minterms);
    for m in minterms {
        assert!(chosen.iter().any(|&i| primes[i].covers(m)));
    }
}

#[test]
fn test_push_minimal_drops_supersets() {
    let mut covers = vec![BTreeSet::from([0, 1]), BTreeSet::from([2, 3])];
    push_minimal(&mut covers, BTreeSet::from([0]));
    assert_eq!(covers, vec![BTreeSet::from([2, 3]), BTreeSet::from([0])]);
    push_minimal(&mut covers, BTreeSet::from([0, 4]));
    assert_eq!(covers.len(), 2);
}

// ========== Rendering ==========

#[test]
fn test_already_minimal_sop() {
    let result = minimize(&table_of("a*b + a'*b'"), Form::Sop);
    assert_eq!(result.expression(), "a*b + a'*b'");
    assert_eq!(result.complexity(), 4);
    match result.solution() {
        Solution::Cover(cover) => assert_eq!(cover.len(), 2),
        other => panic!("expected a cover, got {:?}", other),
    }
}

#[test]
fn test_merge_removes_literal() {
    let result = minimize(&table_of("a*b*c + a*b*c'"), Form::Sop);
    assert_eq!(result.expression(), "a*b");
    let lits: Vec<&str> = result.literals().iter().map(|l| l.as_ref()).collect();
    assert_eq!(lits, vec!["a", "b"]);
}

#[test]
fn test_cubes_render_in_descending_order() {
    let result = minimize(&table_of("c' + a*b"), Form::Sop);
    // Table order is c, a, b: a*b is 0b011 and sorts before c' at 0b000
    assert_eq!(result.expression(), "a*b + c'");

    let result = minimize(&table_of("a'*b' + a*b'*c"), Form::Sop);
    assert_eq!(result.expression(), "b'*c + a'*b'");
}

#[test]
fn test_constants() {
    let zero = minimize(&table_of("a*a'"), Form::Sop);
    assert_eq!(zero.expression(), "0");
    assert_eq!(zero.solution(), &Solution::Constant(false));
    assert!(zero.literals().is_empty());

    let one = minimize(&table_of("a + a'"), Form::Sop);
    assert_eq!(one.expression(), "1");
    assert_eq!(one.solution(), &Solution::Constant(true));
    assert_eq!(one.to_term_list().form(), Form::Pos);

    // For POS an empty offset is 1
    let one = minimize(&table_of("a + a'"), Form::Pos);
    assert_eq!(one.expression(), "1");
    let zero = minimize(&table_of("a*a'"), Form::Pos);
    assert_eq!(zero.expression(), "0");
}

#[test]
fn test_product_of_sums() {
    let table = TruthTable::synthesize(&parse_normalized("(a + b) * c").unwrap()).unwrap();
    let result = minimize(&table, Form::Pos);
    assert_eq!(result.form(), Form::Pos);
    assert_eq!(result.expression(), "c * (a+b)");
    assert_eq!(result.complexity(), 3);
}

#[test]
fn test_pos_clause_negates_asserted_bits() {
    // f = a' + b' is false only at a=b=1: the single clause is (a'+b')
    let table = TruthTable::synthesize(&parse_flat("a' + b'").unwrap()).unwrap();
    let result = minimize(&table, Form::Pos);
    assert_eq!(result.expression(), "(a'+b')");
}

// ========== Soundness and Idempotence ==========

#[test]
fn test_minimization_is_sound() {
    for text in [
        "a*b + a'*b'",
        "a*b*c + a*b*c'",
        "x0*x1 + x2*x3' + x0'*x2'*x3 + x1*x3",
        "a*b + b*c + a*c",
        "A'*B'*Cin + A'*B*Cin' + A*B'*Cin' + A*B*Cin",
        "p*q*r*s + p'*q + r'*s'",
    ] {
        assert_sound(text, Form::Sop);
        assert_sound(text, Form::Pos);
    }
}

#[test]
fn test_minimization_is_idempotent() {
    for text in ["a*b + a'*b'", "a*b*c + a*b*c'", "a*b + b*c + a*c", "c' + a*b"] {
        let first = minimize(&table_of(text), Form::Sop);
        let again_table = TruthTable::synthesize(&first.to_term_list()).unwrap();
        let second = minimize(&again_table, Form::Sop);
        assert_eq!(first.complexity(), second.complexity(), "{}", text);
        assert_eq!(first.expression(), second.expression(), "{}", text);
    }
}
