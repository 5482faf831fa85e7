//! End-to-end tests for compiling equation batches onto a fabric

use lut_synth::*;
use std::collections::HashSet;

fn lut<'a>(fabric: &'a FabricState, name: &str) -> &'a LutRecord {
    fabric
        .luts
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| panic!("no LUT named {}", name))
}

// ========== Worked examples ==========

#[test]
fn test_already_minimal_equation() {
    let fabric = compile(&["F = a*b + a'*b'"], 1, 4, None).unwrap();
    assert_eq!(fabric.equations[0].expression, "a*b + a'*b'");
    assert_eq!(fabric.luts.len(), 1);
    // a b -> 1 0 0 1
    assert_eq!(fabric.luts[0].config, "1001000000000000");
}

#[test]
fn test_merge_on_one_literal() {
    let fabric = compile(&["F = a*b*c + a*b*c'"], 1, 4, None).unwrap();
    assert_eq!(fabric.equations[0].expression, "a*b");
    assert_eq!(fabric.luts[0].inputs, vec!["a", "b"]);
    assert_eq!(fabric.luts[0].config, "0001000000000000");
}

#[test]
fn test_single_literal() {
    for (arity, len) in [(4, 16), (6, 64)] {
        let fabric = compile(&["F = a"], 1, arity, None).unwrap();
        let config = &fabric.luts[0].config;
        assert_eq!(config.len(), len);
        assert_eq!(&config[..2], "01");
        assert!(config[2..].chars().all(|c| c == '0'));
    }
}

#[test]
fn test_lut_budget() {
    let fabric = compile(&["F = a*b"], 1, 4, None).unwrap();
    assert_eq!(fabric.utilization.luts_used, 1);

    let err = compile(&["F = a*b"], 0, 4, None).unwrap_err();
    assert!(matches!(
        err,
        CompileError::InsufficientCapacity {
            resource: Resource::Luts,
            ..
        }
    ));
}

#[test]
fn test_consumer_right_of_producer() {
    let fabric = compile(&["F = c*d", "G = F + a*b"], 4, 4, None).unwrap();
    assert_eq!(fabric.policy, PlacementPolicy::Constrained);
    let f = lut(&fabric, "F.l0").location.unwrap();
    let g = lut(&fabric, "G.l0").location.unwrap();
    assert!(g.col > f.col, "G at {} is not right of F at {}", g, f);
}

// ========== Whole-batch behavior ==========

#[test]
fn test_every_lut_placed_once() {
    let fabric = compile(
        &["F = a*b + c", "G = a' + d*e", "H = b*c*d*e", "K = a*b*c*d*e*f"],
        16,
        4,
        None,
    )
    .unwrap();
    assert_eq!(fabric.policy, PlacementPolicy::Free);

    let mut seen = HashSet::new();
    for (index, lut) in fabric.luts.iter().enumerate() {
        let at = lut.location.expect("every LUT is placed");
        assert!(seen.insert(at), "two LUTs share {}", at);
        assert_eq!(fabric.layout[at.row][at.col], Cell::Lut(index));
        assert_eq!(lut.config.len(), 16);
    }
    assert_eq!(fabric.utilization.luts_used, fabric.luts.len());
    fabric.check_consistency().unwrap();
}

#[test]
fn test_wide_function_uses_mux_luts() {
    let fabric = compile(&["F = a*b*c + d*e*f"], 16, 4, None).unwrap();
    assert!(fabric.luts.len() > 1);
    assert!(fabric.luts.iter().any(|l| l.role == LutRole::Mux));
    let drivers: Vec<_> = fabric.luts.iter().filter(|l| l.output == "F").collect();
    assert_eq!(drivers.len(), 1);
    assert_eq!(fabric.outputs, vec!["F"]);
}

#[test]
fn test_same_function_fits_one_six_input_lut() {
    let fabric = compile(&["F = a*b*c + d*e*f"], 1, 6, None).unwrap();
    assert_eq!(fabric.luts.len(), 1);
    assert_eq!(fabric.luts[0].config.len(), 64);
}

#[test]
fn test_chain_is_ordered_by_columns() {
    let fabric = compile(
        &["D = C*e", "A = a*b", "C = B + d", "B = A*c"],
        4,
        4,
        None,
    )
    .unwrap();
    for consumer in &fabric.luts {
        let to = consumer.location.unwrap().col;
        for input in &consumer.inputs {
            if let Some(producer) = fabric.luts.iter().find(|l| &l.output == input) {
                assert!(producer.location.unwrap().col < to);
            }
        }
    }
    assert_eq!(fabric.outputs.len(), 4);
}

#[test]
fn test_redefined_output_is_renamed() {
    let fabric = compile(&["F = a*b", "F = F + c", "G = F'"], 4, 4, None).unwrap();
    let outputs: Vec<&str> = fabric.equations.iter().map(|e| e.output.as_str()).collect();
    assert_eq!(outputs, vec!["F", "F_1", "G"]);
    assert_eq!(lut(&fabric, "F_1.l0").inputs, vec!["F", "c"]);
    assert_eq!(lut(&fabric, "G.l0").inputs, vec!["F_1"]);
}

#[test]
fn test_self_reference_is_unresolved() {
    let err = compile(&["F = F*a"], 4, 4, None).unwrap_err();
    assert!(matches!(err, CompileError::UnresolvedLiteral { .. }));
}

#[test]
fn test_constant_functions() {
    let fabric = compile(&["T = a + a'", "Z = a*a'"], 4, 4, None).unwrap();
    assert_eq!(fabric.equations[0].expression, "1");
    assert_eq!(fabric.equations[1].expression, "0");
    // Constants read no literals
    assert!(fabric.luts.iter().all(|l| l.inputs.is_empty()));
    assert!(fabric.luts[0].config.starts_with('1'));
    assert!(fabric.luts[1].config.chars().all(|c| c == '0'));
}

#[test]
fn test_parenthesized_input() {
    let fabric = compile(&["F = (a + b) * (a + c)"], 1, 4, None).unwrap();
    assert_eq!(fabric.luts.len(), 1);
    // a + b*c over a b c
    assert_eq!(&fabric.luts[0].config[..8], "00011111");
}

#[test]
fn test_without_minimization() {
    let mut config = CompileConfig::new(2, 4);
    config.minimize = false;
    let fabric = compile_with(&["F = a*b*c + a*b*c'"], &config).unwrap();
    assert_eq!(fabric.equations[0].expression, "a*b*c + a*b*c'");
    assert_eq!(fabric.luts[0].inputs, vec!["a", "b", "c"]);
}

#[test]
fn test_failure_leaves_nothing_behind() {
    let err = compile(&["F = a*b", "G = c*"], 4, 4, None).unwrap_err();
    assert!(matches!(err, CompileError::MalformedExpression { .. }));
    let io: std::io::Error = err.into();
    assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
}
