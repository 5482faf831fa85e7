//! De Morgan normalization of parenthesized terms
//!
//! The grammar produces a [`Node`] tree. Normalization rewrites it in two
//! steps: negations are pushed down to the literals (swapping AND and OR on
//! the way, cancelling double negations), then the tree is flattened either
//! into a product of sums (when it already has that shape) or into a sum of
//! products by distributing AND over OR.

use super::error::ParseErrorKind;
use super::{Form, Operator, TermList};
use std::sync::Arc;

/// Upper bound on product terms produced by distribution
pub const MAX_EXPANDED_TERMS: usize = 4096;

/// Parse tree produced by the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(String),
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Lit {
    name: Arc<str>,
    negated: bool,
}

/// Negation normal form: NOT only appears on literals
#[derive(Debug, Clone, PartialEq, Eq)]
enum Nnf {
    Lit(Lit),
    And(Vec<Nnf>),
    Or(Vec<Nnf>),
}

fn push_negation(node: &Node, negate: bool) -> Nnf {
    match node {
        Node::Literal(name) => Nnf::Lit(Lit {
            name: Arc::from(name.as_str()),
            negated: negate,
        }),
        Node::Not(inner) => push_negation(inner, !negate),
        Node::And(l, r) => {
            let children = vec![push_negation(l, negate), push_negation(r, negate)];
            // ~(A * B) = ~A + ~B
            if negate {
                join(children, false)
            } else {
                join(children, true)
            }
        }
        Node::Or(l, r) => {
            let children = vec![push_negation(l, negate), push_negation(r, negate)];
            // ~(A + B) = ~A * ~B
            if negate {
                join(children, true)
            } else {
                join(children, false)
            }
        }
    }
}

/// Build an AND (`conjunction`) or OR node, absorbing children of the same kind
fn join(children: Vec<Nnf>, conjunction: bool) -> Nnf {
    let mut flat = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Nnf::And(grand) if conjunction => flat.extend(grand),
            Nnf::Or(grand) if !conjunction => flat.extend(grand),
            other => flat.push(other),
        }
    }
    if conjunction {
        Nnf::And(flat)
    } else {
        Nnf::Or(flat)
    }
}

fn as_clause(node: &Nnf) -> Option<Vec<Lit>> {
    match node {
        Nnf::Lit(lit) => Some(vec![lit.clone()]),
        Nnf::Or(children) => children
            .iter()
            .map(|c| match c {
                Nnf::Lit(lit) => Some(lit.clone()),
                _ => None,
            })
            .collect(),
        Nnf::And(_) => None,
    }
}

fn as_product_of_sums(node: &Nnf) -> Option<Vec<Vec<Lit>>> {
    let Nnf::And(children) = node else {
        return None;
    };
    if !children.iter().any(|c| matches!(c, Nnf::Or(_))) {
        return None;
    }
    children.iter().map(as_clause).collect()
}

fn products(node: &Nnf) -> Result<Vec<Vec<Lit>>, ParseErrorKind> {
    match node {
        Nnf::Lit(lit) => Ok(vec![vec![lit.clone()]]),
        Nnf::Or(children) => {
            let mut out = Vec::new();
            for child in children {
                out.extend(products(child)?);
                if out.len() > MAX_EXPANDED_TERMS {
                    return Err(ParseErrorKind::ExpansionLimit);
                }
            }
            Ok(out)
        }
        Nnf::And(children) => {
            let mut acc: Vec<Vec<Lit>> = vec![Vec::new()];
            for child in children {
                let rhs = products(child)?;
                if acc.len().saturating_mul(rhs.len()) > MAX_EXPANDED_TERMS {
                    return Err(ParseErrorKind::ExpansionLimit);
                }
                let mut next = Vec::with_capacity(acc.len() * rhs.len());
                for left in &acc {
                    for right in &rhs {
                        let mut term = left.clone();
                        term.extend(right.iter().cloned());
                        next.push(term);
                    }
                }
                acc = next;
            }
            Ok(acc)
        }
    }
}

fn emit(groups: Vec<Vec<Lit>>, form: Form) -> TermList {
    let (inner, outer) = match form {
        Form::Sop => (Operator::And, Operator::Or),
        Form::Pos => (Operator::Or, Operator::And),
    };
    let mut literals = Vec::new();
    let mut negations = Vec::new();
    let mut operators = Vec::new();
    for (g, group) in groups.into_iter().enumerate() {
        if g > 0 {
            operators.push(outer);
        }
        for (i, lit) in group.into_iter().enumerate() {
            if i > 0 {
                operators.push(inner);
            }
            literals.push(lit.name);
            negations.push(lit.negated);
        }
    }
    TermList::from_parts(literals, negations, operators, form)
}

/// Rewrite a parse tree into a flat SOP or POS term list
pub fn normalize(node: &Node) -> Result<TermList, ParseErrorKind> {
    let nnf = push_negation(node, false);
    if let Some(clauses) = as_product_of_sums(&nnf) {
        return Ok(emit(clauses, Form::Pos));
    }
    Ok(emit(products(&nnf)?, Form::Sop))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(name: &str) -> Box<Node> {
        Box::new(Node::Literal(name.to_string()))
    }

    fn render(terms: &TermList) -> String {
        terms.to_string()
    }

    #[test]
    fn test_negated_product_becomes_sum() {
        // (a*b)' = a' + b'
        let node = Node::Not(Box::new(Node::And(lit("a"), lit("b"))));
        let terms = normalize(&node).unwrap();
        assert_eq!(terms.form(), Form::Sop);
        assert_eq!(render(&terms), "a' + b'");
    }

    #[test]
    fn test_negated_sum_becomes_product() {
        // (a + b')' = a' * b
        let node = Node::Not(Box::new(Node::Or(
            lit("a"),
            Box::new(Node::Not(lit("b"))),
        )));
        let terms = normalize(&node).unwrap();
        assert_eq!(render(&terms), "a'*b");
    }

    #[test]
    fn test_product_of_sums_is_kept() {
        // (a + b) * c
        let node = Node::And(Box::new(Node::Or(lit("a"), lit("b"))), lit("c"));
        let terms = normalize(&node).unwrap();
        assert_eq!(terms.form(), Form::Pos);
        assert_eq!(render(&terms), "(a+b) * c");
    }

    #[test]
    fn test_mixed_form_distributes() {
        // (a + b*c) * d = a*d + b*c*d
        let node = Node::And(
            Box::new(Node::Or(lit("a"), Box::new(Node::And(lit("b"), lit("c"))))),
            lit("d"),
        );
        let terms = normalize(&node).unwrap();
        assert_eq!(terms.form(), Form::Sop);
        assert_eq!(render(&terms), "a*d + b*c*d");
    }

    #[test]
    fn test_double_negation_cancels() {
        let node = Node::Not(Box::new(Node::Not(lit("a"))));
        let terms = normalize(&node).unwrap();
        assert_eq!(render(&terms), "a");
    }

    #[test]
    fn test_expansion_limit() {
        // (a0 + b0) * (a1 + b1) * ... with one negated clause so the tree is
        // not a plain product of sums: 2^13 products exceed the limit.
        let mut node = Node::Or(
            Box::new(Node::And(lit("p"), lit("q"))),
            lit("r"),
        );
        for i in 0..13 {
            let clause = Node::Or(lit(&format!("a{i}")), lit(&format!("b{i}")));
            node = Node::And(Box::new(node), Box::new(clause));
        }
        assert_eq!(normalize(&node), Err(ParseErrorKind::ExpansionLimit));
    }
}
