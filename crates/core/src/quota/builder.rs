//! Resolve a [`QuotaSpec`] against a question bank.

use std::sync::Arc;

use tracing::debug;

use super::QuotaError;
use super::node::{NodeKind, QuotaNode};
use super::spec::{Bound, QuotaSpec, int_range, parse_range};
use crate::question::Question;
use crate::tags::{TagQuery, look_compatible_questions};

/// A spec position before it is placed in the tree.
///
/// Plain ranges and tag leaves stay unresolved until they are either paired
/// in a mapping or placed on their own.
enum Built {
    Range { lemma: String, min: usize, max: Bound },
    Tag { lemma: String, bank: Vec<Arc<Question>> },
    Node(QuotaNode),
}

impl Built {
    fn lemma(&self) -> &str {
        match self {
            Built::Range { lemma, .. } | Built::Tag { lemma, .. } => lemma,
            Built::Node(node) => &node.lemma,
        }
    }
}

/// Build the quota tree for `spec` over `bank`.
///
/// The result may still be incorrect (a bounded count standing alone has no
/// questions to draw); check [`QuotaNode::is_correct`] before sampling.
pub fn build(spec: &QuotaSpec, bank: &[Arc<Question>]) -> Result<QuotaNode, QuotaError> {
    let root = place(build_any(spec, bank)?)?;
    debug!(lemma = %root.lemma, min = root.min, max = root.max, "quota tree built");
    Ok(root)
}

fn build_any(spec: &QuotaSpec, bank: &[Arc<Question>]) -> Result<Built, QuotaError> {
    match spec {
        QuotaSpec::IntLiteral(n) => {
            let (min, max) = int_range(*n);
            Ok(Built::Range { lemma: n.to_string(), min, max })
        }
        QuotaSpec::RangeText(text) => {
            let (min, max) = parse_range(text)?;
            Ok(Built::Range { lemma: text.clone(), min, max })
        }
        QuotaSpec::TagText(text) => {
            let query = TagQuery::parse(text)?;
            let found = look_compatible_questions(&query, bank)?;
            if found.is_empty() {
                return Err(QuotaError::NoQuestions(text.clone()));
            }
            debug!(query = %text, matches = found.len(), "tag leaf resolved");
            Ok(Built::Tag { lemma: text.clone(), bank: found })
        }
        QuotaSpec::Sequence(items) => {
            let children = items
                .iter()
                .map(|item| place(build_any(item, bank)?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Built::Node(summed("ARRAY", children)))
        }
        QuotaSpec::SingleKeyMap(key, value) => {
            Ok(Built::Node(combine(build_any(key, bank)?, build_any(value, bank)?)?))
        }
        QuotaSpec::MultiKeyMap(pairs) => {
            let children = pairs
                .iter()
                .map(|(k, v)| combine(build_any(k, bank)?, build_any(v, bank)?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Built::Node(summed("DICT", children)))
        }
    }
}

/// Turn a position into a node on its own.
fn place(built: Built) -> Result<QuotaNode, QuotaError> {
    match built {
        Built::Range { lemma, min, max: Bound::Finite(max) } => {
            Ok(QuotaNode::branch(lemma, min, max, Vec::new()))
        }
        Built::Range { lemma, max: Bound::Unbounded, .. } => Err(QuotaError::Unresolved(lemma)),
        Built::Tag { lemma, bank } => Ok(QuotaNode::leaf(lemma, 1, 1, bank)),
        Built::Node(node) => Ok(node),
    }
}

fn summed(kind: &str, children: Vec<QuotaNode>) -> QuotaNode {
    let min = children.iter().map(|c| c.min).sum();
    let max = children.iter().map(|c| c.max).sum();
    let first = children.first().map_or("", |c| c.lemma.as_str());
    let lemma = format!("{kind}[{first},...]");
    QuotaNode::branch(lemma, min, max, children)
}

/// Pair the key and value of a mapping entry into one node.
fn combine(key: Built, value: Built) -> Result<QuotaNode, QuotaError> {
    let key_lemma = key.lemma().to_string();
    let value_lemma = value.lemma().to_string();

    match (key, value) {
        (Built::Tag { lemma, bank }, Built::Range { min, max, .. })
        | (Built::Range { min, max, .. }, Built::Tag { lemma, bank }) => {
            let own = (0, Bound::Finite(bank.len()));
            let (min, max) = merge(&lemma, own, (min, max))?;
            Ok(QuotaNode::leaf(lemma, min, max, bank))
        }
        (Built::Range { min, max, .. }, Built::Node(node))
            if matches!(&node.kind, NodeKind::Branch { children } if !children.is_empty()) =>
        {
            let (min, max) = merge(&node.lemma, (min, max), (node.min, Bound::Finite(node.max)))?;
            Ok(QuotaNode { min, max, ..node })
        }
        _ => Err(QuotaError::InvalidPairing { key: key_lemma, value: value_lemma }),
    }
}

/// Narrow `own` by `sub`; an unbounded side of `sub` takes `own`'s bound.
fn merge(
    lemma: &str,
    own: (usize, Bound),
    sub: (usize, Bound),
) -> Result<(usize, usize), QuotaError> {
    let sub_max = match sub.1 {
        Bound::Unbounded => own.1,
        bound => bound,
    };
    let min = own.0.max(sub.0);
    let max = match (own.1, sub_max) {
        (Bound::Finite(a), Bound::Finite(b)) => a.min(b),
        (Bound::Finite(n), Bound::Unbounded) | (Bound::Unbounded, Bound::Finite(n)) => n,
        (Bound::Unbounded, Bound::Unbounded) => {
            return Err(QuotaError::Unresolved(lemma.to_string()));
        }
    };
    if max < min {
        return Err(QuotaError::EmptyRange { lemma: lemma.to_string(), min, max });
    }
    Ok((min, max))
}
