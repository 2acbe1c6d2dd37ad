//! Resolved quota tree nodes and their runtime growth.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use super::QuotaError;
use crate::question::Question;

/// What a quota node draws from.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Draw `taken` questions from this tag-filtered bank.
    Leaf { bank: Vec<Arc<Question>> },
    /// Split `taken` among the children.
    Branch { children: Vec<QuotaNode> },
}

/// One node of a resolved quota tree.
///
/// `min` and `max` are concrete. `taken` is the per-attempt count and is only
/// ever changed through [`QuotaNode::increment_one`], so a branch's `taken`
/// always equals the sum over its children.
#[derive(Debug, Clone)]
pub struct QuotaNode {
    pub lemma: String,
    pub min: usize,
    pub max: usize,
    pub taken: usize,
    pub kind: NodeKind,
}

impl QuotaNode {
    #[must_use]
    pub fn leaf(lemma: impl Into<String>, min: usize, max: usize, bank: Vec<Arc<Question>>) -> Self {
        Self { lemma: lemma.into(), min, max, taken: 0, kind: NodeKind::Leaf { bank } }
    }

    #[must_use]
    pub fn branch(
        lemma: impl Into<String>,
        min: usize,
        max: usize,
        children: Vec<QuotaNode>,
    ) -> Self {
        Self { lemma: lemma.into(), min, max, taken: 0, kind: NodeKind::Branch { children } }
    }

    #[must_use]
    pub fn bank(&self) -> Option<&[Arc<Question>]> {
        match &self.kind {
            NodeKind::Leaf { bank } => Some(bank),
            NodeKind::Branch { .. } => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[QuotaNode] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Branch { children } => children,
        }
    }

    #[must_use]
    pub fn can_grow(&self) -> bool {
        self.taken < self.max
    }

    #[must_use]
    pub fn has_to_grow(&self) -> bool {
        self.taken < self.min
    }

    /// Every node has either a non-empty bank or non-empty children.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf { bank } => !bank.is_empty(),
            NodeKind::Branch { children } => {
                !children.is_empty() && children.iter().all(QuotaNode::is_correct)
            }
        }
    }

    /// First node (depth first) breaking the bank/children rule.
    #[must_use]
    pub fn first_incorrect(&self) -> Option<&QuotaNode> {
        match &self.kind {
            NodeKind::Leaf { bank } if bank.is_empty() => Some(self),
            NodeKind::Leaf { .. } => None,
            NodeKind::Branch { children } if children.is_empty() => Some(self),
            NodeKind::Branch { children } => children.iter().find_map(QuotaNode::first_incorrect),
        }
    }

    /// Take one more question somewhere below this node.
    ///
    /// Branches first serve the last child still under its minimum; once
    /// every minimum holds, a uniformly random growable child is chosen.
    pub fn increment_one<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), QuotaError> {
        if !self.can_grow() {
            return Err(QuotaError::CannotGrow { lemma: self.lemma.clone(), max: self.max });
        }

        if let NodeKind::Branch { children } = &mut self.kind {
            let target = match children.iter().rposition(QuotaNode::has_to_grow) {
                Some(pos) => pos,
                None => {
                    let growable: Vec<usize> = children
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.can_grow())
                        .map(|(i, _)| i)
                        .collect();
                    if growable.is_empty() {
                        return Err(QuotaError::NoGrowableChild(self.lemma.clone()));
                    }
                    growable[rng.gen_range(0..growable.len())]
                }
            };
            children[target].increment_one(rng)?;
        }

        self.taken += 1;
        Ok(())
    }

    /// Grow until `taken == amount`.
    pub fn fill_to<R: Rng + ?Sized>(&mut self, amount: usize, rng: &mut R) -> Result<(), QuotaError> {
        if amount < self.min || amount > self.max {
            return Err(QuotaError::AmountOutOfRange { amount, min: self.min, max: self.max });
        }
        while self.taken < amount {
            self.increment_one(rng)?;
        }
        Ok(())
    }

    /// Reset every `taken` in the subtree to zero.
    pub fn reset(&mut self) {
        self.taken = 0;
        if let NodeKind::Branch { children } = &mut self.kind {
            children.iter_mut().for_each(QuotaNode::reset);
        }
    }

    /// Leaves in traversal order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&QuotaNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a QuotaNode>) {
        match &self.kind {
            NodeKind::Leaf { .. } => out.push(self),
            NodeKind::Branch { children } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{pad}{} [{}:{}] -> {}", self.lemma, self.min, self.max, self.taken)?;
        match &self.kind {
            NodeKind::Leaf { bank } => writeln!(f, "{pad}  bank: {}", bank.len()),
            NodeKind::Branch { children } => {
                for child in children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for QuotaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
