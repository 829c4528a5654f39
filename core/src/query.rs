//! Flat boolean retrieval: `term (AND|OR|NOT term)*`, evaluated strictly
//! left to right with no precedence and no grouping.

use crate::index::{InvertedIndex, PostingSet};
use crate::tokenizer::stem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    /// Operators are matched case-sensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Operator::And),
            "OR" => Some(Operator::Or),
            "NOT" => Some(Operator::Not),
            _ => None,
        }
    }

    fn apply(self, acc: &PostingSet, rhs: &PostingSet) -> PostingSet {
        match self {
            Operator::And => acc.intersection(rhs).copied().collect(),
            Operator::Or => acc.union(rhs).copied().collect(),
            Operator::Not => acc.difference(rhs).copied().collect(),
        }
    }
}

/// Evaluate `query` against `index`. Unknown terms match nothing; a dangling
/// trailing operator is ignored, and so is a pair led by an unknown operator.
pub fn evaluate(index: &InvertedIndex, query: &str) -> PostingSet {
    let lookup = |word: &str| index.postings(&stem(word)).cloned().unwrap_or_default();

    let parts: Vec<&str> = query.split_whitespace().collect();
    let Some((first, rest)) = parts.split_first() else {
        return PostingSet::new();
    };

    let mut result = lookup(*first);
    for pair in rest.chunks_exact(2) {
        let Some(op) = Operator::parse(pair[0]) else {
            tracing::debug!(token = pair[0], "skipping pair with unknown operator");
            continue;
        };
        result = op.apply(&result, &lookup(pair[1]));
    }
    result
}
