//! Tag expressions and bank filtering.

pub mod query;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::question::Question;

pub use query::{QueryError, QueryToken, TagQuery};

/// Evaluate `expression` against a tag set.
pub fn matches(expression: &str, tags: &BTreeSet<String>) -> Result<bool, QueryError> {
    TagQuery::parse(expression)?.matches(tags)
}

/// Questions whose tags satisfy `query`, in bank order.
pub fn look_compatible_questions(
    query: &TagQuery,
    questions: &[Arc<Question>],
) -> Result<Vec<Arc<Question>>, QueryError> {
    let mut compatible = Vec::new();
    for question in questions {
        if query.matches(&question.tags)? {
            compatible.push(Arc::clone(question));
        }
    }
    Ok(compatible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionBuilder;

    #[test]
    fn filtering_preserves_bank_order() {
        let bank: Vec<Arc<Question>> = ["q1", "q2", "q3"]
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let b = QuestionBuilder::new(*t).tag("all");
                let b = if i == 1 { b } else { b.tag("algebra") };
                Arc::new(b.build())
            })
            .collect();

        let query = TagQuery::parse("algebra").unwrap();
        let found = look_compatible_questions(&query, &bank).unwrap();
        let titles: Vec<&str> = found.iter().map(|q| q.title.as_str()).collect();
        assert_eq!(titles, vec!["q1", "q3"]);
    }

    #[test]
    fn free_function_parses_and_evaluates() {
        let set: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        assert!(matches("x", &set).unwrap());
        assert!(matches("x .", &set).is_err());
    }
}
