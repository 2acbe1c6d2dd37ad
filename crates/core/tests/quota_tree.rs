use std::sync::Arc;

use insta::assert_snapshot;
use randexam_core::question::{Question, QuestionBuilder};
use randexam_core::quota::{QuotaError, QuotaNode, QuotaSpec, build};
use randexam_core::rng::seeded;
use rstest::rstest;

fn bank() -> Vec<Arc<Question>> {
    let mut out = Vec::new();
    for (tag, count) in [("algebra", 3), ("geometry", 2), ("intro", 1)] {
        for i in 0..count {
            out.push(Arc::new(QuestionBuilder::new(format!("{tag}{i}")).tag(tag).tag("all").build()));
        }
    }
    out
}

fn tree(yaml: &str) -> QuotaNode {
    build(&QuotaSpec::from_yaml(yaml).unwrap(), &bank()).unwrap()
}

fn check_invariants(node: &QuotaNode) {
    assert!(node.min <= node.taken && node.taken <= node.max, "{node}");
    if !node.children().is_empty() {
        let sum: usize = node.children().iter().map(|c| c.taken).sum();
        assert_eq!(sum, node.taken, "{node}");
        node.children().iter().for_each(check_invariants);
    }
}

#[test]
fn tree_dump() {
    let node = tree("{algebra: '1-2', geometry: 1}");
    assert_snapshot!(node.to_string().trim_end(), @r"
    DICT[algebra,...] [2:3] -> 0
      algebra [1:2] -> 0
        bank: 3
      geometry [1:1] -> 0
        bank: 2
    ");
}

#[rstest]
#[case::flat_mapping("{algebra: '1-2', geometry: '*'}")]
#[case::sequence("[intro, {algebra: '+'}, {geometry: '?'}]")]
#[case::nested("{'2-4': [{algebra: '*'}, {geometry: '*'}], intro: 1}")]
#[case::either_order("{2: algebra, 1: geometry}")]
fn fill_to_respects_every_range(#[case] yaml: &str) {
    let template = tree(yaml);
    assert!(template.is_correct());

    let mut rng = seeded(99);
    for total in template.min..=template.max {
        for _ in 0..5 {
            let mut node = template.clone();
            node.fill_to(total, &mut rng).unwrap();
            assert_eq!(node.taken, total);
            check_invariants(&node);
        }
    }
}

#[rstest]
#[case::short_bank("{geometry: 3}")]
#[case::inverted_range("{algebra: '3-1'}")]
fn empty_ranges_are_configuration_errors(#[case] yaml: &str) {
    let err = QuotaSpec::from_yaml(yaml)
        .and_then(|spec| build(&spec, &bank()))
        .unwrap_err();
    assert!(matches!(err, QuotaError::EmptyRange { .. }), "{err:?}");
}

#[test]
fn malformed_tag_query_is_reported() {
    let err = build(&QuotaSpec::from_yaml("'algebra &'").unwrap(), &bank()).unwrap_err();
    assert!(matches!(err, QuotaError::Query(_)), "{err:?}");
}

#[test]
fn leaves_are_listed_in_traversal_order() {
    let node = tree("[intro, {algebra: 2}, {geometry: 1}]");
    let lemmas: Vec<&str> = node.leaves().iter().map(|l| l.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["intro", "algebra", "geometry"]);
}
