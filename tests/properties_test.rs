use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::json;

use tdviewer::core::row::Row;
use tdviewer::query::{match_field_query, match_pattern, FieldQuery};
use tdviewer::table::{ProcessingConfig, TableDataProcessor};

fn name_rows(names: &[String]) -> Vec<Row> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Row::from_json(json!({"name": name, "n": i, "nested": {"tag": name}})))
        .collect()
}

proptest! {
    // an empty query matches everything, negated or not, so only non-empty ones flip
    #[test]
    fn negation_inverts_non_empty_queries(value in "[a-zA-Z ]{0,16}", query in "[a-z]{1,4}", regex in any::<bool>()) {
        let mut fq = FieldQuery::new(query);
        if regex {
            fq = fq.regex();
        }
        let negated = fq.clone().negate();
        prop_assert_eq!(match_field_query(&value, &negated), !match_field_query(&value, &fq));
    }

    #[test]
    fn braced_placeholder_captures_text_between_literals(s in "[a-z0-9 ]{1,20}") {
        let text = format!("key={};", s);
        let captures = match_pattern(&text, "key=${x};").unwrap();
        prop_assert_eq!(&captures["x"], &s);
    }

    #[test]
    fn processing_is_deterministic(names in proptest::collection::vec("[a-c]{1,3}", 0..12), query in "[a-c]{0,2}") {
        let processor = TableDataProcessor::default();
        let mut fqs = IndexMap::new();
        fqs.insert("nested".to_string(), FieldQuery::default().with_extended_fields("tag: $.tag"));
        fqs.insert("tag".to_string(), FieldQuery::new(query));
        let config = ProcessingConfig::new(&fqs, &[]);

        let rows = name_rows(&names);
        let first = processor.process_data(&rows, &config);
        let second = processor.process_data(&rows, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn adding_a_filter_never_adds_rows(names in proptest::collection::vec("[a-c]{1,3}", 0..12), query in "[a-c]{1,2}") {
        let processor = TableDataProcessor::default();
        let rows = name_rows(&names);

        let none = IndexMap::new();
        let unfiltered = processor.process_data(&rows, &ProcessingConfig::new(&none, &[]));

        let mut fqs = IndexMap::new();
        fqs.insert("name".to_string(), FieldQuery::new(query));
        let filtered = processor.process_data(&rows, &ProcessingConfig::new(&fqs, &[]));

        prop_assert!(filtered.data.len() <= unfiltered.data.len());
        for row in &filtered.data {
            prop_assert!(unfiltered.data.contains(row));
        }
    }
}
