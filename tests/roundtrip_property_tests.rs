use flatrec::handler_for_tag;
use flatrec::types::{Record, RecordSet};
use proptest::prelude::*;
use proptest::sample::Index;

fn field_name_strategy() -> impl Strategy<Value = String> {
    // Prefixed so the generated field can never collide with "id".
    proptest::string::string_regex("[a-z][a-z0-9_]{0,12}")
        .expect("valid field name regex")
        .prop_map(|name| format!("f_{}", name))
}

fn value_strategy() -> impl Strategy<Value = String> {
    // No leading or trailing whitespace: XML text nodes are trimmed on read.
    // Commas and quotes exercise CSV quoting; angle brackets and ampersands
    // exercise XML escaping.
    proptest::string::string_regex(
        "[A-Za-z0-9&<>\"',\\.!\\?]([A-Za-z0-9 &<>\"',\\.!\\?_\\-]{0,26}[A-Za-z0-9&<>\"',\\.!\\?])?",
    )
    .expect("valid value regex")
}

fn dataset_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        field_name_strategy(),
        prop::collection::vec(value_strategy(), 1..8),
    )
}

fn build_records(field: &str, values: &[String]) -> RecordSet {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            Record::new()
                .with_text("id", i.to_string())
                .with_text(field, value.clone())
        })
        .collect()
}

fn create_all(tag: &str, path: &std::path::Path, records: &[Record]) -> Result<(), TestCaseError> {
    let handler = handler_for_tag(tag, path).map_err(|e| TestCaseError::fail(e.to_string()))?;
    for record in records {
        handler
            .create(record.clone())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    }
    Ok(())
}

fn read_all(tag: &str, path: &std::path::Path) -> Result<RecordSet, TestCaseError> {
    let handler = handler_for_tag(tag, path).map_err(|e| TestCaseError::fail(e.to_string()))?;
    handler.read().map_err(|e| TestCaseError::fail(e.to_string()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn json_create_read_roundtrip_preserves_records((field, values) in dataset_strategy()) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = tmp.path().join("records.json");

        let seed = build_records(&field, &values);
        create_all("json", &path, &seed)?;

        prop_assert_eq!(read_all("json", &path)?, seed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn csv_create_read_roundtrip_preserves_records((field, values) in dataset_strategy()) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = tmp.path().join("records.csv");

        let seed = build_records(&field, &values);
        create_all("csv", &path, &seed)?;

        prop_assert_eq!(read_all("csv", &path)?, seed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn xml_create_read_roundtrip_preserves_records((field, values) in dataset_strategy()) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = tmp.path().join("records.xml");

        let seed = build_records(&field, &values);
        create_all("xml", &path, &seed)?;

        prop_assert_eq!(read_all("xml", &path)?, seed);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn delete_removes_exactly_the_targeted_id(
        (field, values) in dataset_strategy(),
        target in any::<Index>(),
    ) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let seed = build_records(&field, &values);
        let target_id = target.index(seed.len()).to_string();

        for tag in ["json", "csv", "xml"] {
            let path = tmp.path().join(format!("records.{}", tag));
            create_all(tag, &path, &seed)?;

            let handler = handler_for_tag(tag, &path)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            handler
                .delete(&target_id)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            let expected: RecordSet = seed
                .iter()
                .filter(|r| r.id() != Some(target_id.as_str()))
                .cloned()
                .collect();
            prop_assert_eq!(read_all(tag, &path)?, expected);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn update_touches_exactly_the_targeted_record(
        (field, values) in dataset_strategy(),
        new_value in value_strategy(),
        target in any::<Index>(),
    ) {
        let tmp = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let seed = build_records(&field, &values);
        let target_index = target.index(seed.len());
        let target_id = target_index.to_string();

        let mut expected = seed.clone();
        expected[target_index].set_text(&field, new_value.clone());

        for tag in ["json", "csv", "xml"] {
            let path = tmp.path().join(format!("records.{}", tag));
            create_all(tag, &path, &seed)?;

            let handler = handler_for_tag(tag, &path)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let payload = Record::new()
                .with_text("id", target_id.clone())
                .with_text(&field, new_value.clone());
            handler
                .update(&payload)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(read_all(tag, &path)?, expected.clone());
        }
    }
}
