mod common;

use common::{TestResult, init_logging};
use docprep::{
    DataSource, DocumentPreprocessor, InMemoryRowProvider, IteratorDataSource, Node,
    PreprocessConfig, PreprocessError, RowProvider, SourceError, TableNode, TableQuery,
};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug)]
struct FailingProvider;

impl RowProvider for FailingProvider {
    fn open(&self, _query: &TableQuery) -> Result<Box<dyn DataSource>, SourceError> {
        let rows = vec![
            Ok(json!({ "name": "first" })),
            Err(SourceError::Row("connection reset".into())),
        ];
        Ok(Box::new(IteratorDataSource::new(rows.into_iter())))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn people() -> Arc<InMemoryRowProvider> {
    let provider = InMemoryRowProvider::new();
    provider
        .add(
            "SELECT * FROM people",
            vec![
                json!({ "name": "Ada", "role": "analyst" }),
                json!({ "name": "Linus" }),
            ],
        )
        .unwrap();
    Arc::new(provider)
}

fn table(doc_root: &Node) -> &TableNode {
    match doc_root {
        Node::Table(table) => table,
        other => panic!("expected table, got {}", other.kind()),
    }
}

#[tokio::test]
async fn test_fetched_rows_are_projected_and_normalized() -> TestResult {
    init_logging();
    let preprocessor = DocumentPreprocessor::builder()
        .with_row_provider(people())
        .build();
    let doc = preprocessor
        .preprocess(json!({
            "table": { "headerRows": 1, "body": [["Name", "Role"]] },
            "data": {
                "connection": { "host": "db.local" },
                "query": "SELECT * FROM people",
                "columns": [{ "text": "name", "id": "name-cell", "italics": true }, "role"]
            },
            "layout": "lightHorizontalLines"
        }))
        .await;

    // Every projected row copies the template, ids included.
    let err = doc.expect_err("template ids repeat across rows");
    assert!(matches!(err, PreprocessError::DuplicateIdentifier(_)));

    let doc = preprocessor
        .preprocess(json!({
            "table": { "headerRows": 1, "body": [["Name", "Role"]] },
            "data": {
                "query": "SELECT * FROM people",
                "columns": [{ "text": "name", "italics": true }, "role"]
            },
            "layout": "lightHorizontalLines"
        }))
        .await?;
    let table = table(&doc.root);
    assert_eq!(table.body.len(), 3);
    assert_eq!(
        doc.to_value()["table"]["body"],
        json!([
            [{ "text": "Name" }, { "text": "Role" }],
            [{ "text": "Ada", "italics": true }, { "text": "analyst" }],
            [{ "text": "Linus", "italics": true }, { "text": "" }]
        ])
    );
    assert_eq!(doc.to_value()["layout"], json!("lightHorizontalLines"));
    assert!(doc.to_value().get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn test_source_failure_aborts_the_run() {
    init_logging();
    let preprocessor = DocumentPreprocessor::builder()
        .with_row_provider(Arc::new(FailingProvider))
        .build();
    let err = preprocessor
        .preprocess(json!({
            "table": { "body": [] },
            "data": { "query": "anything", "columns": ["name"] }
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, PreprocessError::DataSource(SourceError::Row(_))));
}

#[tokio::test]
async fn test_custom_event_name() -> TestResult {
    init_logging();
    let config = PreprocessConfig {
        table_data_event: "rows".into(),
        ..Default::default()
    };
    let preprocessor = DocumentPreprocessor::builder()
        .with_config(config)
        .with_row_provider(people())
        .build();
    assert_eq!(preprocessor.event_bus().listener_count("rows"), 1);
    assert_eq!(preprocessor.event_bus().listener_count("tableData"), 0);

    let doc = preprocessor
        .preprocess(json!({
            "table": { "body": [] },
            "data": { "query": "SELECT * FROM people", "columns": ["name"] }
        }))
        .await?;
    assert_eq!(table(&doc.root).body.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_nested_data_tables_each_fetch() -> TestResult {
    init_logging();
    let preprocessor = DocumentPreprocessor::builder()
        .with_row_provider(people())
        .build();
    let spec = json!({ "query": "SELECT * FROM people", "columns": ["name"] });
    let doc = preprocessor
        .preprocess(json!([
            { "table": { "body": [] }, "data": spec.clone() },
            { "table": { "body": [["static"]] }, "data": spec }
        ]))
        .await?;
    let Node::Stack(stack) = &doc.root else {
        return Err("expected stack".into());
    };
    let sizes: Vec<usize> = stack.children.iter().map(|t| table(t).body.len()).collect();
    assert_eq!(sizes, vec![2, 3]);
    Ok(())
}

#[test]
fn test_blocking_entry_point_drives_the_provider() -> TestResult {
    init_logging();
    let preprocessor = DocumentPreprocessor::builder()
        .with_row_provider(people())
        .build();
    let doc = preprocessor.preprocess_blocking(json!({
        "table": { "body": [] },
        "data": { "query": "SELECT * FROM people", "columns": ["role"] }
    }))?;
    let cells: Vec<Value> = table(&doc.root)
        .body
        .iter()
        .map(|row| row[0].as_node().map(Node::to_value).unwrap_or(Value::Null))
        .collect();
    assert_eq!(cells, vec![json!({ "text": "analyst" }), json!({ "text": "" })]);
    Ok(())
}
