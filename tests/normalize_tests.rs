mod common;

use common::{TestResult, preprocess, stack_children};
use docprep::{Node, PreprocessError, TextContent};
use serde_json::{Value, json};

#[test]
fn test_shorthand_coercion_table() -> TestResult {
    let cases: Vec<(Value, &str, &str)> = vec![
        (json!("plain"), "text", "plain"),
        (json!(7), "text", "7"),
        (json!(1.5), "text", "1.5"),
        (json!(true), "text", "true"),
        (Value::Null, "text", ""),
        (json!({}), "text", ""),
        (json!({ "text": null }), "text", ""),
    ];
    for (input, kind, text) in cases {
        let doc = preprocess(input.clone())?;
        assert_eq!(doc.root.kind(), kind, "kind of {}", input);
        assert_eq!(doc.root.plain_text(), text, "text of {}", input);
    }

    let doc = preprocess(json!(["a", 2, null]))?;
    let texts: Vec<String> = stack_children(&doc).iter().map(Node::plain_text).collect();
    assert_eq!(texts, vec!["a", "2", ""]);
    Ok(())
}

#[test]
fn test_null_text_field_keeps_other_properties() -> TestResult {
    let doc = preprocess(json!({ "text": null, "style": "caption" }))?;
    assert_eq!(doc.to_value(), json!({ "text": "", "style": "caption" }));
    Ok(())
}

#[test]
fn test_children_keep_declared_order() -> TestResult {
    let doc = preprocess(json!({
        "columns": [
            { "stack": ["a1", "a2"] },
            { "ul": ["b1", { "ol": ["b2"] }] },
            "c"
        ]
    }))?;
    assert_eq!(
        doc.to_value(),
        json!({
            "columns": [
                { "stack": [{ "text": "a1" }, { "text": "a2" }] },
                { "ul": [{ "text": "b1" }, { "ol": [{ "text": "b2" }] }] },
                { "text": "c" }
            ]
        })
    );
    Ok(())
}

#[test]
fn test_canonical_input_is_stable() -> TestResult {
    let samples = vec![
        json!({ "text": "Heading", "id": "h1", "tocItem": ["_default_"], "outline": { "level": 2, "text": "Heading" } }),
        json!({ "text": [{ "text": "bold", "bold": true }, { "text": " tail" }], "fontSize": 9 }),
        json!({ "stack": [{ "text": "see " }, { "text": "00000", "pageReference": "h1" }] }),
        json!({ "columnCount": 2, "content": [{ "text": "flowed" }] }),
        json!({ "table": { "headerRows": 1, "body": [[{ "text": "A", "colSpan": 2 }, { "_span": true }]] } }),
        json!({ "image": { "type": "Buffer", "data": [1, 2, 3] }, "fit": [10, 10] }),
        json!({ "canvas": [{ "type": "line", "x1": 0, "y1": 0, "x2": 10, "y2": 0 }] }),
        json!({ "qr": "https://example.org", "fit": 50 }),
        json!({ "toc": { "id": "_default_", "title": { "text": "Contents" } } }),
    ];

    for sample in samples {
        let first = preprocess(sample.clone())?;
        let second = preprocess(first.to_value())?;
        assert_eq!(first.root, second.root, "re-normalizing {}", sample);
        assert_eq!(first.to_value(), second.to_value());
    }
    Ok(())
}

#[test]
fn test_outline_declarations() -> TestResult {
    let doc = preprocess(json!([
        { "text": "Part", "outline": 1 },
        { "stack": ["x"], "outline": { "level": 2, "text": "Block" } },
        { "text": "Plain", "outline": false }
    ]))?;
    let children = stack_children(&doc);

    let part = children[0].meta().outline.as_ref().ok_or("missing outline")?;
    assert_eq!((part.level, part.text.as_deref()), (1, Some("Part")));

    let block = children[1].meta().outline.as_ref().ok_or("missing outline")?;
    assert_eq!((block.level, block.text.as_deref()), (2, Some("Block")));

    assert!(children[2].meta().outline.is_none());
    Ok(())
}

#[test]
fn test_inline_children_may_declare_ids() -> TestResult {
    let doc = preprocess(json!({ "text": { "text": "inner", "id": "inner" } }))?;
    let text = doc.root.as_text().ok_or("expected text")?;
    let TextContent::Inline(children) = &text.content else {
        return Err("expected inline content".into());
    };
    assert_eq!(children.len(), 1);
    assert!(doc.references.is_resolved("inner"));
    Ok(())
}

#[test]
fn test_unknown_kind_aborts_the_document() {
    let result = preprocess(json!(["fine", { "widget": "?" }]));
    match result {
        Err(PreprocessError::UnrecognizedStructure(s)) => assert!(s.contains("widget")),
        other => panic!("expected UnrecognizedStructure, got {:?}", other.map(|d| d.to_value())),
    }
}

#[test]
fn test_preprocess_str_reports_bad_json() {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let err = runtime
        .block_on(docprep::DocumentPreprocessor::default().preprocess_str("{ not json"))
        .unwrap_err();
    assert!(matches!(err, PreprocessError::Json(_)));
}
