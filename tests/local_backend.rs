// End-to-end pipelines on the in-process backend
use otelib::backends::local::{Plugin, PluginRegistry};
use otelib::pipeline::{Document, Strategy, StrategyExt, parse_document};
use otelib::{LocalStore, OteClient, OteError, StrategyKind};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

/// Write `contents` under a unique name in the temp dir and return its `file://` URL
async fn sample_file(name: &str, contents: &str) -> String {
    let path: PathBuf =
        std::env::temp_dir().join(format!("otelib-{}-{name}", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, contents).await.unwrap();
    format!("file://{}", path.display())
}

async fn sample2() -> String {
    sample_file(
        "sample2.json",
        r#"{"a": [1, 2, 3], "b": {"c": "d"}}"#,
    )
    .await
}

fn sql_filter() -> Value {
    json!({"filterType": "filter/sql", "query": "DROP TABLE myTable;"})
}

#[tokio::test]
async fn test_dataresource_into_filter() {
    let client = OteClient::local();
    let resource = client
        .create_dataresource(json!({
            "downloadUrl": sample2().await,
            "mediaType": "application/json"
        }))
        .await
        .unwrap();
    let filter = client.create_filter(sql_filter()).await.unwrap();

    let pipeline = resource >> filter;
    let output = pipeline.get(None).await.unwrap();
    assert_eq!(parse_document(&output).unwrap(), Document::new());

    let session_id = pipeline.last_session_id().unwrap();
    let session = client.read_session(&session_id).await.unwrap();
    assert_eq!(session["content"], json!({"a": [1, 2, 3], "b": {"c": "d"}}));
    assert_eq!(session["sqlquery"], "DROP TABLE myTable;");
}

#[tokio::test]
async fn test_merges_accumulate_across_stages() {
    let client = OteClient::local();
    let filter = client.create_filter(sql_filter()).await.unwrap();
    let mapping = client
        .create_mapping(json!({
            "mappingType": "triples",
            "prefixes": {"onto": "http://example.org/0.2.1/ontology#"},
            "triples": [["http://onto-ns.com/meta/1.0/Foo#a", "map:mapsTo", "onto:A"]]
        }))
        .await
        .unwrap();
    let select = client
        .create_transformation(json!({
            "transformationType": "transformation/select",
            "configuration": {"keys": ["sqlquery", "prefixes"]}
        }))
        .await
        .unwrap();

    let pipeline = filter.then(mapping).then(select);
    let output = parse_document(&pipeline.get(None).await.unwrap()).unwrap();

    assert_eq!(output.len(), 2);
    assert_eq!(output["sqlquery"], "DROP TABLE myTable;");
    assert_eq!(
        output["prefixes"],
        json!({"onto": "http://example.org/0.2.1/ontology#"})
    );

    let session = client
        .read_session(&pipeline.last_session_id().unwrap())
        .await
        .unwrap();
    for key in ["sqlquery", "prefixes", "triples"] {
        assert!(session.contains_key(key), "session is missing {key}");
    }
}

#[tokio::test]
async fn test_text_resource_parsed_downstream() {
    let client = OteClient::local();
    let resource = client
        .create_dataresource(json!({
            "downloadUrl": sample_file("data.txt", "{\"x\": 42}").await,
            "mediaType": "text/plain"
        }))
        .await
        .unwrap();
    let parser = client
        .create_parser(json!({"parserType": "parser/json"}))
        .await
        .unwrap();

    let output = (resource >> parser).get(None).await.unwrap();
    assert_eq!(parse_document(&output).unwrap()["content"], json!({"x": 42}));
}

#[tokio::test]
async fn test_binary_resource_becomes_data_url() {
    let client = OteClient::local();
    let resource = client
        .create_dataresource(json!({
            "downloadUrl": sample_file("image.png", "\u{1}\u{2}").await,
            "mediaType": "image/png"
        }))
        .await
        .unwrap();

    let output = parse_document(&resource.get(None).await.unwrap()).unwrap();
    let content = output["content"].as_str().unwrap();
    assert_eq!(content, "data:image/png;base64,AQI=");
}

#[tokio::test]
async fn test_same_session_twice_mints_nothing() {
    let client = OteClient::local();
    let session_id = client.create_session().await.unwrap();
    let filter = client
        .create_strategy_in_session("filter", sql_filter(), &session_id)
        .await
        .unwrap();

    filter.get(Some(&session_id)).await.unwrap();
    filter.get(Some(&session_id)).await.unwrap();

    let store = client.store().unwrap();
    assert_eq!(store.session_ids().await, vec![session_id.clone()]);

    let session = client.read_session(&session_id).await.unwrap();
    assert_eq!(session["filter_info"], json!([filter.id().unwrap()]));
}

#[tokio::test]
async fn test_info_list_appends_per_kind() {
    let client = OteClient::local();
    let session_id = client.create_session().await.unwrap();

    let first = client
        .create_strategy_in_session("filter", sql_filter(), &session_id)
        .await
        .unwrap();
    let second = client
        .create_strategy_in_session("Filter", sql_filter(), &session_id)
        .await
        .unwrap();

    let session = client.read_session(&session_id).await.unwrap();
    assert_eq!(
        session["filter_info"],
        json!([first.id().unwrap(), second.id().unwrap()])
    );
    assert!(!session.contains_key("mapping_info"));
}

#[tokio::test]
async fn test_unknown_session_is_a_creation_error() {
    let client = OteClient::local();
    let err = client
        .create_strategy_in_session("filter", sql_filter(), "session-missing")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OteError::Creation { .. }));
}

#[tokio::test]
async fn test_function_not_implemented() {
    let client = OteClient::local();
    let err = client
        .create_function(json!({"functionType": "function/demo"}))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OteError::NotImplemented { .. }));
    assert!(!client.kinds().contains(&StrategyKind::Function));
}

#[tokio::test]
async fn test_access_url_resource_has_no_local_plugin() {
    let client = OteClient::local();
    let err = client
        .create_dataresource(json!({
            "accessUrl": "https://example.org/sparql",
            "accessService": "sparql"
        }))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OteError::Creation { .. }));
}

#[tokio::test]
async fn test_failed_stage_keeps_earlier_merges() {
    let client = OteClient::local();
    let filter = client.create_filter(sql_filter()).await.unwrap();
    let resource = client
        .create_dataresource(json!({
            "downloadUrl": "file:///nonexistent/otelib/sample2.json",
            "mediaType": "application/json"
        }))
        .await
        .unwrap();

    // filter is downstream: its initialize runs before the resource fails
    let pipeline = resource >> filter;
    let err = pipeline.get(None).await.unwrap_err();
    assert!(matches!(err, OteError::Io(_)));

    let session = client
        .read_session(&pipeline.last_session_id().unwrap())
        .await
        .unwrap();
    assert_eq!(session["sqlquery"], "DROP TABLE myTable;");
    assert!(!session.contains_key("content"));
}

#[tokio::test]
async fn test_shared_store_and_clear() {
    let store = Arc::new(LocalStore::new());
    let first = OteClient::local_with_store(Arc::clone(&store));
    let second = OteClient::local_with_store(Arc::clone(&store));

    let session_id = first.create_session().await.unwrap();
    assert!(second.read_session(&session_id).await.unwrap().is_empty());

    second.clear_cache().await;
    assert!(matches!(
        first.read_session(&session_id).await,
        Err(OteError::NotFound(_))
    ));
}

struct Constant;

#[async_trait::async_trait]
impl Plugin for Constant {
    async fn initialize(&self, _session: &Document) -> otelib::Result<Document> {
        Ok(Document::new())
    }

    async fn get(&self, _session: &Document) -> otelib::Result<Document> {
        let mut update = Document::new();
        update.insert("answer".to_string(), json!(42));
        Ok(update)
    }
}

#[tokio::test]
async fn test_custom_plugin() {
    let mut plugins = PluginRegistry::with_builtins();
    plugins.register(StrategyKind::Filter, "filter/constant", |_, _| {
        Ok(Box::new(Constant))
    });
    let client = OteClient::local_with_plugins(Arc::new(LocalStore::new()), Arc::new(plugins));

    let filter = client
        .create_filter(json!({"filterType": "filter/constant"}))
        .await
        .unwrap();
    let output = parse_document(&filter.get(None).await.unwrap()).unwrap();
    assert_eq!(output["answer"], 42);
}
