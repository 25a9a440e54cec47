//! End-to-end tests: documents -> by_object view -> in-memory view index

use entity_views::{
    ByObjectView, Document, ErrorKind, FaultPolicy, IndexStats, IndexerConfig,
    InMemoryViewIndexStore, ObjectRef, ViewIndexStore, ViewIndexer, ViewRow,
};
use pretty_assertions::assert_eq;

type ObjectIndexer = ViewIndexer<ByObjectView, InMemoryViewIndexStore>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn indexer(config: IndexerConfig) -> ObjectIndexer {
    init_tracing();
    ViewIndexer::new(ByObjectView, InMemoryViewIndexStore::new(), config).unwrap()
}

fn entity(id: &str, triples: &[(&str, &str)]) -> Document {
    let mut doc = Document::new(entity_views::RDF_ENTITY).with_id(id);
    for (p, o) in triples {
        doc.push_triple(id, *p, *o);
    }
    doc
}

fn misaligned(id: &str) -> Document {
    let mut doc = entity(id, &[("p1", "http://a.org")]);
    doc.o
        .get_or_insert_with(Vec::new)
        .push("http://b.org".to_string());
    doc.s.push(id.to_string());
    doc
}

fn corpus() -> Vec<Document> {
    vec![
        entity(
            "alice",
            &[
                ("foaf:knows", "http://example.org/bob"),
                ("foaf:name", "Alice"),
                ("foaf:homepage", "https://alice.example.org/"),
            ],
        ),
        entity(
            "carol",
            &[
                ("foaf:knows", "http://example.org/bob"),
                ("foaf:knows", "_:b0"),
            ],
        ),
        Document::new("Journal").with_id("journal-1"),
        entity("dave", &[]),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// Build
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_build_answers_reference_lookup() {
    let indexer = indexer(IndexerConfig::default());
    let report = indexer.build(&corpus()).await.unwrap();

    assert_eq!(report.documents, 4);
    assert_eq!(report.emitting_documents, 2);
    assert_eq!(report.rows, 3);
    assert!(report.faulted.is_empty());

    let rows = indexer
        .store()
        .query_key("http://example.org/bob")
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ViewRow::new("alice", "http://example.org/bob", ObjectRef::new("foaf:knows")),
            ViewRow::new("carol", "http://example.org/bob", ObjectRef::new("foaf:knows")),
        ]
    );

    assert_eq!(
        indexer.store().stats().await.unwrap(),
        IndexStats {
            keys: 2,
            rows: 3,
            documents: 2,
        }
    );
}

#[tokio::test]
async fn test_parallel_build_matches_sequential() {
    let docs: Vec<Document> = (0..200)
        .map(|i| {
            let http = format!("http://example.org/{}", i % 7);
            let https = format!("https://example.org/{}", i % 3);
            entity(
                &format!("e{:03}", i),
                &[("p:a", http.as_str()), ("p:b", "literal"), ("p:c", https.as_str())],
            )
        })
        .collect();

    let sequential = indexer(IndexerConfig::default().parallel_threshold(usize::MAX));
    let parallel = indexer(IndexerConfig::default().parallel_threshold(1));

    let seq_report = sequential.build(&docs).await.unwrap();
    let par_report = parallel.build(&docs).await.unwrap();
    assert_eq!(seq_report.rows, 400);
    assert_eq!(seq_report.rows, par_report.rows);

    assert_eq!(
        sequential.store().query_range(None, None).await.unwrap(),
        parallel.store().query_range(None, None).await.unwrap()
    );
}

#[tokio::test]
async fn test_build_loads_stored_documents_with_odd_fields() {
    let docs: Vec<Document> = serde_json::from_str(
        r#"[
            {"_id": "x", "doc_type": null, "o": ["http://a.org"]},
            {"_id": "j", "doc_type": "Journal", "o": "some text", "p": null},
            {"_id": "e", "doc_type": "RDFEntity", "s": null, "p": ["p1"], "o": ["http://b.org"]}
        ]"#,
    )
    .unwrap();

    let indexer = indexer(IndexerConfig::default());
    let report = indexer.build(&docs).await.unwrap();

    assert_eq!(report.documents, 3);
    assert_eq!(report.rows, 1);
    assert!(report.faulted.is_empty());
    assert_eq!(
        indexer.store().query_range(None, None).await.unwrap(),
        vec![ViewRow::new("e", "http://b.org", ObjectRef::new("p1"))]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Fault isolation
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_isolate_skips_faulting_document() {
    let indexer = indexer(IndexerConfig::default());
    let mut docs = corpus();
    docs.insert(1, misaligned("broken"));

    let report = indexer.build(&docs).await.unwrap();

    assert_eq!(report.faulted, vec!["broken".to_string()]);
    assert_eq!(report.rows, 3);
    // No partial rows from the faulting document
    assert!(indexer
        .store()
        .query_key("http://a.org")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_abort_writes_nothing() {
    let indexer = indexer(IndexerConfig::default().fault_policy(FaultPolicy::Abort));
    let mut docs = corpus();
    docs.push(misaligned("broken"));

    let err = indexer.build(&docs).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::MalformedDocument);
    assert_eq!(err.doc_id.as_deref(), Some("broken"));
    assert_eq!(indexer.store().stats().await.unwrap(), IndexStats::default());
}

#[tokio::test]
async fn test_faulting_rebuild_drops_stale_rows() {
    let indexer = indexer(IndexerConfig::default());
    indexer
        .build(&[entity("doc", &[("p1", "http://a.org")])])
        .await
        .unwrap();

    let report = indexer.build(&[misaligned("doc")]).await.unwrap();

    assert_eq!(report.faulted, vec!["doc".to_string()]);
    assert_eq!(indexer.store().stats().await.unwrap(), IndexStats::default());
}

// ═══════════════════════════════════════════════════════════════════════════
// Updates
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_replaces_rows() {
    let indexer = indexer(IndexerConfig::default());
    indexer.build(&corpus()).await.unwrap();

    let revised = entity("alice", &[("foaf:knows", "http://example.org/erin")]);
    assert_eq!(indexer.update(&revised).await.unwrap(), 1);

    let bob = indexer
        .store()
        .query_key("http://example.org/bob")
        .await
        .unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].id, "carol");

    let erin = indexer
        .store()
        .query_key("http://example.org/erin")
        .await
        .unwrap();
    assert_eq!(
        erin,
        vec![ViewRow::new("alice", "http://example.org/erin", ObjectRef::new("foaf:knows"))]
    );
}

#[tokio::test]
async fn test_update_retyped_document_leaves_index() {
    let indexer = indexer(IndexerConfig::default());
    indexer.build(&corpus()).await.unwrap();

    let mut retyped = entity("carol", &[("foaf:knows", "http://example.org/bob")]);
    retyped.doc_type = "Archived".to_string();

    assert_eq!(indexer.update(&retyped).await.unwrap(), 0);
    assert_eq!(
        indexer
            .store()
            .query_key("http://example.org/bob")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_update_faulting_document() {
    let indexer = indexer(IndexerConfig::default());
    indexer
        .build(&[entity("doc", &[("p1", "http://a.org")])])
        .await
        .unwrap();

    let err = indexer.update(&misaligned("doc")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::MalformedDocument);
    assert!(indexer
        .store()
        .query_key("http://a.org")
        .await
        .unwrap()
        .is_empty());
}
