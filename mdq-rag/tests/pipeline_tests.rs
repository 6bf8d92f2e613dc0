//! End-to-end ingestion tests against the in-memory store.

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use common::{HashEmbeddingProvider, RecordingStore};
use mdq_rag::{
    CollectionManager, IngestConfig, IngestOutcome, IngestPipeline, InMemoryVectorStore,
    RagError, Verifier, VectorStore, id_for,
};

const DIM: usize = 16;
const COLLECTION: &str = "md_files_test";

fn config(root: &Path) -> IngestConfig {
    IngestConfig::builder().vector_size(DIM).collection(COLLECTION).root_dir(root).build().unwrap()
}

fn pipeline(store: Arc<dyn VectorStore>, root: &Path) -> IngestPipeline {
    IngestPipeline::builder()
        .config(config(root))
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(DIM)))
        .vector_store(store)
        .build()
        .unwrap()
}

async fn fresh_store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    CollectionManager::new(store.clone(), true).recreate(COLLECTION, DIM).await.unwrap();
    store
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn single_notes_file_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "notes.md", "hello world");

    let store = fresh_store().await;
    let report = pipeline(store.clone(), temp.path()).run().await.unwrap();
    assert_eq!(report.processed(), 1);
    assert_eq!(report.inserted(), 1);

    let points = store.points(COLLECTION).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].id, id_for("notes.md"));
    assert_eq!(points[0].payload.file_name, "notes.md");
    assert_eq!(points[0].payload.content, "hello world");

    let verifier = Verifier::new(
        Arc::new(HashEmbeddingProvider::new(DIM)),
        store.clone(),
        "anything at all",
        5,
    );
    let hits = verifier.check(COLLECTION).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].point.payload.file_name, "notes.md");
}

#[tokio::test]
async fn retrieved_payload_matches_what_was_written() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "guide/setup.md", "# Setup\n\nInstall things.");

    let store = fresh_store().await;
    pipeline(store.clone(), temp.path()).run().await.unwrap();

    let got = store.retrieve(COLLECTION, &[id_for("setup.md")]).await.unwrap();
    assert_eq!(got.len(), 1);
    let payload = &got[0].payload;
    assert_eq!(payload.file_name, "setup.md");
    assert_eq!(payload.file_path, temp.path().join("guide/setup.md").display().to_string());
    assert_eq!(payload.content, "# Setup\n\nInstall things.");
}

#[tokio::test]
async fn rerunning_on_unchanged_directory_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "a.md", "alpha");
    write(temp.path(), "nested/b.md", "beta");
    write(temp.path(), "nested/deeper/c.md", "gamma");
    write(temp.path(), "nested/skip.txt", "not markdown");

    let store = fresh_store().await;
    let pipeline = pipeline(store.clone(), temp.path());

    let first = pipeline.run().await.unwrap();
    let after_first = store.points(COLLECTION).await.unwrap();
    let second = pipeline.run().await.unwrap();
    let after_second = store.points(COLLECTION).await.unwrap();

    assert_eq!(after_first.len(), 3);
    assert_eq!(after_first, after_second);
    assert_eq!(first.inserted(), 3);
    assert_eq!(second.updated(), 3);
}

#[tokio::test]
async fn same_base_name_in_two_directories_last_write_wins() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "a/notes.md", "first");
    write(temp.path(), "b/notes.md", "second");

    let store = fresh_store().await;
    let report = pipeline(store.clone(), temp.path()).run().await.unwrap();

    assert_eq!(report.files[0].id, report.files[1].id);
    assert_eq!(report.files[0].outcome, IngestOutcome::Inserted);
    assert_eq!(report.files[1].outcome, IngestOutcome::Updated);

    let points = store.points(COLLECTION).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].payload.content, "second");
    assert!(Path::new(&points[0].payload.file_path).ends_with("b/notes.md"));
}

#[tokio::test]
async fn only_overwrites_wait_for_acknowledgment() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "one.md", "one");
    write(temp.path(), "two.md", "two");

    let store = RecordingStore::new();
    CollectionManager::new(store.clone(), true).create(COLLECTION, DIM).await.unwrap();
    let pipeline = pipeline(store.clone(), temp.path());

    pipeline.run().await.unwrap();
    pipeline.run().await.unwrap();

    let one = id_for("one.md");
    let two = id_for("two.md");
    assert_eq!(store.upserts(), vec![(one, false), (two, false), (one, true), (two, true)]);
}

#[tokio::test]
async fn invalid_utf8_aborts_the_run() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "a.md", "fine");
    fs::write(temp.path().join("b.md"), [0xff, 0xfe, 0xfd]).unwrap();
    write(temp.path(), "c.md", "never reached");

    let store = fresh_store().await;
    let err = pipeline(store.clone(), temp.path()).run().await.unwrap_err();
    assert!(matches!(err, RagError::InvalidUtf8 { .. }));

    let points = store.points(COLLECTION).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].payload.file_name, "a.md");
}

#[tokio::test]
async fn missing_collection_aborts_the_run() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "a.md", "fine");

    let store = Arc::new(InMemoryVectorStore::new());
    let err = pipeline(store, temp.path()).run().await.unwrap_err();
    assert!(matches!(err, RagError::PipelineError(_)));
}

#[tokio::test]
async fn empty_directory_yields_empty_report() {
    let temp = tempfile::tempdir().unwrap();
    let store = fresh_store().await;
    let report = pipeline(store.clone(), temp.path()).run().await.unwrap();
    assert_eq!(report.processed(), 0);
    assert_eq!(store.point_count(COLLECTION).await, Some(0));
}

#[tokio::test]
async fn recreate_discards_points_from_previous_runs() {
    let temp = tempfile::tempdir().unwrap();
    write(temp.path(), "old.md", "stale");

    let store = fresh_store().await;
    pipeline(store.clone(), temp.path()).run().await.unwrap();
    fs::remove_file(temp.path().join("old.md")).unwrap();
    write(temp.path(), "new.md", "fresh");

    CollectionManager::new(store.clone(), true).recreate(COLLECTION, DIM).await.unwrap();
    pipeline(store.clone(), temp.path()).run().await.unwrap();

    let points = store.points(COLLECTION).await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].payload.file_name, "new.md");
}

#[tokio::test]
async fn content_beyond_the_context_window_is_ignored() {
    let temp = tempfile::tempdir().unwrap();
    let head = "word ".repeat(8);
    write(temp.path(), "short.md", &head);
    write(temp.path(), "long.md", &format!("{head} tail that the encoder never sees"));

    let store = fresh_store().await;
    let pipeline = IngestPipeline::builder()
        .config(config(temp.path()))
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(DIM).with_max_tokens(8)))
        .vector_store(store.clone())
        .build()
        .unwrap();
    pipeline.run().await.unwrap();

    let short = store.retrieve(COLLECTION, &[id_for("short.md")]).await.unwrap();
    let long = store.retrieve(COLLECTION, &[id_for("long.md")]).await.unwrap();
    assert_eq!(short[0].vector.len(), DIM);
    assert_eq!(short[0].vector, long[0].vector);
    assert_ne!(short[0].payload.content, long[0].payload.content);
}

#[test]
fn builder_rejects_dimension_mismatch() {
    let result = IngestPipeline::builder()
        .config(config(Path::new(".")))
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(DIM + 1)))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build();
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}

#[test]
fn builder_requires_all_parts() {
    let result = IngestPipeline::builder().config(config(Path::new("."))).build();
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}

#[tokio::test]
async fn run_targets_the_configured_collection_and_root() {
    let corpus = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    write(corpus.path(), "kept.md", "in the configured root");
    write(elsewhere.path(), "ignored.md", "outside the configured root");

    let store = Arc::new(InMemoryVectorStore::new());
    CollectionManager::new(store.clone(), true).create("other_collection", DIM).await.unwrap();
    let config = IngestConfig::builder()
        .vector_size(DIM)
        .collection("other_collection")
        .root_dir(corpus.path())
        .build()
        .unwrap();
    let pipeline = IngestPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(HashEmbeddingProvider::new(DIM)))
        .vector_store(store.clone())
        .build()
        .unwrap();

    let report = pipeline.run().await.unwrap();
    assert_eq!(report.processed(), 1);

    let points = store.points("other_collection").await.unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].payload.file_name, "kept.md");
    assert!(store.points(COLLECTION).await.is_err());
}
