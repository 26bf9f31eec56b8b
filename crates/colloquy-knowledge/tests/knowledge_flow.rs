// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval and ingestion against a real SQLite store with a mock embedder.

use std::sync::Arc;

use colloquy_config::model::{IngestConfig, RetrievalConfig};
use colloquy_core::CallBounds;
use colloquy_knowledge::{Ingestor, NO_CONTEXT, Retriever};
use colloquy_test_utils::TestHarness;

fn retriever(harness: &TestHarness) -> Retriever {
    Retriever::new(
        harness.storage_dyn(),
        Arc::new(harness.embedder.clone()),
        &RetrievalConfig::default(),
        CallBounds::default(),
    )
}

#[tokio::test]
async fn empty_store_returns_empty_list() {
    let harness = TestHarness::new().await.unwrap();
    let results = retriever(&harness).retrieve("qual o prazo?", 3).await.unwrap();
    assert!(results.is_empty());
    // No embedding call is needed when there is nothing to compare against.
    assert!(harness.embedder.seen().await.is_empty());
}

#[tokio::test]
async fn results_are_sorted_and_above_floor() {
    let harness = TestHarness::new().await.unwrap();
    let store = harness.storage_dyn();
    store.insert_knowledge("Entrega em 3 dias úteis.", &[0.9, 0.1, 0.0]).await.unwrap();
    store.insert_knowledge("Aceitamos PIX e cartão.", &[0.0, 1.0, 0.0]).await.unwrap();
    store.insert_knowledge("Frete grátis acima de R$200.", &[1.0, 0.0, 0.0]).await.unwrap();
    harness.embedder.insert("qual o frete?", vec![1.0, 0.0, 0.0]).await;

    let results = retriever(&harness).retrieve("qual o frete?", 3).await.unwrap();
    let texts: Vec<&str> = results.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Frete grátis acima de R$200.", "Entrega em 3 dias úteis."]);
    assert!(results.iter().all(|c| c.similarity > 0.5));
}

#[tokio::test]
async fn repeated_queries_are_reproducible() {
    let harness = TestHarness::new().await.unwrap();
    let store = harness.storage_dyn();
    for text in ["a", "b", "c", "d"] {
        store.insert_knowledge(text, &[1.0, 1.0, 0.0]).await.unwrap();
    }
    harness.embedder.insert("q", vec![1.0, 1.0, 0.0]).await;
    let r = retriever(&harness);
    let first = r.retrieve("q", 3).await.unwrap();
    let second = r.retrieve("q", 3).await.unwrap();
    assert_eq!(first, second);
    let texts: Vec<&str> = first.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn context_falls_back_on_embedding_failure() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .storage_dyn()
        .insert_knowledge("algo", &[0.0, 0.0, 1.0])
        .await
        .unwrap();
    harness.embedder.set_failing(true);
    assert_eq!(retriever(&harness).context_for("pergunta").await, NO_CONTEXT);
}

#[tokio::test]
async fn context_joins_chunks_with_newlines() {
    let harness = TestHarness::new().await.unwrap();
    let store = harness.storage_dyn();
    store.insert_knowledge("linha um", &[0.0, 0.0, 1.0]).await.unwrap();
    store.insert_knowledge("linha dois", &[0.0, 0.1, 1.0]).await.unwrap();
    let context = retriever(&harness).context_for("qualquer").await;
    assert_eq!(context, "linha um\nlinha dois");
}

#[tokio::test]
async fn ingestion_replaces_store_and_counts() {
    let harness = TestHarness::new().await.unwrap();
    let store = harness.storage_dyn();
    store.insert_knowledge("conhecimento antigo", &[1.0, 0.0, 0.0]).await.unwrap();

    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("faq.txt"), "Horário: 9h às 18h.\n\nAtendemos aos sábados.").unwrap();
    std::fs::write(source.path().join("notas.md"), "# Produtos\nCamisetas e bonés.").unwrap();
    std::fs::write(source.path().join("vazio.txt"), "   ").unwrap();
    std::fs::write(source.path().join("foto.jpg"), [0xff, 0xd8]).unwrap();

    let config = IngestConfig {
        pause_ms: 0,
        ..IngestConfig::default()
    };
    let ingestor = Ingestor::new(store.clone(), Arc::new(harness.embedder.clone()), config, CallBounds::default());
    let report = ingestor.run(source.path()).await.unwrap();

    assert_eq!(report.files_read, 2);
    assert_eq!(report.files_skipped, 2);
    assert_eq!(report.chunks_stored, 2);
    assert_eq!(report.chunks_failed, 0);

    let chunks = store.knowledge_chunks().await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.text != "conhecimento antigo"));
}

#[tokio::test]
async fn ingestion_counts_failed_chunks() {
    let harness = TestHarness::new().await.unwrap();
    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("faq.txt"), "texto").unwrap();
    harness.embedder.set_failing(true);

    let config = IngestConfig {
        pause_ms: 0,
        ..IngestConfig::default()
    };
    let ingestor = Ingestor::new(harness.storage_dyn(), Arc::new(harness.embedder.clone()), config, CallBounds::default());
    let report = ingestor.run(source.path()).await.unwrap();
    assert_eq!(report.files_read, 1);
    assert_eq!(report.chunks_failed, 1);
    assert_eq!(report.chunks_stored, 0);
}

#[tokio::test]
async fn missing_directory_keeps_existing_store() {
    let harness = TestHarness::new().await.unwrap();
    let store = harness.storage_dyn();
    store.insert_knowledge("mantido", &[1.0, 0.0, 0.0]).await.unwrap();
    let parent = tempfile::tempdir().unwrap();
    let missing = parent.path().join("documentos");

    let ingestor = Ingestor::new(store.clone(), Arc::new(harness.embedder.clone()), IngestConfig::default(), CallBounds::default());
    let report = ingestor.run(&missing).await.unwrap();
    assert_eq!(report.files_read, 0);
    assert!(missing.exists());
    assert_eq!(store.knowledge_chunks().await.unwrap().len(), 1);
}

#[tokio::test]
async fn ingestion_rejects_vectors_of_another_dimension() {
    let harness = TestHarness::new().await.unwrap();
    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.txt"), "primeiro").unwrap();
    std::fs::write(source.path().join("b.txt"), "segundo").unwrap();
    // "segundo" gets the harness fallback, which has three dimensions.
    harness.embedder.insert("primeiro", vec![1.0, 0.0]).await;

    let config = IngestConfig {
        pause_ms: 0,
        ..IngestConfig::default()
    };
    let store = harness.storage_dyn();
    let ingestor = Ingestor::new(store.clone(), Arc::new(harness.embedder.clone()), config, CallBounds::default());
    let report = ingestor.run(source.path()).await.unwrap();

    assert_eq!(report.files_read, 2);
    assert_eq!(report.chunks_stored, 1);
    assert_eq!(report.chunks_failed, 1);
    let chunks = store.knowledge_chunks().await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "primeiro");
    assert_eq!(chunks[0].embedding.len(), 2);
}
