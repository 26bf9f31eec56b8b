// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge retrieval and ingestion for the Colloquy dialogue engine.
//!
//! The [`Retriever`] embeds a query, scans every stored chunk with cosine
//! similarity, and returns the best matches above a fixed floor. The
//! [`Ingestor`] rebuilds the store from a directory of documents.

pub mod chunker;
pub mod ingest;
pub mod retriever;
pub mod vector;

pub use chunker::split_into_chunks;
pub use ingest::{IngestReport, Ingestor};
pub use retriever::{NO_CONTEXT, Retriever, ScoredChunk};
