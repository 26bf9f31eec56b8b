// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for every external collaborator.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod generator;
pub mod speech;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use generator::GeneratorAdapter;
pub use speech::{SynthesizerAdapter, TranscriberAdapter};
pub use storage::StorageAdapter;
pub use transport::TransportAdapter;
