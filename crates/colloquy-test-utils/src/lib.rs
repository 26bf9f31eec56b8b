// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Colloquy integration tests.
//!
//! Provides mock adapters for every external collaborator and a harness
//! that wires them to a temporary SQLite store.
//!
//! # Components
//!
//! - [`MockGenerator`] - scripted replies, captured requests, switchable failure
//! - [`MockEmbedder`] - fixed vectors per text
//! - [`MockTranscriber`] / [`MockSynthesizer`] - scripted speech results
//! - [`MockTransport`] - captured sends and canned media downloads
//! - [`TestHarness`] - all of the above plus an initialized [`SqliteStorage`](colloquy_storage::SqliteStorage)

pub mod harness;
pub mod mock_embedder;
pub mod mock_generator;
pub mod mock_speech;
pub mod mock_transport;

pub use harness::TestHarness;
pub use mock_embedder::MockEmbedder;
pub use mock_generator::MockGenerator;
pub use mock_speech::{MockSynthesizer, MockTranscriber, Transcript};
pub use mock_transport::{MockTransport, SentMessage};
