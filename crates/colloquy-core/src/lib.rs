// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Colloquy dialogue engine.
//!
//! This crate provides the error type, the domain types shared by every
//! crate, and the adapter traits through which the engine talks to its
//! external collaborators (generation, embedding, speech, transport and
//! storage).

pub mod bounded;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use bounded::{CallBounds, DEFAULT_CALL_TIMEOUT, bounded};
pub use error::ColloquyError;
pub use types::{AdapterType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{
    EmbeddingAdapter, GeneratorAdapter, PluginAdapter, StorageAdapter, SynthesizerAdapter,
    TranscriberAdapter, TransportAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Transport,
            AdapterType::Generator,
            AdapterType::Embedding,
            AdapterType::Transcriber,
            AdapterType::Synthesizer,
            AdapterType::Storage,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_transport_adapter<T: TransportAdapter>() {}
        fn _assert_generator_adapter<T: GeneratorAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_transcriber_adapter<T: TranscriberAdapter>() {}
        fn _assert_synthesizer_adapter<T: SynthesizerAdapter>() {}
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }
}
