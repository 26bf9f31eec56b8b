// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue orchestration for Colloquy.
//!
//! The [`DialogueEngine`] owns the per-contact state machine: it decides
//! whether an inbound event is answered, which persona applies, whether a
//! pending attachment rides along, and how audio is transcribed and answered
//! with a voice note. The [`BroadcastDispatcher`] fans administrative
//! messages out to contacts.

pub mod broadcast;
pub mod freshness;
pub mod ledger;
pub mod locks;
pub mod media;
pub mod mode;
pub mod name;
pub mod pending;
pub mod persona;
pub mod recording;
pub mod replies;
pub mod session;
pub mod shutdown;
pub mod ssml;

pub use broadcast::{BroadcastDispatcher, BroadcastReport, BroadcastStatus, DeliveryFailure};
pub use freshness::{Freshness, FreshnessGuard};
pub use ledger::ContactLedger;
pub use media::MediaStore;
pub use mode::{current_mode, set_mode};
pub use name::is_plausible_name;
pub use session::{Collaborators, DialogueEngine, Outcome};
pub use shutdown::install_signal_handler;
pub use ssml::markdown_to_ssml;
