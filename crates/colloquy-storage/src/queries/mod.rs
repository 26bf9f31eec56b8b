// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each function takes a `&Database` and runs one
//! closure on the writer thread.

pub mod attachments;
pub mod contacts;
pub mod history;
pub mod inspect;
pub mod knowledge;
pub mod settings;
