// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for Colloquy.
//!
//! Receives the transport gateway's webhook and exposes the bearer-token
//! protected administrative routes.

pub mod admin;
pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, ServerConfig, router, start_server};
