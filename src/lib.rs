// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Youth council mini-app: discount catalog and council member directory.
//!
//! This crate provides two halves:
//! - the backend API the Telegram mini-app and admin panel talk to
//!   (`routes`, `db`, `middleware`)
//! - the client-side data-access layer that calls that API and falls back
//!   to local storage when it cannot be reached (`services`)

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::MemoryDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MemoryDb,
}
