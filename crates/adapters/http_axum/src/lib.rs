//! # biothermal-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **server-side-rendered dashboard** at `/`. It works with zero
//!   JavaScript: the thermostat dropdown is a `<form>` that POSTs back and
//!   redirects (PRG pattern), and the page reloads itself with
//!   `<meta http-equiv="refresh">`.
//! - Serve a **JSON API** under `/api` for the dashboard snapshot and the
//!   thermal control loop.
//! - Serve static assets (logo) under `/assets`.
//!
//! ## Dependency rule
//! Depends on `biothermal-app` (for port traits and services) and
//! `biothermal-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod stubs;
