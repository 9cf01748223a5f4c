//! `pash-engine`: the request/response layer around `pash-core`.
//!
//! A [`DerivationWorker`] runs derivations on a background thread,
//! configured by an [`EngineConfig`] persisted as JSON. Events are emitted
//! through `tracing`; install a subscriber to see them.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;
pub mod worker;

pub use config::EngineConfig;
pub use error::EngineError;
pub use worker::{
    BreadcrumbRequest, CipherRequest, DerivationWorker, KeyRequest, PasswordRequest, Request,
    Response, Ticket,
};
