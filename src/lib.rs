//! Custody ledger for pharmaceutical batches.
//!
//! A batch passes through a fixed sequence of participant roles (supplier,
//! manufacturer, transporter, distributor, wholesaler, retailer); every
//! custody change is validated against the caller's registered role and the
//! batch's current stage/status, then recorded in an append-only, attributed
//! history that observers can query and nobody can rewrite.

pub mod batch;
pub mod error;
pub mod history;
pub mod policy;
pub mod registry;
pub mod service;
pub mod utils;
