//! One-way sync against a remote quote endpoint.
//!
//! # Responsibility
//! - Define the remote collaborator contract and its HTTP adapter.
//! - Run fetch → reconcile → persist → publish cycles.
//!
//! # Invariants
//! - A cycle that fails before persisting leaves the local set untouched.
//! - Cycles against one quote book never overlap (`&mut` access).

pub mod http_remote;
pub mod remote;
pub mod sync_service;
