//! # Migrator - Schema Migration Engine
//!
//! Migrator is a lightweight, embedded schema-migration engine written in
//! Rust. Given an ordered set of numbered migration steps and a transactional
//! store, it brings the store's schema to the latest known version exactly
//! once per logical version.
//!
//! ## Key Features
//!
//! - **Run-Once Per Version**: applied versions are tracked in a bookkeeping
//!   table and never reapplied
//! - **Gap-Tolerant**: version numbers may be sparse; a number registered
//!   later still runs on stores that passed through the gap
//! - **Atomic**: each version's bookkeeping record and its effects commit in
//!   one transaction, or not at all
//! - **One-Shot**: an engine instance honors exactly one `execute()` call;
//!   recovery from a failed run is a fresh instance, which resumes at the
//!   first unresolved version
//! - **Pluggable Stores**: any backend implementing the store contract; an
//!   in-memory reference store ships with the crate
//! - **Clean API**: PIMPL pattern provides a stable, encapsulated interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use migrator::migrator::Migrator;
//! use migrator::store::memory::InMemoryStore;
//! use migrator::store::{ColumnDef, ColumnType, Command};
//!
//! let store = InMemoryStore::new().into_store();
//!
//! let engine = Migrator::builder().open(store, |number, error| {
//!     eprintln!("migration {} failed: {}", number, error);
//! });
//!
//! engine.define(1, |txn| {
//!     txn.execute(&Command::CreateTable {
//!         table: "users".to_string(),
//!         columns: vec![ColumnDef::unique("id", ColumnType::Integer)],
//!     })?;
//!     Ok(())
//! })?;
//!
//! engine.execute()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Shared types, the value model, and the bookkeeping constants
//! - [`errors`] - Error types and result definitions
//! - [`migration`] - Migration definitions, the registry, and the runner
//! - [`migrator`] - Core engine interface
//! - [`migrator_builder`] - Engine builder for construction
//! - [`migrator_config`] - Engine configuration and notification channels
//! - [`store`] - Storage backend abstractions and the in-memory store

pub mod common;
pub mod errors;
pub mod migration;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod store;
