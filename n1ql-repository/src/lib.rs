//! # N1QL Repository
//!
//! Runs declared repository query methods against a N1QL query service.
//!
//! Each query method is bound once to a statement (inline, templated or derived from
//! the method name). Every invocation classifies its call-time arguments into bind
//! values, execution options and an optional prepared plan, assembles a simple,
//! parameterized or prepared request, executes it through a pluggable operations port
//! and returns the decoded entities as a single entity, a collection or a stream.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use n1ql_repository::QueryConfig;
//! use n1ql_repository::query::{QueryArgument, QueryParams, ScanConsistency};
//! use n1ql_repository::repository::{N1qlBasedQuery, QueryMethod, ReturnKind, StatementSource};
//!
//! let config = QueryConfig::new().bucket_name("travel-sample");
//! let method = QueryMethod::for_entity::<Airline>("findByCountryOrderByNameAsc", ReturnKind::Collection);
//! let query = N1qlBasedQuery::<Airline, _>::new(method, StatementSource::Derived, operations, config)?;
//!
//! let airlines = query
//!     .execute(&[
//!         QueryArgument::bind("France"),
//!         QueryParams::new().consistency(ScanConsistency::RequestPlus).into(),
//!     ])?
//!     .into_collection()?;
//! ```
//!
//! ## Design Pattern
//!
//! Shared handles ([QueryConfig], [repository::N1qlBasedQuery]) wrap their state in an
//! `Arc`, so clones are cheap and can be used from several threads at once.
//!
//! ## Module Organization
//!
//! - [`common`] - Values, conversions and shared utilities
//! - [`errors`] - Error types and result definitions
//! - [`query`] - The request model: statements, options, plans and arguments
//! - [`query_config`] - Bucket and request defaults
//! - [`repository`] - Query methods, statement sources and the query adapter

pub mod common;
pub mod errors;
pub mod query;
pub mod query_config;
pub mod repository;

pub use query_config::QueryConfig;
