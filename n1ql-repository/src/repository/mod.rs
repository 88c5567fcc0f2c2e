//! Repository query methods backed by N1QL.
//!
//! A repository method (for example `find_by_country` on an airline repository) is
//! described by a [QueryMethod]. Registering it with a [StatementSource] produces an
//! [N1qlBasedQuery], which turns each invocation into a N1QL request and shapes the
//! decoded entities into a [QueryResult].
//!
//! # Statement sources
//!
//! - inline text, used as written
//! - templates with `#{#n1ql.*}` placeholders
//! - statements derived from the method name, see [DerivedQuery]
//!
//! # Running queries
//!
//! Requests go through the [N1qlOperations] port. [N1qlTemplate] implements it over a
//! raw [QueryExecutor] transport; tests and alternative clients can supply their own.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use n1ql_repository::QueryConfig;
//! use n1ql_repository::query::QueryArgument;
//! use n1ql_repository::repository::{N1qlBasedQuery, N1qlTemplate, QueryMethod, ReturnKind, StatementSource};
//!
//! let operations = Arc::new(N1qlTemplate::new(executor));
//! let method = QueryMethod::for_entity::<Airline>("findFirstByIcao", ReturnKind::Entity);
//! let query = N1qlBasedQuery::<Airline, _>::new(method, StatementSource::Derived, operations, QueryConfig::new())?;
//!
//! let airline = query.execute(&[QueryArgument::bind("AF")])?.into_entity()?;
//! ```

mod derived_query;
mod entity;
mod n1ql_based_query;
mod operations;
mod query_method;
mod result;
mod statement_source;
mod template;

pub use derived_query::*;
pub use entity::*;
pub use n1ql_based_query::*;
pub use operations::*;
pub use query_method::*;
pub use result::*;
pub use statement_source::*;
pub use template::*;
