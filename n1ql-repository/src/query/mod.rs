//! The query request model.
//!
//! Everything a single repository method invocation sends to the query service:
//!
//! - [Statement] - the N1QL text bound to a query method
//! - [QueryParams] - per-call execution options (consistency, timeouts, ...)
//! - [QueryPlan] - a reference to a server-side prepared statement
//! - [QueryArgument] - a tagged call-time argument (bind value, options or plan)
//! - [N1qlQuery] - the assembled request, built by [build_query]
//!
//! # Building a request
//!
//! ```rust,ignore
//! use n1ql_repository::query::{build_query, QueryArgument, QueryParams, ScanConsistency, Statement};
//!
//! let statement = Statement::new("SELECT * FROM `travel` WHERE city = $1");
//! let query = build_query(&statement, &[
//!     QueryArgument::bind("Paris"),
//!     QueryParams::new().consistency(ScanConsistency::RequestPlus).into(),
//! ]);
//! ```

mod argument;
mod n1ql_query;
mod params;
mod plan;
mod statement;

pub use argument::*;
pub use n1ql_query::*;
pub use params::*;
pub use plan::*;
pub use statement::*;
