use std::fmt::{Display, Formatter};

use crate::common::Value;
use crate::query::{QueryParams, QueryPlan, Statement};

/// How a [N1qlQuery] was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Statement text, no bind values
    Simple,
    /// Statement text with positional bind values
    Parameterized,
    /// Prepared plan reference, optionally with positional bind values
    Prepared,
}

impl Display for QueryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::Simple => write!(f, "simple"),
            QueryMode::Parameterized => write!(f, "parameterized"),
            QueryMode::Prepared => write!(f, "prepared"),
        }
    }
}

/// One fully assembled unit of work for the query service.
///
/// Built fresh for every repository method invocation and handed to
/// [crate::repository::N1qlOperations::find_by_n1ql].
#[derive(Debug, Clone, PartialEq)]
pub enum N1qlQuery {
    Simple {
        statement: Statement,
        params: Option<QueryParams>,
    },
    Parameterized {
        statement: Statement,
        args: Vec<Value>,
        params: Option<QueryParams>,
    },
    Prepared {
        plan: QueryPlan,
        args: Option<Vec<Value>>,
        params: Option<QueryParams>,
    },
}

impl N1qlQuery {
    pub fn simple(statement: Statement, params: Option<QueryParams>) -> Self {
        N1qlQuery::Simple { statement, params }
    }

    pub fn parameterized(
        statement: Statement,
        args: Vec<Value>,
        params: Option<QueryParams>,
    ) -> Self {
        N1qlQuery::Parameterized {
            statement,
            args,
            params,
        }
    }

    /// Builds a prepared query. An empty argument list is stored as `None`.
    pub fn prepared(plan: QueryPlan, args: Option<Vec<Value>>, params: Option<QueryParams>) -> Self {
        N1qlQuery::Prepared {
            plan,
            args: args.filter(|values| !values.is_empty()),
            params,
        }
    }

    pub fn mode(&self) -> QueryMode {
        match self {
            N1qlQuery::Simple { .. } => QueryMode::Simple,
            N1qlQuery::Parameterized { .. } => QueryMode::Parameterized,
            N1qlQuery::Prepared { .. } => QueryMode::Prepared,
        }
    }

    /// The statement text, absent for prepared queries.
    pub fn statement(&self) -> Option<&Statement> {
        match self {
            N1qlQuery::Simple { statement, .. } => Some(statement),
            N1qlQuery::Parameterized { statement, .. } => Some(statement),
            N1qlQuery::Prepared { .. } => None,
        }
    }

    pub fn plan(&self) -> Option<&QueryPlan> {
        match self {
            N1qlQuery::Prepared { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// Positional bind values in call order. Empty for simple queries.
    pub fn args(&self) -> &[Value] {
        match self {
            N1qlQuery::Simple { .. } => &[],
            N1qlQuery::Parameterized { args, .. } => args,
            N1qlQuery::Prepared { args, .. } => args.as_deref().unwrap_or(&[]),
        }
    }

    pub fn params(&self) -> Option<&QueryParams> {
        match self {
            N1qlQuery::Simple { params, .. } => params.as_ref(),
            N1qlQuery::Parameterized { params, .. } => params.as_ref(),
            N1qlQuery::Prepared { params, .. } => params.as_ref(),
        }
    }

    /// Replaces the options of this query, returning the new query.
    pub(crate) fn with_params(self, new_params: Option<QueryParams>) -> Self {
        match self {
            N1qlQuery::Simple { statement, .. } => N1qlQuery::Simple {
                statement,
                params: new_params,
            },
            N1qlQuery::Parameterized {
                statement, args, ..
            } => N1qlQuery::Parameterized {
                statement,
                args,
                params: new_params,
            },
            N1qlQuery::Prepared { plan, args, .. } => N1qlQuery::Prepared {
                plan,
                args,
                params: new_params,
            },
        }
    }

    /// The JSON request object sent to the query service.
    ///
    /// ```text
    /// {"statement":"SELECT * FROM `b` WHERE name = $1","args":["Alice"],"scan_consistency":"request_plus"}
    /// {"prepared":"p1","encoded_plan":"...","args":[1]}
    /// ```
    pub fn request_body(&self) -> Value {
        let mut body = crate::doc! {};
        match self {
            N1qlQuery::Simple { statement, .. } => {
                body.put("statement", statement.text());
            }
            N1qlQuery::Parameterized {
                statement, args, ..
            } => {
                body.put("statement", statement.text());
                body.put("args", Value::Array(args.clone()));
            }
            N1qlQuery::Prepared { plan, args, .. } => {
                plan.inject_plan(&mut body);
                if let Some(args) = args {
                    body.put("args", Value::Array(args.clone()));
                }
            }
        }
        if let Some(params) = self.params() {
            params.inject_params(&mut body);
        }
        body
    }
}

impl Display for N1qlQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let json = self.request_body().to_json().map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}
