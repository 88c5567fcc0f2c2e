use crate::common::Value;
use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::{N1qlQuery, QueryParams, QueryPlan, Statement};

/// One call-time argument of a repository query method.
///
/// The caller tags each argument up front instead of leaving the adapter to guess
/// from its type:
/// - `Bind`: a positional bind value, in declaration order
/// - `Options`: execution options for this call
/// - `Plan`: a prepared plan to execute instead of the statement text
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArgument {
    Bind(Value),
    Options(QueryParams),
    Plan(QueryPlan),
}

impl QueryArgument {
    pub fn bind<V: Into<Value>>(value: V) -> Self {
        QueryArgument::Bind(value.into())
    }
}

impl From<Value> for QueryArgument {
    fn from(value: Value) -> Self {
        QueryArgument::Bind(value)
    }
}

impl From<QueryParams> for QueryArgument {
    fn from(params: QueryParams) -> Self {
        QueryArgument::Options(params)
    }
}

impl From<QueryPlan> for QueryArgument {
    fn from(plan: QueryPlan) -> Self {
        QueryArgument::Plan(plan)
    }
}

/// What to do when more than one options value or plan reference is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// The later occurrence replaces the earlier one
    #[default]
    LastWins,
    /// A repeated occurrence fails with [ErrorKind::InvalidArgument]
    Reject,
}

/// Arguments sorted into their three buckets.
#[derive(Debug, Default)]
struct ClassifiedArguments {
    values: Vec<Value>,
    params: Option<QueryParams>,
    plan: Option<QueryPlan>,
}

fn classify(arguments: &[QueryArgument]) -> ClassifiedArguments {
    let mut classified = ClassifiedArguments::default();

    for (position, argument) in arguments.iter().enumerate() {
        match argument {
            QueryArgument::Options(params) => {
                if classified.params.is_some() {
                    log::warn!("Argument {} replaces an earlier options argument", position);
                }
                classified.params = Some(params.clone());
            }
            QueryArgument::Plan(plan) => {
                if classified.plan.is_some() {
                    log::warn!("Argument {} replaces an earlier prepared plan argument", position);
                }
                classified.plan = Some(plan.clone());
            }
            QueryArgument::Bind(value) => classified.values.push(value.clone()),
        }
    }

    classified
}

fn reject_duplicates(arguments: &[QueryArgument]) -> N1qlResult<()> {
    let mut seen_params = false;
    let mut seen_plan = false;

    for (position, argument) in arguments.iter().enumerate() {
        let (seen, what) = match argument {
            QueryArgument::Options(_) => (&mut seen_params, "options"),
            QueryArgument::Plan(_) => (&mut seen_plan, "prepared plan"),
            QueryArgument::Bind(_) => continue,
        };
        if *seen {
            return Err(N1qlError::new(
                &format!("Argument {} repeats the {} argument", position, what),
                ErrorKind::InvalidArgument,
            ));
        }
        *seen = true;
    }

    Ok(())
}

/// Builds the request for one invocation, letting a repeated options or plan argument
/// replace the earlier one.
///
/// Arguments are classified in order: options and plans are recorded, everything else
/// is appended to the bind values. The request is then
/// - prepared, when a plan was passed (bind values are kept, absent when empty),
/// - parameterized, when there are bind values,
/// - simple otherwise.
///
/// Never fails: any argument list, including an empty one, yields a request.
pub fn build_query(statement: &Statement, arguments: &[QueryArgument]) -> N1qlQuery {
    assemble(statement, classify(arguments))
}

/// Like [build_query], but honours `policy` for repeated options or plan arguments.
pub fn try_build_query(
    statement: &Statement,
    arguments: &[QueryArgument],
    policy: DuplicatePolicy,
) -> N1qlResult<N1qlQuery> {
    if policy == DuplicatePolicy::Reject {
        reject_duplicates(arguments)?;
    }
    Ok(build_query(statement, arguments))
}

fn assemble(statement: &Statement, classified: ClassifiedArguments) -> N1qlQuery {
    let ClassifiedArguments {
        values,
        params,
        plan,
    } = classified;

    if let Some(plan) = plan {
        N1qlQuery::prepared(plan, Some(values), params)
    } else if !values.is_empty() {
        N1qlQuery::parameterized(statement.clone(), values, params)
    } else {
        N1qlQuery::simple(statement.clone(), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryMode, ScanConsistency};

    fn statement() -> Statement {
        Statement::new("SELECT * FROM `b` WHERE a = $1 AND b = $2")
    }

    #[test]
    fn test_empty_arguments_build_simple_query() {
        let query = build_query(&statement(), &[]);
        assert_eq!(query, N1qlQuery::simple(statement(), None));
    }

    #[test]
    fn test_bind_values_keep_order_and_skip_options() {
        let params = QueryParams::new().consistency(ScanConsistency::RequestPlus);
        let arguments = vec![
            QueryArgument::bind("first"),
            QueryArgument::Options(params.clone()),
            QueryArgument::bind(2),
            QueryArgument::bind(true),
        ];

        let query = build_query(&statement(), &arguments);
        assert_eq!(query.mode(), QueryMode::Parameterized);
        assert_eq!(
            query.args(),
            &[Value::from("first"), Value::from(2), Value::from(true)]
        );
        assert_eq!(query.params(), Some(&params));
    }

    #[test]
    fn test_options_only_builds_simple_query_with_options() {
        let params = QueryParams::new().readonly(true);
        let query = build_query(&statement(), &[params.clone().into()]);
        assert_eq!(query, N1qlQuery::simple(statement(), Some(params)));
    }

    #[test]
    fn test_later_options_win() {
        let first = QueryParams::new().client_context_id("first");
        let second = QueryParams::new().client_context_id("second");
        let query = build_query(&statement(), &[first.into(), second.clone().into()]);
        assert_eq!(query.params(), Some(&second));
    }

    #[test]
    fn test_later_plan_wins() {
        let arguments = vec![
            QueryArgument::Plan(QueryPlan::new("p1")),
            QueryArgument::Plan(QueryPlan::new("p2")),
        ];
        let query = build_query(&statement(), &arguments);
        assert_eq!(query.plan().map(|p| p.name()), Some("p2"));
    }

    #[test]
    fn test_plan_takes_precedence_over_bind_values() {
        let arguments = vec![
            QueryArgument::bind(1),
            QueryArgument::Plan(QueryPlan::new("p1")),
            QueryArgument::bind(2),
        ];
        let query = build_query(&statement(), &arguments);
        assert_eq!(query.mode(), QueryMode::Prepared);
        assert_eq!(query.args(), &[Value::from(1), Value::from(2)]);
        assert!(query.statement().is_none());
    }

    #[test]
    fn test_plan_without_bind_values_has_no_args() {
        let query = build_query(&statement(), &[QueryPlan::new("p1").into()]);
        assert_eq!(
            query,
            N1qlQuery::Prepared {
                plan: QueryPlan::new("p1"),
                args: None,
                params: None,
            }
        );
    }

    #[test]
    fn test_null_bind_value_is_still_a_bind_value() {
        let query = build_query(&statement(), &[Value::Null.into()]);
        assert_eq!(query.mode(), QueryMode::Parameterized);
        assert_eq!(query.args(), &[Value::Null]);
    }

    #[test]
    fn test_build_does_not_touch_arguments() {
        let arguments = vec![QueryArgument::bind("x"), QueryParams::new().into()];
        let before = arguments.clone();
        let _ = build_query(&statement(), &arguments);
        assert_eq!(arguments, before);
    }

    #[test]
    fn test_reject_policy_fails_on_duplicate_options() {
        let arguments = vec![QueryParams::new().into(), QueryParams::new().into()];
        let err = try_build_query(&statement(), &arguments, DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert!(err.message().contains("options"));
    }

    #[test]
    fn test_reject_policy_fails_on_duplicate_plan() {
        let arguments = vec![QueryPlan::new("a").into(), QueryPlan::new("b").into()];
        let err = try_build_query(&statement(), &arguments, DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert!(err.message().contains("prepared plan"));
    }

    #[test]
    fn test_reject_policy_accepts_single_occurrences() {
        let arguments = vec![
            QueryArgument::bind(1),
            QueryParams::new().into(),
            QueryPlan::new("p").into(),
        ];
        let query = try_build_query(&statement(), &arguments, DuplicatePolicy::Reject).unwrap();
        assert_eq!(query.mode(), QueryMode::Prepared);
    }

    #[test]
    fn test_last_wins_policy_matches_build_query() {
        let arguments = vec![
            QueryParams::new().pretty(true).into(),
            QueryArgument::bind("v"),
            QueryParams::new().pretty(false).into(),
        ];
        let strict = try_build_query(&statement(), &arguments, DuplicatePolicy::LastWins).unwrap();
        assert_eq!(strict, build_query(&statement(), &arguments));
    }
}
