use std::time::Duration;

use crate::common::Value;

/// Scan consistency requested from the query service.
///
/// # Variants
/// - `NotBounded`: return whatever the indexes hold right now (fastest)
/// - `RequestPlus`: wait until indexes contain every mutation made before the request
/// - `StatementPlus`: wait until indexes contain every mutation made before the
///   statement was first executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanConsistency {
    NotBounded,
    RequestPlus,
    StatementPlus,
}

impl ScanConsistency {
    /// The value of the `scan_consistency` request field.
    pub fn n1ql(&self) -> &'static str {
        match self {
            ScanConsistency::NotBounded => "not_bounded",
            ScanConsistency::RequestPlus => "request_plus",
            ScanConsistency::StatementPlus => "statement_plus",
        }
    }
}

/// Execution options for a single query request.
///
/// Passed by the caller as a [crate::query::QueryArgument::Options] argument. Every
/// option is optional; unset options are left out of the request body so the server
/// default applies.
///
/// # Examples
///
/// ```rust,ignore
/// use n1ql_repository::query::{QueryParams, ScanConsistency};
/// use std::time::Duration;
///
/// let params = QueryParams::new()
///     .consistency(ScanConsistency::RequestPlus)
///     .server_timeout(Duration::from_secs(5))
///     .max_parallelism(4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub(crate) consistency: Option<ScanConsistency>,
    pub(crate) scan_wait: Option<Duration>,
    pub(crate) server_timeout: Option<Duration>,
    pub(crate) client_context_id: Option<String>,
    pub(crate) max_parallelism: Option<u32>,
    pub(crate) scan_cap: Option<u32>,
    pub(crate) pipeline_batch: Option<u32>,
    pub(crate) pipeline_cap: Option<u32>,
    pub(crate) readonly: Option<bool>,
    pub(crate) pretty: Option<bool>,
}

/// Creates `QueryParams` with only the scan consistency set.
pub fn with_consistency(consistency: ScanConsistency) -> QueryParams {
    QueryParams::new().consistency(consistency)
}

impl QueryParams {
    /// Creates empty options.
    pub fn new() -> QueryParams {
        QueryParams::default()
    }

    pub fn consistency(mut self, consistency: ScanConsistency) -> QueryParams {
        self.consistency = Some(consistency);
        self
    }

    /// Sets how long the server may wait for indexes to catch up. Only sent with
    /// `RequestPlus` or `StatementPlus` consistency.
    pub fn scan_wait(mut self, wait: Duration) -> QueryParams {
        self.scan_wait = Some(wait);
        self
    }

    pub fn server_timeout(mut self, timeout: Duration) -> QueryParams {
        self.server_timeout = Some(timeout);
        self
    }

    pub fn client_context_id(mut self, id: &str) -> QueryParams {
        self.client_context_id = Some(id.to_string());
        self
    }

    pub fn max_parallelism(mut self, parallelism: u32) -> QueryParams {
        self.max_parallelism = Some(parallelism);
        self
    }

    pub fn scan_cap(mut self, cap: u32) -> QueryParams {
        self.scan_cap = Some(cap);
        self
    }

    pub fn pipeline_batch(mut self, batch: u32) -> QueryParams {
        self.pipeline_batch = Some(batch);
        self
    }

    pub fn pipeline_cap(mut self, cap: u32) -> QueryParams {
        self.pipeline_cap = Some(cap);
        self
    }

    pub fn readonly(mut self, readonly: bool) -> QueryParams {
        self.readonly = Some(readonly);
        self
    }

    pub fn pretty(mut self, pretty: bool) -> QueryParams {
        self.pretty = Some(pretty);
        self
    }

    pub fn get_consistency(&self) -> Option<ScanConsistency> {
        self.consistency
    }

    pub fn get_server_timeout(&self) -> Option<Duration> {
        self.server_timeout
    }

    pub fn get_client_context_id(&self) -> Option<&str> {
        self.client_context_id.as_deref()
    }

    pub(crate) fn has_client_context_id(&self) -> bool {
        self.client_context_id.is_some()
    }

    /// Writes the set options into a request body object.
    pub fn inject_params(&self, body: &mut Value) {
        if let Some(consistency) = self.consistency {
            body.put("scan_consistency", consistency.n1ql());
            if consistency != ScanConsistency::NotBounded {
                if let Some(wait) = self.scan_wait {
                    body.put("scan_wait", duration_to_n1ql(wait));
                }
            }
        }
        if let Some(timeout) = self.server_timeout {
            body.put("timeout", duration_to_n1ql(timeout));
        }
        if let Some(id) = &self.client_context_id {
            body.put("client_context_id", id.as_str());
        }
        if let Some(parallelism) = self.max_parallelism {
            body.put("max_parallelism", parallelism.to_string());
        }
        if let Some(cap) = self.scan_cap {
            body.put("scan_cap", cap.to_string());
        }
        if let Some(batch) = self.pipeline_batch {
            body.put("pipeline_batch", batch.to_string());
        }
        if let Some(cap) = self.pipeline_cap {
            body.put("pipeline_cap", cap.to_string());
        }
        if let Some(readonly) = self.readonly {
            body.put("readonly", readonly);
        }
        if let Some(pretty) = self.pretty {
            body.put("pretty", pretty);
        }
    }
}

/// Formats a duration the way the query service expects it, e.g. `"7500ms"`.
pub fn duration_to_n1ql(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}
