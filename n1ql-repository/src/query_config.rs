//! Configuration shared by the repository queries of one bucket.

use std::ops::Deref;
use std::sync::Arc;

use crate::errors::{ErrorKind, N1qlError, N1qlResult};
use crate::query::{DuplicatePolicy, QueryParams};

/// The bucket used when none is configured.
pub const DEFAULT_BUCKET_NAME: &str = "default";

/// The document field that stores the entity type name.
pub const DEFAULT_TYPE_KEY: &str = "_class";

/// Public interface for repository query configuration.
///
/// Cloning is cheap; all clones share the same settings.
///
/// # Examples
///
/// ```rust,ignore
/// use n1ql_repository::QueryConfig;
/// use n1ql_repository::query::{DuplicatePolicy, QueryParams, ScanConsistency};
///
/// let config = QueryConfig::new()
///     .bucket_name("travel-sample")
///     .duplicate_policy(DuplicatePolicy::Reject)
///     .default_params(QueryParams::new().consistency(ScanConsistency::RequestPlus));
/// config.validate()?;
/// ```
#[derive(Clone, Debug)]
pub struct QueryConfig {
    inner: Arc<QueryConfigInner>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        QueryConfig {
            inner: Arc::new(QueryConfigInner::default()),
        }
    }

    /// Sets the bucket that generated statements select from.
    pub fn bucket_name(self, bucket_name: &str) -> Self {
        self.update(|inner| inner.bucket_name = bucket_name.to_string())
    }

    /// Sets the document field that holds the entity type name.
    pub fn type_key(self, type_key: &str) -> Self {
        self.update(|inner| inner.type_key = type_key.to_string())
    }

    pub fn duplicate_policy(self, policy: DuplicatePolicy) -> Self {
        self.update(|inner| inner.duplicate_policy = policy)
    }

    /// Options applied to a request when the call passes none of its own.
    pub fn default_params(self, params: QueryParams) -> Self {
        self.update(|inner| inner.default_params = Some(params))
    }

    /// Stamps every request that has no client context id with a random one.
    pub fn generate_context_id(self, enabled: bool) -> Self {
        self.update(|inner| inner.generate_context_id = enabled)
    }

    /// Checks that the settings can produce statements.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidConfiguration] when the bucket name or type key is
    /// blank.
    pub fn validate(&self) -> N1qlResult<()> {
        if self.inner.bucket_name.trim().is_empty() {
            log::error!("Bucket name cannot be empty");
            return Err(N1qlError::new(
                "Bucket name cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }
        if self.inner.type_key.trim().is_empty() {
            log::error!("Type key cannot be empty");
            return Err(N1qlError::new(
                "Type key cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }
        Ok(())
    }

    fn update(self, f: impl FnOnce(&mut QueryConfigInner)) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        f(&mut inner);
        QueryConfig {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for QueryConfig {
    type Target = QueryConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Settings behind a [QueryConfig].
#[derive(Clone, Debug)]
pub struct QueryConfigInner {
    bucket_name: String,
    type_key: String,
    duplicate_policy: DuplicatePolicy,
    default_params: Option<QueryParams>,
    generate_context_id: bool,
}

impl Default for QueryConfigInner {
    fn default() -> Self {
        QueryConfigInner {
            bucket_name: DEFAULT_BUCKET_NAME.to_string(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
            duplicate_policy: DuplicatePolicy::default(),
            default_params: None,
            generate_context_id: false,
        }
    }
}

impl QueryConfigInner {
    pub fn get_bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn get_type_key(&self) -> &str {
        &self.type_key
    }

    pub fn get_duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    pub fn get_default_params(&self) -> Option<&QueryParams> {
        self.default_params.as_ref()
    }

    pub fn is_generate_context_id(&self) -> bool {
        self.generate_context_id
    }
}
