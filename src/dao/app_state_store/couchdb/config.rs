use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "awards_live";

/// Where the CouchDB state document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouchConfig {
    /// Server root without a trailing slash.
    pub base_url: String,
    /// Database holding the single state document.
    pub database: String,
    /// Basic-auth user and password, used only when both are set.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    /// Read `COUCH_BASE_URL`, the optional `COUCH_DB` and the optional
    /// `COUCH_USERNAME`/`COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CouchResult<Self> {
        let base_url = lookup("COUCH_BASE_URL").ok_or(CouchDaoError::Unconfigured {
            var: "COUCH_BASE_URL",
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            database: lookup("COUCH_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_owned()),
            credentials: lookup("COUCH_USERNAME").zip(lookup("COUCH_PASSWORD")),
        })
    }
}
