use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteError;

/// Opaque record shape; only the fields column accessors touch matter.
pub type Record = Value;

/// One page of a remote collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultPage {
    pub data: Vec<Record>,
    /// Total matching records across all pages.
    pub total: u64,
}

#[derive(Deserialize)]
struct RawPage {
    data: Vec<Record>,
    #[serde(default)]
    total: Option<u64>,
}

impl ResultPage {
    pub fn new(data: Vec<Record>, total: u64) -> Self {
        Self { data, total }
    }

    /// Decode a `{ data: [...], total: n }` body; a missing total falls back to the row count.
    pub fn from_value(body: Value) -> Result<Self, RemoteError> {
        let raw: RawPage = serde_json::from_value(body)
            .map_err(|e| RemoteError::InvalidResponse(format!("result page: {e}")))?;
        let total = raw.total.unwrap_or(raw.data.len() as u64);
        Ok(Self {
            data: raw.data,
            total,
        })
    }
}
