use serde::{Deserialize, Serialize};

use crate::API_VERSION;

/// Success envelope: `{"apiVersion": ..., "data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub api_version: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            data,
        }
    }
}
