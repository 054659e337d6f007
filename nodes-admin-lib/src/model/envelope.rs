//! Response envelopes.

use serde::Deserialize;
use serde::Serialize;

/// `{data: T}` envelope returned by most admin endpoints.
///
/// `data` is optional on the wire: error bodies and empty results omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
}

impl<T: Default> ApiResponse<T> {
    /// Returns the payload, or the empty value when `data` was absent or null.
    pub fn into_data_or_default(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// `{data: T, count, page, cursor}` envelope for paginated lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: T,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub cursor: Option<i64>,
}

impl<T> Paginated<T> {
    /// Maps the page payload, keeping the pagination fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Paginated<U> {
        Paginated {
            data: f(self.data),
            count: self.count,
            page: self.page,
            cursor: self.cursor,
        }
    }
}

/// `{message}` body the API sends with failures.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_defaults_to_empty() {
        let envelope: ApiResponse<Vec<u32>> = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_data_or_default().is_empty());

        let envelope: ApiResponse<Vec<u32>> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(envelope.into_data_or_default().is_empty());
    }

    #[test]
    fn test_paginated_fields() {
        let page: Paginated<Vec<u32>> =
            serde_json::from_str(r#"{"data":[1,2],"count":10,"page":2,"cursor":7}"#).unwrap();
        assert_eq!(page.count, 10);
        assert_eq!(page.cursor, Some(7));
        assert_eq!(page.map(|d| d.len()).data, 2);
    }
}
