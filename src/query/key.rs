//! Cache keys addressing one (endpoint, parameter set) combination.

use std::fmt;

use serde::Serialize;

/// Deterministic identifier for a cached query.
///
/// Two requests with equal parameters map to the same key regardless of the
/// field order of the parameter value: parameters are canonicalized through
/// `serde_json::Value`, whose object maps are ordered by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: String,
    params: String,
}

impl QueryKey {
    pub fn new<P: Serialize>(endpoint: impl Into<String>, params: &P) -> Result<Self, serde_json::Error> {
        let canonical = serde_json::to_value(params)?;
        Ok(Self {
            endpoint: endpoint.into(),
            params: canonical.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.endpoint, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_params_equal_keys() {
        let a = QueryKey::new("fires/total", &json!({"fromDate": 1, "toDate": 2})).unwrap();
        let b = QueryKey::new("fires/total", &json!({"fromDate": 1, "toDate": 2})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a = QueryKey::new("fires/total", &json!({"fromDate": 1, "toDate": 2})).unwrap();
        let b = QueryKey::new("fires/total", &json!({"toDate": 2, "fromDate": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_endpoint_different_key() {
        let params = json!({"fromDate": 1, "toDate": 2});
        let a = QueryKey::new("fires/total", &params).unwrap();
        let b = QueryKey::new("fires/months", &params).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_params_different_key() {
        let a = QueryKey::new("fires/total", &json!({"fromDate": 1, "toDate": 2})).unwrap();
        let b = QueryKey::new("fires/total", &json!({"fromDate": 1, "toDate": 3})).unwrap();
        assert_ne!(a, b);
    }
}
