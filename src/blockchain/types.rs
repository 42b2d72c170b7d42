//! Chain-specific types and error definitions.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during blockchain operations.
///
/// Variants carry rendered detail rather than source errors so a single result
/// can be handed to every caller sharing an in-flight read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// The node answered with a JSON-RPC error or a contract execution error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The request never produced a usable JSON-RPC response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The wallet rejected or failed the request.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// A view result did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A capability the call needs is missing (no account, no wallet).
    #[error("Blockchain not available: {0}")]
    NotAvailable(String),

    /// A signed transaction was rejected or failed.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Caller input was rejected before anything was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Outcome of a read that went through the pipeline.
///
/// Throttling is kept apart from an empty answer so callers can retry the
/// former and render the latter.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewResult<T> {
    /// The view method returned a value.
    Value(T),
    /// The view method returned nothing (no bytes or JSON `null`).
    Empty,
    /// The rate limiter skipped the call; no data is available right now.
    Throttled,
}

impl<T> ViewResult<T> {
    pub fn is_throttled(&self) -> bool {
        matches!(self, ViewResult::Throttled)
    }

    /// The value, if there is one.
    pub fn value(self) -> Option<T> {
        match self {
            ViewResult::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            ViewResult::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewResult<U> {
        match self {
            ViewResult::Value(v) => ViewResult::Value(f(v)),
            ViewResult::Empty => ViewResult::Empty,
            ViewResult::Throttled => ViewResult::Throttled,
        }
    }

    /// Treat an empty answer as `default`, keeping `Throttled` distinct.
    pub fn or_empty(self, default: T) -> ViewResult<T> {
        match self {
            ViewResult::Empty => ViewResult::Value(default),
            other => other,
        }
    }
}

impl<T> From<Option<T>> for ViewResult<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => ViewResult::Value(v),
            None => ViewResult::Empty,
        }
    }
}

/// Identity of a memoizable view call.
///
/// Arguments are stored in canonical JSON (object keys sorted at every level),
/// so `{"a":1,"b":2}` and `{"b":2,"a":1}` are the same call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSignature {
    pub contract_id: String,
    pub method: String,
    pub args: String,
}

impl CallSignature {
    pub fn new(contract_id: &str, method: &str, args: &Value) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            method: method.to_string(),
            args: canonical_json(args),
        }
    }
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.contract_id, self.method, self.args)
    }
}

/// Serialize a JSON value with object keys sorted recursively.
///
/// Does not rely on `serde_json`'s map ordering, which flips to insertion
/// order when any crate in the build enables `preserve_order`.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signature_ignores_key_order() {
        let mut first = serde_json::Map::new();
        first.insert("event_name".into(), json!("Meetup"));
        first.insert("account_id".into(), json!("alice.testnet"));
        let mut second = serde_json::Map::new();
        second.insert("account_id".into(), json!("alice.testnet"));
        second.insert("event_name".into(), json!("Meetup"));

        let a = CallSignature::new("poap.testnet", "get_whitelist", &Value::Object(first));
        let b = CallSignature::new("poap.testnet", "get_whitelist", &Value::Object(second));
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_distinguishes_calls() {
        let args = json!({ "account_id": "alice.testnet" });
        let a = CallSignature::new("poap.testnet", "is_owner", &args);
        let b = CallSignature::new("poap.testnet", "is_organizer", &args);
        let c = CallSignature::new("other.testnet", "is_owner", &args);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_canonical_json_nested() {
        let value = json!({ "b": [ { "y": 1, "x": "q\"" } ], "a": null });
        assert_eq!(canonical_json(&value), r#"{"a":null,"b":[{"x":"q\"","y":1}]}"#);
    }

    #[test]
    fn test_signature_display() {
        let sig = CallSignature::new("poap.testnet", "get_all_events", &json!({}));
        assert_eq!(sig.to_string(), "poap.testnet-get_all_events-{}");
    }

    #[test]
    fn test_view_result_helpers() {
        let v: ViewResult<Vec<u8>> = None.into();
        assert_eq!(v.or_empty(Vec::new()), ViewResult::Value(Vec::new()));
        assert_eq!(ViewResult::<u8>::Throttled.or_empty(0), ViewResult::Throttled);
        assert_eq!(ViewResult::Value(2).map(|x| x * 2).value(), Some(4));
        assert!(ViewResult::<()>::Throttled.is_throttled());
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::Rpc("Contract method is not found".into());
        assert!(err.to_string().contains("not found"));
    }
}
