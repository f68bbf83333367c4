//! Pure helpers: error code/message extraction (no HTTP, no status logic).

use serde_json::Value;

/// Extract the API error code.
///
/// The `x-amzn-ErrorType` header wins (`Code:http://...` → `Code`). Otherwise
/// the body's `__type` or `code` is used (`namespace#Code` → `Code`).
pub(crate) fn parse_error_code(header: Option<&str>, body: Option<&Value>) -> Option<String> {
    let from_header = header
        .and_then(|h| h.split(':').next())
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let from_body = || {
        let body = body?;
        ["__type", "code", "Code"]
            .iter()
            .find_map(|k| body.get(*k).and_then(Value::as_str))
            .and_then(|t| t.rsplit('#').next())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    };

    from_header.or_else(from_body).map(String::from)
}

/// Extract the human-readable error message from a JSON error body.
pub(crate) fn parse_error_message(body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["message", "Message", "errorMessage"]
            .iter()
            .find_map(|k| b.get(*k).and_then(Value::as_str))
    })
    .unwrap_or_default()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_from_header() {
        let code = parse_error_code(
            Some("ValidationException:http://internal.amazon.com/coral/com.amazon.signer/"),
            None,
        );
        assert_eq!(code.as_deref(), Some("ValidationException"));
    }

    #[test]
    fn test_code_from_body_type() {
        let body = json!({"__type": "com.amazonaws.signer#AccessDeniedException"});
        assert_eq!(
            parse_error_code(None, Some(&body)).as_deref(),
            Some("AccessDeniedException")
        );

        let body = json!({"code": "ThrottlingException", "message": "slow down"});
        assert_eq!(
            parse_error_code(Some(""), Some(&body)).as_deref(),
            Some("ThrottlingException")
        );
    }

    #[test]
    fn test_no_code() {
        assert_eq!(parse_error_code(None, None), None);
        assert_eq!(parse_error_code(None, Some(&json!({"message": "x"}))), None);
    }

    #[test]
    fn test_message_variants() {
        assert_eq!(parse_error_message(Some(&json!({"message": "a"}))), "a");
        assert_eq!(parse_error_message(Some(&json!({"Message": "b"}))), "b");
        assert_eq!(parse_error_message(Some(&json!({}))), "");
        assert_eq!(parse_error_message(None), "");
    }
}
