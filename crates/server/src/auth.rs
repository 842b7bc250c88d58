use axum::http::{HeaderMap, HeaderValue, Method, header};
use gateway_core::error::GatewayError;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

/// Check method and credential for a non-preflight request.
///
/// The `Bearer ` prefix is optional: a header without it is compared as the
/// literal credential. An empty header counts as missing.
pub fn authenticate(
    method: &Method,
    headers: &HeaderMap,
    shared_secret: &SecretString,
) -> Result<(), GatewayError> {
    if method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let value = headers
        .get(header::AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(GatewayError::AuthMissing)?;

    match extract_credential(value) {
        Some(token) if constant_time_eq(token, shared_secret.expose_secret()) => Ok(()),
        _ => Err(GatewayError::AuthInvalid),
    }
}

/// Strip an optional `Bearer ` prefix. Non-UTF-8 values yield `None`.
pub fn extract_credential(value: &HeaderValue) -> Option<&str> {
    let raw = value.to_str().ok()?;
    Some(raw.strip_prefix("Bearer ").unwrap_or(raw))
}

/// `ct_eq` on slices of different lengths is false.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("correct-secret".to_string())
    }

    fn headers_with(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_extract_credential() {
        let v = HeaderValue::from_static("Bearer abc");
        assert_eq!(extract_credential(&v), Some("abc"));

        // prefix is best-effort: a bare value is the credential itself
        let v = HeaderValue::from_static("abc");
        assert_eq!(extract_credential(&v), Some("abc"));

        // only the exact "Bearer " prefix is stripped
        let v = HeaderValue::from_static("bearer abc");
        assert_eq!(extract_credential(&v), Some("bearer abc"));

        let v = HeaderValue::from_bytes(b"\xffabc").unwrap();
        assert_eq!(extract_credential(&v), None);
    }

    #[test]
    fn test_accepts_correct_secret() {
        let headers = headers_with("Bearer correct-secret");
        assert!(authenticate(&Method::POST, &headers, &secret()).is_ok());

        let headers = headers_with("correct-secret");
        assert!(authenticate(&Method::POST, &headers, &secret()).is_ok());
    }

    #[test]
    fn test_method_checked_before_credentials() {
        let headers = headers_with("Bearer correct-secret");
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let err = authenticate(&method, &headers, &secret()).unwrap_err();
            assert!(matches!(err, GatewayError::MethodNotAllowed));
        }
        let err = authenticate(&Method::GET, &HeaderMap::new(), &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::MethodNotAllowed));
    }

    #[test]
    fn test_missing_header() {
        let err = authenticate(&Method::POST, &HeaderMap::new(), &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::AuthMissing));

        let err = authenticate(&Method::POST, &headers_with(""), &secret()).unwrap_err();
        assert!(matches!(err, GatewayError::AuthMissing));
    }

    #[test]
    fn test_wrong_secret() {
        for auth in [
            "Bearer wrong-secret",
            "Bearer correct-secret ",
            "Bearer correct-secre",
            "Bearer ",
            "Basic correct-secret",
        ] {
            let err = authenticate(&Method::POST, &headers_with(auth), &secret()).unwrap_err();
            assert!(matches!(err, GatewayError::AuthInvalid), "{auth}");
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(!constant_time_eq("", "abc"));
        assert!(constant_time_eq("", ""));
    }
}
