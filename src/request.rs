use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Method};
use serde::Serialize;

use crate::{AnnounceError, Result};

/// A fully described outbound request that can be sent any number of times.
///
/// Headers must carry `Authorization` and `Content-Type`; both are checked
/// case-insensitively when the request is built.
#[derive(Clone, PartialEq, Eq)]
pub struct RetryRequest {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    body: String,
}

impl std::fmt::Debug for RetryRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(header::AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("RetryRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl RetryRequest {
    pub fn new(
        url: impl Into<String>,
        method: Method,
        headers: BTreeMap<String, String>,
        body: impl Into<String>,
    ) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AnnounceError::InvalidRequest("url cannot be empty".to_owned()));
        }
        for required in [header::AUTHORIZATION, header::CONTENT_TYPE] {
            let present = headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case(required.as_str()));
            if !present {
                return Err(AnnounceError::InvalidRequest(format!(
                    "missing required header '{}'",
                    required.as_str()
                )));
            }
        }
        Ok(Self {
            url,
            method,
            headers,
            body: body.into(),
        })
    }

    /// Builds a JSON `POST` carrying the given authorization header value.
    pub fn post_json<T: Serialize + ?Sized>(
        url: impl Into<String>,
        authorization: impl Into<String>,
        payload: &T,
    ) -> Result<Self> {
        let body = serde_json::to_string(payload)
            .map_err(|err| AnnounceError::Encode(err.to_string()))?;
        let headers = BTreeMap::from([
            (header::AUTHORIZATION.as_str().to_owned(), authorization.into()),
            (header::CONTENT_TYPE.as_str().to_owned(), "application/json".to_owned()),
        ]);
        Self::new(url, Method::POST, headers, body)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub(crate) fn to_builder(
        &self,
        http: &reqwest::Client,
        timeout: Duration,
    ) -> reqwest::RequestBuilder {
        let mut builder = http
            .request(self.method.clone(), &self.url)
            .timeout(timeout)
            .body(self.body.clone());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use reqwest::Method;
    use serde_json::json;

    use super::RetryRequest;
    use crate::AnnounceError;

    #[test]
    fn post_json_sets_required_headers() {
        let request = RetryRequest::post_json(
            "https://example.test/model",
            "Bearer abc",
            &json!({"inputs": "hi"}),
        )
        .expect("must build request");

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.body(), r#"{"inputs":"hi"}"#);
        assert_eq!(request.headers()["authorization"], "Bearer abc");
        assert_eq!(request.headers()["content-type"], "application/json");
    }

    #[test]
    fn missing_authorization_is_rejected() {
        let headers = BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())]);
        let err = RetryRequest::new("https://example.test", Method::POST, headers, "{}")
            .expect_err("must fail");
        assert!(matches!(err, AnnounceError::InvalidRequest(message) if message.contains("authorization")));
    }

    #[test]
    fn header_names_match_case_insensitively() {
        let headers = BTreeMap::from([
            ("AUTHORIZATION".to_owned(), "Bearer x".to_owned()),
            ("Content-Type".to_owned(), "application/json".to_owned()),
        ]);
        RetryRequest::new("https://example.test", Method::POST, headers, "{}")
            .expect("must accept mixed-case headers");
    }

    #[test]
    fn debug_redacts_authorization_value() {
        let request = RetryRequest::post_json("https://example.test", "Bearer secret-token", &json!({}))
            .expect("must build request");
        let debug = format!("{request:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
