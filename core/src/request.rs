//! Request descriptor shared by every attempt of a run

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use reqwest::{Method, Url};

use crate::error::{BenchError, BenchResult};

/// A prepared, reusable request
///
/// Built and validated once before any worker starts. Workers share it
/// through an `Arc` and every attempt sends an identical request; the body is
/// a cheaply cloned [`Bytes`] so there is no cursor to rewind between
/// attempts.
#[derive(Clone)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: HeaderMap,
    host: Option<String>,
    body: Option<Bytes>,
}

impl RequestSpec {
    /// Create a request descriptor
    ///
    /// # Errors
    /// Returns a request error if the method or URL cannot be parsed.
    pub fn new(method: &str, url: &str) -> BenchResult<Self> {
        let method = Method::from_str(&method.to_ascii_uppercase())
            .map_err(|e| BenchError::request(format!("invalid method `{method}`: {e}")))?;
        let url =
            Url::parse(url).map_err(|e| BenchError::request(format!("invalid url `{url}`: {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(BenchError::request(format!(
                    "unsupported url scheme `{other}`"
                )))
            }
        }

        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            host: None,
            body: None,
        })
    }

    /// Shorthand for a GET request
    pub fn get(url: &str) -> BenchResult<Self> {
        Self::new("GET", url)
    }

    /// Add a single header
    ///
    /// A `Host` header is not kept in [`headers`](Self::headers); it becomes
    /// the [`host`](Self::host) override instead.
    pub fn with_header(mut self, name: &str, value: &str) -> BenchResult<Self> {
        let header_name = HeaderName::from_str(name.trim())
            .map_err(|e| BenchError::request(format!("invalid header name `{name}`: {e}")))?;
        let value = value.trim();
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| BenchError::request(format!("invalid value for header `{name}`: {e}")))?;

        if header_name == HOST {
            self.host = Some(value.to_string());
        } else {
            self.headers.insert(header_name, header_value);
        }
        Ok(self)
    }

    /// Add headers written as `name: value; name: value`
    ///
    /// Entries without a `:` are sent with an empty value; empty entries are
    /// skipped.
    pub fn with_headers(mut self, raw: &str) -> BenchResult<Self> {
        for (name, value) in Self::parse_headers(raw) {
            self = self.with_header(name, value)?;
        }
        Ok(self)
    }

    /// Set the request body
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// Split a `name: value; name: value` header list into pairs
    pub fn parse_headers(raw: &str) -> Vec<(&str, &str)> {
        raw.split(';')
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (entry.trim(), ""),
            })
            .collect()
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Extra headers sent on every attempt
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Host override, if a `Host` header was given
    ///
    /// Executors send it as the `Host` header in place of the URL authority.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Request body, if any
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.len())
            .field("host", &self.host)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_headers() {
        let parsed = RequestSpec::parse_headers("Accept: text/plain; X-Trace:abc ;; Empty");
        assert_eq!(
            parsed,
            vec![("Accept", "text/plain"), ("X-Trace", "abc"), ("Empty", "")]
        );
    }

    #[test]
    fn test_parse_headers_keeps_colons_in_value() {
        let parsed = RequestSpec::parse_headers("Referer: http://example.com:8080/x");
        assert_eq!(parsed, vec![("Referer", "http://example.com:8080/x")]);
    }

    #[test]
    fn test_host_header_sets_override() {
        let spec = RequestSpec::get("http://127.0.0.1:8080/")
            .unwrap()
            .with_headers("host: api.example.com; X-Id: 7")
            .unwrap();

        assert_eq!(spec.host(), Some("api.example.com"));
        assert_eq!(spec.headers().get("x-id").unwrap(), "7");
        assert!(spec.headers().get(HOST).is_none());
        assert_eq!(spec.headers().len(), 1);
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let spec = RequestSpec::new("post", "http://localhost/").unwrap();
        assert_eq!(spec.method(), &Method::POST);
    }

    #[test]
    fn test_invalid_url_is_request_error() {
        let err = RequestSpec::get("not a url").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Request);
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = RequestSpec::get("ftp://example.com/file").unwrap_err();
        assert!(err.message.contains("ftp"));
    }

    #[test]
    fn test_invalid_header_name() {
        let result = RequestSpec::get("http://localhost/")
            .unwrap()
            .with_headers("bad name: x");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_body_is_none() {
        let spec = RequestSpec::get("http://localhost/").unwrap().with_body("");
        assert!(spec.body().is_none());

        let spec = spec.with_body("payload");
        assert_eq!(spec.body().map(|b| b.as_ref()), Some(&b"payload"[..]));
    }
}
