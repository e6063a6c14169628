//! Read-only view over an inbound HTTP request.
//!
//! [`RequestView`] is what classification and verification read from. It is
//! implemented for [`http::request::Parts`] and [`http::Request`], so the same
//! logic runs before and after a request is split into head and body.

/// Immutable accessors for the parts of a request authentication looks at.
pub trait RequestView {
    /// The request method.
    fn method(&self) -> &http::Method;

    /// The request URI.
    fn uri(&self) -> &http::Uri;

    /// The request headers.
    fn headers(&self) -> &http::HeaderMap;

    /// First value of the named header, if present.
    fn header(&self, name: &str) -> Option<&http::HeaderValue> {
        self.headers().get(name)
    }

    /// First value of the named header as a string, if present and visible ASCII.
    fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the named header is present, whatever its value.
    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    /// The raw query string, if any.
    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    /// Whether a query parameter with the given (decoded) key is present.
    ///
    /// A bare key such as `?flag` counts as present.
    fn has_query_param(&self, key: &str) -> bool {
        self.query().is_some_and(|q| {
            form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == key)
        })
    }

    /// The request path.
    fn path(&self) -> &str {
        self.uri().path()
    }
}

impl RequestView for http::request::Parts {
    fn method(&self) -> &http::Method {
        &self.method
    }

    fn uri(&self) -> &http::Uri {
        &self.uri
    }

    fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }
}

impl<B> RequestView for http::Request<B> {
    fn method(&self) -> &http::Method {
        http::Request::method(self)
    }

    fn uri(&self) -> &http::Uri {
        http::Request::uri(self)
    }

    fn headers(&self) -> &http::HeaderMap {
        http::Request::headers(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_find_query_param_by_decoded_key() {
        let req = http::Request::builder()
            .uri("/bucket/key?X%2DAmz%2DCredential=AKID&other=1")
            .body(())
            .unwrap();
        assert!(req.has_query_param("X-Amz-Credential"));
        assert!(req.has_query_param("other"));
        assert!(!req.has_query_param("x-amz-credential"));
    }

    #[test]
    fn test_should_treat_bare_query_key_as_present() {
        let req = http::Request::builder()
            .uri("/bucket?X-Amz-Credential")
            .body(())
            .unwrap();
        assert!(req.has_query_param("X-Amz-Credential"));
    }

    #[test]
    fn test_should_look_up_headers_case_insensitively() {
        let (parts, ()) = http::Request::builder()
            .uri("/")
            .header("content-type", "text/plain")
            .body(())
            .unwrap()
            .into_parts();
        assert!(parts.has_header("Content-Type"));
        assert_eq!(parts.header_str("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(RequestView::path(&parts), "/");
    }
}
