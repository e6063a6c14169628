//! Rejection responses.
//!
//! Error codes are serialized the way S3 does it:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Error>
//!   <Code>SignatureVersionNotSupported</Code>
//!   <Message>The authorization mechanism you have provided is not supported. ...</Message>
//!   <Resource>/mybucket/key</Resource>
//!   <RequestId>4442587FB7D0A2F9</RequestId>
//! </Error>
//! ```

use std::io;

use bucketguard_auth::ErrorCode;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use crate::body::GatewayBody;

/// Serialize an error code into S3 error XML.
#[must_use]
pub fn error_to_xml(code: ErrorCode, resource: Option<&str>, request_id: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    if let Err(e) = write_error_xml(&mut buf, code, resource, request_id) {
        tracing::error!(error = %e, "failed to serialize error XML");
        buf.clear();
    }
    buf
}

fn write_error_xml(
    buf: &mut Vec<u8>,
    code: ErrorCode,
    resource: Option<&str>,
    request_id: &str,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    writer.create_element("Error").write_inner_content(|w| {
        w.create_element("Code")
            .write_text_content(BytesText::new(code.as_str()))?;
        w.create_element("Message")
            .write_text_content(BytesText::new(code.default_message()))?;
        if let Some(res) = resource {
            w.create_element("Resource")
                .write_text_content(BytesText::new(res))?;
        }
        w.create_element("RequestId")
            .write_text_content(BytesText::new(request_id))?;
        Ok(())
    })?;

    Ok(())
}

/// Structured rejection carrying `code`, echoing `resource` (the request path).
#[must_use]
pub fn error_response(
    code: ErrorCode,
    resource: &str,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let xml = error_to_xml(code, Some(resource), request_id);
    http::Response::builder()
        .status(code.status_code())
        .header(http::header::CONTENT_TYPE, "application/xml")
        .body(GatewayBody::from_bytes(xml))
        .unwrap_or_else(|_| internal_error_response())
}

/// Bare `401 Unauthorized` with no body.
#[must_use]
pub fn unauthorized_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::UNAUTHORIZED)
        .body(GatewayBody::empty())
        .expect("static unauthorized response should be valid")
}

fn internal_error_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::INTERNAL_SERVER_ERROR)
        .body(GatewayBody::empty())
        .expect("static response should be valid")
}
