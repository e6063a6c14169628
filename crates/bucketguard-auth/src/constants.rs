//! String constants that define the authentication matching contract.
//!
//! Prefixes are matched literally and case-sensitively against raw header
//! bytes; header names are matched case-insensitively by [`http::HeaderMap`].

/// Algorithm prefix of a SigV4 `Authorization` header.
pub const SIGN_V4_ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Prefix of a bearer-token `Authorization` header. No trailing space.
pub const BEARER_PREFIX: &str = "Bearer";

/// Query parameter whose presence marks a presigned URL.
pub const PRESIGNED_CREDENTIAL_PARAM: &str = "X-Amz-Credential";

/// Content type substring of a browser form POST upload.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Lowercase hex SHA-256 of an empty payload.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Payload hash placeholder used by presigned URLs and unsigned uploads.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Payload hash placeholder of an aws-chunked upload with unsigned chunks and a checksum trailer.
pub const STREAMING_UNSIGNED_PAYLOAD_TRAILER: &str = "STREAMING-UNSIGNED-PAYLOAD-TRAILER";

/// Payload hash placeholder of an aws-chunked upload with per-chunk signatures.
pub const STREAMING_SIGNED_PAYLOAD: &str = "STREAMING-AWS4-HMAC-SHA256-PAYLOAD";

/// As [`STREAMING_SIGNED_PAYLOAD`], followed by a signed trailer.
pub const STREAMING_SIGNED_PAYLOAD_TRAILER: &str = "STREAMING-AWS4-HMAC-SHA256-PAYLOAD-TRAILER";

/// Largest allowed distance between a request's `x-amz-date` and the gateway clock.
pub const MAX_CLOCK_SKEW_SECS: i64 = 15 * 60;

/// Header carrying the SigV4 request timestamp.
pub const X_AMZ_DATE: &str = "x-amz-date";

/// Header carrying the client's payload hash.
pub const X_AMZ_CONTENT_SHA256: &str = "x-amz-content-sha256";

/// Longest validity a presigned URL may claim (seven days).
pub const MAX_PRESIGNED_EXPIRES_SECS: u64 = 604_800;
