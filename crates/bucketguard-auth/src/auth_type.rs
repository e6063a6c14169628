//! The closed set of authentication schemes a request can claim.

use std::fmt;

/// Authentication scheme detected for a request.
///
/// Every request maps to exactly one variant; see [`classify`](crate::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    /// An `Authorization` header of an unrecognized shape.
    Unknown,
    /// No credentials at all.
    Anonymous,
    /// SigV4 signature carried in query parameters.
    Presigned,
    /// Browser form upload whose signature lives in the multipart body.
    PostPolicy,
    /// SigV4 signature carried in the `Authorization` header.
    Signed,
    /// Bearer token in the `Authorization` header.
    TokenAuth,
}

impl AuthType {
    /// All variants, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Unknown,
        Self::Anonymous,
        Self::Presigned,
        Self::PostPolicy,
        Self::Signed,
        Self::TokenAuth,
    ];

    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Anonymous => "anonymous",
            Self::Presigned => "presigned",
            Self::PostPolicy => "post-policy",
            Self::Signed => "signed",
            Self::TokenAuth => "token",
        }
    }

    /// Whether the cryptographic check for this scheme happens in a later stage.
    #[must_use]
    pub fn is_deferred(self) -> bool {
        matches!(
            self,
            Self::Anonymous | Self::Presigned | Self::Signed | Self::PostPolicy
        )
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
