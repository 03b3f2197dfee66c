//! Object storage seam used by the publisher.
//!
//! Backends report failures as a typed [`StoreErrorKind`] so callers can
//! react to "this bucket does not do ACLs" without reading error text.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Canned ACL attached to an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CannedAcl {
    PublicRead,
}

impl CannedAcl {
    pub fn as_header_value(self) -> &'static str {
        match self {
            CannedAcl::PublicRead => "public-read",
        }
    }
}

/// Object bytes, shared between an upload and its retry without copying.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectBody(Arc<Vec<u8>>);

impl ObjectBody {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ObjectBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }
}

impl AsRef<[u8]> for ObjectBody {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One PUT of a whole object.
#[derive(Clone, Debug)]
pub struct PutObject<'a> {
    pub key: &'a str,
    pub body: ObjectBody,
    pub content_type: Option<&'a str>,
    pub acl: Option<CannedAcl>,
}

impl<'a> PutObject<'a> {
    /// Same request with the ACL dropped.
    pub fn without_acl(&self) -> Self {
        Self {
            acl: None,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Backend refused the ACL directive; the same upload without it may work.
    AclUnsupported,
    /// Backend answered with a non-success status.
    Rejected { status: u16, code: Option<String> },
    /// Request never got a response (DNS, TLS, timeout, ...).
    Transport,
    /// Local read of the object body failed.
    Io,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::AclUnsupported => write!(f, "ACL not supported"),
            StoreErrorKind::Rejected { status, code: Some(code) } => {
                write!(f, "HTTP {} {}", status, code)
            }
            StoreErrorKind::Rejected { status, code: None } => write!(f, "HTTP {}", status),
            StoreErrorKind::Transport => write!(f, "transport error"),
            StoreErrorKind::Io => write!(f, "I/O error"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_acl_unsupported(&self) -> bool {
        self.kind == StoreErrorKind::AclUnsupported
    }
}

/// An object store that accepts whole-object uploads.
pub trait ObjectStore {
    fn put_object(&self, request: &PutObject<'_>) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_acl() {
        let req = PutObject {
            key: "a.mp3",
            body: b"abc".to_vec().into(),
            content_type: Some("audio/mpeg"),
            acl: Some(CannedAcl::PublicRead),
        };
        let bare = req.without_acl();
        assert_eq!(bare.acl, None);
        assert_eq!(bare.key, "a.mp3");
        assert_eq!(bare.content_type, Some("audio/mpeg"));
        assert_eq!(bare.body.as_ref(), b"abc");
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::new(
            StoreErrorKind::Rejected {
                status: 403,
                code: Some("AccessDenied".to_string()),
            },
            "Access Denied",
        );
        assert_eq!(err.to_string(), "HTTP 403 AccessDenied: Access Denied");
    }
}
