//! Object storage for payslip PDFs.
//!
//! Stores are constructed once at startup and injected into the payslip
//! generator and the HTTP state. Both backends issue download links signed
//! by a [`UrlSigner`].

mod local;
mod memory;
mod signing;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;
pub use signing::UrlSigner;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{PayrollError, PayrollResult};

/// Content type of rendered payslips.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// How a browser should present a downloaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Display in the browser (payslip preview).
    Inline,
    /// Save as a file (payslip download).
    Attachment,
}

impl Disposition {
    /// Maps the HR portal's mode letter: `P` previews, `D` downloads.
    pub fn from_mode(mode: &str) -> PayrollResult<Self> {
        match mode {
            "P" => Ok(Self::Inline),
            "D" => Ok(Self::Attachment),
            other => Err(PayrollError::InvalidPayslipMode {
                mode: other.to_string(),
            }),
        }
    }

    /// Returns the `Content-Disposition` type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = PayrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(Self::Inline),
            "attachment" => Ok(Self::Attachment),
            _ => Err(PayrollError::InvalidSignature),
        }
    }
}

/// A downloaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// The object bytes.
    pub bytes: Vec<u8>,
    /// The MIME type recorded at upload.
    pub content_type: String,
}

/// Durable storage for rendered payslips.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// A short name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Stores `bytes` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> PayrollResult<()>;

    /// Reads the object under `key`, failing with `ObjectNotFound` if absent.
    async fn download(&self, key: &str) -> PayrollResult<StoredObject>;

    /// Returns true if an object is stored under `key`.
    async fn exists(&self, key: &str) -> PayrollResult<bool>;

    /// Removes the object under `key`. Returns false if there was none.
    async fn delete(&self, key: &str) -> PayrollResult<bool>;

    /// Returns a link to `key` that stays valid for `ttl`.
    async fn signed_url(
        &self,
        key: &str,
        disposition: Disposition,
        ttl: Duration,
    ) -> PayrollResult<String>;
}

/// Rejects keys that are empty, absolute, or contain empty, `.` or `..` segments.
///
/// # Examples
///
/// ```
/// use payroll_engine::storage::validate_key;
///
/// assert!(validate_key("emp_001/emp_001-01~2026.pdf").is_ok());
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("/emp_001.pdf").is_err());
/// assert!(validate_key("emp_001//a.pdf").is_err());
/// ```
pub fn validate_key(key: &str) -> PayrollResult<()> {
    let invalid = |message: &str| PayrollError::Storage {
        key: key.to_string(),
        message: message.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(invalid("key must be a relative path"));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid("key contains an empty or relative segment"));
    }
    Ok(())
}
