use crate::core::errors::GlobeError;
use crate::core::types::TypesError;
use base64::engine::general_purpose;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::Zeroizing;

/// Signed request headers as (name, value) pairs
pub type SignedHeaders = Vec<(&'static str, String)>;

/// Signer trait for request authentication
///
/// Implementations produce the headers to attach to a request described by
/// `descriptor`. Each call draws a fresh nonce, so two calls never produce the
/// same header set.
pub trait Signer: Send + Sync {
    fn sign_request(&self, descriptor: &RequestDescriptor) -> Result<SignedHeaders, GlobeError>;
}

/// HMAC-SHA256 of `payload` keyed by `secret`, base64 encoded
pub fn sign(secret: &[u8], payload: &str) -> Result<String, GlobeError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| GlobeError::AuthError(format!("Invalid secret key: {}", e)))?;
    mac.update(payload.as_bytes());

    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Decode a base64 secret into raw key bytes, wiped on drop
pub fn decode_secret(secret: &str) -> Result<Zeroizing<Vec<u8>>, GlobeError> {
    let bytes = general_purpose::STANDARD.decode(secret.trim())?;
    Ok(Zeroizing::new(bytes))
}

/// The method and path a signature covers, e.g. `GET/api/v1/ws`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            path: path.into(),
            body: String::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The exact text signed for this descriptor: nonce, method, path and body
    /// concatenated without separators
    pub fn payload(&self, nonce: u64) -> String {
        format!("{}{}{}{}", nonce, self.method, self.path, self.body)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.method, self.path)
    }
}

impl FromStr for RequestDescriptor {
    type Err = TypesError;

    /// Parse the compact `METHOD/path` form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slash = s
            .find('/')
            .ok_or_else(|| TypesError::InvalidDescriptor(s.to_string()))?;
        let (method, path) = s.split_at(slash);

        if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TypesError::InvalidDescriptor(s.to_string()));
        }

        Ok(Self::new(method, path))
    }
}

/// Millisecond nonce source that never repeats or goes backwards
///
/// If the clock has not advanced since the last call (or stepped back), the
/// previous nonce plus one is issued instead.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn next_nonce(&self) -> u64 {
        let now = current_millis();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous + 1);
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}

/// Process-wide nonce source shared by every signer
pub static PROCESS_NONCE: NonceGenerator = NonceGenerator::new();

/// Get the current timestamp in milliseconds
pub fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
