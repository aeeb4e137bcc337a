use crate::core::config::Credentials;
use crate::core::errors::GlobeError;
use crate::core::kernel::{decode_secret, sign, RequestDescriptor, SignedHeaders, Signer, PROCESS_NONCE};
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use zeroize::Zeroizing;

pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";
pub const ACCESS_SIGNATURE_HEADER: &str = "X-Access-Signature";
pub const ACCESS_NONCE_HEADER: &str = "X-Access-Nonce";
pub const ACCESS_PASSPHRASE_HEADER: &str = "X-Access-Passphrase";

/// The four authentication headers attached to the WebSocket handshake and
/// to private REST calls
#[derive(Clone)]
pub struct AuthHeaders {
    pub access_key: String,
    pub signature: String,
    pub nonce: u64,
    pub passphrase: Secret<String>,
}

impl AuthHeaders {
    /// Header pairs in the order Globe documents them
    pub fn headers(&self) -> SignedHeaders {
        vec![
            (ACCESS_KEY_HEADER, self.access_key.clone()),
            (ACCESS_SIGNATURE_HEADER, self.signature.clone()),
            (ACCESS_NONCE_HEADER, self.nonce.to_string()),
            (
                ACCESS_PASSPHRASE_HEADER,
                self.passphrase.expose_secret().clone(),
            ),
        ]
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("access_key", &self.access_key)
            .field("signature", &self.signature)
            .field("nonce", &self.nonce)
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// Builds Globe authentication headers
///
/// The signature is base64(HMAC-SHA256(base64decode(secret), payload)) where
/// payload is the nonce, upper-case method, path and body concatenated.
/// Query strings are not part of the payload.
pub struct GlobeSigner {
    api_key: String,
    passphrase: Secret<String>,
    secret: Zeroizing<Vec<u8>>,
}

impl GlobeSigner {
    pub fn new(credentials: &Credentials) -> Result<Self, GlobeError> {
        if !credentials.is_complete() {
            return Err(GlobeError::MissingCredentials);
        }

        Ok(Self {
            api_key: credentials.api_key.clone(),
            passphrase: Secret::new(credentials.passphrase().to_string()),
            secret: decode_secret(credentials.secret())?,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Headers for `descriptor` using the next process-wide nonce
    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<AuthHeaders, GlobeError> {
        self.build_with_nonce(descriptor, PROCESS_NONCE.next_nonce())
    }

    /// Headers for `descriptor` with a caller-chosen nonce
    pub fn build_with_nonce(
        &self,
        descriptor: &RequestDescriptor,
        nonce: u64,
    ) -> Result<AuthHeaders, GlobeError> {
        let signature = sign(&self.secret, &descriptor.payload(nonce))?;

        Ok(AuthHeaders {
            access_key: self.api_key.clone(),
            signature,
            nonce,
            passphrase: self.passphrase.clone(),
        })
    }
}

impl Signer for GlobeSigner {
    fn sign_request(&self, descriptor: &RequestDescriptor) -> Result<SignedHeaders, GlobeError> {
        Ok(self.build(descriptor)?.headers())
    }
}

impl fmt::Debug for GlobeSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobeSigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
