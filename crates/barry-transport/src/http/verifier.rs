//! Ed25519 verification of interaction requests.

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use thiserror::Error;

use crate::error::{TransportError, TransportResult};

/// Parses a hex string into a fixed-size byte array.
fn parse_hex<const N: usize>(s: &str) -> Option<[u8; N]> {
    if s.len() != N * 2 {
        return None;
    }

    let mut res = [0; N];
    for (i, byte) in res.iter_mut().enumerate() {
        *byte = u8::from_str_radix(s.get(2 * i..2 * (i + 1))?, 16).ok()?;
    }
    Some(res)
}

/// Why a request failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("signature does not match")]
    Mismatch,
}

/// Checks `x-signature-ed25519` over `timestamp || body` against the
/// application's public key.
#[derive(Debug, Clone)]
pub struct Verifier {
    public_key: VerifyingKey,
}

impl Verifier {
    /// Creates a verifier from the 64-digit hex public key shown in the
    /// developer portal.
    pub fn from_hex(public_key: &str) -> TransportResult<Self> {
        let bytes = parse_hex::<32>(public_key.trim()).ok_or_else(|| {
            TransportError::InvalidPublicKey("expected 64 hex digits".into())
        })?;
        let public_key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| TransportError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { public_key })
    }

    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> Result<(), VerifyError> {
        let signature_bytes = parse_hex::<64>(signature).ok_or(VerifyError::MalformedSignature)?;
        let signature = Signature::from_bytes(&signature_bytes);

        let message = [timestamp.as_bytes(), body].concat();
        self.public_key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::Mismatch)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    pub(crate) fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub(crate) fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7; 32])
    }

    pub(crate) fn sign(timestamp: &str, body: &[u8]) -> String {
        let message = [timestamp.as_bytes(), body].concat();
        hex(&signing_key().sign(&message).to_bytes())
    }

    fn verifier() -> Verifier {
        Verifier::from_hex(&hex(signing_key().verifying_key().as_bytes())).unwrap()
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex::<4>("bf7dea78"), Some([0xBF, 0x7D, 0xEA, 0x78]));
        assert_eq!(parse_hex::<4>("bf7dea7"), None);
        assert_eq!(parse_hex::<4>("bf7dea789"), None);
        assert_eq!(parse_hex::<4>("bf7dea7x"), None);
        assert_eq!(parse_hex(""), Some([]));
    }

    #[test]
    fn test_valid_signature_passes() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);
        assert_eq!(verifier().verify(&signature, "1700000000", body), Ok(()));
    }

    #[test]
    fn test_tampered_request_fails() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        assert_eq!(
            verifier().verify(&signature, "1700000001", body),
            Err(VerifyError::Mismatch)
        );
        assert_eq!(
            verifier().verify(&signature, "1700000000", br#"{"type":2}"#),
            Err(VerifyError::Mismatch)
        );
        assert_eq!(
            verifier().verify("zz", "1700000000", body),
            Err(VerifyError::MalformedSignature)
        );
    }

    #[test]
    fn test_bad_public_key_is_rejected() {
        assert!(matches!(
            Verifier::from_hex("1234"),
            Err(TransportError::InvalidPublicKey(_))
        ));
    }
}
