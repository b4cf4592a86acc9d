use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

use crate::error::{ErrorKind, FrameworkError};

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Checks the signature Discord attaches to every interaction request.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Parses the application's hex encoded public key.
    ///
    /// # Errors
    ///
    /// Returns Err if the key is not 32 bytes of valid hex or not a valid point.
    pub fn from_hex(public_key: &str) -> Result<Self, FrameworkError> {
        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        hex::decode_to_slice(public_key.trim(), &mut bytes).map_err(signature_error)?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(signature_error)?;
        Ok(Self { key })
    }

    /// # Errors
    ///
    /// Returns Err if the signature is malformed or does not match
    /// `timestamp` followed by `body`.
    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> Result<(), FrameworkError> {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        hex::decode_to_slice(signature, &mut bytes).map_err(signature_error)?;
        let signature = Signature::from_bytes(&bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(signature_error)
    }
}

fn signature_error<E>(err: E) -> FrameworkError
where
    E: std::error::Error + Send + Sync + 'static,
{
    FrameworkError::from_parts(ErrorKind::Signature, Some(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn keys() -> (SigningKey, SignatureVerifier) {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let public = hex::encode(signing.verifying_key().to_bytes());
        (signing, SignatureVerifier::from_hex(&public).unwrap())
    }

    #[test]
    fn accepts_a_valid_signature() {
        let (signing, verifier) = keys();
        let body = br#"{"type":1}"#;
        let signature = signing.sign(&[b"1700000000".as_slice(), body].concat());

        verifier
            .verify(&hex::encode(signature.to_bytes()), "1700000000", body)
            .unwrap();
    }

    #[test]
    fn rejects_a_tampered_body() {
        let (signing, verifier) = keys();
        let signature = signing.sign(b"1700000000{\"type\":1}");

        let res = verifier.verify(
            &hex::encode(signature.to_bytes()),
            "1700000000",
            br#"{"type":2}"#,
        );
        assert!(matches!(res.unwrap_err().kind(), ErrorKind::Signature));
    }

    #[test]
    fn rejects_garbage() {
        let (_, verifier) = keys();
        assert!(verifier.verify("not hex", "1", b"{}").is_err());
        assert!(SignatureVerifier::from_hex("abcd").is_err());
    }
}
