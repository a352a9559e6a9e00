use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::{InjectedWallet, WalletError};

const MESSAGE_DOMAIN: &[u8] = b"healthchain:v1:message:";

/// In-process ed25519 wallet for development and tests.
///
/// The address is `0x` followed by the first 20 bytes of SHA-256 over the
/// public key. Signatures are hex with a `0x` prefix.
pub struct LocalKeyWallet {
    signing_key: SigningKey,
}

impl LocalKeyWallet {
    pub fn new_random() -> Self {
        let mut rng = OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    pub fn from_secret_key_bytes(secret_key: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret_key),
        }
    }

    pub fn address(&self) -> String {
        let digest = Sha256::digest(self.signing_key.verifying_key().to_bytes());
        format!("0x{}", to_hex(&digest[..20]))
    }

    pub fn sign(&self, message: &str) -> String {
        let signature: Signature = self.signing_key.sign(&signing_input(message));
        format!("0x{}", to_hex(&signature.to_bytes()))
    }

    pub fn verify(&self, message: &str, signature: &str) -> bool {
        let Some(bytes) = from_hex(signature.trim_start_matches("0x")) else {
            return false;
        };
        let Ok(raw) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            return false;
        };
        self.signing_key
            .verifying_key()
            .verify(&signing_input(message), &Signature::from_bytes(&raw))
            .is_ok()
    }
}

#[async_trait(?Send)]
impl InjectedWallet for LocalKeyWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(vec![self.address()])
    }

    async fn sign_message(&self, message: &str, address: &str) -> Result<String, WalletError> {
        if !address.eq_ignore_ascii_case(&self.address()) {
            return Err(WalletError::Provider(format!("unknown account: {address}")));
        }
        Ok(self.sign(message))
    }
}

fn signing_input(message: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(MESSAGE_DOMAIN.len() + message.len());
    input.extend_from_slice(MESSAGE_DOMAIN);
    input.extend_from_slice(message.as_bytes());
    input
}

fn to_hex(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

fn from_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(input.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_twenty_bytes_of_hex() {
        let wallet = LocalKeyWallet::from_secret_key_bytes([7; 32]);
        let address = wallet.address();
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 42);
        assert_eq!(address, LocalKeyWallet::from_secret_key_bytes([7; 32]).address());
    }

    #[test]
    fn signatures_verify_only_for_the_signed_message() {
        let wallet = LocalKeyWallet::new_random();
        let message = "I consent to: Research Study Participation for patient: patient-001";
        let signature = wallet.sign(message);

        assert_eq!(signature.len(), 2 + 128);
        assert!(wallet.verify(message, &signature));
        assert!(!wallet.verify("I consent to: something else", &signature));
        assert!(!wallet.verify(message, "0xnothex"));
    }

    #[tokio::test]
    async fn refuses_to_sign_for_foreign_accounts() {
        let wallet = LocalKeyWallet::new_random();
        let result = wallet.sign_message("hello", "0x0000").await;
        assert!(matches!(result, Err(WalletError::Provider(_))));
    }
}
