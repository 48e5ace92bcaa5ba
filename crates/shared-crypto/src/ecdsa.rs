//! # Ethereum Signatures (secp256k1)
//!
//! Recoverable ECDSA signatures in Ethereum's 65-byte `r || s || v` layout.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization on signing, low-S enforcement on recovery (EIP-2)
//! - Recovery ids 0/1 and 27/28 are both accepted
//!
//! Orchestrators prove custody of their external key and confirm batches
//! with these signatures; the chain only ever recovers and compares
//! addresses, it never stores public keys.

use crate::hashing::{eth_signed_message_hash, keccak256};
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{EthAddress, Hash};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// floor(n / 2).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Byte length of an encoded signature.
pub const SIGNATURE_LEN: usize = 65;

/// Recoverable secp256k1 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthSignature {
    /// R component (big-endian)
    pub r: [u8; 32],
    /// S component (big-endian)
    pub s: [u8; 32],
    /// Recovery id, 27 or 28 when produced by [`EthSigningKey`].
    pub v: u8,
}

impl EthSignature {
    /// Encode as `r || s || v`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Decode from `r || s || v`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignatureFormat);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// True if `s` is in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        // Big-endian byte arrays compare like the integers they encode.
        self.s <= SECP256K1_HALF_ORDER
    }
}

impl fmt::Display for EthSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl fmt::Debug for EthSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthSignature({})", self)
    }
}

impl FromStr for EthSignature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for EthSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.to_bytes().to_vec().serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for EthSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Self::from_slice(&bytes).map_err(de::Error::custom)
        }
    }
}

/// Ethereum address of a verifying key: last 20 bytes of
/// keccak256(uncompressed point without the 0x04 tag).
pub fn address_from_pubkey(public_key: &VerifyingKey) -> EthAddress {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    EthAddress(address)
}

/// Recover the signer's address from a signature over `message_hash`.
pub fn recover_address(message_hash: &Hash, signature: &EthSignature) -> Result<EthAddress, CryptoError> {
    if !signature.is_low_s() {
        return Err(CryptoError::MalleableSignature);
    }
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = Zeroizing::new([0u8; 64]);
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    // Rejects zero scalars and scalars >= n.
    let sig = Signature::from_slice(sig_bytes.as_slice())
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;

    let recovered = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_pubkey(&recovered))
}

/// Check that `signature` over `message_hash` was produced by `expected`.
pub fn verify_signer(
    message_hash: &Hash,
    signature: &EthSignature,
    expected: &EthAddress,
) -> Result<(), CryptoError> {
    let actual = recover_address(message_hash, signature)?;
    if actual != *expected {
        return Err(CryptoError::SignerMismatch {
            expected: *expected,
            actual,
        });
    }
    Ok(())
}

/// Check an EIP-191 personal signature over a 32-byte message hash.
pub fn verify_personal_signer(
    message_hash: &Hash,
    signature: &EthSignature,
    expected: &EthAddress,
) -> Result<(), CryptoError> {
    verify_signer(&eth_signed_message_hash(message_hash), signature, expected)
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    RecoveryId::try_from(id).map_err(|_| CryptoError::InvalidRecoveryId(v))
}

/// s' = n - s.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

/// secp256k1 key held by an orchestrator for its external address.
#[derive(Clone)]
pub struct EthSigningKey {
    signing_key: SigningKey,
}

impl EthSigningKey {
    /// Generate a random key.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex secret, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let secret = secret.trim();
        let digits = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))?,
        );
        let array = Zeroizing::new(
            <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| CryptoError::InvalidPrivateKey)?,
        );
        Self::from_bytes(&array)
    }

    /// Secret key bytes, wiped on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }

    /// External address controlled by this key.
    pub fn address(&self) -> EthAddress {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte prehash; output is low-S with v in {27, 28}.
    pub fn sign_hash(&self, message_hash: &Hash) -> Result<EthSignature, CryptoError> {
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(message_hash)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);

        let mut parity = recid.to_byte() & 1;
        if s > SECP256K1_HALF_ORDER {
            s = invert_s(&s);
            parity ^= 1;
        }
        Ok(EthSignature { r, s, v: 27 + parity })
    }

    /// EIP-191 personal signature over a 32-byte message hash.
    pub fn sign_personal(&self, message_hash: &Hash) -> Result<EthSignature, CryptoError> {
        self.sign_hash(&eth_signed_message_hash(message_hash))
    }
}

impl fmt::Debug for EthSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthSigningKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
