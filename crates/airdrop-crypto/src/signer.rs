use airdrop_types::{SignedVoucher, Voucher, VoucherSignature};
use alloy_primitives::{hex, keccak256, Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::hasher::VoucherHasher;

/// `n / 2` for secp256k1. Signatures with `s` above this are the malleable
/// twin of a low-`s` signature and are refused.
const HALF_ORDER: [u8; 32] =
    hex!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// secp256k1 signing key held by the issuer (private).
pub struct IssuerKey(SigningKey);

impl IssuerKey {
    /// Generate a new random issuer key.
    pub fn generate() -> Self {
        Self(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Create from a raw 32-byte secret scalar.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, SignerError> {
        SigningKey::from_slice(&bytes)
            .map(Self)
            .map_err(|_| SignerError::InvalidKey)
    }

    /// Parse a hex secret, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| SignerError::InvalidKey)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| SignerError::InvalidKey)?;
        Self::from_bytes(arr)
    }

    /// Raw secret bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// The account address this key signs as.
    pub fn address(&self) -> Address {
        address_of(self.0.verifying_key())
    }

    /// Sign a precomputed 32-byte digest.
    pub fn sign_digest(&self, digest: &B256) -> Result<VoucherSignature, SignerError> {
        let (signature, recovery_id) = self
            .0
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|_| SignerError::SigningFailed)?;
        let bytes = signature.to_bytes();
        Ok(VoucherSignature::new(
            B256::from_slice(&bytes[..32]),
            B256::from_slice(&bytes[32..]),
            27 + recovery_id.to_byte(),
        ))
    }

    /// Hash and sign a voucher under the hasher's domain.
    pub fn sign_voucher(
        &self,
        hasher: &VoucherHasher,
        voucher: Voucher,
    ) -> Result<SignedVoucher, SignerError> {
        let signature = self.sign_digest(&hasher.digest(&voucher))?;
        Ok(SignedVoucher::new(voucher, signature))
    }
}

impl std::fmt::Debug for IssuerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IssuerKey(<redacted>)")
    }
}

/// Recover the signer of `digest`, or [`Address::ZERO`] if the signature is
/// unusable.
///
/// Never fails: a malformed signature yields the zero address, which can
/// never equal a configured issuer.
///
/// Only low-`s` signatures recover. Issuers must produce canonical
/// signatures; the high-`s` twin of a valid signature yields the zero
/// address. [`IssuerKey::sign_digest`] always emits low `s`.
pub fn recover_signer(digest: &B256, signature: &VoucherSignature) -> Address {
    try_recover(digest, signature).unwrap_or(Address::ZERO)
}

/// Recover the signer of `digest`, reporting why recovery failed.
pub fn try_recover(digest: &B256, signature: &VoucherSignature) -> Result<Address, SignerError> {
    let recovery_id = signature
        .recovery_id()
        .and_then(RecoveryId::from_byte)
        .ok_or(SignerError::InvalidRecoveryId(signature.v))?;

    if U256::from_be_bytes(signature.s.0) > U256::from_be_bytes(HALF_ORDER) {
        return Err(SignerError::MalleableSignature);
    }

    let mut packed = [0u8; 64];
    packed[..32].copy_from_slice(signature.r.as_slice());
    packed[32..].copy_from_slice(signature.s.as_slice());
    let parsed = Signature::from_slice(&packed).map_err(|_| SignerError::InvalidSignature)?;

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &parsed, recovery_id)
        .map_err(|_| SignerError::InvalidSignature)?;
    Ok(address_of(&key))
}

/// Account address of a public key: last 20 bytes of the keccak hash of the
/// uncompressed point (without its `0x04` tag).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Errors from signing and recovery.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid key")]
    InvalidKey,
    #[error("signing failed")]
    SigningFailed,
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),
    #[error("signature s-value is not in the lower half order")]
    MalleableSignature,
    #[error("invalid signature")]
    InvalidSignature,
}
