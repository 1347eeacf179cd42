//! Deterministic Schnorr signatures over Ed25519 points.
//!
//! `sig = R || s` with `r = H(nonce_domain || x || m)`, `R = rG`,
//! `c = H(R || P || m)`, `s = r + c*x`. Identical inputs always produce the
//! identical signature.

use crate::keys::SecretKey;
use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::CompressedEdwardsY;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};

const NONCE_DOMAIN: &[u8] = b"coinward/nonce";

pub const SIGNATURE_SIZE: usize = 64;

fn hash_to_scalar(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Sign `message` with `secret`.
pub fn sign(secret: &SecretKey, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
    let x = secret.scalar();
    let public = secret.public_key();

    let r = hash_to_scalar(&[NONCE_DOMAIN, &secret.as_bytes()[..], message]);
    let big_r = (ED25519_BASEPOINT_TABLE * &r).compress().to_bytes();
    let c = hash_to_scalar(&[&big_r[..], &public[..], message]);
    let s = r + c * x;

    let mut sig = [0u8; SIGNATURE_SIZE];
    sig[..32].copy_from_slice(&big_r);
    sig[32..].copy_from_slice(s.as_bytes());
    sig
}

/// Verify a signature produced by [`sign`].
pub fn verify(public: &[u8; 32], message: &[u8], signature: &[u8; SIGNATURE_SIZE]) -> bool {
    let mut r_bytes = [0u8; 32];
    r_bytes.copy_from_slice(&signature[..32]);
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);

    let Some(big_r) = CompressedEdwardsY(r_bytes).decompress() else {
        return false;
    };
    let Some(point) = CompressedEdwardsY(*public).decompress() else {
        return false;
    };
    let Some(s) = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) else {
        return false;
    };

    let c = hash_to_scalar(&[&r_bytes[..], &public[..], message]);
    let lhs = ED25519_BASEPOINT_TABLE * &s;
    let rhs = big_r + c * point;
    lhs.compress() == rhs.compress()
}
