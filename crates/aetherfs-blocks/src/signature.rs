//! Content addressing for block bytes.

use std::str::FromStr;

use aetherfs_types::Signature;
use data_encoding::BASE32;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::error::BlockError;

/// Digest algorithm used to address block content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// HMAC-SHA256 (default).
    #[default]
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(BlockError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Compute the content address of a block's bytes.
///
/// The signature is the lowercase base32 encoding of an HMAC over the data
/// with an empty key. It depends only on the bytes, so identical content in
/// any dataset maps to the same signature — the property block-level dedup
/// rests on.
pub fn compute_signature(algorithm: HashAlgorithm, data: &[u8]) -> Signature {
    let digest = match algorithm {
        HashAlgorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(&[]).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        HashAlgorithm::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(&[]).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    };

    Signature::new(BASE32.encode(&digest).to_lowercase())
}
