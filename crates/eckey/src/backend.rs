//! Elliptic-curve backend
//!
//! All curve arithmetic and PEM/DER encoding sits behind [`EcBackend`]. The
//! default [`RustCrypto`] backend uses `p256` for secp256r1, `k256` for
//! secp256k1 and `p384` for secp384r1, all through their PKCS#8 / SPKI
//! support.

use tracing::debug;

use crate::raw::{Field, RawEcKey, EC_KEY_TYPE};
use crate::{Curve, KeyError, Result};

/// PEM label of PKCS#8 private keys
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
/// PEM label of SubjectPublicKeyInfo public keys
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Capabilities a key handle needs from an elliptic-curve library
pub trait EcBackend {
    /// Generate a private key record with markers and curve name set
    fn generate(&self, curve: Curve) -> Result<RawEcKey>;

    /// Derive the uncompressed public point (hex) from a private exponent (hex)
    fn derive_public_point(&self, curve: Curve, exponent_hex: &str) -> Result<String>;

    /// Encode a private key as a PKCS#8 PEM block
    fn encode_private_pem(&self, curve: Curve, exponent_hex: &str, point_hex: &str)
        -> Result<String>;

    /// Encode a public key as a SubjectPublicKeyInfo PEM block
    fn encode_public_pem(&self, curve: Curve, point_hex: &str) -> Result<String>;

    /// Re-encode a SEC1 point (hex, compressed or not) in uncompressed form
    fn uncompressed_point(&self, curve: Curve, point_hex: &str) -> Result<String>;

    /// Decode a PKCS#8 private or SPKI public PEM block into a raw record
    fn decode_pem(&self, pem: &str) -> Result<RawEcKey>;
}

/// Freshly generated key pair as two raw records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Private key record
    pub private: RawEcKey,
    /// Matching public-only record
    pub public: RawEcKey,
}

/// Backend over the RustCrypto elliptic-curve crates
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

/// Generate a key pair on `curve` with the default backend
pub fn generate_keypair(curve: Curve) -> Result<KeyPair> {
    let private = RustCrypto.generate(curve)?;
    let public = RawEcKey {
        kind: Some(EC_KEY_TYPE.to_string()),
        prv_key_hex: Field::Null,
        pub_key_hex: private.pub_key_hex.clone(),
        curve_name: private.curve_name.clone(),
        is_public: None,
        is_private: None,
    }
    .with_markers();
    Ok(KeyPair { private, public })
}

fn decode_hex(what: &str, value: &str) -> Result<Vec<u8>> {
    let value = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(value).map_err(|e| KeyError::InvalidKeyMaterial(format!("{}: {}", what, e)))
}

macro_rules! curve_ops {
    ($module:ident, $krate:ident) => {
        mod $module {
            use $krate::elliptic_curve::sec1::ToEncodedPoint;
            use $krate::pkcs8::{
                DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
            };
            use $krate::{PublicKey, SecretKey};
            use rand::rngs::OsRng;

            use super::decode_hex;
            use crate::{KeyError, Result};

            fn point_hex_of(public: &PublicKey) -> String {
                hex::encode(public.to_encoded_point(false).as_bytes())
            }

            fn secret_from_hex(exponent_hex: &str) -> Result<SecretKey> {
                let bytes = decode_hex("private exponent", exponent_hex)?;
                SecretKey::from_slice(&bytes)
                    .map_err(|e| KeyError::InvalidKeyMaterial(format!("private exponent: {}", e)))
            }

            fn public_from_hex(point_hex: &str) -> Result<PublicKey> {
                let bytes = decode_hex("public point", point_hex)?;
                PublicKey::from_sec1_bytes(&bytes)
                    .map_err(|e| KeyError::InvalidKeyMaterial(format!("public point: {}", e)))
            }

            /// Returns `(exponent_hex, point_hex)`
            pub(super) fn generate() -> (String, String) {
                let secret = SecretKey::random(&mut OsRng);
                (hex::encode(secret.to_bytes()), point_hex_of(&secret.public_key()))
            }

            pub(super) fn derive_public_point(exponent_hex: &str) -> Result<String> {
                Ok(point_hex_of(&secret_from_hex(exponent_hex)?.public_key()))
            }

            pub(super) fn uncompressed_point(point_hex: &str) -> Result<String> {
                Ok(point_hex_of(&public_from_hex(point_hex)?))
            }

            pub(super) fn encode_private_pem(exponent_hex: &str, point_hex: &str) -> Result<String> {
                let secret = secret_from_hex(exponent_hex)?;
                if secret.public_key() != public_from_hex(point_hex)? {
                    return Err(KeyError::KeyMismatch);
                }
                let pem = secret
                    .to_pkcs8_pem(LineEnding::LF)
                    .map_err(|e| KeyError::Encoding(e.to_string()))?;
                Ok(pem.to_string())
            }

            pub(super) fn encode_public_pem(point_hex: &str) -> Result<String> {
                public_from_hex(point_hex)?
                    .to_public_key_pem(LineEnding::LF)
                    .map_err(|e| KeyError::Encoding(e.to_string()))
            }

            /// Returns `(exponent_hex, point_hex)` if the PEM holds a key on this curve
            pub(super) fn decode_private_pem(pem: &str) -> Option<(String, String)> {
                let secret = SecretKey::from_pkcs8_pem(pem).ok()?;
                Some((hex::encode(secret.to_bytes()), point_hex_of(&secret.public_key())))
            }

            pub(super) fn decode_public_pem(pem: &str) -> Option<String> {
                PublicKey::from_public_key_pem(pem).ok().map(|p| point_hex_of(&p))
            }
        }
    };
}

curve_ops!(secp256r1, p256);
curve_ops!(secp256k1, k256);
curve_ops!(secp384r1, p384);

impl EcBackend for RustCrypto {
    fn generate(&self, curve: Curve) -> Result<RawEcKey> {
        let (exponent, point) = match curve {
            Curve::Secp256r1 => secp256r1::generate(),
            Curve::Secp256k1 => secp256k1::generate(),
            Curve::Secp384r1 => secp384r1::generate(),
        };
        debug!(%curve, "generated EC key");
        Ok(RawEcKey::private(exponent, point)
            .with_curve_name(curve.name())
            .with_markers())
    }

    fn derive_public_point(&self, curve: Curve, exponent_hex: &str) -> Result<String> {
        match curve {
            Curve::Secp256r1 => secp256r1::derive_public_point(exponent_hex),
            Curve::Secp256k1 => secp256k1::derive_public_point(exponent_hex),
            Curve::Secp384r1 => secp384r1::derive_public_point(exponent_hex),
        }
    }

    fn encode_private_pem(
        &self,
        curve: Curve,
        exponent_hex: &str,
        point_hex: &str,
    ) -> Result<String> {
        match curve {
            Curve::Secp256r1 => secp256r1::encode_private_pem(exponent_hex, point_hex),
            Curve::Secp256k1 => secp256k1::encode_private_pem(exponent_hex, point_hex),
            Curve::Secp384r1 => secp384r1::encode_private_pem(exponent_hex, point_hex),
        }
    }

    fn encode_public_pem(&self, curve: Curve, point_hex: &str) -> Result<String> {
        match curve {
            Curve::Secp256r1 => secp256r1::encode_public_pem(point_hex),
            Curve::Secp256k1 => secp256k1::encode_public_pem(point_hex),
            Curve::Secp384r1 => secp384r1::encode_public_pem(point_hex),
        }
    }

    fn uncompressed_point(&self, curve: Curve, point_hex: &str) -> Result<String> {
        match curve {
            Curve::Secp256r1 => secp256r1::uncompressed_point(point_hex),
            Curve::Secp256k1 => secp256k1::uncompressed_point(point_hex),
            Curve::Secp384r1 => secp384r1::uncompressed_point(point_hex),
        }
    }

    fn decode_pem(&self, pem: &str) -> Result<RawEcKey> {
        match pem_label(pem)? {
            PRIVATE_KEY_LABEL => {
                for curve in Curve::ALL {
                    let decoded = match curve {
                        Curve::Secp256r1 => secp256r1::decode_private_pem(pem),
                        Curve::Secp256k1 => secp256k1::decode_private_pem(pem),
                        Curve::Secp384r1 => secp384r1::decode_private_pem(pem),
                    };
                    if let Some((exponent, point)) = decoded {
                        return Ok(RawEcKey::private(exponent, point)
                            .with_curve_name(curve.name())
                            .with_markers());
                    }
                }
                Err(KeyError::Encoding(
                    "private key is not an EC key on a supported curve".to_string(),
                ))
            }
            PUBLIC_KEY_LABEL => {
                for curve in Curve::ALL {
                    let decoded = match curve {
                        Curve::Secp256r1 => secp256r1::decode_public_pem(pem),
                        Curve::Secp256k1 => secp256k1::decode_public_pem(pem),
                        Curve::Secp384r1 => secp384r1::decode_public_pem(pem),
                    };
                    if let Some(point) = decoded {
                        return Ok(RawEcKey::public(point)
                            .with_curve_name(curve.name())
                            .with_markers());
                    }
                }
                Err(KeyError::Encoding(
                    "public key is not an EC key on a supported curve".to_string(),
                ))
            }
            other => Err(KeyError::Encoding(format!("unsupported PEM label: {}", other))),
        }
    }
}

/// Type label of an RFC 7468 PEM document
///
/// The BEGIN and END boundaries must both be present and carry the same
/// label. Text before the BEGIN boundary is only allowed on its own lines.
pub fn pem_label(pem: &str) -> Result<&str> {
    p256::pkcs8::der::pem::decode_label(pem.as_bytes())
        .map_err(|e| KeyError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // d = 1 yields the P-256 base point
    const P256_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const P256_G: &str = "046b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296\
                          4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";

    #[test]
    fn test_derive_generator_point() {
        let point = RustCrypto
            .derive_public_point(Curve::Secp256r1, P256_ONE)
            .unwrap();
        assert_eq!(point, P256_G);
    }

    #[test]
    fn test_generate_sets_markers() {
        for curve in Curve::ALL {
            let raw = RustCrypto.generate(curve).unwrap();
            assert_eq!(raw.kind.as_deref(), Some("EC"));
            assert_eq!(raw.curve_name.as_deref(), Some(curve.name()));
            assert_eq!(raw.is_private, Some(true));
            assert_eq!(raw.is_public, Some(false));
            let point = raw.pub_key_hex.as_deref().unwrap();
            assert!(point.starts_with("04"));
            let coordinate_bytes = match curve {
                Curve::Secp384r1 => 48,
                _ => 32,
            };
            assert_eq!(point.len(), 2 + 4 * coordinate_bytes);
        }
    }

    #[test]
    fn test_generate_keypair_shares_point() {
        let pair = generate_keypair(Curve::Secp256k1).unwrap();
        assert_eq!(pair.private.pub_key_hex, pair.public.pub_key_hex);
        assert!(pair.public.prv_key_hex.is_null());
        assert_eq!(pair.public.is_public, Some(true));
        assert_eq!(pair.public.curve_name.as_deref(), Some("secp256k1"));
    }

    #[test]
    fn test_encode_rejects_mismatched_point() {
        let a = RustCrypto.generate(Curve::Secp256r1).unwrap();
        let b = RustCrypto.generate(Curve::Secp256r1).unwrap();
        let err = RustCrypto
            .encode_private_pem(
                Curve::Secp256r1,
                a.prv_key_hex.as_value().unwrap(),
                b.pub_key_hex.as_deref().unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, KeyError::KeyMismatch);
    }

    #[test]
    fn test_encode_rejects_bad_hex() {
        let err = RustCrypto
            .encode_public_pem(Curve::Secp256r1, "X")
            .unwrap_err();
        assert!(matches!(err, KeyError::InvalidKeyMaterial(_)));
    }

    #[test]
    fn test_decode_detects_curve() {
        for curve in Curve::ALL {
            let raw = RustCrypto.generate(curve).unwrap();
            let pem = RustCrypto
                .encode_public_pem(curve, raw.pub_key_hex.as_deref().unwrap())
                .unwrap();
            let decoded = RustCrypto.decode_pem(&pem).unwrap();
            assert_eq!(decoded.curve_name.as_deref(), Some(curve.name()));
            assert_eq!(decoded.pub_key_hex, raw.pub_key_hex);
        }
    }

    #[test]
    fn test_decode_rejects_other_labels() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        let err = RustCrypto.decode_pem(pem).unwrap_err();
        assert_eq!(
            err,
            KeyError::Encoding("unsupported PEM label: CERTIFICATE".to_string())
        );
        assert!(matches!(
            RustCrypto.decode_pem("not pem").unwrap_err(),
            KeyError::Encoding(_)
        ));
    }

    #[test]
    fn test_pem_label() {
        let pem = "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
        assert_eq!(pem_label(pem).unwrap(), "PUBLIC KEY");
        assert!(matches!(pem_label("garbage"), Err(KeyError::Encoding(_))));

        // BEGIN without a matching END
        assert!(pem_label("-----BEGIN PUBLIC KEY-----\n").is_err());
        let pem = "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PRIVATE KEY-----\n";
        assert!(pem_label(pem).is_err());
    }

    #[test]
    fn test_pem_label_rejects_leading_text() {
        let pem = "junk -----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
        assert!(matches!(pem_label(pem), Err(KeyError::Encoding(_))));

        let raw = RustCrypto.generate(Curve::Secp256r1).unwrap();
        let pem = RustCrypto
            .encode_public_pem(Curve::Secp256r1, raw.pub_key_hex.as_deref().unwrap())
            .unwrap();
        let err = RustCrypto.decode_pem(&format!("junk {}", pem)).unwrap_err();
        assert!(matches!(err, KeyError::Encoding(_)));
    }

    #[test]
    fn test_secp384r1_private_round_trip() {
        let raw = RustCrypto.generate(Curve::Secp384r1).unwrap();
        let exponent = raw.prv_key_hex.as_value().unwrap();
        assert_eq!(exponent.len(), 96);

        let point = RustCrypto
            .derive_public_point(Curve::Secp384r1, exponent)
            .unwrap();
        assert_eq!(raw.pub_key_hex.as_deref(), Some(point.as_str()));

        let pem = RustCrypto
            .encode_private_pem(Curve::Secp384r1, exponent, &point)
            .unwrap();
        let decoded = RustCrypto.decode_pem(&pem).unwrap();
        assert_eq!(decoded.curve_name.as_deref(), Some("secp384r1"));
        assert_eq!(decoded.prv_key_hex, raw.prv_key_hex);
    }
}
