//! Validated EC key handle

use std::borrow::Cow;
use std::str::FromStr;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::backend::{EcBackend, RustCrypto};
use crate::raw::{
    Field, RawEcKey, CURVE_FIELD, EC_KEY_TYPE, PRIVATE_FIELD, PUBLIC_FIELD, TYPE_FIELD,
};
use crate::{Curve, KeyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyMaterial {
    Private,
    PublicOnly,
}

/// Handle over a validated raw EC key
///
/// A handle is immutable. The raw record it was built from is kept exactly
/// as supplied; the only derived state is whether private material is
/// present. The curve is resolved from `curveName` when an operation needs
/// it, so an unknown name only fails the operations that use the curve.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyHandle {
    raw: RawEcKey,
    material: KeyMaterial,
}

impl KeyHandle {
    /// Validate an optional raw key and build a handle
    ///
    /// Checks run in order and the first failure wins:
    /// 1. the key must be supplied ([`KeyError::MissingKey`]),
    /// 2. `type` must be `"EC"` ([`KeyError::UnsupportedKeyType`]),
    /// 3. `prvKeyHex` must be present, null is accepted ([`KeyError::MalformedKey`]),
    /// 4. `pubKeyHex` must be present and non-null ([`KeyError::MalformedKey`]).
    ///
    /// Nothing else is checked here. Hex, points and `curveName` are
    /// checked by the operations that use them.
    pub fn new(raw: Option<RawEcKey>) -> Result<Self> {
        let raw = raw.ok_or(KeyError::MissingKey)?;

        if raw.kind.as_deref() != Some(EC_KEY_TYPE) {
            return Err(KeyError::UnsupportedKeyType {
                found: raw.kind.clone(),
            });
        }

        let material = match raw.prv_key_hex {
            Field::Absent => return Err(KeyError::malformed(PRIVATE_FIELD)),
            Field::Null => KeyMaterial::PublicOnly,
            Field::Value(_) => KeyMaterial::Private,
        };

        if raw.pub_key_hex.is_none() {
            return Err(KeyError::malformed(PUBLIC_FIELD));
        }

        let handle = Self { raw, material };
        debug!(
            curve = handle.curve_name(),
            private = handle.is_private(),
            "EC key handle created"
        );
        Ok(handle)
    }

    /// Build a handle from a raw key
    pub fn from_raw(raw: RawEcKey) -> Result<Self> {
        Self::new(Some(raw))
    }

    /// Build a handle from a JSON value in the jsrsasign layout
    ///
    /// `null` is a missing key. Anything other than an object has no `type`
    /// property and is rejected as an unsupported key type.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(KeyError::MissingKey),
            Value::Object(map) => {
                let kind = map.get(TYPE_FIELD).and_then(Value::as_str);
                if kind != Some(EC_KEY_TYPE) {
                    return Err(KeyError::UnsupportedKeyType {
                        found: kind.map(str::to_string),
                    });
                }
                Self::from_raw(RawEcKey::from_json_map(map)?)
            }
            _ => Err(KeyError::UnsupportedKeyType { found: None }),
        }
    }

    /// Build a private handle from a bare exponent, deriving the public point
    pub fn from_private_exponent(curve: Curve, exponent_hex: &str) -> Result<Self> {
        Self::from_private_exponent_with(&RustCrypto, curve, exponent_hex)
    }

    /// Like [`from_private_exponent`](Self::from_private_exponent) with an explicit backend
    pub fn from_private_exponent_with<B: EcBackend>(
        backend: &B,
        curve: Curve,
        exponent_hex: &str,
    ) -> Result<Self> {
        let point = backend.derive_public_point(curve, exponent_hex)?;
        Self::from_raw(
            RawEcKey::private(exponent_hex, point)
                .with_curve_name(curve.name())
                .with_markers(),
        )
    }

    /// Generate a new private key on `curve`
    pub fn generate(curve: Curve) -> Result<Self> {
        Self::from_raw(RustCrypto.generate(curve)?)
    }

    /// Decode a PKCS#8 private or SPKI public PEM block
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_pem_with(&RustCrypto, pem)
    }

    /// Like [`from_pem`](Self::from_pem) with an explicit backend
    pub fn from_pem_with<B: EcBackend>(backend: &B, pem: &str) -> Result<Self> {
        Self::from_raw(backend.decode_pem(pem)?)
    }

    /// Returns true if the key holds a private exponent
    pub fn is_private(&self) -> bool {
        self.material == KeyMaterial::Private
    }

    /// Curve the key lives on
    ///
    /// A missing `curveName` means secp256r1. A name no backend curve
    /// answers to is [`KeyError::UnsupportedCurve`].
    pub fn curve(&self) -> Result<Curve> {
        match self.raw.curve_name.as_deref() {
            Some(name) => name.parse(),
            None => Ok(Curve::default()),
        }
    }

    /// Curve name as carried in `curveName`, or the default curve's name
    pub fn curve_name(&self) -> &str {
        self.raw
            .curve_name
            .as_deref()
            .unwrap_or(Curve::default().name())
    }

    /// The raw record, exactly as supplied
    pub fn raw(&self) -> &RawEcKey {
        &self.raw
    }

    /// Consume the handle and return the raw record
    pub fn into_raw(self) -> RawEcKey {
        self.raw
    }

    /// Public point (hex), as carried in `pubKeyHex`
    pub fn public_point_hex(&self) -> &str {
        // Presence is checked at construction.
        self.raw.pub_key_hex.as_deref().unwrap_or_default()
    }

    /// The public half of this key
    ///
    /// A public-only handle is returned as is (borrowed). A private handle
    /// yields a new owned handle with the private exponent set to null and
    /// the `isPublic` / `isPrivate` markers set; the receiver is unchanged.
    pub fn get_public_key(&self) -> Cow<'_, KeyHandle> {
        match self.material {
            KeyMaterial::PublicOnly => Cow::Borrowed(self),
            KeyMaterial::Private => Cow::Owned(self.public_copy()),
        }
    }

    /// Owning variant of [`get_public_key`](Self::get_public_key)
    pub fn into_public_key(self) -> KeyHandle {
        match self.material {
            KeyMaterial::PublicOnly => self,
            KeyMaterial::Private => self.public_copy(),
        }
    }

    fn public_copy(&self) -> KeyHandle {
        let raw = RawEcKey {
            kind: Some(EC_KEY_TYPE.to_string()),
            prv_key_hex: Field::Null,
            pub_key_hex: self.raw.pub_key_hex.clone(),
            curve_name: self.raw.curve_name.clone(),
            is_public: Some(true),
            is_private: Some(false),
        };
        debug!(curve = self.curve_name(), "derived public EC key handle");
        KeyHandle {
            raw,
            material: KeyMaterial::PublicOnly,
        }
    }

    /// PEM encoding: PKCS#8 `PRIVATE KEY` for private handles, SPKI
    /// `PUBLIC KEY` for public-only handles
    pub fn to_pem(&self) -> Result<String> {
        self.to_pem_with(&RustCrypto)
    }

    /// Like [`to_pem`](Self::to_pem) with an explicit backend
    pub fn to_pem_with<B: EcBackend>(&self, backend: &B) -> Result<String> {
        let curve = self.curve()?;
        match self.raw.prv_key_hex.as_value() {
            Some(exponent) => backend.encode_private_pem(curve, exponent, self.public_point_hex()),
            None => backend.encode_public_pem(curve, self.public_point_hex()),
        }
    }

    /// PEM encoding as bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_pem().map(String::into_bytes)
    }

    /// Subject key identifier: SHA-256 of the uncompressed public point
    ///
    /// Compressed points are decompressed first so both encodings of a key
    /// share one identifier.
    pub fn ski(&self) -> Result<[u8; 32]> {
        self.ski_with(&RustCrypto)
    }

    /// Like [`ski`](Self::ski) with an explicit backend
    pub fn ski_with<B: EcBackend>(&self, backend: &B) -> Result<[u8; 32]> {
        let point = backend.uncompressed_point(self.curve()?, self.public_point_hex())?;
        let bytes = hex::decode(point)
            .map_err(|e| KeyError::InvalidKeyMaterial(format!("public point: {}", e)))?;
        Ok(Sha256::digest(&bytes).into())
    }
}

impl TryFrom<RawEcKey> for KeyHandle {
    type Error = KeyError;

    fn try_from(raw: RawEcKey) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl TryFrom<Option<RawEcKey>> for KeyHandle {
    type Error = KeyError;

    fn try_from(raw: Option<RawEcKey>) -> Result<Self> {
        Self::new(raw)
    }
}

/// Parses JSON text in the jsrsasign layout
impl FromStr for KeyHandle {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| KeyError::Encoding(e.to_string()))?;
        Self::from_json(&value)
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle")
            .field(CURVE_FIELD, &self.curve_name())
            .field("private", &self.is_private())
            .field("pub_key_hex", &self.public_point_hex())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_key() {
        assert_eq!(KeyHandle::new(None).unwrap_err(), KeyError::MissingKey);
        assert_eq!(
            KeyHandle::from_json(&Value::Null).unwrap_err(),
            KeyError::MissingKey
        );
    }

    #[test]
    fn test_validation_order() {
        // type is checked before the exponent
        let raw = RawEcKey {
            kind: Some("RSA".to_string()),
            ..Default::default()
        };
        assert_eq!(
            KeyHandle::from_raw(raw).unwrap_err(),
            KeyError::UnsupportedKeyType {
                found: Some("RSA".to_string())
            }
        );

        // exponent is checked before the point
        let raw = RawEcKey {
            kind: Some("EC".to_string()),
            ..Default::default()
        };
        assert_eq!(
            KeyHandle::from_raw(raw).unwrap_err(),
            KeyError::malformed("prvKeyHex")
        );

        // an unknown curve does not hide a missing point
        let raw = RawEcKey {
            kind: Some("EC".to_string()),
            prv_key_hex: Field::Null,
            curve_name: Some("brainpoolP256r1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            KeyHandle::from_raw(raw).unwrap_err(),
            KeyError::malformed("pubKeyHex")
        );
    }

    #[test]
    fn test_curve_name_is_not_checked_at_construction() {
        let handle = KeyHandle::from_json(&json!({
            "type": "EC",
            "curveName": "secp384r1",
            "prvKeyHex": null,
            "pubKeyHex": "X",
        }))
        .unwrap();
        assert_eq!(handle.curve().unwrap(), Curve::Secp384r1);

        let handle =
            KeyHandle::from_raw(RawEcKey::public("X").with_curve_name("NIST P-384")).unwrap();
        assert_eq!(handle.curve().unwrap(), Curve::Secp384r1);
        assert_eq!(handle.curve_name(), "NIST P-384");
    }

    #[test]
    fn test_unknown_curve() {
        let raw = RawEcKey::private("01", "04").with_curve_name("brainpoolP256r1");
        let handle = KeyHandle::from_raw(raw).unwrap();
        assert!(handle.is_private());
        let unsupported = KeyError::UnsupportedCurve("brainpoolP256r1".to_string());
        assert_eq!(handle.curve().unwrap_err(), unsupported);
        assert_eq!(handle.to_pem().unwrap_err(), unsupported);
        assert_eq!(handle.ski().unwrap_err(), unsupported);

        // the public half keeps the name and still reports it
        let public = handle.get_public_key();
        assert!(!public.is_private());
        assert_eq!(public.curve_name(), "brainpoolP256r1");
        assert_eq!(public.to_bytes().unwrap_err(), unsupported);
    }

    #[test]
    fn test_curve_defaults_to_p256() {
        let handle = KeyHandle::from_raw(RawEcKey::public("X")).unwrap();
        assert_eq!(handle.curve().unwrap(), Curve::Secp256r1);
        assert_eq!(handle.curve_name(), "secp256r1");
    }

    #[test]
    fn test_non_object_json() {
        let err = KeyHandle::from_json(&json!("dummy private key")).unwrap_err();
        assert_eq!(err, KeyError::UnsupportedKeyType { found: None });
        let err = KeyHandle::from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err, KeyError::UnsupportedKeyType { found: None });
    }

    #[test]
    fn test_into_public_key() {
        let handle = KeyHandle::generate(Curve::Secp256r1).unwrap();
        let point = handle.public_point_hex().to_string();
        let public = handle.into_public_key();
        assert!(!public.is_private());
        assert_eq!(public.public_point_hex(), point);

        let again = public.clone().into_public_key();
        assert_eq!(again, public);
    }

    #[test]
    fn test_from_private_exponent() {
        let generated = KeyHandle::generate(Curve::Secp256k1).unwrap();
        let exponent = generated.raw().prv_key_hex.as_value().unwrap().clone();
        let rebuilt = KeyHandle::from_private_exponent(Curve::Secp256k1, &exponent).unwrap();
        assert!(rebuilt.is_private());
        assert_eq!(rebuilt.public_point_hex(), generated.public_point_hex());
    }

    #[test]
    fn test_ski_compressed_and_uncompressed_agree() {
        let handle = KeyHandle::generate(Curve::Secp256r1).unwrap();
        let uncompressed = hex::decode(handle.public_point_hex()).unwrap();
        let public = p256::PublicKey::from_sec1_bytes(&uncompressed).unwrap();
        use p256::elliptic_curve::sec1::ToEncodedPoint;
        let compressed = hex::encode(public.to_encoded_point(true).as_bytes());

        let other = KeyHandle::from_raw(RawEcKey::public(compressed)).unwrap();
        assert_eq!(handle.ski().unwrap(), other.ski().unwrap());
    }

    #[test]
    fn test_debug_hides_exponent() {
        let handle = KeyHandle::from_raw(RawEcKey::private("cafebabe", "04")).unwrap();
        let debug = format!("{:?}", handle);
        assert!(!debug.contains("cafebabe"));
        assert!(debug.contains("private: true"));
        assert!(debug.contains("curveName: \"secp256r1\""));
    }
}
