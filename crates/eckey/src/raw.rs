//! Raw EC key records as produced by external key utilities
//!
//! A raw record uses the jsrsasign field names on the wire:
//!
//! ```json
//! {"type": "EC", "curveName": "secp256r1", "prvKeyHex": null, "pubKeyHex": "04..."}
//! ```
//!
//! `prvKeyHex` is the one field whose absence and nullness mean different
//! things: absent is malformed, null is a public-only key. [`Field`] keeps
//! that distinction until a [`KeyHandle`](crate::KeyHandle) is built.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{KeyError, Result};

/// Wire name of the key type tag
pub const TYPE_FIELD: &str = "type";
/// Wire name of the private exponent
pub const PRIVATE_FIELD: &str = "prvKeyHex";
/// Wire name of the public point
pub const PUBLIC_FIELD: &str = "pubKeyHex";
/// Wire name of the curve name
pub const CURVE_FIELD: &str = "curveName";

/// Key type tag of elliptic-curve keys
pub const EC_KEY_TYPE: &str = "EC";

/// A record field that may be absent, present but null, or set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field<T> {
    /// Not present at all
    Absent,
    /// Present with a null value
    Null,
    /// Present with a value
    Value(T),
}

impl<T> Field<T> {
    /// Returns true if the field is not present
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// Returns true if the field is present but null
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Borrow the value, if any
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Collapse absent and null into `None`
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

// Absent fields are handled by `#[serde(default)]` on the container; a
// deserializer is only invoked for present fields.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Absent | Field::Null => serializer.serialize_none(),
        }
    }
}

/// Raw EC key record
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEcKey {
    /// Key type tag, `"EC"` for elliptic-curve keys
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Private exponent (hex)
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub prv_key_hex: Field<String>,
    /// Public point, SEC1 encoded (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_key_hex: Option<String>,
    /// Curve name, `secp256r1` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_name: Option<String>,
    /// Public-only marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    /// Private marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

impl RawEcKey {
    /// Record of a public-only EC key
    pub fn public(pub_key_hex: impl Into<String>) -> Self {
        Self {
            kind: Some(EC_KEY_TYPE.to_string()),
            prv_key_hex: Field::Null,
            pub_key_hex: Some(pub_key_hex.into()),
            ..Default::default()
        }
    }

    /// Record of a private EC key
    pub fn private(prv_key_hex: impl Into<String>, pub_key_hex: impl Into<String>) -> Self {
        Self {
            kind: Some(EC_KEY_TYPE.to_string()),
            prv_key_hex: Field::Value(prv_key_hex.into()),
            pub_key_hex: Some(pub_key_hex.into()),
            ..Default::default()
        }
    }

    /// Set the curve name
    pub fn with_curve_name(mut self, name: impl Into<String>) -> Self {
        self.curve_name = Some(name.into());
        self
    }

    /// Set the `isPublic` / `isPrivate` markers from the exponent state
    pub fn with_markers(mut self) -> Self {
        let private = self.prv_key_hex.as_value().is_some();
        self.is_public = Some(!private);
        self.is_private = Some(private);
        self
    }

    /// Parse a record from a JSON object
    ///
    /// Fields are probed one by one so that an absent field and a null field
    /// stay distinguishable. Fields of the wrong JSON type are reported as
    /// malformed, except `type`, which is left unset so the caller reports
    /// an unsupported key type.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            kind: map
                .get(TYPE_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            prv_key_hex: string_field(map, PRIVATE_FIELD)?,
            pub_key_hex: string_field(map, PUBLIC_FIELD)?.into_option(),
            curve_name: string_field(map, CURVE_FIELD)?.into_option(),
            is_public: bool_field(map, "isPublic")?,
            is_private: bool_field(map, "isPrivate")?,
        })
    }

    /// Serialize to a JSON value
    pub fn to_json(&self) -> Value {
        // Serializing plain strings, options and bools into a Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn string_field(map: &Map<String, Value>, name: &str) -> Result<Field<String>> {
    match map.get(name) {
        None => Ok(Field::Absent),
        Some(Value::Null) => Ok(Field::Null),
        Some(Value::String(s)) => Ok(Field::Value(s.clone())),
        Some(_) => Err(KeyError::malformed(name)),
    }
}

fn bool_field(map: &Map<String, Value>, name: &str) -> Result<Option<bool>> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(KeyError::malformed(name)),
    }
}

impl fmt::Debug for RawEcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prv: &dyn fmt::Debug = match &self.prv_key_hex {
            Field::Absent => &"<absent>",
            Field::Null => &"<null>",
            Field::Value(_) => &"<redacted>",
        };
        f.debug_struct("RawEcKey")
            .field("kind", &self.kind)
            .field("prv_key_hex", prv)
            .field("pub_key_hex", &self.pub_key_hex)
            .field("curve_name", &self.curve_name)
            .field("is_public", &self.is_public)
            .field("is_private", &self.is_private)
            .finish()
    }
}
