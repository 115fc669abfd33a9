//! Named curves supported by the key backend

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::KeyError;

/// Named elliptic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Curve {
    /// NIST P-256 (prime256v1)
    #[default]
    Secp256r1,
    /// Koblitz curve used by Bitcoin and Ethereum
    Secp256k1,
    /// NIST P-384, the 384-bit security level
    Secp384r1,
}

impl Curve {
    /// All supported curves
    pub const ALL: [Curve; 3] = [Curve::Secp256r1, Curve::Secp256k1, Curve::Secp384r1];

    /// Canonical curve name as carried in `curveName`
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Secp256r1 => "secp256r1",
            Curve::Secp256k1 => "secp256k1",
            Curve::Secp384r1 => "secp384r1",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Curve {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secp256r1" | "prime256v1" | "p-256" | "p256" | "nist p-256" => Ok(Curve::Secp256r1),
            "secp256k1" => Ok(Curve::Secp256k1),
            "secp384r1" | "p-384" | "p384" | "nist p-384" => Ok(Curve::Secp384r1),
            _ => Err(KeyError::UnsupportedCurve(s.to_string())),
        }
    }
}

impl Serialize for Curve {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Curve {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("secp256r1".parse::<Curve>().unwrap(), Curve::Secp256r1);
        assert_eq!("prime256v1".parse::<Curve>().unwrap(), Curve::Secp256r1);
        assert_eq!("P-256".parse::<Curve>().unwrap(), Curve::Secp256r1);
        assert_eq!("NIST P-256".parse::<Curve>().unwrap(), Curve::Secp256r1);
        assert_eq!("SECP256K1".parse::<Curve>().unwrap(), Curve::Secp256k1);
        assert_eq!("secp384r1".parse::<Curve>().unwrap(), Curve::Secp384r1);
        assert_eq!("P-384".parse::<Curve>().unwrap(), Curve::Secp384r1);
        assert_eq!("NIST P-384".parse::<Curve>().unwrap(), Curve::Secp384r1);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "secp521r1".parse::<Curve>().unwrap_err();
        assert_eq!(err, KeyError::UnsupportedCurve("secp521r1".to_string()));
    }

    #[test]
    fn test_display_round_trips() {
        for curve in Curve::ALL {
            assert_eq!(curve.to_string().parse::<Curve>().unwrap(), curve);
        }
    }

    #[test]
    fn test_serde_uses_canonical_name() {
        let json = serde_json::to_string(&Curve::Secp256k1).unwrap();
        assert_eq!(json, "\"secp256k1\"");
        let curve: Curve = serde_json::from_str("\"prime256v1\"").unwrap();
        assert_eq!(curve, Curve::Secp256r1);
    }
}
