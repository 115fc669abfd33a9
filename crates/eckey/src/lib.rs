//! # eckey
//!
//! Validated handles over raw elliptic-curve keys.
//!
//! - Shape validation of jsrsasign-style raw key records
//! - Private / public-only classification
//! - Public key derivation
//! - PKCS#8 / SPKI PEM export and import (secp256r1, secp256k1)
//!
//! ```no_run
//! use eckey::{Curve, KeyHandle};
//!
//! let key = KeyHandle::generate(Curve::Secp256r1)?;
//! assert!(key.is_private());
//!
//! let public = key.get_public_key();
//! assert!(!public.is_private());
//! println!("{}", public.to_pem()?);
//! # Ok::<(), eckey::KeyError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod backend;
mod curve;
mod error;
mod key;
mod raw;

pub use backend::{
    generate_keypair, pem_label, EcBackend, KeyPair, RustCrypto, PRIVATE_KEY_LABEL,
    PUBLIC_KEY_LABEL,
};
pub use curve::Curve;
pub use error::{KeyError, Result};
pub use key::KeyHandle;
pub use raw::{
    Field, RawEcKey, CURVE_FIELD, EC_KEY_TYPE, PRIVATE_FIELD, PUBLIC_FIELD, TYPE_FIELD,
};
