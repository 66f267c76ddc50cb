//! ranasn - ASN.1 PER codec core for cellular protocol stacks
//!
//! This library provides the runtime that generated RRC, NGAP, F1AP and E2AP
//! message modules are built on: a bit-level cursor, the X.691 primitive
//! codecs in their aligned and unaligned variants, constraint-carrying value
//! types, and the CHOICE, extension and protocol IE frameworks.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ranasn-core`: Error handling, backing containers and value types
//! - `ranasn-per`: PER codecs, extension and protocol IE frameworks
//!
//! # Usage
//!
//! ```rust
//! use ranasn::per::{encode, decode, CodecConfig, Integer};
//!
//! type RanFunctionId = Integer<0, 4095>;
//!
//! let bytes = encode(&RanFunctionId::new(147), &CodecConfig::default()).unwrap();
//! let decoded: RanFunctionId = decode(&bytes).unwrap();
//! assert_eq!(decoded.value(), 147);
//! ```

// Re-export core types
pub use ranasn_core::{PerError, PerResult, ResultCode};
pub use ranasn_core::containers::{Array, BoundedArray, DynArray, ExtArray};
pub use ranasn_core::datatypes::*;

// Re-export the PER codec
pub mod per {
    pub use ranasn_per::*;
}
