//! Codec configuration and top-level encode/decode helpers
//!
//! Per-type parameters (bounds, extension marker, aligned variant) are const
//! generics of the value types. What remains configurable at runtime are the
//! buffer sizes used by the helpers in this module.

use crate::bit_ref::{BitReader, BitWriter};
use crate::ext::pack_varlength_field_limited;
use crate::length::MAX_UNFRAGMENTED_LENGTH;
use crate::traits::{Pack, Unpack, unpack_new};
use bytes::Bytes;
use ranasn_core::error::{PerError, PerResult};
use serde::{Deserialize, Serialize};

/// Runtime codec parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Scratch buffer used by [`encode`] and the round-trip utility, in octets
    pub buffer_size: usize,
    /// Largest content of a single variable-length field, in octets
    pub max_open_type_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            buffer_size: 2048,
            max_open_type_size: MAX_UNFRAGMENTED_LENGTH as usize,
        }
    }
}

impl CodecConfig {
    /// Load a configuration from JSON, missing fields take their defaults
    ///
    /// # Error Handling
    /// Malformed JSON and out-of-range values are `InvalidValue`.
    pub fn from_json(text: &str) -> PerResult<Self> {
        let config: CodecConfig =
            serde_json::from_str(text).map_err(|e| PerError::InvalidValue(format!("codec config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PerResult<()> {
        if self.buffer_size == 0 {
            log::error!("Codec buffer size must not be zero");
            return Err(PerError::InvalidValue("buffer_size is zero".to_string()));
        }
        if self.max_open_type_size > MAX_UNFRAGMENTED_LENGTH as usize {
            log::error!(
                "Open type limit {} exceeds the largest unfragmented length {}",
                self.max_open_type_size,
                MAX_UNFRAGMENTED_LENGTH
            );
            return Err(PerError::InvalidValue(format!(
                "max_open_type_size {} above {}",
                self.max_open_type_size, MAX_UNFRAGMENTED_LENGTH
            )));
        }
        Ok(())
    }
}

/// Encode `value` into a fresh buffer of `config.buffer_size` octets
///
/// # Returns
/// The encoded octets, padded to a whole octet
///
/// # Example
/// ```rust
/// use ranasn_per::config::{encode, CodecConfig};
/// use ranasn_per::integer::Integer;
///
/// let bytes = encode(&Integer::<0, 255>::new(200), &CodecConfig::default()).unwrap();
/// assert_eq!(&bytes[..], &[0xC8]);
/// ```
pub fn encode<T: Pack + ?Sized>(value: &T, config: &CodecConfig) -> PerResult<Bytes> {
    let mut buf = vec![0u8; config.buffer_size];
    let mut w = BitWriter::new(&mut buf);
    value.pack(&mut w)?;
    w.align_bytes_zero()?;
    Ok(Bytes::copy_from_slice(w.finish()))
}

/// Decode a `T` from the start of `bytes`
pub fn decode<T: Unpack + Default>(bytes: &[u8]) -> PerResult<T> {
    let mut r = BitReader::new(bytes);
    unpack_new(&mut r)
}

/// Encode `value` as an aligned open type bounded by `config.max_open_type_size`
pub fn encode_open_type<T: Pack + ?Sized>(value: &T, config: &CodecConfig) -> PerResult<Bytes> {
    // length determinant plus content
    let mut buf = vec![0u8; config.max_open_type_size + 2];
    let mut w = BitWriter::new(&mut buf);
    pack_varlength_field_limited(&mut w, true, config.max_open_type_size, |inner| value.pack(inner))?;
    Ok(Bytes::copy_from_slice(w.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::Integer;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.buffer_size, 2048);
        assert_eq!(config.max_open_type_size, 16383);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = CodecConfig::from_json(r#"{"buffer_size": 64}"#).unwrap();
        assert_eq!(config.buffer_size, 64);
        assert_eq!(config.max_open_type_size, 16383);

        assert!(CodecConfig::from_json(r#"{"buffer_size": 0}"#).is_err());
        assert!(CodecConfig::from_json(r#"{"max_open_type_size": 16384}"#).is_err());
        assert!(CodecConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_encode_decode() {
        let config = CodecConfig::default();
        let bytes = encode(&Integer::<0, 4095>::new(147), &config).unwrap();
        // 12 bits, padded
        assert_eq!(&bytes[..], &[0x09, 0x30]);
        let decoded: Integer<0, 4095> = decode(&bytes).unwrap();
        assert_eq!(decoded.value(), 147);
    }

    #[test]
    fn test_encode_overflow() {
        let config = CodecConfig {
            buffer_size: 1,
            ..CodecConfig::default()
        };
        let err = encode(&Integer::<0, 65535>::new(1), &config).unwrap_err();
        assert!(err.is_encode_failure());
    }

    #[test]
    fn test_open_type_limit() {
        let config = CodecConfig {
            max_open_type_size: 1,
            ..CodecConfig::default()
        };
        assert_eq!(&encode_open_type(&Integer::<0, 255>::new(7), &config).unwrap()[..], &[0x01, 0x07]);
        assert!(encode_open_type(&Integer::<0, 65535>::new(7), &config).is_err());
    }
}
