//! ASN.1 Packed Encoding Rules (ITU-T X.691) for cellular protocol stacks
//!
//! This crate implements the aligned and unaligned PER variants used by
//! RRC (unaligned) and by NGAP/F1AP/E2AP (aligned). Generated protocol
//! modules build their message types out of the building blocks here and
//! implement [`Pack`]/[`Unpack`] by calling their fields in order.
//!
//! # Layers
//!
//! ```text
//! protocol_ie    ObjectSet, IE fields and containers
//!      |
//! choice, ext    CHOICE engine, extension groups, open types
//!      |
//! integer, enumerated, strings, seq_of
//!      |
//! whole_number, length
//!      |
//! bit_ref        BitWriter / BitReader
//! ```
//!
//! # TODO
//!
//! ## 编码/解码
//! - [x] 约束/半约束/无约束整数
//! - [x] 枚举（含扩展值）
//! - [x] OCTET STRING / BIT STRING / PrintableString
//! - [x] SEQUENCE OF（三种容量策略）
//! - [x] CHOICE、扩展组、开放类型
//! - [ ] 长度大于 16383 的分片编码（X.691 11.9.3.8）
//! - [ ] REAL 类型
//!
//! ## 协议 IE
//! - [x] ProtocolIE-Container / ProtocolExtensionContainer
//! - [ ] ProtocolIE-ContainerPair

pub mod bit_ref;
pub mod choice;
pub mod config;
pub mod dump;
pub mod enumerated;
pub mod ext;
pub mod integer;
pub mod length;
pub mod protocol_ie;
pub mod seq_of;
pub mod strings;
pub mod testing;
pub mod traits;
pub mod whole_number;


pub use ranasn_core;
#[doc(hidden)]
pub use serde;

pub use bit_ref::{BitReader, BitWriter, range_bits};
pub use choice::{Choice, EmptyChoice, SetupRelease, pack_choice, set_choice, unpack_choice};
pub use config::{CodecConfig, decode, encode};
pub use dump::{to_json, to_json_pretty};
pub use enumerated::{EnumIndex, EnumOptions, EnumPacker, Enumerated};
pub use ext::{ExtGroupsPacker, ExtGroupsUnpacker, pack_varlength_field, skip_varlength_field, unpack_varlength_field};
pub use integer::{BitPacker, Integer, IntegerPacker, UnconstrainedInteger};
pub use protocol_ie::{
    Criticality, ElementaryProcedureOption, EmptyObjectSet, ObjectSet, Presence, ProtocolExtContainer,
    ProtocolExtField, ProtocolIeContainer, ProtocolIeContainerItem, ProtocolIeField, ProtocolIeSingleContainer,
};
pub use seq_of::{BoundedSeqOf, DynSeqOf, ExtSeqOf, SeqOf};
pub use testing::test_pack_unpack_consistency;
pub use traits::{ItemPacker, Null, Pack, Packer, Unpack, unpack_new};
