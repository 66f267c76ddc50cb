//! RRC-shaped messages: extension groups, SetupRelease and optional
//! sub-objects (unaligned PER)

use ranasn::per::bit_ref::{BitReader, BitWriter};
use ranasn::per::enumerated::{EnumOptions, enum_from_str};
use ranasn::per::{
    CodecConfig, DynSeqOf, ExtGroupsPacker, ExtGroupsUnpacker, Integer, Pack, SetupRelease, Unpack, decode, encode,
    test_pack_unpack_consistency, to_json, unpack_new,
};
use ranasn::{FixedBitString, PerResult};
use serde::Serialize;

/// `MeasGapRepetitionPeriod ::= ENUMERATED { ms20, ms40, ms80, ms160 }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum GapRepetition {
    #[default]
    Ms20,
    Ms40,
    Ms80,
    Ms160,
}

impl EnumOptions for GapRepetition {
    const NAME: &'static str = "MeasGapRepetitionPeriod";
    const NOF_TYPES: u32 = 4;

    fn to_index(&self) -> u32 {
        *self as u32
    }

    fn from_index(idx: u32) -> Option<Self> {
        [GapRepetition::Ms20, GapRepetition::Ms40, GapRepetition::Ms80, GapRepetition::Ms160]
            .get(idx as usize)
            .copied()
    }

    fn to_str(&self) -> &'static str {
        ["ms20", "ms40", "ms80", "ms160"][*self as usize]
    }

    fn to_number(&self) -> Option<f64> {
        Some([20.0, 40.0, 80.0, 160.0][*self as usize])
    }
}

ranasn::per::impl_enum_codec!(GapRepetition);

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
struct GapConfig {
    #[serde(rename = "gapOffset")]
    gap_offset: Integer<0, 159>,
    mgrp: GapRepetition,
}

impl Pack for GapConfig {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        self.gap_offset.pack(w)?;
        self.mgrp.pack(w)
    }
}

impl Unpack for GapConfig {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.gap_offset.unpack(r)?;
        self.mgrp.unpack(r)
    }
}

/// Cell group configuration with two extension groups
///
/// ```text
/// CellGroupConfig ::= SEQUENCE {
///     cellGroupId     INTEGER (0..3),
///     drbs            SEQUENCE (SIZE (1..32)) OF INTEGER (1..32) OPTIONAL,
///     gap             SetupRelease { GapConfig } OPTIONAL,
///     ...,
///     [[ reportDC     BOOLEAN ]],
///     [[ bapAddress   BIT STRING (SIZE (10)) ]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
struct CellGroupConfig {
    #[serde(rename = "cellGroupId")]
    cell_group_id: Integer<0, 3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drbs: Option<DynSeqOf<Integer<1, 32>, 1, 32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gap: Option<Box<SetupRelease<GapConfig>>>,
    #[serde(rename = "reportDC", skip_serializing_if = "Option::is_none")]
    report_dc: Option<bool>,
    #[serde(rename = "bapAddress", skip_serializing_if = "Option::is_none")]
    bap_address: Option<FixedBitString<10>>,
}

impl CellGroupConfig {
    const NOF_EXT_GROUPS: usize = 2;

    fn ext_groups(&self) -> ExtGroupsPacker {
        let mut groups = ExtGroupsPacker::new(false);
        groups.set(0, self.report_dc.is_some());
        groups.set(1, self.bap_address.is_some());
        groups
    }
}

impl Pack for CellGroupConfig {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        let groups = self.ext_groups();
        w.pack_bit(groups.any_present())?;
        w.pack_bit(self.drbs.is_some())?;
        w.pack_bit(self.gap.is_some())?;
        self.cell_group_id.pack(w)?;
        if let Some(drbs) = &self.drbs {
            drbs.pack(w)?;
        }
        if let Some(gap) = &self.gap {
            gap.pack(w)?;
        }
        if groups.any_present() {
            groups.pack(w)?;
            if let Some(report_dc) = &self.report_dc {
                groups.pack_group(w, |inner| report_dc.pack(inner))?;
            }
            if let Some(bap_address) = &self.bap_address {
                groups.pack_group(w, |inner| bap_address.pack(inner))?;
            }
        }
        Ok(())
    }
}

impl Unpack for CellGroupConfig {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        *self = Self::default();
        let ext = r.unpack_bool()?;
        let has_drbs = r.unpack_bool()?;
        let has_gap = r.unpack_bool()?;
        self.cell_group_id.unpack(r)?;
        if has_drbs {
            self.drbs = Some(unpack_new(r)?);
        }
        if has_gap {
            self.gap = Some(unpack_new(r)?);
        }
        if ext {
            let mut groups = ExtGroupsUnpacker::new(Self::NOF_EXT_GROUPS, false);
            groups.unpack(r)?;
            let mut report_dc = false;
            if groups.unpack_group(r, 0, |inner| report_dc.unpack(inner))? {
                self.report_dc = Some(report_dc);
            }
            let mut bap_address = FixedBitString::<10>::default();
            if groups.unpack_group(r, 1, |inner| bap_address.unpack(inner))? {
                self.bap_address = Some(bap_address);
            }
            groups.finish(r)?;
        }
        Ok(())
    }
}

/// Same type as seen by a build that only knows the first extension group
#[derive(Debug, Clone, PartialEq, Default)]
struct CellGroupConfigR15 {
    cell_group_id: Integer<0, 3>,
    drbs: Option<DynSeqOf<Integer<1, 32>, 1, 32>>,
    gap: Option<Box<SetupRelease<GapConfig>>>,
    report_dc: Option<bool>,
}

impl Unpack for CellGroupConfigR15 {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        *self = Self::default();
        let ext = r.unpack_bool()?;
        let has_drbs = r.unpack_bool()?;
        let has_gap = r.unpack_bool()?;
        self.cell_group_id.unpack(r)?;
        if has_drbs {
            self.drbs = Some(unpack_new(r)?);
        }
        if has_gap {
            self.gap = Some(unpack_new(r)?);
        }
        if ext {
            let mut groups = ExtGroupsUnpacker::new(1, false);
            groups.unpack(r)?;
            let mut report_dc = false;
            if groups.unpack_group(r, 0, |inner| report_dc.unpack(inner))? {
                self.report_dc = Some(report_dc);
            }
            groups.finish(r)?;
        }
        Ok(())
    }
}

fn full_config() -> CellGroupConfig {
    CellGroupConfig {
        cell_group_id: Integer::new(1),
        drbs: Some([1, 2, 5].into_iter().map(Integer::new).collect()),
        gap: Some(Box::new(SetupRelease::Setup(GapConfig {
            gap_offset: Integer::new(5),
            mgrp: GapRepetition::Ms40,
        }))),
        report_dc: Some(true),
        bap_address: Some(FixedBitString::from_bit_string("1100000011").unwrap()),
    }
}

#[test]
fn test_root_only_encoding() {
    let config = CellGroupConfig {
        cell_group_id: Integer::new(2),
        ..Default::default()
    };
    // ext, drbs, gap bits then cellGroupId in 2 bits
    assert_eq!(&encode(&config, &CodecConfig::default()).unwrap()[..], &[0b0001_0000]);
}

#[test]
fn test_release_encoding() {
    let config = CellGroupConfig {
        cell_group_id: Integer::new(3),
        gap: Some(Box::new(SetupRelease::Release)),
        ..Default::default()
    };
    // 0 0 1 11 0 (release) + padding
    assert_eq!(&encode(&config, &CodecConfig::default()).unwrap()[..], &[0b0011_1000]);
    let decoded: CellGroupConfig = decode(&[0b0011_1000]).unwrap();
    let gap = decoded.gap.as_ref().unwrap();
    assert!(!gap.is_setup());
    assert!(gap.setup().is_none());
}

#[test]
fn test_full_config_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = full_config();
    test_pack_unpack_consistency(&config).unwrap();

    let bytes = encode(&config, &CodecConfig::default()).unwrap();
    let decoded: CellGroupConfig = decode(&bytes).unwrap();
    assert_eq!(decoded, config);
    let gap = decoded.gap.as_ref().and_then(|g| g.setup()).unwrap();
    assert_eq!(gap.mgrp.to_number(), Some(40.0));
}

#[test]
fn test_older_build_skips_unknown_group() {
    let config = full_config();
    let mut buf = [0u8; 64];
    let mut w = BitWriter::new(&mut buf);
    config.pack(&mut w).unwrap();
    // trailing field after the message
    Integer::<0, 255>::new(0xA5).pack(&mut w).unwrap();

    let mut r = BitReader::new(&buf);
    let older: CellGroupConfigR15 = unpack_new(&mut r).unwrap();
    assert_eq!(older.cell_group_id.value(), 1);
    assert_eq!(older.drbs, config.drbs);
    assert_eq!(older.gap, config.gap);
    assert_eq!(older.report_dc, Some(true));
    let trailer: Integer<0, 255> = unpack_new(&mut r).unwrap();
    assert_eq!(trailer.value(), 0xA5);
}

#[test]
fn test_optional_sub_object_deep_copy() {
    let original = full_config();
    let mut copy = original.clone();
    if let Some(gap) = copy.gap.as_mut().and_then(|g| g.setup_mut()) {
        gap.gap_offset.set(100);
    }
    assert_eq!(original.gap.as_ref().and_then(|g| g.setup()).unwrap().gap_offset.value(), 5);
    assert_eq!(copy.gap.as_ref().and_then(|g| g.setup()).unwrap().gap_offset.value(), 100);

    copy.gap = None;
    assert!(original.gap.is_some());
}

#[test]
fn test_drb_list_size_violation() {
    let mut config = full_config();
    config.drbs = Some(DynSeqOf::default());
    let err = encode(&config, &CodecConfig::default()).unwrap_err();
    assert!(err.is_encode_failure());
}

#[test]
fn test_config_dump() {
    let json = to_json(&full_config()).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"cellGroupId":1,"drbs":[1,2,5],"gap":{"setup":{"gapOffset":5,"mgrp":"ms40"}},"#,
            r#""reportDC":true,"bapAddress":"1100000011"}"#
        )
    );
    assert_eq!(enum_from_str::<GapRepetition>("ms160"), Some(GapRepetition::Ms160));
}
