//! Protocol IE framework (E2AP, NGAP, F1AP ... message bodies)
//!
//! Application protocols describe extensible message bodies as lists of
//! `{ id, criticality, value }` triples where the type of `value` depends on
//! `id`. The id-to-type table is an information object set, modelled here by
//! the [`ObjectSet`] trait.
//!
//! # Containers
//!
//! | Type                          | Size        | Unknown id on decode     |
//! |-------------------------------|-------------|--------------------------|
//! | [`ProtocolIeContainer`]       | 0..65535    | `Decode` error           |
//! | [`ProtocolExtContainer`]      | 1..65535    | kept as raw octets       |
//! | [`ProtocolIeSingleContainer`] | one field   | `Decode` error           |
//!
//! # Wire Layout
//!
//! ```text
//! ProtocolIE-Field:        [ id 0..65535, aligned ][ criticality ][ value ]
//! ProtocolExtension-Field: [ id 0..65535, aligned ][ criticality ][ length ][ extension ]
//! ```
//!
//! Values of a [`ProtocolIeField`] are open types in every protocol that uses
//! them, and an object set's value type is expected to wrap its own content
//! with [`pack_varlength_field`](crate::ext::pack_varlength_field).
//! Extension fields always carry an explicit length, so this module wraps
//! them itself and can skip extensions it does not know.

use crate::bit_ref::{BitReader, BitWriter};
use crate::choice::EmptyChoice;
use crate::enumerated::EnumOptions;
use crate::ext::{pack_open_type_bytes, pack_varlength_field, unpack_open_type_bytes, unpack_varlength_field};
use crate::seq_of::SeqOf;
use crate::traits::{Pack, Unpack};
use crate::whole_number::{pack_integer, unpack_integer};
use ranasn_core::containers::Heap;
use ranasn_core::datatypes::octets_to_hex;
use ranasn_core::error::{PerError, PerResult};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// `Criticality ::= ENUMERATED { reject, ignore, notify }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Criticality {
    #[default]
    Reject,
    Ignore,
    Notify,
}

impl EnumOptions for Criticality {
    const NAME: &'static str = "Criticality";
    const NOF_TYPES: u32 = 3;

    fn to_index(&self) -> u32 {
        *self as u32
    }

    fn from_index(idx: u32) -> Option<Self> {
        [Criticality::Reject, Criticality::Ignore, Criticality::Notify]
            .get(idx as usize)
            .copied()
    }

    fn to_str(&self) -> &'static str {
        ["reject", "ignore", "notify"][*self as usize]
    }
}

crate::impl_enum_codec!(Criticality);

/// `Presence ::= ENUMERATED { optional, conditional, mandatory }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    #[default]
    Optional,
    Conditional,
    Mandatory,
}

impl EnumOptions for Presence {
    const NAME: &'static str = "Presence";
    const NOF_TYPES: u32 = 3;

    fn to_index(&self) -> u32 {
        *self as u32
    }

    fn from_index(idx: u32) -> Option<Self> {
        [Presence::Optional, Presence::Conditional, Presence::Mandatory]
            .get(idx as usize)
            .copied()
    }

    fn to_str(&self) -> &'static str {
        ["optional", "conditional", "mandatory"][*self as usize]
    }
}

crate::impl_enum_codec!(Presence);

/// `ProtocolIE-ID ::= INTEGER (0..65535)`, always aligned
pub fn pack_ie_id(w: &mut BitWriter<'_>, id: u32) -> PerResult<()> {
    pack_integer(w, i64::from(id), 0, 65535, false, true)
}

pub fn unpack_ie_id(r: &mut BitReader<'_>) -> PerResult<u32> {
    Ok(unpack_integer(r, 0, 65535, false, true)? as u32)
}

/// Information object set mapping IE ids to value types
///
/// # Example
/// ```rust,ignore
/// struct RicSubscriptionRequestIes;
///
/// impl ObjectSet for RicSubscriptionRequestIes {
///     type Value = RicSubscriptionRequestValue;
///     const NAME: &'static str = "RICsubscriptionRequest-IEs";
///
///     fn value_for(id: u32) -> Option<Self::Value> {
///         match id {
///             29 => Some(RicSubscriptionRequestValue::RicRequestId(Default::default())),
///             5 => Some(RicSubscriptionRequestValue::RanFunctionId(Default::default())),
///             _ => None,
///         }
///     }
///     // ...
/// }
/// ```
pub trait ObjectSet {
    type Value: Pack + Unpack + Default + Clone + fmt::Debug + PartialEq + Serialize;
    const NAME: &'static str;

    /// Default-constructed value for `id`, `None` for ids outside the set
    fn value_for(id: u32) -> Option<Self::Value>;

    /// Id of the object a value belongs to
    fn id_of(value: &Self::Value) -> u32;

    fn criticality(id: u32) -> Criticality;

    fn presence(id: u32) -> Presence;

    fn is_id_valid(id: u32) -> bool {
        Self::value_for(id).is_some()
    }
}

/// Object set without members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmptyObjectSet;

impl ObjectSet for EmptyObjectSet {
    type Value = EmptyChoice;
    const NAME: &'static str = "EmptyObjectSet";

    fn value_for(_id: u32) -> Option<Self::Value> {
        None
    }

    fn id_of(_value: &Self::Value) -> u32 {
        0
    }

    fn criticality(_id: u32) -> Criticality {
        Criticality::Ignore
    }

    fn presence(_id: u32) -> Presence {
        Presence::Optional
    }
}

/// `ProtocolIE-Field`: one IE whose id and criticality follow from its value
pub struct ProtocolIeField<S: ObjectSet> {
    value: S::Value,
}

/// `ProtocolIE-SingleContainer`
pub type ProtocolIeSingleContainer<S> = ProtocolIeField<S>;

impl<S: ObjectSet> ProtocolIeField<S> {
    pub fn new(value: S::Value) -> Self {
        Self { value }
    }

    pub fn id(&self) -> u32 {
        S::id_of(&self.value)
    }

    pub fn crit(&self) -> Criticality {
        S::criticality(self.id())
    }

    pub fn value(&self) -> &S::Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut S::Value {
        &mut self.value
    }

    pub fn into_value(self) -> S::Value {
        self.value
    }

    /// Select the object with `id`, resetting the value
    ///
    /// # Returns
    /// `false` if `id` is not part of the object set, leaving the field
    /// unchanged.
    pub fn load_info_obj(&mut self, id: u32) -> bool {
        match S::value_for(id) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }
}

impl<S: ObjectSet> Default for ProtocolIeField<S> {
    fn default() -> Self {
        Self {
            value: S::Value::default(),
        }
    }
}

impl<S: ObjectSet> Clone for ProtocolIeField<S> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<S: ObjectSet> PartialEq for ProtocolIeField<S> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: ObjectSet> fmt::Debug for ProtocolIeField<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolIeField")
            .field("id", &self.id())
            .field("criticality", &self.crit())
            .field("value", &self.value)
            .finish()
    }
}

impl<S: ObjectSet> Pack for ProtocolIeField<S> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_ie_id(w, self.id())?;
        self.crit().pack(w)?;
        self.value.pack(w)
    }
}

impl<S: ObjectSet> Unpack for ProtocolIeField<S> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        let id = unpack_ie_id(r)?;
        if !self.load_info_obj(id) {
            log::error!("The provided IE id={} is not part of {}", id, S::NAME);
            return Err(PerError::Decode(format!("IE id {} not in {}", id, S::NAME)));
        }
        let mut crit = Criticality::default();
        crit.unpack(r)?;
        if crit != S::criticality(id) {
            log::warn!(
                "IE id={} received with criticality {}, {} expects {}",
                id,
                crit.to_str(),
                S::NAME,
                S::criticality(id).to_str()
            );
        }
        self.value.unpack(r)
    }
}

impl<S: ObjectSet> Serialize for ProtocolIeField<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id())?;
        map.serialize_entry("criticality", &self.crit())?;
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}

/// Extension value that is either understood or kept as raw octets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtValue<V> {
    Known(V),
    /// Content of an extension whose id is not in the object set
    Unknown(Vec<u8>),
}

impl<V: Default> Default for ExtValue<V> {
    fn default() -> Self {
        ExtValue::Known(V::default())
    }
}

impl<V: Serialize> Serialize for ExtValue<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExtValue::Known(v) => v.serialize(serializer),
            ExtValue::Unknown(octets) => serializer.serialize_str(&octets_to_hex(octets)),
        }
    }
}

/// `ProtocolExtensionField`
///
/// Extensions with an id outside the object set are tolerated: their
/// content is kept as raw octets and re-encoded unchanged.
pub struct ProtocolExtField<S: ObjectSet> {
    pub id: u32,
    pub crit: Criticality,
    pub ext: ExtValue<S::Value>,
}

impl<S: ObjectSet> ProtocolExtField<S> {
    pub fn new(value: S::Value) -> Self {
        let id = S::id_of(&value);
        Self {
            id,
            crit: S::criticality(id),
            ext: ExtValue::Known(value),
        }
    }

    /// Understood extension value, `None` for unknown ids
    pub fn value(&self) -> Option<&S::Value> {
        match &self.ext {
            ExtValue::Known(v) => Some(v),
            ExtValue::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self.ext, ExtValue::Known(_))
    }
}

impl<S: ObjectSet> Default for ProtocolExtField<S> {
    fn default() -> Self {
        Self {
            id: 0,
            crit: Criticality::default(),
            ext: ExtValue::default(),
        }
    }
}

impl<S: ObjectSet> Clone for ProtocolExtField<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            crit: self.crit,
            ext: self.ext.clone(),
        }
    }
}

impl<S: ObjectSet> PartialEq for ProtocolExtField<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.crit == other.crit && self.ext == other.ext
    }
}

impl<S: ObjectSet> fmt::Debug for ProtocolExtField<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolExtField")
            .field("id", &self.id)
            .field("criticality", &self.crit)
            .field("extension", &self.ext)
            .finish()
    }
}

impl<S: ObjectSet> Pack for ProtocolExtField<S> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_ie_id(w, self.id)?;
        self.crit.pack(w)?;
        match &self.ext {
            ExtValue::Known(v) => pack_varlength_field(w, true, |inner| v.pack(inner)),
            ExtValue::Unknown(octets) => pack_open_type_bytes(w, octets, true),
        }
    }
}

impl<S: ObjectSet> Unpack for ProtocolExtField<S> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.id = unpack_ie_id(r)?;
        self.crit.unpack(r)?;
        self.ext = match S::value_for(self.id) {
            Some(mut value) => {
                unpack_varlength_field(r, true, |inner| value.unpack(inner))?;
                ExtValue::Known(value)
            }
            None => {
                let octets = unpack_open_type_bytes(r, true)?;
                log::warn!(
                    "Skipping unknown extension id={} of {} ({} octets)",
                    self.id,
                    S::NAME,
                    octets.len()
                );
                ExtValue::Unknown(octets)
            }
        };
        Ok(())
    }
}

impl<S: ObjectSet> Serialize for ProtocolExtField<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("criticality", &self.crit)?;
        map.serialize_entry("extension", &self.ext)?;
        map.end()
    }
}

/// IE of a message body with a fixed set of IEs
///
/// Id and criticality are stored, and the value is wrapped in a
/// variable-length field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolIeContainerItem<T> {
    pub id: u32,
    pub crit: Criticality,
    pub value: T,
}

impl<T> ProtocolIeContainerItem<T> {
    pub fn new(id: u32, crit: Criticality, value: T) -> Self {
        Self { id, crit, value }
    }
}

impl<T> Deref for ProtocolIeContainerItem<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for ProtocolIeContainerItem<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Pack> Pack for ProtocolIeContainerItem<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        pack_ie_id(w, self.id)?;
        self.crit.pack(w)?;
        pack_varlength_field(w, true, |inner| self.value.pack(inner))
    }
}

impl<T: Unpack> Unpack for ProtocolIeContainerItem<T> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.id = unpack_ie_id(r)?;
        self.crit.unpack(r)?;
        unpack_varlength_field(r, true, |inner| self.value.unpack(inner))
    }
}

impl<T: Serialize> Serialize for ProtocolIeContainerItem<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("criticality", &self.crit)?;
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}

/// `ProtocolIE-Container ::= SEQUENCE (SIZE (0..65535)) OF ProtocolIE-Field`
pub type ProtocolIeContainer<S> = SeqOf<Heap<ProtocolIeField<S>>, 0, 65535, false, true>;

/// `ProtocolExtensionContainer ::= SEQUENCE (SIZE (1..65535)) OF ProtocolExtensionField`
pub type ProtocolExtContainer<S> = SeqOf<Heap<ProtocolExtField<S>>, 1, 65535, false, true>;

/// Initiating/outcome message body: extension bit, then the IE container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementaryProcedureOption<T> {
    pub ext: bool,
    ies: T,
}

impl<T> ElementaryProcedureOption<T> {
    pub fn new(ies: T) -> Self {
        Self { ext: false, ies }
    }

    pub fn into_inner(self) -> T {
        self.ies
    }
}

impl<T> Deref for ElementaryProcedureOption<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.ies
    }
}

impl<T> DerefMut for ElementaryProcedureOption<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.ies
    }
}

impl<T: Pack> Pack for ElementaryProcedureOption<T> {
    fn pack(&self, w: &mut BitWriter<'_>) -> PerResult<()> {
        w.pack_bit(self.ext)?;
        self.ies.pack(w)
    }
}

impl<T: Unpack> Unpack for ElementaryProcedureOption<T> {
    fn unpack(&mut self, r: &mut BitReader<'_>) -> PerResult<()> {
        self.ext = r.unpack_bool()?;
        self.ies.unpack(r)
    }
}

impl<T: Serialize> Serialize for ElementaryProcedureOption<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ies.serialize(serializer)
    }
}
