//! Known-multiplier character strings (`PrintableString`, `VisibleString` ...)

use crate::error::{PerError, PerResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Character range of a restricted character string type
pub trait CharSet {
    const NAME: &'static str;
    /// Smallest character code of the alphabet
    const LB: u8;
    /// Largest character code of the alphabet
    const UB: u8;

    fn contains(c: char) -> bool {
        (u32::from(Self::LB)..=u32::from(Self::UB)).contains(&u32::from(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Printable;

impl CharSet for Printable {
    const NAME: &'static str = "PrintableString";
    const LB: u8 = 32;
    const UB: u8 = 122;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Visible;

impl CharSet for Visible {
    const NAME: &'static str = "VisibleString";
    const LB: u8 = 32;
    const UB: u8 = 126;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ia5;

impl CharSet for Ia5 {
    const NAME: &'static str = "IA5String";
    const LB: u8 = 0;
    const UB: u8 = 127;
}

/// Character string over alphabet `A` with `ALB <= length <= AUB`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AsnString<A, const ALB: u32, const AUB: u32, const EXT: bool = false, const AL: bool = false> {
    text: String,
    alphabet: PhantomData<A>,
}

pub type PrintableString<const ALB: u32, const AUB: u32> = AsnString<Printable, ALB, AUB, false, false>;
pub type VisibleString<const ALB: u32, const AUB: u32> = AsnString<Visible, ALB, AUB, false, false>;

impl<A: CharSet, const ALB: u32, const AUB: u32, const EXT: bool, const AL: bool> AsnString<A, ALB, AUB, EXT, AL> {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            alphabet: PhantomData,
        }
    }

    /// Build from text, checking the alphabet
    ///
    /// The size constraint is checked at encoding time, so an extensible type
    /// can still carry longer strings.
    pub fn from_text(text: &str) -> PerResult<Self> {
        if let Some(c) = text.chars().find(|&c| !A::contains(c)) {
            log::error!("Character {:?} is not part of the {} alphabet", c, A::NAME);
            return Err(PerError::InvalidValue(format!(
                "character {:?} not allowed in {}",
                c,
                A::NAME
            )));
        }
        Ok(Self {
            text: text.to_string(),
            alphabet: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl<A: CharSet, const ALB: u32, const AUB: u32, const EXT: bool, const AL: bool> fmt::Display
    for AsnString<A, ALB, AUB, EXT, AL>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl<A: CharSet, const ALB: u32, const AUB: u32, const EXT: bool, const AL: bool> Serialize
    for AsnString<A, ALB, AUB, EXT, AL>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
