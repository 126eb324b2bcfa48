use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

/// Largest index that fits in the 24-bit index field.
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;

const TYPE_SHIFT: u32 = 60;
const SUBTYPE_SHIFT: u32 = 56;
const INDEX_SHIFT: u32 = 32;
const INDEX_BITS: u32 = 24;
const NIBBLE: u64 = 0xF;
const VALUE_MASK: u64 = 0xFFFF_FFFF;

/// Kind of object an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    EcalCluster,
    HcalCluster,
    Track,
    Particle,
    Block,
}

impl ObjectType {
    pub const ALL: [ObjectType; 5] = [
        ObjectType::EcalCluster,
        ObjectType::HcalCluster,
        ObjectType::Track,
        ObjectType::Particle,
        ObjectType::Block,
    ];

    pub fn code(self) -> u8 {
        match self {
            ObjectType::EcalCluster => 1,
            ObjectType::HcalCluster => 2,
            ObjectType::Track => 3,
            ObjectType::Particle => 4,
            ObjectType::Block => 5,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, IdError> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(IdError::UnknownType(code))
    }

    /// Single-letter tag used in pretty strings.
    pub fn letter(self) -> char {
        match self {
            ObjectType::EcalCluster => 'e',
            ObjectType::HcalCluster => 'h',
            ObjectType::Track => 't',
            ObjectType::Particle => 'p',
            ObjectType::Block => 'b',
        }
    }

    pub fn from_letter(c: char) -> Result<Self, IdError> {
        Self::ALL
            .into_iter()
            .find(|t| t.letter() == c)
            .ok_or(IdError::UnknownTypeLetter(c))
    }

    pub fn is_cluster(self) -> bool {
        matches!(self, ObjectType::EcalCluster | ObjectType::HcalCluster)
    }
}

/// Processing stage an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    Generated,
    /// Unsmeared simulation output.
    Raw,
    Smeared,
    Merged,
    Reconstructed,
    Undefined,
}

impl Subtype {
    pub const ALL: [Subtype; 6] = [
        Subtype::Generated,
        Subtype::Raw,
        Subtype::Smeared,
        Subtype::Merged,
        Subtype::Reconstructed,
        Subtype::Undefined,
    ];

    pub fn code(self) -> u8 {
        match self {
            Subtype::Generated => 1,
            Subtype::Raw => 2,
            Subtype::Smeared => 3,
            Subtype::Merged => 4,
            Subtype::Reconstructed => 5,
            Subtype::Undefined => 6,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, IdError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(IdError::UnknownSubtype(code))
    }

    pub fn letter(self) -> char {
        match self {
            Subtype::Generated => 'g',
            Subtype::Raw => 't',
            Subtype::Smeared => 's',
            Subtype::Merged => 'm',
            Subtype::Reconstructed => 'r',
            Subtype::Undefined => 'u',
        }
    }

    pub fn from_letter(c: char) -> Result<Self, IdError> {
        Self::ALL
            .into_iter()
            .find(|s| s.letter() == c)
            .ok_or(IdError::UnknownSubtypeLetter(c))
    }
}

/// Type and subtype pair, written as two letters (e.g. `"es"` for smeared
/// ecal clusters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category {
    pub object_type: ObjectType,
    pub subtype: Subtype,
}

impl Category {
    pub const fn new(object_type: ObjectType, subtype: Subtype) -> Self {
        Self {
            object_type,
            subtype,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.object_type.letter(), self.subtype.letter())
    }
}

impl FromStr for Category {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(t), Some(st), None) => Ok(Category::new(
                ObjectType::from_letter(t)?,
                Subtype::from_letter(st)?,
            )),
            _ => Err(IdError::InvalidPretty(s.to_string())),
        }
    }
}

/// The fields packed into an [`Identifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parts {
    pub object_type: ObjectType,
    pub subtype: Subtype,
    pub index: u32,
    pub value: f32,
}

/// Opaque 64-bit handle for every object in an event.
///
/// Layout, most significant first:
///
/// ```text
/// [63..60] type code  [59..56] subtype code  [55..32] index  [31..0] f32 value bits
/// ```
///
/// The value must be finite and non-negative, so the IEEE-754 bit pattern
/// orders the same way as the number. Comparing two identifiers therefore
/// orders by type, subtype, index and then value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(u64);

/// Packs the four fields into an identifier.
pub fn encode(
    object_type: ObjectType,
    subtype: Subtype,
    index: u32,
    value: f32,
) -> Result<Identifier, IdError> {
    encode_codes(object_type.code(), subtype.code(), index, value)
}

/// Like [`encode`] but takes raw type and subtype codes, which are checked
/// against the known enumerations.
pub fn encode_codes(
    type_code: u8,
    subtype_code: u8,
    index: u32,
    value: f32,
) -> Result<Identifier, IdError> {
    ObjectType::from_code(type_code)?;
    Subtype::from_code(subtype_code)?;
    if index > MAX_INDEX {
        return Err(IdError::IndexOverflow(index));
    }
    if !value.is_finite() || value < 0.0 {
        return Err(IdError::InvalidValue(value));
    }
    // -0.0 would sort above every positive value.
    let value = if value == 0.0 { 0.0f32 } else { value };

    let raw = (u64::from(type_code) << TYPE_SHIFT)
        | (u64::from(subtype_code) << SUBTYPE_SHIFT)
        | (u64::from(index) << INDEX_SHIFT)
        | u64::from(value.to_bits());
    Ok(Identifier(raw))
}

/// Unpacks an identifier into its fields.
pub fn decode(id: Identifier) -> Result<Parts, IdError> {
    let raw = id.0;
    let object_type = ObjectType::from_code(((raw >> TYPE_SHIFT) & NIBBLE) as u8)?;
    let subtype = Subtype::from_code(((raw >> SUBTYPE_SHIFT) & NIBBLE) as u8)?;
    let index = ((raw >> INDEX_SHIFT) as u32) & MAX_INDEX;
    let value = f32::from_bits((raw & VALUE_MASK) as u32);
    Ok(Parts {
        object_type,
        subtype,
        index,
        value,
    })
}

/// Short diagnostic form: type letter, subtype letter, index (e.g. `"et103"`).
pub fn pretty(id: Identifier) -> String {
    match decode(id) {
        Ok(p) => format!("{}{}{}", p.object_type.letter(), p.subtype.letter(), p.index),
        Err(_) => format!("??{:#x}", id.0),
    }
}

/// Parses a pretty string back into its category and index.
pub fn parse_pretty(s: &str) -> Result<(Category, u32), IdError> {
    if s.len() < 3 || !s.is_char_boundary(2) {
        return Err(IdError::InvalidPretty(s.to_string()));
    }
    let (head, tail) = s.split_at(2);
    let category: Category = head.parse()?;
    let index: u32 = tail
        .parse()
        .map_err(|_| IdError::InvalidPretty(s.to_string()))?;
    Ok((category, index))
}

impl Identifier {
    /// Wraps a raw key. Use [`decode`] to validate it.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn parts(self) -> Result<Parts, IdError> {
        decode(self)
    }

    pub fn object_type(self) -> Option<ObjectType> {
        ObjectType::from_code(((self.0 >> TYPE_SHIFT) & NIBBLE) as u8).ok()
    }

    pub fn subtype(self) -> Option<Subtype> {
        Subtype::from_code(((self.0 >> SUBTYPE_SHIFT) & NIBBLE) as u8).ok()
    }

    pub fn category(self) -> Option<Category> {
        Some(Category::new(self.object_type()?, self.subtype()?))
    }

    pub fn index(self) -> u32 {
        ((self.0 >> INDEX_SHIFT) as u32) & MAX_INDEX
    }

    pub fn value(self) -> f32 {
        f32::from_bits((self.0 & VALUE_MASK) as u32)
    }

    pub fn pretty(self) -> String {
        pretty(self)
    }

    /// Two-letter category string, or `None` for a malformed key.
    pub fn type_and_subtype(self) -> Option<String> {
        self.category().map(|c| c.to_string())
    }

    pub fn is_a(self, category: Category) -> bool {
        self.category() == Some(category)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty(*self))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({}:{})", pretty(*self), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let samples = [
            (ObjectType::EcalCluster, Subtype::Raw, 0, 0.0),
            (ObjectType::HcalCluster, Subtype::Merged, 17, 12.5),
            (ObjectType::Track, Subtype::Smeared, MAX_INDEX, 1.0e-7),
            (ObjectType::Particle, Subtype::Reconstructed, 4242, f32::MAX),
            (ObjectType::Block, Subtype::Undefined, 3, 7.0),
        ];
        for (t, s, i, v) in samples {
            let id = encode(t, s, i, v).unwrap();
            let p = decode(id).unwrap();
            assert_eq!((p.object_type, p.subtype, p.index, p.value), (t, s, i, v));
        }
    }

    #[test]
    fn distinct_triples_never_collide() {
        let a = encode(ObjectType::Track, Subtype::Raw, 1, 5.0).unwrap();
        let b = encode(ObjectType::Track, Subtype::Smeared, 1, 5.0).unwrap();
        let c = encode(ObjectType::EcalCluster, Subtype::Raw, 1, 5.0).unwrap();
        let d = encode(ObjectType::Track, Subtype::Raw, 2, 5.0).unwrap();
        let all = [a, b, c, d];
        for (i, x) in all.iter().enumerate() {
            for y in &all[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn ordering_follows_fields() {
        let low = encode(ObjectType::EcalCluster, Subtype::Raw, 9, 100.0).unwrap();
        let high = encode(ObjectType::HcalCluster, Subtype::Raw, 0, 0.0).unwrap();
        assert!(low < high);

        let e1 = encode(ObjectType::Track, Subtype::Raw, 1, 2.0).unwrap();
        let e2 = encode(ObjectType::Track, Subtype::Raw, 1, 3.0).unwrap();
        assert!(e1 < e2, "value bits must order numerically");
    }

    #[test]
    fn negative_zero_is_normalized() {
        let a = encode(ObjectType::Track, Subtype::Raw, 1, -0.0).unwrap();
        let b = encode(ObjectType::Track, Subtype::Raw, 1, 0.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(encode_codes(0, 1, 1, 1.0), Err(IdError::UnknownType(0)));
        assert_eq!(encode_codes(9, 1, 1, 1.0), Err(IdError::UnknownType(9)));
        assert_eq!(encode_codes(1, 15, 1, 1.0), Err(IdError::UnknownSubtype(15)));
        assert!(decode(Identifier::from_raw(0)).is_err());
    }

    #[test]
    fn rejects_bad_index_and_value() {
        assert_eq!(
            encode(ObjectType::Track, Subtype::Raw, MAX_INDEX + 1, 1.0),
            Err(IdError::IndexOverflow(MAX_INDEX + 1))
        );
        assert!(matches!(
            encode(ObjectType::Track, Subtype::Raw, 1, -1.0),
            Err(IdError::InvalidValue(_))
        ));
        assert!(encode(ObjectType::Track, Subtype::Raw, 1, f32::NAN).is_err());
        assert!(encode(ObjectType::Track, Subtype::Raw, 1, f32::INFINITY).is_err());
    }

    #[test]
    fn pretty_strings() {
        let id = encode(ObjectType::EcalCluster, Subtype::Raw, 103, 4.0).unwrap();
        assert_eq!(pretty(id), "et103");
        assert_eq!(id.to_string(), "et103");
        assert_eq!(id.type_and_subtype().as_deref(), Some("et"));

        let (cat, idx) = parse_pretty("pg66").unwrap();
        assert_eq!(cat, Category::new(ObjectType::Particle, Subtype::Generated));
        assert_eq!(idx, 66);

        assert!(parse_pretty("p").is_err());
        assert!(parse_pretty("xx1").is_err());
        assert!(parse_pretty("pgx").is_err());
    }

    #[test]
    fn category_parse_and_display() {
        let c: Category = "hm".parse().unwrap();
        assert_eq!(c, Category::new(ObjectType::HcalCluster, Subtype::Merged));
        assert_eq!(c.to_string(), "hm");
        assert!("h".parse::<Category>().is_err());
        assert!("hmm".parse::<Category>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = encode(ObjectType::Track, Subtype::Raw, 1, 2.0).unwrap();
        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, id.raw().to_string());
        let back: Identifier = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }
}
