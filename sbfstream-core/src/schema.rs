//! Data-driven block layouts
//!
//! A [`BlockSchema`] lists the flat fields of a block by name, offset and
//! wire type. One generic interpreter reads them through
//! [`BlockReader`], so adding a block to the catalog is a table entry
//! rather than a decoder.
//!
//! Newer revisions only ever append fields. A field that lies past the end
//! of the block at hand is therefore left out of the output instead of
//! failing the block.

use crate::constants::{
    BLOCK_DOP, BLOCK_END_OF_PVT, BLOCK_POWER_STATUS, BLOCK_PVT_GEODETIC, BLOCK_RECEIVER_TIME,
    F_NOT_VALID,
};
use crate::error::SbfError;
use crate::reader::BlockReader;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Wire type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `u1`
    U8,
    /// `i1`
    I8,
    /// `u2`
    U16,
    /// `i2`
    I16,
    /// `u4`
    U32,
    /// `i4`
    I32,
    /// `u8`
    U64,
    /// `f4`
    F32,
    /// `f8`
    F64,
}

impl FieldType {
    /// Width in bytes
    pub const fn width(self) -> usize {
        match self {
            FieldType::U8 | FieldType::I8 => 1,
            FieldType::U16 | FieldType::I16 => 2,
            FieldType::U32 | FieldType::I32 | FieldType::F32 => 4,
            FieldType::U64 | FieldType::F64 => 8,
        }
    }

    /// Do-not-use value the receiver sends for this type
    ///
    /// Matches the `*_NOT_VALID` constants, spelled out as floats so the
    /// schema tables stay `const`.
    pub const fn default_sentinel(self) -> Option<f64> {
        match self {
            FieldType::U8 => Some(255.0),
            FieldType::I8 => Some(-128.0),
            FieldType::U16 => Some(65_535.0),
            FieldType::I16 => Some(-32_768.0),
            FieldType::U32 => Some(4_294_967_295.0),
            FieldType::I32 => Some(-2_147_483_648.0),
            FieldType::U64 => None,
            FieldType::F32 | FieldType::F64 => Some(F_NOT_VALID),
        }
    }
}

/// One field of a block layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Name in the published record
    pub name: &'static str,
    /// Byte offset from the start of the block (header included)
    pub offset: usize,
    /// Wire type
    pub ty: FieldType,
    /// Multiplier applied to the raw value
    pub scale: Option<f64>,
    /// Raw value that means "not available", published as `null`
    pub sentinel: Option<f64>,
}

impl FieldSpec {
    /// Field with the type's default do-not-use value
    pub const fn new(name: &'static str, offset: usize, ty: FieldType) -> Self {
        Self {
            name,
            offset,
            ty,
            scale: None,
            sentinel: ty.default_sentinel(),
        }
    }

    /// Multiply the raw value by `scale`
    pub const fn scaled(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Use a different do-not-use value
    pub const fn sentinel(mut self, raw: f64) -> Self {
        self.sentinel = Some(raw);
        self
    }

    /// Every raw value is valid (bit fields, counters)
    pub const fn no_sentinel(mut self) -> Self {
        self.sentinel = None;
        self
    }

    /// Read this field, `Ok(None)` for the do-not-use value
    pub fn read(&self, reader: &BlockReader<'_>) -> Result<Option<FieldValue>, SbfError> {
        let (raw, value) = match self.ty {
            FieldType::U8 => unsigned(reader.u8_at(self.offset)? as u64),
            FieldType::I8 => signed(reader.i8_at(self.offset)? as i64),
            FieldType::U16 => unsigned(reader.u16_at(self.offset)? as u64),
            FieldType::I16 => signed(reader.i16_at(self.offset)? as i64),
            FieldType::U32 => unsigned(reader.u32_at(self.offset)? as u64),
            FieldType::I32 => signed(reader.i32_at(self.offset)? as i64),
            FieldType::U64 => unsigned(reader.u64_at(self.offset)?),
            FieldType::F32 => float(reader.f32_at(self.offset)? as f64),
            FieldType::F64 => float(reader.f64_at(self.offset)?),
        };

        if self.sentinel == Some(raw) {
            return Ok(None);
        }

        Ok(Some(match self.scale {
            Some(scale) => FieldValue::Float(raw * scale),
            None => value,
        }))
    }
}

fn unsigned(v: u64) -> (f64, FieldValue) {
    (v as f64, FieldValue::Unsigned(v))
}

fn signed(v: i64) -> (f64, FieldValue) {
    (v as f64, FieldValue::Signed(v))
}

fn float(v: f64) -> (f64, FieldValue) {
    (v, FieldValue::Float(v))
}

/// A decoded field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Unsigned integer
    Unsigned(u64),
    /// Signed integer
    Signed(i64),
    /// Floating point, or any scaled value
    Float(f64),
}

/// Layout of one block type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSchema {
    /// Block number
    pub number: u16,
    /// Name published as `blockType`
    pub name: &'static str,
    /// Fields in wire order
    pub fields: &'static [FieldSpec],
}

impl BlockSchema {
    /// Decode every field present in `block`
    pub fn decode(&self, block: &[u8]) -> Result<SchemaBlock, SbfError> {
        let reader = BlockReader::new(block);
        let mut fields = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            if !reader.has(field.offset, field.ty.width()) {
                continue;
            }
            fields.push((field.name, field.read(&reader)?));
        }

        Ok(SchemaBlock { fields })
    }
}

/// Fields decoded by a [`BlockSchema`], serialized as an ordered map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaBlock {
    /// `(name, value)` pairs; `None` is the do-not-use value
    pub fields: Vec<(&'static str, Option<FieldValue>)>,
}

impl SchemaBlock {
    /// Look up a field by name; `Some(None)` means present but not valid
    pub fn get(&self, name: &str) -> Option<Option<FieldValue>> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }
}

impl Serialize for SchemaBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

const TOW: FieldSpec = FieldSpec::new("tow", 8, FieldType::U32);
const WNC: FieldSpec = FieldSpec::new("wnc", 12, FieldType::U16);

/// ReceiverTime: UTC date and time as kept by the receiver
pub static RECEIVER_TIME: BlockSchema = BlockSchema {
    number: BLOCK_RECEIVER_TIME,
    name: "receiverTime",
    fields: &[
        TOW,
        WNC,
        FieldSpec::new("utcYear", 14, FieldType::I8),
        FieldSpec::new("utcMonth", 15, FieldType::I8),
        FieldSpec::new("utcDay", 16, FieldType::I8),
        FieldSpec::new("utcHour", 17, FieldType::I8),
        FieldSpec::new("utcMin", 18, FieldType::I8),
        FieldSpec::new("utcSec", 19, FieldType::I8),
        FieldSpec::new("deltaLS", 20, FieldType::I8),
        FieldSpec::new("syncLevel", 21, FieldType::U8).no_sentinel(),
    ],
};

/// EndOfPVT: marks the end of one PVT epoch
pub static END_OF_PVT: BlockSchema = BlockSchema {
    number: BLOCK_END_OF_PVT,
    name: "endOfPVT",
    fields: &[TOW, WNC],
};

/// DOP: dilution of precision, DOP values in units of 0.01
pub static DOP: BlockSchema = BlockSchema {
    number: BLOCK_DOP,
    name: "dop",
    fields: &[
        TOW,
        WNC,
        FieldSpec::new("nrSV", 14, FieldType::U8),
        FieldSpec::new("pdop", 16, FieldType::U16).scaled(0.01).sentinel(0.0),
        FieldSpec::new("tdop", 18, FieldType::U16).scaled(0.01).sentinel(0.0),
        FieldSpec::new("hdop", 20, FieldType::U16).scaled(0.01).sentinel(0.0),
        FieldSpec::new("vdop", 22, FieldType::U16).scaled(0.01).sentinel(0.0),
        FieldSpec::new("hpl", 24, FieldType::F32),
        FieldSpec::new("vpl", 28, FieldType::F32),
    ],
};

/// PowerStatus: power supply bit field
pub static POWER_STATUS: BlockSchema = BlockSchema {
    number: BLOCK_POWER_STATUS,
    name: "powerStatus",
    fields: &[
        TOW,
        WNC,
        FieldSpec::new("powerInfo", 14, FieldType::U16).no_sentinel(),
    ],
};

/// PVTGeodetic: position, velocity and time in geodetic coordinates
pub static PVT_GEODETIC: BlockSchema = BlockSchema {
    number: BLOCK_PVT_GEODETIC,
    name: "pvtGeodetic",
    fields: &[
        TOW,
        WNC,
        FieldSpec::new("mode", 14, FieldType::U8).no_sentinel(),
        FieldSpec::new("error", 15, FieldType::U8).no_sentinel(),
        FieldSpec::new("lat", 16, FieldType::F64),
        FieldSpec::new("lon", 24, FieldType::F64),
        FieldSpec::new("alt", 32, FieldType::F64),
        FieldSpec::new("undulation", 40, FieldType::F32),
        FieldSpec::new("vn", 44, FieldType::F32),
        FieldSpec::new("ve", 48, FieldType::F32),
        FieldSpec::new("vu", 52, FieldType::F32),
        FieldSpec::new("cog", 56, FieldType::F32),
        FieldSpec::new("rxClkBias", 60, FieldType::F64),
        FieldSpec::new("rxClkDrift", 68, FieldType::F32),
        FieldSpec::new("timeSystem", 72, FieldType::U8),
        FieldSpec::new("datum", 73, FieldType::U8),
        FieldSpec::new("nrSV", 74, FieldType::U8),
        FieldSpec::new("waCorrInfo", 75, FieldType::U8).no_sentinel(),
        FieldSpec::new("referenceID", 76, FieldType::U16),
        FieldSpec::new("meanCorrAge", 78, FieldType::U16).scaled(0.01),
        FieldSpec::new("signalInfo", 80, FieldType::U32).no_sentinel(),
        FieldSpec::new("alertFlag", 84, FieldType::U8).no_sentinel(),
        // revision 1 onwards
        FieldSpec::new("nrBases", 85, FieldType::U8),
        FieldSpec::new("pppInfo", 86, FieldType::U16).no_sentinel(),
        // revision 2 onwards
        FieldSpec::new("latency", 88, FieldType::U16).scaled(0.0001),
        FieldSpec::new("hAccuracy", 90, FieldType::U16).scaled(0.01),
        FieldSpec::new("vAccuracy", 92, FieldType::U16).scaled(0.01),
        FieldSpec::new("misc", 94, FieldType::U8).no_sentinel(),
    ],
};

/// Every schema registered by default
pub fn builtin_schemas() -> [&'static BlockSchema; 5] {
    [
        &RECEIVER_TIME,
        &END_OF_PVT,
        &DOP,
        &POWER_STATUS,
        &PVT_GEODETIC,
    ]
}
