//! Block number to decoder mapping

use crate::blocks::{rf_status, RfStatus, SbfBlockBody};
use crate::constants::BLOCK_RF_STATUS;
use crate::error::SbfError;
use crate::record::SbfPayload;
use crate::schema::{builtin_schemas, BlockSchema};
use crate::types::BlockHeader;
use hashbrown::HashMap;

/// Decoder entry point: receives the complete block, header included
pub type DecodeFn = fn(&[u8]) -> Result<SbfBlockBody, SbfError>;

/// How one block number is decoded
#[derive(Debug, Clone, Copy)]
pub enum BlockDecoder {
    /// Hand-written decoder
    Function {
        /// Name published as `blockType`
        block_type: &'static str,
        /// Decoder
        decode: DecodeFn,
    },
    /// Flat layout interpreted field by field
    Schema(&'static BlockSchema),
}

impl BlockDecoder {
    /// Name published as `blockType`
    pub fn block_type(&self) -> &'static str {
        match self {
            BlockDecoder::Function { block_type, .. } => *block_type,
            BlockDecoder::Schema(schema) => schema.name,
        }
    }

    /// Decode a complete, CRC-checked block
    pub fn decode(&self, block: &[u8]) -> Result<SbfBlockBody, SbfError> {
        match self {
            BlockDecoder::Function { decode, .. } => decode(block),
            BlockDecoder::Schema(schema) => schema.decode(block).map(SbfBlockBody::Schema),
        }
    }
}

/// Registered block decoders
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    decoders: HashMap<u16, BlockDecoder>,
}

impl BlockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a hand-written decoder, returning the one it replaces
    pub fn register_fn(
        &mut self,
        block_number: u16,
        block_type: &'static str,
        decode: DecodeFn,
    ) -> Option<BlockDecoder> {
        self.decoders
            .insert(block_number, BlockDecoder::Function { block_type, decode })
    }

    /// Register a schema under its own block number
    pub fn register_schema(&mut self, schema: &'static BlockSchema) -> Option<BlockDecoder> {
        self.decoders
            .insert(schema.number, BlockDecoder::Schema(schema))
    }

    /// Look up the decoder for a block number
    pub fn get(&self, block_number: u16) -> Option<&BlockDecoder> {
        self.decoders.get(&block_number)
    }

    /// Decode a block whose header has already been validated
    pub fn decode(&self, header: &BlockHeader, block: &[u8]) -> Result<SbfPayload, SbfError> {
        let number = header.block_number();
        let decoder = self
            .get(number)
            .ok_or(SbfError::UnsupportedBlock(number))?;

        Ok(SbfPayload {
            block_id: number,
            block_type: decoder.block_type(),
            revision: header.revision(),
            block: decoder.decode(block)?,
        })
    }

    /// Number of registered block numbers
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Registered block numbers, ascending
    pub fn block_numbers(&self) -> Vec<u16> {
        let mut numbers: Vec<u16> = self.decoders.keys().copied().collect();
        numbers.sort_unstable();
        numbers
    }
}

impl Default for BlockRegistry {
    /// RFStatus plus every built-in schema
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_fn(BLOCK_RF_STATUS, RfStatus::BLOCK_TYPE, rf_status::decode);
        for schema in builtin_schemas() {
            registry.register_schema(schema);
        }
        registry
    }
}
