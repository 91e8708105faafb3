//! Typed block decoders
//!
//! Blocks whose layout needs more than flat fields (sub-block arrays, bit
//! fields) get a hand-written decoder here. Flat layouts live in
//! [`crate::schema`] instead.

pub mod rf_status;

pub use rf_status::{RfBand, RfBandInfo, RfStatus};

use crate::schema::SchemaBlock;
use serde::Serialize;

/// Decoded content of one SBF block, published under `block`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SbfBlockBody {
    /// RFStatus (4092)
    RfStatus(RfStatus),
    /// Any block described by a [`crate::schema::BlockSchema`]
    Schema(SchemaBlock),
}
