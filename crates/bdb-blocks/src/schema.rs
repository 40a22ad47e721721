//! Per-fork binary schemas for [`SignedBeaconBlock`].
//!
//! Each fork module exposes a plain `encode`/`decode` function pair. The
//! pair is what a schema registry stores for that fork. Encoding refuses
//! blocks built for another fork and lists over their maximum; decoding is
//! strict and applies the same limits while reading list lengths, before
//! the elements are materialized.

use bdb_codec::{DecodeError, Encode, EncodeError};
use bdb_config::ForkName;

use crate::block::SignedBeaconBlock;
use crate::containers::{MAX_BYTES_PER_TRANSACTION, MAX_TRANSACTIONS_PER_PAYLOAD, MAX_VOLUNTARY_EXITS};

/// Name of the block entity in schema errors.
pub const BLOCK_ENTITY: &str = "block";

struct LimitViolation {
    field: &'static str,
    len: usize,
    max: usize,
}

fn check_limits(block: &SignedBeaconBlock) -> Result<(), LimitViolation> {
    let body = &block.message.body;
    let exits = body.voluntary_exits().len();
    if exits > MAX_VOLUNTARY_EXITS {
        return Err(LimitViolation {
            field: "voluntary_exits",
            len: exits,
            max: MAX_VOLUNTARY_EXITS,
        });
    }
    if let Some(payload) = body.execution_payload() {
        let count = payload.transactions.len();
        if count > MAX_TRANSACTIONS_PER_PAYLOAD {
            return Err(LimitViolation {
                field: "transactions",
                len: count,
                max: MAX_TRANSACTIONS_PER_PAYLOAD,
            });
        }
        if let Some(tx) = payload
            .transactions
            .iter()
            .find(|tx| tx.0.len() > MAX_BYTES_PER_TRANSACTION)
        {
            return Err(LimitViolation {
                field: "transaction",
                len: tx.0.len(),
                max: MAX_BYTES_PER_TRANSACTION,
            });
        }
    }
    Ok(())
}

fn encode_as(fork: ForkName, block: &SignedBeaconBlock) -> Result<Vec<u8>, EncodeError> {
    if block.fork() != fork {
        return Err(EncodeError::ForkMismatch {
            expected: fork.to_string(),
            found: block.fork().to_string(),
        });
    }
    check_limits(block)
        .map_err(|v| EncodeError::ListTooLong { field: v.field, len: v.len, max: v.max })?;
    let len = block.encoded_len();
    if len > u32::MAX as usize {
        return Err(EncodeError::TooLarge(len));
    }
    Ok(block.encode())
}

fn decode_as(fork: ForkName, bytes: &[u8]) -> Result<SignedBeaconBlock, DecodeError> {
    SignedBeaconBlock::decode_for(fork, bytes)
}

pub mod phase0 {
    use super::*;

    pub fn encode(block: &SignedBeaconBlock) -> Result<Vec<u8>, EncodeError> {
        encode_as(ForkName::Phase0, block)
    }

    pub fn decode(bytes: &[u8]) -> Result<SignedBeaconBlock, DecodeError> {
        decode_as(ForkName::Phase0, bytes)
    }
}

pub mod altair {
    use super::*;

    pub fn encode(block: &SignedBeaconBlock) -> Result<Vec<u8>, EncodeError> {
        encode_as(ForkName::Altair, block)
    }

    pub fn decode(bytes: &[u8]) -> Result<SignedBeaconBlock, DecodeError> {
        decode_as(ForkName::Altair, bytes)
    }
}

pub mod bellatrix {
    use super::*;

    pub fn encode(block: &SignedBeaconBlock) -> Result<Vec<u8>, EncodeError> {
        encode_as(ForkName::Bellatrix, block)
    }

    pub fn decode(bytes: &[u8]) -> Result<SignedBeaconBlock, DecodeError> {
        decode_as(ForkName::Bellatrix, bytes)
    }
}

/// The encode function for `fork`.
pub fn encoder_for(fork: ForkName) -> fn(&SignedBeaconBlock) -> Result<Vec<u8>, EncodeError> {
    match fork {
        ForkName::Phase0 => phase0::encode,
        ForkName::Altair => altair::encode,
        ForkName::Bellatrix => bellatrix::encode,
    }
}

/// The decode function for `fork`.
pub fn decoder_for(fork: ForkName) -> fn(&[u8]) -> Result<SignedBeaconBlock, DecodeError> {
    match fork {
        ForkName::Phase0 => phase0::decode,
        ForkName::Altair => altair::decode,
        ForkName::Bellatrix => bellatrix::decode,
    }
}
