//! Raw log decoding
//!
//! Logs are matched on their first topic against the vault's event
//! signatures; logs of any other event are skipped.

use alloy_primitives::{Log as PrimitiveLog, LogData};
use alloy_rpc_types::Log;
use alloy_sol_types::SolEvent;
use tracing::trace;

use super::event::{BridgeEvent, EventMeta, IndexedEvent};
use crate::contracts::abi::DogeLock;
use crate::error::{BridgeError, Result};

/// Decodes one RPC log.
///
/// Returns `Ok(None)` for logs that are not bridge events. Mined logs always
/// carry their position; a missing transaction hash, log index or block
/// number is reported as [`BridgeError::MalformedLog`]. A missing block
/// timestamp decodes as `0` and is left for the caller to fill in.
pub fn decode_log(log: &Log) -> Result<Option<IndexedEvent>> {
    let Some(event) = decode_event(log.data())? else {
        trace!(
            contract = %log.address(),
            topic0 = ?log.topic0(),
            event = "log_skipped"
        );
        return Ok(None);
    };

    let meta = EventMeta {
        contract: log.address(),
        transaction_hash: log
            .transaction_hash
            .ok_or_else(|| BridgeError::MalformedLog("missing transaction hash".to_string()))?,
        log_index: log
            .log_index
            .ok_or_else(|| BridgeError::MalformedLog("missing log index".to_string()))?,
        block_number: log
            .block_number
            .ok_or_else(|| BridgeError::MalformedLog("missing block number".to_string()))?,
        timestamp: log.block_timestamp.unwrap_or_default(),
    };

    Ok(Some(IndexedEvent { meta, event }))
}

/// Decodes the event payload of a log, `None` when the signature is unknown.
pub fn decode_event(data: &LogData) -> Result<Option<BridgeEvent>> {
    let Some(topic0) = data.topics().first() else {
        return Ok(None);
    };

    let event = if *topic0 == DogeLock::Lock::SIGNATURE_HASH {
        let e = DogeLock::Lock::decode_log_data(data)?;
        BridgeEvent::Lock {
            user: e.user,
            amount: e.amount,
            block_number: e.blockNumber,
        }
    } else if *topic0 == DogeLock::Unlock::SIGNATURE_HASH {
        let e = DogeLock::Unlock::decode_log_data(data)?;
        BridgeEvent::Unlock {
            user: e.user,
            amount: e.amount,
            block_number: e.blockNumber,
        }
    } else if *topic0 == DogeLock::OFTSent::SIGNATURE_HASH {
        let e = DogeLock::OFTSent::decode_log_data(data)?;
        BridgeEvent::OftSent {
            guid: e.guid,
            dst_eid: e.dstEid,
            from: e.fromAddress,
            amount_sent_ld: e.amountSentLD,
            amount_received_ld: e.amountReceivedLD,
        }
    } else if *topic0 == DogeLock::OFTReceived::SIGNATURE_HASH {
        let e = DogeLock::OFTReceived::decode_log_data(data)?;
        BridgeEvent::OftReceived {
            guid: e.guid,
            src_eid: e.srcEid,
            to: e.toAddress,
            amount_received_ld: e.amountReceivedLD,
        }
    } else {
        return Ok(None);
    };

    Ok(Some(event))
}

/// Encodes an event the way the contracts emit it.
pub fn encode_event(event: &BridgeEvent) -> LogData {
    match event {
        BridgeEvent::Lock {
            user,
            amount,
            block_number,
        } => DogeLock::Lock {
            user: *user,
            amount: *amount,
            blockNumber: *block_number,
        }
        .encode_log_data(),
        BridgeEvent::Unlock {
            user,
            amount,
            block_number,
        } => DogeLock::Unlock {
            user: *user,
            amount: *amount,
            blockNumber: *block_number,
        }
        .encode_log_data(),
        BridgeEvent::OftSent {
            guid,
            dst_eid,
            from,
            amount_sent_ld,
            amount_received_ld,
        } => DogeLock::OFTSent {
            guid: *guid,
            dstEid: *dst_eid,
            fromAddress: *from,
            amountSentLD: *amount_sent_ld,
            amountReceivedLD: *amount_received_ld,
        }
        .encode_log_data(),
        BridgeEvent::OftReceived {
            guid,
            src_eid,
            to,
            amount_received_ld,
        } => DogeLock::OFTReceived {
            guid: *guid,
            srcEid: *src_eid,
            toAddress: *to,
            amountReceivedLD: *amount_received_ld,
        }
        .encode_log_data(),
    }
}

/// Builds an RPC log as a node would return it.
pub fn rpc_log(meta: &EventMeta, event: &BridgeEvent) -> Log {
    Log {
        inner: PrimitiveLog {
            address: meta.contract,
            data: encode_event(event),
        },
        block_hash: None,
        block_number: Some(meta.block_number),
        block_timestamp: Some(meta.timestamp),
        transaction_hash: Some(meta.transaction_hash),
        transaction_index: None,
        log_index: Some(meta.log_index),
        removed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    fn meta() -> EventMeta {
        EventMeta {
            contract: Address::repeat_byte(0x01),
            transaction_hash: B256::repeat_byte(0xAA),
            log_index: 3,
            block_number: 17,
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_decode_lock_log() {
        let event = BridgeEvent::Lock {
            user: Address::repeat_byte(0x42),
            amount: U256::from(5_000_000_000u64),
            block_number: U256::from(17),
        };
        let decoded = decode_log(&rpc_log(&meta(), &event)).unwrap().unwrap();

        assert_eq!(decoded.event, event);
        assert_eq!(decoded.meta, meta());
    }

    #[test]
    fn test_decode_oft_sent_log() {
        let event = BridgeEvent::OftSent {
            guid: B256::repeat_byte(0x07),
            dst_eid: 2,
            from: Address::repeat_byte(0x42),
            amount_sent_ld: U256::from(100),
            amount_received_ld: U256::from(100),
        };
        let decoded = decode_log(&rpc_log(&meta(), &event)).unwrap().unwrap();
        assert_eq!(decoded.event, event);
        assert_eq!(decoded.event.user(), Address::repeat_byte(0x42));
    }

    #[test]
    fn test_unknown_topic_is_skipped() {
        let data = LogData::new_unchecked(vec![B256::repeat_byte(0x99)], Default::default());
        assert_eq!(decode_event(&data).unwrap(), None);
        assert_eq!(decode_event(&LogData::default()).unwrap(), None);
    }

    #[test]
    fn test_missing_position_is_malformed() {
        let event = BridgeEvent::Unlock {
            user: Address::repeat_byte(0x42),
            amount: U256::from(1),
            block_number: U256::from(17),
        };
        let mut log = rpc_log(&meta(), &event);
        log.transaction_hash = None;

        assert!(matches!(
            decode_log(&log),
            Err(BridgeError::MalformedLog(_))
        ));
    }

    #[test]
    fn test_truncated_payload_is_an_error() {
        let event = BridgeEvent::Lock {
            user: Address::repeat_byte(0x42),
            amount: U256::from(1),
            block_number: U256::from(1),
        };
        let data = encode_event(&event);
        let truncated = LogData::new_unchecked(data.topics().to_vec(), data.data.slice(..16).into());

        assert!(decode_event(&truncated).is_err());
    }
}
