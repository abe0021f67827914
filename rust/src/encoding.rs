//! The two encodings under comparison
//!
//! Both take the tick by reference and hand back an owned buffer, so the
//! harness can time them through the same [`Encoder`] seam. The text
//! encoding goes through `prost-reflect`: the tick is viewed as a
//! `DynamicMessage` and serialized with the protobuf JSON mapping
//! (camelCase names, defaults skipped, 64-bit ints as strings, base64 bytes).

use std::fmt;

use prost::bytes::Bytes;
use prost::Message;
use prost_reflect::{DynamicMessage, MessageDescriptor, Value};

use crate::error::CodecError;
use crate::tick::{self, TickData};

/// Anything the timing harness can drive
pub trait Encoder {
    /// Name used in logs, errors and reports
    fn label(&self) -> &str;

    fn encode(&self, tick: &TickData) -> Result<Vec<u8>, CodecError>;
}

/// Protobuf wire format
#[inline]
pub fn encode_binary(tick: &TickData) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(tick.encoded_len());
    tick.encode(&mut buf)?;
    Ok(buf)
}

/// Protobuf JSON mapping over a runtime descriptor
#[derive(Debug, Clone)]
pub struct TextEncoder {
    descriptor: MessageDescriptor,
}

impl TextEncoder {
    pub fn new() -> Result<Self, CodecError> {
        Ok(Self {
            descriptor: tick::message_descriptor()?,
        })
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    /// Reflective view of `tick`
    pub fn to_dynamic(&self, tick: &TickData) -> Result<DynamicMessage, CodecError> {
        let mut message = DynamicMessage::new(self.descriptor.clone());

        set(&mut message, 1, Value::U64(tick.timestamp))?;
        set(&mut message, 2, Value::U32(tick.sequence_number))?;
        set(&mut message, 3, Value::U32(tick.producer_index))?;
        set(&mut message, 4, Value::U32(tick.epoch))?;
        set(
            &mut message,
            5,
            Value::List(tick.fee_list.iter().copied().map(Value::I64).collect()),
        )?;
        set(&mut message, 6, Value::String(tick.signature.clone()))?;
        set(&mut message, 7, Value::Bytes(Bytes::copy_from_slice(&tick.time_lock)))?;
        set(
            &mut message,
            8,
            Value::List(tick.transaction_ids.iter().cloned().map(Value::String).collect()),
        )?;
        set(&mut message, 9, Value::Bytes(Bytes::copy_from_slice(&tick.extra_data)))?;

        Ok(message)
    }

    #[inline]
    pub fn encode_text(&self, tick: &TickData) -> Result<Vec<u8>, CodecError> {
        let message = self.to_dynamic(tick)?;
        Ok(serde_json::to_vec(&message)?)
    }
}

#[inline]
fn set(message: &mut DynamicMessage, number: u32, value: Value) -> Result<(), CodecError> {
    message
        .try_set_field_by_number(number, value)
        .map_err(|e| CodecError::Reflect(e.to_string()))
}

/// Which encoding to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Binary,
    Text,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Binary, Encoding::Text];

    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Binary => "binary",
            Encoding::Text => "text",
        }
    }

    /// Build the encoder, loading the descriptor for the text encoding
    pub fn encoder(self) -> Result<TickEncoder, CodecError> {
        Ok(match self {
            Encoding::Binary => TickEncoder::Binary,
            Encoding::Text => TickEncoder::Text(TextEncoder::new()?),
        })
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ready-to-run encoder for one [`Encoding`]
#[derive(Debug, Clone)]
pub enum TickEncoder {
    Binary,
    Text(TextEncoder),
}

impl TickEncoder {
    pub fn encoding(&self) -> Encoding {
        match self {
            TickEncoder::Binary => Encoding::Binary,
            TickEncoder::Text(_) => Encoding::Text,
        }
    }
}

impl Encoder for TickEncoder {
    fn label(&self) -> &str {
        self.encoding().name()
    }

    #[inline]
    fn encode(&self, tick: &TickData) -> Result<Vec<u8>, CodecError> {
        match self {
            TickEncoder::Binary => encode_binary(tick),
            TickEncoder::Text(text) => text.encode_text(tick),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::build_fixture;

    #[test]
    fn test_binary_wire_length() {
        let tick = build_fixture();
        let bytes = encode_binary(&tick).unwrap();

        // 4 scalars at 2 bytes, packed fees 102, signature 45,
        // two 100-byte buffers at 102, 100 empty ids at 2
        assert_eq!(bytes.len(), 559);
        assert_eq!(bytes.len(), tick.encoded_len());
    }

    #[test]
    fn test_binary_decodes_back() {
        let tick = build_fixture();
        let bytes = encode_binary(&tick).unwrap();
        let decoded = TickData::decode(bytes.as_slice()).unwrap();
        assert_eq!(tick, decoded);
    }

    #[test]
    fn test_text_follows_json_mapping() {
        let tick = build_fixture();
        let bytes = TextEncoder::new().unwrap().encode_text(&tick).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["timestamp"], "1");
        assert_eq!(value["sequenceNumber"], 2);
        assert_eq!(value["producerIndex"], 3);
        assert_eq!(value["epoch"], 4);

        let fees = value["feeList"].as_array().unwrap();
        assert_eq!(fees.len(), 100);
        assert!(fees.iter().all(|fee| fee == "0"));

        assert_eq!(value["signature"].as_str().unwrap().len(), 43);

        let zeros = "A".repeat(132) + "AA==";
        assert_eq!(value["timeLock"], zeros.as_str());
        assert_eq!(value["extraData"], zeros.as_str());

        let ids = value["transactionIds"].as_array().unwrap();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id == ""));
    }

    #[test]
    fn test_descriptor_matches_wire_layout() {
        // Decoding the prost bytes through the runtime descriptor must give
        // the same JSON as the reflective view built field by field
        let tick = build_fixture();
        let text = TextEncoder::new().unwrap();

        let decoded =
            DynamicMessage::decode(text.descriptor().clone(), encode_binary(&tick).unwrap().as_slice())
                .unwrap();
        let from_wire = serde_json::to_value(&decoded).unwrap();
        let from_view: serde_json::Value =
            serde_json::from_slice(&text.encode_text(&tick).unwrap()).unwrap();

        assert_eq!(from_wire, from_view);
    }

    #[test]
    fn test_encoding_dispatch() {
        let tick = build_fixture();

        let binary = Encoding::Binary.encoder().unwrap();
        let text = Encoding::Text.encoder().unwrap();

        assert_eq!(binary.encode(&tick).unwrap(), encode_binary(&tick).unwrap());
        assert_eq!(
            text.encode(&tick).unwrap(),
            TextEncoder::new().unwrap().encode_text(&tick).unwrap()
        );
        assert_eq!(binary.label(), "binary");
        assert_eq!(text.label(), "text");
        assert_eq!(text.encoding(), Encoding::Text);
    }
}
