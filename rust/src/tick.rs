//! Tick record and the benchmark fixture
//!
//! `TickData` derives its protobuf wire layout from the `prost` attributes.
//! [`message_descriptor`] describes the same schema at runtime for the
//! reflection-based JSON encoder; the two must agree field for field.

use prost_reflect::{DescriptorPool, MessageDescriptor};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};

use crate::error::CodecError;

/// Number of entries in the fixture's `fee_list`
pub const FEE_LIST_LEN: usize = 100;
/// Length of the fixture's hex-like `signature`
pub const SIGNATURE_LEN: usize = 43;
/// Length of the fixture's `time_lock` buffer
pub const TIME_LOCK_LEN: usize = 100;
/// Number of entries in the fixture's `transaction_ids`
pub const TRANSACTION_IDS_LEN: usize = 100;
/// Length of the fixture's `extra_data` buffer
pub const EXTRA_DATA_LEN: usize = 100;

/// Fully-qualified protobuf name of [`TickData`]
pub const MESSAGE_NAME: &str = "tick.TickData";

/// One unit of periodic network state
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TickData {
    #[prost(uint64, tag = "1")]
    pub timestamp: u64,

    /// Position within the epoch
    #[prost(uint32, tag = "2")]
    pub sequence_number: u32,

    /// Originating participant
    #[prost(uint32, tag = "3")]
    pub producer_index: u32,

    #[prost(uint32, tag = "4")]
    pub epoch: u32,

    #[prost(int64, repeated, tag = "5")]
    pub fee_list: Vec<i64>,

    #[prost(string, tag = "6")]
    pub signature: String,

    #[prost(bytes = "vec", tag = "7")]
    pub time_lock: Vec<u8>,

    #[prost(string, repeated, tag = "8")]
    pub transaction_ids: Vec<String>,

    #[prost(bytes = "vec", tag = "9")]
    pub extra_data: Vec<u8>,
}

/// Build the fixed tick every benchmark run encodes.
///
/// Values are zero or empty on purpose: encode cost is driven by how many
/// elements each field holds, not by what they contain.
pub fn build_fixture() -> TickData {
    TickData {
        timestamp: 1,
        sequence_number: 2,
        producer_index: 3,
        epoch: 4,
        fee_list: vec![0; FEE_LIST_LEN],
        signature: "a".repeat(SIGNATURE_LEN),
        time_lock: vec![0; TIME_LOCK_LEN],
        transaction_ids: vec![String::new(); TRANSACTION_IDS_LEN],
        extra_data: vec![0; EXTRA_DATA_LEN],
    }
}

/// Runtime descriptor of `tick.TickData`, mirroring the `prost` attributes above
pub fn message_descriptor() -> Result<MessageDescriptor, CodecError> {
    let message = DescriptorProto {
        name: Some("TickData".into()),
        field: vec![
            field("timestamp", "timestamp", 1, Type::Uint64, Label::Optional),
            field("sequence_number", "sequenceNumber", 2, Type::Uint32, Label::Optional),
            field("producer_index", "producerIndex", 3, Type::Uint32, Label::Optional),
            field("epoch", "epoch", 4, Type::Uint32, Label::Optional),
            field("fee_list", "feeList", 5, Type::Int64, Label::Repeated),
            field("signature", "signature", 6, Type::String, Label::Optional),
            field("time_lock", "timeLock", 7, Type::Bytes, Label::Optional),
            field("transaction_ids", "transactionIds", 8, Type::String, Label::Repeated),
            field("extra_data", "extraData", 9, Type::Bytes, Label::Optional),
        ],
        ..Default::default()
    };

    let file = FileDescriptorProto {
        name: Some("tick.proto".into()),
        package: Some("tick".into()),
        message_type: vec![message],
        syntax: Some("proto3".into()),
        ..Default::default()
    };

    let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })?;
    pool.get_message_by_name(MESSAGE_NAME)
        .ok_or_else(|| CodecError::UnknownMessage(MESSAGE_NAME.into()))
}

fn field(name: &str, json_name: &str, number: i32, ty: Type, label: Label) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        json_name: Some(json_name.into()),
        number: Some(number),
        r#type: Some(ty as i32),
        label: Some(label as i32),
        ..Default::default()
    }
}
