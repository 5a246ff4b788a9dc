//! Proptest generators for property-based testing.

use proptest::prelude::*;

use bcos_client_channel::{ChannelFrameType, Frame, Seq};
use bcos_client_core::{Address, BlockNonce, Bloom, Header, Quantity, H256};

/// Generate a random H256.
pub fn h256() -> impl Strategy<Value = H256> {
    any::<[u8; 32]>().prop_map(H256::from_bytes)
}

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a bloom that is mostly zero with a few bits set, like a real one.
pub fn bloom() -> impl Strategy<Value = Bloom> {
    prop::collection::vec((0usize..256, any::<u8>()), 0..8).prop_map(|bits| {
        let mut bytes = [0u8; 256];
        for (i, b) in bits {
            bytes[i] |= b;
        }
        Bloom::from_bytes(bytes)
    })
}

/// Generate an unsigned integer of up to 256 bits, biased toward small values.
pub fn quantity() -> impl Strategy<Value = Quantity> {
    prop_oneof![
        3 => any::<u64>().prop_map(Quantity::from),
        1 => prop::collection::vec(any::<u8>(), 0..=32).prop_map(|b| Quantity::from_be_bytes(&b)),
    ]
}

/// Generate extra data bytes around the short-string boundary.
pub fn extra_data() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=96)
}

/// Generate a header with every field drawn independently.
pub fn header() -> impl Strategy<Value = Header> {
    let hashes = (h256(), h256(), address(), h256(), h256(), h256(), bloom());
    let scalars = (
        quantity(),
        quantity(),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        extra_data(),
        h256(),
        any::<u64>(),
    );
    (hashes, scalars).prop_map(
        |(
            (parent_hash, uncle_hash, coinbase, state_root, transactions_root, receipts_root, logs_bloom),
            (difficulty, number, gas_limit, gas_used, timestamp, extra_data, mix_digest, nonce),
        )| Header {
            parent_hash,
            uncle_hash,
            coinbase,
            state_root,
            transactions_root,
            receipts_root,
            logs_bloom,
            difficulty,
            number,
            gas_limit,
            gas_used,
            timestamp,
            extra_data,
            mix_digest,
            nonce: BlockNonce::from_u64(nonce),
        },
    )
}

/// Generate a frame kind.
pub fn frame_type() -> impl Strategy<Value = ChannelFrameType> {
    prop::sample::select(ChannelFrameType::ALL.to_vec())
}

/// Generate a frame with a payload of up to `max_payload` bytes.
pub fn frame(max_payload: usize) -> impl Strategy<Value = Frame> {
    (
        frame_type(),
        any::<[u8; 16]>(),
        any::<i32>(),
        prop::collection::vec(any::<u8>(), 0..=max_payload),
    )
        .prop_map(|(kind, seq, result, payload)| {
            Frame::new(kind, Seq::from_bytes(seq), payload).with_result(result)
        })
}
