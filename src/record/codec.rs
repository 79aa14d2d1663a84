//! Record codec
//!
//! Encoding and decoding functions for slot records.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, SlabError};
use crate::sizeclass::class_slot_size;

use super::{Record, RecordHeader, RecordKind, RECORD_HEADER_SIZE};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a record to bytes
///
/// Format: kind (1) + total_len (4) + key_len (2) + key + value
pub fn encode(kind: RecordKind, key: &[u8], value: &[u8]) -> Result<Bytes> {
    let key_len = u16::try_from(key.len()).map_err(|_| {
        SlabError::InvalidInput(format!(
            "key of {} bytes exceeds maximum {}",
            key.len(),
            u16::MAX
        ))
    })?;

    let total = RECORD_HEADER_SIZE + key.len() + value.len();
    let total_len = u32::try_from(total).map_err(|_| {
        SlabError::InvalidInput(format!(
            "record of {} bytes exceeds maximum {}",
            total,
            u32::MAX
        ))
    })?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u8(kind as u8);
    buf.put_u32_le(total_len);
    buf.put_u16_le(key_len);
    buf.put_slice(key);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Encode the header written over a deleted record
pub fn encode_tombstone() -> Bytes {
    let mut buf = BytesMut::with_capacity(RECORD_HEADER_SIZE);
    buf.put_u8(RecordKind::Tombstone as u8);
    buf.put_u32_le(RECORD_HEADER_SIZE as u32);
    buf.put_u16_le(0);
    buf.freeze()
}

// =============================================================================
// Decoding
// =============================================================================

/// Parse just the fixed header at the start of `buffer`
pub fn read_header(buffer: &[u8]) -> Result<RecordHeader> {
    if buffer.len() < RECORD_HEADER_SIZE {
        return Err(SlabError::CorruptRecord(format!(
            "incomplete header: expected {} bytes, got {}",
            RECORD_HEADER_SIZE,
            buffer.len()
        )));
    }

    let mut cursor = &buffer[..RECORD_HEADER_SIZE];
    let kind_byte = cursor.get_u8();
    let total_len = cursor.get_u32_le();
    let key_len = cursor.get_u16_le();

    let kind = RecordKind::try_from(kind_byte).map_err(|byte| {
        SlabError::CorruptRecord(format!("unknown record kind: 0x{:02x}", byte))
    })?;

    Ok(RecordHeader {
        kind,
        total_len,
        key_len,
    })
}

/// Decode the record stored in a slot of class `size_class`
///
/// Never looks past the slot: at most `class_slot_size(size_class)` bytes of
/// `buffer` are read, whatever the header claims.
pub fn decode(buffer: &[u8], size_class: usize) -> Result<Record> {
    let bound = buffer.len().min(class_slot_size(size_class) as usize);
    let slot = &buffer[..bound];

    let header = read_header(slot)?;

    let total_len = header.total_len as usize;
    let key_end = RECORD_HEADER_SIZE + header.key_len as usize;

    if total_len > slot.len() {
        return Err(SlabError::CorruptRecord(format!(
            "record length {} exceeds slot size {}",
            total_len,
            slot.len()
        )));
    }
    if total_len < key_end {
        return Err(SlabError::CorruptRecord(format!(
            "record length {} shorter than header plus {}-byte key",
            total_len, header.key_len
        )));
    }

    let key = Bytes::copy_from_slice(&slot[RECORD_HEADER_SIZE..key_end]);
    let value = Bytes::copy_from_slice(&slot[key_end..total_len]);

    Ok(Record {
        kind: header.kind,
        key,
        value,
    })
}
