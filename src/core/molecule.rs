//! Canonical binary encoding for chain data
//!
//! Layout rules shared with the on-chain verifier:
//! - integers are little-endian
//! - `fixvec`: u32 item count, then the fixed-size items back to back
//! - `dynvec` / `table`: u32 total size, one u32 offset per item, then the items
//! - an absent optional field encodes to zero bytes

/// Size of the u32 header words used by every variable-size layout
pub const NUMBER_SIZE: usize = 4;

/// Encode a byte string (`fixvec<byte>`)
pub fn pack_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(NUMBER_SIZE + data.len());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Encode a vector of fixed-size items, each already encoded
pub fn pack_fixvec<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(items.len() as u32).to_le_bytes());
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

/// Encode a vector of variable-size items, each already encoded
pub fn pack_dynvec<T: AsRef<[u8]>>(items: &[T]) -> Vec<u8> {
    let header_size = NUMBER_SIZE * (items.len() + 1);
    let body_size: usize = items.iter().map(|item| item.as_ref().len()).sum();
    let total_size = header_size + body_size;

    let mut out = Vec::with_capacity(total_size);
    out.extend_from_slice(&(total_size as u32).to_le_bytes());

    let mut offset = header_size;
    for item in items {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += item.as_ref().len();
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

/// Encode a table from its already-encoded fields (same layout as a dynvec)
pub fn pack_table<T: AsRef<[u8]>>(fields: &[T]) -> Vec<u8> {
    pack_dynvec(fields)
}

/// Encode an optional byte string: absent is empty, present is `pack_bytes`
pub fn pack_bytes_opt(data: Option<&[u8]>) -> Vec<u8> {
    data.map(pack_bytes).unwrap_or_default()
}
