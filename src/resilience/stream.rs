//! Chunked streaming processors.
//!
//! Streaming differs from the in-memory path in how the payload moves: in
//! chunks, with the deadline and the caller's cancellation token checked
//! between chunks. Plaintext payloads from rewindable sources are written
//! straight into the pixel grid in two passes (hash, then write) without
//! ever materializing the full container buffer; everything else is
//! accumulated chunk by chunk under the same checks.

use crate::codec;
use crate::config::MAX_PAYLOAD_BYTES;
use crate::error::{Error, Result};
use crate::format::{Encoding, Header, LegacyHeader, Signature};
use crate::pixel::{ByteSource, DirectWriter, LsbWriter};
use crate::resilience::source::PayloadSource;
use crate::resilience::{CancelToken, Deadline};
use crate::strategy::{self, generated, EmbedTarget};
use image::RgbaImage;
use sha2::{Digest, Sha256};

/// Streaming encode under a deadline and cancellation token.
pub fn encode(
    source: &mut dyn PayloadSource,
    filename: &str,
    target: EmbedTarget<'_>,
    password: Option<&str>,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<RgbaImage> {
    if password.is_none() && source.supports_rewind() {
        encode_two_pass(source, filename, target, deadline, cancel, chunk_size)
    } else {
        let payload = drain(source, deadline, cancel, chunk_size)?;
        let encoding = match target {
            EmbedTarget::Generated => Encoding::Direct,
            EmbedTarget::Carrier { .. } => Encoding::Lsb,
        };
        let bytes = codec::build_container(&payload, filename, password, encoding)?;
        deadline.check()?;
        strategy::embed(target, &bytes)
    }
}

/// Hash pass, rewind, then write pixels chunk by chunk.
fn encode_two_pass(
    source: &mut dyn PayloadSource,
    filename: &str,
    target: EmbedTarget<'_>,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<RgbaImage> {
    let mut hasher = Sha256::new();
    let mut payload_len = 0u64;
    let mut chunk = vec![0u8; chunk_size];
    loop {
        cancel.check()?;
        deadline.check()?;
        let n = source.read_chunk(&mut chunk)?;
        if n == 0 {
            break;
        }
        payload_len += n as u64;
        if payload_len > MAX_PAYLOAD_BYTES {
            return Err(Error::InvalidArgument(format!(
                "payload exceeds the {MAX_PAYLOAD_BYTES} byte maximum"
            )));
        }
        hasher.update(&chunk[..n]);
    }
    let content_hash: [u8; 32] = hasher.finalize().into();
    source.rewind()?;

    let encoding = match target {
        EmbedTarget::Generated => Encoding::Direct,
        EmbedTarget::Carrier { .. } => Encoding::Lsb,
    };
    let header = Header::new(encoding, payload_len, filename, false, content_hash)?;
    let header_bytes = header.to_bytes();
    let total = header.len() + payload_len;

    match target {
        EmbedTarget::Generated => {
            let mut image = generated::carrier_for(total);
            let mut writer = DirectWriter::new(&mut image);
            writer.write_at(0, &header_bytes)?;
            write_payload_chunks(
                source,
                |offset, bytes| writer.write_at(offset, bytes),
                header.len(),
                deadline,
                cancel,
                chunk_size,
            )?;
            Ok(image)
        }
        EmbedTarget::Carrier { image, depth } => {
            if !(1..=8).contains(&depth) {
                return Err(Error::InvalidArgument(format!(
                    "bit depth {depth} is outside [1, 8]"
                )));
            }
            let available =
                crate::pixel::capacity::lsb_capacity_bytes(image.width(), image.height(), depth);
            if total > available {
                return Err(Error::InsufficientCapacity {
                    required: total,
                    available,
                });
            }
            let mut output = image.clone();
            let mut writer = LsbWriter::new(&mut output, depth);
            writer.write_at(0, &header_bytes)?;
            write_payload_chunks(
                source,
                |offset, bytes| writer.write_at(offset, bytes),
                header.len(),
                deadline,
                cancel,
                chunk_size,
            )?;
            Ok(output)
        }
    }
}

fn write_payload_chunks(
    source: &mut dyn PayloadSource,
    mut write_at: impl FnMut(u64, &[u8]) -> Result<()>,
    start: u64,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<()> {
    let mut chunk = vec![0u8; chunk_size];
    let mut offset = start;
    loop {
        cancel.check()?;
        deadline.check()?;
        let n = source.read_chunk(&mut chunk)?;
        if n == 0 {
            return Ok(());
        }
        write_at(offset, &chunk[..n])?;
        offset += n as u64;
    }
}

/// Read a whole source in chunks under deadline and cancellation checks.
pub fn drain(
    source: &mut dyn PayloadSource,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let mut payload = match source.len_hint() {
        Some(len) if len <= MAX_PAYLOAD_BYTES => Vec::with_capacity(len as usize),
        _ => Vec::new(),
    };
    let mut chunk = vec![0u8; chunk_size];
    loop {
        cancel.check()?;
        deadline.check()?;
        let n = source.read_chunk(&mut chunk)?;
        if n == 0 {
            return Ok(payload);
        }
        payload.extend_from_slice(&chunk[..n]);
        if payload.len() as u64 > MAX_PAYLOAD_BYTES {
            return Err(Error::InvalidArgument(format!(
                "payload exceeds the {MAX_PAYLOAD_BYTES} byte maximum"
            )));
        }
    }
}

/// Streaming decode: chunked payload extraction under the same checks.
pub fn decode(
    image: &RgbaImage,
    password: Option<&str>,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<codec::DecodedPayload> {
    let probe = codec::probe(image)?;

    let (offset, payload_len, header) = match probe.signature {
        Signature::Legacy => {
            let legacy = LegacyHeader::parse(probe.source.as_ref())?;
            let data = read_payload_chunks(
                probe.source.as_ref(),
                legacy.data_offset(),
                legacy.payload_len,
                deadline,
                cancel,
                chunk_size,
            )?;
            let content_hash: [u8; 32] = Sha256::digest(&data).into();
            return Ok(codec::DecodedPayload {
                filename: legacy.filename,
                data,
                content_hash,
            });
        }
        _ => {
            let header = Header::parse(probe.source.as_ref())?;
            (header.len(), header.payload_len, header)
        }
    };

    let body = read_payload_chunks(
        probe.source.as_ref(),
        offset,
        payload_len,
        deadline,
        cancel,
        chunk_size,
    )?;
    codec::finish_decode(&header, body, password)
}

fn read_payload_chunks(
    source: &dyn ByteSource,
    offset: u64,
    payload_len: u64,
    deadline: &Deadline,
    cancel: &CancelToken,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let needed = offset.saturating_add(payload_len);
    let available = source.capacity();
    if needed > available {
        return Err(Error::TruncatedContainer { needed, available });
    }

    let mut body = vec![0u8; payload_len as usize];
    let mut read = 0usize;
    while read < body.len() {
        cancel.check()?;
        deadline.check()?;
        let end = (read + chunk_size.max(1)).min(body.len());
        source.read_at(offset + read as u64, &mut body[read..end])?;
        read = end;
    }
    Ok(body)
}
