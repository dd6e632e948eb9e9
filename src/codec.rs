//! Container codec entry points.
//!
//! Encoding: hash the plaintext, optionally seal it in the crypto envelope,
//! build the header from the post-encryption size, then hand header and
//! payload to an embedding strategy. Decoding mirrors this, with the
//! content hash of the plaintext as the final, authoritative check.

use crate::config::MAX_PAYLOAD_BYTES;
use crate::crypto;
use crate::error::{Error, Result};
use crate::format::{Encoding, Header, LegacyHeader, Signature};
use crate::pixel::{ByteSource, DirectReader, LsbReader};
use crate::strategy::{self, EmbedTarget, EncodingKind};
use image::RgbaImage;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Result of decoding a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub filename: String,
    pub data: Vec<u8>,
    /// SHA-256 of the plaintext payload. Verified against the header for
    /// current-format containers; recomputed (advisory) for legacy ones.
    pub content_hash: [u8; 32],
}

/// Header fields exposed without extracting the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub filename: String,
    pub payload_len: u64,
    pub encrypted: bool,
    pub encoding: EncodingKind,
}

/// Encode a payload into a freshly generated square image.
pub fn encode(payload: &[u8], filename: &str, password: Option<&str>) -> Result<RgbaImage> {
    let bytes = build_container(payload, filename, password, Encoding::Direct)?;
    strategy::embed(EmbedTarget::Generated, &bytes)
}

/// Encode a payload into an existing carrier image at the given bit depth.
pub fn encode_into_carrier(
    payload: &[u8],
    filename: &str,
    carrier: &RgbaImage,
    bit_depth: u8,
    password: Option<&str>,
) -> Result<RgbaImage> {
    let bytes = build_container(payload, filename, password, Encoding::Lsb)?;
    strategy::embed(
        EmbedTarget::Carrier {
            image: carrier,
            depth: bit_depth,
        },
        &bytes,
    )
}

/// Build the flat container byte sequence: header followed by payload.
pub(crate) fn build_container(
    payload: &[u8],
    filename: &str,
    password: Option<&str>,
    encoding: Encoding,
) -> Result<Vec<u8>> {
    if payload.len() as u64 > MAX_PAYLOAD_BYTES {
        return Err(Error::InvalidArgument(format!(
            "payload is {} bytes, maximum is {}",
            payload.len(),
            MAX_PAYLOAD_BYTES
        )));
    }

    let content_hash: [u8; 32] = Sha256::digest(payload).into();
    let body = match password {
        Some(pw) => crypto::seal(payload, pw),
        None => payload.to_vec(),
    };

    let header = Header::new(
        encoding,
        body.len() as u64,
        filename,
        password.is_some(),
        content_hash,
    )?;

    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode a container from a pixel grid.
pub fn decode(image: &RgbaImage, password: Option<&str>) -> Result<DecodedPayload> {
    let probe = probe(image)?;
    match probe.signature {
        Signature::Legacy => decode_legacy(probe.source.as_ref()),
        _ => {
            let header = Header::parse(probe.source.as_ref())?;
            let body = read_payload(probe.source.as_ref(), header.len(), header.payload_len)?;
            finish_decode(&header, body, password)
        }
    }
}

/// Parse header fields without extracting or verifying the payload.
pub fn peek_metadata(image: &RgbaImage) -> Result<ContainerInfo> {
    let probe = probe(image)?;
    match probe.signature {
        Signature::Legacy => {
            let header = LegacyHeader::parse(probe.source.as_ref())?;
            check_payload_bounds(
                probe.source.as_ref(),
                header.data_offset(),
                header.payload_len,
            )?;
            Ok(ContainerInfo {
                filename: header.filename,
                payload_len: header.payload_len,
                encrypted: false,
                encoding: EncodingKind::Legacy,
            })
        }
        _ => {
            let header = Header::parse(probe.source.as_ref())?;
            check_payload_bounds(probe.source.as_ref(), header.len(), header.payload_len)?;
            let encoding = match header.encoding {
                Encoding::Direct => EncodingKind::Direct,
                Encoding::Lsb => EncodingKind::Lsb { depth: probe.depth },
            };
            Ok(ContainerInfo {
                filename: header.filename,
                payload_len: header.payload_len,
                encrypted: header.encrypted,
                encoding,
            })
        }
    }
}

/// Decrypt (if flagged) and verify a current-format payload.
pub(crate) fn finish_decode(
    header: &Header,
    body: Vec<u8>,
    password: Option<&str>,
) -> Result<DecodedPayload> {
    let data = if header.encrypted {
        let password = password.ok_or_else(|| {
            Error::InvalidArgument("container is encrypted, a password is required".to_string())
        })?;
        crypto::open(&body, password)?
    } else {
        body
    };

    let actual: [u8; 32] = Sha256::digest(&data).into();
    if actual != header.content_hash {
        return Err(Error::HashMismatch);
    }

    Ok(DecodedPayload {
        filename: header.filename.clone(),
        data,
        content_hash: actual,
    })
}

fn decode_legacy(source: &dyn ByteSource) -> Result<DecodedPayload> {
    let header = LegacyHeader::parse(source)?;
    let data = read_payload(source, header.data_offset(), header.payload_len)?;
    let content_hash: [u8; 32] = Sha256::digest(&data).into();

    Ok(DecodedPayload {
        filename: header.filename,
        data,
        content_hash,
    })
}

/// Outcome of signature probing: the matching byte view plus what it is.
pub(crate) struct ProbedContainer<'a> {
    pub source: Box<dyn ByteSource + 'a>,
    pub signature: Signature,
    /// LSB bit depth; 0 for direct-mode containers.
    pub depth: u8,
}

/// Identify the container format and addressing mode of a pixel grid.
///
/// Direct addressing is probed first, then LSB at each depth. Only the two
/// signature bytes are read per probe.
pub(crate) fn probe(image: &RgbaImage) -> Result<ProbedContainer<'_>> {
    let direct = DirectReader::new(image);
    let mut direct_sig = [0u8; 2];
    if direct.capacity() >= 2 {
        direct.read_at(0, &mut direct_sig)?;
        match Signature::classify(direct_sig) {
            Some(sig @ (Signature::DirectPlain | Signature::DirectEncrypted)) => {
                return Ok(ProbedContainer {
                    source: Box::new(direct),
                    signature: sig,
                    depth: 0,
                });
            }
            Some(Signature::Legacy) => {
                return Ok(ProbedContainer {
                    source: Box::new(direct),
                    signature: Signature::Legacy,
                    depth: 0,
                });
            }
            _ => {}
        }
    }

    for depth in 1..=8u8 {
        let reader = LsbReader::new(image, depth);
        if reader.capacity() < 2 {
            continue;
        }
        let mut sig = [0u8; 2];
        reader.read_at(0, &mut sig)?;
        if Signature::classify(sig) == Some(Signature::Lsb) {
            return Ok(ProbedContainer {
                source: Box::new(reader),
                signature: Signature::Lsb,
                depth,
            });
        }
    }

    Err(Error::UnsupportedFormat {
        signature: direct_sig,
    })
}

fn check_payload_bounds(source: &dyn ByteSource, offset: u64, payload_len: u64) -> Result<()> {
    let needed = offset.saturating_add(payload_len);
    let available = source.capacity();
    if needed > available {
        return Err(Error::TruncatedContainer { needed, available });
    }
    Ok(())
}

/// Bound-check then read the payload region. The check runs before the
/// allocation so a corrupt size field cannot drive a huge `Vec`.
pub(crate) fn read_payload(
    source: &dyn ByteSource,
    offset: u64,
    payload_len: u64,
) -> Result<Vec<u8>> {
    check_payload_bounds(source, offset, payload_len)?;
    let mut body = vec![0u8; payload_len as usize];
    source.read_at(offset, &mut body)?;
    Ok(body)
}
