//! Embedding strategies.
//!
//! Two interchangeable strategies behind one call contract: the generated
//! strategy packs whole bytes into a purpose-built square image, the LSB
//! strategy hides bits inside an existing carrier. Selection is an explicit
//! enumerated choice, not virtual dispatch.

pub mod generated;
pub mod lsb;

use crate::error::Result;
use image::RgbaImage;
use serde::Serialize;

/// Where container bytes are embedded.
#[derive(Debug, Clone, Copy)]
pub enum EmbedTarget<'a> {
    /// A fresh square image sized to the container.
    Generated,
    /// An existing carrier image, written at the given bit depth.
    Carrier { image: &'a RgbaImage, depth: u8 },
}

/// Addressing mode observed in a decoded container, for metadata reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    Direct,
    Lsb { depth: u8 },
    Legacy,
}

/// Embed a full container byte sequence via the selected strategy.
pub fn embed(target: EmbedTarget<'_>, bytes: &[u8]) -> Result<RgbaImage> {
    match target {
        EmbedTarget::Generated => generated::embed(bytes),
        EmbedTarget::Carrier { image, depth } => lsb::embed(image, depth, bytes),
    }
}
