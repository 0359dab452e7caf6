//! Wire formats for PICO face-tracking packets.
//!
//! Two packed little-endian layouts exist:
//!
//! Legacy body (300 bytes):
//! - Bytes 0-7: Timestamp (i64)
//! - Bytes 8-11: Laughing flag (u32)
//! - Bytes 12-299: Blend shape weights (72 x f32)
//!
//! Current header (12 bytes):
//! - Bytes 0-1: Tracking type (u16)
//! - Byte 2: Corner IP
//! - Byte 3: Multi-pack flag
//! - Bytes 4-5: Port (u16)
//! - Bytes 6-7: Version (u16)
//! - Bytes 8-11: Body size (u32)
//!
//! Current body (296 bytes, directly after the header):
//! - Bytes 0-7: Timestamp (i64)
//! - Bytes 8-295: Blend shape weights (72 x f32)

use crate::core::blendshape::{RawFrame, BLEND_SHAPE_COUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEIGHTS_SIZE: usize = BLEND_SHAPE_COUNT * 4;

/// Size of the legacy body.
pub const LEGACY_BODY_SIZE: usize = LEGACY_WEIGHTS_OFFSET + WEIGHTS_SIZE;
const LEGACY_WEIGHTS_OFFSET: usize = 12;

/// Size of the current-format header.
pub const HEADER_SIZE: usize = 12;

/// Size of the current-format body.
pub const BODY_SIZE: usize = BODY_WEIGHTS_OFFSET + WEIGHTS_SIZE;
const BODY_WEIGHTS_OFFSET: usize = 8;

/// Tracking type carried by face packets. Any other type has no weights.
pub const TRACKING_TYPE_FACE: u16 = 2;

/// Which wire layout the peripheral speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketFormat {
    Legacy,
    #[default]
    Current,
}

impl PacketFormat {
    pub fn from_legacy_flag(is_legacy: bool) -> Self {
        if is_legacy {
            PacketFormat::Legacy
        } else {
            PacketFormat::Current
        }
    }
}

/// Errors from strict header parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Current-format packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketHeader {
    pub tracking_type: u16,
    pub corner_ip: u8,
    pub multi_pack: bool,
    pub port: u16,
    pub version: u16,
    pub body_size: u32,
}

impl PacketHeader {
    /// Parse a header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        Ok(PacketHeader {
            tracking_type: u16::from_le_bytes([buf[0], buf[1]]),
            corner_ip: buf[2],
            multi_pack: buf[3] != 0,
            port: u16::from_le_bytes([buf[4], buf[5]]),
            version: u16::from_le_bytes([buf[6], buf[7]]),
            body_size: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }

    /// Serialize the header into the first [`HEADER_SIZE`] bytes of `buf`.
    pub fn write(&self, buf: &mut [u8]) -> Result<(), DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: buf.len(),
            });
        }

        buf[0..2].copy_from_slice(&self.tracking_type.to_le_bytes());
        buf[2] = self.corner_ip;
        buf[3] = u8::from(self.multi_pack);
        buf[4..6].copy_from_slice(&self.port.to_le_bytes());
        buf[6..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.body_size.to_le_bytes());
        Ok(())
    }
}

/// Decode a packet into its raw blendshape weights.
///
/// Never fails: undersized buffers and non-face tracking types produce an
/// empty frame. A legacy buffer too short for the legacy body is retried as
/// a current-format packet.
pub fn decode(buf: &[u8], format: PacketFormat) -> RawFrame {
    if format == PacketFormat::Legacy && buf.len() >= LEGACY_BODY_SIZE {
        return RawFrame::new(read_weights(buf, LEGACY_WEIGHTS_OFFSET));
    }

    if buf.len() < HEADER_SIZE + BODY_SIZE {
        return RawFrame::empty();
    }

    match PacketHeader::parse(buf) {
        Ok(header) if header.tracking_type == TRACKING_TYPE_FACE => {
            RawFrame::new(read_weights(buf, HEADER_SIZE + BODY_WEIGHTS_OFFSET))
        }
        Ok(header) => {
            tracing::trace!(tracking_type = header.tracking_type, "ignoring non-face packet");
            RawFrame::empty()
        }
        Err(_) => RawFrame::empty(),
    }
}

/// Read the weight array starting at `offset`. Callers check the length.
fn read_weights(buf: &[u8], offset: usize) -> Vec<f32> {
    buf[offset..offset + WEIGHTS_SIZE]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Build a legacy packet around `weights`.
pub fn encode_legacy(timestamp: i64, weights: &[f32; BLEND_SHAPE_COUNT]) -> Vec<u8> {
    let mut buf = vec![0u8; LEGACY_BODY_SIZE];
    buf[0..8].copy_from_slice(&timestamp.to_le_bytes());
    write_weights(&mut buf[LEGACY_WEIGHTS_OFFSET..], weights);
    buf
}

/// Build a current-format packet with the given header and weights.
pub fn encode_current(
    header: &PacketHeader,
    timestamp: i64,
    weights: &[f32; BLEND_SHAPE_COUNT],
) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_SIZE + BODY_SIZE];
    // The buffer is sized for the header, so this cannot fail.
    let _ = header.write(&mut buf);
    buf[HEADER_SIZE..HEADER_SIZE + 8].copy_from_slice(&timestamp.to_le_bytes());
    write_weights(&mut buf[HEADER_SIZE + BODY_WEIGHTS_OFFSET..], weights);
    buf
}

fn write_weights(buf: &mut [u8], weights: &[f32; BLEND_SHAPE_COUNT]) {
    for (chunk, w) in buf.chunks_exact_mut(4).zip(weights.iter()) {
        chunk.copy_from_slice(&w.to_le_bytes());
    }
}
