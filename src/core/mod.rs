//! Core decode-and-compose pipeline.
//!
//! This module contains:
//! - The raw blendshape channel map and decoded frames
//! - Wire format decoding for legacy and current packets
//! - The unified expression store and the composer that fills it
//! - The update loop tying a packet source to the composer

pub mod blendshape;
pub mod composer;
pub mod expressions;
pub mod packet;
pub mod updater;

// Re-export commonly used types
pub use blendshape::{BlendShapeIndex, RawFrame, BLEND_SHAPE_COUNT};
pub use composer::{compose_eye, ExpressionComposer, MouthSmoothing, SMOOTHING_FACTOR};
pub use expressions::{
    create_shared_tracking_data, SharedTrackingData, TrackingSnapshot, UnifiedEyeData,
    UnifiedExpression, UnifiedSingleEyeData, UnifiedTrackingData, Vector2,
};
pub use packet::{decode, DecodeError, PacketFormat, PacketHeader, TRACKING_TYPE_FACE};
pub use updater::{Capabilities, ModuleState, UpdateOutcome, Updater, TIMEOUT_WARNING_THRESHOLD};
