//! Raw blendshape channels as they appear on the wire.
//!
//! The peripheral sends a fixed-length float array. The first 52 slots follow
//! the ARKit blendshape order; the remaining slots are reserved.

use serde::{Deserialize, Serialize};

/// Number of floats in the `blend_shape_weight` array of every packet body.
pub const BLEND_SHAPE_COUNT: usize = 72;

/// Offset of each raw channel within a decoded [`RawFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlendShapeIndex {
    EyeBlinkL = 0,
    EyeLookDownL,
    EyeLookInL,
    EyeLookOutL,
    EyeLookUpL,
    EyeSquintL,
    EyeWideL,
    EyeBlinkR,
    EyeLookDownR,
    EyeLookInR,
    EyeLookOutR,
    EyeLookUpR,
    EyeSquintR,
    EyeWideR,
    JawForward,
    JawLeft,
    JawRight,
    JawOpen,
    MouthClose,
    MouthFunnel,
    MouthPucker,
    MouthLeft,
    MouthRight,
    MouthSmileL,
    MouthSmileR,
    MouthFrownL,
    MouthFrownR,
    MouthDimpleL,
    MouthDimpleR,
    MouthStretchL,
    MouthStretchR,
    MouthRollLower,
    MouthRollUpper,
    MouthShrugLower,
    MouthShrugUpper,
    MouthPressL,
    MouthPressR,
    MouthLowerDownL,
    MouthLowerDownR,
    MouthUpperUpL,
    MouthUpperUpR,
    BrowDownL,
    BrowDownR,
    BrowInnerUp,
    BrowOuterUpL,
    BrowOuterUpR,
    CheekPuff,
    CheekSquintL,
    CheekSquintR,
    NoseSneerL,
    NoseSneerR,
    TongueOut,
}

impl BlendShapeIndex {
    /// Every raw channel, in wire order.
    pub const ALL: [BlendShapeIndex; 52] = [
        Self::EyeBlinkL,
        Self::EyeLookDownL,
        Self::EyeLookInL,
        Self::EyeLookOutL,
        Self::EyeLookUpL,
        Self::EyeSquintL,
        Self::EyeWideL,
        Self::EyeBlinkR,
        Self::EyeLookDownR,
        Self::EyeLookInR,
        Self::EyeLookOutR,
        Self::EyeLookUpR,
        Self::EyeSquintR,
        Self::EyeWideR,
        Self::JawForward,
        Self::JawLeft,
        Self::JawRight,
        Self::JawOpen,
        Self::MouthClose,
        Self::MouthFunnel,
        Self::MouthPucker,
        Self::MouthLeft,
        Self::MouthRight,
        Self::MouthSmileL,
        Self::MouthSmileR,
        Self::MouthFrownL,
        Self::MouthFrownR,
        Self::MouthDimpleL,
        Self::MouthDimpleR,
        Self::MouthStretchL,
        Self::MouthStretchR,
        Self::MouthRollLower,
        Self::MouthRollUpper,
        Self::MouthShrugLower,
        Self::MouthShrugUpper,
        Self::MouthPressL,
        Self::MouthPressR,
        Self::MouthLowerDownL,
        Self::MouthLowerDownR,
        Self::MouthUpperUpL,
        Self::MouthUpperUpR,
        Self::BrowDownL,
        Self::BrowDownR,
        Self::BrowInnerUp,
        Self::BrowOuterUpL,
        Self::BrowOuterUpR,
        Self::CheekPuff,
        Self::CheekSquintL,
        Self::CheekSquintR,
        Self::NoseSneerL,
        Self::NoseSneerR,
        Self::TongueOut,
    ];

    #[inline]
    pub fn as_index(self) -> usize {
        self as usize
    }

    /// ARKit-style channel name.
    pub fn name(self) -> &'static str {
        match self {
            Self::EyeBlinkL => "eyeBlinkLeft",
            Self::EyeLookDownL => "eyeLookDownLeft",
            Self::EyeLookInL => "eyeLookInLeft",
            Self::EyeLookOutL => "eyeLookOutLeft",
            Self::EyeLookUpL => "eyeLookUpLeft",
            Self::EyeSquintL => "eyeSquintLeft",
            Self::EyeWideL => "eyeWideLeft",
            Self::EyeBlinkR => "eyeBlinkRight",
            Self::EyeLookDownR => "eyeLookDownRight",
            Self::EyeLookInR => "eyeLookInRight",
            Self::EyeLookOutR => "eyeLookOutRight",
            Self::EyeLookUpR => "eyeLookUpRight",
            Self::EyeSquintR => "eyeSquintRight",
            Self::EyeWideR => "eyeWideRight",
            Self::JawForward => "jawForward",
            Self::JawLeft => "jawLeft",
            Self::JawRight => "jawRight",
            Self::JawOpen => "jawOpen",
            Self::MouthClose => "mouthClose",
            Self::MouthFunnel => "mouthFunnel",
            Self::MouthPucker => "mouthPucker",
            Self::MouthLeft => "mouthLeft",
            Self::MouthRight => "mouthRight",
            Self::MouthSmileL => "mouthSmileLeft",
            Self::MouthSmileR => "mouthSmileRight",
            Self::MouthFrownL => "mouthFrownLeft",
            Self::MouthFrownR => "mouthFrownRight",
            Self::MouthDimpleL => "mouthDimpleLeft",
            Self::MouthDimpleR => "mouthDimpleRight",
            Self::MouthStretchL => "mouthStretchLeft",
            Self::MouthStretchR => "mouthStretchRight",
            Self::MouthRollLower => "mouthRollLower",
            Self::MouthRollUpper => "mouthRollUpper",
            Self::MouthShrugLower => "mouthShrugLower",
            Self::MouthShrugUpper => "mouthShrugUpper",
            Self::MouthPressL => "mouthPressLeft",
            Self::MouthPressR => "mouthPressRight",
            Self::MouthLowerDownL => "mouthLowerDownLeft",
            Self::MouthLowerDownR => "mouthLowerDownRight",
            Self::MouthUpperUpL => "mouthUpperUpLeft",
            Self::MouthUpperUpR => "mouthUpperUpRight",
            Self::BrowDownL => "browDownLeft",
            Self::BrowDownR => "browDownRight",
            Self::BrowInnerUp => "browInnerUp",
            Self::BrowOuterUpL => "browOuterUpLeft",
            Self::BrowOuterUpR => "browOuterUpRight",
            Self::CheekPuff => "cheekPuff",
            Self::CheekSquintL => "cheekSquintLeft",
            Self::CheekSquintR => "cheekSquintRight",
            Self::NoseSneerL => "noseSneerLeft",
            Self::NoseSneerR => "noseSneerRight",
            Self::TongueOut => "tongueOut",
        }
    }
}

/// The raw channel weights decoded from one packet.
///
/// A frame is either empty (undersized packet or non-face tracking type) or
/// holds exactly [`BLEND_SHAPE_COUNT`] weights. Values are not range-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    weights: Vec<f32>,
}

impl RawFrame {
    pub fn new(weights: Vec<f32>) -> Self {
        Self { weights }
    }

    /// A frame with no channels.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Weight of a raw channel, or `0.0` when the frame does not carry it.
    #[inline]
    pub fn weight(&self, index: BlendShapeIndex) -> f32 {
        self.weights.get(index.as_index()).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}
