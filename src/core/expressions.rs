//! Unified expression output channels and the store they are written into.
//!
//! The store is owned by whoever consumes the weights (an avatar pipeline, the
//! CLI dump, a test). The pipeline only receives a [`SharedTrackingData`]
//! handle and writes into it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

macro_rules! unified_expressions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A named output slot in the unified expression store.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum UnifiedExpression {
            $($variant),+
        }

        impl UnifiedExpression {
            /// Every output slot, in store order.
            pub const ALL: &'static [UnifiedExpression] = &[$(Self::$variant),+];

            /// Number of slots in the store.
            pub const COUNT: usize = Self::ALL.len();

            #[inline]
            pub fn as_index(self) -> usize {
                self as usize
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

unified_expressions! {
    // Eye
    EyeSquintLeft => "EyeSquintLeft",
    EyeSquintRight => "EyeSquintRight",
    EyeWideLeft => "EyeWideLeft",
    EyeWideRight => "EyeWideRight",
    // Brow
    BrowInnerUpLeft => "BrowInnerUpLeft",
    BrowInnerUpRight => "BrowInnerUpRight",
    BrowOuterUpLeft => "BrowOuterUpLeft",
    BrowOuterUpRight => "BrowOuterUpRight",
    BrowLowererLeft => "BrowLowererLeft",
    BrowLowererRight => "BrowLowererRight",
    BrowPinchLeft => "BrowPinchLeft",
    BrowPinchRight => "BrowPinchRight",
    // Jaw
    JawOpen => "JawOpen",
    JawLeft => "JawLeft",
    JawRight => "JawRight",
    JawForward => "JawForward",
    MouthClosed => "MouthClosed",
    // Cheek
    CheekSquintLeft => "CheekSquintLeft",
    CheekSquintRight => "CheekSquintRight",
    CheekPuffLeft => "CheekPuffLeft",
    CheekPuffRight => "CheekPuffRight",
    // Nose
    NoseSneerLeft => "NoseSneerLeft",
    NoseSneerRight => "NoseSneerRight",
    // Mouth
    MouthUpperUpLeft => "MouthUpperUpLeft",
    MouthUpperUpRight => "MouthUpperUpRight",
    MouthLowerDownLeft => "MouthLowerDownLeft",
    MouthLowerDownRight => "MouthLowerDownRight",
    MouthFrownLeft => "MouthFrownLeft",
    MouthFrownRight => "MouthFrownRight",
    MouthDimpleLeft => "MouthDimpleLeft",
    MouthDimpleRight => "MouthDimpleRight",
    MouthUpperLeft => "MouthUpperLeft",
    MouthUpperRight => "MouthUpperRight",
    MouthLowerLeft => "MouthLowerLeft",
    MouthLowerRight => "MouthLowerRight",
    MouthPressLeft => "MouthPressLeft",
    MouthPressRight => "MouthPressRight",
    MouthRaiserLower => "MouthRaiserLower",
    MouthRaiserUpper => "MouthRaiserUpper",
    MouthCornerPullLeft => "MouthCornerPullLeft",
    MouthCornerPullRight => "MouthCornerPullRight",
    MouthCornerSlantLeft => "MouthCornerSlantLeft",
    MouthCornerSlantRight => "MouthCornerSlantRight",
    MouthStretchLeft => "MouthStretchLeft",
    MouthStretchRight => "MouthStretchRight",
    // Lip
    LipFunnelUpperLeft => "LipFunnelUpperLeft",
    LipFunnelUpperRight => "LipFunnelUpperRight",
    LipFunnelLowerLeft => "LipFunnelLowerLeft",
    LipFunnelLowerRight => "LipFunnelLowerRight",
    LipPuckerUpperLeft => "LipPuckerUpperLeft",
    LipPuckerUpperRight => "LipPuckerUpperRight",
    LipPuckerLowerLeft => "LipPuckerLowerLeft",
    LipPuckerLowerRight => "LipPuckerLowerRight",
    LipSuckUpperLeft => "LipSuckUpperLeft",
    LipSuckUpperRight => "LipSuckUpperRight",
    LipSuckLowerLeft => "LipSuckLowerLeft",
    LipSuckLowerRight => "LipSuckLowerRight",
    // Tongue
    TongueOut => "TongueOut",
}

/// A 2D gaze direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// Openness and gaze for one eye.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSingleEyeData {
    /// `1 - blink`; negative when the peripheral reports blink above 1
    pub openness: f32,
    pub gaze: Vector2,
}

/// Both eyes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedEyeData {
    pub left: UnifiedSingleEyeData,
    pub right: UnifiedSingleEyeData,
}

/// The output store: one weight per [`UnifiedExpression`] plus eye data.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedTrackingData {
    shapes: Vec<f32>,
    pub eye: UnifiedEyeData,
}

impl Default for UnifiedTrackingData {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedTrackingData {
    /// Create a store with every weight at zero.
    pub fn new() -> Self {
        Self {
            shapes: vec![0.0; UnifiedExpression::COUNT],
            eye: UnifiedEyeData::default(),
        }
    }

    #[inline]
    pub fn weight(&self, expression: UnifiedExpression) -> f32 {
        self.shapes[expression.as_index()]
    }

    /// Last write wins.
    #[inline]
    pub fn set_weight(&mut self, expression: UnifiedExpression, weight: f32) {
        self.shapes[expression.as_index()] = weight;
    }

    /// Copy the current contents into a serializable snapshot.
    pub fn snapshot(&self) -> TrackingSnapshot {
        TrackingSnapshot {
            eye: self.eye,
            shapes: UnifiedExpression::ALL
                .iter()
                .map(|&e| (e.name().to_string(), self.weight(e)))
                .collect(),
        }
    }
}

/// Serializable view of a [`UnifiedTrackingData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub eye: UnifiedEyeData,
    pub shapes: BTreeMap<String, f32>,
}

/// Output store shared between the pipeline and its readers.
pub type SharedTrackingData = Arc<RwLock<UnifiedTrackingData>>;

/// Create a new, zeroed shared store.
pub fn create_shared_tracking_data() -> SharedTrackingData {
    Arc::new(RwLock::new(UnifiedTrackingData::new()))
}
