//! Conversion of raw blendshape frames into unified expressions.
//!
//! Most output channels are straight copies. The rest correct for the
//! peripheral's limited native range (rescales), suppress false positives
//! (gates), or combine channels (cheek puff, smile symmetrization, funnel).
//! All corrections operate on unclamped values.

use crate::core::blendshape::{BlendShapeIndex as B, RawFrame};
use crate::core::expressions::{UnifiedExpression as U, UnifiedTrackingData};
use serde::{Deserialize, Serialize};

/// Weight given to each new sample by the mouth-pull smoother.
pub const SMOOTHING_FACTOR: f32 = 0.5;

/// Raw cheek puff above which mouth pull is blended into the puff.
const CHEEK_PUFF_THRESHOLD: f32 = 0.1;
/// Minimum smoothed mouth-pull difference for one side to dominate.
const MOUTH_PULL_DIFF_THRESHOLD: f32 = 0.1;
/// Nose sneer below this is treated as noise from a half-open mouth.
const NOSE_SNEER_GATE: f32 = 0.6;
/// Mouth press at or above this suppresses mouth-upper-up.
const MOUTH_UPPER_UP_PRESS_GATE: f32 = 0.1;
/// Jaw open above this halves the frown.
const FROWN_JAW_OPEN_GATE: f32 = 0.1;
/// Lower-lip roll above this boosts the frown.
const FROWN_ROLL_LOWER_GATE: f32 = 0.2;
/// Lower-lip roll at or above this suppresses smile corners.
const SMILE_ROLL_LOWER_GATE: f32 = 0.2;
/// Pucker above this (with little press) is reported as funnel.
const FUNNEL_PUCKER_GATE: f32 = 0.3;
/// Mouth press at or above this prevents pucker from becoming funnel.
const FUNNEL_PRESS_GATE: f32 = 0.2;
/// Tongue out is only reported above this.
const TONGUE_OUT_GATE: f32 = 0.95;

/// Exponentially smoothed mouth-pull values, carried between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouthSmoothing {
    pub last_mouth_left: f32,
    pub last_mouth_right: f32,
}

impl MouthSmoothing {
    /// Feed one frame's raw mouth-left/right and return the smoothed pair.
    pub fn update(&mut self, mouth_left: f32, mouth_right: f32) -> (f32, f32) {
        (
            smooth(mouth_left, &mut self.last_mouth_left),
            smooth(mouth_right, &mut self.last_mouth_right),
        )
    }
}

/// One step of exponential smoothing: `last += (new - last) * factor`.
#[inline]
pub fn smooth(new_value: f32, last_value: &mut f32) -> f32 {
    *last_value += (new_value - *last_value) * SMOOTHING_FACTOR;
    *last_value
}

/// Writes eye data, brow and eye-region expressions.
pub fn compose_eye(frame: &RawFrame, data: &mut UnifiedTrackingData) {
    let w = |i: B| frame.weight(i);

    let left = &mut data.eye.left;
    left.openness = 1.0 - w(B::EyeBlinkL);
    left.gaze.x = w(B::EyeLookInL) - w(B::EyeLookOutL);
    left.gaze.y = w(B::EyeLookUpL) - w(B::EyeLookDownL);

    let right = &mut data.eye.right;
    right.openness = 1.0 - w(B::EyeBlinkR);
    right.gaze.x = w(B::EyeLookOutR) - w(B::EyeLookInR);
    right.gaze.y = w(B::EyeLookUpR) - w(B::EyeLookDownR);

    let mut copy = |from: B, to: U| data.set_weight(to, frame.weight(from));

    // Brow
    copy(B::BrowInnerUp, U::BrowInnerUpLeft);
    copy(B::BrowInnerUp, U::BrowInnerUpRight);
    copy(B::BrowOuterUpL, U::BrowOuterUpLeft);
    copy(B::BrowOuterUpR, U::BrowOuterUpRight);
    copy(B::BrowDownL, U::BrowLowererLeft);
    copy(B::BrowDownL, U::BrowPinchLeft);
    copy(B::BrowDownR, U::BrowLowererRight);
    copy(B::BrowDownR, U::BrowPinchRight);

    // Eye
    copy(B::EyeSquintL, U::EyeSquintLeft);
    copy(B::EyeSquintR, U::EyeSquintRight);
    // Native range tops out around 0.5; no upper clamp.
    data.set_weight(U::EyeWideLeft, w(B::EyeWideL) / 0.5);
    data.set_weight(U::EyeWideRight, w(B::EyeWideR) / 0.5);
}

/// Stateful expression composer. Owns the only inter-frame memory.
#[derive(Debug, Clone, Default)]
pub struct ExpressionComposer {
    smoothing: MouthSmoothing,
}

impl ExpressionComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from previously captured smoothing state.
    pub fn with_smoothing(smoothing: MouthSmoothing) -> Self {
        Self { smoothing }
    }

    pub fn smoothing(&self) -> MouthSmoothing {
        self.smoothing
    }

    pub fn compose_eye(&self, frame: &RawFrame, data: &mut UnifiedTrackingData) {
        compose_eye(frame, data);
    }

    /// Writes jaw, cheek, nose, mouth, lip and tongue expressions.
    ///
    /// Advances the mouth-pull smoothing by one step.
    pub fn compose_expression(&mut self, frame: &RawFrame, data: &mut UnifiedTrackingData) {
        let w = |i: B| frame.weight(i);

        compose_jaw(frame, data);
        self.compose_cheek(frame, data);
        compose_nose(frame, data);

        // Mouth upper up is suppressed while the lips are pressed.
        let upper_up = |up: B, press: B| {
            if w(press) < MOUTH_UPPER_UP_PRESS_GATE {
                w(up) / 0.8
            } else {
                0.0
            }
        };
        data.set_weight(U::MouthUpperUpLeft, upper_up(B::MouthUpperUpL, B::MouthPressL));
        data.set_weight(U::MouthUpperUpRight, upper_up(B::MouthUpperUpR, B::MouthPressR));
        data.set_weight(U::MouthLowerDownLeft, w(B::MouthLowerDownL));
        data.set_weight(U::MouthLowerDownRight, w(B::MouthLowerDownR));

        let jaw_open = w(B::JawOpen);
        let roll_lower = w(B::MouthRollLower);
        let frown = |raw: f32| {
            if jaw_open > FROWN_JAW_OPEN_GATE {
                raw / 2.0
            } else if roll_lower > FROWN_ROLL_LOWER_GATE {
                raw * 2.5 + roll_lower
            } else {
                raw
            }
        };
        data.set_weight(U::MouthFrownLeft, frown(w(B::MouthFrownL)));
        data.set_weight(U::MouthFrownRight, frown(w(B::MouthFrownR)));

        data.set_weight(U::MouthDimpleLeft, w(B::MouthDimpleL));
        data.set_weight(U::MouthDimpleRight, w(B::MouthDimpleR));

        let mouth_left = w(B::MouthLeft) / 0.5;
        let mouth_right = w(B::MouthRight) / 0.5;
        data.set_weight(U::MouthUpperLeft, mouth_left);
        data.set_weight(U::MouthLowerLeft, mouth_left);
        data.set_weight(U::MouthUpperRight, mouth_right);
        data.set_weight(U::MouthLowerRight, mouth_right);

        data.set_weight(U::MouthPressLeft, w(B::MouthPressL));
        data.set_weight(U::MouthPressRight, w(B::MouthPressR));
        data.set_weight(U::MouthRaiserLower, w(B::MouthShrugLower));
        data.set_weight(U::MouthRaiserUpper, w(B::MouthShrugUpper));

        // Smile rarely exceeds 0.5 and leans to one side, so rescale and
        // take the stronger side for both corners.
        let smile = (w(B::MouthSmileL) / 0.5).max(w(B::MouthSmileR) / 0.5);
        let (pull, slant) = if roll_lower < SMILE_ROLL_LOWER_GATE {
            (smile, smile - roll_lower)
        } else {
            (0.0, 0.0)
        };
        data.set_weight(U::MouthCornerPullLeft, pull);
        data.set_weight(U::MouthCornerSlantLeft, slant);
        data.set_weight(U::MouthCornerPullRight, pull);
        data.set_weight(U::MouthCornerSlantRight, slant);

        data.set_weight(U::MouthStretchLeft, w(B::MouthStretchL));
        data.set_weight(U::MouthStretchRight, w(B::MouthStretchR));

        compose_lip(frame, data);

        let tongue = w(B::TongueOut);
        data.set_weight(
            U::TongueOut,
            if tongue > TONGUE_OUT_GATE { tongue } else { 0.0 },
        );
    }

    fn compose_cheek(&mut self, frame: &RawFrame, data: &mut UnifiedTrackingData) {
        data.set_weight(U::CheekSquintLeft, frame.weight(B::CheekSquintL));
        data.set_weight(U::CheekSquintRight, frame.weight(B::CheekSquintR));

        let (mouth_left, mouth_right) = self
            .smoothing
            .update(frame.weight(B::MouthLeft), frame.weight(B::MouthRight));
        let puff = frame.weight(B::CheekPuff);

        let (left, right) = if puff > CHEEK_PUFF_THRESHOLD {
            if mouth_left > mouth_right + MOUTH_PULL_DIFF_THRESHOLD {
                (puff, puff + mouth_left)
            } else if mouth_right > mouth_left + MOUTH_PULL_DIFF_THRESHOLD {
                (puff + mouth_right, puff)
            } else {
                (puff, puff)
            }
        } else {
            (puff, puff)
        };

        data.set_weight(U::CheekPuffLeft, left);
        data.set_weight(U::CheekPuffRight, right);
    }
}

fn compose_jaw(frame: &RawFrame, data: &mut UnifiedTrackingData) {
    data.set_weight(U::JawOpen, frame.weight(B::JawOpen) / 0.8);
    data.set_weight(U::JawLeft, frame.weight(B::JawLeft) / 0.5);
    data.set_weight(U::JawRight, frame.weight(B::JawRight) / 0.5);
    data.set_weight(U::JawForward, frame.weight(B::JawForward));
    data.set_weight(U::MouthClosed, frame.weight(B::MouthClose));
}

fn compose_nose(frame: &RawFrame, data: &mut UnifiedTrackingData) {
    let gate = |raw: f32| if raw > NOSE_SNEER_GATE { raw } else { 0.0 };
    data.set_weight(U::NoseSneerLeft, gate(frame.weight(B::NoseSneerL)));
    data.set_weight(U::NoseSneerRight, gate(frame.weight(B::NoseSneerR)));
}

fn compose_lip(frame: &RawFrame, data: &mut UnifiedTrackingData) {
    let pucker = frame.weight(B::MouthPucker);
    let funnel = frame.weight(B::MouthFunnel);

    let funnel_side = |press: B| {
        if pucker > FUNNEL_PUCKER_GATE && frame.weight(press) < FUNNEL_PRESS_GATE {
            pucker
        } else {
            funnel
        }
    };
    let funnel_left = funnel_side(B::MouthPressL);
    let funnel_right = funnel_side(B::MouthPressR);

    data.set_weight(U::LipFunnelUpperLeft, funnel_left);
    data.set_weight(U::LipFunnelUpperRight, funnel_right);
    data.set_weight(U::LipFunnelLowerLeft, funnel_left);
    data.set_weight(U::LipFunnelLowerRight, funnel_right);

    for to in [
        U::LipPuckerUpperLeft,
        U::LipPuckerUpperRight,
        U::LipPuckerLowerLeft,
        U::LipPuckerLowerRight,
    ] {
        data.set_weight(to, pucker);
    }

    let roll_upper = frame.weight(B::MouthRollUpper);
    let roll_lower = frame.weight(B::MouthRollLower);
    data.set_weight(U::LipSuckUpperLeft, roll_upper);
    data.set_weight(U::LipSuckUpperRight, roll_upper);
    data.set_weight(U::LipSuckLowerLeft, roll_lower);
    data.set_weight(U::LipSuckLowerRight, roll_lower);
}
