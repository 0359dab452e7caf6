//! Integration tests for the receive-decode-compose pipeline

use parking_lot::Mutex;
use pico_face_bridge::core::packet::{encode_current, encode_legacy, PacketHeader, BODY_SIZE};
use pico_face_bridge::core::{
    create_shared_tracking_data, BlendShapeIndex, Capabilities, ModuleState, PacketFormat,
    SharedTrackingData, UnifiedExpression, UpdateOutcome, Updater, BLEND_SHAPE_COUNT,
    TIMEOUT_WARNING_THRESHOLD, TRACKING_TYPE_FACE,
};
use pico_face_bridge::{PacketSource, ReceiveError, WarningKey, WarningSink};
use std::collections::VecDeque;
use std::sync::Arc;

/// Replays queued packets (`None` is a timeout), then times out forever.
#[derive(Default)]
struct ReplaySource {
    queue: VecDeque<Option<Vec<u8>>>,
}

impl PacketSource for ReplaySource {
    fn recv(&mut self) -> Result<Vec<u8>, ReceiveError> {
        self.queue.pop_front().flatten().ok_or(ReceiveError::TimedOut)
    }
}

#[derive(Default)]
struct CollectingSink {
    warnings: Mutex<Vec<WarningKey>>,
}

impl WarningSink for CollectingSink {
    fn warn(&self, key: WarningKey, _detail: Option<&(dyn std::error::Error + 'static)>) {
        self.warnings.lock().push(key);
    }
}

fn pipeline(
    format: PacketFormat,
    packets: Vec<Option<Vec<u8>>>,
) -> (Updater<ReplaySource>, Arc<CollectingSink>, SharedTrackingData) {
    let sink = Arc::new(CollectingSink::default());
    let store = create_shared_tracking_data();
    let source = ReplaySource {
        queue: packets.into(),
    };
    let updater = Updater::new(
        Some(source),
        Some(sink.clone() as Arc<dyn WarningSink>),
        format,
        Capabilities::default(),
        store.clone(),
    );
    (updater, sink, store)
}

fn weights(values: &[(BlendShapeIndex, f32)]) -> [f32; BLEND_SHAPE_COUNT] {
    let mut weights = [0.0f32; BLEND_SHAPE_COUNT];
    for &(index, value) in values {
        weights[index.as_index()] = value;
    }
    weights
}

fn face_header() -> PacketHeader {
    PacketHeader {
        tracking_type: TRACKING_TYPE_FACE,
        corner_ip: 0,
        multi_pack: false,
        port: 29765,
        version: 1,
        body_size: BODY_SIZE as u32,
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_current_packet_updates_eyes_and_expressions() {
    let packet = encode_current(
        &face_header(),
        1_700_000_000,
        &weights(&[
            (BlendShapeIndex::EyeLookInL, 0.4),
            (BlendShapeIndex::EyeLookOutL, 0.1),
            (BlendShapeIndex::EyeLookInR, 0.4),
            (BlendShapeIndex::EyeLookOutR, 0.1),
            (BlendShapeIndex::TongueOut, 0.96),
        ]),
    );
    let (mut updater, sink, store) = pipeline(PacketFormat::Current, vec![Some(packet)]);

    assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);

    let data = store.read();
    assert!(approx(data.eye.right.gaze.x, -0.3));
    assert!(approx(data.eye.left.gaze.x, 0.3));
    assert_eq!(data.eye.left.openness, 1.0);
    assert_eq!(data.weight(UnifiedExpression::TongueOut), 0.96);
    assert!(sink.warnings.lock().is_empty());
}

#[test]
fn test_non_face_packet_is_ignored() {
    let header = PacketHeader {
        tracking_type: 1,
        ..face_header()
    };
    let packet = encode_current(&header, 0, &weights(&[(BlendShapeIndex::JawOpen, 0.8)]));
    let (mut updater, _, store) = pipeline(PacketFormat::Current, vec![Some(packet)]);

    assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::EmptyFrame);
    assert_eq!(store.read().weight(UnifiedExpression::JawOpen), 0.0);
}

#[test]
fn test_cheek_puff_follows_smoothed_mouth_pull() {
    // Two frames pulling left: smoothed mouthLeft goes 0.0 -> 0.5 -> 0.75.
    let pull_left = encode_legacy(
        0,
        &weights(&[
            (BlendShapeIndex::CheekPuff, 0.5),
            (BlendShapeIndex::MouthLeft, 1.0),
        ]),
    );
    let (mut updater, _, store) =
        pipeline(PacketFormat::Legacy, vec![Some(pull_left.clone()), Some(pull_left)]);

    assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);
    {
        let data = store.read();
        assert!(approx(data.weight(UnifiedExpression::CheekPuffLeft), 0.5));
        assert!(approx(data.weight(UnifiedExpression::CheekPuffRight), 1.0));
    }

    assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);
    let data = store.read();
    assert!(approx(data.weight(UnifiedExpression::CheekPuffRight), 1.25));
    assert!(approx(updater.composer().smoothing().last_mouth_left, 0.75));
}

#[test]
fn test_timeout_warning_every_601_timeouts() {
    let (mut updater, sink, _) = pipeline(PacketFormat::Current, Vec::new());

    for _ in 0..TIMEOUT_WARNING_THRESHOLD {
        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::TimedOut);
    }
    assert!(sink.warnings.lock().is_empty());

    updater.update(ModuleState::Active);
    assert_eq!(*sink.warnings.lock(), vec![WarningKey::UpdateTimeout]);

    for _ in 0..TIMEOUT_WARNING_THRESHOLD {
        updater.update(ModuleState::Active);
    }
    assert_eq!(sink.warnings.lock().len(), 1);

    updater.update(ModuleState::Active);
    assert_eq!(sink.warnings.lock().len(), 2);
    assert_eq!(updater.stats().stats().timeouts, 1202);
}

#[test]
fn test_decoding_resumes_after_timeouts() {
    let packet = encode_legacy(0, &weights(&[(BlendShapeIndex::MouthPucker, 0.4)]));
    let (mut updater, sink, store) = pipeline(
        PacketFormat::Legacy,
        vec![None, None, None, Some(packet)],
    );

    for _ in 0..3 {
        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::TimedOut);
    }
    assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);
    assert_eq!(store.read().weight(UnifiedExpression::LipPuckerUpperLeft), 0.4);

    // The timeout count is not reset by a successful receive.
    assert_eq!(updater.pending_timeouts(), 3);
    assert!(sink.warnings.lock().is_empty());
}

#[test]
fn test_independent_pipelines_do_not_share_state() {
    let packet = encode_legacy(0, &weights(&[(BlendShapeIndex::JawOpen, 0.4)]));
    let (mut first, _, first_store) = pipeline(PacketFormat::Legacy, vec![Some(packet)]);
    let (mut second, _, second_store) = pipeline(PacketFormat::Legacy, Vec::new());

    first.update(ModuleState::Active);
    second.update(ModuleState::Active);

    assert!(approx(first_store.read().weight(UnifiedExpression::JawOpen), 0.5));
    assert_eq!(second_store.read().weight(UnifiedExpression::JawOpen), 0.0);
    assert_ne!(first.instance_id(), second.instance_id());
}
