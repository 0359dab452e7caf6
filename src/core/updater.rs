//! One receive-decode-compose cycle per call.
//!
//! [`Updater::update`] is driven by an external scheduler. Each call blocks
//! for at most one receive, then composes synchronously into the shared
//! store. Nothing is returned as an error: timeouts are counted and
//! periodically reported, other failures are reported and swallowed.

use crate::core::composer::ExpressionComposer;
use crate::core::expressions::SharedTrackingData;
use crate::core::packet::{decode, PacketFormat};
use crate::logging::{WarningKey, WarningSink};
use crate::stats::{create_shared_stats, SharedPipelineStats};
use crate::transport::{PacketSource, ReceiveError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Timeouts tolerated before a warning is emitted and the count restarts.
pub const TIMEOUT_WARNING_THRESHOLD: u32 = 600;

/// Lifecycle state reported by the host. Only `Active` decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    Uninitialized,
    Idle,
    Active,
}

/// Which halves of the tracking data the peripheral provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub eye: bool,
    pub expression: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            eye: true,
            expression: true,
        }
    }
}

/// What a single [`Updater::update`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Missing collaborator or inactive module; nothing happened
    Skipped,
    /// A frame was decoded and written to the store
    Composed,
    /// A packet arrived but carried no weights; the store is untouched
    EmptyFrame,
    /// The receive timed out
    TimedOut,
    /// The receive failed and the failure was reported
    Failed,
}

/// Drives the decode-and-compose pipeline.
pub struct Updater<S> {
    source: Option<S>,
    sink: Option<Arc<dyn WarningSink>>,
    format: PacketFormat,
    capabilities: Capabilities,
    store: SharedTrackingData,
    composer: ExpressionComposer,
    timeouts: u32,
    timeout_warning_threshold: u32,
    stats: SharedPipelineStats,
    instance_id: Uuid,
}

impl<S: PacketSource> Updater<S> {
    /// Create an updater. With no source or no sink every update is a no-op.
    pub fn new(
        source: Option<S>,
        sink: Option<Arc<dyn WarningSink>>,
        format: PacketFormat,
        capabilities: Capabilities,
        store: SharedTrackingData,
    ) -> Self {
        Self {
            source,
            sink,
            format,
            capabilities,
            store,
            composer: ExpressionComposer::new(),
            timeouts: 0,
            timeout_warning_threshold: TIMEOUT_WARNING_THRESHOLD,
            stats: create_shared_stats(),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Share statistics with another owner (e.g. the CLI).
    pub fn with_stats(mut self, stats: SharedPipelineStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_timeout_warning_threshold(mut self, threshold: u32) -> Self {
        self.timeout_warning_threshold = threshold;
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn stats(&self) -> &SharedPipelineStats {
        &self.stats
    }

    pub fn composer(&self) -> &ExpressionComposer {
        &self.composer
    }

    /// Timeouts counted since the last warning.
    pub fn pending_timeouts(&self) -> u32 {
        self.timeouts
    }

    /// Run one cycle.
    pub fn update(&mut self, state: ModuleState) -> UpdateOutcome {
        let (Some(source), Some(sink)) = (self.source.as_mut(), self.sink.as_ref()) else {
            return UpdateOutcome::Skipped;
        };
        if state != ModuleState::Active {
            return UpdateOutcome::Skipped;
        }

        let bytes = match source.recv() {
            Ok(bytes) => bytes,
            Err(ReceiveError::TimedOut) => {
                self.stats.record_timeout();
                self.timeouts += 1;
                if self.timeouts > self.timeout_warning_threshold {
                    sink.warn(WarningKey::UpdateTimeout, None);
                    self.timeouts = 0;
                }
                return UpdateOutcome::TimedOut;
            }
            Err(err) => {
                self.stats.record_failure();
                sink.warn(WarningKey::UpdateFailed, Some(&err));
                return UpdateOutcome::Failed;
            }
        };
        self.stats.record_packet();

        let frame = decode(&bytes, self.format);
        if frame.is_empty() {
            tracing::debug!(
                instance = %self.instance_id,
                len = bytes.len(),
                "packet carried no blendshape weights"
            );
            self.stats.record_empty_frame();
            return UpdateOutcome::EmptyFrame;
        }

        {
            let mut data = self.store.write();
            if self.capabilities.eye {
                self.composer.compose_eye(&frame, &mut data);
            }
            if self.capabilities.expression {
                self.composer.compose_expression(&frame, &mut data);
            }
        }
        self.stats.record_composed();
        UpdateOutcome::Composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::blendshape::{BlendShapeIndex, BLEND_SHAPE_COUNT};
    use crate::core::expressions::{create_shared_tracking_data, UnifiedExpression};
    use crate::core::packet::encode_legacy;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    struct ScriptedSource(VecDeque<Result<Vec<u8>, ReceiveError>>);

    impl PacketSource for ScriptedSource {
        fn recv(&mut self) -> Result<Vec<u8>, ReceiveError> {
            self.0.pop_front().unwrap_or(Err(ReceiveError::TimedOut))
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<WarningKey>>);

    impl WarningSink for RecordingSink {
        fn warn(&self, key: WarningKey, _detail: Option<&(dyn std::error::Error + 'static)>) {
            self.0.lock().push(key);
        }
    }

    fn legacy_packet(index: BlendShapeIndex, value: f32) -> Vec<u8> {
        let mut weights = [0.0f32; BLEND_SHAPE_COUNT];
        weights[index.as_index()] = value;
        encode_legacy(0, &weights)
    }

    fn updater(
        packets: Vec<Result<Vec<u8>, ReceiveError>>,
        capabilities: Capabilities,
    ) -> (Updater<ScriptedSource>, Arc<RecordingSink>, SharedTrackingData) {
        let sink = Arc::new(RecordingSink::default());
        let store = create_shared_tracking_data();
        let updater = Updater::new(
            Some(ScriptedSource(packets.into())),
            Some(sink.clone() as Arc<dyn WarningSink>),
            PacketFormat::Legacy,
            capabilities,
            store.clone(),
        );
        (updater, sink, store)
    }

    #[test]
    fn test_missing_collaborators_skip() {
        let store = create_shared_tracking_data();
        let mut no_source: Updater<ScriptedSource> = Updater::new(
            None,
            Some(Arc::new(RecordingSink::default())),
            PacketFormat::Current,
            Capabilities::default(),
            store.clone(),
        );
        assert_eq!(no_source.update(ModuleState::Active), UpdateOutcome::Skipped);

        let mut no_sink = Updater::new(
            Some(ScriptedSource(VecDeque::new())),
            None,
            PacketFormat::Current,
            Capabilities::default(),
            store,
        );
        assert_eq!(no_sink.update(ModuleState::Active), UpdateOutcome::Skipped);
        assert_eq!(no_sink.pending_timeouts(), 0);
    }

    #[test]
    fn test_inactive_module_does_not_receive() {
        let packet = legacy_packet(BlendShapeIndex::JawOpen, 0.8);
        let (mut updater, _, store) = updater(vec![Ok(packet)], Capabilities::default());

        assert_eq!(updater.update(ModuleState::Idle), UpdateOutcome::Skipped);
        assert_eq!(updater.update(ModuleState::Uninitialized), UpdateOutcome::Skipped);
        assert_eq!(store.read().weight(UnifiedExpression::JawOpen), 0.0);

        // The packet is still queued for the first active update.
        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);
        assert!((store.read().weight(UnifiedExpression::JawOpen) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_capabilities_gate_composition() {
        let mut weights = [0.0f32; BLEND_SHAPE_COUNT];
        weights[BlendShapeIndex::EyeBlinkL.as_index()] = 0.25;
        weights[BlendShapeIndex::JawOpen.as_index()] = 0.4;
        let packet = encode_legacy(0, &weights);

        let (mut updater, _, store) = updater(
            vec![Ok(packet)],
            Capabilities {
                eye: false,
                expression: true,
            },
        );
        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Composed);

        let data = store.read();
        assert_eq!(data.eye.left.openness, 0.0);
        assert!((data.weight(UnifiedExpression::JawOpen) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_frame_leaves_store_untouched() {
        let (mut updater, sink, store) = updater(vec![Ok(vec![0u8; 8])], Capabilities::default());
        store.write().set_weight(UnifiedExpression::TongueOut, 0.99);

        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::EmptyFrame);
        assert_eq!(store.read().weight(UnifiedExpression::TongueOut), 0.99);
        assert!(sink.0.lock().is_empty());
        assert_eq!(updater.stats().stats().empty_frames, 1);
    }

    #[test]
    fn test_io_failure_is_reported_and_swallowed() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let (mut updater, sink, _) =
            updater(vec![Err(ReceiveError::Io(err))], Capabilities::default());

        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::Failed);
        assert_eq!(*sink.0.lock(), vec![WarningKey::UpdateFailed]);
        assert_eq!(updater.update(ModuleState::Active), UpdateOutcome::TimedOut);
    }

    #[test]
    fn test_timeout_warning_wraps_at_threshold() {
        let (updater, sink, _) = updater(Vec::new(), Capabilities::default());
        let mut updater = updater.with_timeout_warning_threshold(3);

        for _ in 0..3 {
            updater.update(ModuleState::Active);
        }
        assert!(sink.0.lock().is_empty());
        assert_eq!(updater.pending_timeouts(), 3);

        updater.update(ModuleState::Active);
        assert_eq!(*sink.0.lock(), vec![WarningKey::UpdateTimeout]);
        assert_eq!(updater.pending_timeouts(), 0);
    }
}
