//! PICO Face Bridge - face tracking telemetry to unified expressions.
//!
//! This library decodes the binary packets a PICO headset streams over UDP
//! and converts the raw blendshape weights into named unified expressions
//! for an avatar animation pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PICO Face Bridge                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Transport  │──▶│   Packet    │──▶│  Composer   │       │
//! │  │    (UDP)    │   │  (decode)   │   │ (correct)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │  Warnings   │                     │ Tracking    │       │
//! │  │  + Stats    │                     │   Store     │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pico_face_bridge::{core, logging::TracingSink, transport::UdpPacketSource};
//!
//! let source = UdpPacketSource::bind("0.0.0.0:29765".parse().unwrap()).unwrap();
//! let store = core::create_shared_tracking_data();
//! let mut updater = core::Updater::new(
//!     Some(source),
//!     Some(Arc::new(TracingSink)),
//!     core::PacketFormat::Current,
//!     core::Capabilities::default(),
//!     store.clone(),
//! );
//!
//! loop {
//!     updater.update(core::ModuleState::Active);
//!     let jaw = store.read().weight(core::UnifiedExpression::JawOpen);
//!     # let _ = jaw;
//! }
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod stats;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    decode, BlendShapeIndex, Capabilities, ExpressionComposer, ModuleState, PacketFormat,
    RawFrame, SharedTrackingData, UnifiedExpression, UnifiedTrackingData, UpdateOutcome, Updater,
};
pub use logging::{TracingSink, WarningKey, WarningSink};
pub use stats::{PipelineStats, SharedPipelineStats, StatsSnapshot};
pub use transport::{PacketSource, ReceiveError, UdpPacketSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
