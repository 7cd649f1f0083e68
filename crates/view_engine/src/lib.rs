//! # View Engine
//!
//! Core of a real-time 3D scene viewer that mirrors a remote authority's
//! scene over a message channel.
//!
//! ## Features
//!
//! - **Scene Sync**: Id-keyed object registry driven by snapshot and delta
//!   messages from the server
//! - **Camera Rig**: Smooth, interruption-safe viewpoint transitions with
//!   orbit, pan, zoom, and auto-rotate
//! - **Backend Seam**: Rendering behind a trait, with a headless backend for
//!   servers and tests
//! - **Notifications**: Typed event stream for embedding UIs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::{Arc, Mutex};
//! use view_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
//!     let mut engine = ViewerEngine::new(ViewerConfig::default(), backend)?;
//!
//!     engine.subscribe(|event| println!("{event:?}"));
//!     loop {
//!         engine.pump_messages();
//!         engine.tick(1.0 / 60.0)?;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod camera;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod sync;

mod engine;

pub use engine::{EngineError, ViewerEngine};

/// Common imports for viewer embedders
pub mod prelude {
    pub use crate::{
        camera::{Camera, CameraRig},
        core::config::{CameraConfig, Config, ConfigError, SceneConfig, ViewerConfig},
        events::{Notifier, ViewerEvent},
        foundation::{
            math::{Mat4, Vec3},
            time::{FpsCounter, Timer},
        },
        render::{HeadlessBackend, RenderBackend, SharedBackend},
        scene::{ObjectKind, ObjectRecord, ObjectRegistry},
        sync::{ConnectionState, SyncChannel, Transport, TransportEvent},
        EngineError, ViewerEngine,
    };
}
