//! FrameLens Frame Engine
//!
//! Bundles the classifier, camera cache, camera locator, and jitter engine
//! into one owned context driven once per render submission.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                    FrameEngine                     │
//! │  register_resource   submit_memory   update_jitter │
//! │        │                   │                │      │
//! │        ▼                   ▼                ▼      │
//! │  ┌────────────┐   ┌───────────────┐  ┌──────────┐  │
//! │  │ Resource   │   │ CameraLocator │  │ Jitter   │  │
//! │  │ Classifier │   │      │        │  │ Engine   │  │
//! │  └────────────┘   │      ▼        │  └──────────┘  │
//! │                   │  CameraCache ─┼──► projection  │
//! │                   └───────────────┘                │
//! │         advance_frame ──► tick + summary           │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! Every subsystem sits behind an ordered lock (see
//! [`framelens_common::sync`]), so one engine can be shared between the
//! render thread and a diagnostics thread.

pub mod config;
pub mod engine;
pub mod replay;
pub mod report;

pub use config::EngineConfig;
pub use engine::FrameEngine;
pub use replay::{replay, ReplaySummary};
pub use report::EngineReport;
