//! THERMOS-4 simulation core.
//!
//! A deterministic, single-threaded model of the probe game: phase machine,
//! resource drain, rift hazards, the capture protocol and the override
//! mini-games. Rendering, audio and text generation sit behind traits.

pub mod anomaly;
pub mod audio;
pub mod capture;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod intent;
pub mod minigame;
pub mod narrator;
pub mod phase;
pub mod resources;
pub mod rift;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod terminal;
pub mod types;
