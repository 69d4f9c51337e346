//! A small retained-mode 2D engine: a scene graph, keyed animation actions,
//! name-keyed assets, fire-and-forget audio, a software compositor
//! presented through wgpu, and a winit loop that turns mouse and touch
//! input into scene-space touches.
//!
//! A game implements [`SceneHandler`] and hands it to [`EngineContext`].
//! Everything below the window is usable headless through [`World`].

pub mod action;
pub mod assets;
pub mod audio;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod render;

pub use action::Action;
pub use assets::{AssetStore, SoundId, TextureId};
pub use audio::{AudioSink, NullAudio, RodioAudio};
pub use config::EngineConfig;
pub use context::{EngineContext, SceneHandler, World};
pub use error::{EngineError, Result};
pub use geometry::Rect;
pub use graph::{Content, Node, NodeId, SceneGraph};
pub use input::{PointerEvent, TapTracker, Touch, TouchId, TouchPhase};
pub use render::canvas::Canvas;

pub use glam::Vec2;
