//! A table with a few creature cards on it. Cards can be dragged around,
//! turned over and blown up for a closer look.

pub mod card;
pub mod config;
pub mod scene;

pub use card::{Card, CardKind, CardLevel};
pub use config::{AppConfig, CardPlacement, GameConfig, Tuning};
pub use scene::CardScene;
