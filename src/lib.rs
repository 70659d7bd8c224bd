//! Slingshot game engine where knocking down a tower swaps tokens.

pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod physics;
pub mod scheduler;
pub mod tower;
pub mod wallet;

pub use compute::{Game, SwapMode};
pub use config::{GameConfig, TriggerPolicy};
pub use entities::{GameState, Token, Vector2D};
