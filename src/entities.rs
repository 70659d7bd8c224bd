//! All game entity types — pure data, no logic beyond tiny accessors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownToken;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Position or velocity in play-field pixels. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vector2D) -> f64 {
        (self - other).length()
    }
}

impl std::ops::Add for Vector2D {
    type Output = Vector2D;
    fn add(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector2D {
    type Output = Vector2D;
    fn sub(self, rhs: Vector2D) -> Vector2D {
        Vector2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Vector2D {
    type Output = Vector2D;
    fn mul(self, k: f64) -> Vector2D {
        Vector2D::new(self.x * k, self.y * k)
    }
}

/// Measured size of the play field, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSize {
    pub width: f64,
    pub height: f64,
}

// ── Tokens ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    Usdc,
    Mon,
    Weth,
}

impl Token {
    pub const ALL: [Token; 3] = [Token::Usdc, Token::Mon, Token::Weth];

    pub fn symbol(self) -> &'static str {
        match self {
            Token::Usdc => "USDC",
            Token::Mon => "MON",
            Token::Weth => "WETH",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Token::Usdc => "USD Coin",
            Token::Mon => "MON Protocol",
            Token::Weth => "Wrapped Ether",
        }
    }

    /// Every token this one can be swapped into, in tower-slot order.
    pub fn swap_pairs(self) -> Vec<Token> {
        Token::ALL.into_iter().filter(|t| *t != self).collect()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Token::Usdc),
            "MON" => Ok(Token::Mon),
            "WETH" => Ok(Token::Weth),
            _ => Err(UnknownToken(s.to_string())),
        }
    }
}

// ── Towers ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Packaging block that only has to be knocked out of the way.
    Structural,
    /// The larger block on top of the pyramid.
    Target,
}

/// A static rectangle of a tower.
///
/// `x` is absolute in field space; `y` is the offset of the block's bottom
/// edge measured upward from the ground line.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// One-way flag: set by the simulator, only cleared by regenerating towers.
    pub is_hit: bool,
}

impl Block {
    pub fn is_target(&self) -> bool {
        self.kind == BlockKind::Target
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TowerStructure {
    pub token: Token,
    pub blocks: Vec<Block>,
}

impl TowerStructure {
    pub fn target(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.is_target())
    }

    pub fn standing(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_hit).count()
    }
}

// ── Turn lifecycle ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Ready,
    Aiming,
    Flying,
    Hit,
    Miss,
    Swapping,
    GameOver,
}

/// Result of one simulator step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing touched; the new position was committed.
    Flying,
    /// The proposed position left the field; the old position was kept.
    Miss,
    /// At least one block was hit. `struck` is the tower whose hit counts as
    /// a swap trigger under the active policy, if any.
    Hit { struck: Option<Token> },
}

/// Everything the render collaborator reads once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundState {
    pub game_state: GameState,
    pub chances: u32,
    pub towers: Vec<TowerStructure>,
    pub hit_tower: Option<Token>,
    pub projectile_position: Vector2D,
    pub projectile_velocity: Vector2D,
    pub is_dragging: bool,
    pub drag_start: Vector2D,
    pub drag_end: Vector2D,
}

impl RoundState {
    pub fn new(anchor: Vector2D, chances: u32) -> Self {
        Self {
            game_state: GameState::Ready,
            chances,
            towers: Vec::new(),
            hit_tower: None,
            projectile_position: anchor,
            projectile_velocity: Vector2D::ZERO,
            is_dragging: false,
            drag_start: Vector2D::ZERO,
            drag_end: anchor,
        }
    }
}

// ── Notifications ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A user-facing toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}
