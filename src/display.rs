//! Rendering layer — all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game.  No game logic is performed; this module only translates state
//! into terminal commands and maps terminal cells to field pixels.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use rand::Rng;
use sling_swap::entities::{BlockKind, FieldSize, GameState, Notice, Severity, Token, Vector2D};
use sling_swap::physics;
use sling_swap::wallet::{NoticeLog, Wallet};
use sling_swap::Game;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::White;
const C_HUD_DIM: Color = Color::DarkGrey;
const C_CHANCES: Color = Color::Red;
const C_GROUND: Color = Color::DarkGreen;
const C_SLINGSHOT: Color = Color::DarkYellow;
const C_BAND: Color = Color::Yellow;
const C_STRUCTURAL: Color = Color::Grey;
const C_HINT: Color = Color::DarkGrey;

/// Rows above the field used by the HUD.
pub const HUD_ROWS: u16 = 2;
/// Rows below the field used by the controls hint.
pub const FOOTER_ROWS: u16 = 1;

const MIN_FIELD_WIDTH: f64 = 960.0;
const MIN_FIELD_HEIGHT: f64 = 600.0;

fn token_color(token: Token) -> Color {
    match token {
        Token::Usdc => Color::Blue,
        Token::Mon => Color::Magenta,
        Token::Weth => Color::Cyan,
    }
}

fn short_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps terminal cells to field pixels.  Cells are stretched so the field is
/// never smaller than the nominal play area, whatever the terminal size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub cell_w: f64,
    pub cell_h: f64,
}

impl Viewport {
    pub fn fit(cols: u16, rows: u16, min_cell_w: f64, min_cell_h: f64) -> Self {
        let field_rows = rows.saturating_sub(HUD_ROWS + FOOTER_ROWS).max(1);
        let cols = cols.max(1);
        Self {
            cols,
            rows: field_rows,
            cell_w: min_cell_w.max(MIN_FIELD_WIDTH / cols as f64),
            cell_h: min_cell_h.max(MIN_FIELD_HEIGHT / field_rows as f64),
        }
    }

    pub fn field_size(&self) -> FieldSize {
        FieldSize {
            width: self.cols as f64 * self.cell_w,
            height: self.rows as f64 * self.cell_h,
        }
    }

    /// Centre of a terminal cell in field coordinates.
    pub fn to_field(&self, column: u16, row: u16) -> Vector2D {
        let field_row = row.saturating_sub(HUD_ROWS) as f64;
        Vector2D::new(
            (column as f64 + 0.5) * self.cell_w,
            (field_row + 0.5) * self.cell_h,
        )
    }

    /// Terminal cell holding a field point, if it lies inside the field.
    pub fn to_cell(&self, p: Vector2D) -> Option<(u16, u16)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.cell_w).floor() as u32;
        let row = (p.y / self.cell_h).floor() as u32;
        if col >= self.cols as u32 || row >= self.rows as u32 {
            return None;
        }
        Some((col as u16, row as u16 + HUD_ROWS))
    }

    fn field_bottom_row(&self) -> u16 {
        HUD_ROWS + self.rows
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, game)?;
    draw_ground(out, game, view)?;
    draw_towers(out, game, view)?;
    draw_slingshot(out, game, view)?;
    draw_projectile(out, game, view)?;
    draw_notices(out, game.notifier(), view)?;
    draw_controls_hint(out, view)?;

    if game.state() == GameState::GameOver {
        draw_game_over(out, game, view)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.field_bottom_row()))?;
    out.flush()?;
    Ok(())
}

// ── HUD (rows 0-1) ────────────────────────────────────────────────────────────

fn draw_hud<W, Wl, R>(out: &mut W, game: &Game<Wl, NoticeLog, R>) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    out.queue(cursor::MoveTo(1, 0))?;
    match game.wallet().address() {
        Some(addr) => {
            out.queue(style::SetForegroundColor(C_HUD))?;
            out.queue(Print(format!("{}  ", short_address(&addr))))?;
        }
        None => {
            out.queue(style::SetForegroundColor(C_HUD_DIM))?;
            out.queue(Print("[not connected]  "))?;
        }
    }
    for token in Token::ALL {
        let marker = if token == game.selected() { '▶' } else { ' ' };
        out.queue(style::SetForegroundColor(token_color(token)))?;
        out.queue(Print(format!(
            "{}{} {:.4}  ",
            marker,
            token,
            game.balances().get(token)
        )))?;
    }

    out.queue(cursor::MoveTo(1, 1))?;
    out.queue(style::SetForegroundColor(C_CHANCES))?;
    out.queue(Print(format!("Chances:{:<4}", "♥".repeat(game.chances() as usize))))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("  {}", game.status_line())))?;
    Ok(())
}

// ── Field ─────────────────────────────────────────────────────────────────────

fn draw_ground<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    let field = view.field_size();
    let ground = physics::ground_y(field, game.config());
    let Some((_, row)) = view.to_cell(Vector2D::new(0.0, ground)) else {
        return Ok(());
    };
    out.queue(style::SetForegroundColor(C_GROUND))?;
    out.queue(cursor::MoveTo(0, row))?;
    out.queue(Print("▀".repeat(view.cols as usize)))?;
    Ok(())
}

fn draw_towers<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    let field = view.field_size();
    let cfg = game.config();
    for tower in game.towers() {
        let color = token_color(tower.token);
        for block in tower.blocks.iter().filter(|b| !b.is_hit) {
            let bounds = physics::block_bounds(block, field, cfg);
            let (glyph, fg) = match block.kind {
                BlockKind::Structural => ('▒', C_STRUCTURAL),
                BlockKind::Target => ('█', color),
            };
            let Some((c0, r0)) = view.to_cell(Vector2D::new(bounds.left, bounds.top)) else {
                continue;
            };
            // Shrink by a hair so adjacent blocks do not share a cell edge.
            let (c1, r1) = view
                .to_cell(Vector2D::new(bounds.right - 0.01, bounds.bottom - 0.01))
                .unwrap_or((view.cols - 1, view.field_bottom_row() - 1));
            out.queue(style::SetForegroundColor(fg))?;
            for row in r0..=r1 {
                out.queue(cursor::MoveTo(c0, row))?;
                out.queue(Print(glyph.to_string().repeat((c1.saturating_sub(c0) + 1) as usize)))?;
            }
        }

        if let Some(target) = tower.target() {
            let ground = physics::ground_y(field, cfg);
            let centre = Vector2D::new(target.x + target.width / 2.0, ground + cfg.ground_height / 2.0);
            if let Some((col, row)) = view.to_cell(centre) {
                let label = tower.token.symbol();
                out.queue(style::SetForegroundColor(color))?;
                out.queue(cursor::MoveTo(col.saturating_sub(label.len() as u16 / 2), row))?;
                out.queue(Print(label))?;
            }
        }
    }
    Ok(())
}

fn draw_slingshot<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    let cfg = game.config();
    let field = view.field_size();
    let anchor = cfg.anchor;
    let ground = physics::ground_y(field, cfg);

    out.queue(style::SetForegroundColor(C_SLINGSHOT))?;
    if let Some((col, row)) = view.to_cell(anchor) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("Y"))?;
        let ground_row = view
            .to_cell(Vector2D::new(anchor.x, ground))
            .map(|(_, r)| r)
            .unwrap_or(row);
        for r in (row + 1)..ground_row {
            out.queue(cursor::MoveTo(col, r))?;
            out.queue(Print("│"))?;
        }
    }

    let round = game.round();
    if round.is_dragging {
        out.queue(style::SetForegroundColor(C_BAND))?;
        let steps = 8;
        for i in 1..steps {
            let t = i as f64 / steps as f64;
            let p = anchor + (round.drag_end - anchor) * t;
            if let Some((col, row)) = view.to_cell(p) {
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(Print("·"))?;
            }
        }
    }
    Ok(())
}

fn draw_projectile<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    let round = game.round();
    let at = if round.is_dragging {
        round.drag_end
    } else {
        round.projectile_position
    };
    if let Some((col, row)) = view.to_cell(at) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(token_color(game.selected())))?;
        out.queue(Print("●"))?;
    }
    Ok(())
}

// ── Toasts ────────────────────────────────────────────────────────────────────

fn draw_notices<W: Write>(out: &mut W, log: &NoticeLog, view: &Viewport) -> std::io::Result<()> {
    let recent: Vec<&Notice> = log.all().rev().take(3).collect();
    for (i, notice) in recent.iter().enumerate() {
        let color = match notice.severity {
            Severity::Info => Color::White,
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        let line = format!("{}: {}", notice.title, notice.message);
        let width = line.chars().count() as u16;
        let col = view.cols.saturating_sub(width + 1);
        out.queue(cursor::MoveTo(col, HUD_ROWS + i as u16))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(line))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.field_bottom_row()))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "Drag the bird : Aim   1/2/3 : USDC/MON/WETH   C : Connect   D : Disconnect   R : Try again   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W, Wl, R>(
    out: &mut W,
    game: &Game<Wl, NoticeLog, R>,
    view: &Viewport,
) -> std::io::Result<()>
where
    W: Write,
    Wl: Wallet,
    R: Rng,
{
    let hint = format!("R - Try again with {}  Q - Quit", game.selected());
    let lines: [(&str, Color); 3] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
    ];

    let cx = view.cols / 2;
    let start_row = HUD_ROWS + (view.rows / 2).saturating_sub(2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row + lines.len() as u16))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(&hint))?;
    Ok(())
}
