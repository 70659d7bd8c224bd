//! Procedural tower generation.
//!
//! Towers are stepped pyramids laid out right-to-left from the field's right
//! edge, one per swap destination, each capped with a larger target block.
//! All randomness comes through the injected `rng`.

use rand::Rng;
use tracing::debug;

use crate::config::GameConfig;
use crate::entities::{Block, BlockKind, Token, TowerStructure};

/// Left edge of the nominal tower footprint for slot `index`.
pub fn tower_base_x(index: usize, field_width: f64, cfg: &GameConfig) -> f64 {
    field_width - cfg.tower_right_margin - index as f64 * cfg.tower_spacing
}

/// Build one tower for `token` in slot `index`.
pub fn generate_tower(
    token: Token,
    index: usize,
    field_width: f64,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> TowerStructure {
    let base_x = tower_base_x(index, field_width, cfg);
    let bw = cfg.block_size.width;
    let bh = cfg.block_size.height;
    let levels = rng.gen_range(cfg.min_levels..=cfg.max_levels);

    let mut blocks = Vec::new();
    for level in 0..levels {
        let count = (levels - level).max(1);
        let row_width = count as f64 * bw;
        let start_x = base_x + (cfg.tower_width - row_width) / 2.0;
        for i in 0..count {
            blocks.push(Block {
                id: format!("{}-{}", token, blocks.len()),
                kind: BlockKind::Structural,
                x: start_x + i as f64 * bw,
                y: level as f64 * bh,
                width: bw,
                height: bh,
                is_hit: false,
            });
        }
    }

    blocks.push(Block {
        id: format!("{token}-target"),
        kind: BlockKind::Target,
        x: base_x + (cfg.tower_width - cfg.target_size) / 2.0,
        y: levels as f64 * bh,
        width: cfg.target_size,
        height: cfg.target_size,
        is_hit: false,
    });

    debug!(%token, index, levels, blocks = blocks.len(), base_x, "tower generated");
    TowerStructure { token, blocks }
}

/// One tower per swap destination of `selected`, in swap-pair order.
pub fn generate_towers(
    selected: Token,
    field_width: f64,
    cfg: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<TowerStructure> {
    selected
        .swap_pairs()
        .into_iter()
        .enumerate()
        .map(|(index, token)| generate_tower(token, index, field_width, cfg, rng))
        .collect()
}

/// Number of structural blocks resting on each level, bottom first.
pub fn level_counts(tower: &TowerStructure, block_height: f64) -> Vec<usize> {
    let mut counts: Vec<usize> = Vec::new();
    for block in tower.blocks.iter().filter(|b| !b.is_target()) {
        let level = (block.y / block_height).round() as usize;
        if counts.len() <= level {
            counts.resize(level + 1, 0);
        }
        counts[level] += 1;
    }
    counts
}
