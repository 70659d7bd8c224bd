use std::collections::HashSet;

use sling_swap::config::GameConfig;
use sling_swap::entities::{BlockKind, Token};
use sling_swap::tower::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

const FIELD_WIDTH: f64 = 960.0;

fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// ── Pyramid shape ─────────────────────────────────────────────────────────────

#[test]
fn levels_never_widen_going_up() {
    let cfg = GameConfig::default();
    for seed in 0..200 {
        let tower = generate_tower(Token::Mon, 0, FIELD_WIDTH, &cfg, &mut seeded_rng(seed));
        let counts = level_counts(&tower, cfg.block_size.height);
        for pair in counts.windows(2) {
            assert!(pair[0] >= pair[1], "seed {seed}: {counts:?}");
        }
        assert!(counts.iter().all(|&c| c >= 1));
    }
}

#[test]
fn level_count_stays_in_range_and_bottom_row_matches_height() {
    let cfg = GameConfig::default();
    let mut seen = HashSet::new();
    for seed in 0..200 {
        let tower = generate_tower(Token::Weth, 0, FIELD_WIDTH, &cfg, &mut seeded_rng(seed));
        let counts = level_counts(&tower, cfg.block_size.height);
        let levels = counts.len();
        assert!((3..=5).contains(&levels), "seed {seed}: {levels} levels");
        assert_eq!(counts[0], levels); // bottom row holds `levels` blocks
        seen.insert(levels);
    }
    assert_eq!(seen.len(), 3, "every height in 3..=5 should appear");
}

#[test]
fn exactly_one_target_sitting_on_top() {
    let cfg = GameConfig::default();
    for seed in 0..50 {
        let tower = generate_tower(Token::Usdc, 1, FIELD_WIDTH, &cfg, &mut seeded_rng(seed));
        let targets: Vec<_> = tower.blocks.iter().filter(|b| b.kind == BlockKind::Target).collect();
        assert_eq!(targets.len(), 1);

        let target = targets[0];
        let top_of_structure = tower
            .blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Structural)
            .map(|b| b.y + b.height)
            .fold(0.0, f64::max);
        assert_eq!(target.y, top_of_structure);
        assert!(target.width > cfg.block_size.width);
        assert!(target.height > cfg.block_size.height);
        assert!(target.id.ends_with("-target"));
    }
}

#[test]
fn blocks_start_standing_with_unique_ids() {
    let cfg = GameConfig::default();
    let tower = generate_tower(Token::Mon, 0, FIELD_WIDTH, &cfg, &mut seeded_rng(3));
    assert!(tower.blocks.iter().all(|b| !b.is_hit));
    let ids: HashSet<_> = tower.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids.len(), tower.blocks.len());
    assert_eq!(tower.standing(), tower.blocks.len());
}

// ── Placement ─────────────────────────────────────────────────────────────────

#[test]
fn towers_step_left_by_spacing() {
    let cfg = GameConfig::default();
    assert_eq!(tower_base_x(0, FIELD_WIDTH, &cfg), 660.0);
    assert_eq!(tower_base_x(1, FIELD_WIDTH, &cfg), 480.0);
}

#[test]
fn rows_and_target_are_centred_in_tower_width() {
    let cfg = GameConfig::default();
    let tower = generate_tower(Token::Mon, 0, FIELD_WIDTH, &cfg, &mut seeded_rng(11));
    let centre = tower_base_x(0, FIELD_WIDTH, &cfg) + cfg.tower_width / 2.0;

    let target = tower.target().unwrap();
    assert_eq!(target.x + target.width / 2.0, centre);

    let bottom: Vec<_> = tower.blocks.iter().filter(|b| b.kind == BlockKind::Structural && b.y == 0.0).collect();
    let left = bottom.iter().map(|b| b.x).fold(f64::INFINITY, f64::min);
    let right = bottom.iter().map(|b| b.x + b.width).fold(f64::NEG_INFINITY, f64::max);
    assert!(((left + right) / 2.0 - centre).abs() < 1e-9);
}

#[test]
fn one_tower_per_swap_pair_in_order() {
    let cfg = GameConfig::default();
    let towers = generate_towers(Token::Mon, FIELD_WIDTH, &cfg, &mut seeded_rng(5));
    let tokens: Vec<_> = towers.iter().map(|t| t.token).collect();
    assert_eq!(tokens, vec![Token::Usdc, Token::Weth]);
    assert!(towers[0].target().unwrap().x > towers[1].target().unwrap().x);
}

#[test]
fn same_seed_same_layout() {
    let cfg = GameConfig::default();
    let a = generate_towers(Token::Usdc, FIELD_WIDTH, &cfg, &mut seeded_rng(99));
    let b = generate_towers(Token::Usdc, FIELD_WIDTH, &cfg, &mut seeded_rng(99));
    assert_eq!(a, b);
}
