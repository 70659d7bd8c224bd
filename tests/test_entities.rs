use sling_swap::entities::*;

#[test]
fn token_parse_and_display() {
    assert_eq!("usdc".parse::<Token>().unwrap(), Token::Usdc);
    assert_eq!(" WETH ".parse::<Token>().unwrap(), Token::Weth);
    assert_eq!(Token::Mon.to_string(), "MON");
    assert!("DOGE".parse::<Token>().is_err());
    assert_eq!(Token::Weth.name(), "Wrapped Ether");
}

#[test]
fn swap_pairs_exclude_self_in_fixed_order() {
    assert_eq!(Token::Usdc.swap_pairs(), vec![Token::Mon, Token::Weth]);
    assert_eq!(Token::Mon.swap_pairs(), vec![Token::Usdc, Token::Weth]);
    assert_eq!(Token::Weth.swap_pairs(), vec![Token::Usdc, Token::Mon]);
}

#[test]
fn vector_arithmetic() {
    let a = Vector2D::new(3.0, 4.0);
    assert_eq!(a.length(), 5.0);
    assert_eq!(a - Vector2D::new(1.0, 1.0), Vector2D::new(2.0, 3.0));
    assert_eq!(a * 2.0, Vector2D::new(6.0, 8.0));
    assert_eq!(a.distance(Vector2D::ZERO), 5.0);
}

#[test]
fn round_state_starts_at_rest_on_anchor() {
    let anchor = Vector2D::new(120.0, 420.0);
    let r = RoundState::new(anchor, 3);
    assert_eq!(r.game_state, GameState::Ready);
    assert_eq!(r.chances, 3);
    assert_eq!(r.projectile_position, anchor);
    assert_eq!(r.projectile_velocity, Vector2D::ZERO);
    assert_eq!(r.drag_end, anchor);
    assert!(r.towers.is_empty());
    assert!(r.hit_tower.is_none());
}

#[test]
fn round_state_clone_is_independent() {
    let original = RoundState::new(Vector2D::new(0.0, 0.0), 3);
    let mut cloned = original.clone();
    cloned.chances = 1;
    cloned.towers.push(TowerStructure { token: Token::Mon, blocks: Vec::new() });
    assert_eq!(original.chances, 3);
    assert!(original.towers.is_empty());
}
