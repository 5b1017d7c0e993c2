use starwake::common::config::GameConfig;

#[test]
fn shipped_data_parses_and_matches_built_in_defaults() {
    let text = include_str!("../assets/data/game.ron");
    let config = GameConfig::from_ron_str("assets/data/game.ron", text).expect("valid game data");

    assert_eq!(config, GameConfig::default());
}

#[test]
fn shipped_data_loads_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/data/game.ron");
    let config = GameConfig::load(path).expect("readable game data");

    assert_eq!(config.levels.len(), 3);
    assert!(config.levels[2].is_boss_level());
}
