use std::path::PathBuf;
use std::sync::Arc;

use appenergy::taxonomy::TaxonomyError;
use appenergy::{Aggregator, EnergyService, EnergyTier, SettingsBuilder, SourceResults, Taxonomy};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn raw(tags: &[&str]) -> SourceResults {
    let mut raw = SourceResults::new();
    raw.push("Gog", tags.iter().map(|t| t.to_string()).collect());
    raw
}

fn games_service() -> EnergyService {
    let taxonomy = Taxonomy::from_path(&fixture("games_taxonomy.json")).expect("fixture loads");
    EnergyService::new(Arc::new(taxonomy), Aggregator::new(Vec::new()))
}

#[test]
fn custom_taxonomy_keeps_file_order() {
    let taxonomy = Taxonomy::from_path(&fixture("games_taxonomy.json")).unwrap();
    let ids: Vec<&str> = taxonomy.categories().iter().map(|c| c.id()).collect();

    assert_eq!(ids, vec!["strategy_games", "action_games", "others"]);
}

#[test]
fn custom_taxonomy_drives_classification() {
    let service = games_service();

    let strategy = service.classify_sources("Civilization", raw(&["Strategy", "Turn-based"]));
    assert_eq!(strategy.category(), Some("strategy_games"));
    assert_eq!(strategy.confidence(), Some(0.5));
    assert_eq!(strategy.energy_level(), EnergyTier::Moderate);

    let action = service.classify_sources("Celeste", raw(&["Platformer", "Shooter"]));
    assert_eq!(action.category(), Some("action_games"));
    assert_eq!(action.energy_level(), EnergyTier::High);
}

#[test]
fn fallback_category_uses_the_files_tier() {
    let result = games_service().classify_sources("Tetris", raw(&["Puzzle"]));

    assert_eq!(result.category(), Some("others"));
    assert_eq!(result.confidence(), Some(0.0));
    assert_eq!(result.energy_level(), EnergyTier::Low);
}

#[test]
fn hyphenated_tags_become_underscored_tokens() {
    let result = games_service().classify_sources("StarCraft", raw(&["Real-Time Strategy", "Tactics"]));

    assert_eq!(
        result.normalized_tags().unwrap().as_slice(),
        ["real_time", "strategy", "tactics"]
    );
    assert!((result.confidence().unwrap() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn duplicate_category_is_rejected() {
    let err = Taxonomy::from_path(&fixture("duplicate_category.json")).unwrap_err();
    assert!(matches!(err, TaxonomyError::DuplicateCategory(ref id) if id == "games"));
}

#[test]
fn unknown_tier_string_is_a_parse_error() {
    let err = Taxonomy::from_path(&fixture("unknown_tier.json")).unwrap_err();
    assert!(matches!(err, TaxonomyError::Parse(_)));
}

#[test]
fn default_tier_field_is_not_accepted() {
    let err = Taxonomy::from_path(&fixture("legacy_default_tier.json")).unwrap_err();
    assert!(matches!(err, TaxonomyError::Parse(_)));
}

#[test]
fn settings_load_fixture_taxonomy() {
    let settings = SettingsBuilder::new()
        .taxonomy_path(fixture("games_taxonomy.json"))
        .max_retries(0)
        .source_timeout(std::time::Duration::from_secs(1))
        .build()
        .unwrap();

    let taxonomy = settings.load_taxonomy().unwrap();
    assert_eq!(taxonomy.energy_tier("action_games"), EnergyTier::High);
    assert_eq!(taxonomy.energy_tier("racing_games"), EnergyTier::Moderate);
}
