use cypher_town_core::CharacterId;
use cypher_town_location::{
    default_roster, query_parameter, query_parameter_or, with_query_parameter, CharacterOption,
    CharacterSelector, Location,
};

fn selector() -> CharacterSelector {
    CharacterSelector::new("character", CharacterId::default(), default_roster())
        .expect("default roster is valid")
}

#[test]
fn reads_first_occurrence_of_parameter() {
    let url = "https://cypher.town/?character=342&character=8733";

    assert_eq!(query_parameter(url, "character").as_deref(), Some("342"));
}

#[test]
fn missing_query_falls_back_to_default() {
    assert_eq!(query_parameter_or("https://cypher.town/", "character", "1718"), "1718");
    assert_eq!(query_parameter_or("https://cypher.town/?other=1", "character", "1718"), "1718");
    assert_eq!(query_parameter("https://cypher.town/?", "character"), None);
}

#[test]
fn decodes_percent_escapes_and_plus_signs() {
    let url = "/play?character=bunny%20slime+Rez";

    assert_eq!(
        query_parameter(url, "character").as_deref(),
        Some("bunny slime Rez")
    );
}

#[test]
fn fragment_is_not_part_of_the_query() {
    let url = "/play?character=5309#character=342";

    assert_eq!(query_parameter(url, "character").as_deref(), Some("5309"));
    assert_eq!(query_parameter("/play#?character=342", "character"), None);
}

#[test]
fn rewrite_appends_missing_parameter() {
    assert_eq!(
        with_query_parameter("/play", "character", "342"),
        "/play?character=342"
    );
}

#[test]
fn rewrite_preserves_path_fragment_and_other_parameters() {
    let rewritten = with_query_parameter(
        "https://cypher.town/play?lang=en&character=1718&mode=x#map",
        "character",
        "8733",
    );

    assert_eq!(
        rewritten,
        "https://cypher.town/play?lang=en&character=8733&mode=x#map"
    );
}

#[test]
fn rewrite_drops_duplicate_parameters_and_encodes_value() {
    let rewritten = with_query_parameter("/?character=1&character=2", "character", "a b&c");

    assert_eq!(rewritten, "/?character=a%20b%26c");
    assert_eq!(query_parameter(&rewritten, "character").as_deref(), Some("a b&c"));
}

#[test]
fn selecting_an_option_updates_the_location() {
    let selector = selector();
    let mut location = Location::new("https://cypher.town/?character=1718");
    let index = selector
        .options()
        .iter()
        .position(|option| option.id.as_str() == "bunnyslimeRez")
        .expect("bunny slime is in the default roster");

    let selected = selector
        .select(&mut location, index)
        .expect("index is in range");

    assert_eq!(selected.as_str(), "bunnyslimeRez");
    assert_eq!(location.as_str(), "https://cypher.town/?character=bunnyslimeRez");
    assert_eq!(selector.current(&location), selected);
    assert_eq!(selector.selected_index(&location), Some(index));
}

#[test]
fn default_roster_matches_labels_order() {
    let selector = selector();
    let labels = selector.labels();

    assert_eq!(labels.len(), 10);
    assert_eq!(labels[0], "Character 1");
    assert_eq!(labels[9], "Character 342");
}

#[test]
fn custom_roster_uses_its_own_parameter() {
    let selector = CharacterSelector::new(
        "hero",
        CharacterId::new("knight"),
        vec![
            CharacterOption::new("knight", "Knight"),
            CharacterOption::new("rogue", "Rogue"),
        ],
    )
    .expect("roster is valid");
    let mut location = Location::new("/?character=342");

    assert_eq!(selector.current(&location).as_str(), "knight");

    let _ = selector.select(&mut location, 1).expect("index is in range");

    assert_eq!(location.as_str(), "/?character=342&hero=rogue");
    assert_eq!(selector.parameter(), "hero");
}
