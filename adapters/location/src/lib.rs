#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Page location handling for Cypher Town.
//!
//! The active character travels in the query string of the page location, so
//! the same scene can be shared as a link. This crate reads that parameter and
//! rewrites it when the player picks another character from the selector.

mod query;

use std::collections::HashSet;

use cypher_town_core::CharacterId;
use thiserror::Error;

pub use self::query::{query_parameter, query_parameter_or, with_query_parameter};

/// Errors raised by the character selector.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    /// The selector needs at least one character to offer.
    #[error("character roster is empty")]
    EmptyRoster,
    /// Each character may appear once in the roster.
    #[error("character `{id}` appears more than once in the roster")]
    DuplicateCharacter {
        /// Repeated identifier.
        id: CharacterId,
    },
    /// The requested option does not exist.
    #[error("character option {index} is out of range (roster holds {len})")]
    OptionOutOfRange {
        /// Requested option index.
        index: usize,
        /// Number of options in the roster.
        len: usize,
    },
}

/// Selectable entry presented by the character dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterOption {
    /// Identifier written into the location.
    pub id: CharacterId,
    /// Human readable label.
    pub label: String,
}

impl CharacterOption {
    /// Creates a new option.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(id),
            label: label.into(),
        }
    }
}

/// Characters offered when the manifest does not list its own roster.
#[must_use]
pub fn default_roster() -> Vec<CharacterOption> {
    vec![
        CharacterOption::new("character1", "Character 1"),
        CharacterOption::new("character2", "Character 2"),
        CharacterOption::new("character3", "Character 3"),
        CharacterOption::new("1178", "Character 1178"),
        CharacterOption::new("1718", "Character 1718"),
        CharacterOption::new("3134", "Character 3134"),
        CharacterOption::new("5309", "Character 5309"),
        CharacterOption::new("bunnyslimeRez", "Character Bunny Slime"),
        CharacterOption::new("8733", "Character 8733"),
        CharacterOption::new("342", "Character 342"),
    ]
}

/// Current page location, the single source of truth for the selected character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    url: String,
}

impl Location {
    /// Wraps the provided URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Full URL of the location.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Replaces the URL in place, as a history push would.
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }
}

/// Fixed list of characters bound to a query parameter.
#[derive(Clone, Debug)]
pub struct CharacterSelector {
    parameter: String,
    default: CharacterId,
    options: Vec<CharacterOption>,
}

impl CharacterSelector {
    /// Creates a selector for `parameter`, falling back to `default` when the location names no character.
    pub fn new(
        parameter: impl Into<String>,
        default: CharacterId,
        options: Vec<CharacterOption>,
    ) -> Result<Self, LocationError> {
        if options.is_empty() {
            return Err(LocationError::EmptyRoster);
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.id.clone()) {
                return Err(LocationError::DuplicateCharacter {
                    id: option.id.clone(),
                });
            }
        }

        Ok(Self {
            parameter: parameter.into(),
            default,
            options,
        })
    }

    /// Name of the query parameter that carries the character.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// Options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[CharacterOption] {
        &self.options
    }

    /// Labels in presentation order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.options
            .iter()
            .map(|option| option.label.as_str())
            .collect()
    }

    /// Character named by the location, or the default when none is named.
    #[must_use]
    pub fn current(&self, location: &Location) -> CharacterId {
        CharacterId::new(query_parameter_or(
            location.as_str(),
            &self.parameter,
            self.default.as_str(),
        ))
    }

    /// Index of the option matching the location's character, if it is in the roster.
    #[must_use]
    pub fn selected_index(&self, location: &Location) -> Option<usize> {
        let current = self.current(location);
        self.options.iter().position(|option| option.id == current)
    }

    /// Writes the option at `index` into the location's query string and returns its identifier.
    ///
    /// The path, the fragment and unrelated parameters are preserved. The scene
    /// is not rebuilt; callers decide what a new character means for a running session.
    pub fn select(
        &self,
        location: &mut Location,
        index: usize,
    ) -> Result<CharacterId, LocationError> {
        let option = self
            .options
            .get(index)
            .ok_or(LocationError::OptionOutOfRange {
                index,
                len: self.options.len(),
            })?;

        let url = with_query_parameter(location.as_str(), &self.parameter, option.id.as_str());
        log::info!("character selection changed to `{}`: {url}", option.id);
        location.navigate(url);
        Ok(option.id.clone())
    }
}
