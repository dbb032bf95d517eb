//! Dietary restriction filter.
//!
//! A `DietRule` has inclusion tags and exclusion terms:
//! - the recipe must carry at least one inclusion tag (exact match), unless
//!   the rule has none
//! - no exclusion term may appear, case-insensitively, as a substring of any
//!   ingredient or tag
//!
//! Rules are plain data so they can be read from configuration.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Recipe;
use serde::{Deserialize, Serialize};
use sources::Candidate;

/// Inclusion tags and exclusion terms for one dietary restriction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietRule {
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub exclude_terms: Vec<String>,
}

impl DietRule {
    pub fn new<S: Into<String>>(
        include_tags: impl IntoIterator<Item = S>,
        exclude_terms: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            include_tags: include_tags.into_iter().map(Into::into).collect(),
            exclude_terms: exclude_terms
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
        }
    }

    /// True when the recipe carries an inclusion tag (vacuously true when
    /// the rule has none)
    pub fn includes(&self, recipe: &Recipe) -> bool {
        self.include_tags.is_empty()
            || recipe.tags.iter().any(|tag| self.include_tags.contains(tag))
    }

    /// True when any exclusion term occurs in an ingredient or tag
    pub fn excludes(&self, recipe: &Recipe) -> bool {
        if self.exclude_terms.is_empty() {
            return false;
        }
        recipe
            .ingredients
            .iter()
            .chain(recipe.tags.iter())
            .map(|value| value.to_lowercase())
            .any(|value| {
                self.exclude_terms
                    .iter()
                    .any(|term| value.contains(&term.to_lowercase()))
            })
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.includes(recipe) && !self.excludes(recipe)
    }
}

/// Keeps only candidates satisfying a `DietRule`
pub struct DietRuleFilter {
    name: String,
    rule: DietRule,
}

impl DietRuleFilter {
    pub fn new(restriction: &str, rule: DietRule) -> Self {
        Self {
            name: format!("DietRuleFilter({})", restriction),
            rule,
        }
    }
}

impl Filter for DietRuleFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|c| self.rule.matches(&c.recipe))
            .collect())
    }
}
