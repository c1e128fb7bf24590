use crate::domain::model::{Model, PoliticalCommunity};
use crate::utils::error::{EntityKind, GeoError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregate counts over a model, as printed by the `summary` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub cantons: usize,
    pub districts: usize,
    pub political_communities: usize,
    pub postal_communities: usize,
    pub political_communities_without_postal_communities: usize,
    pub latest_update: Option<NaiveDate>,
}

/// Read-only queries over a built [`Model`].
#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    model: &'a Model,
}

impl<'a> QueryService<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    pub fn count_political_communities_in_canton(&self, canton_code: &str) -> Result<usize> {
        self.require_canton(canton_code)?;
        Ok(self.model.communities_in_canton(canton_code).count())
    }

    pub fn count_districts_in_canton(&self, canton_code: &str) -> Result<usize> {
        self.require_canton(canton_code)?;
        let districts: BTreeSet<&str> = self
            .model
            .communities_in_canton(canton_code)
            .map(|community| community.district_number.as_str())
            .collect();
        Ok(districts.len())
    }

    pub fn count_political_communities_in_district(&self, district_number: &str) -> Result<usize> {
        if self.model.district(district_number).is_none() {
            return Err(GeoError::not_found(EntityKind::District, district_number));
        }
        Ok(self.model.communities_in_district(district_number).count())
    }

    /// District names reachable from any postal community with this zip code,
    /// whatever its addition.
    pub fn districts_for_zip_code(&self, zip_code: &str) -> BTreeSet<String> {
        self.model
            .postal_communities_with_zip(zip_code)
            .flat_map(|postal| self.model.linked_political_communities(postal))
            .filter_map(|community| self.model.district_of(community))
            .map(|district| district.name.clone())
            .collect()
    }

    /// Most recent `last_update` among the political communities linked from
    /// postal communities with this name.
    pub fn last_update_of_political_community_by_postal_community_name(
        &self,
        name: &str,
    ) -> Option<NaiveDate> {
        self.communities_by_postal_name(name)
            .map(|community| community.last_update)
            .max()
    }

    /// Every `(political community number, last update)` candidate behind a
    /// postal community name, ordered by number.
    pub fn last_updates_by_postal_community_name(&self, name: &str) -> Vec<(String, NaiveDate)> {
        let candidates: BTreeSet<(&str, NaiveDate)> = self
            .communities_by_postal_name(name)
            .map(|community| (community.number.as_str(), community.last_update))
            .collect();
        candidates
            .into_iter()
            .map(|(number, date)| (number.to_string(), date))
            .collect()
    }

    pub fn count_cantons(&self) -> usize {
        self.model.cantons.len()
    }

    pub fn count_districts(&self) -> usize {
        self.model.districts.len()
    }

    pub fn count_political_communities(&self) -> usize {
        self.model.political_communities.len()
    }

    pub fn count_postal_communities(&self) -> usize {
        self.model.postal_communities.len()
    }

    pub fn count_political_communities_without_postal_communities(&self) -> usize {
        self.count_political_communities() - self.model.linked_community_count()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            cantons: self.count_cantons(),
            districts: self.count_districts(),
            political_communities: self.count_political_communities(),
            postal_communities: self.count_postal_communities(),
            political_communities_without_postal_communities: self
                .count_political_communities_without_postal_communities(),
            latest_update: self
                .model
                .political_communities()
                .map(|community| community.last_update)
                .max(),
        }
    }

    fn require_canton(&self, canton_code: &str) -> Result<()> {
        match self.model.canton(canton_code) {
            Some(_) => Ok(()),
            None => Err(GeoError::not_found(EntityKind::Canton, canton_code)),
        }
    }

    fn communities_by_postal_name(
        &self,
        name: &str,
    ) -> impl Iterator<Item = &'a PoliticalCommunity> + 'a {
        let model = self.model;
        model
            .postal_communities_named(name)
            .flat_map(move |postal| model.linked_political_communities(postal))
    }
}
