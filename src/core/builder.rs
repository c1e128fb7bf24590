use crate::domain::model::{Canton, District, Model, PoliticalCommunity, PostalCommunity, PostalKey};
use crate::domain::ports::IntegrityPolicy;
use crate::domain::records::{PoliticalCommunityRow, PostalCommunityRow};
use crate::utils::error::{EntityKind, GeoError, Result};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Counters collected while normalizing the raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub political_rows: usize,
    pub postal_rows: usize,
    pub skipped_political_rows: usize,
    pub skipped_postal_rows: usize,
    pub duplicate_political_numbers: usize,
    pub unresolved_postal_links: usize,
    pub name_conflicts: usize,
}

impl BuildReport {
    pub fn has_gaps(&self) -> bool {
        self.skipped_political_rows > 0
            || self.skipped_postal_rows > 0
            || self.duplicate_political_numbers > 0
            || self.unresolved_postal_links > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    policy: IntegrityPolicy,
}

impl ModelBuilder {
    pub fn new(policy: IntegrityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> IntegrityPolicy {
        self.policy
    }

    pub fn build(
        &self,
        political_rows: &[PoliticalCommunityRow],
        postal_rows: &[PostalCommunityRow],
    ) -> Result<Model> {
        self.build_with_report(political_rows, postal_rows)
            .map(|(model, _)| model)
    }

    pub fn build_with_report(
        &self,
        political_rows: &[PoliticalCommunityRow],
        postal_rows: &[PostalCommunityRow],
    ) -> Result<(Model, BuildReport)> {
        let mut report = BuildReport {
            political_rows: political_rows.len(),
            postal_rows: postal_rows.len(),
            ..BuildReport::default()
        };
        let mut model = Model::default();

        let usable = self.usable_political_rows(political_rows, &mut report)?;
        self.collect_cantons_and_districts(&usable, &mut model, &mut report);
        self.collect_political_communities(&usable, &mut model);
        self.collect_postal_communities(postal_rows, &mut model, &mut report)?;

        tracing::info!(
            "🏗️ Built model: {} cantons, {} districts, {} political communities, {} postal communities",
            model.cantons.len(),
            model.districts.len(),
            model.political_communities.len(),
            model.postal_communities.len()
        );
        if report.has_gaps() {
            tracing::warn!("🔶 Source data has integrity gaps: {:?}", report);
        }

        Ok((model, report))
    }

    /// Rows lacking one of the keys a community is linked by cannot be placed
    /// in the model at all. Identical repeated rows collapse silently; a
    /// repeated number with different attributes keeps its first row.
    fn usable_political_rows<'a>(
        &self,
        rows: &'a [PoliticalCommunityRow],
        report: &mut BuildReport,
    ) -> Result<Vec<&'a PoliticalCommunityRow>> {
        let mut usable = Vec::with_capacity(rows.len());
        let mut seen: BTreeMap<&str, &PoliticalCommunityRow> = BTreeMap::new();
        for row in rows {
            let missing = [
                ("number", &row.number),
                ("canton code", &row.canton_code),
                ("district number", &row.district_number),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = missing {
                self.gap(
                    GeoError::integrity_gap(
                        EntityKind::PoliticalCommunity,
                        row.name.clone(),
                        format!("missing {}", field),
                    ),
                    &mut report.skipped_political_rows,
                )?;
            } else if let Some(first) = seen.get(row.number.as_str()) {
                if *first != row {
                    self.gap(
                        GeoError::integrity_gap(
                            EntityKind::PoliticalCommunity,
                            row.number.clone(),
                            "number appears more than once with different attributes",
                        ),
                        &mut report.duplicate_political_numbers,
                    )?;
                }
            } else {
                seen.insert(row.number.as_str(), row);
                usable.push(row);
            }
        }
        Ok(usable)
    }

    fn collect_cantons_and_districts(
        &self,
        rows: &[&PoliticalCommunityRow],
        model: &mut Model,
        report: &mut BuildReport,
    ) {
        for row in rows {
            match model.cantons.entry(row.canton_code.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Canton {
                        code: row.canton_code.clone(),
                        name: row.canton_name.clone(),
                    });
                }
                Entry::Occupied(existing) if existing.get().name != row.canton_name => {
                    tracing::warn!(
                        "🔶 Canton {} named both '{}' and '{}', keeping the first",
                        row.canton_code,
                        existing.get().name,
                        row.canton_name
                    );
                    report.name_conflicts += 1;
                }
                Entry::Occupied(_) => {}
            }

            match model.districts.entry(row.district_number.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(District {
                        number: row.district_number.clone(),
                        name: row.district_name.clone(),
                    });
                }
                Entry::Occupied(existing) if existing.get().name != row.district_name => {
                    tracing::warn!(
                        "🔶 District {} named both '{}' and '{}', keeping the first",
                        row.district_number,
                        existing.get().name,
                        row.district_name
                    );
                    report.name_conflicts += 1;
                }
                Entry::Occupied(_) => {}
            }
        }
        tracing::debug!(
            "Derived {} cantons and {} districts",
            model.cantons.len(),
            model.districts.len()
        );
    }

    fn collect_political_communities(&self, rows: &[&PoliticalCommunityRow], model: &mut Model) {
        for row in rows {
            model.political_communities.insert(
                row.number.clone(),
                PoliticalCommunity {
                    number: row.number.clone(),
                    name: row.name.clone(),
                    short_name: row.short_name.clone(),
                    last_update: row.last_update,
                    canton_code: row.canton_code.clone(),
                    district_number: row.district_number.clone(),
                },
            );
            model
                .communities_by_canton
                .entry(row.canton_code.clone())
                .or_default()
                .insert(row.number.clone());
            model
                .communities_by_district
                .entry(row.district_number.clone())
                .or_default()
                .insert(row.number.clone());
        }
    }

    fn collect_postal_communities(
        &self,
        rows: &[PostalCommunityRow],
        model: &mut Model,
        report: &mut BuildReport,
    ) -> Result<()> {
        // 同一個 (zip, addition) 的多筆資料合併成一個郵遞區
        let mut groups: BTreeMap<PostalKey, Vec<&PostalCommunityRow>> = BTreeMap::new();
        for row in rows {
            if row.zip_code.trim().is_empty() {
                self.gap(
                    GeoError::integrity_gap(EntityKind::PostalCommunity, row.name.clone(), "missing zip code"),
                    &mut report.skipped_postal_rows,
                )?;
                continue;
            }
            groups
                .entry(PostalKey::new(row.zip_code.clone(), row.zip_code_addition.clone()))
                .or_default()
                .push(row);
        }

        for (key, group) in groups {
            let first = group[0];
            let mut numbers = BTreeSet::new();

            for row in &group {
                if row.name != first.name {
                    tracing::warn!(
                        "🔶 Postal community {} named both '{}' and '{}', keeping the first",
                        key,
                        first.name,
                        row.name
                    );
                    report.name_conflicts += 1;
                }

                if model
                    .political_communities
                    .contains_key(&row.political_community_number)
                {
                    numbers.insert(row.political_community_number.clone());
                } else {
                    self.gap(
                        GeoError::integrity_gap(
                            EntityKind::PostalCommunity,
                            key.to_string(),
                            format!(
                                "political community {} does not exist",
                                row.political_community_number
                            ),
                        ),
                        &mut report.unresolved_postal_links,
                    )?;
                }
            }

            for number in &numbers {
                model
                    .postal_by_community
                    .entry(number.clone())
                    .or_default()
                    .insert(key.clone());
            }
            model
                .postal_by_zip
                .entry(key.zip_code.clone())
                .or_default()
                .insert(key.clone());
            model
                .postal_by_name
                .entry(first.name.clone())
                .or_default()
                .insert(key.clone());
            model.postal_communities.insert(
                key.clone(),
                PostalCommunity {
                    zip_code: key.zip_code,
                    zip_code_addition: key.zip_code_addition,
                    name: first.name.clone(),
                    political_community_numbers: numbers,
                },
            );
        }
        Ok(())
    }

    /// Applies the integrity policy: strict mode fails, lenient mode counts
    /// and logs.
    fn gap(&self, error: GeoError, counter: &mut usize) -> Result<()> {
        match self.policy {
            IntegrityPolicy::Strict => Err(error),
            IntegrityPolicy::Lenient => {
                tracing::warn!("🔶 Skipping: {}", error);
                *counter += 1;
                Ok(())
            }
        }
    }
}
