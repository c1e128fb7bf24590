use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canton {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct District {
    pub number: String,
    pub name: String,
}

/// A municipality. Canton and district are referenced by their natural keys
/// and always resolve inside the owning [`Model`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoliticalCommunity {
    pub number: String,
    pub name: String,
    pub short_name: String,
    pub last_update: NaiveDate,
    pub canton_code: String,
    pub district_number: String,
}

/// Composite key of a postal community. The addition tells apart postal
/// communities that share a base zip code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostalKey {
    pub zip_code: String,
    pub zip_code_addition: String,
}

impl PostalKey {
    pub fn new(zip_code: impl Into<String>, zip_code_addition: impl Into<String>) -> Self {
        Self {
            zip_code: zip_code.into(),
            zip_code_addition: zip_code_addition.into(),
        }
    }
}

impl fmt::Display for PostalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zip_code_addition.is_empty() {
            write!(f, "{}", self.zip_code)
        } else {
            write!(f, "{}/{}", self.zip_code, self.zip_code_addition)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCommunity {
    pub zip_code: String,
    pub zip_code_addition: String,
    pub name: String,
    pub political_community_numbers: BTreeSet<String>,
}

impl PostalCommunity {
    pub fn key(&self) -> PostalKey {
        PostalKey::new(self.zip_code.clone(), self.zip_code_addition.clone())
    }
}

/// Normalized, immutable snapshot of cantons, districts, political and postal
/// communities. Only `ModelBuilder` creates one; afterwards it is read-only and
/// can be shared across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    pub(crate) cantons: BTreeMap<String, Canton>,
    pub(crate) districts: BTreeMap<String, District>,
    pub(crate) political_communities: BTreeMap<String, PoliticalCommunity>,
    pub(crate) postal_communities: BTreeMap<PostalKey, PostalCommunity>,

    // join indexes
    pub(crate) communities_by_canton: BTreeMap<String, BTreeSet<String>>,
    pub(crate) communities_by_district: BTreeMap<String, BTreeSet<String>>,
    pub(crate) postal_by_zip: BTreeMap<String, BTreeSet<PostalKey>>,
    pub(crate) postal_by_name: BTreeMap<String, BTreeSet<PostalKey>>,
    pub(crate) postal_by_community: BTreeMap<String, BTreeSet<PostalKey>>,
}

impl Model {
    pub fn cantons(&self) -> impl Iterator<Item = &Canton> {
        self.cantons.values()
    }

    pub fn districts(&self) -> impl Iterator<Item = &District> {
        self.districts.values()
    }

    pub fn political_communities(&self) -> impl Iterator<Item = &PoliticalCommunity> {
        self.political_communities.values()
    }

    pub fn postal_communities(&self) -> impl Iterator<Item = &PostalCommunity> {
        self.postal_communities.values()
    }

    pub fn canton(&self, code: &str) -> Option<&Canton> {
        self.cantons.get(code)
    }

    pub fn district(&self, number: &str) -> Option<&District> {
        self.districts.get(number)
    }

    pub fn political_community(&self, number: &str) -> Option<&PoliticalCommunity> {
        self.political_communities.get(number)
    }

    pub fn postal_community(&self, key: &PostalKey) -> Option<&PostalCommunity> {
        self.postal_communities.get(key)
    }

    pub fn canton_of(&self, community: &PoliticalCommunity) -> Option<&Canton> {
        self.cantons.get(&community.canton_code)
    }

    pub fn district_of(&self, community: &PoliticalCommunity) -> Option<&District> {
        self.districts.get(&community.district_number)
    }

    /// Political communities a postal community overlaps, ordered by number.
    pub fn linked_political_communities<'a>(
        &'a self,
        postal: &'a PostalCommunity,
    ) -> impl Iterator<Item = &'a PoliticalCommunity> + 'a {
        postal
            .political_community_numbers
            .iter()
            .filter_map(move |number| self.political_communities.get(number))
    }

    /// Postal communities referencing the given political community number.
    pub fn postal_communities_of<'a>(
        &'a self,
        number: &str,
    ) -> impl Iterator<Item = &'a PostalCommunity> + 'a {
        self.resolve_postal(self.postal_by_community.get(number))
    }

    pub fn postal_communities_with_zip<'a>(
        &'a self,
        zip_code: &str,
    ) -> impl Iterator<Item = &'a PostalCommunity> + 'a {
        self.resolve_postal(self.postal_by_zip.get(zip_code))
    }

    pub fn postal_communities_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a PostalCommunity> + 'a {
        self.resolve_postal(self.postal_by_name.get(name))
    }

    pub fn communities_in_canton<'a>(
        &'a self,
        code: &str,
    ) -> impl Iterator<Item = &'a PoliticalCommunity> + 'a {
        self.resolve_communities(self.communities_by_canton.get(code))
    }

    pub fn communities_in_district<'a>(
        &'a self,
        number: &str,
    ) -> impl Iterator<Item = &'a PoliticalCommunity> + 'a {
        self.resolve_communities(self.communities_by_district.get(number))
    }

    /// Number of distinct political communities referenced by at least one
    /// postal community.
    pub fn linked_community_count(&self) -> usize {
        self.postal_by_community.len()
    }

    pub fn snapshot(&self) -> ModelSnapshot<'_> {
        ModelSnapshot {
            cantons: self.cantons.values().collect(),
            districts: self.districts.values().collect(),
            political_communities: self.political_communities.values().collect(),
            postal_communities: self.postal_communities.values().collect(),
        }
    }

    fn resolve_postal<'a>(
        &'a self,
        keys: Option<&'a BTreeSet<PostalKey>>,
    ) -> impl Iterator<Item = &'a PostalCommunity> + 'a {
        keys.into_iter()
            .flatten()
            .filter_map(move |key| self.postal_communities.get(key))
    }

    fn resolve_communities<'a>(
        &'a self,
        numbers: Option<&'a BTreeSet<String>>,
    ) -> impl Iterator<Item = &'a PoliticalCommunity> + 'a {
        numbers
            .into_iter()
            .flatten()
            .filter_map(move |number| self.political_communities.get(number))
    }
}

/// Serializable view of a [`Model`]; postal keys are composite, so every set
/// is flattened into a list.
#[derive(Debug, Serialize)]
pub struct ModelSnapshot<'a> {
    pub cantons: Vec<&'a Canton>,
    pub districts: Vec<&'a District>,
    pub political_communities: Vec<&'a PoliticalCommunity>,
    pub postal_communities: Vec<&'a PostalCommunity>,
}
