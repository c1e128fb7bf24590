use crate::core::builder::BuildReport;
use crate::core::query::QueryService;
use crate::utils::error::Result;
use clap::Subcommand;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Entity counts and the most recent community update
    Summary,
    /// Number of cantons
    Cantons,
    /// Number of political communities in a canton
    CantonCommunities { code: String },
    /// Number of districts in a canton
    CantonDistricts { code: String },
    /// Number of political communities in a district
    DistrictCommunities { number: String },
    /// District names reachable from a zip code
    ZipDistricts { zip_code: String },
    /// Last update of the political community behind a postal community name
    LastUpdate {
        name: String,
        /// List every candidate instead of the most recent one
        #[arg(long)]
        all: bool,
    },
    /// Number of political communities no postal community refers to
    WithoutPostal,
    /// Build the model and write it to the export path
    Export,
}

/// Result of a command in both renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub json: Value,
}

impl CommandOutput {
    fn count(label: &str, count: usize) -> Self {
        Self {
            text: format!("{}: {}", label, count),
            json: json!({ "count": count }),
        }
    }

    pub fn render(&self, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(&self.json)?)
        } else {
            Ok(self.text.clone())
        }
    }
}

pub fn execute(command: &Command, queries: &QueryService<'_>, report: &BuildReport) -> Result<CommandOutput> {
    let output = match command {
        Command::Summary => {
            let summary = queries.summary();
            let latest = summary
                .latest_update
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string());
            CommandOutput {
                text: format!(
                    "Cantons: {}\nDistricts: {}\nPolitical communities: {}\nPostal communities: {}\n\
                     Political communities without postal communities: {}\nLatest update: {}",
                    summary.cantons,
                    summary.districts,
                    summary.political_communities,
                    summary.postal_communities,
                    summary.political_communities_without_postal_communities,
                    latest
                ),
                json: json!({ "summary": summary, "report": report }),
            }
        }
        Command::Cantons => CommandOutput::count("Cantons", queries.count_cantons()),
        Command::CantonCommunities { code } => CommandOutput::count(
            &format!("Political communities in canton {}", code),
            queries.count_political_communities_in_canton(code)?,
        ),
        Command::CantonDistricts { code } => CommandOutput::count(
            &format!("Districts in canton {}", code),
            queries.count_districts_in_canton(code)?,
        ),
        Command::DistrictCommunities { number } => CommandOutput::count(
            &format!("Political communities in district {}", number),
            queries.count_political_communities_in_district(number)?,
        ),
        Command::ZipDistricts { zip_code } => {
            let districts = queries.districts_for_zip_code(zip_code);
            let text = if districts.is_empty() {
                format!("No districts for zip code {}", zip_code)
            } else {
                districts.iter().cloned().collect::<Vec<_>>().join("\n")
            };
            CommandOutput {
                text,
                json: json!({ "zip_code": zip_code, "districts": districts }),
            }
        }
        Command::LastUpdate { name, all: false } => {
            let date = queries.last_update_of_political_community_by_postal_community_name(name);
            CommandOutput {
                text: match date {
                    Some(date) => date.to_string(),
                    None => format!("No political community found for '{}'", name),
                },
                json: json!({ "name": name, "last_update": date }),
            }
        }
        Command::LastUpdate { name, all: true } => {
            let candidates = queries.last_updates_by_postal_community_name(name);
            let text = if candidates.is_empty() {
                format!("No political community found for '{}'", name)
            } else {
                candidates
                    .iter()
                    .map(|(number, date)| format!("{} {}", number, date))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            let entries: Vec<Value> = candidates
                .iter()
                .map(|(number, date)| json!({ "number": number, "last_update": date }))
                .collect();
            CommandOutput {
                text,
                json: json!({ "name": name, "candidates": entries }),
            }
        }
        Command::WithoutPostal => CommandOutput::count(
            "Political communities without postal communities",
            queries.count_political_communities_without_postal_communities(),
        ),
        Command::Export => CommandOutput {
            text: format!(
                "Exported model ({} political communities, {} postal communities)",
                queries.count_political_communities(),
                queries.count_postal_communities()
            ),
            json: json!({ "exported": true, "report": report }),
        },
    };
    Ok(output)
}
