use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 一筆政治社區 (Gemeinde) 原始資料，州與區的資訊以非正規化方式重複出現
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliticalCommunityRow {
    pub number: String,
    pub name: String,
    pub short_name: String,
    pub canton_code: String,
    pub canton_name: String,
    pub district_number: String,
    pub district_name: String,
    pub last_update: NaiveDate,
}

/// 一筆郵遞區資料；同一個 (zip_code, zip_code_addition) 可能出現多次，
/// 每次指向不同的政治社區
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCommunityRow {
    pub zip_code: String,
    pub zip_code_addition: String,
    pub name: String,
    pub political_community_number: String,
}
