use serde::{Deserialize, Serialize};

use crate::models::ParsedPlayData;
use crate::services::play_parser::parse_play_url;

/// Subset of a `mac_vod` row consumed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VodRecord {
    pub vod_id: i64,
    pub vod_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS` style timestamp, compared lexically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_pic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_play_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vod_play_url: Option<String>,
}

impl VodRecord {
    /// Decode the raw play fields of this row
    pub fn play_data(&self) -> ParsedPlayData {
        parse_play_url(self.vod_play_from.as_deref(), self.vod_play_url.as_deref())
    }

    /// Only published rows are listed
    pub fn is_published(&self) -> bool {
        self.vod_status == Some(1)
    }
}

/// Catalog category (`mac_type`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub type_id: i64,
    pub type_name: String,
    pub type_en: String,
    /// 0 for primary categories
    pub type_pid: i64,
    pub type_sort: i64,
    pub type_status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Category>>,
}

/// Categories response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
    pub total: usize,
}

/// Query parameters for the slug endpoint
#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
}

/// Slug response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugResponse {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One page of catalog rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedVideos {
    pub page: u32,
    pub results: Vec<VodRecord>,
    pub total_pages: u32,
    pub total_results: usize,
}

fn default_latest_limit() -> usize {
    10
}

/// Rows to group for the home page listing
#[derive(Debug, Deserialize)]
pub struct LatestVideosRequest {
    #[serde(default = "default_latest_limit")]
    pub limit: usize,
    #[serde(default)]
    pub records: Vec<VodRecord>,
}
