use serde::{Deserialize, Serialize};

/// Series metadata used to label history entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeriesInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
}
