use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "datePosted")]
    pub date_posted: String,
}
