use serde::{Deserialize, Serialize};

use super::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "fileType")]
    pub file_type: String,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "datePosted")]
    pub date_posted: String,
    pub category: Category,
}
