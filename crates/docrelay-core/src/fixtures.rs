//! Fixture data served when the backend is unreachable.
//!
//! List endpoints never fail; this is their floor. Results carrying this
//! data are marked with `ListSource::Fixture` so the substitution stays
//! observable.

use serde_json::Value;

use crate::models::{Category, DocumentRecord, NewsItem, User};

pub fn sample_categories() -> Vec<Category> {
    vec![
        category("cat1", "Reports"),
        category("cat2", "Presentations"),
        category("cat3", "Contracts"),
        category("cat4", "Policies"),
    ]
}

pub fn sample_documents() -> Vec<DocumentRecord> {
    vec![
        DocumentRecord {
            id: 1,
            title: "Annual Report 2023".to_string(),
            description: "Company annual financial report".to_string(),
            file_type: "application/pdf".to_string(),
            file_url: "/placeholder.svg?height=300&width=200".to_string(),
            date_posted: "2023-12-15".to_string(),
            category: category("cat1", "Reports"),
        },
        DocumentRecord {
            id: 2,
            title: "Q1 Presentation".to_string(),
            description: "First quarter results presentation".to_string(),
            file_type: "application/vnd.ms-powerpoint".to_string(),
            file_url: "/placeholder.svg?height=300&width=200".to_string(),
            date_posted: "2024-01-20".to_string(),
            category: category("cat2", "Presentations"),
        },
        DocumentRecord {
            id: 3,
            title: "Vendor Agreement".to_string(),
            description: "Standard vendor contract template".to_string(),
            file_type: "application/pdf".to_string(),
            file_url: "/placeholder.svg?height=300&width=200".to_string(),
            date_posted: "2024-02-05".to_string(),
            category: category("cat3", "Contracts"),
        },
    ]
}

pub fn sample_news() -> Vec<NewsItem> {
    vec![
        news(1, "Company Expansion Announced", "We are excited to announce our expansion into new markets...", "2024-03-01"),
        news(2, "New Product Launch", "Introducing our latest product innovation...", "2024-02-15"),
        news(3, "Annual Conference Dates", "Save the date for our annual industry conference...", "2024-01-10"),
    ]
}

pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
        },
        User {
            id: 2,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        },
    ]
}

pub fn sample_documents_json() -> Vec<Value> {
    to_values(&sample_documents())
}

pub fn sample_categories_json() -> Vec<Value> {
    to_values(&sample_categories())
}

pub fn sample_news_json() -> Vec<Value> {
    to_values(&sample_news())
}

pub fn sample_users_json() -> Vec<Value> {
    to_values(&sample_users())
}

fn to_values<T: serde::Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn news(id: i64, title: &str, description: &str, date_posted: &str) -> NewsItem {
    NewsItem {
        id,
        title: title.to_string(),
        description: description.to_string(),
        date_posted: date_posted.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_documents_serialize_with_backend_field_names() {
        let documents = sample_documents_json();
        assert_eq!(documents.len(), 3);
        let first = &documents[0];
        assert!(first.get("fileType").is_some());
        assert!(first.get("datePosted").is_some());
        assert_eq!(
            first.pointer("/category/id").and_then(Value::as_str),
            Some("cat1")
        );
    }
}
