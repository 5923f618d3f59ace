//! Ads dataset formatting
//!
//! Ad sheets in the wild disagree on header casing ("Title" vs "title",
//! "ImageUrl" vs "image"), so each logical ad field carries an explicit
//! ordered list of candidate headers and the first present, non-blank match
//! wins. The alias table is configuration, not inline conditionals.

use serde::Serialize;

use crate::data::{Dataset, Record};

/// A formatted ad, as served by `GET /api/ads`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub title: String,
    pub message: String,
    pub image_url: String,
    pub action_link: String,
    pub action_text: String,
}

/// Ordered candidate headers per logical ad field, first match wins
#[derive(Debug, Clone)]
pub struct AdAliases {
    pub title: Vec<&'static str>,
    pub message: Vec<&'static str>,
    pub image_url: Vec<&'static str>,
    pub action_link: Vec<&'static str>,
    pub action_text: Vec<&'static str>,
}

impl Default for AdAliases {
    fn default() -> Self {
        Self {
            title: vec!["Title", "title"],
            message: vec!["Message", "message", "Description", "description"],
            image_url: vec!["ImageUrl", "imageUrl", "Image", "image"],
            action_link: vec!["ActionLink", "actionLink", "Link", "link", "Url", "url"],
            action_text: vec!["ActionText", "actionText", "ButtonText", "buttonText"],
        }
    }
}

/// Returns the first candidate field that is present and non-blank.
fn first_match(record: &Record, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|name| {
        record
            .get(*name)
            .and_then(|v| v.as_str())
            .filter(|value| !value.is_empty())
            .map(String::from)
    })
}

/// Placeholder image URL used when an ad row carries no image.
fn placeholder_image(title: &str, index: usize) -> String {
    let label = if title.is_empty() {
        format!("Ad+{}", index + 1)
    } else {
        title.replace(' ', "+")
    };
    format!("https://placehold.co/600x400?text={label}")
}

/// Formats every record of the ads dataset into an `Ad`, in record order.
pub fn format_ads(dataset: &Dataset, aliases: &AdAliases) -> Vec<Ad> {
    dataset
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let title = first_match(record, &aliases.title).unwrap_or_default();
            let image_url = first_match(record, &aliases.image_url)
                .unwrap_or_else(|| placeholder_image(&title, index));
            Ad {
                message: first_match(record, &aliases.message).unwrap_or_default(),
                action_link: first_match(record, &aliases.action_link).unwrap_or_default(),
                action_text: first_match(record, &aliases.action_text).unwrap_or_default(),
                image_url,
                title,
            }
        })
        .collect()
}
