use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{Asset, Entry, EntryCollection, Event, GalleryItem, PastEvent};

pub const UNTITLED: &str = "Untitled";
pub const PLACEHOLDER_EVENT_IMAGE: &str = "/placeholder-event.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingId,
    NoFields,
    NotPublished { status: String },
    Malformed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub entry_id: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Mapped items plus the entries that were dropped and why.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { items: Vec::new(), skipped: Vec::new() }
    }
}

pub struct AssetIndex {
    by_id: HashMap<String, Asset>,
}

impl AssetIndex {
    /// Indexes assets by id; malformed or id-less assets are left out.
    pub fn new(raw: &[Value]) -> Self {
        let mut by_id = HashMap::new();
        for value in raw {
            match Asset::deserialize(value) {
                Ok(asset) if !asset.sys.id.is_empty() => {
                    by_id.insert(asset.sys.id.clone(), asset);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping malformed CMS asset: {}", e),
            }
        }
        Self { by_id }
    }

    /// Resolves a link (`{sys:{id}}`) or an inline asset (`{fields:{file:{url}}}`) to a usable URL.
    fn url(&self, value: &Value) -> Option<String> {
        let inline = value.pointer("/fields/file/url").and_then(Value::as_str);
        let raw = match inline {
            Some(url) => url.to_string(),
            None => {
                let id = value.pointer("/sys/id").and_then(Value::as_str)?;
                self.by_id.get(id)?.fields.file.as_ref()?.url.clone()
            }
        };
        Some(absolute_url(&raw)).filter(|u| !u.is_empty())
    }
}

/// Asset URLs come back protocol-relative (`//images...`).
pub fn absolute_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// Flattens a rich-text document to plain text; plain strings pass through.
pub fn rich_text(value: &Value) -> String {
    fn walk(node: &Value, out: &mut String) {
        if let Some(text) = node.get("value").and_then(Value::as_str) {
            out.push_str(text);
        }
        if let Some(children) = node.get("content").and_then(Value::as_array) {
            for child in children {
                walk(child, out);
            }
        }
    }

    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) => {
            let blocks = value.get("content").and_then(Value::as_array);
            let mut paragraphs = Vec::new();
            for block in blocks.into_iter().flatten() {
                let mut text = String::new();
                walk(block, &mut text);
                let text = text.trim().to_string();
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
            paragraphs.join("\n\n")
        }
        _ => String::new(),
    }
}

fn text(fields: &Value, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(fields: &Value, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn checked_fields(entry: &Entry) -> Result<(&str, &Value), SkipReason> {
    if entry.sys.id.is_empty() {
        return Err(SkipReason::MissingId);
    }
    if !entry.fields.is_object() {
        return Err(SkipReason::NoFields);
    }
    if let Some(status) = text(&entry.fields, "status") {
        if status != "Published" {
            return Err(SkipReason::NotPublished { status });
        }
    }
    Ok((entry.sys.id.as_str(), &entry.fields))
}

pub fn map_event(entry: &Entry, assets: &AssetIndex) -> Result<Event, SkipReason> {
    let (id, f) = checked_fields(entry)?;
    Ok(Event {
        id: id.to_string(),
        title: text(f, "title").unwrap_or_else(|| UNTITLED.to_string()),
        date: text(f, "date"),
        time: text(f, "time"),
        location: text(f, "location").unwrap_or_default(),
        description: f.get("description").map(rich_text).unwrap_or_default(),
        image: f
            .get("image")
            .and_then(|v| assets.url(v))
            .unwrap_or_else(|| PLACEHOLDER_EVENT_IMAGE.to_string()),
        category: text(f, "category"),
        registration_link: text(f, "registrationLink"),
    })
}

pub fn map_past_event(entry: &Entry, assets: &AssetIndex) -> Result<PastEvent, SkipReason> {
    let (id, f) = checked_fields(entry)?;
    let images = match f.get("images") {
        Some(Value::Array(list)) => list.iter().filter_map(|v| assets.url(v)).collect(),
        _ => f.get("image").and_then(|v| assets.url(v)).into_iter().collect(),
    };
    Ok(PastEvent {
        id: id.to_string(),
        title: text(f, "title").unwrap_or_else(|| UNTITLED.to_string()),
        date: text(f, "date"),
        location: text(f, "location").unwrap_or_default(),
        description: f.get("description").map(rich_text).unwrap_or_default(),
        images,
        highlights: string_list(f, "highlights"),
    })
}

pub fn map_gallery_item(entry: &Entry, assets: &AssetIndex) -> Result<GalleryItem, SkipReason> {
    let (id, f) = checked_fields(entry)?;
    Ok(GalleryItem {
        id: id.to_string(),
        title: text(f, "title").unwrap_or_else(|| UNTITLED.to_string()),
        url: f.get("image").and_then(|v| assets.url(v)).unwrap_or_default(),
        description: f.get("description").map(rich_text).unwrap_or_default(),
        category: text(f, "category"),
    })
}

pub fn map_all<T>(
    collection: &EntryCollection,
    map: impl Fn(&Entry, &AssetIndex) -> Result<T, SkipReason>,
) -> Listing<T> {
    let assets = AssetIndex::new(&collection.includes.assets);
    let mut listing = Listing::default();
    for raw in &collection.items {
        let entry = match Entry::deserialize(raw) {
            Ok(entry) => entry,
            Err(e) => {
                let entry_id = raw.pointer("/sys/id").map(|id| match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                tracing::warn!(entry_id = ?entry_id, "skipping malformed CMS entry: {}", e);
                listing.skipped.push(Skipped {
                    entry_id,
                    reason: SkipReason::Malformed { error: e.to_string() },
                });
                continue;
            }
        };
        match map(&entry, &assets) {
            Ok(item) => listing.items.push(item),
            Err(reason) => {
                tracing::warn!(entry_id = %entry.sys.id, ?reason, "skipping CMS entry");
                listing.skipped.push(Skipped {
                    entry_id: Some(entry.sys.id.clone()).filter(|id| !id.is_empty()),
                    reason,
                });
            }
        }
    }
    listing
}
