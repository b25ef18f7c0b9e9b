use serde::{Deserialize, Serialize};
use serde_json::Value;

// Raw delivery API shapes. Items and assets stay as raw JSON until the mapper
// parses them one by one, so a single malformed entry cannot sink the collection.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub fields: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file: Option<AssetFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFile {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: String,
    pub description: String,
    pub image: String,
    pub category: Option<String>,
    pub registration_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PastEvent {
    pub id: String,
    pub title: String,
    pub date: Option<String>,
    pub location: String,
    pub description: String,
    pub images: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub category: Option<String>,
}
