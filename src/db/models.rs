use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::enums::{Category, DeviceType, FontFormat, License};
use crate::library::{LibraryError, Result};

/// Metadata of one registered font asset.
/// Corresponds to the `fonts` table / the `fonts` key of the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub name: String,
    pub family: String,
    pub style: String,
    pub weight: u32,
    pub format: FontFormat,
    pub size: u64,
    pub date_installed: DateTime<Utc>,
    pub path: String,
    pub license: License,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
}

/// Payload for registering a font. Enumerated fields arrive as text and are
/// checked here, so an invalid value never reaches a store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontDraft {
    pub name: String,
    pub category: String,
    pub path: String,
    pub family: Option<String>,
    pub style: Option<String>,
    pub weight: Option<u32>,
    pub format: Option<String>,
    pub size: Option<u64>,
    pub license: Option<String>,
    pub date_installed: Option<DateTime<Utc>>,
    pub device_id: Option<String>,
    pub preview_text: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Weight and size are stored in signed SQL columns (`INTEGER`, `BIGINT`).
fn check_storable(weight: Option<u32>, size: Option<u64>) -> Result<()> {
    if weight.is_some_and(|w| i32::try_from(w).is_err()) {
        return Err(LibraryError::validation(format!("weight must be at most {}", i32::MAX)));
    }
    if size.is_some_and(|s| i64::try_from(s).is_err()) {
        return Err(LibraryError::validation(format!("size must be at most {}", i64::MAX)));
    }
    Ok(())
}

impl FontDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>, path: impl Into<String>) -> Self {
        FontDraft {
            name: name.into(),
            category: category.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Validates the draft and turns it into a record with a fresh identifier.
    pub fn into_font(self, owner_id: &str, now: DateTime<Utc>) -> Result<Font> {
        require("name", &self.name)?;
        require("path", &self.path)?;
        check_storable(self.weight, self.size)?;
        let category: Category = self.category.parse()?;
        let license = match non_blank(self.license) {
            Some(l) => l.parse()?,
            None => License::Free,
        };
        let format = match non_blank(self.format) {
            Some(f) => f.parse()?,
            None => FontFormat::Ttf,
        };

        Ok(Font {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            device_id: non_blank(self.device_id),
            family: non_blank(self.family).unwrap_or_else(|| self.name.clone()),
            style: non_blank(self.style).unwrap_or_else(|| "Regular".to_string()),
            weight: self.weight.unwrap_or(400),
            format,
            size: self.size.unwrap_or(0),
            date_installed: self.date_installed.unwrap_or(now),
            path: self.path,
            license,
            category,
            preview_text: non_blank(self.preview_text),
            name: self.name,
        })
    }
}

/// Partial update of a font. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontPatch {
    pub name: Option<String>,
    pub family: Option<String>,
    pub style: Option<String>,
    pub weight: Option<u32>,
    pub format: Option<String>,
    pub size: Option<u64>,
    pub path: Option<String>,
    pub license: Option<String>,
    pub category: Option<String>,
    pub device_id: Option<String>,
    pub preview_text: Option<String>,
}

impl FontPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.family.is_none()
            && self.style.is_none()
            && self.weight.is_none()
            && self.format.is_none()
            && self.size.is_none()
            && self.path.is_none()
            && self.license.is_none()
            && self.category.is_none()
            && self.device_id.is_none()
            && self.preview_text.is_none()
    }

    /// Applies the patch to `font`. Everything is validated before the first
    /// field is written, so a rejected patch leaves the record unchanged.
    pub fn apply(self, font: &mut Font) -> Result<()> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(path) = &self.path {
            require("path", path)?;
        }
        check_storable(self.weight, self.size)?;
        let category = self.category.as_deref().map(str::parse::<Category>).transpose()?;
        let license = self.license.as_deref().map(str::parse::<License>).transpose()?;
        let format = self.format.as_deref().map(str::parse::<FontFormat>).transpose()?;

        if let Some(name) = self.name {
            font.name = name;
        }
        if let Some(family) = self.family {
            font.family = family;
        }
        if let Some(style) = self.style {
            font.style = style;
        }
        if let Some(weight) = self.weight {
            font.weight = weight;
        }
        if let Some(format) = format {
            font.format = format;
        }
        if let Some(size) = self.size {
            font.size = size;
        }
        if let Some(path) = self.path {
            font.path = path;
        }
        if let Some(license) = license {
            font.license = license;
        }
        if let Some(category) = category {
            font.category = category;
        }
        if let Some(device_id) = self.device_id {
            font.device_id = non_blank(Some(device_id));
        }
        if let Some(preview_text) = self.preview_text {
            font.preview_text = non_blank(Some(preview_text));
        }
        Ok(())
    }
}

/// A named, user-owned grouping of font ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub font_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub color: String,
}

impl Collection {
    pub fn new(
        owner_id: &str,
        name: &str,
        description: &str,
        color: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::validation("collection name must not be empty"));
        }
        Ok(Collection {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            font_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            color: color.to_string(),
        })
    }

    pub fn contains(&self, font_id: &str) -> bool {
        self.font_ids.iter().any(|id| id == font_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub font_ids: Option<Vec<String>>,
}

impl CollectionPatch {
    /// Applies the patch and refreshes `updated_at`, even when nothing else changed.
    pub fn apply(self, collection: &mut Collection, now: DateTime<Utc>) -> Result<()> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(LibraryError::validation("collection name must not be empty"));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };

        if let Some(name) = name {
            collection.name = name;
        }
        if let Some(description) = self.description {
            collection.description = description;
        }
        if let Some(color) = self.color {
            collection.color = color;
        }
        if let Some(font_ids) = self.font_ids {
            collection.font_ids = dedup_preserving_order(font_ids);
        }
        collection.updated_at = now;
        Ok(())
    }
}

pub(crate) fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// A device a user registers fonts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDevice {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl NewDevice {
    pub fn into_device(self, owner_id: &str) -> Result<Device> {
        require("device name", &self.name)?;
        Ok(Device {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: self.name.trim().to_string(),
            device_type: self.device_type,
            last_sync: None,
        })
    }
}
