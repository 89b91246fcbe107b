use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::library::LibraryError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "font_category_enum")]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[sea_orm(string_value = "serif")]
    Serif,
    #[sea_orm(string_value = "sans-serif")]
    SansSerif,
    #[sea_orm(string_value = "monospace")]
    Monospace,
    #[sea_orm(string_value = "script")]
    Script,
    #[sea_orm(string_value = "display")]
    Display,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Serif => "serif",
            Category::SansSerif => "sans-serif",
            Category::Monospace => "monospace",
            Category::Script => "script",
            Category::Display => "display",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serif" => Ok(Category::Serif),
            "sans-serif" => Ok(Category::SansSerif),
            "monospace" => Ok(Category::Monospace),
            "script" => Ok(Category::Script),
            "display" => Ok(Category::Display),
            "" => Err(LibraryError::validation("category is required")),
            other => Err(LibraryError::validation(format!("unknown category '{other}'"))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "font_license_enum")]
#[serde(rename_all = "lowercase")]
pub enum License {
    #[sea_orm(string_value = "free")]
    Free,
    #[sea_orm(string_value = "commercial")]
    Commercial,
    #[sea_orm(string_value = "unknown")]
    Unknown,
}

impl License {
    pub fn as_str(&self) -> &'static str {
        match self {
            License::Free => "free",
            License::Commercial => "commercial",
            License::Unknown => "unknown",
        }
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for License {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(License::Free),
            "commercial" => Ok(License::Commercial),
            "unknown" => Ok(License::Unknown),
            other => Err(LibraryError::validation(format!("unknown license '{other}'"))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "font_format_enum")]
#[serde(rename_all = "UPPERCASE")]
pub enum FontFormat {
    #[sea_orm(string_value = "TTF")]
    Ttf,
    #[sea_orm(string_value = "OTF")]
    Otf,
    #[sea_orm(string_value = "WOFF")]
    Woff,
    #[sea_orm(string_value = "WOFF2")]
    Woff2,
}

impl FontFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::Ttf => "TTF",
            FontFormat::Otf => "OTF",
            FontFormat::Woff => "WOFF",
            FontFormat::Woff2 => "WOFF2",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontFormat {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TTF" => Ok(FontFormat::Ttf),
            "OTF" => Ok(FontFormat::Otf),
            "WOFF" => Ok(FontFormat::Woff),
            "WOFF2" => Ok(FontFormat::Woff2),
            other => Err(LibraryError::validation(format!("unknown font format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "device_type_enum")]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[sea_orm(string_value = "desktop")]
    Desktop,
    #[sea_orm(string_value = "mobile")]
    Mobile,
    #[sea_orm(string_value = "web")]
    Web,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Web => "web",
        };
        f.write_str(s)
    }
}

impl FromStr for DeviceType {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(DeviceType::Desktop),
            "mobile" => Ok(DeviceType::Mobile),
            "web" => Ok(DeviceType::Web),
            other => Err(LibraryError::validation(format!("unknown device type '{other}'"))),
        }
    }
}
