use serde::Deserialize;

use crate::db::enums::{Category, FontFormat, License};
use crate::db::models::Font;
use crate::library::Result;

/// Library filter: free-text match on name or family plus exact filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub license: Option<String>,
    pub format: Option<String>,
}

fn parse_filter<T: std::str::FromStr<Err = crate::library::LibraryError>>(
    value: &Option<String>,
) -> Result<Option<T>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

pub fn filter_fonts(fonts: Vec<Font>, query: &FontQuery) -> Result<Vec<Font>> {
    let category: Option<Category> = parse_filter(&query.category)?;
    let license: Option<License> = parse_filter(&query.license)?;
    let format: Option<FontFormat> = parse_filter(&query.format)?;
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    Ok(fonts
        .into_iter()
        .filter(|f| match &needle {
            Some(n) => f.name.to_lowercase().contains(n) || f.family.to_lowercase().contains(n),
            None => true,
        })
        .filter(|f| category.is_none_or(|c| f.category == c))
        .filter(|f| license.is_none_or(|l| f.license == l))
        .filter(|f| format.is_none_or(|fmt| f.format == fmt))
        .collect())
}
