use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::enums::{Category, License};
use crate::db::models::Font;

/// Fonts installed within this many days count as recently added.
pub const RECENT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontStats {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_license: BTreeMap<License, usize>,
    pub recently_added: usize,
}

/// Derives the dashboard figures from a font list. Nothing is cached; callers
/// recompute after every mutation.
pub fn compute(fonts: &[Font], now: DateTime<Utc>) -> FontStats {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut stats = FontStats {
        total: fonts.len(),
        ..Default::default()
    };

    for font in fonts {
        *stats.by_category.entry(font.category).or_insert(0) += 1;
        *stats.by_license.entry(font.license).or_insert(0) += 1;
        if font.date_installed > cutoff {
            stats.recently_added += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::FontDraft;

    fn font(category: &str, license: &str, installed: DateTime<Utc>) -> Font {
        let mut draft = FontDraft::new("Sample", category, "/sample.ttf");
        draft.license = Some(license.to_string());
        draft.date_installed = Some(installed);
        draft.into_font("u", installed).unwrap()
    }

    #[test]
    fn test_empty_list_is_all_zero() {
        let stats = compute(&[], Utc::now());
        assert_eq!(stats, FontStats::default());
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({ "total": 0, "byCategory": {}, "byLicense": {}, "recentlyAdded": 0 })
        );
    }

    #[test]
    fn test_counts_by_category_and_license() {
        let now = Utc::now();
        let fonts = vec![
            font("serif", "free", now),
            font("serif", "commercial", now),
            font("monospace", "free", now),
        ];
        let stats = compute(&fonts, now);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category[&Category::Serif], 2);
        assert_eq!(stats.by_category[&Category::Monospace], 1);
        assert!(!stats.by_category.contains_key(&Category::Script));
        assert_eq!(stats.by_license[&License::Free], 2);
        assert_eq!(stats.by_license[&License::Commercial], 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byCategory"]["serif"], 2);
        assert_eq!(json["byLicense"]["commercial"], 1);
    }

    #[test]
    fn test_recent_window_is_strict() {
        let now = Utc::now();
        let fonts = vec![
            font("serif", "free", now - Duration::days(30)),
            font("serif", "free", now - Duration::days(30) + Duration::seconds(1)),
            font("serif", "free", now - Duration::days(400)),
        ];
        assert_eq!(compute(&fonts, now).recently_added, 1);
    }
}
