use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::Category;

const STORE_CATEGORY_BASE: &str = "https://play.google.com/store/apps/category/";

/// Built-in category table, keyed by display name
const BUILTIN: &[(&str, &str)] = &[
    ("ART_AND_DESIGN", "ART_AND_DESIGN?hl=en"),
    ("AUTO_AND_VEHICLES", "AUTO_AND_VEHICLES?hl=en"),
    ("BOOKS_AND_REFERENCE", "BOOKS_AND_REFERENCE?hl=en"),
    ("BUSINESS", "BUSINESS"),
    ("COMICS", "COMICS"),
    ("COMMUNICATION", "COMMUNICATION"),
    ("DATING", "DATING"),
    ("EDUCATION", "EDUCATION"),
    ("ENTERTAINMENT", "ENTERTAINMENT"),
    ("EVENTS", "EVENTS"),
    ("FINANCE", "FINANCE"),
    ("FOOD_AND_DRINK", "FOOD_AND_DRINK?hl=en"),
    ("HEALTH_AND_FITNESS", "HEALTH_AND_FITNESS?hl=en"),
    ("HOUSE_AND_HOME", "HOUSE_AND_HOME?hl=en"),
    ("LIBRARIES_AND_DEMO", "LIBRARIES_AND_DEMO?hl=en"),
    ("LIFESTYLE", "LIFESTYLE"),
    ("MAPS_AND_NAVIGATION", "MAPS_AND_NAVIGATION?hl=en"),
    ("MUSIC_AND_AUDIO", "MUSIC_AND_AUDIO?hl=en"),
    ("NEWS_AND_MAGAZINES", "NEWS_AND_MAGAZINES?hl=en"),
    ("PARENTING", "PARENTING"),
    ("PERSONALIZATION", "PERSONALIZATION"),
    ("PHOTOGRAPHY", "PHOTOGRAPHY"),
    ("PRODUCTIVITY", "PRODUCTIVITY"),
    ("SHOPPING", "SHOPPING"),
    ("SOCIAL", "SOCIAL"),
    ("SPORTS", "SPORTS"),
    ("TOOLS", "TOOLS"),
    ("TRAVEL_AND_LOCAL", "TRAVEL_AND_LOCAL?hl=en"),
    ("VIDEO_PLAYERS_AND_EDITORS", "VIDEO_PLAYERS?hl=en"),
    ("WEATHER", "WEATHER"),
    ("ACTION", "GAME_ACTION?hl=en"),
    ("ADVENTURE", "GAME_ADVENTURE"),
    ("ARCADE", "GAME_ARCADE?hl=en"),
    ("BOARD", "GAME_BOARD?hl=en"),
    ("CARD", "GAME_CARD?hl=en"),
    ("CASINO", "GAME_CASINO?hl=en"),
    ("CASUAL", "GAME_CASUAL"),
    ("EDUCATIONAL", "GAME_EDUCATIONAL?hl=en"),
    ("PUZZLE", "GAME_PUZZLE?hl=en"),
    ("RACING", "GAME_RACING"),
    ("ROLE_PLAYING", "GAME_ROLE_PLAYING?hl=en"),
    ("SIMULATION", "GAME_SIMULATION?hl=en"),
    ("SPORTS_GAMES", "GAME_SPORTS?hl=en"),
    ("STRATEGY", "GAME_STRATEGY?hl=en"),
    ("TRIVIA", "GAME_TRIVIA?hl=en"),
    ("WORD", "GAME_WORD?hl=en"),
];

pub fn builtin_categories() -> Vec<Category> {
    BUILTIN
        .iter()
        .map(|(name, path)| Category::new(*name, format!("{}{}", STORE_CATEGORY_BASE, path)))
        .collect()
}

/// "https://.../category/ART_AND_DESIGN?hl=en" -> "ART_AND_DESIGN"
pub fn name_from_url(url: &str) -> String {
    let without_query = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Read `Category,URL` rows. A missing or malformed file yields an empty list.
pub fn load_categories(path: &Path) -> Vec<Category> {
    match read_categories(path) {
        Ok(categories) => {
            info!("Loaded {} categories from {}", categories.len(), path.display());
            categories
        }
        Err(e) => {
            warn!("Could not read categories from {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn read_categories(path: &Path) -> Result<Vec<Category>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "Category") || !headers.iter().any(|h| h == "URL") {
        warn!("{} has no Category,URL header", path.display());
        return Ok(Vec::new());
    }

    let mut categories = Vec::new();
    for (line, row) in reader.deserialize::<Category>().enumerate() {
        let mut category = match row {
            Ok(category) => category,
            Err(e) => {
                warn!("Skipping category row {}: {}", line + 2, e);
                continue;
            }
        };

        if category.url.trim().is_empty() {
            warn!("Skipping category row {}: empty URL", line + 2);
            continue;
        }
        if category.name.trim().is_empty() {
            category.name = name_from_url(&category.url);
        }
        categories.push(category);
    }

    Ok(categories)
}

/// Write categories as a `Category,URL` file, creating parent directories
pub fn write_categories(path: &Path, categories: &[Category]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for category in categories {
        writer.serialize(category)?;
    }
    writer.flush()?;

    info!("Wrote {} categories to {}", categories.len(), path.display());
    Ok(())
}
