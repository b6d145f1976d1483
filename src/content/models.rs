//! Data models for devotional content rows

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decades in every rosary category.
pub const DECADES_PER_CATEGORY: u8 = 5;

/// The mysteries a decade belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Joyful,
    Luminous,
    Sorrowful,
    Glorious,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Joyful,
        Category::Luminous,
        Category::Sorrowful,
        Category::Glorious,
    ];

    /// Value stored in the `category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Joyful => "joyful",
            Category::Luminous => "luminous",
            Category::Sorrowful => "sorrowful",
            Category::Glorious => "glorious",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "joyful" => Ok(Category::Joyful),
            "luminous" => Ok(Category::Luminous),
            "sorrowful" => Ok(Category::Sorrowful),
            "glorious" => Ok(Category::Glorious),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// 1-based position of a decade within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(u8);

impl Ordinal {
    pub const FIRST: Ordinal = Ordinal(1);
    pub const LAST: Ordinal = Ordinal(DECADES_PER_CATEGORY);

    /// Returns `None` for 0 or anything past the last decade.
    pub fn new(value: u32) -> Option<Self> {
        if value >= 1 && value <= u32::from(DECADES_PER_CATEGORY) {
            Some(Ordinal(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into the ordered row list.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    pub fn next(self) -> Option<Self> {
        Self::new(u32::from(self.0) + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::new(u32::from(self.0).saturating_sub(1))
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content language, stored as an ISO 639-1 code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Portuguese => "pt",
            Language::Italian => "it",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "es" => Ok(Language::Spanish),
            "pt" => Ok(Language::Portuguese),
            "it" => Ok(Language::Italian),
            "fr" => Ok(Language::French),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

/// One published decade as returned by the `decades` table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct DevotionalUnit {
    pub id: i64,
    pub category: String,
    /// Stored ordinal used for ordering within the category
    pub number: i32,
    pub language: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub opening_prayers: Option<String>,
    #[serde(default)]
    pub opening_prayers_audio: Option<String>,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub introduction_audio: Option<String>,
    #[serde(default)]
    pub lectio: Option<String>,
    #[serde(default)]
    pub lectio_audio: Option<String>,
    #[serde(default)]
    pub commentary: Option<String>,
    #[serde(default)]
    pub commentary_audio: Option<String>,
    #[serde(default)]
    pub meditatio: Option<String>,
    #[serde(default)]
    pub meditatio_audio: Option<String>,
    /// Vocal prayer, may carry simple markup
    #[serde(default)]
    pub oratio: Option<String>,
    #[serde(default)]
    pub oratio_audio: Option<String>,
    #[serde(default)]
    pub contemplatio: Option<String>,
    #[serde(default)]
    pub contemplatio_audio: Option<String>,
    #[serde(default)]
    pub actio: Option<String>,
    #[serde(default)]
    pub actio_audio: Option<String>,
}

impl DevotionalUnit {
    /// Identity used to invalidate derived data: a republished row carries a new `updated_at`.
    pub fn identity(&self) -> (i64, Option<&str>) {
        (self.id, self.updated_at.as_deref())
    }
}
