// Stylistic presets offered next to the canvas.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStyle {
    #[default]
    Standard,
    VibrantProduct,
    SoftPortrait,
    Architectural,
    Cinematic,
}

impl StockStyle {
    /// In picker order.
    pub const ALL: [StockStyle; 5] = [
        StockStyle::Standard,
        StockStyle::VibrantProduct,
        StockStyle::SoftPortrait,
        StockStyle::Architectural,
        StockStyle::Cinematic,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StockStyle::Standard => "standard",
            StockStyle::VibrantProduct => "vibrant_product",
            StockStyle::SoftPortrait => "soft_portrait",
            StockStyle::Architectural => "architectural",
            StockStyle::Cinematic => "cinematic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStyle::Standard => "Standard",
            StockStyle::VibrantProduct => "Product",
            StockStyle::SoftPortrait => "Portrait",
            StockStyle::Architectural => "Architecture",
            StockStyle::Cinematic => "Cinematic",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StockStyle::Standard => "Clean, neutral professional look",
            StockStyle::VibrantProduct => "High contrast & saturation",
            StockStyle::SoftPortrait => "Soft lighting, bokeh",
            StockStyle::Architectural => "Linear, clean lines",
            StockStyle::Cinematic => "Dramatic color grading",
        }
    }

    /// Picker slot 1..=5 (number keys in the window).
    pub fn from_slot(slot: usize) -> Option<Self> {
        slot.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for StockStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StockStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.id() == s)
            .ok_or_else(|| Error::config(format!("unknown style '{s}'")))
    }
}
