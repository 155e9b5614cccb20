//! Configuration Module
//! Analysis thresholds (optionally loaded from JSON) and the immutable chart palette.

use crate::data::{Category, DiscountBucket, Segment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Thresholds and output settings for an analysis run.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Orders above this sales value with negative profit are discount disasters.
    pub disaster_sales_threshold: f64,
    /// Orders above this margin (%) are gold mines.
    pub gold_mine_margin: f64,
    /// Benchmark margin (%) drawn on margin charts.
    pub margin_benchmark: f64,
    /// Rows in the top/bottom product tables.
    pub top_n: usize,
    pub histogram_bins: usize,
    /// Maximum points drawn in the dashboard scatter; discount disasters are always kept.
    pub scatter_points: usize,
    pub output_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            disaster_sales_threshold: 1000.0,
            gold_mine_margin: 50.0,
            margin_benchmark: 10.0,
            top_n: 10,
            histogram_bins: 25,
            scatter_points: 500,
            output_dir: PathBuf::from("outputs"),
            chart_width: 1400,
            chart_height: 800,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Toolkit-neutral RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// From a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

/// Brand, category and segment colors shared by static charts and the dashboard.
///
/// Built once and passed by reference; never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub tertiary: Rgb,
    pub success: Rgb,
    pub danger: Rgb,
    pub warning: Rgb,
    pub neutral: Rgb,
    technology: Rgb,
    furniture: Rgb,
    office_supplies: Rgb,
    consumer: Rgb,
    corporate: Rgb,
    home_office: Rgb,
    discount: [Rgb; 5],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::hex(0x2E86AB),
            secondary: Rgb::hex(0xA23B72),
            tertiary: Rgb::hex(0xF18F01),
            success: Rgb::hex(0x2ECC71),
            danger: Rgb::hex(0xE74C3C),
            warning: Rgb::hex(0xF1C40F),
            neutral: Rgb::hex(0x95A5A6),
            technology: Rgb::hex(0x2E86AB),
            furniture: Rgb::hex(0xA23B72),
            office_supplies: Rgb::hex(0xF18F01),
            consumer: Rgb::hex(0xE74C3C),
            corporate: Rgb::hex(0x3498DB),
            home_office: Rgb::hex(0x2ECC71),
            discount: [
                Rgb::hex(0x2ECC71),
                Rgb::hex(0xF1C40F),
                Rgb::hex(0xE67E22),
                Rgb::hex(0xE74C3C),
                Rgb::hex(0x8E44AD),
            ],
        }
    }
}

impl Palette {
    pub fn category(&self, category: Category) -> Rgb {
        match category {
            Category::Technology => self.technology,
            Category::Furniture => self.furniture,
            Category::OfficeSupplies => self.office_supplies,
        }
    }

    pub fn segment(&self, segment: Segment) -> Rgb {
        match segment {
            Segment::Consumer => self.consumer,
            Segment::Corporate => self.corporate,
            Segment::HomeOffice => self.home_office,
        }
    }

    pub fn discount(&self, bucket: DiscountBucket) -> Rgb {
        let idx = DiscountBucket::ALL
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(0);
        self.discount[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{ "top_n": 5, "output_dir": "out" }"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.disaster_sales_threshold, 1000.0);
        assert_eq!(config.histogram_bins, 25);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(AnalysisConfig::from_json_str(r#"{ "top_n": "ten" }"#).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AnalysisConfig::from_json_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/config.json"));
    }

    #[test]
    fn palette_maps_closed_sets() {
        let palette = Palette::default();
        assert_eq!(palette.category(Category::Technology), Rgb(0x2E, 0x86, 0xAB));
        assert_eq!(palette.segment(Segment::HomeOffice), Rgb(0x2E, 0xCC, 0x71));
        assert_eq!(palette.discount(DiscountBucket::From50), Rgb(0x8E, 0x44, 0xAD));
    }
}
