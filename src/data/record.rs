//! Order Record Module
//! Typed rows of the sales dataset and the fields derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product category. The set is closed: anything else in the feed is a data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Furniture,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
}

impl Category {
    /// Legend order used by every chart (Tech, Office, Furniture).
    pub const LEGEND_ORDER: [Category; 3] = [
        Category::Technology,
        Category::OfficeSupplies,
        Category::Furniture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Furniture => "Furniture",
            Category::OfficeSupplies => "Office Supplies",
        }
    }

    /// Exact (whitespace-trimmed) match against the dataset spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Technology" => Some(Category::Technology),
            "Furniture" => Some(Category::Furniture),
            "Office Supplies" => Some(Category::OfficeSupplies),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer segment. Closed set, same rules as [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    Consumer,
    Corporate,
    #[serde(rename = "Home Office")]
    HomeOffice,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Consumer, Segment::Corporate, Segment::HomeOffice];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Consumer => "Consumer",
            Segment::Corporate => "Corporate",
            Segment::HomeOffice => "Home Office",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Consumer" => Some(Segment::Consumer),
            "Corporate" => Some(Segment::Corporate),
            "Home Office" => Some(Segment::HomeOffice),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month bucket. Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Ordinal discount bins, lower bound inclusive.
///
/// | bucket  | range        |
/// |---------|--------------|
/// | `0-10%` | [0.00, 0.10) |
/// | `10-20%`| [0.10, 0.20) |
/// | `20-30%`| [0.20, 0.30) |
/// | `30-50%`| [0.30, 0.50) |
/// | `50%+`  | [0.50, 1.00] |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiscountBucket {
    UpTo10,
    From10To20,
    From20To30,
    From30To50,
    From50,
}

impl DiscountBucket {
    pub const ALL: [DiscountBucket; 5] = [
        DiscountBucket::UpTo10,
        DiscountBucket::From10To20,
        DiscountBucket::From20To30,
        DiscountBucket::From30To50,
        DiscountBucket::From50,
    ];

    /// Bin a fractional discount rate. `None` outside [0, 1] (and for NaN).
    pub fn from_rate(rate: f64) -> Option<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return None;
        }
        let bucket = if rate < 0.10 {
            DiscountBucket::UpTo10
        } else if rate < 0.20 {
            DiscountBucket::From10To20
        } else if rate < 0.30 {
            DiscountBucket::From20To30
        } else if rate < 0.50 {
            DiscountBucket::From30To50
        } else {
            DiscountBucket::From50
        };
        Some(bucket)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscountBucket::UpTo10 => "0-10%",
            DiscountBucket::From10To20 => "10-20%",
            DiscountBucket::From20To30 => "20-30%",
            DiscountBucket::From30To50 => "30-50%",
            DiscountBucket::From50 => "50%+",
        }
    }
}

impl fmt::Display for DiscountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cleaned input row. `sales_clean > 0` holds for every record the loader returns.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Zero-based index of the row in the source table, used to export the
    /// original row unchanged.
    pub source_row: usize,
    pub order_date: NaiveDate,
    pub ship_date: NaiveDate,
    pub category: Category,
    pub segment: Segment,
    pub region: String,
    pub market: String,
    pub country: String,
    pub product_name: String,
    pub sales_clean: f64,
    pub profit_clean: f64,
    pub discount_clean: f64,
}

/// A cleaned record plus its per-row derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOrder {
    pub record: OrderRecord,
    /// `profit_clean / sales_clean * 100`
    pub profit_margin: f64,
    pub month: u32,
    pub month_name: &'static str,
    pub year_month: YearMonth,
    pub discount_bucket: DiscountBucket,
}

impl EnrichedOrder {
    pub fn sales(&self) -> f64 {
        self.record.sales_clean
    }

    pub fn profit(&self) -> f64 {
        self.record.profit_clean
    }

    pub fn is_loss(&self) -> bool {
        self.record.profit_clean < 0.0
    }

    /// High-value order that still lost money.
    pub fn is_discount_disaster(&self, sales_threshold: f64) -> bool {
        self.record.sales_clean > sales_threshold && self.is_loss()
    }
}
