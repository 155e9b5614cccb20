//! Aggregation Module
//! One generic group-by over enriched orders, parameterized by key and row order.

use crate::data::{Category, DiscountBucket, EnrichedOrder, Segment, YearMonth};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Cannot aggregate an empty order collection")]
    EmptyGroup,
}

/// What to group by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Category,
    Segment,
    YearMonth,
    DiscountBucket,
    Region,
    Market,
    Country,
    /// Several keys at once, e.g. category x segment.
    Composite(Vec<GroupKey>),
}

impl GroupKey {
    pub fn extract(&self, order: &EnrichedOrder) -> KeyValue {
        let record = &order.record;
        match self {
            GroupKey::Category => KeyValue::Category(record.category),
            GroupKey::Segment => KeyValue::Segment(record.segment),
            GroupKey::YearMonth => KeyValue::YearMonth(order.year_month),
            GroupKey::DiscountBucket => KeyValue::DiscountBucket(order.discount_bucket),
            GroupKey::Region => KeyValue::Text(record.region.clone()),
            GroupKey::Market => KeyValue::Text(record.market.clone()),
            GroupKey::Country => KeyValue::Text(record.country.clone()),
            GroupKey::Composite(keys) => {
                KeyValue::Composite(keys.iter().map(|k| k.extract(order)).collect())
            }
        }
    }
}

/// A concrete grouping key value. `Ord` is the natural order of each kind
/// (chronological months, ordinal discount buckets).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Category(Category),
    Segment(Segment),
    YearMonth(YearMonth),
    DiscountBucket(DiscountBucket),
    Text(String),
    Composite(Vec<KeyValue>),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Category(c) => write!(f, "{c}"),
            KeyValue::Segment(s) => write!(f, "{s}"),
            KeyValue::YearMonth(ym) => write!(f, "{ym}"),
            KeyValue::DiscountBucket(b) => write!(f, "{b}"),
            KeyValue::Text(t) => f.write_str(t),
            KeyValue::Composite(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" / ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Output row order. Every variant is deterministic; sorts are stable so
/// ties keep the order in which keys were first encountered.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOrder {
    /// First-appearance order of each key.
    Encounter,
    /// Ranking by summed sales, largest first.
    SalesDescending,
    /// Ranking by mean margin, largest first.
    MeanMarginDescending,
    /// Natural key order.
    KeyAscending,
    /// Caller-specified order (legend stability). Keys not listed follow in
    /// encounter order.
    Fixed(Vec<KeyValue>),
}

impl RowOrder {
    /// Fixed order following the chart legend (Technology, Office Supplies, Furniture).
    pub fn category_legend() -> Self {
        RowOrder::Fixed(
            Category::LEGEND_ORDER
                .iter()
                .map(|c| KeyValue::Category(*c))
                .collect(),
        )
    }
}

/// One reduced summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: KeyValue,
    pub sales_sum: f64,
    pub profit_sum: f64,
    /// Arithmetic mean of per-order margins. Not the same as [`AggregateRow::overall_margin`].
    pub mean_margin: f64,
    pub count: usize,
}

impl AggregateRow {
    /// Summed profit over summed sales, as a percentage.
    pub fn overall_margin(&self) -> f64 {
        self.profit_sum / self.sales_sum * 100.0
    }

    pub fn label(&self) -> String {
        self.key.to_string()
    }
}

#[derive(Default)]
struct Accumulator {
    sales: f64,
    profit: f64,
    margin: f64,
    count: usize,
}

/// Group `orders` by `key` and reduce each group to sums, mean margin and count.
///
/// Fails with [`AggregateError::EmptyGroup`] when `orders` is empty.
pub fn aggregate(
    orders: &[EnrichedOrder],
    key: &GroupKey,
    order: &RowOrder,
) -> Result<Vec<AggregateRow>, AggregateError> {
    if orders.is_empty() {
        return Err(AggregateError::EmptyGroup);
    }

    let mut index: HashMap<KeyValue, usize> = HashMap::new();
    let mut keys: Vec<KeyValue> = Vec::new();
    let mut groups: Vec<Accumulator> = Vec::new();

    for o in orders {
        let value = key.extract(o);
        let slot = *index.entry(value.clone()).or_insert_with(|| {
            keys.push(value);
            groups.push(Accumulator::default());
            groups.len() - 1
        });
        let acc = &mut groups[slot];
        acc.sales += o.record.sales_clean;
        acc.profit += o.record.profit_clean;
        acc.margin += o.profit_margin;
        acc.count += 1;
    }

    let mut rows: Vec<AggregateRow> = keys
        .into_iter()
        .zip(groups)
        .map(|(key, acc)| AggregateRow {
            key,
            sales_sum: acc.sales,
            profit_sum: acc.profit,
            mean_margin: acc.margin / acc.count as f64,
            count: acc.count,
        })
        .collect();

    sort_rows(&mut rows, order);
    Ok(rows)
}

fn sort_rows(rows: &mut [AggregateRow], order: &RowOrder) {
    match order {
        RowOrder::Encounter => {}
        RowOrder::SalesDescending => rows.sort_by(|a, b| b.sales_sum.total_cmp(&a.sales_sum)),
        RowOrder::MeanMarginDescending => {
            rows.sort_by(|a, b| b.mean_margin.total_cmp(&a.mean_margin))
        }
        RowOrder::KeyAscending => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        RowOrder::Fixed(fixed) => rows.sort_by_key(|row| {
            fixed
                .iter()
                .position(|k| *k == row.key)
                .unwrap_or(usize::MAX)
        }),
    }
}

/// Each row's share of the summed sales across `rows`, as a percentage.
pub fn sales_shares(rows: &[AggregateRow]) -> Vec<f64> {
    let total: f64 = rows.iter().map(|r| r.sales_sum).sum();
    rows.iter()
        .map(|r| {
            if total > 0.0 {
                r.sales_sum / total * 100.0
            } else {
                0.0
            }
        })
        .collect()
}
