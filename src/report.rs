//! Executive Summary Report
//! Plain-text summary built entirely from computed figures.

use crate::pipeline::Insights;
use crate::stats::{sales_shares, AggregateRow};
use chrono::NaiveDateTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_FILE_NAME: &str = "executive_summary_report.txt";

const RULE: &str = "============================================================";

/// Render the executive summary.
///
/// `generated_at` is passed in so the text is reproducible; `files` lists the
/// artifacts written alongside the report.
pub fn executive_summary(insights: &Insights, generated_at: NaiveDateTime, files: &[PathBuf]) -> String {
    let k = &insights.kpis;
    let mut out = String::new();

    out.push_str(&format!("{RULE}\n"));
    match year_span(insights) {
        Some((first, last)) if first != last => {
            out.push_str(&format!("SUPERSTORE SALES ANALYSIS REPORT ({first}-{last})\n"));
        }
        Some((year, _)) => {
            out.push_str(&format!("SUPERSTORE SALES ANALYSIS REPORT ({year})\n"));
        }
        None => {
            out.push_str("SUPERSTORE SALES ANALYSIS REPORT\n");
        }
    }
    out.push_str(&format!("Generated: {}\n", generated_at.format("%Y-%m-%d %H:%M")));
    out.push_str(&format!("{RULE}\n"));

    out.push_str("\nFINANCIAL OVERVIEW:\n");
    out.push_str(&format!("- Total Revenue: ${:.2} million\n", k.total_sales / 1e6));
    out.push_str(&format!("- Total Profit: ${:.2} million\n", k.total_profit / 1e6));
    out.push_str(&format!("- Overall Margin (total profit / total sales): {:.1}%\n", k.overall_margin));
    out.push_str(&format!("- Mean Order Margin (average of per-order margins): {:.1}%\n", k.mean_margin));
    out.push_str(&format!("- Total Orders: {}\n", k.order_count));
    out.push_str(&format!("- Average Order Value: ${:.2}\n", k.average_order_value));
    out.push_str(&format!(
        "- Loss-making Orders: {} ({:.1}%)\n",
        k.loss_orders, k.loss_order_pct
    ));
    if let Some(peak) = insights.peak_month() {
        out.push_str(&format!("- Peak Month: {} (${:.0})\n", peak.label(), peak.sales_sum));
    }

    out.push_str("\nSEGMENT PERFORMANCE:\n");
    write_group_lines(&mut out, &insights.by_segment);

    out.push_str("\nCATEGORY PERFORMANCE:\n");
    write_group_lines(&mut out, &insights.by_category);

    out.push_str("\nDISCOUNT IMPACT (mean order margin by discount):\n");
    for row in &insights.by_discount {
        out.push_str(&format!(
            "- {}: {} orders, {:.1}% mean order margin\n",
            row.label(),
            row.count,
            row.mean_margin
        ));
    }

    out.push_str("\nCRITICAL ISSUES:\n");
    out.push_str(&format!(
        "- {} 'discount disasters' (high sales, negative profit), ${:.0} lost\n",
        insights.disaster_count,
        insights.disaster_loss.abs()
    ));
    if let Some(worst) = &insights.worst_order {
        out.push_str(&format!(
            "- Worst case: {:.0}% discount on {} ({}) = {:.0}% margin\n",
            worst.record.discount_clean * 100.0,
            worst.record.product_name,
            worst.record.category,
            worst.profit_margin
        ));
    }
    out.push_str(&format!(
        "- {} high-margin orders above the gold-mine threshold\n",
        insights.gold_mine_count
    ));

    if !files.is_empty() {
        out.push_str("\nFILES GENERATED:\n");
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            out.push_str(&format!("- {name}\n"));
        }
    }

    out
}

/// Share of sales plus both margins, with a tag for the best and worst overall margin.
fn write_group_lines(out: &mut String, rows: &[AggregateRow]) {
    let shares = sales_shares(rows);
    let best = rows
        .iter()
        .map(AggregateRow::overall_margin)
        .fold(f64::NEG_INFINITY, f64::max);
    let worst = rows
        .iter()
        .map(AggregateRow::overall_margin)
        .fold(f64::INFINITY, f64::min);

    for (row, share) in rows.iter().zip(shares) {
        let margin = row.overall_margin();
        let tag = if rows.len() < 2 {
            ""
        } else if margin == best {
            " [STAR PERFORMER]"
        } else if margin == worst {
            " [MARGIN KILLER]"
        } else {
            " [SOLID]"
        };
        out.push_str(&format!(
            "- {}: {:.0}% of sales, {:.1}% overall margin, {:.1}% mean order margin{}\n",
            row.label(),
            share,
            margin,
            row.mean_margin,
            tag
        ));
    }
}

fn year_span(insights: &Insights) -> Option<(String, String)> {
    use crate::stats::KeyValue;
    let years: Vec<i32> = insights
        .monthly
        .iter()
        .filter_map(|row| match &row.key {
            KeyValue::YearMonth(ym) => Some(ym.year),
            _ => None,
        })
        .collect();
    let first = years.iter().min()?;
    let last = years.iter().max()?;
    Some((first.to_string(), last.to_string()))
}

/// Write the report as UTF-8 into `dir`, returning the file path.
pub fn write_report(dir: &Path, text: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE_NAME);
    fs::write(&path, text)?;
    info!("Saved report: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::data::{Category, DataProcessor, EnrichedOrder, OrderRecord, Segment};
    use chrono::NaiveDate;

    fn order(category: Category, segment: Segment, sales: f64, profit: f64, discount: f64) -> EnrichedOrder {
        DataProcessor::derive(OrderRecord {
            source_row: 0,
            order_date: NaiveDate::from_ymd_opt(2013, 3, 5).unwrap(),
            ship_date: NaiveDate::from_ymd_opt(2013, 3, 7).unwrap(),
            category,
            segment,
            region: "West".to_string(),
            market: "US".to_string(),
            country: "United States".to_string(),
            product_name: format!("{category} item"),
            sales_clean: sales,
            profit_clean: profit,
            discount_clean: discount,
        })
        .unwrap()
    }

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn report_names_both_margin_metrics() {
        let orders = vec![
            order(Category::Technology, Segment::Consumer, 1000.0, 200.0, 0.0),
            order(Category::Technology, Segment::Corporate, 1000.0, 50.0, 0.1),
            order(Category::Furniture, Segment::Consumer, 500.0, 100.0, 0.0),
        ];
        let insights = Insights::compute(&orders, &AnalysisConfig::default()).unwrap();
        let text = executive_summary(&insights, generated(), &[]);

        assert!(text.contains("SUPERSTORE SALES ANALYSIS REPORT (2013)"));
        assert!(text.contains("Generated: 2024-01-02 09:30"));
        assert!(text.contains("Overall Margin (total profit / total sales): 14.0%"));
        assert!(text.contains("Mean Order Margin (average of per-order margins): 15.0%"));
        assert!(text.contains("- Technology: 80% of sales, 12.5% overall margin"));
        assert!(text.contains("- Furniture: 20% of sales, 20.0% overall margin"));
        assert!(!text.contains("FILES GENERATED"));
    }

    #[test]
    fn report_lists_disasters_and_files() {
        let orders = vec![
            order(Category::Furniture, Segment::HomeOffice, 2000.0, -600.0, 0.6),
            order(Category::Technology, Segment::Consumer, 300.0, 90.0, 0.0),
        ];
        let insights = Insights::compute(&orders, &AnalysisConfig::default()).unwrap();
        let files = vec![PathBuf::from("outputs/chart1_monthly_trend.png")];
        let text = executive_summary(&insights, generated(), &files);

        assert!(text.contains("- 1 'discount disasters' (high sales, negative profit), $600 lost"));
        assert!(text.contains("- Worst case: 60% discount on Furniture item (Furniture) = -30% margin"));
        assert!(text.contains("- chart1_monthly_trend.png"));
    }

    #[test]
    fn write_report_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out");
        let path = write_report(&nested, "hello").unwrap();

        assert_eq!(path, nested.join(REPORT_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }
}
