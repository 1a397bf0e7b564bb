//! PNG charts rendered with Plotters.
//!
//! Both charts are bar charts on an f64 axis: bar i is centred on x = i
//! and the x labels are mapped back to bin or quartile names.

use anyhow::Result;
use cohort_core::{describe::HistogramBin, quartile_bucketer::QuartileSummary};
use plotters::prelude::*;
use std::path::Path;

const BRAND_PINK: RGBColor = RGBColor(0xFF, 0x2E, 0x9E);
const BRAND_PALETTE: [RGBColor; 4] = [
    RGBColor(0xFF, 0x2E, 0x9E),
    RGBColor(0xFD, 0xA5, 0x49),
    RGBColor(0x8D, 0xC6, 0x3F),
    RGBColor(0x22, 0xA9, 0xE1),
];

const BAR_HALF_WIDTH: f64 = 0.4;

/// Histogram of sign-ups over time.
pub fn render_join_histogram(bins: &[HistogramBin], output: &Path) -> Result<()> {
    let root = BitMapBackend::new(output, (900, 540)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.1;
    let x_max = bins.len().max(1) as f64 - 0.5;
    let labels: Vec<String> = bins
        .iter()
        .map(|b| b.start.format("%Y-%m-%d").to_string())
        .collect();

    let mut chart = ChartBuilder::on(&root)
        .caption("Player sign-ups over time", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bins.len().max(1))
        .x_label_formatter(&|x| category_label(*x, &labels))
        .y_label_formatter(&|y| format!("{y:.0}"))
        .x_desc("Date joined")
        .y_desc("Number of players")
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(bins.iter().enumerate().map(|(i, b)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, b.count as f64)],
            BRAND_PINK.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// "Engagement vs. Spend": average deposit per games-played quartile.
/// Quartiles without members are drawn as gaps.
pub fn render_quartile_deposits(
    summary: &QuartileSummary,
    currency_symbol: &str,
    output: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = summary
        .buckets
        .iter()
        .filter_map(|b| b.mean_deposit)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;
    let labels: Vec<String> = summary
        .buckets
        .iter()
        .map(|b| b.quartile.label().to_string())
        .collect();
    let y_desc = format!("Average total deposit ({currency_symbol})");

    let mut chart = ChartBuilder::on(&root)
        .caption("Engagement vs. Spend", ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..3.5f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(4)
        .x_label_formatter(&|x| category_label(*x, &labels))
        .x_desc("Games played quartile")
        .y_desc(y_desc.as_str())
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(summary.buckets.iter().enumerate().filter_map(|(i, b)| {
        let deposit = b.mean_deposit?;
        let x = i as f64;
        let color = BRAND_PALETTE[i % BRAND_PALETTE.len()];
        Some(Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, deposit)],
            color.filled(),
        ))
    }))?;

    root.present()?;
    Ok(())
}

/// Label for an axis key point: the category name when `x` sits on a
/// bar centre, blank otherwise.
fn category_label(x: f64, labels: &[String]) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_bar_centres() {
        let labels = vec!["Q1".to_string(), "Q2".to_string()];
        assert_eq!(category_label(0.0, &labels), "Q1");
        assert_eq!(category_label(1.0, &labels), "Q2");
        assert_eq!(category_label(0.5, &labels), "");
        assert_eq!(category_label(-0.5, &labels), "");
        assert_eq!(category_label(7.0, &labels), "");
    }
}
