//! Bar charts of top rules and itemsets using Plotters

use plotters::prelude::*;

use crate::error::{MiningError, Result};
use crate::report::{ItemsetView, RuleView};

const BAR_COLOR: RGBColor = RGBColor(47, 128, 237);
const LABEL_COLOR: RGBColor = RGBColor(20, 20, 20);

fn plot_error(err: impl std::fmt::Display) -> MiningError {
    MiningError::Plot(err.to_string())
}

/// Horizontal bars, one per label, highest value at the top
///
/// # Returns
/// * `false` without touching `output_path` when there is nothing to draw
fn draw_bar_chart(
    bars: &[(String, f64)],
    output_path: &str,
    title: &str,
    x_desc: &str,
) -> Result<bool> {
    if bars.is_empty() {
        return Ok(false);
    }

    let n = bars.len();
    let max_value = bars.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    let x_max = if max_value > 0.0 { max_value * 1.15 } else { 1.0 };

    let root = BitMapBackend::new(output_path, (900, 120 + 32 * n as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(10)
        .build_cartesian_2d(0f64..x_max, 0f64..n as f64)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_desc(x_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let y = (n - 1 - i) as f64;
            Rectangle::new([(0.0, y + 0.15), (*value, y + 0.85)], BAR_COLOR.filled())
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (label, value))| {
            let y = (n - 1 - i) as f64;
            Text::new(
                format!("{}  ({:.3})", label, value),
                (x_max * 0.01, y + 0.65),
                ("sans-serif", 13).into_font().color(&LABEL_COLOR),
            )
        }))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(true)
}

/// Top `top` rules by lift
pub fn rule_bars(rules: &[RuleView], top: usize) -> Vec<(String, f64)> {
    rules
        .iter()
        .take(top)
        .map(|rule| (rule.label(), rule.lift))
        .collect()
}

/// Top `top` itemsets of size two or more by support
pub fn itemset_bars(itemsets: &[ItemsetView], top: usize) -> Vec<(String, f64)> {
    itemsets
        .iter()
        .filter(|itemset| itemset.length >= 2)
        .take(top)
        .map(|itemset| (itemset.items.join(", "), itemset.support))
        .collect()
}

/// Chart the strongest rules, ranked as given
pub fn create_rule_lift_chart(rules: &[RuleView], output_path: &str, top: usize) -> Result<bool> {
    draw_bar_chart(
        &rule_bars(rules, top),
        output_path,
        "Top Association Rules by Lift",
        "Lift",
    )
}

/// Chart the most supported combinations (single items are left out)
pub fn create_itemset_support_chart(
    itemsets: &[ItemsetView],
    output_path: &str,
    top: usize,
) -> Result<bool> {
    draw_bar_chart(
        &itemset_bars(itemsets, top),
        output_path,
        "Most Frequent Item Combinations",
        "Support",
    )
}

/// Write `<base>.png` (rules) and `<base>_itemsets.png` (combinations)
///
/// # Returns
/// * Paths of the charts that were written; empty sections are skipped
pub fn generate_visualization_report(
    rules: &[RuleView],
    itemsets: &[ItemsetView],
    base_output_path: &str,
    top: usize,
) -> Result<Vec<String>> {
    let mut written = Vec::new();

    if create_rule_lift_chart(rules, base_output_path, top)? {
        written.push(base_output_path.to_string());
    }

    let itemset_path = itemset_chart_path(base_output_path);
    if create_itemset_support_chart(itemsets, &itemset_path, top)? {
        written.push(itemset_path);
    }

    Ok(written)
}

/// `rules.png` -> `rules_itemsets.png`
pub fn itemset_chart_path(base_output_path: &str) -> String {
    match base_output_path.strip_suffix(".png") {
        Some(stem) => format!("{}_itemsets.png", stem),
        None => format!("{}_itemsets.png", base_output_path),
    }
}
