//! Chart renderer: six PNGs, one per KPI view.
//!
//! Rendering is purely presentational and strictly best-effort: a chart that
//! cannot be drawn (no data, or an unwritable directory) is skipped with a
//! warning and never aborts the pipeline.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use once_cell::sync::Lazy;
use plotters::prelude::*;

use crate::config::Config;
use crate::error::RenderError;
use crate::kpis::KpiSet;
use crate::types::Status;

pub const TOP_ACCOUNTS_CHART: &str = "viz_top_accounts.png";
pub const PRIORITY_STATUS_CHART: &str = "viz_priority_status.png";
pub const INDUSTRY_CHART: &str = "viz_industry_analysis.png";
pub const COUNTRY_CHART: &str = "viz_country_analysis.png";
pub const TIME_SERIES_CHART: &str = "viz_time_series.png";
pub const RESOLUTION_CHART: &str = "viz_resolution_time.png";

static PRIORITY_COLORS: Lazy<HashMap<&'static str, RGBColor>> = Lazy::new(|| {
    HashMap::from([
        ("Urgent", RGBColor(0x8e, 0x44, 0xad)),
        ("High", RGBColor(0xe7, 0x4c, 0x3c)),
        ("Medium", RGBColor(0xf3, 0x9c, 0x12)),
        ("Low", RGBColor(0x34, 0x98, 0xdb)),
    ])
});

const FALLBACK_COLOR: RGBColor = RGBColor(0x7f, 0x8c, 0x8d);

fn priority_color(priority: &str) -> RGBColor {
    PRIORITY_COLORS
        .get(priority)
        .copied()
        .unwrap_or(FALLBACK_COLOR)
}

fn status_color(status: &str) -> RGBColor {
    match Status::parse(Some(status)) {
        Status::Open => RGBColor(0xe6, 0x7e, 0x22),
        Status::Pending => RGBColor(0xf1, 0xc4, 0x0f),
        Status::Closed => RGBColor(0x27, 0xae, 0x60),
        Status::Unknown => FALLBACK_COLOR,
    }
}

/// Linear blue-to-red ramp for ranked bars.
fn gradient(index: usize, len: usize) -> RGBColor {
    let t = if len <= 1 {
        0.0
    } else {
        index as f64 / (len - 1) as f64
    };
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(lerp(0x2c, 0xd3), lerp(0x7f, 0x54), lerp(0xb8, 0x2e))
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let cut: String = name.chars().take(max).collect();
        format!("{cut}…")
    } else {
        name.to_string()
    }
}

type ChartFn = fn(&KpiSet, &Config, &Path) -> Result<(), RenderError>;

/// Render every chart, skipping the ones that fail. Returns how many were
/// actually written.
pub fn render_all(kpis: &KpiSet, config: &Config) -> usize {
    if let Err(err) = fs::create_dir_all(&config.charts_dir) {
        warn!(
            "⚠️ cannot create chart directory {}: {err}, skipping all charts",
            config.charts_dir.display()
        );
        return 0;
    }

    let jobs: [(&str, ChartFn); 6] = [
        (TOP_ACCOUNTS_CHART, top_accounts),
        (PRIORITY_STATUS_CHART, priority_status),
        (INDUSTRY_CHART, industry),
        (COUNTRY_CHART, country),
        (TIME_SERIES_CHART, time_series),
        (RESOLUTION_CHART, resolution_histogram),
    ];

    let mut rendered = 0;
    for (file, job) in jobs {
        let path = config.charts_dir.join(file);
        match job(kpis, config, &path) {
            Ok(()) => {
                info!("📊 chart saved: {}", path.display());
                rendered += 1;
            }
            Err(err) => warn!("⚠️ skipping chart {file}: {err}"),
        }
    }
    rendered
}

fn top_accounts(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let rows: Vec<_> = kpis
        .cases_per_account
        .iter()
        .take(config.top_accounts)
        .collect();
    if rows.is_empty() {
        return Err(RenderError::NoData("cases per account"));
    }

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let max = rows.iter().map(|r| r.total_cases).max().unwrap_or(1).max(1) as f64;
    let count = rows.len() as i32;
    let names: Vec<String> = rows.iter().map(|r| truncate(&r.account_name, 24)).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} accounts by case volume", rows.len()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(190)
        .build_cartesian_2d(0f64..max * 1.08, 0i32..count)
        .map_err(RenderError::draw)?;

    let label = |idx: &i32| names.get(*idx as usize).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&label)
        .x_desc("Total cases")
        .draw()
        .map_err(RenderError::draw)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            Rectangle::new(
                [(0.0, i as i32), (row.total_cases as f64, i as i32 + 1)],
                gradient(i, rows.len()).filled(),
            )
        }))
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

fn priority_status(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let rows = &kpis.priority_status;
    if rows.is_empty() {
        return Err(RenderError::NoData("priority × status"));
    }

    // Rows arrive rank-ordered, so encounter order keeps the canonical
    // priority order; statuses are re-sorted by their own rank.
    let mut priorities: Vec<String> = Vec::new();
    let mut statuses: Vec<String> = Vec::new();
    for row in rows {
        if !priorities.contains(&row.priority) {
            priorities.push(row.priority.clone());
        }
        if !statuses.contains(&row.status) {
            statuses.push(row.status.clone());
        }
    }
    statuses.sort_by_key(|s| Status::parse(Some(s)).rank());

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let max = rows.iter().map(|r| r.case_count).max().unwrap_or(1).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Case distribution by priority and status", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..priorities.len() as f64, 0f64..max * 1.1)
        .map_err(RenderError::draw)?;

    let label = |x: &f64| {
        let idx = x.floor() as usize;
        if (x - idx as f64).abs() < 1e-9 {
            priorities.get(idx).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(priorities.len() + 1)
        .x_label_formatter(&label)
        .y_desc("Number of cases")
        .draw()
        .map_err(RenderError::draw)?;

    let band = 0.8 / statuses.len() as f64;
    for (si, status) in statuses.iter().enumerate() {
        let color = status_color(status);
        chart
            .draw_series(rows.iter().filter(|r| &r.status == status).map(|row| {
                let gi = priorities.iter().position(|p| p == &row.priority).unwrap_or(0);
                let x0 = gi as f64 + 0.1 + si as f64 * band;
                Rectangle::new(
                    [(x0, 0.0), (x0 + band * 0.9, row.case_count as f64)],
                    color.filled(),
                )
            }))
            .map_err(RenderError::draw)?
            .label(status.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

fn industry(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let rows: Vec<_> = kpis.industry.iter().take(config.top_industries).collect();
    if rows.is_empty() {
        return Err(RenderError::NoData("industry metrics"));
    }

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let max = rows.iter().map(|r| r.case_count).max().unwrap_or(1).max(1) as f64;
    let count = rows.len() as i32;
    let names: Vec<String> = rows.iter().map(|r| truncate(&r.industry, 28)).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} industries by case volume", rows.len()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(210)
        .build_cartesian_2d(0f64..max * 1.08, 0i32..count)
        .map_err(RenderError::draw)?;

    let label = |idx: &i32| names.get(*idx as usize).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&label)
        .x_desc("Total cases")
        .draw()
        .map_err(RenderError::draw)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            Rectangle::new(
                [(0.0, i as i32), (row.case_count as f64, i as i32 + 1)],
                gradient(i, rows.len()).filled(),
            )
        }))
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

fn country(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let rows: Vec<_> = kpis.country.iter().take(config.top_countries).collect();
    if rows.is_empty() {
        return Err(RenderError::NoData("country metrics"));
    }

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let max = rows.iter().map(|r| r.case_count).max().unwrap_or(1).max(1) as f64;
    let count = rows.len() as i32;
    let names: Vec<String> = rows.iter().map(|r| truncate(&r.country, 24)).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Top {} countries by support volume", rows.len()),
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(170)
        .build_cartesian_2d(0f64..max * 1.08, 0i32..count)
        .map_err(RenderError::draw)?;

    let label = |idx: &i32| names.get(*idx as usize).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&label)
        .x_desc("Total support cases")
        .draw()
        .map_err(RenderError::draw)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            Rectangle::new(
                [(0.0, i as i32), (row.case_count as f64, i as i32 + 1)],
                gradient(i, rows.len()).filled(),
            )
        }))
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

fn time_series(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let rows = &kpis.time_series;
    if rows.is_empty() {
        return Err(RenderError::NoData("time series"));
    }

    let mut days: Vec<String> = Vec::new();
    let mut priorities: Vec<String> = Vec::new();
    for row in rows {
        if days.last() != Some(&row.day) && !days.contains(&row.day) {
            days.push(row.day.clone());
        }
        if !priorities.contains(&row.priority) {
            priorities.push(row.priority.clone());
        }
    }
    let counts: HashMap<(&str, &str), i64> = rows
        .iter()
        .map(|r| ((r.day.as_str(), r.priority.as_str()), r.case_count))
        .collect();

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let max = rows.iter().map(|r| r.case_count).max().unwrap_or(1).max(1) as f64;
    let x_max = (days.len().saturating_sub(1)).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption("Cases created over time by priority", ("sans-serif", 28))
        .margin(12)
        .x_label_area_size(56)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..max * 1.1)
        .map_err(RenderError::draw)?;

    let label = |x: &f64| {
        let idx = x.round() as usize;
        if (x - idx as f64).abs() < 1e-9 {
            days.get(idx).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .x_labels(days.len().min(12))
        .x_label_formatter(&label)
        .y_desc("Cases created")
        .draw()
        .map_err(RenderError::draw)?;

    for priority in &priorities {
        let color = priority_color(priority);
        // missing (day, priority) pairs are true zeroes, not gaps
        let points: Vec<(f64, f64)> = days
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let count = counts
                    .get(&(day.as_str(), priority.as_str()))
                    .copied()
                    .unwrap_or(0);
                (i as f64, count as f64)
            })
            .collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(RenderError::draw)?
            .label(priority.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

fn resolution_histogram(kpis: &KpiSet, config: &Config, path: &Path) -> Result<(), RenderError> {
    let values: Vec<f64> = kpis
        .cases_per_account
        .iter()
        .filter_map(|r| r.avg_resolution_days)
        .collect();
    if values.is_empty() {
        return Err(RenderError::NoData("resolved cases"));
    }

    const BINS: usize = 30;
    let max_value = values.iter().cloned().fold(f64::MIN, f64::max).max(1.0);
    let bin_width = max_value / BINS as f64;
    let mut counts = [0u32; BINS];
    for value in &values {
        let idx = ((value / bin_width) as usize).min(BINS - 1);
        counts[idx] += 1;
    }
    let tallest = counts.iter().copied().max().unwrap_or(1).max(1) as f64;

    let root =
        BitMapBackend::new(path, (config.chart_width, config.chart_height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::draw)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Distribution of average resolution time (days)",
            ("sans-serif", 28),
        )
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..max_value * 1.02, 0f64..tallest * 1.1)
        .map_err(RenderError::draw)?;

    chart
        .configure_mesh()
        .x_desc("Average resolution time (days)")
        .y_desc("Accounts")
        .draw()
        .map_err(RenderError::draw)?;

    chart
        .draw_series(counts.iter().enumerate().filter(|(_, c)| **c > 0).map(|(i, count)| {
            let x0 = i as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, *count as f64)],
                RGBColor(0x8e, 0x7c, 0xc3).filled(),
            )
        }))
        .map_err(RenderError::draw)?;

    root.present().map_err(RenderError::draw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpis::KpiSet;

    fn empty_kpis() -> KpiSet {
        KpiSet {
            cases_per_account: Vec::new(),
            priority_status: Vec::new(),
            industry: Vec::new(),
            country: Vec::new(),
            time_series: Vec::new(),
            total_accounts: 0,
            total_cases: 0,
            countries_served: 0,
            industries_served: 0,
        }
    }

    #[test]
    fn no_data_degrades_to_zero_charts_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            charts_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        assert_eq!(render_all(&empty_kpis(), &config), 0);
    }

    #[test]
    fn unwritable_chart_directory_does_not_panic() {
        let config = Config {
            charts_dir: std::path::PathBuf::from("/proc/definitely/not/writable"),
            ..Config::default()
        };
        assert_eq!(render_all(&empty_kpis(), &config), 0);
    }

    #[test]
    fn gradient_endpoints_are_stable() {
        assert_eq!(gradient(0, 10), RGBColor(0x2c, 0x7f, 0xb8));
        assert_eq!(gradient(9, 10), RGBColor(0xd3, 0x54, 0x2e));
        // a single bar takes the start color
        assert_eq!(gradient(0, 1), RGBColor(0x2c, 0x7f, 0xb8));
    }

    #[test]
    fn truncation_keeps_short_names_intact() {
        assert_eq!(truncate("Acme", 24), "Acme");
        assert_eq!(truncate("abcdefghij", 5), "abcde…");
    }
}
