//! SVG charts drawn with plotters: metric lines over time and the
//! cases-per-million ranking.

use crate::db::models::SeriesPoint;
use crate::error::DashError;
use crate::types::api::GlobalEntry;
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;

pub const CHART_SIZE: (u32, u32) = (960, 480);

fn chart_err<E: std::fmt::Display>(e: E) -> DashError {
    DashError::Chart(e.to_string())
}

/// Compact axis label, e.g. `1.2M`, `35k`, `0.05`.
pub fn compact_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.0}k", value / 1e3)
    } else if abs >= 100.0 || value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn day_label(day: &i32) -> String {
    NaiveDate::from_num_days_from_ce_opt(*day)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Y range padded so flat and single-point lines are still visible.
fn value_range<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let low = min.min(0.0);
    let high = if max > low { max * 1.05 } else { low + 1.0 };
    (low, high)
}

/// Line chart: one line per `(label, points)` pair, sharing the date axis.
pub fn line_chart(
    title: &str,
    y_desc: &str,
    lines: &[(String, Vec<SeriesPoint>)],
) -> Result<String, DashError> {
    let days = lines
        .iter()
        .flat_map(|(_, points)| points.iter().map(|p| p.date.num_days_from_ce()));
    let (first, last) = days.fold((i32::MAX, i32::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let (first, last) = if first > last {
        (0, 1)
    } else if first == last {
        (first - 1, last + 1)
    } else {
        (first, last)
    };
    let (y_min, y_max) =
        value_range(lines.iter().flat_map(|(_, points)| points.iter().map(|p| &p.value)));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(72)
            .build_cartesian_2d(first..last, y_min..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&day_label)
            .y_label_formatter(&|v: &f64| compact_number(*v))
            .y_desc(y_desc)
            .draw()
            .map_err(chart_err)?;

        for (idx, (label, points)) in lines.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(
                    points.iter().map(|p| (p.date.num_days_from_ce(), p.value)),
                    color.stroke_width(2),
                ))
                .map_err(chart_err)?
                .label(label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        if lines.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(chart_err)?;
        }

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// Vertical bars of cases per million, labelled by iso code, in the given order.
pub fn ranking_chart(title: &str, entries: &[&GlobalEntry]) -> Result<String, DashError> {
    let labels: Vec<String> = entries.iter().map(|e| e.iso_code.clone()).collect();
    let (_, y_max) = value_range(entries.iter().map(|e| &e.cases_per_million));
    let bar_count = entries.len().max(1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(72)
            .build_cartesian_2d((0..bar_count).into_segmented(), 0.0..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bar_count)
            .x_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .y_label_formatter(&|v: &f64| compact_number(*v))
            .y_desc("cases per million")
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, e)| {
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), e.cases_per_million),
                    ],
                    BLUE.mix(0.7).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(d: u32, value: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2021, 1, d).unwrap(),
            value,
        }
    }

    #[test]
    fn compact_numbers() {
        assert_eq!(compact_number(2_500_000.0), "2.5M");
        assert_eq!(compact_number(35_000.0), "35k");
        assert_eq!(compact_number(512.0), "512");
        assert_eq!(compact_number(0.05), "0.05");
        assert_eq!(compact_number(3.0), "3");
    }

    #[test]
    fn value_range_pads_flat_series() {
        assert_eq!(value_range([5.0, 5.0].iter()), (0.0, 5.25));
        assert_eq!(value_range([0.0].iter()), (0.0, 1.0));
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn renders_line_chart_svg() {
        let lines = vec![
            ("Testland".to_string(), vec![point(1, 1.0), point(2, 3.0), point(3, 7.0)]),
            ("Otherland".to_string(), vec![point(2, 2.0)]),
        ];
        let svg = line_chart("Total Cases", "count", &lines).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Total Cases"));
        assert!(svg.contains("<polyline"));
    }

    #[test]
    fn renders_ranking_chart_svg() {
        let entry = GlobalEntry {
            iso_code: "TST".to_string(),
            country: "Testland".to_string(),
            total_cases: 10.0,
            cases_per_million: 1000.0,
        };
        let svg = ranking_chart("Top", &[&entry]).unwrap();
        assert!(svg.contains("<rect"));
        assert!(svg.contains("Top"));
    }
}
