//! Minimal HTML shells around the SVG charts.

use crate::db::models::CountrySummary;
use crate::types::api::GlobalSnapshot;
use crate::types::metric::Metric;
use chrono::NaiveDate;
use std::fmt::Write;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:4px 8px;text-align:right}}\
         .error{{color:#9c0006}}</style></head>\n<body>\n{body}\n</body></html>\n",
        escape(title)
    )
}

/// Global view: ranking chart plus the full snapshot table.
pub fn global_page(snapshot: &GlobalSnapshot, chart_svg: &str) -> String {
    let mut body = format!(
        "<h1>COVID-19 Cases per Million</h1>\n<p>Last updated: {}</p>\n{chart_svg}\n\
         <table>\n<tr><th>ISO</th><th>Country</th><th>Total cases</th><th>Cases per million</th></tr>\n",
        snapshot.last_updated
    );
    for entry in &snapshot.countries {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{:.0}</td><td>{:.1}</td></tr>",
            escape(&entry.iso_code),
            escape(&entry.country),
            entry.total_cases,
            entry.cases_per_million
        );
    }
    body.push_str("</table>");
    page("Global dashboard", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    page(
        title,
        &format!(
            "<h1>{}</h1>\n<p class=\"error\">{}</p>",
            escape(title),
            escape(message)
        ),
    )
}

/// Interactive view: selectors driving `/dashboard/chart`.
pub fn interactive_page(countries: &[CountrySummary], start: NaiveDate, end: NaiveDate) -> String {
    let mut country_options = String::new();
    for c in countries {
        let _ = writeln!(
            country_options,
            "<option value=\"{}\">{}</option>",
            escape(&c.iso_code),
            escape(&c.name)
        );
    }
    let mut metric_options = String::new();
    for m in Metric::ALL {
        let _ = writeln!(metric_options, "<option value=\"{m}\">{}</option>", m.title());
    }

    let body = format!(
        r#"<h1>COVID-19 Interactive Dashboard</h1>
<form id="controls">
<select name="country">
{country_options}</select>
<select name="metric">
{metric_options}</select>
<input type="date" name="start_date" value="{start}">
<input type="date" name="end_date" value="{end}">
<button type="submit">Show</button>
</form>
<img id="chart" alt="chart">
<script>
const form = document.getElementById("controls");
form.addEventListener("submit", (ev) => {{
  ev.preventDefault();
  const query = new URLSearchParams(new FormData(form)).toString();
  document.getElementById("chart").src = "/dashboard/chart?" + query;
}});
</script>"#
    );
    page("Interactive dashboard", &body)
}
