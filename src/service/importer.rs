use crate::config::ImportConfig;
use crate::db::{CovidStorage, ImportRow, NewCountry};
use crate::error::DashError;
use crate::types::metric::{Metric, Metrics};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

/// Where the feed comes from: the remote OWID URL or a local copy.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    Remote(Url),
    File(PathBuf),
}

impl FeedSource {
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            _ => Self::File(PathBuf::from(raw)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub progress_every: usize,
}

impl From<&ImportConfig> for ImportOptions {
    fn from(cfg: &ImportConfig) -> Self {
        Self {
            batch_size: cfg.batch_size.max(1),
            progress_every: cfg.progress_every.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub countries_created: usize,
}

/// Why a single feed row was skipped.
#[derive(Debug, ThisError, PartialEq)]
pub enum RowError {
    #[error("empty iso_code")]
    MissingIsoCode,

    #[error("unparseable date `{0}`")]
    BadDate(String),

    #[error("non-numeric `{column}` value `{value}`")]
    BadNumber { column: &'static str, value: String },
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    iso_code: usize,
    location: usize,
    date: usize,
    continent: Option<usize>,
    population: Option<usize>,
    metrics: Vec<(Metric, usize)>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, DashError> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();
        let required = |name: &'static str| {
            index
                .get(name)
                .copied()
                .ok_or(DashError::MissingColumn(name))
        };

        Ok(Self {
            iso_code: required("iso_code")?,
            location: required("location")?,
            date: required("date")?,
            continent: index.get("continent").copied(),
            population: index.get("population").copied(),
            metrics: Metric::ALL
                .into_iter()
                .filter_map(|m| index.get(m.column()).map(|i| (m, *i)))
                .collect(),
        })
    }
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).map(str::trim).unwrap_or("")
}

/// Empty (or NaN) cells are unknown, not zero.
fn parse_number(column: &'static str, raw: &str) -> Result<Option<f64>, RowError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(|_| RowError::BadNumber {
        column,
        value: raw.to_string(),
    })?;
    Ok((!value.is_nan()).then_some(value))
}

fn parse_row(record: &StringRecord, cols: &Columns) -> Result<ImportRow, RowError> {
    let iso_code = cell(record, cols.iso_code);
    if iso_code.is_empty() {
        return Err(RowError::MissingIsoCode);
    }

    let raw_date = cell(record, cols.date);
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|_| RowError::BadDate(raw_date.to_string()))?;

    // the feed writes population as a float, e.g. `331002647.0`
    let population = match cols.population {
        Some(idx) => parse_number("population", cell(record, idx))?
            .filter(|p| p.is_finite())
            .map(|p| p.round() as i64),
        None => None,
    };

    let mut metrics = Metrics::default();
    for (metric, idx) in &cols.metrics {
        metrics.set(*metric, parse_number(metric.column(), cell(record, *idx))?);
    }

    Ok(ImportRow {
        country: NewCountry {
            iso_code: iso_code.to_string(),
            name: cell(record, cols.location).to_string(),
            continent: cols
                .continent
                .map(|idx| cell(record, idx).to_string())
                .unwrap_or_default(),
            population,
        },
        date,
        metrics,
    })
}

/// Import a CSV feed: get-or-create each row's country, then upsert its record.
/// Rows are committed in chunks of `batch_size`; earlier chunks survive a later failure.
/// A read error flushes the rows parsed so far before it is returned.
pub async fn import_reader<R: Read>(
    storage: &CovidStorage,
    reader: R,
    opts: ImportOptions,
) -> Result<ImportSummary, DashError> {
    let batch_size = opts.batch_size.max(1);
    let progress_every = opts.progress_every.max(1);

    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::from_headers(csv_reader.headers()?)?;

    let mut summary = ImportSummary::default();
    let mut known: HashMap<String, i64> = HashMap::new();
    let mut batch: Vec<ImportRow> = Vec::with_capacity(batch_size);

    for (line, record) in csv_reader.records().enumerate() {
        // header is line 1
        let line = line + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                flush(storage, &mut batch, &mut known, &mut summary).await?;
                warn!(line, rows_imported = summary.rows_imported, "feed read failed");
                return Err(e.into());
            }
            Err(e) => {
                summary.rows_read += 1;
                summary.rows_skipped += 1;
                warn!(line, error = %e, "skipping undecodable feed row");
                continue;
            }
        };
        summary.rows_read += 1;

        match parse_row(&record, &cols) {
            Ok(row) => batch.push(row),
            Err(e) => {
                summary.rows_skipped += 1;
                warn!(line, error = %e, "skipping feed row");
            }
        }

        if batch.len() >= batch_size {
            flush(storage, &mut batch, &mut known, &mut summary).await?;
        }

        if summary.rows_read % progress_every == 0 {
            info!(rows = summary.rows_read, "processed feed rows");
        }
    }

    flush(storage, &mut batch, &mut known, &mut summary).await?;

    info!(
        rows_read = summary.rows_read,
        rows_imported = summary.rows_imported,
        rows_skipped = summary.rows_skipped,
        countries_created = summary.countries_created,
        "feed import finished"
    );
    Ok(summary)
}

async fn flush(
    storage: &CovidStorage,
    batch: &mut Vec<ImportRow>,
    known: &mut HashMap<String, i64>,
    summary: &mut ImportSummary,
) -> Result<(), DashError> {
    if batch.is_empty() {
        return Ok(());
    }
    summary.countries_created += storage.upsert_batch(batch, known).await?;
    summary.rows_imported += batch.len();
    batch.clear();
    Ok(())
}

/// Stream the feed body into `dest` chunk by chunk. No retries.
pub async fn download_feed(
    client: &reqwest::Client,
    url: &Url,
    dest: &Path,
) -> Result<u64, DashError> {
    info!(url = %url, "downloading COVID-19 feed");
    let mut resp = client.get(url.clone()).send().await?.error_for_status()?;
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    info!(bytes = written, path = %dest.display(), "feed downloaded");
    Ok(written)
}

async fn import_file(
    storage: &CovidStorage,
    path: &Path,
    opts: ImportOptions,
) -> Result<ImportSummary, DashError> {
    let file = std::fs::File::open(path)?;
    import_reader(storage, file, opts).await
}

/// Import `source`. A remote feed is staged in the temp dir and parsed from disk.
pub async fn run(
    storage: &CovidStorage,
    client: &reqwest::Client,
    source: &FeedSource,
    opts: ImportOptions,
) -> Result<ImportSummary, DashError> {
    match source {
        FeedSource::Remote(url) => {
            let staged = std::env::temp_dir()
                .join(format!("covid-dash-download-{}.csv", std::process::id()));
            let result = match download_feed(client, url, &staged).await {
                Ok(_) => import_file(storage, &staged, opts).await,
                Err(e) => Err(e),
            };
            if let Err(e) = tokio::fs::remove_file(&staged).await {
                warn!(path = %staged.display(), error = %e, "could not remove staged feed");
            }
            result
        }
        FeedSource::File(path) => {
            info!(path = %path.display(), "reading COVID-19 feed from file");
            import_file(storage, path, opts).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "iso_code,continent,location,date,population,total_cases,new_cases,positive_rate";

    fn columns() -> Columns {
        Columns::from_headers(&StringRecord::from(HEADER.split(',').collect::<Vec<_>>())).unwrap()
    }

    fn record(line: &str) -> StringRecord {
        StringRecord::from(line.split(',').collect::<Vec<_>>())
    }

    #[test]
    fn parses_full_row() {
        let row = parse_row(
            &record("USA,North America,United States,2021-03-01,331002647.0,100.0,5,0.05"),
            &columns(),
        )
        .unwrap();
        assert_eq!(row.country.iso_code, "USA");
        assert_eq!(row.country.name, "United States");
        assert_eq!(row.country.continent, "North America");
        assert_eq!(row.country.population, Some(331_002_647));
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert_eq!(row.metrics.total_cases, Some(100.0));
        assert_eq!(row.metrics.new_cases, Some(5.0));
        assert_eq!(row.metrics.positive_rate, Some(0.05));
        assert_eq!(row.metrics.total_deaths, None);
    }

    #[test]
    fn empty_cells_are_unknown() {
        let row = parse_row(&record("OWID_WRL,,World,2021-03-01,,,0,"), &columns()).unwrap();
        assert_eq!(row.country.continent, "");
        assert_eq!(row.country.population, None);
        assert_eq!(row.metrics.total_cases, None);
        assert_eq!(row.metrics.new_cases, Some(0.0));
        assert_eq!(row.metrics.positive_rate, None);
    }

    #[test]
    fn rejects_bad_rows() {
        let cols = columns();
        assert_eq!(
            parse_row(&record(",Europe,Nowhere,2021-03-01,1,1,1,1"), &cols),
            Err(RowError::MissingIsoCode)
        );
        assert_eq!(
            parse_row(&record("FRA,Europe,France,03/01/2021,1,1,1,1"), &cols),
            Err(RowError::BadDate("03/01/2021".to_string()))
        );
        assert!(matches!(
            parse_row(&record("FRA,Europe,France,2021-03-01,1,lots,1,1"), &cols),
            Err(RowError::BadNumber { column: "total_cases", .. })
        ));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let err = Columns::from_headers(&record("iso_code,location,total_cases")).unwrap_err();
        assert!(matches!(err, DashError::MissingColumn("date")));
    }

    #[test]
    fn feed_source_detection() {
        assert!(matches!(
            FeedSource::parse("https://example.org/data.csv"),
            FeedSource::Remote(_)
        ));
        assert_eq!(
            FeedSource::parse("data/owid.csv"),
            FeedSource::File(PathBuf::from("data/owid.csv"))
        );
    }
}
