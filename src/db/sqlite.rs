use crate::db::models::{
    CountryCases, CountrySummary, DataStatus, DbCountry, DbCovidRecord, ImportRow, NewCountry,
    RecentRecord, SampleRecord, SeriesPoint,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::DashError;
use crate::types::metric::{Metric, Metrics};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteConnection};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

pub type SqlitePool = Pool<Sqlite>;

const COUNTRY_COLUMNS: &str = "id, iso_code, name, continent, population";

/// `INSERT ... ON CONFLICT(country_id, date) DO UPDATE` over every metric column.
static UPSERT_RECORD: LazyLock<String> = LazyLock::new(|| {
    let columns: Vec<&str> = Metric::ALL.iter().map(|m| m.column()).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let updates = columns
        .iter()
        .map(|c| format!("{c}=excluded.{c}"))
        .collect::<Vec<_>>()
        .join(",\n    ");
    format!(
        "INSERT INTO covid_data (country_id, date, {}) VALUES (?, ?, {placeholders})\n\
         ON CONFLICT(country_id, date) DO UPDATE SET\n    {updates}",
        columns.join(", ")
    )
});

/// Open (creating if needed) the database and apply the schema.
pub async fn open(database_url: &str) -> Result<CovidStorage, DashError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `:memory:` is its own database; pin the pool to one.
    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
    };

    let storage = CovidStorage::new(pool_options.connect_with(options).await?);
    storage.init_schema().await?;
    Ok(storage)
}

#[derive(Clone)]
pub struct CovidStorage {
    pool: SqlitePool,
}

impl CovidStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), DashError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Get-or-create by unique iso_code. Existing rows are left untouched.
    /// Returns the row id and whether it was created.
    pub async fn get_or_create_country(
        &self,
        country: &NewCountry,
    ) -> Result<(i64, bool), DashError> {
        let mut conn = self.pool.acquire().await?;
        get_or_create_country(&mut *conn, country).await
    }

    /// Upsert by unique `(country_id, date)`, overwriting every metric column.
    pub async fn upsert_record(
        &self,
        country_id: i64,
        date: NaiveDate,
        metrics: &Metrics,
    ) -> Result<(), DashError> {
        let mut conn = self.pool.acquire().await?;
        upsert_record(&mut *conn, country_id, date, metrics).await
    }

    /// Write a chunk of feed rows in one transaction.
    /// `known` caches iso_code -> id across chunks. Returns the number of countries created.
    pub async fn upsert_batch(
        &self,
        rows: &[ImportRow],
        known: &mut HashMap<String, i64>,
    ) -> Result<usize, DashError> {
        let mut tx = self.pool.begin().await?;
        let mut created = 0;
        // ids first seen in this chunk are only cached once it commits
        let mut pending: HashMap<String, i64> = HashMap::new();

        for row in rows {
            let iso = row.country.iso_code.as_str();
            let country_id = match known.get(iso).or_else(|| pending.get(iso)) {
                Some(id) => *id,
                None => {
                    let (id, was_created) =
                        get_or_create_country(&mut *tx, &row.country).await?;
                    if was_created {
                        created += 1;
                    }
                    pending.insert(iso.to_string(), id);
                    id
                }
            };
            upsert_record(&mut *tx, country_id, row.date, &row.metrics).await?;
        }

        tx.commit().await?;
        known.extend(pending);
        Ok(created)
    }

    pub async fn find_country(&self, iso_code: &str) -> Result<Option<DbCountry>, DashError> {
        let country = sqlx::query_as::<_, DbCountry>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE iso_code = ?"
        ))
        .bind(iso_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(country)
    }

    /// Case-insensitive exact match on iso_code.
    pub async fn find_country_ignore_case(
        &self,
        iso_code: &str,
    ) -> Result<Option<DbCountry>, DashError> {
        let country = sqlx::query_as::<_, DbCountry>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE UPPER(iso_code) = UPPER(?)"
        ))
        .bind(iso_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(country)
    }

    /// Iso codes containing `fragment`, case-insensitively.
    pub async fn similar_iso_codes(
        &self,
        fragment: &str,
        limit: i64,
    ) -> Result<Vec<String>, DashError> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT iso_code FROM countries
             WHERE instr(UPPER(iso_code), UPPER(?)) > 0
             ORDER BY iso_code LIMIT ?",
        )
        .bind(fragment)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    /// Countries whose name contains `query`, case-insensitively.
    pub async fn search_by_name(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<CountrySummary>, DashError> {
        let rows = sqlx::query_as::<_, CountrySummary>(
            "SELECT iso_code, name FROM countries
             WHERE instr(LOWER(name), LOWER(?)) > 0
             ORDER BY name LIMIT ?",
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_countries(&self) -> Result<Vec<CountrySummary>, DashError> {
        let rows = sqlx::query_as::<_, CountrySummary>(
            "SELECT iso_code, name FROM countries ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Non-null values of `metric` in `[start, end]`, ascending by date.
    pub async fn series(
        &self,
        country_id: i64,
        metric: Metric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SeriesPoint>, DashError> {
        let column = metric.column();
        let points = sqlx::query_as::<_, SeriesPoint>(&format!(
            "SELECT date, {column} AS value FROM covid_data
             WHERE country_id = ? AND date >= ? AND date <= ? AND {column} IS NOT NULL
             ORDER BY date ASC"
        ))
        .bind(country_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }

    /// Every non-null value of `metric` for one country, ascending by date.
    pub async fn full_series(
        &self,
        country_id: i64,
        metric: Metric,
    ) -> Result<Vec<SeriesPoint>, DashError> {
        let column = metric.column();
        let points = sqlx::query_as::<_, SeriesPoint>(&format!(
            "SELECT date, {column} AS value FROM covid_data
             WHERE country_id = ? AND {column} IS NOT NULL
             ORDER BY date ASC"
        ))
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(points)
    }

    pub async fn get_record(
        &self,
        country_id: i64,
        date: NaiveDate,
    ) -> Result<Option<DbCovidRecord>, DashError> {
        let record = sqlx::query_as::<_, DbCovidRecord>(
            "SELECT * FROM covid_data WHERE country_id = ? AND date = ?",
        )
        .bind(country_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Most recent records of one country, newest first.
    pub async fn recent_records(
        &self,
        country_id: i64,
        limit: i64,
    ) -> Result<Vec<RecentRecord>, DashError> {
        let rows = sqlx::query_as::<_, RecentRecord>(
            "SELECT date, total_cases, new_cases, total_deaths FROM covid_data
             WHERE country_id = ? ORDER BY date DESC LIMIT ?",
        )
        .bind(country_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_records(&self) -> Result<i64, DashError> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM covid_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Aggregate counts, latest date and the five newest records.
    pub async fn status(&self) -> Result<DataStatus, DashError> {
        let total_countries = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;
        let countries_with_population = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM countries WHERE population IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        let total_covid_records = self.count_records().await?;
        let latest_date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT date FROM covid_data ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        let sample_data = sqlx::query_as::<_, SampleRecord>(
            "SELECT d.date, d.total_cases, d.new_cases,
                    c.name AS country_name, c.population AS country_population
             FROM covid_data d JOIN countries c ON c.id = d.country_id
             ORDER BY d.date DESC, c.iso_code LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(DataStatus {
            total_countries,
            countries_with_population,
            total_covid_records,
            latest_date,
            sample_data,
        })
    }

    /// Latest date on which any country reported `total_cases`.
    pub async fn latest_date_with_cases(&self) -> Result<Option<NaiveDate>, DashError> {
        let date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT date FROM covid_data WHERE total_cases IS NOT NULL
             ORDER BY date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(date)
    }

    /// Countries with a known, non-zero population that have a record on `date`.
    pub async fn cases_on(&self, date: NaiveDate) -> Result<Vec<CountryCases>, DashError> {
        let rows = sqlx::query_as::<_, CountryCases>(
            "SELECT c.iso_code, c.name, c.population, d.total_cases
             FROM countries c JOIN covid_data d ON d.country_id = c.id
             WHERE d.date = ? AND c.population IS NOT NULL AND c.population != 0
             ORDER BY c.iso_code",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

async fn get_or_create_country(
    conn: &mut SqliteConnection,
    country: &NewCountry,
) -> Result<(i64, bool), DashError> {
    let result = sqlx::query(
        r#"
        INSERT INTO countries (iso_code, name, continent, population)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(iso_code) DO NOTHING
        "#,
    )
    .bind(&country.iso_code)
    .bind(&country.name)
    .bind(&country.continent)
    .bind(country.population)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok((result.last_insert_rowid(), true));
    }

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM countries WHERE iso_code = ?")
        .bind(&country.iso_code)
        .fetch_one(&mut *conn)
        .await?;
    Ok((id, false))
}

async fn upsert_record(
    conn: &mut SqliteConnection,
    country_id: i64,
    date: NaiveDate,
    metrics: &Metrics,
) -> Result<(), DashError> {
    let mut query = sqlx::query(UPSERT_RECORD.as_str()).bind(country_id).bind(date);
    for value in metrics.values() {
        query = query.bind(value);
    }
    query.execute(&mut *conn).await?;
    Ok(())
}
