//! SQL DDL for the country and daily-record tables.
//! SQLite-first design; dates are stored as `YYYY-MM-DD` text so they sort lexically.

/// SQLite schema with:
/// - `countries.iso_code` UNIQUE (get-or-create key)
/// - `covid_data` UNIQUE(`country_id`, `date`) (upsert key)
/// - every metric column nullable; NULL means unknown
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    iso_code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    continent TEXT NOT NULL DEFAULT '',
    population INTEGER NULL
);

CREATE TABLE IF NOT EXISTS covid_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    country_id INTEGER NOT NULL REFERENCES countries(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    total_cases REAL NULL,
    new_cases REAL NULL,
    new_cases_smoothed REAL NULL,
    total_deaths REAL NULL,
    new_deaths REAL NULL,
    new_deaths_smoothed REAL NULL,
    total_vaccinations REAL NULL,
    people_vaccinated REAL NULL,
    people_fully_vaccinated REAL NULL,
    new_vaccinations REAL NULL,
    new_vaccinations_smoothed REAL NULL,
    reproduction_rate REAL NULL,
    icu_patients REAL NULL,
    hosp_patients REAL NULL,
    positive_rate REAL NULL,
    UNIQUE (country_id, date)
);

CREATE INDEX IF NOT EXISTS idx_covid_data_date ON covid_data(date);
"#;
