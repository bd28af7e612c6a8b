use crate::error::DashError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

/// A numeric column of the `covid_data` table that can be queried or charted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    TotalCases,
    NewCases,
    NewCasesSmoothed,
    TotalDeaths,
    NewDeaths,
    NewDeathsSmoothed,
    TotalVaccinations,
    PeopleVaccinated,
    PeopleFullyVaccinated,
    NewVaccinations,
    NewVaccinationsSmoothed,
    ReproductionRate,
    IcuPatients,
    HospPatients,
    PositiveRate,
}

impl Metric {
    /// Column order used by the schema, the importer and the upsert statement.
    pub const ALL: [Metric; 15] = [
        Metric::TotalCases,
        Metric::NewCases,
        Metric::NewCasesSmoothed,
        Metric::TotalDeaths,
        Metric::NewDeaths,
        Metric::NewDeathsSmoothed,
        Metric::TotalVaccinations,
        Metric::PeopleVaccinated,
        Metric::PeopleFullyVaccinated,
        Metric::NewVaccinations,
        Metric::NewVaccinationsSmoothed,
        Metric::ReproductionRate,
        Metric::IcuPatients,
        Metric::HospPatients,
        Metric::PositiveRate,
    ];

    /// Column name in both the CSV feed and the database.
    pub const fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::NewCases => "new_cases",
            Metric::NewCasesSmoothed => "new_cases_smoothed",
            Metric::TotalDeaths => "total_deaths",
            Metric::NewDeaths => "new_deaths",
            Metric::NewDeathsSmoothed => "new_deaths_smoothed",
            Metric::TotalVaccinations => "total_vaccinations",
            Metric::PeopleVaccinated => "people_vaccinated",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
            Metric::NewVaccinations => "new_vaccinations",
            Metric::NewVaccinationsSmoothed => "new_vaccinations_smoothed",
            Metric::ReproductionRate => "reproduction_rate",
            Metric::IcuPatients => "icu_patients",
            Metric::HospPatients => "hosp_patients",
            Metric::PositiveRate => "positive_rate",
        }
    }

    /// Human label, e.g. `new_cases_smoothed` -> `New Cases Smoothed`.
    pub fn title(self) -> String {
        self.column()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lower-case label used inside sentences, e.g. `total cases`.
    pub fn phrase(self) -> String {
        self.column().replace('_', " ")
    }

    /// Every feed metric is reported as a plain count, rates included.
    pub const fn units(self) -> &'static str {
        "count"
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.column() == wanted)
            .ok_or(DashError::UnknownMetric(wanted))
    }
}

/// The fifteen nullable metric values of one `(country, date)` record.
/// `None` means unknown, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Metrics {
    pub total_cases: Option<f64>,
    pub new_cases: Option<f64>,
    pub new_cases_smoothed: Option<f64>,
    pub total_deaths: Option<f64>,
    pub new_deaths: Option<f64>,
    pub new_deaths_smoothed: Option<f64>,
    pub total_vaccinations: Option<f64>,
    pub people_vaccinated: Option<f64>,
    pub people_fully_vaccinated: Option<f64>,
    pub new_vaccinations: Option<f64>,
    pub new_vaccinations_smoothed: Option<f64>,
    pub reproduction_rate: Option<f64>,
    pub icu_patients: Option<f64>,
    pub hosp_patients: Option<f64>,
    pub positive_rate: Option<f64>,
}

impl Metrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        *self.slot(metric)
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        *self.slot_mut(metric) = value;
    }

    /// Values in [`Metric::ALL`] order.
    pub fn values(&self) -> [Option<f64>; 15] {
        Metric::ALL.map(|m| self.get(m))
    }

    fn slot(&self, metric: Metric) -> &Option<f64> {
        match metric {
            Metric::TotalCases => &self.total_cases,
            Metric::NewCases => &self.new_cases,
            Metric::NewCasesSmoothed => &self.new_cases_smoothed,
            Metric::TotalDeaths => &self.total_deaths,
            Metric::NewDeaths => &self.new_deaths,
            Metric::NewDeathsSmoothed => &self.new_deaths_smoothed,
            Metric::TotalVaccinations => &self.total_vaccinations,
            Metric::PeopleVaccinated => &self.people_vaccinated,
            Metric::PeopleFullyVaccinated => &self.people_fully_vaccinated,
            Metric::NewVaccinations => &self.new_vaccinations,
            Metric::NewVaccinationsSmoothed => &self.new_vaccinations_smoothed,
            Metric::ReproductionRate => &self.reproduction_rate,
            Metric::IcuPatients => &self.icu_patients,
            Metric::HospPatients => &self.hosp_patients,
            Metric::PositiveRate => &self.positive_rate,
        }
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::TotalCases => &mut self.total_cases,
            Metric::NewCases => &mut self.new_cases,
            Metric::NewCasesSmoothed => &mut self.new_cases_smoothed,
            Metric::TotalDeaths => &mut self.total_deaths,
            Metric::NewDeaths => &mut self.new_deaths,
            Metric::NewDeathsSmoothed => &mut self.new_deaths_smoothed,
            Metric::TotalVaccinations => &mut self.total_vaccinations,
            Metric::PeopleVaccinated => &mut self.people_vaccinated,
            Metric::PeopleFullyVaccinated => &mut self.people_fully_vaccinated,
            Metric::NewVaccinations => &mut self.new_vaccinations,
            Metric::NewVaccinationsSmoothed => &mut self.new_vaccinations_smoothed,
            Metric::ReproductionRate => &mut self.reproduction_rate,
            Metric::IcuPatients => &mut self.icu_patients,
            Metric::HospPatients => &mut self.hosp_patients,
            Metric::PositiveRate => &mut self.positive_rate,
        }
    }
}
