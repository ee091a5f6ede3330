use chrono::NaiveDate;
use sqlx::FromRow;

use crate::domain::CityInfo;

/// A city from the registry table.
#[derive(Debug, Clone, FromRow)]
pub struct City {
    pub insee: String,
    pub name: String,
    pub postal_code: String,
    pub population: i32,
}

impl From<City> for CityInfo {
    fn from(c: City) -> Self {
        Self {
            insee: c.insee,
            name: c.name,
            postal_code: c.postal_code,
            population: c.population,
        }
    }
}

/// One persisted forecast day, keyed by `(insee, date)`.
///
/// `details` is the JSON-encoded `ForecastDetails`; the store never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredForecastRow {
    pub insee: String,
    pub date: NaiveDate,
    pub details: serde_json::Value,
}
