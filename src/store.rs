use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::postgres::PgPool;

use crate::domain::{Reading, Temperature};
use crate::error::Error;

/// Fixed size of the "most recent" window shown on the monitoring display.
pub const WINDOW_SIZE: i64 = 10;

const LATEST_SQL: &str = "select suhu from suhu order by id desc limit 1";

const WINDOW_SQL: &str =
    "select id, created_at, suhu, kelembapan from suhu order by id desc limit $1";

const WINDOW_SQL_BOUNDED: &str = "select id, created_at, suhu, kelembapan from suhu \
     where created_at >= $2 and created_at <= $3 \
     order by id desc limit $1";

/// Optional inclusive `created_at` restriction for the window query.
///
/// The range predicate is applied only when both ends are set; a single bound
/// behaves as if no filter was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parses the two raw `datetime-local` form fields (`%Y-%m-%dT%H:%M`,
    /// seconds tolerated). Empty or unparsable input degrades to unset.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        DateRange {
            start: start.and_then(parse_datetime_local),
            end: end.and_then(parse_datetime_local),
        }
    }

    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

fn parse_datetime_local(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Statement used for the window query under the given filter.
pub fn window_sql(filter: &DateRange) -> &'static str {
    if filter.bounds().is_some() {
        WINDOW_SQL_BOUNDED
    } else {
        WINDOW_SQL
    }
}

/// Read-only access to the hosted readings store.
#[async_trait]
pub trait ReadingsStore: Send + Sync {
    /// Temperature of the reading with the highest `id`, if any exist.
    async fn latest_temperature(&self) -> Result<Option<Temperature>, Error>;

    /// The most recent `WINDOW_SIZE` readings, optionally restricted to the
    /// given inclusive `created_at` range, descending by `id`.
    async fn recent_window(&self, filter: &DateRange) -> Result<Vec<Reading>, Error>;
}

pub type SharedStore = std::sync::Arc<dyn ReadingsStore>;

pub struct PgReadingsStore {
    pool: PgPool,
}

impl PgReadingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingsStore for PgReadingsStore {
    async fn latest_temperature(&self) -> Result<Option<Temperature>, Error> {
        let temperature = sqlx::query_scalar::<_, Temperature>(LATEST_SQL)
            .fetch_optional(&self.pool)
            .await?;

        Ok(temperature)
    }

    async fn recent_window(&self, filter: &DateRange) -> Result<Vec<Reading>, Error> {
        let query = sqlx::query_as::<_, Reading>(window_sql(filter)).bind(WINDOW_SIZE);

        let readings = match filter.bounds() {
            Some((start, end)) => query.bind(start).bind(end).fetch_all(&self.pool).await?,
            None => query.fetch_all(&self.pool).await?,
        };

        Ok(readings)
    }
}
