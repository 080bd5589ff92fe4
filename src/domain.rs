use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;

/// Temperature in degrees Celsius.
#[derive(Debug, Copy, Clone, PartialEq, Display, Serialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct Temperature(pub f64);

/// Relative humidity in percent.
#[derive(Debug, Copy, Clone, PartialEq, Display, Serialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct Humidity(pub f64);

/// One sensor sample from the `suhu` table.
///
/// Rows are written by an external ingestion process; this application never
/// mutates or deletes them. `id` is the sole ordering key for "most recent".
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub suhu: Temperature,
    pub kelembapan: Humidity,
}
