use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use plotters::prelude::RGBColor;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::chart;
use crate::domain::Reading;
use crate::refresh::{self, RefreshHandle};
use crate::report;
use crate::store::{DateRange, ReadingsStore, SharedStore};

const SUHU_COLOR: RGBColor = RGBColor(66, 165, 245);
const KELEMBAPAN_COLOR: RGBColor = RGBColor(102, 187, 106);

/// Raw `start`/`end` fields as submitted by the filter form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilterParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Default)]
struct MonitoringState {
    filter: DateRange,
    readings: Vec<Reading>,
}

/// The monitoring screen: the 10 most recent readings under the current
/// filter, replaced wholesale on every refresh.
pub struct MonitoringDisplay {
    state: RwLock<MonitoringState>,
}

impl MonitoringDisplay {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MonitoringState::default()),
        }
    }

    pub async fn readings(&self) -> Vec<Reading> {
        self.state.read().await.readings.clone()
    }

    /// Re-queries the window under the current filter.
    ///
    /// A failed query is logged and the row set defaults to empty; the next
    /// tick is the retry.
    pub async fn refresh(&self, store: &dyn ReadingsStore) {
        let filter = self.state.read().await.filter.clone();

        let readings = match store.recent_window(&filter).await {
            Ok(readings) => readings,
            Err(error) => {
                log::warn!("monitoring refresh failed, clearing window: {error}");
                Vec::new()
            }
        };

        self.state.write().await.readings = readings;
    }

    /// Installs a new filter and re-queries when it changed, or when the
    /// request was an explicit "Filter Data" submission (`manual`).
    pub async fn apply_filter(&self, filter: DateRange, manual: bool, store: &dyn ReadingsStore) {
        let changed = {
            let mut state = self.state.write().await;
            if state.filter != filter {
                state.filter = filter;
                true
            } else {
                false
            }
        };

        if changed || manual {
            self.refresh(store).await;
        }
    }
}

pub fn spawn_refresh(
    display: Arc<MonitoringDisplay>,
    store: SharedStore,
    period: Duration,
) -> RefreshHandle {
    refresh::spawn(period, move || {
        let display = display.clone();
        let store = store.clone();
        async move { display.refresh(store.as_ref()).await }
    })
}

/// Labels for both charts: each row's capture time as local time-of-day, with
/// the current wall-clock time appended as an extra trailing label. The
/// trailing label has no matching data point in either series; that is
/// inherited behavior and is kept as-is.
pub fn chart_labels(readings: &[Reading], now_label: &str) -> Vec<String> {
    readings
        .iter()
        .map(|reading| {
            reading
                .created_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .chain(std::iter::once(now_label.to_string()))
        .collect()
}

pub async fn page(
    params: FilterParams,
    display: Arc<MonitoringDisplay>,
    store: SharedStore,
) -> Result<impl warp::Reply, warp::Rejection> {
    let manual = params.start.is_some() || params.end.is_some();
    let filter = DateRange::parse(params.start.as_deref(), params.end.as_deref());
    display.apply_filter(filter, manual, store.as_ref()).await;

    let readings = display.readings().await;
    let now_label = Local::now().format("%H:%M:%S").to_string();
    let labels = chart_labels(&readings, &now_label);

    let suhu: Vec<f64> = readings.iter().map(|reading| reading.suhu.0).collect();
    let kelembapan: Vec<f64> = readings.iter().map(|reading| reading.kelembapan.0).collect();

    let suhu_chart =
        chart::bar_chart("Suhu (°C)", &labels, &suhu, SUHU_COLOR).map_err(warp::reject::custom)?;
    let kelembapan_chart = chart::bar_chart("Kelembapan (%)", &labels, &kelembapan, KELEMBAPAN_COLOR)
        .map_err(warp::reject::custom)?;

    let start = escape(params.start.as_deref().unwrap_or(""));
    let end = escape(params.end.as_deref().unwrap_or(""));

    let html = format!(
        "<!doctype html>\n\
         <html lang=\"id\">\n\
         <head><meta charset=\"utf-8\"><title>Alat Monitoring Suhu &amp; Kelembapan</title></head>\n\
         <body>\n\
         <h1>Alat Monitoring Suhu &amp; Kelembapan</h1>\n\
         <form method=\"get\" action=\"/monitoring\">\n\
         <label>Start Date <input type=\"datetime-local\" name=\"start\" value=\"{start}\"></label>\n\
         <label>End Date <input type=\"datetime-local\" name=\"end\" value=\"{end}\"></label>\n\
         <button type=\"submit\">Filter Data</button>\n\
         </form>\n\
         <p><a href=\"/monitoring/report?start={start}&amp;end={end}\">Download PDF</a></p>\n\
         <h2>Monitoring Suhu (&deg;C)</h2>\n\
         {suhu_chart}\n\
         <h2>Monitoring Kelembapan (%)</h2>\n\
         {kelembapan_chart}\n\
         <p><a href=\"/\">Kembali ke Homepage</a></p>\n\
         </body>\n\
         </html>\n"
    );

    Ok(warp::reply::html(html))
}

/// Serves the PDF export of the current in-memory rows as a file download.
pub async fn download(
    params: FilterParams,
    display: Arc<MonitoringDisplay>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let readings = display.readings().await;
    let bytes = report::render(&readings, params.start.as_deref(), params.end.as_deref())
        .map_err(warp::reject::custom)?;

    let response = warp::http::Response::builder()
        .header("content-type", "application/pdf")
        .header(
            "content-disposition",
            format!("attachment; filename=\"{}\"", report::REPORT_FILENAME),
        )
        .body(bytes)
        .map_err(|_| warp::reject::reject())?;

    Ok(response)
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
