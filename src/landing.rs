use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::Temperature;
use crate::refresh::{self, RefreshHandle};
use crate::store::{ReadingsStore, SharedStore};

/// The landing screen: a single optional temperature value.
///
/// `None` covers both "no data in the store yet" and "first fetch still in
/// flight"; the page shows the fetching placeholder for either.
pub struct LandingDisplay {
    temperature: RwLock<Option<Temperature>>,
}

impl LandingDisplay {
    pub fn new() -> Self {
        Self {
            temperature: RwLock::new(None),
        }
    }

    pub async fn temperature(&self) -> Option<Temperature> {
        *self.temperature.read().await
    }

    /// Replaces the value with the store's most recent temperature.
    ///
    /// A failed query is logged and otherwise ignored; the previously shown
    /// value persists and the next tick is the retry.
    pub async fn refresh(&self, store: &dyn ReadingsStore) {
        match store.latest_temperature().await {
            Ok(value) => *self.temperature.write().await = value,
            Err(error) => log::warn!("landing refresh failed, keeping last value: {error}"),
        }
    }
}

pub fn spawn_refresh(
    display: Arc<LandingDisplay>,
    store: SharedStore,
    period: Duration,
) -> RefreshHandle {
    refresh::spawn(period, move || {
        let display = display.clone();
        let store = store.clone();
        async move { display.refresh(store.as_ref()).await }
    })
}

pub async fn page(display: Arc<LandingDisplay>) -> Result<impl warp::Reply, warp::Rejection> {
    let current = match display.temperature().await {
        Some(temperature) => format!("<p class=\"value\">{temperature} &deg;C</p>"),
        None => "<p class=\"value\">Mengambil data suhu...</p>".to_string(),
    };

    let html = format!(
        "<!doctype html>\n\
         <html lang=\"id\">\n\
         <head><meta charset=\"utf-8\"><title>Monitoring Suhu &amp; Kelembapan</title></head>\n\
         <body>\n\
         <h1>Selamat Datang di Monitoring Suhu &amp; Kelembapan</h1>\n\
         <h2>Suhu Saat Ini:</h2>\n\
         {current}\n\
         <p><a href=\"/monitoring\">Lihat Monitoring</a></p>\n\
         </body>\n\
         </html>\n"
    );

    Ok(warp::reply::html(html))
}
