use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPool;
use warp::Filter;

mod chart;
mod config;
mod domain;
mod error;
mod landing;
mod monitoring;
mod refresh;
mod report;
mod store;

use crate::config::Config;
use landing::LandingDisplay;
use monitoring::MonitoringDisplay;
use store::{PgReadingsStore, SharedStore};

/// Both displays re-query the store on this fixed cadence.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

fn with_state<T>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: Clone + Send + Sync + 'static,
{
    warp::any().map(move || value.clone())
}

fn routes(
    landing: Arc<LandingDisplay>,
    monitoring: Arc<MonitoringDisplay>,
    store: SharedStore,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let landing_route = warp::get()
        .and(warp::path::end())
        .and(with_state(landing))
        .and_then(landing::page);

    let report_route = warp::get()
        .and(warp::path!("monitoring" / "report"))
        .and(warp::query::<monitoring::FilterParams>())
        .and(with_state(monitoring.clone()))
        .and_then(monitoring::download);

    let monitoring_route = warp::get()
        .and(warp::path("monitoring"))
        .and(warp::path::end())
        .and(warp::query::<monitoring::FilterParams>())
        .and(with_state(monitoring))
        .and(with_state(store))
        .and_then(monitoring::page);

    landing_route.or(report_route).or(monitoring_route)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load()?;
    let address = config.server_address()?;

    let pool = PgPool::connect(&config.database.url).await?;
    let store: SharedStore = Arc::new(PgReadingsStore::new(pool));

    let landing = Arc::new(LandingDisplay::new());
    let monitoring = Arc::new(MonitoringDisplay::new());

    let _landing_refresh = landing::spawn_refresh(landing.clone(), store.clone(), POLL_INTERVAL);
    let _monitoring_refresh =
        monitoring::spawn_refresh(monitoring.clone(), store.clone(), POLL_INTERVAL);

    log::info!("serving monitoring dashboard on {address}");

    warp::serve(routes(landing, monitoring, store)).run(address).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Humidity, Reading, Temperature};
    use crate::error::Error;
    use crate::store::{DateRange, ReadingsStore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct StubStore;

    #[async_trait]
    impl ReadingsStore for StubStore {
        async fn latest_temperature(&self) -> Result<Option<Temperature>, Error> {
            Ok(Some(Temperature(25.0)))
        }

        async fn recent_window(&self, _filter: &DateRange) -> Result<Vec<Reading>, Error> {
            Ok(vec![Reading {
                id: 1,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
                suhu: Temperature(25.0),
                kelembapan: Humidity(60.0),
            }])
        }
    }

    fn test_routes() -> (
        Arc<LandingDisplay>,
        Arc<MonitoringDisplay>,
        impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone,
    ) {
        let landing = Arc::new(LandingDisplay::new());
        let monitoring = Arc::new(MonitoringDisplay::new());
        let store: SharedStore = Arc::new(StubStore);
        let filter = routes(landing.clone(), monitoring.clone(), store);
        (landing, monitoring, filter)
    }

    #[tokio::test]
    async fn landing_page_shows_placeholder_before_first_fetch() {
        let (_, _, filter) = test_routes();

        let response = warp::test::request().path("/").reply(&filter).await;

        assert_eq!(response.status(), 200);
        let body = String::from_utf8_lossy(response.body());
        assert!(body.contains("Mengambil data suhu..."));
        assert!(body.contains("/monitoring"));
    }

    #[tokio::test]
    async fn landing_page_shows_the_fetched_temperature() {
        let (landing, _, filter) = test_routes();
        landing.refresh(&StubStore).await;

        let response = warp::test::request().path("/").reply(&filter).await;

        let body = String::from_utf8_lossy(response.body());
        assert!(body.contains("25 &deg;C"));
    }

    #[tokio::test]
    async fn monitoring_page_renders_filter_form_and_charts() {
        let (_, _, filter) = test_routes();

        let response = warp::test::request().path("/monitoring").reply(&filter).await;

        assert_eq!(response.status(), 200);
        let body = String::from_utf8_lossy(response.body());
        assert!(body.contains("Filter Data"));
        assert!(body.contains("Download PDF"));
        assert!(body.contains("Monitoring Suhu"));
        assert!(body.contains("Monitoring Kelembapan"));
    }

    #[tokio::test]
    async fn filter_submission_triggers_an_immediate_requery() {
        let (_, monitoring, filter) = test_routes();

        let response = warp::test::request()
            .path("/monitoring?start=2024-01-01T00:00&end=2024-01-02T00:00")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(monitoring.readings().await.len(), 1);
    }

    #[tokio::test]
    async fn report_download_carries_pdf_headers_and_filename() {
        let (_, monitoring, filter) = test_routes();
        monitoring.refresh(&StubStore).await;

        let response = warp::test::request()
            .path("/monitoring/report?start=2023-12-30T00:00&end=2024-01-03T00:00")
            .reply(&filter)
            .await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        assert!(response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("data-suhu-kelembapan.pdf"));
        assert!(response.body().starts_with(b"%PDF"));
    }
}
