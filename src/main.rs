use mosque_times::{
    clock::{Clock, SystemClock},
    config::Config,
    data::{JsonStore, MosqueRepository},
    routes::{self, AppState},
    PrayerBoard,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .init();

    let store = JsonStore::new(&config.data_dir);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.demo_dates {
        match store.refresh_demo_dates(clock.now().date()) {
            Ok(count) => tracing::info!("demo prayer times moved to this week in {} file(s)", count),
            Err(err) => tracing::error!("error updating prayer times with current dates: {}", err),
        }
    }

    let database: Arc<dyn MosqueRepository> = Arc::new(store);
    let state = AppState {
        board: PrayerBoard::new(database),
        clock,
    };

    let app = routes::app(state).layer(TraceLayer::new_for_http());

    tracing::info!("listening on {}....", config.addr);
    if let Err(err) = axum::Server::bind(&config.addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server error: {}", err);
        std::process::exit(1);
    }
}
