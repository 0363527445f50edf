use std::future::Future;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::middleware::TrackingState;
use crate::router;
use crate::tracker::Tracker;

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let tracker = if config.print_collector {
        Tracker::printing(config.tracker)
    } else {
        Tracker::install(config.tracker)?
    };

    let state = TrackingState::new(tracker, config.max_body_bytes);
    let app = router::router(state, config.export_prometheus)?;

    tracing::info!("listening on {:?}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
