use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_sim::adapters::inbound::SimulatedMapView;
use transit_sim::adapters::outbound::{
    init_domain_logger, GeoJsonRenderSink, MultiRenderSink, OsrmRouteLookup, OverpassPlaceLookup,
    TracingRenderSink,
};
use transit_sim::application::{AgentFleet, FrameScheduler, IntervalScheduler, RouteOrchestrator};
use transit_sim::domains::render::RenderSink;
use transit_sim::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting transit simulation");

    let config = Config::load(Some(Path::new("config.toml")))?;
    info!(
        agents = config.simulation.agent_count,
        batch = config.simulation.batch_size,
        "Configuration loaded"
    );
    info!("Route provider: {}", config.providers.osrm_url);

    let logger = init_domain_logger(config.logging.file.as_deref());

    let places = Arc::new(OverpassPlaceLookup::new(&config.providers)?);
    let directions = Arc::new(OsrmRouteLookup::new(&config.providers)?);
    let (map, signals) = SimulatedMapView::new(config.viewport, 16);
    let map = Arc::new(map);

    let orchestrator = Arc::new(RouteOrchestrator::new(
        places,
        directions,
        map.clone(),
        logger.clone(),
        config.simulation.clone(),
    ));

    let scheduler = Arc::new(IntervalScheduler::new(config.simulation.frame_interval()));
    let frame_driver = scheduler.spawn();

    let snapshot =
        config.logging.snapshot_path.as_ref().map(|_| Arc::new(GeoJsonRenderSink::new()));
    let sink: Arc<dyn RenderSink> = Arc::new(MultiRenderSink::new(
        Arc::new(TracingRenderSink),
        snapshot.clone().map(|s| s as Arc<dyn RenderSink>),
    ));

    let fleet = AgentFleet::new(
        scheduler.clone() as Arc<dyn FrameScheduler>,
        sink,
        logger.clone(),
        config.simulation.speed_min_kmh,
        config.simulation.speed_max_kmh,
    );
    let fleet_task = tokio::spawn(fleet.run(orchestrator.subscribe()));
    let orchestrator_task = tokio::spawn(orchestrator.clone().run(signals));

    map.load().await?;
    info!("Map loaded, first routes follow after the settle delay");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down transit simulation");

    orchestrator_task.abort();
    frame_driver.abort();

    // Dropping the fleet clears every route and marker from the sinks.
    if let (Some(sink), Some(path)) = (snapshot, config.logging.snapshot_path.as_deref()) {
        match sink.write_to(path) {
            Ok(()) => info!("Wrote GeoJSON snapshot to {}", path),
            Err(e) => error!("Failed to write snapshot: {}", e),
        }
    }
    fleet_task.abort();

    Ok(())
}
