// One generation cycle against the configured providers, printed as GeoJSON.

use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use transit_sim::adapters::inbound::SimulatedMapView;
use transit_sim::adapters::outbound::{
    init_console_logger, GeoJsonRenderSink, OsrmRouteLookup, OverpassPlaceLookup,
};
use transit_sim::application::RouteOrchestrator;
use transit_sim::domains::render::{RenderSink, RouteDrawRequest};
use transit_sim::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(Some(Path::new("config.toml")))?;
    let logger = init_console_logger();

    let (map, _signals) = SimulatedMapView::new(config.viewport, 1);
    let orchestrator = RouteOrchestrator::new(
        Arc::new(OverpassPlaceLookup::new(&config.providers)?),
        Arc::new(OsrmRouteLookup::new(&config.providers)?),
        Arc::new(map),
        logger.clone(),
        config.simulation.clone(),
    );

    let Some(report) = orchestrator.generate_routes().await else {
        return Err("route generation did not start".into());
    };
    logger.info(&format!("{:?}", report));

    let sink = GeoJsonRenderSink::new();
    for route in orchestrator.routes().iter() {
        sink.draw_route(RouteDrawRequest::for_route(route));
    }
    println!("{}", serde_json::to_string_pretty(&sink.feature_collection())?);

    Ok(())
}
