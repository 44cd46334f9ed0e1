use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use transit_sim::adapters::outbound::{init_noop_logger, MultiLogger};
use transit_sim::application::RouteOrchestrator;
use transit_sim::config::SimulationConfig;
use transit_sim::domains::logger::DomainLogger;
use transit_sim::domains::map::MapView;
use transit_sim::domains::routing::{PlaceLookup, RouteLookup};
use transit_sim::{DomainError, DomainResult, GeoPoint, NamedPoint, ViewportBounds};

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self { Self { messages: Arc::new(Mutex::new(Vec::new())) } }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
}

struct Offline;

#[async_trait]
impl PlaceLookup for Offline {
    async fn places_in_bounds(&self, _bounds: &ViewportBounds) -> DomainResult<Vec<NamedPoint>> {
        Err(DomainError::Lookup("dns failure".to_string()))
    }
}

#[async_trait]
impl RouteLookup for Offline {
    async fn route_between(&self, _start: GeoPoint, _end: GeoPoint) -> DomainResult<Option<Vec<GeoPoint>>> {
        Err(DomainError::Lookup("dns failure".to_string()))
    }
}

impl MapView for Offline {
    fn bounds(&self) -> ViewportBounds {
        ViewportBounds::default()
    }
}

#[tokio::test(start_paused = true)]
async fn orchestrator_logs_degraded_cycle() {
    let capture = Arc::new(BridgeCapture::new());
    let logger = capture.clone() as Arc<dyn DomainLogger>;
    let offline = Arc::new(Offline);
    let config = SimulationConfig { agent_count: 3, batch_size: 3, seed: Some(1), ..SimulationConfig::default() };
    let orch = RouteOrchestrator::new(offline.clone(), offline.clone(), offline, logger, config);

    let report = orch.generate_routes().await.unwrap();
    assert_eq!(report.routes, 0);
    assert_eq!(report.failed_lookups, report.requested);

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m.starts_with("WARN:Place lookup failed")));
    assert!(msgs.iter().any(|m| m.starts_with("WARN:Route lookup")));
    assert!(msgs.iter().any(|m| m.contains("Generation cycle 1 finished: 0 routes")));
}

#[test]
fn multi_logger_forwards_to_both() {
    let first = Arc::new(BridgeCapture::new());
    let second = Arc::new(BridgeCapture::new());
    let multi = MultiLogger::new(first.clone(), Some(second.clone() as Arc<dyn DomainLogger>));

    multi.info("one");
    multi.warn("two");
    multi.error("three");

    for capture in [&first, &second] {
        let msgs = capture.messages.lock().unwrap();
        assert_eq!(*msgs, vec!["INFO:one", "WARN:two", "ERR:three"]);
    }

    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");
}
