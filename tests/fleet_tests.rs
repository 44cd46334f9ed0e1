use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use transit_sim::adapters::outbound::{init_noop_logger, GeoJsonRenderSink, MultiRenderSink};
use transit_sim::application::{AgentFleet, FleetSync, FrameScheduler, ManualScheduler};
use transit_sim::domains::motion::{KM_PER_DEGREE, SECONDS_PER_HOUR};
use transit_sim::domains::render::{MarkerUpdate, RenderSink, RouteDrawRequest};
use transit_sim::domains::routing::{ColorToken, Route, RouteId, RouteSet};
use transit_sim::{GeoPoint, NamedPoint};

#[derive(Debug, Clone, PartialEq)]
enum Drawn {
    Route(RouteId),
    ClearRoute(RouteId),
    Marker(MarkerUpdate),
    RemoveMarker(RouteId),
}

#[derive(Default)]
struct CaptureSink {
    events: Mutex<Vec<Drawn>>,
}

impl CaptureSink {
    fn events(&self) -> Vec<Drawn> {
        self.events.lock().unwrap().clone()
    }

    fn markers_for(&self, id: RouteId) -> Vec<MarkerUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Drawn::Marker(m) if m.route_id == id => Some(m),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for CaptureSink {
    fn draw_route(&self, request: RouteDrawRequest) {
        self.events.lock().unwrap().push(Drawn::Route(request.route_id));
    }
    fn clear_route(&self, route_id: RouteId) {
        self.events.lock().unwrap().push(Drawn::ClearRoute(route_id));
    }
    fn update_marker(&self, update: MarkerUpdate) {
        self.events.lock().unwrap().push(Drawn::Marker(update));
    }
    fn remove_marker(&self, route_id: RouteId) {
        self.events.lock().unwrap().push(Drawn::RemoveMarker(route_id));
    }
}

// One coordinate unit per second.
const UNIT_SPEED: f64 = KM_PER_DEGREE * SECONDS_PER_HOUR;

fn route(points: &[(f64, f64)], index: usize) -> Route {
    let polyline: Vec<GeoPoint> = points.iter().map(|&(x, y)| GeoPoint::new(x, y)).collect();
    let start = NamedPoint::new(polyline[0], "Depot");
    let end = NamedPoint::new(polyline[polyline.len() - 1], "Terminal");
    Route::new(polyline, start, end, ColorToken::for_index(index)).unwrap()
}

fn fleet(scheduler: &Arc<ManualScheduler>, sink: &Arc<CaptureSink>, min: f64, max: f64) -> AgentFleet {
    AgentFleet::new(
        scheduler.clone() as Arc<dyn FrameScheduler>,
        sink.clone() as Arc<dyn RenderSink>,
        init_noop_logger(),
        min,
        max,
    )
    .with_seed(9)
}

#[test]
fn binds_one_agent_per_route() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let mut fleet = fleet(&scheduler, &sink, 60.0, 100.0);

    let a = route(&[(-74.0, 40.7), (-73.99, 40.71)], 0);
    let b = route(&[(-73.95, 40.65), (-73.96, 40.66), (-73.97, 40.65)], 1);
    let (a_id, b_id) = (a.id, b.id);
    let sync = fleet.sync(&RouteSet::new(vec![a, b]));

    assert_eq!(sync, FleetSync { added: 2, removed: 0 });
    assert_eq!(fleet.len(), 2);
    assert_eq!(scheduler.registered(), 2);
    for id in [a_id, b_id] {
        let speed = fleet.speed_of(&id).unwrap();
        assert!((60.0..100.0).contains(&speed));
        assert!(sink.events().contains(&Drawn::Route(id)));
        // Parked at the first point until the first frame.
        assert_eq!(sink.markers_for(id).len(), 1);
    }

    let first = sink.markers_for(a_id)[0].clone();
    assert_eq!(first.position, GeoPoint::new(-74.0, 40.7));
    assert_eq!(first.tooltip.title, "Bus Service");
    assert_eq!(first.tooltip.body, "Depot → Terminal");
    assert_eq!(first.icon.color, ColorToken::for_index(0));
}

#[test]
fn frames_move_markers_along_the_route() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let mut fleet = fleet(&scheduler, &sink, UNIT_SPEED, UNIT_SPEED);

    // 4 units east, then 4 units north: 8 seconds per lap.
    let r = route(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)], 0);
    let id = r.id;
    fleet.sync(&RouteSet::new(vec![r]));

    scheduler.advance(2_000);
    scheduler.advance(4_000);
    scheduler.advance(2_000);

    let markers = sink.markers_for(id);
    assert_eq!(markers.len(), 4);

    assert!((markers[1].position.lng - 2.0).abs() < 1e-9);
    assert!((markers[1].rotation - 90.0).abs() < 1e-9);

    assert!((markers[2].position.lng - 4.0).abs() < 1e-9);
    assert!((markers[2].position.lat - 2.0).abs() < 1e-9);
    assert!(markers[2].rotation.abs() < 1e-9);

    // A full lap wraps back to the first point.
    assert_eq!(markers[3].position, GeoPoint::new(0.0, 0.0));
}

#[test]
fn replaced_routes_are_torn_down() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let mut fleet = fleet(&scheduler, &sink, 60.0, 100.0);

    let old = route(&[(0.0, 0.0), (1.0, 1.0)], 0);
    let old_id = old.id;
    fleet.sync(&RouteSet::new(vec![old]));
    scheduler.advance(16);

    let new = route(&[(2.0, 2.0), (3.0, 3.0)], 1);
    let new_id = new.id;
    let sync = fleet.sync(&RouteSet::new(vec![new]));
    assert_eq!(sync, FleetSync { added: 1, removed: 1 });
    assert_eq!(scheduler.registered(), 1);

    let events = sink.events();
    assert!(events.contains(&Drawn::RemoveMarker(old_id)));
    assert!(events.contains(&Drawn::ClearRoute(old_id)));

    let before = sink.markers_for(old_id).len();
    scheduler.advance(16);
    assert_eq!(sink.markers_for(old_id).len(), before);
    assert_eq!(sink.markers_for(new_id).len(), 2);

    drop(fleet);
    assert_eq!(scheduler.registered(), 0);
}

#[test]
fn unchanged_set_is_a_no_op() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let mut fleet = fleet(&scheduler, &sink, 60.0, 100.0);

    let set = RouteSet::new(vec![route(&[(0.0, 0.0), (1.0, 0.0)], 0)]);
    fleet.sync(&set);
    assert_eq!(fleet.sync(&set), FleetSync::default());
    assert_eq!(scheduler.registered(), 1);
}

#[test]
fn zero_length_route_stays_parked() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let mut fleet = fleet(&scheduler, &sink, 60.0, 100.0);

    let r = route(&[(1.0, 1.0), (1.0, 1.0)], 0);
    let id = r.id;
    fleet.sync(&RouteSet::new(vec![r]));
    assert_eq!(fleet.len(), 1);
    assert_eq!(scheduler.registered(), 0);

    scheduler.advance(1_000);
    assert_eq!(sink.markers_for(id).len(), 1);
}

#[tokio::test]
async fn follows_the_published_route_set() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let sink = Arc::new(CaptureSink::default());
    let fleet = fleet(&scheduler, &sink, 60.0, 100.0);

    let (tx, rx) = watch::channel(Arc::new(RouteSet::default()));
    let task = tokio::spawn(fleet.run(rx));

    let r = route(&[(0.0, 0.0), (1.0, 0.0)], 0);
    let id = r.id;
    tx.send_replace(Arc::new(RouteSet::new(vec![r])));
    drop(tx);
    task.await.unwrap();

    let events = sink.events();
    assert!(events.contains(&Drawn::Route(id)));
    assert!(events.contains(&Drawn::RemoveMarker(id)));
    assert_eq!(scheduler.registered(), 0);
}

#[tokio::test]
async fn snapshot_written_before_fleet_teardown_keeps_the_scene() {
    let scheduler = Arc::new(ManualScheduler::new(0));
    let capture = Arc::new(CaptureSink::default());
    let geojson = Arc::new(GeoJsonRenderSink::new());
    let sink = Arc::new(MultiRenderSink::new(
        capture.clone() as Arc<dyn RenderSink>,
        Some(geojson.clone() as Arc<dyn RenderSink>),
    ));
    let fleet = AgentFleet::new(
        scheduler.clone() as Arc<dyn FrameScheduler>,
        sink as Arc<dyn RenderSink>,
        init_noop_logger(),
        60.0,
        100.0,
    );

    let (tx, rx) = watch::channel(Arc::new(RouteSet::default()));
    let task = tokio::spawn(fleet.run(rx));
    tx.send_replace(Arc::new(RouteSet::new(vec![route(&[(0.0, 0.0), (1.0, 0.0)], 0)])));
    while geojson.feature_collection().features.len() < 2 {
        tokio::task::yield_now().await;
    }
    scheduler.advance(500);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.geojson");
    geojson.write_to(&path).unwrap();
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    // The running scene was torn down, the written file was not.
    assert!(geojson.feature_collection().features.is_empty());
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let kinds: Vec<&str> = written["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["properties"]["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["route", "bus"]);
}
