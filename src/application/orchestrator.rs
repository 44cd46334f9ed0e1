use crate::common::{NamedPoint, ViewportBounds};
use crate::config::SimulationConfig;
use crate::domains::logger::DynLogger;
use crate::domains::map::{MapSignal, MapView};
use crate::domains::routing::{
    is_degenerate_pair, ColorToken, EndpointSampler, PlaceLookup, Route, RouteLookup, RouteSet,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};

/// What one generation cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub cycle: u64,
    pub bounds: ViewportBounds,
    pub used_places: bool,
    pub batches: usize,
    pub requested: usize,
    pub skipped_degenerate: usize,
    pub no_route: usize,
    pub failed_lookups: usize,
    pub routes: usize,
}

/// Held for the duration of a generation cycle.
struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl FlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { flag: flag.clone() })
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct Candidate {
    index: usize,
    start: NamedPoint,
    end: NamedPoint,
}

/// Builds the active route set for the current viewport and rebuilds it
/// when the view moves far enough. At most one cycle runs at a time.
pub struct RouteOrchestrator {
    places: Arc<dyn PlaceLookup>,
    directions: Arc<dyn RouteLookup>,
    map: Arc<dyn MapView>,
    logger: DynLogger,
    config: SimulationConfig,
    rng: Mutex<StdRng>,
    generating: Arc<AtomicBool>,
    snapshot: Mutex<ViewportBounds>,
    cycles: AtomicU64,
    routes_tx: watch::Sender<Arc<RouteSet>>,
}

impl RouteOrchestrator {
    pub fn new(
        places: Arc<dyn PlaceLookup>,
        directions: Arc<dyn RouteLookup>,
        map: Arc<dyn MapView>,
        logger: DynLogger,
        config: SimulationConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (routes_tx, _) = watch::channel(Arc::new(RouteSet::default()));
        let initial = map.bounds();
        Self {
            places,
            directions,
            map,
            logger,
            config,
            rng: Mutex::new(rng),
            generating: Arc::new(AtomicBool::new(false)),
            snapshot: Mutex::new(initial),
            cycles: AtomicU64::new(0),
            routes_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<RouteSet>> {
        self.routes_tx.subscribe()
    }

    pub fn routes(&self) -> Arc<RouteSet> {
        self.routes_tx.borrow().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Bounds the next "view settled" is compared against: the view at
    /// construction until the first cycle starts.
    pub async fn last_snapshot(&self) -> ViewportBounds {
        *self.snapshot.lock().await
    }

    /// Runs one full cycle inline. None when another cycle is in flight.
    pub async fn generate_routes(&self) -> Option<GenerationReport> {
        match FlightGuard::acquire(&self.generating) {
            Some(guard) => Some(self.run_cycle(guard).await),
            None => {
                self.logger.info("Route generation already running, request ignored");
                None
            }
        }
    }

    /// Handles the map's "view settled" signal. Starts a background cycle
    /// only when the view moved past the thresholds since the last cycle.
    pub async fn on_view_settled(self: &Arc<Self>) -> Option<JoinHandle<GenerationReport>> {
        let current = self.map.bounds();
        let previous = *self.snapshot.lock().await;
        let significant = previous.differs_significantly(
            &current,
            self.config.center_shift_threshold,
            self.config.zoom_shift_threshold,
        );
        if !significant {
            return None;
        }

        let Some(guard) = FlightGuard::acquire(&self.generating) else {
            self.logger.info("Viewport changed during route generation, skipping regeneration");
            return None;
        };
        let this = Arc::clone(self);
        Some(tokio::spawn(async move { this.run_cycle(guard).await }))
    }

    /// Handles "map loaded": waits for the first paint to settle, then
    /// generates if nothing has been generated yet.
    pub fn on_map_loaded(self: &Arc<Self>) -> JoinHandle<Option<GenerationReport>> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.config.initial_settle()).await;
            if !this.routes().is_empty() {
                return None;
            }
            this.generate_routes().await
        })
    }

    /// Consumes map signals until the sender side goes away.
    pub async fn run(self: Arc<Self>, mut signals: mpsc::Receiver<MapSignal>) {
        while let Some(signal) = signals.recv().await {
            match signal {
                MapSignal::Loaded => {
                    self.on_map_loaded();
                }
                MapSignal::ViewSettled => {
                    self.on_view_settled().await;
                }
            }
        }
        self.logger.info("Map signal channel closed, orchestrator stopping");
    }

    async fn run_cycle(&self, _guard: FlightGuard) -> GenerationReport {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let bounds = self.map.bounds();
        *self.snapshot.lock().await = bounds;

        let places = match self.places.places_in_bounds(&bounds).await {
            Ok(places) => places,
            Err(e) => {
                self.logger.warn(&format!(
                    "Place lookup failed, falling back to random points: {}",
                    e
                ));
                Vec::new()
            }
        };
        let sampler = EndpointSampler::new(places, bounds);

        let mut report = GenerationReport {
            cycle,
            bounds,
            used_places: sampler.uses_places(),
            batches: 0,
            requested: 0,
            skipped_degenerate: 0,
            no_route: 0,
            failed_lookups: 0,
            routes: 0,
        };
        self.logger.info(&format!(
            "Generation cycle {} started: {} agents, batch size {}, places={}",
            cycle, self.config.agent_count, self.config.batch_size, report.used_places
        ));

        let target = self.config.agent_count;
        let batch_size = self.config.batch_size.max(1);
        let mut built: Vec<(usize, Route)> = Vec::with_capacity(target);
        let mut first = 0;

        while first < target {
            if report.batches > 0 {
                tokio::time::sleep(self.config.inter_batch_delay()).await;
            }
            let last = (first + batch_size).min(target);
            report.batches += 1;

            let candidates = self.sample_candidates(&sampler, first..last, &mut report).await;
            report.requested += candidates.len();

            let mut batch = JoinSet::new();
            for candidate in candidates {
                let directions = Arc::clone(&self.directions);
                batch.spawn(async move {
                    let polyline = directions
                        .route_between(candidate.start.point, candidate.end.point)
                        .await;
                    (candidate, polyline)
                });
            }

            while let Some(joined) = batch.join_next().await {
                match joined {
                    Ok((candidate, Ok(Some(polyline)))) => {
                        let color = ColorToken::for_index(candidate.index);
                        match Route::new(polyline, candidate.start, candidate.end, color) {
                            Ok(route) => built.push((candidate.index, route)),
                            Err(e) => {
                                report.no_route += 1;
                                self.logger
                                    .warn(&format!("Discarding route {}: {}", candidate.index, e));
                            }
                        }
                    }
                    Ok((_, Ok(None))) => report.no_route += 1,
                    Ok((candidate, Err(e))) => {
                        report.failed_lookups += 1;
                        self.logger
                            .warn(&format!("Route lookup {} failed: {}", candidate.index, e));
                    }
                    Err(e) => {
                        report.failed_lookups += 1;
                        self.logger.error(&format!("Route lookup task aborted: {}", e));
                    }
                }
            }
            first = last;
        }

        built.sort_by_key(|(index, _)| *index);
        let set = RouteSet::new(built.into_iter().map(|(_, route)| route).collect());
        report.routes = set.len();
        self.routes_tx.send_replace(Arc::new(set));

        self.logger.info(&format!(
            "Generation cycle {} finished: {} routes from {} requests \
             ({} degenerate, {} without route, {} failed)",
            cycle,
            report.routes,
            report.requested,
            report.skipped_degenerate,
            report.no_route,
            report.failed_lookups
        ));
        report
    }

    async fn sample_candidates(
        &self,
        sampler: &EndpointSampler,
        indices: std::ops::Range<usize>,
        report: &mut GenerationReport,
    ) -> Vec<Candidate> {
        let mut rng = self.rng.lock().await;
        let mut candidates = Vec::with_capacity(indices.len());
        for index in indices {
            let start = sampler.sample(&mut *rng);
            let end = sampler.sample(&mut *rng);
            if is_degenerate_pair(&start.point, &end.point, self.config.endpoint_epsilon) {
                report.skipped_degenerate += 1;
                continue;
            }
            candidates.push(Candidate { index, start, end });
        }
        candidates
    }
}
