use crate::application::scheduler::{FrameHandle, FrameScheduler};
use crate::domains::logger::DynLogger;
use crate::domains::motion::MotionModel;
use crate::domains::render::{
    MarkerIcon, MarkerTooltip, MarkerUpdate, RenderSink, RouteDrawRequest, MARKER_TOOLTIP_TITLE,
};
use crate::domains::routing::{Route, RouteId, RouteSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetSync {
    pub added: usize,
    pub removed: usize,
}

struct AgentBinding {
    speed_kmh: f64,
    // None for inert routes, which never get a frame callback.
    frame: Option<FrameHandle>,
}

/// One motion model per route in the active set, each ticking on its own
/// frame registration and publishing marker updates to the render sink.
pub struct AgentFleet {
    scheduler: Arc<dyn FrameScheduler>,
    sink: Arc<dyn RenderSink>,
    logger: DynLogger,
    speed_min_kmh: f64,
    speed_max_kmh: f64,
    rng: StdRng,
    agents: HashMap<RouteId, AgentBinding>,
}

impl AgentFleet {
    pub fn new(
        scheduler: Arc<dyn FrameScheduler>,
        sink: Arc<dyn RenderSink>,
        logger: DynLogger,
        speed_min_kmh: f64,
        speed_max_kmh: f64,
    ) -> Self {
        Self {
            scheduler,
            sink,
            logger,
            speed_min_kmh,
            speed_max_kmh,
            rng: StdRng::from_entropy(),
            agents: HashMap::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn speed_of(&self, id: &RouteId) -> Option<f64> {
        self.agents.get(id).map(|a| a.speed_kmh)
    }

    /// Tears down agents whose route left `routes` and binds agents for new ones.
    pub fn sync(&mut self, routes: &RouteSet) -> FleetSync {
        let stale: Vec<RouteId> =
            self.agents.keys().filter(|id| !routes.contains(id)).copied().collect();
        for id in &stale {
            self.unbind(id);
        }

        let mut added = 0;
        for route in routes.iter() {
            if !self.agents.contains_key(&route.id) {
                self.bind(Arc::clone(route));
                added += 1;
            }
        }

        if added > 0 || !stale.is_empty() {
            self.logger.info(&format!(
                "Fleet updated: {} agents added, {} removed, {} active",
                added,
                stale.len(),
                self.agents.len()
            ));
        }
        FleetSync { added, removed: stale.len() }
    }

    /// Follows the orchestrator's route set until the sender is dropped.
    pub async fn run(mut self, mut routes: watch::Receiver<Arc<RouteSet>>) {
        let initial = routes.borrow_and_update().clone();
        self.sync(&initial);
        while routes.changed().await.is_ok() {
            let current = routes.borrow_and_update().clone();
            self.sync(&current);
        }
        self.shutdown();
    }

    pub fn shutdown(&mut self) {
        let ids: Vec<RouteId> = self.agents.keys().copied().collect();
        for id in &ids {
            self.unbind(id);
        }
    }

    fn pick_speed(&mut self) -> f64 {
        if self.speed_max_kmh > self.speed_min_kmh {
            self.rng.gen_range(self.speed_min_kmh..self.speed_max_kmh)
        } else {
            self.speed_min_kmh
        }
    }

    fn bind(&mut self, route: Arc<Route>) {
        let speed_kmh = self.pick_speed();
        self.sink.draw_route(RouteDrawRequest::for_route(&route));

        let mut model = MotionModel::new(Arc::clone(&route), speed_kmh, self.scheduler.now_ms());
        let icon = MarkerIcon { color: route.color };
        let tooltip = MarkerTooltip {
            title: MARKER_TOOLTIP_TITLE.to_string(),
            body: route.tooltip(),
        };
        let initial = model.current();
        self.sink.update_marker(MarkerUpdate {
            route_id: route.id,
            position: initial.position,
            rotation: initial.heading,
            icon,
            tooltip: tooltip.clone(),
        });

        let frame = if model.is_inert() {
            self.logger.warn(&format!("Route {} has no length, agent stays parked", route.id));
            None
        } else {
            let sink = Arc::clone(&self.sink);
            let route_id = route.id;
            Some(self.scheduler.schedule(Box::new(move |now_ms| {
                if let Some(sample) = model.tick(now_ms) {
                    sink.update_marker(MarkerUpdate {
                        route_id,
                        position: sample.position,
                        rotation: sample.heading,
                        icon,
                        tooltip: tooltip.clone(),
                    });
                }
            })))
        };

        self.agents.insert(route.id, AgentBinding { speed_kmh, frame });
    }

    fn unbind(&mut self, id: &RouteId) {
        if let Some(binding) = self.agents.remove(id) {
            if let Some(frame) = binding.frame {
                frame.cancel();
            }
            self.sink.remove_marker(*id);
            self.sink.clear_route(*id);
        }
    }
}

impl Drop for AgentFleet {
    fn drop(&mut self) {
        self.shutdown();
    }
}
