//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::PlanCache;
use crate::network::FlightNetwork;
use crate::planner::{Planner, RequestValidator, SearchConfig};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Flight network, loaded once at startup
    pub network: Arc<FlightNetwork>,

    /// Origin policy and request checks
    pub validator: Arc<RequestValidator>,

    /// Route search configuration
    pub config: Arc<SearchConfig>,

    /// Planned itineraries
    pub cache: Arc<PlanCache>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        network: FlightNetwork,
        validator: RequestValidator,
        config: SearchConfig,
        cache: PlanCache,
    ) -> Self {
        Self {
            network: Arc::new(network),
            validator: Arc::new(validator),
            config: Arc::new(config),
            cache: Arc::new(cache),
        }
    }

    /// A planner borrowing this state.
    pub fn planner(&self) -> Planner<'_> {
        Planner::new(&self.network, &self.validator, &self.config)
    }
}
