//! Application state for the web layer.

use std::sync::Arc;

use crate::agent::AgentSlot;
use crate::catalog::ShelterCatalogResolver;
use crate::ranking::CandidateRanker;
use crate::routing::{GoogleRoutesBackend, RouteClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Ranks candidates through the routing backend
    pub ranker: Arc<CandidateRanker<RouteClient>>,

    /// Supplies candidates when a request has none
    pub catalog: Arc<ShelterCatalogResolver>,

    /// Serves `/compute-route`; absent without a Maps API key
    pub routes: Option<Arc<GoogleRoutesBackend>>,

    /// Optional assistant agent
    pub agent: Arc<AgentSlot>,
}

impl AppState {
    pub fn new(
        ranker: CandidateRanker<RouteClient>,
        catalog: ShelterCatalogResolver,
        routes: Option<GoogleRoutesBackend>,
        agent: AgentSlot,
    ) -> Self {
        Self {
            ranker: Arc::new(ranker),
            catalog: Arc::new(catalog),
            routes: routes.map(Arc::new),
            agent: Arc::new(agent),
        }
    }
}
