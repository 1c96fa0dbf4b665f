use std::sync::Arc;
use crate::config::Config;
use crate::domain::services::{
    catalog::EventCatalog, dashboard::DashboardAggregator, ledger::RegistrationLedger,
    tickets::TicketIssuer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<EventCatalog>,
    pub ledger: Arc<RegistrationLedger>,
    pub tickets: Arc<TicketIssuer>,
    pub dashboard: Arc<DashboardAggregator>,
}
