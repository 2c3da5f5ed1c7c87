use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::gateway::MutationGateway;
use crate::live::{ChangeBroker, SubscriptionManager};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub broker: ChangeBroker,
    pub gateway: MutationGateway,
    pub subscriptions: SubscriptionManager,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let broker = ChangeBroker::new();
        let gateway = MutationGateway::new(db.clone(), broker.clone());
        let subscriptions = SubscriptionManager::new(db.clone(), broker.clone());

        Self {
            db,
            config: Arc::new(config),
            broker,
            gateway,
            subscriptions,
        }
    }
}
