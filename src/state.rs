use std::sync::Arc;

use crate::{
    config::Config,
    gateway::SubmissionGateway,
    store::{RecordStore, postgrest::PostgrestStore},
};

pub struct State {
    pub config: Config,
    pub gateway: SubmissionGateway,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        let store = PostgrestStore::new(&config.store_url, &config.store_key)
            .expect("Record store misconfigured!");

        Self::with_store(config, Arc::new(store))
    }

    /// Build state around any record store. Tests run the router against the
    /// in-memory store through this.
    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Arc<Self> {
        let gateway = SubmissionGateway::new(store, config.submit_timeout);

        Arc::new(Self { config, gateway })
    }
}
