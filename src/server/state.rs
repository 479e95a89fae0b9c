use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::clients::{CompanySearchClient, HunterClient};
use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pool: PgPool,
    pub hunter: Arc<HunterClient>,
    pub company_search: Arc<CompanySearchClient>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, pool: PgPool) -> Self {
        let hunter = Arc::new(HunterClient::new(&settings.hunter));
        let company_search = Arc::new(CompanySearchClient::new(&settings.llm));

        Self {
            settings: Arc::new(settings),
            pool,
            hunter,
            company_search,
            start_time: Instant::now(),
        }
    }
}
