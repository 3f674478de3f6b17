use std::sync::Arc;

use crate::catalog::{ProductMatcher, Vocabulary};
use crate::clock::Clock;
use crate::config::Config;
use crate::context::{ContextCache, ContextLoader};
use crate::db::DatabaseBackend;
use crate::llm::LlmProvider;
use crate::services::ChatService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub llm: LlmProvider,
    pub matcher: Arc<ProductMatcher>,
    pub context: Arc<ContextCache>,
    pub loader: Arc<dyn ContextLoader>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Arc<dyn DatabaseBackend>,
        llm: LlmProvider,
        loader: Arc<dyn ContextLoader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let matcher = Arc::new(ProductMatcher::new(
            &config.catalog,
            Arc::new(Vocabulary::toy_store()),
            Arc::clone(&clock),
        ));
        let context = Arc::new(ContextCache::from_config(&config.context, clock));
        let chat = Arc::new(ChatService::new(
            db.clone(),
            llm.clone(),
            matcher.clone(),
            context.clone(),
            loader.clone(),
            config.chat.clone(),
        ));

        Self {
            config,
            db,
            llm,
            matcher,
            context,
            loader,
            chat,
        }
    }
}
