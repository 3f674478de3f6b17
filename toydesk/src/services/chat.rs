use std::sync::Arc;

use crate::catalog::{render_product_block, ProductMatcher, ScoredProduct, NO_PRODUCTS_SENTINEL};
use crate::config::ChatConfig;
use crate::context::{ContextCache, ContextLoader, ContextLookup, ContextState};
use crate::conversation::{format_conversation_memory, MemoryWindow};
use crate::db::DatabaseBackend;
use crate::error::{Result, ToydeskError};
use crate::llm::prompts::support_system_prompt;
use crate::llm::LlmProvider;
use crate::models::{ChatRole, ChatTurn};

/// What the customer gets back for one message.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub reply: String,
    /// Freshness of the reference documents the reply was grounded on.
    pub context: ContextState,
    pub products: Vec<ScoredProduct>,
}

/// Assembles the prompt for a customer message and records the exchange.
pub struct ChatService {
    db: Arc<dyn DatabaseBackend>,
    llm: LlmProvider,
    matcher: Arc<ProductMatcher>,
    context: Arc<ContextCache>,
    loader: Arc<dyn ContextLoader>,
    config: ChatConfig,
    window: MemoryWindow,
}

impl ChatService {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        llm: LlmProvider,
        matcher: Arc<ProductMatcher>,
        context: Arc<ContextCache>,
        loader: Arc<dyn ContextLoader>,
        config: ChatConfig,
    ) -> Self {
        let window = MemoryWindow::from(&config);
        Self {
            db,
            llm,
            matcher,
            context,
            loader,
            config,
            window,
        }
    }

    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    pub async fn respond(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let user_id = user_id.trim();
        let message = message.trim();
        self.validate(user_id, message)?;

        let memory_block = self.memory_block(user_id).await;

        let lookup = self.lookup_context().await;
        let documents = lookup.documents();
        let products = match documents {
            Some(docs) => self.matcher.find_relevant_products(
                message,
                &docs.product,
                self.matcher.context_limit(),
            ),
            None => Vec::new(),
        };
        let product_block = if documents.is_some() {
            render_product_block(&products)
        } else {
            NO_PRODUCTS_SENTINEL.to_string()
        };

        let system_prompt =
            support_system_prompt(documents.map(|docs| &**docs), &product_block, &memory_block);

        let reply = self
            .llm
            .complete_with_system(&system_prompt, message, None)
            .await?;

        self.record_exchange(user_id, message, &reply).await;

        tracing::info!(
            user_id = %user_id,
            context = %lookup.state(),
            products = products.len(),
            "Chat reply generated"
        );

        Ok(ChatReply {
            reply,
            context: lookup.state(),
            products,
        })
    }

    /// Up to `limit` most recent turns, oldest first.
    pub async fn history(&self, user_id: &str, limit: u32) -> Result<Vec<ChatTurn>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ToydeskError::Validation("userId is required".to_string()));
        }

        let mut turns = self.db.recent_turns(user_id, limit).await?;
        turns.reverse();
        Ok(turns)
    }

    pub async fn clear_history(&self, user_id: &str) -> Result<u64> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ToydeskError::Validation("userId is required".to_string()));
        }

        let deleted = self.db.clear_history(user_id).await?;
        tracing::info!(user_id = %user_id, deleted, "Chat history cleared");
        Ok(deleted)
    }

    pub async fn lookup_context(&self) -> ContextLookup {
        self.context.get_or_load(self.loader.as_ref()).await
    }

    /// Load the context documents and rebuild the product index from them.
    pub async fn prewarm(&self) -> ContextLookup {
        let lookup = self.lookup_context().await;
        if let Some(docs) = lookup.documents() {
            let stats = self.matcher.rebuild_index(&docs.product);
            tracing::debug!(indexed = stats.indexed, "Pre-warmed product index");
        }
        lookup
    }

    fn validate(&self, user_id: &str, message: &str) -> Result<()> {
        if user_id.is_empty() {
            return Err(ToydeskError::Validation("userId is required".to_string()));
        }
        if message.is_empty() {
            return Err(ToydeskError::Validation("message is required".to_string()));
        }
        let length = message.chars().count();
        if length > self.config.max_message_chars {
            return Err(ToydeskError::Validation(format!(
                "message is {length} characters; the limit is {}",
                self.config.max_message_chars
            )));
        }
        Ok(())
    }

    async fn memory_block(&self, user_id: &str) -> String {
        let mut turns = match self.db.recent_turns(user_id, self.config.history_limit).await {
            Ok(turns) => turns,
            Err(error) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %error,
                    "Failed to read chat history, continuing without it"
                );
                Vec::new()
            }
        };
        turns.reverse();

        format_conversation_memory(&turns, &self.window, self.matcher.vocabulary())
    }

    async fn record_exchange(&self, user_id: &str, message: &str, reply: &str) {
        let turns = [
            ChatTurn::new(user_id, ChatRole::User, message),
            ChatTurn::new(user_id, ChatRole::Assistant, reply),
        ];

        for turn in &turns {
            if let Err(error) = self.db.append_turn(turn).await {
                tracing::error!(
                    user_id = %user_id,
                    role = %turn.role,
                    error = %error,
                    "Failed to persist chat turn"
                );
            }
        }
    }
}
