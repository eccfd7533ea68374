use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use palengke_core::{MarketError, MarketResult, ProductId};

/// A single message in a product thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Buyer-seller message threads, one per listing.
///
/// Opening the contact-seller modal for a different product never mixes
/// transcripts; threads are keyed by product id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatBoard {
    threads: HashMap<ProductId, Vec<ChatMessage>>,
}

impl ChatBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the product's thread, creating it on first use.
    pub fn post(
        &mut self,
        product_id: ProductId,
        sender: impl Into<String>,
        body: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> MarketResult<()> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(MarketError::validation("message cannot be empty"));
        }

        self.threads.entry(product_id).or_default().push(ChatMessage {
            sender: sender.into(),
            body,
            sent_at,
        });
        Ok(())
    }

    /// Messages for a product in send order; empty for unknown ids.
    pub fn transcript(&self, product_id: ProductId) -> &[ChatMessage] {
        self.threads
            .get(&product_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}
