//! Product domain events and their publishers.
//!
//! Publishing is fire-and-forget: a failing or slow subscriber must never
//! fail the request that produced the event.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockroom_core::ProductId;
use stockroom_products::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    /// A product was created with stock on hand.
    Created { product: Product },
    Updated { product: Product },
    Deleted { product_id: ProductId },
}

impl ProductEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created { .. } => "products.product.created",
            ProductEvent::Updated { .. } => "products.product.updated",
            ProductEvent::Deleted { .. } => "products.product.deleted",
        }
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            ProductEvent::Created { product } | ProductEvent::Updated { product } => product.id,
            ProductEvent::Deleted { product_id } => *product_id,
        }
    }
}

/// Event plus delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEventEnvelope {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event: ProductEvent,
}

impl ProductEventEnvelope {
    pub fn new(event: ProductEvent, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at,
            event,
        }
    }
}

pub trait ProductEventPublisher: Send + Sync {
    fn publish(&self, envelope: ProductEventEnvelope);
}

/// Default publisher: structured log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl ProductEventPublisher for TracingEventPublisher {
    fn publish(&self, envelope: ProductEventEnvelope) {
        tracing::info!(
            event_id = %envelope.event_id,
            event_type = envelope.event.event_type(),
            product_id = %envelope.event.product_id(),
            "product event published"
        );
    }
}

/// Keeps every published event in memory, in publish order.
#[derive(Debug, Default)]
pub struct InMemoryEventRecorder {
    inner: Mutex<Vec<ProductEventEnvelope>>,
}

impl InMemoryEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProductEventEnvelope> {
        match self.inner.lock() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl ProductEventPublisher for InMemoryEventRecorder {
    fn publish(&self, envelope: ProductEventEnvelope) {
        if let Ok(mut events) = self.inner.lock() {
            events.push(envelope);
        }
    }
}
