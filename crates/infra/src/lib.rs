//! Infrastructure layer: repositories, domain event publishing, seeding.

pub mod events;
pub mod repository;
pub mod seed;

pub use events::{
    InMemoryEventRecorder, ProductEvent, ProductEventEnvelope, ProductEventPublisher,
    TracingEventPublisher,
};
pub use repository::{
    InMemoryProductRepository, InMemoryUserRepository, ProductRepository, RepositoryError,
    UserRepository,
};
