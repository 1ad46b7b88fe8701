//! Products domain module.
//!
//! This crate contains the product record and its input rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). The same
//! types travel over the wire between the backend and the client.

pub mod product;

pub use product::{
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, NewProduct, Product, ProductChanges, timestamp_format,
};
