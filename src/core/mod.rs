//! Core business logic - framework-agnostic storefront operations.
//!
//! Each module owns one aggregate. Everything is async over a SeaORM
//! connection and returns the crate-wide `Result`.

/// Cart line-item mutations and derived totals
pub mod cart;
/// Category tree: hierarchy, aggregation, slugs
pub mod category;
/// Cart → order conversion
pub mod checkout;
/// Customer profiles and social-login provisioning
pub mod customer;
/// Order queries and status updates
pub mod order;
/// Product catalog and filtered listing
pub mod product;
