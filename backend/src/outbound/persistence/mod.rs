//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each driven port has one `Diesel*Repository` built over a shared
//! [`DbPool`]. Row structs (`models.rs`) and table definitions (`schema.rs`)
//! stay private to this module; repositories translate rows into domain
//! types and map every database failure into the port's own error.
//!
//! # Example
//!
//! ```ignore
//! use rentals::outbound::persistence::{DbPool, DieselListingRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/rentals")).await?;
//! let listings = DieselListingRepository::new(pool);
//! ```

mod diesel_audit_log_repository;
mod diesel_basic_error_mapping;
mod diesel_bookmark_repository;
mod diesel_listing_index_repository;
mod diesel_listing_repository;
mod diesel_notification_repository;
mod diesel_report_repository;
mod diesel_view_log_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_bookmark_repository::DieselBookmarkRepository;
pub use diesel_listing_index_repository::DieselListingIndexRepository;
pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_view_log_repository::DieselViewLogRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
