//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod bookmarks;
pub mod error;
pub mod health;
pub mod listings;
pub mod listings_dto;
pub mod moderation;
pub mod notifications;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod user_listings;
pub mod validation;

pub use error::ApiResult;

/// Register every API handler; mount under `/api/v1`.
///
/// Literal segments (`search`, `read-all`) are registered before the
/// `{id}` routes they would otherwise be captured by.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(listings::create_listing)
        .service(listings::browse_listings)
        .service(listings::search_listings)
        .service(listings::get_listing)
        .service(listings::update_listing)
        .service(listings::deactivate_listing)
        .service(listings::reactivate_listing)
        .service(listings::record_view)
        .service(moderation::report_listing)
        .service(user_listings::list_active)
        .service(user_listings::list_deactivated)
        .service(user_listings::get_user_listing)
        .service(user_listings::search_user_listings)
        .service(user_listings::dashboard)
        .service(bookmarks::list_bookmarks)
        .service(bookmarks::clear_bookmarks)
        .service(bookmarks::search_bookmarks)
        .service(bookmarks::add_bookmark)
        .service(bookmarks::remove_bookmark)
        .service(moderation::list_reports)
        .service(moderation::review_report)
        .service(moderation::resolve_report)
        .service(moderation::delete_listing)
        .service(moderation::audit_log)
        .service(moderation::reconcile_index)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(notifications::delete_notification);
}
