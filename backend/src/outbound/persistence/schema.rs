//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Canonical listing rows.
    listings (id) {
        id -> Uuid,
        owner_id -> Uuid,
        owner_role -> Varchar,
        title -> Varchar,
        description -> Nullable<Text>,
        apartment_type -> Varchar,
        /// Whole currency units; never negative.
        price -> Int8,
        payment_frequency -> Varchar,
        duration -> Varchar,
        location -> Varchar,
        address -> Varchar,
        nearest_landmark -> Nullable<Varchar>,
        images -> Array<Text>,
        contact_phone -> Varchar,
        amenities -> Array<Text>,
        bedrooms -> Int4,
        bathrooms -> Int4,
        size -> Nullable<Varchar>,
        furnished -> Bool,
        service_charge -> Int8,
        is_available -> Bool,
        views -> Int8,
        verified -> Bool,
        report_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-owner "my listings" read model. Unique on `(user_id, listing_id)`.
    user_listing_index (user_id, listing_id) {
        user_id -> Uuid,
        listing_id -> Uuid,
        posted_at -> Timestamptz,
    }
}

diesel::table! {
    /// View observations used for deduplication.
    listing_views (id) {
        id -> Int8,
        listing_id -> Uuid,
        viewer_id -> Nullable<Uuid>,
        viewer_address -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tenant bookmarks. `id` is a bigserial giving insertion order.
    bookmarks (id) {
        id -> Int8,
        tenant_id -> Uuid,
        listing_id -> Uuid,
        saved_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listing reports. Unique on `(listing_id, reporter_id)`.
    listing_reports (id) {
        id -> Uuid,
        listing_id -> Uuid,
        reporter_id -> Uuid,
        reason -> Text,
        status -> Varchar,
        created_at -> Timestamptz,
        resolved_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only administrative audit trail.
    admin_audit_log (id) {
        id -> Uuid,
        admin_id -> Uuid,
        action -> Varchar,
        target -> Varchar,
        ip_address -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notification inbox items.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        role -> Varchar,
        message -> Text,
        meta -> Jsonb,
        read -> Bool,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    listings,
    user_listing_index,
    listing_views,
    bookmarks,
    listing_reports,
    admin_audit_log,
    notifications,
);
