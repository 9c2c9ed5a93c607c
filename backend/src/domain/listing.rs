//! Apartment listing aggregate.
//!
//! A listing is split into the owner-editable [`ListingDetails`] and the
//! system-managed fields on [`Listing`] (identity, ownership, availability,
//! counters, timestamps). Patches only ever touch the former.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{UserId, UserRole};

/// Upper bound on the number of image URLs stored per listing.
pub const MAX_LISTING_IMAGES: usize = 10;

/// Stable listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Validation failures for listing content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Wire name of the offending field.
        field: &'static str,
    },
    /// More images than [`MAX_LISTING_IMAGES`].
    #[error("a listing may carry at most {max} images, got {actual}")]
    TooManyImages {
        /// Configured bound.
        max: usize,
        /// Number supplied.
        actual: usize,
    },
    /// An image URL was blank.
    #[error("image URLs must not be empty")]
    EmptyImageUrl,
    /// Unknown apartment category.
    #[error("unknown apartment type: {0}")]
    UnknownApartmentType(String),
    /// Unknown payment frequency.
    #[error("unknown payment frequency: {0}")]
    UnknownPaymentFrequency(String),
}

impl ListingValidationError {
    /// Wire name of the field the failure concerns.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyField { field } => field,
            Self::TooManyImages { .. } | Self::EmptyImageUrl => "images",
            Self::UnknownApartmentType(_) => "apartmentType",
            Self::UnknownPaymentFrequency(_) => "paymentFrequency",
        }
    }

    /// Machine-readable failure code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyField { .. } => "missing_field",
            Self::TooManyImages { .. } => "too_many_images",
            Self::EmptyImageUrl => "empty_image_url",
            Self::UnknownApartmentType(_) => "unknown_apartment_type",
            Self::UnknownPaymentFrequency(_) => "unknown_payment_frequency",
        }
    }
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical wire spelling.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ListingValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == needle)
                    .ok_or_else(|| ListingValidationError::$error(s.to_owned()))
            }
        }
    };
}

string_enum! {
    /// Apartment category.
    ApartmentType, UnknownApartmentType {
        /// Single room with its own kitchen and bathroom.
        SelfContained => "self-contained",
        /// Small one-bedroom flat.
        MiniFlat => "mini-flat",
        /// One-bedroom apartment.
        OneBedroom => "1-bedroom",
        /// Two-bedroom apartment.
        TwoBedroom => "2-bedroom",
        /// Three-bedroom apartment.
        ThreeBedroom => "3-bedroom",
        /// Two-storey unit.
        Duplex => "duplex",
        /// Open-plan studio.
        Studio => "studio",
        /// Room in a shared apartment.
        SharedApartment => "shared-apartment",
        /// Top-floor luxury unit.
        Penthouse => "penthouse",
        /// Single-storey house.
        Bungalow => "bungalow",
    }
}

string_enum! {
    /// How often rent is paid.
    PaymentFrequency, UnknownPaymentFrequency {
        /// Every month.
        Monthly => "monthly",
        /// Every three months.
        Quarterly => "quarterly",
        /// Every year.
        Yearly => "yearly",
    }
}

/// Owner-editable listing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    /// Headline shown in result lists.
    pub title: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Category.
    pub apartment_type: ApartmentType,
    /// Rent in whole currency units.
    pub price: u64,
    /// Rent period.
    pub payment_frequency: PaymentFrequency,
    /// Lease duration, free text (for example "1 year").
    pub duration: String,
    /// Neighbourhood or city.
    pub location: String,
    /// Street address.
    pub address: String,
    /// Optional nearby point of reference.
    pub nearest_landmark: Option<String>,
    /// Image URLs returned by object storage.
    pub images: Vec<String>,
    /// Contact phone number.
    pub contact_phone: String,
    /// Amenity labels.
    pub amenities: Vec<String>,
    /// Bedroom count; zero for studios.
    pub bedrooms: u32,
    /// Bathroom count.
    pub bathrooms: u32,
    /// Optional size description.
    pub size: Option<String>,
    /// Whether the unit is furnished.
    pub furnished: bool,
    /// Service charge in whole currency units.
    pub service_charge: u64,
}

impl ListingDetails {
    /// Check required fields and the image bound.
    pub fn validate(&self) -> Result<(), ListingValidationError> {
        let required = [
            ("title", self.title.as_str()),
            ("duration", self.duration.as_str()),
            ("location", self.location.as_str()),
            ("address", self.address.as_str()),
            ("contactPhone", self.contact_phone.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ListingValidationError::EmptyField { field });
        }
        if self.images.len() > MAX_LISTING_IMAGES {
            return Err(ListingValidationError::TooManyImages {
                max: MAX_LISTING_IMAGES,
                actual: self.images.len(),
            });
        }
        if self.images.iter().any(|url| url.trim().is_empty()) {
            return Err(ListingValidationError::EmptyImageUrl);
        }
        Ok(())
    }
}

/// Shallow patch over [`ListingDetails`]; `None` keeps the stored value.
///
/// Optional fields use a nested `Option` so a patch can clear them:
/// `Some(None)` clears, `None` keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    /// New title.
    pub title: Option<String>,
    /// New or cleared description.
    pub description: Option<Option<String>>,
    /// New category.
    pub apartment_type: Option<ApartmentType>,
    /// New price.
    pub price: Option<u64>,
    /// New rent period.
    pub payment_frequency: Option<PaymentFrequency>,
    /// New duration.
    pub duration: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New or cleared landmark.
    pub nearest_landmark: Option<Option<String>>,
    /// Replacement image list.
    pub images: Option<Vec<String>>,
    /// New contact phone.
    pub contact_phone: Option<String>,
    /// Replacement amenity list.
    pub amenities: Option<Vec<String>>,
    /// New bedroom count.
    pub bedrooms: Option<u32>,
    /// New bathroom count.
    pub bathrooms: Option<u32>,
    /// New or cleared size.
    pub size: Option<Option<String>>,
    /// New furnished flag.
    pub furnished: Option<bool>,
    /// New service charge.
    pub service_charge: Option<u64>,
}

impl ListingPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch over `details`, returning the merged content.
    pub fn apply(self, details: &ListingDetails) -> ListingDetails {
        let current = details.clone();
        ListingDetails {
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
            apartment_type: self.apartment_type.unwrap_or(current.apartment_type),
            price: self.price.unwrap_or(current.price),
            payment_frequency: self.payment_frequency.unwrap_or(current.payment_frequency),
            duration: self.duration.unwrap_or(current.duration),
            location: self.location.unwrap_or(current.location),
            address: self.address.unwrap_or(current.address),
            nearest_landmark: self.nearest_landmark.unwrap_or(current.nearest_landmark),
            images: self.images.unwrap_or(current.images),
            contact_phone: self.contact_phone.unwrap_or(current.contact_phone),
            amenities: self.amenities.unwrap_or(current.amenities),
            bedrooms: self.bedrooms.unwrap_or(current.bedrooms),
            bathrooms: self.bathrooms.unwrap_or(current.bathrooms),
            size: self.size.unwrap_or(current.size),
            furnished: self.furnished.unwrap_or(current.furnished),
            service_charge: self.service_charge.unwrap_or(current.service_charge),
        }
    }
}

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Identity.
    pub id: ListingId,
    /// Publishing user.
    pub owner_id: UserId,
    /// Role the owner published under; used to address notifications.
    pub owner_role: UserRole,
    /// Owner-editable content.
    pub details: ListingDetails,
    /// Soft-delete flag; `false` hides the listing from browse and search.
    pub is_available: bool,
    /// Deduplicated view counter.
    pub views: u64,
    /// Set by moderators once the listing is checked.
    pub verified: bool,
    /// Number of unresolved reports.
    pub report_count: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last content or availability change.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Build a freshly published listing with default counters.
    pub fn publish(
        id: ListingId,
        owner_id: UserId,
        owner_role: UserRole,
        details: ListingDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            owner_role,
            details,
            is_available: true,
            views: 0,
            verified: false,
            report_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Later of creation and update time; the `recent` browse key.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.created_at.max(self.updated_at)
    }
}

/// Target state for an availability flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Visible in browse and search.
    Available,
    /// Hidden but retained.
    Deactivated,
}

impl Availability {
    /// The stored flag value for this state.
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Human-readable name used in messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "active",
            Self::Deactivated => "deactivated",
        }
    }
}
