//! Shared domain enums
//!
//! Enumerated columns are stored as their symbolic names in TEXT columns and
//! transmitted the same way on the wire (`"LAPTOP"`, `"NOT_ASSIGNED"`).

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a symbolic enum with string, serde and SQLx text conversions.
///
/// Variant names must convert to their text with SCREAMING_SNAKE_CASE.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Kind of physical equipment
    pub enum ResourceType {
        Laptop => "LAPTOP",
        Chair => "CHAIR",
        Mouse => "MOUSE",
        Mobile => "MOBILE",
        Keyboard => "KEYBOARD",
        Monitor => "MONITOR",
        Desktop => "DESKTOP",
        Printer => "PRINTER",
        Scanner => "SCANNER",
        Other => "OTHER",
    }
}

text_enum! {
    /// Availability of a resource
    pub enum ResourceStatus {
        Assigned => "ASSIGNED",
        NotAssigned => "NOT_ASSIGNED",
        Deprecated => "DEPRECATED",
    }
}

text_enum! {
    /// Whether an assignment is still open
    pub enum AssignmentStatus {
        Returned => "RETURNED",
        NotReturned => "NOT_RETURNED",
    }
}

/// Result ordering for resource search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Resource fields that search results may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Type,
    Status,
    SerialNumber,
    InventoryLocation,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Backing column
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Type => "resource_type",
            SortField::Status => "status",
            SortField::SerialNumber => "serial_number",
            SortField::InventoryLocation => "inventory_location",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Parse the field name used in request payloads
impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "type" => Ok(SortField::Type),
            "status" => Ok(SortField::Status),
            "serialNumber" => Ok(SortField::SerialNumber),
            "inventoryLocation" => Ok(SortField::InventoryLocation),
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            other => Err(format!("Unknown sort field: {}", other)),
        }
    }
}
