//! Core type definitions
//!
//! Every engine identifier is a plain value type with equality and an
//! explicit `INVALID` sentinel. `Default` yields the sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount (signed, engine currency units)
pub type Money = i64;

macro_rules! engine_id {
    ($(#[$meta:meta])* $name:ident($raw:ty), invalid = $invalid:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $raw);

        impl $name {
            /// Sentinel for "no such entity"
            pub const INVALID: Self = Self($invalid);

            pub const fn new(id: $raw) -> Self {
                Self(id)
            }

            pub fn get(&self) -> $raw {
                self.0
            }

            pub fn is_valid(&self) -> bool {
                *self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<$raw> for $name {
            fn from(id: $raw) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    f.write_str("invalid")
                }
            }
        }
    };
}

engine_id!(
    /// Index of a map tile
    TileIndex(u32),
    invalid = u32::MAX
);

engine_id!(
    /// Vehicle ID (20 significant bits in the engine pool)
    VehicleID(u32),
    invalid = 0xFFFFF
);

engine_id!(
    /// Sign ID
    SignID(u16),
    invalid = u16::MAX
);

engine_id!(
    /// Vehicle group ID
    GroupID(u16),
    invalid = u16::MAX
);

engine_id!(
    /// Station ID
    StationID(u16),
    invalid = u16::MAX
);

engine_id!(
    /// Waypoint ID; waypoints share the station pool
    WaypointID(u16),
    invalid = u16::MAX
);

engine_id!(
    /// Road type identifier
    RoadType(u8),
    invalid = u8::MAX
);

engine_id!(
    /// Rail type identifier
    RailType(u8),
    invalid = u8::MAX
);

engine_id!(
    /// Company (or owner) identifier
    CompanyID(u8),
    invalid = u8::MAX
);

/// Owner of a world object; same id space as companies
pub type Owner = CompanyID;

impl CompanyID {
    /// Unowned / neutral (town, nobody)
    pub const OWNER_NONE: Self = Self(0x10);

    /// Whether this names an actual company slot
    pub fn is_company(&self) -> bool {
        self.0 < Self::OWNER_NONE.0
    }
}

/// Engine error code carried through from a failed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineErrorCode(pub u16);

impl EngineErrorCode {
    /// Failure reported without a specific reason
    pub const UNKNOWN: Self = Self(u16::MAX);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_invalid() {
        assert_eq!(VehicleID::default(), VehicleID::INVALID);
        assert_eq!(SignID::default(), SignID::INVALID);
        assert_eq!(GroupID::default(), GroupID::INVALID);
        assert_eq!(TileIndex::default(), TileIndex::INVALID);
        assert!(!RoadType::default().is_valid());
        assert!(!RailType::default().is_valid());
    }

    #[test]
    fn test_id_roundtrip() {
        let id = VehicleID::from(42);
        assert_eq!(id.get(), 42);
        assert!(id.is_valid());
        assert_eq!(id.to_string(), "42");
        assert_eq!(VehicleID::INVALID.to_string(), "invalid");
    }

    #[test]
    fn test_owner_none_is_not_company() {
        assert!(CompanyID::new(0).is_company());
        assert!(CompanyID::new(14).is_company());
        assert!(!CompanyID::OWNER_NONE.is_company());
        assert!(!CompanyID::INVALID.is_company());
    }
}
