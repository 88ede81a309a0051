use std::fmt;
use std::str::FromStr;

/// Every resource type served by the API.
///
/// The persisted document holds exactly one map per variant, keyed by
/// [`Collection::name`]. Routes address a collection by its plural name for
/// listing and by its singular name for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Users,
    Houses,
    Devices,
    Schedules,
    UsageRecords,
    Tariffs,
    PhotovoltaicSystems,
    Batteries,
    ProductionRecords,
}

/// How a record of a collection reaches its owning user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerLink {
    /// The record is a user and owns itself.
    Root,
    /// No owner; access checks are bypassed.
    Global,
    /// Follow `foreign_key` into `parent` and continue from there.
    Parent {
        foreign_key: &'static str,
        parent: Collection,
    },
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Users,
        Collection::Houses,
        Collection::Devices,
        Collection::Schedules,
        Collection::UsageRecords,
        Collection::Tariffs,
        Collection::PhotovoltaicSystems,
        Collection::Batteries,
        Collection::ProductionRecords,
    ];

    /// Collection key in the persisted document, also the list route.
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Houses => "houses",
            Collection::Devices => "devices",
            Collection::Schedules => "schedules",
            Collection::UsageRecords => "usage_records",
            Collection::Tariffs => "tariffs",
            Collection::PhotovoltaicSystems => "photovoltaic_systems",
            Collection::Batteries => "batteries",
            Collection::ProductionRecords => "production_records",
        }
    }

    /// Route segment for single-record operations (`/user/:id`, `POST /user`).
    pub const fn singular(self) -> &'static str {
        match self {
            Collection::Users => "user",
            Collection::Houses => "house",
            Collection::Devices => "device",
            Collection::Schedules => "schedule",
            Collection::UsageRecords => "usage_record",
            Collection::Tariffs => "tariff",
            Collection::PhotovoltaicSystems => "photovoltaic_system",
            Collection::Batteries => "battery",
            Collection::ProductionRecords => "production_record",
        }
    }

    pub fn from_singular(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.singular() == segment)
    }

    /// The exact field set a create payload must carry.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["email", "password_hash", "name"],
            Collection::Houses => &["user_id", "address", "name"],
            Collection::Devices => &["house_id", "name", "nominal_power_kw"],
            Collection::Schedules => &["device_id", "day_of_week", "start_time", "end_time"],
            Collection::UsageRecords => &[
                "device_id",
                "date",
                "start_time",
                "end_time",
                "total_consumption_kw",
                "cost",
            ],
            Collection::Tariffs => &[
                "name",
                "day_rate_kwh",
                "night_rate_kwh",
                "day_start",
                "night_start",
            ],
            Collection::PhotovoltaicSystems => &["house_id", "panel_area_m2", "max_power_kw"],
            Collection::Batteries => &["photovoltaic_system_id", "capacity_kwh", "current_charge_kwh"],
            Collection::ProductionRecords => &["photovoltaic_system_id", "date", "produced_energy_kwh"],
        }
    }

    /// Fields whose values may not repeat across records of the collection.
    pub const fn unique_fields(self) -> &'static [&'static str] {
        match self {
            Collection::Users => &["email"],
            _ => &[],
        }
    }

    pub const fn owner_link(self) -> OwnerLink {
        match self {
            Collection::Users => OwnerLink::Root,
            Collection::Tariffs => OwnerLink::Global,
            Collection::Houses => OwnerLink::Parent {
                foreign_key: "user_id",
                parent: Collection::Users,
            },
            Collection::Devices | Collection::PhotovoltaicSystems => OwnerLink::Parent {
                foreign_key: "house_id",
                parent: Collection::Houses,
            },
            Collection::Schedules | Collection::UsageRecords => OwnerLink::Parent {
                foreign_key: "device_id",
                parent: Collection::Devices,
            },
            Collection::Batteries | Collection::ProductionRecords => OwnerLink::Parent {
                foreign_key: "photovoltaic_system_id",
                parent: Collection::PhotovoltaicSystems,
            },
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}
