//! Static cost and bonus tables.
//!
//! Buildings and research are paid in gold and steel. Units are paid per
//! unit in food, steel and oil. Market rates convert stock into gold.

use nationstate_types::{BuildingKind, Commodity, ResearchKind, Resource, ResourceStock, Unit};

// ---------------------------------------------------------------------------
// Costs
// ---------------------------------------------------------------------------

/// A gold and steel price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cost {
    /// Gold required.
    pub gold: u64,
    /// Steel required.
    pub steel: u64,
}

impl Cost {
    /// A price of `gold` and `steel`.
    pub const fn new(gold: u64, steel: u64) -> Self {
        Self { gold, steel }
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Per-building bonus every non-city building grants.
pub const BUILDING_BONUS: u64 = 2;

/// Definition of a building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingDef {
    /// Base price; scaled by the current count when built.
    pub cost: Cost,
    /// Yield bonus per building.
    pub bonus: u64,
    /// Maximum count per city, when capped.
    pub max_per_city: Option<u64>,
    /// The yield this building improves.
    pub boosts: Option<Commodity>,
    /// Research that must be complete before building.
    pub requires: Option<ResearchKind>,
}

/// Definition table lookup.
pub const fn building_def(kind: BuildingKind) -> BuildingDef {
    const fn def(
        gold: u64,
        steel: u64,
        max: u64,
        boosts: Commodity,
        requires: Option<ResearchKind>,
    ) -> BuildingDef {
        BuildingDef {
            cost: Cost::new(gold, steel),
            bonus: BUILDING_BONUS,
            max_per_city: Some(max),
            boosts: Some(boosts),
            requires,
        }
    }

    match kind {
        BuildingKind::City => BuildingDef {
            cost: Cost::new(800, 1000),
            bonus: 0,
            max_per_city: None,
            boosts: None,
            requires: None,
        },
        BuildingKind::Barracks => def(150, 100, 20, Commodity::Unit(Unit::Troops), None),
        BuildingKind::Factory => def(150, 100, 20, Commodity::Resource(Resource::Steel), None),
        BuildingKind::Hangar => def(
            400,
            400,
            20,
            Commodity::Unit(Unit::Jets),
            Some(ResearchKind::Flight),
        ),
        BuildingKind::OilRig => def(150, 150, 20, Commodity::Resource(Resource::Oil), None),
        BuildingKind::MickDonalds => def(
            100,
            50,
            50,
            Commodity::Resource(Resource::Food),
            Some(ResearchKind::HappyMeals),
        ),
        BuildingKind::Bank => def(
            150,
            50,
            20,
            Commodity::Resource(Resource::Gold),
            Some(ResearchKind::Banking),
        ),
        BuildingKind::Depot => def(
            350,
            500,
            20,
            Commodity::Unit(Unit::Tanks),
            Some(ResearchKind::Manufacturing),
        ),
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Flat price of a research unlock.
pub const fn research_cost(kind: ResearchKind) -> Cost {
    match kind {
        ResearchKind::Manufacturing => Cost::new(500, 700),
        ResearchKind::Flight => Cost::new(600, 900),
        ResearchKind::Banking => Cost::new(400, 300),
        ResearchKind::ShitCoins => Cost::new(400, 0),
        ResearchKind::HappyMeals => Cost::new(300, 200),
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Resources consumed per deployed unit.
pub const fn deploy_cost(unit: Unit) -> ResourceStock {
    match unit {
        Unit::Troops => ResourceStock {
            food: 1,
            steel: 0,
            oil: 0,
            gold: 0,
        },
        Unit::Tanks => ResourceStock {
            food: 0,
            steel: 5,
            oil: 2,
            gold: 0,
        },
        Unit::Jets => ResourceStock {
            food: 0,
            steel: 10,
            oil: 5,
            gold: 0,
        },
    }
}

/// Research a unit kind depends on.
pub const fn unit_research(unit: Unit) -> Option<ResearchKind> {
    match unit {
        Unit::Troops => None,
        Unit::Tanks => Some(ResearchKind::Manufacturing),
        Unit::Jets => Some(ResearchKind::Flight),
    }
}

/// Building a unit kind depends on.
pub const fn unit_building(unit: Unit) -> Option<BuildingKind> {
    match unit {
        Unit::Troops => None,
        Unit::Tanks => Some(BuildingKind::Depot),
        Unit::Jets => Some(BuildingKind::Hangar),
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Gold paid per unit sold. Gold itself has no rate.
pub const fn sell_rate(resource: Resource) -> Option<u64> {
    match resource {
        Resource::Food => Some(1),
        Resource::Steel => Some(2),
        Resource::Oil => Some(3),
        Resource::Gold => None,
    }
}
