//! Quadrant biome archetypes for rock distribution

use serde::{Deserialize, Serialize};

use crate::world::features::FormationKind;
use crate::world::region::Quadrant;

/// Biome archetype, one per quadrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiomeArchetype {
    Riverbed,
    HillCountry,
    BrokenPlains,
    Chaotic,
}

impl BiomeArchetype {
    /// Archetype assigned to a quadrant
    pub fn for_quadrant(quadrant: Quadrant) -> Self {
        match quadrant {
            Quadrant::PosXPosZ => BiomeArchetype::Riverbed,
            Quadrant::PosXNegZ => BiomeArchetype::HillCountry,
            Quadrant::NegXNegZ => BiomeArchetype::BrokenPlains,
            Quadrant::NegXPosZ => BiomeArchetype::Chaotic,
        }
    }

    pub fn definition(self) -> BiomeDefinition {
        match self {
            BiomeArchetype::Riverbed => BiomeDefinition::riverbed(),
            BiomeArchetype::HillCountry => BiomeDefinition::hill_country(),
            BiomeArchetype::BrokenPlains => BiomeDefinition::broken_plains(),
            BiomeArchetype::Chaotic => BiomeDefinition::chaotic(),
        }
    }
}

/// Distribution characteristics of an archetype
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeDefinition {
    pub name: &'static str,
    pub archetype: BiomeArchetype,

    /// Per-size weight multipliers, Tiny..Massive
    pub size_multipliers: [f64; 5],

    /// 0.0-1.0 chance a candidate is drawn near a formation
    pub clustering: f64,

    /// 0.0-1.0, shrinks rocks and tilts them further
    pub weathering: f64,

    /// Formation kinds this biome may plan
    pub formations: &'static [FormationKind],
}

impl BiomeDefinition {
    /// Worn river stones: many small rocks, loose spread
    pub fn riverbed() -> Self {
        Self {
            name: "Riverbed",
            archetype: BiomeArchetype::Riverbed,
            size_multipliers: [1.4, 1.3, 0.9, 0.6, 0.4],
            clustering: 0.3,
            weathering: 0.8, // Heavily smoothed
            formations: &[
                FormationKind::Erosion,
                FormationKind::Scattered,
                FormationKind::Landslide,
            ],
        }
    }

    /// Rolling hills with outcrops
    pub fn hill_country() -> Self {
        Self {
            name: "Hill Country",
            archetype: BiomeArchetype::HillCountry,
            size_multipliers: [0.8, 1.0, 1.2, 1.3, 1.1],
            clustering: 0.6,
            weathering: 0.4,
            formations: &[
                FormationKind::Outcrop,
                FormationKind::Amphitheater,
                FormationKind::Landslide,
            ],
        }
    }

    pub fn broken_plains() -> Self {
        Self {
            name: "Broken Plains",
            archetype: BiomeArchetype::BrokenPlains,
            size_multipliers: [1.0, 1.1, 1.1, 0.9, 0.8],
            clustering: 0.45,
            weathering: 0.6,
            formations: &[
                FormationKind::Scattered,
                FormationKind::Battlefield,
                FormationKind::Erosion,
            ],
        }
    }

    /// Jagged, heavily clustered, big rocks
    pub fn chaotic() -> Self {
        Self {
            name: "Chaotic",
            archetype: BiomeArchetype::Chaotic,
            size_multipliers: [0.9, 0.9, 1.0, 1.2, 1.5],
            clustering: 0.75,
            weathering: 0.2, // Fresh fractures
            formations: &[
                FormationKind::Battlefield,
                FormationKind::Landslide,
                FormationKind::Outcrop,
                FormationKind::Amphitheater,
            ],
        }
    }
}
