//! Brawler registry
//!
//! Every brawler type maps to one static [`BrawlerDef`] holding its base stats,
//! basic attack pattern, super archetype and star powers. Adding a brawler
//! means adding a variant and a registry entry; the combat code only ever
//! reads these tables.

use serde::{Deserialize, Serialize};

use crate::consts::{LEVEL_BONUS, MAX_LEVEL};

/// Brawler types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrawlerKind {
    Buckshot,
    Gunslinger,
    Bruiser,
    Phoenix,
    Bomber,
    Alchemist,
    Tinker,
    Rammer,
    Pyro,
    Frost,
    Medic,
    /// Summoned by Tinker, never selectable
    Bear,
}

/// Lingering damage pool left behind by a lobbed projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub radius: f32,
    /// Damage per tick (level 1)
    pub damage: f32,
    /// Seconds between ticks against the same character
    pub tick_rate: f32,
    pub duration: f32,
}

/// Basic attack shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackPattern {
    /// `count` projectiles fanned evenly across `spread` radians
    Straight { count: u32, spread: f32 },
    /// `shots` projectiles along the aim, `delay` seconds apart
    Burst { shots: u32, delay: f32 },
    /// Arcing throw that ignores walls and explodes at the aim point
    Lobbed {
        blast_radius: f32,
        flight_time: f32,
        pool: Option<PoolSpec>,
    },
}

/// Status applied to the target of a basic attack hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OnHit {
    Burn {
        damage: f32,
        interval: f32,
        duration: f32,
    },
    Slow {
        factor: f32,
        duration: f32,
    },
}

/// Super ability archetypes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SuperAbility {
    /// Shotgun blast of many projectiles at once
    SpreadBurst {
        count: u32,
        spread: f32,
        damage: f32,
        range: f32,
        wall_breaking: bool,
        on_hit: Option<OnHit>,
    },
    /// Projectiles fired one after another with a fixed delay
    Volley {
        shots: u32,
        delay: f32,
        jitter: f32,
        damage: f32,
        range: f32,
        wall_breaking: bool,
    },
    /// Jump to the aim point, then hit everything near the landing spot
    /// and/or heal self
    Leap {
        range: f32,
        duration: f32,
        radius: f32,
        damage: f32,
        heal: f32,
    },
    /// Lobbed explosives, optionally leaving pools
    Throw {
        count: u32,
        scatter: f32,
        blast_radius: f32,
        damage: f32,
        range: f32,
        pool: Option<PoolSpec>,
        wall_breaking: bool,
    },
    /// Spawn an allied bot next to the caster
    Summon { kind: BrawlerKind },
    /// Ram forward dealing contact damage and flattening terrain
    Charge {
        duration: f32,
        speed: f32,
        damage: f32,
    },
    /// Teleport to the aim point and burst
    Blink { range: f32, radius: f32, damage: f32 },
    /// Heal every ally in range, caster included
    HealBurst { radius: f32, amount: f32 },
}

/// Passive modifiers ("star powers"); applied where the stat is read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StarPower {
    /// Multiplies reload duration
    QuickReload(f32),
    /// Multiplies movement speed
    SwiftFeet(f32),
    /// Heals the shooter by this fraction of damage dealt
    Lifesteal(f32),
    /// Multiplies max health
    Tough(f32),
    /// Replaces the regeneration delay (seconds)
    SecondWind(f32),
}

/// Static definition of a brawler type (level 1 values)
#[derive(Debug, Clone, PartialEq)]
pub struct BrawlerDef {
    pub name: &'static str,
    pub health: f32,
    /// Movement speed in px/s
    pub speed: f32,
    /// Damage per projectile
    pub damage: f32,
    /// Attack range in px
    pub range: f32,
    /// Seconds to reload one ammo
    pub reload: f32,
    /// Minimum seconds between basic attacks
    pub attack_interval: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub attack: AttackPattern,
    pub on_hit: Option<OnHit>,
    pub super_ability: Option<SuperAbility>,
    /// Super charge gained per basic attack hit
    pub super_charge: f32,
    pub star_powers: &'static [StarPower],
    pub summon_only: bool,
}

/// Stat multiplier for a brawler level
#[inline]
pub fn level_multiplier(level: u8) -> f32 {
    let level = level.clamp(1, MAX_LEVEL);
    1.0 + (level - 1) as f32 * LEVEL_BONUS
}

static BUCKSHOT: BrawlerDef = BrawlerDef {
    name: "Buckshot",
    health: 3600.0,
    speed: 240.0,
    damage: 300.0,
    range: 450.0,
    reload: 1.5,
    attack_interval: 0.4,
    projectile_speed: 900.0,
    projectile_radius: 8.0,
    attack: AttackPattern::Straight {
        count: 5,
        spread: 0.5,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::SpreadBurst {
        count: 9,
        spread: 0.6,
        damage: 320.0,
        range: 520.0,
        wall_breaking: true,
        on_hit: None,
    }),
    super_charge: 4.0,
    star_powers: &[StarPower::Lifesteal(0.2), StarPower::Tough(1.15)],
    summon_only: false,
};

static GUNSLINGER: BrawlerDef = BrawlerDef {
    name: "Gunslinger",
    health: 2800.0,
    speed: 260.0,
    damage: 320.0,
    range: 650.0,
    reload: 1.6,
    attack_interval: 0.5,
    projectile_speed: 1100.0,
    projectile_radius: 7.0,
    attack: AttackPattern::Burst {
        shots: 3,
        delay: 0.08,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Volley {
        shots: 12,
        delay: 0.06,
        jitter: 0.08,
        damage: 320.0,
        range: 800.0,
        wall_breaking: true,
    }),
    super_charge: 8.0,
    star_powers: &[StarPower::QuickReload(0.75), StarPower::SwiftFeet(1.1)],
    summon_only: false,
};

static BRUISER: BrawlerDef = BrawlerDef {
    name: "Bruiser",
    health: 6000.0,
    speed: 250.0,
    damage: 380.0,
    range: 160.0,
    reload: 1.0,
    attack_interval: 0.45,
    projectile_speed: 900.0,
    projectile_radius: 14.0,
    attack: AttackPattern::Burst {
        shots: 4,
        delay: 0.1,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Leap {
        range: 600.0,
        duration: 0.7,
        radius: 180.0,
        damage: 800.0,
        heal: 0.0,
    }),
    super_charge: 6.0,
    star_powers: &[StarPower::Tough(1.15), StarPower::Lifesteal(0.15)],
    summon_only: false,
};

static PHOENIX: BrawlerDef = BrawlerDef {
    name: "Phoenix",
    health: 4200.0,
    speed: 245.0,
    damage: 700.0,
    range: 600.0,
    reload: 1.4,
    attack_interval: 0.35,
    projectile_speed: 1000.0,
    projectile_radius: 10.0,
    attack: AttackPattern::Straight {
        count: 1,
        spread: 0.0,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Leap {
        range: 700.0,
        duration: 0.6,
        radius: 140.0,
        damage: 500.0,
        heal: 1500.0,
    }),
    super_charge: 15.0,
    star_powers: &[StarPower::SecondWind(1.5), StarPower::Lifesteal(0.1)],
    summon_only: false,
};

static BOMBER: BrawlerDef = BrawlerDef {
    name: "Bomber",
    health: 2800.0,
    speed: 240.0,
    damage: 800.0,
    range: 650.0,
    reload: 1.7,
    attack_interval: 0.4,
    projectile_speed: 0.0,
    projectile_radius: 12.0,
    attack: AttackPattern::Lobbed {
        blast_radius: 110.0,
        flight_time: 0.8,
        pool: None,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Throw {
        count: 1,
        scatter: 0.0,
        blast_radius: 200.0,
        damage: 2000.0,
        range: 700.0,
        pool: None,
        wall_breaking: true,
    }),
    super_charge: 12.0,
    star_powers: &[StarPower::QuickReload(0.8), StarPower::SwiftFeet(1.12)],
    summon_only: false,
};

static ALCHEMIST: BrawlerDef = BrawlerDef {
    name: "Alchemist",
    health: 2600.0,
    speed: 240.0,
    damage: 600.0,
    range: 600.0,
    reload: 1.5,
    attack_interval: 0.4,
    projectile_speed: 0.0,
    projectile_radius: 10.0,
    attack: AttackPattern::Lobbed {
        blast_radius: 80.0,
        flight_time: 0.7,
        pool: Some(PoolSpec {
            radius: 90.0,
            damage: 500.0,
            tick_rate: 0.75,
            duration: 2.0,
        }),
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Throw {
        count: 5,
        scatter: 120.0,
        blast_radius: 80.0,
        damage: 600.0,
        range: 650.0,
        pool: Some(PoolSpec {
            radius: 100.0,
            damage: 600.0,
            tick_rate: 0.75,
            duration: 3.0,
        }),
        wall_breaking: false,
    }),
    super_charge: 10.0,
    star_powers: &[StarPower::QuickReload(0.8), StarPower::Lifesteal(0.15)],
    summon_only: false,
};

static TINKER: BrawlerDef = BrawlerDef {
    name: "Tinker",
    health: 3400.0,
    speed: 245.0,
    damage: 900.0,
    range: 600.0,
    reload: 1.3,
    attack_interval: 0.35,
    projectile_speed: 950.0,
    projectile_radius: 10.0,
    attack: AttackPattern::Straight {
        count: 1,
        spread: 0.0,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Summon {
        kind: BrawlerKind::Bear,
    }),
    super_charge: 14.0,
    star_powers: &[StarPower::Tough(1.2), StarPower::SwiftFeet(1.1)],
    summon_only: false,
};

static RAMMER: BrawlerDef = BrawlerDef {
    name: "Rammer",
    health: 5000.0,
    speed: 250.0,
    damage: 360.0,
    range: 350.0,
    reload: 1.6,
    attack_interval: 0.45,
    projectile_speed: 900.0,
    projectile_radius: 8.0,
    attack: AttackPattern::Straight {
        count: 5,
        spread: 0.45,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::Charge {
        duration: 1.0,
        speed: 800.0,
        damage: 1200.0,
    }),
    super_charge: 4.0,
    star_powers: &[StarPower::SecondWind(1.0), StarPower::Tough(1.15)],
    summon_only: false,
};

static PYRO: BrawlerDef = BrawlerDef {
    name: "Pyro",
    health: 3200.0,
    speed: 255.0,
    damage: 220.0,
    range: 400.0,
    reload: 1.2,
    attack_interval: 0.3,
    projectile_speed: 800.0,
    projectile_radius: 12.0,
    attack: AttackPattern::Straight {
        count: 3,
        spread: 0.3,
    },
    on_hit: Some(OnHit::Burn {
        damage: 80.0,
        interval: 0.5,
        duration: 2.0,
    }),
    super_ability: Some(SuperAbility::Blink {
        range: 550.0,
        radius: 180.0,
        damage: 1400.0,
    }),
    super_charge: 6.0,
    star_powers: &[StarPower::SwiftFeet(1.12), StarPower::SecondWind(1.5)],
    summon_only: false,
};

static FROST: BrawlerDef = BrawlerDef {
    name: "Frost",
    health: 3000.0,
    speed: 240.0,
    damage: 420.0,
    range: 700.0,
    reload: 1.5,
    attack_interval: 0.4,
    projectile_speed: 1000.0,
    projectile_radius: 8.0,
    attack: AttackPattern::Straight {
        count: 2,
        spread: 0.1,
    },
    on_hit: Some(OnHit::Slow {
        factor: 0.6,
        duration: 1.5,
    }),
    super_ability: Some(SuperAbility::SpreadBurst {
        count: 12,
        spread: std::f32::consts::TAU,
        damage: 500.0,
        range: 450.0,
        wall_breaking: false,
        on_hit: Some(OnHit::Slow {
            factor: 0.5,
            duration: 2.0,
        }),
    }),
    super_charge: 7.0,
    star_powers: &[StarPower::QuickReload(0.8), StarPower::Tough(1.15)],
    summon_only: false,
};

static MEDIC: BrawlerDef = BrawlerDef {
    name: "Medic",
    health: 3800.0,
    speed: 240.0,
    damage: 400.0,
    range: 550.0,
    reload: 1.4,
    attack_interval: 0.45,
    projectile_speed: 750.0,
    projectile_radius: 10.0,
    attack: AttackPattern::Straight {
        count: 5,
        spread: 0.9,
    },
    on_hit: None,
    super_ability: Some(SuperAbility::HealBurst {
        radius: 350.0,
        amount: 2000.0,
    }),
    super_charge: 6.0,
    star_powers: &[StarPower::SecondWind(1.5), StarPower::Tough(1.2)],
    summon_only: false,
};

static BEAR: BrawlerDef = BrawlerDef {
    name: "Bear",
    health: 4000.0,
    speed: 260.0,
    damage: 400.0,
    range: 140.0,
    reload: 0.6,
    attack_interval: 0.5,
    projectile_speed: 900.0,
    projectile_radius: 14.0,
    attack: AttackPattern::Straight {
        count: 1,
        spread: 0.0,
    },
    on_hit: None,
    super_ability: None,
    super_charge: 0.0,
    star_powers: &[],
    summon_only: true,
};

impl BrawlerKind {
    /// Brawlers a player or bot may pick
    pub const PLAYABLE: [BrawlerKind; 11] = [
        BrawlerKind::Buckshot,
        BrawlerKind::Gunslinger,
        BrawlerKind::Bruiser,
        BrawlerKind::Phoenix,
        BrawlerKind::Bomber,
        BrawlerKind::Alchemist,
        BrawlerKind::Tinker,
        BrawlerKind::Rammer,
        BrawlerKind::Pyro,
        BrawlerKind::Frost,
        BrawlerKind::Medic,
    ];

    /// Registry lookup
    pub fn def(self) -> &'static BrawlerDef {
        match self {
            BrawlerKind::Buckshot => &BUCKSHOT,
            BrawlerKind::Gunslinger => &GUNSLINGER,
            BrawlerKind::Bruiser => &BRUISER,
            BrawlerKind::Phoenix => &PHOENIX,
            BrawlerKind::Bomber => &BOMBER,
            BrawlerKind::Alchemist => &ALCHEMIST,
            BrawlerKind::Tinker => &TINKER,
            BrawlerKind::Rammer => &RAMMER,
            BrawlerKind::Pyro => &PYRO,
            BrawlerKind::Frost => &FROST,
            BrawlerKind::Medic => &MEDIC,
            BrawlerKind::Bear => &BEAR,
        }
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        BrawlerKind::PLAYABLE
            .iter()
            .chain(std::iter::once(&BrawlerKind::Bear))
            .copied()
            .find(|kind| kind.name().to_lowercase() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_multiplier_monotonic() {
        for level in 1..MAX_LEVEL {
            assert!(level_multiplier(level + 1) > level_multiplier(level));
        }
        assert_eq!(level_multiplier(1), 1.0);
        // Out of range levels clamp
        assert_eq!(level_multiplier(0), level_multiplier(1));
        assert_eq!(level_multiplier(40), level_multiplier(MAX_LEVEL));
    }

    #[test]
    fn test_every_playable_has_super_and_star_powers() {
        for kind in BrawlerKind::PLAYABLE {
            let def = kind.def();
            assert!(!def.summon_only, "{} marked summon only", def.name);
            assert!(def.super_ability.is_some(), "{} has no super", def.name);
            assert!(!def.star_powers.is_empty(), "{} has no star power", def.name);
            assert!(def.super_charge > 0.0);
            assert!(def.reload > 0.0);
        }
    }

    #[test]
    fn test_registry_covers_every_archetype() {
        let supers: Vec<_> = BrawlerKind::PLAYABLE
            .iter()
            .filter_map(|k| k.def().super_ability)
            .collect();
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::SpreadBurst { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Volley { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Leap { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Throw { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Summon { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Charge { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::Blink { .. })));
        assert!(supers.iter().any(|s| matches!(s, SuperAbility::HealBurst { .. })));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(BrawlerKind::parse("buckshot"), Some(BrawlerKind::Buckshot));
        assert_eq!(BrawlerKind::parse("BEAR"), Some(BrawlerKind::Bear));
        assert_eq!(BrawlerKind::parse("nobody"), None);
    }
}
