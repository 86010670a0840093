use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct UnitId;
}

/// Integer address of one square of the tactical grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Squared straight-line distance in cells between two cell centers.
    pub fn distance_squared(self, other: GridPos) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dz = self.z.abs_diff(other.z);
        dx.saturating_mul(dx).saturating_add(dz.saturating_mul(dz))
    }
}

impl Add for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridPos) -> GridPos {
        GridPos { x: self.x + rhs.x, z: self.z + rhs.z }
    }
}

impl Sub for GridPos {
    type Output = GridPos;

    fn sub(self, rhs: GridPos) -> GridPos {
        GridPos { x: self.x - rhs.x, z: self.z - rhs.z }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, z: {}", self.x, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Opponent,
}

impl Faction {
    pub fn opposing(self) -> Faction {
        match self {
            Faction::Player => Faction::Opponent,
            Faction::Opponent => Faction::Player,
        }
    }

    /// The phase in which units of this faction act.
    pub fn phase(self) -> Phase {
        match self {
            Faction::Player => Phase::Player,
            Faction::Opponent => Phase::Opponent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Player,
    Opponent,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Player => Phase::Opponent,
            Phase::Opponent => Phase::Player,
        }
    }

    pub fn faction(self) -> Faction {
        match self {
            Phase::Player => Faction::Player,
            Phase::Opponent => Faction::Opponent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitCondition {
    Dodging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Shoot,
    Dodge,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Move => "Move",
            ActionKind::Shoot => "Shoot",
            ActionKind::Dodge => "Dodge",
        }
    }

    pub fn highlight(self) -> HighlightColor {
        match self {
            ActionKind::Move => HighlightColor::Green,
            ActionKind::Shoot => HighlightColor::Red,
            ActionKind::Dodge => HighlightColor::White,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightColor {
    White,
    Green,
    Red,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    PlayersWin,
    OpponentsWin,
}

/// Notifications consumed by rendering and UI layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    TurnChanged { turn: u32, phase: Phase },
    ActionPointsChanged { unit: UnitId },
    HealthChanged { unit: UnitId },
    ActionStarted { unit: UnitId, action: ActionKind },
    ActionCompleted { unit: UnitId, action: ActionKind },
    UnitMoved { unit: UnitId },
    ShotFired { shooter: UnitId, target: UnitId },
    UnitDied { unit: UnitId },
    SelectedUnitChanged,
    SelectedActionChanged,
    BusyChanged,
}
