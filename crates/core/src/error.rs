use crate::types::{ActionKind, GridPos, Phase, UnitId};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot spawn unit at ({pos}): {reason}")]
    InvalidSpawn { pos: GridPos, reason: &'static str },

    #[error("unit {unit:?} has {expected} but is missing its {missing} action")]
    MissingAction { unit: Option<UnitId>, expected: ActionKind, missing: ActionKind },

    #[error("unit {0:?} does not exist")]
    UnknownUnit(UnitId),

    #[error("command not allowed for {unit:?} during the {phase:?} phase")]
    WrongPhase { unit: Option<UnitId>, phase: Phase },

    #[error("an action is still executing")]
    Busy,

    #[error("no unit selected")]
    NoUnitSelected,

    #[error("no action selected")]
    NoActionSelected,

    #[error("unit {unit:?} does not own a {action} action")]
    ActionNotOwned { unit: UnitId, action: ActionKind },

    #[error("not enough action points: needs {needed}, has {available}")]
    InsufficientActionPoints { needed: u32, available: u32 },

    #[error("({cell}) is not a valid target for {action}")]
    InvalidTarget { action: ActionKind, cell: GridPos },

    #[error("cannot block ({pos}): a unit is standing there")]
    BlockedUnderUnit { pos: GridPos },

    #[error("{0} is already executing")]
    ActionAlreadyActive(ActionKind),
}
