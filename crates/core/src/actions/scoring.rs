//! Candidate records and the shared tie-break policy.
//! Ties at the maximum value are broken uniformly at random on the battlefield's rng,
//! never by list order.

use tracing::debug;

use crate::state::Battlefield;
use crate::types::{ActionKind, GridPos, UnitId};

/// One scored option for the decision engine. Built fresh per decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub action: ActionKind,
    pub cell: GridPos,
    pub value: i32,
}

impl Candidate {
    pub fn sentinel(action: ActionKind, cell: GridPos) -> Self {
        Self { action, cell, value: 0 }
    }
}

/// Best of one action's scored cells; the zero sentinel at the actor's cell when empty.
pub fn pick_best(
    board: &mut Battlefield,
    actor: UnitId,
    action: ActionKind,
    scored: &[(GridPos, i32)],
) -> Candidate {
    let Some(max) = scored.iter().map(|&(_, value)| value).max() else {
        let home = board.unit(actor).map(|unit| unit.pos).unwrap_or_default();
        return Candidate::sentinel(action, home);
    };
    let tied: Vec<GridPos> =
        scored.iter().filter(|&&(_, value)| value == max).map(|&(cell, _)| cell).collect();
    let cell = tied[board.pick_index(tied.len())];
    debug!(?action, %cell, value = max, tied = tied.len(), "best candidate");
    Candidate { action, cell, value: max }
}

/// Best across actions, same uniform policy at the action level.
pub fn pick_best_across(board: &mut Battlefield, candidates: &[Candidate]) -> Option<Candidate> {
    let max = candidates.iter().map(|candidate| candidate.value).max()?;
    let tied: Vec<Candidate> =
        candidates.iter().filter(|candidate| candidate.value == max).copied().collect();
    Some(tied[board.pick_index(tied.len())])
}
