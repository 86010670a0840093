//! Player command surface: select a unit, select an action, commit at a cell.
//! This module exists to validate commands from an input layer before they touch state.
//! It does not read devices or draw highlights; it only answers which cells to draw.

use tracing::{debug, warn};

use super::*;
use crate::error::SimError;

impl Simulation {
    pub fn selected_unit(&self) -> Option<UnitId> {
        self.selection.unit
    }

    pub fn selected_action(&self) -> Option<ActionKind> {
        self.selection.action
    }

    pub fn is_busy(&self) -> bool {
        self.selection.busy
    }

    /// Reselecting the current unit is a no-op.
    pub fn select_unit(&mut self, id: UnitId) -> Result<(), SimError> {
        if self.selection.busy {
            return Err(SimError::Busy);
        }
        let Some(unit) = self.board.unit(id) else {
            return Err(SimError::UnknownUnit(id));
        };
        let phase = self.turn.phase();
        if unit.faction != Faction::Player || phase != Phase::Player {
            warn!(unit = ?id, ?phase, "selection rejected");
            return Err(SimError::WrongPhase { unit: Some(id), phase });
        }
        if self.selection.unit == Some(id) {
            return Ok(());
        }

        self.selection.unit = Some(id);
        self.board.events.push(SimEvent::SelectedUnitChanged);
        let first = self.actions.get(id).and_then(|list| list.first()).map(|action| action.kind());
        self.set_selected_action(first);
        debug!(unit = ?id, "unit selected");
        Ok(())
    }

    pub fn select_action(&mut self, kind: ActionKind) -> Result<(), SimError> {
        if self.selection.busy {
            return Err(SimError::Busy);
        }
        let unit = self.selection.unit.ok_or(SimError::NoUnitSelected)?;
        let owned = self
            .actions
            .get(unit)
            .is_some_and(|list| list.iter().any(|action| action.kind() == kind));
        if !owned {
            return Err(SimError::ActionNotOwned { unit, action: kind });
        }
        self.set_selected_action(Some(kind));
        Ok(())
    }

    /// Valid target cells of the selected action and the colour to draw them in.
    pub fn highlighted_cells(&mut self) -> Option<(Vec<GridPos>, HighlightColor)> {
        let unit = self.selection.unit?;
        let kind = self.selection.action?;
        let action = action_in(&mut self.actions, unit, kind)?;
        let cells = action.valid_targets(&mut self.board, unit);
        Some((cells, kind.highlight()))
    }

    /// Validates and starts the selected action at `cell`. A rejected command
    /// clears the selected action.
    pub fn commit_action(&mut self, cell: GridPos) -> Result<(), SimError> {
        if self.selection.busy || self.active.is_some() {
            return Err(SimError::Busy);
        }
        let unit = self.selection.unit.ok_or(SimError::NoUnitSelected)?;
        let phase = self.turn.phase();
        if phase != Phase::Player {
            return Err(SimError::WrongPhase { unit: Some(unit), phase });
        }
        let kind = self.selection.action.ok_or(SimError::NoActionSelected)?;

        if let Err(err) = self.check_command(unit, kind, cell) {
            warn!(%err, unit = ?unit, "command rejected");
            self.set_selected_action(None);
            return Err(err);
        }

        let cost = self.action_cost(unit, kind).unwrap_or_default();
        self.board.spend_action_points(unit, cost)?;
        self.selection.busy = true;
        self.board.events.push(SimEvent::BusyChanged);
        if let Err(err) = self.start_action(unit, kind, cell, Driver::Player) {
            self.selection.busy = false;
            self.board.events.push(SimEvent::BusyChanged);
            return Err(err);
        }
        Ok(())
    }

    fn check_command(&mut self, unit: UnitId, kind: ActionKind, cell: GridPos) -> Result<(), SimError> {
        let available = self.board.unit(unit).ok_or(SimError::UnknownUnit(unit))?.action_points;
        let action = action_in(&mut self.actions, unit, kind)
            .ok_or(SimError::ActionNotOwned { unit, action: kind })?;
        let needed = action.action_point_cost();
        if needed > available {
            return Err(SimError::InsufficientActionPoints { needed, available });
        }
        if !action.can_take(&mut self.board, unit, cell) {
            return Err(SimError::InvalidTarget { action: kind, cell });
        }
        Ok(())
    }

    fn set_selected_action(&mut self, kind: Option<ActionKind>) {
        if self.selection.action != kind {
            self.selection.action = kind;
            self.board.events.push(SimEvent::SelectedActionChanged);
        }
    }
}
