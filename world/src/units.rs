//! Unit state and the roster that owns it.

use std::collections::BTreeMap;

use tactics_core::{Archetype, CellCoord, Team, UnitId, UnitStats};

/// A unit standing on the board.
#[derive(Clone, Debug)]
pub(crate) struct Unit {
    pub(crate) id: UnitId,
    pub(crate) team: Team,
    pub(crate) archetype: Archetype,
    pub(crate) stats: UnitStats,
    pub(crate) health: i32,
    pub(crate) cell: CellCoord,
    pub(crate) has_moved: bool,
    pub(crate) has_attacked: bool,
    /// Counterattack damage recorded but not yet applied.
    pub(crate) counter_debt: u32,
}

impl Unit {
    fn new(id: UnitId, team: Team, archetype: Archetype, cell: CellCoord) -> Self {
        let stats = archetype.stats();
        Self {
            id,
            team,
            archetype,
            stats,
            health: stats.max_health,
            cell,
            has_moved: false,
            has_attacked: false,
            counter_debt: 0,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Moving or attacking both count as acting for end-of-turn checks.
    pub(crate) fn has_acted(&self) -> bool {
        self.has_moved || self.has_attacked
    }

    pub(crate) fn reset_turn(&mut self) {
        self.has_moved = false;
        self.has_attacked = false;
    }

    /// Subtracts damage and returns the remaining health.
    pub(crate) fn take_damage(&mut self, damage: u32) -> i32 {
        let damage = i32::try_from(damage).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(damage);
        self.health
    }
}

/// Registry that stores units and hands out identifiers in placement order.
#[derive(Debug)]
pub(crate) struct UnitRoster {
    entries: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
}

impl UnitRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, team: Team, archetype: Archetype, cell: CellCoord) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get() + 1);
        let _ = self.entries.insert(id, Unit::new(id, team, archetype, cell));
        id
    }

    pub(crate) fn get(&self, id: UnitId) -> Option<&Unit> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.entries.remove(&id)
    }

    /// Units in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.entries.values_mut()
    }

    pub(crate) fn team(&self, team: Team) -> impl Iterator<Item = &Unit> {
        self.iter().filter(move |unit| unit.team == team)
    }

    pub(crate) fn has_survivors(&self, team: Team) -> bool {
        self.team(team).any(Unit::is_alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_assigns_identifiers_in_spawn_order() {
        let mut roster = UnitRoster::new();
        let first = roster.spawn(Team::Player, Archetype::Sniper, CellCoord::new(0, 0));
        let second = roster.spawn(Team::Ai, Archetype::Sniper, CellCoord::new(1, 0));
        assert_eq!(first, UnitId::new(0));
        assert_eq!(second, UnitId::new(1));
        let ids: Vec<UnitId> = roster.iter().map(|unit| unit.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn spawned_units_start_at_full_health() {
        let mut roster = UnitRoster::new();
        let id = roster.spawn(Team::Ai, Archetype::Brawler, CellCoord::new(2, 2));
        let unit = roster.get(id).expect("spawned");
        assert_eq!(unit.health, 40);
        assert!(!unit.has_acted());
    }

    #[test]
    fn damage_may_drive_health_negative() {
        let mut roster = UnitRoster::new();
        let id = roster.spawn(Team::Player, Archetype::Sniper, CellCoord::new(0, 0));
        let unit = roster.get_mut(id).expect("spawned");
        assert_eq!(unit.take_damage(25), -5);
        assert!(!unit.is_alive());
    }

    #[test]
    fn removed_units_no_longer_count_as_survivors() {
        let mut roster = UnitRoster::new();
        let id = roster.spawn(Team::Ai, Archetype::Sniper, CellCoord::new(0, 0));
        assert!(roster.has_survivors(Team::Ai));
        assert!(roster.remove(id).is_some());
        assert!(!roster.has_survivors(Team::Ai));
        assert!(!roster.has_survivors(Team::Player));
    }
}
