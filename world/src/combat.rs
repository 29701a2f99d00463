//! Attack resolution, counterattacks, and counterattack debt.

use rand::Rng;
use tactics_core::{Archetype, CounterTiming, Event, Rejection, Team, UnitId, COUNTER_DAMAGE};
use tracing::debug;

use crate::{log_tag, World};

/// Reports whether the target of an attack strikes back.
///
/// Only snipers draw return fire: from another sniper at any range, or from
/// a brawler standing right next to them.
pub(crate) fn counter_applies(attacker: Archetype, target: Archetype, distance: u32) -> bool {
    match (attacker, target) {
        (Archetype::Sniper, Archetype::Sniper) => true,
        (Archetype::Sniper, Archetype::Brawler) => distance == 1,
        (Archetype::Brawler, _) => false,
    }
}

/// Rolls damage for `attacker` against `target` and applies the consequences.
///
/// Range is checked by the caller. A target killed by the primary hit does
/// not strike back.
pub(crate) fn resolve_attack(
    world: &mut World,
    attacker_id: UnitId,
    target_id: UnitId,
    out_events: &mut Vec<Event>,
) -> Result<(), Rejection> {
    let attacker = world
        .units
        .get(attacker_id)
        .ok_or(Rejection::MissingUnit(attacker_id))?;
    if attacker.has_attacked {
        return Err(Rejection::AlreadyAttacked(attacker_id));
    }
    let (attacker_team, attacker_archetype, attacker_cell, stats) =
        (attacker.team, attacker.archetype, attacker.cell, attacker.stats);

    let target = world
        .units
        .get(target_id)
        .filter(|unit| unit.is_alive())
        .ok_or(Rejection::MissingUnit(target_id))?;
    let (target_archetype, target_cell, target_max) =
        (target.archetype, target.cell, target.stats.max_health);

    let damage = world.rng.gen_range(stats.min_damage..=stats.max_damage);
    let mut remaining = target_max;
    if let Some(target) = world.units.get_mut(target_id) {
        remaining = target.take_damage(damage);
    }
    if let Some(attacker) = world.units.get_mut(attacker_id) {
        attacker.has_attacked = true;
    }

    debug!(%attacker_id, %target_id, damage, remaining, "attack resolved");
    out_events.push(Event::AttackResolved {
        attacker: attacker_id,
        target: target_id,
        damage,
    });
    out_events.push(Event::HealthChanged {
        unit: target_id,
        current: remaining,
        max: target_max,
    });
    out_events.push(Event::MoveLogged {
        actor: log_tag(attacker_team, attacker_archetype),
        action: target_cell.label(),
        target: damage.to_string(),
    });

    if remaining <= 0 {
        world.eliminate(target_id, out_events);
        return Ok(());
    }

    let distance = attacker_cell.manhattan_distance(target_cell);
    if !counter_applies(attacker_archetype, target_archetype, distance) {
        return Ok(());
    }

    let (low, high) = COUNTER_DAMAGE;
    let counter = world.rng.gen_range(low..=high);
    let deferred =
        world.counter_timing == CounterTiming::Deferred && attacker_team == Team::Player;
    out_events.push(Event::CounterAttack {
        striker: target_id,
        victim: attacker_id,
        damage: counter,
        deferred,
    });

    if deferred {
        if let Some(attacker) = world.units.get_mut(attacker_id) {
            attacker.counter_debt = attacker.counter_debt.saturating_add(counter);
        }
        return Ok(());
    }

    apply_counter_damage(world, attacker_id, counter, out_events);
    Ok(())
}

/// Charges every player unit the counterattack damage it still owes.
pub(crate) fn settle_counter_debts(world: &mut World, out_events: &mut Vec<Event>) {
    let debtors: Vec<(UnitId, u32)> = world
        .units
        .team(Team::Player)
        .filter(|unit| unit.counter_debt > 0)
        .map(|unit| (unit.id, unit.counter_debt))
        .collect();

    for (unit_id, debt) in debtors {
        if world.winner.is_some() {
            return;
        }
        if let Some(unit) = world.units.get_mut(unit_id) {
            unit.counter_debt = 0;
        }
        out_events.push(Event::CounterDebtResolved {
            unit: unit_id,
            damage: debt,
        });
        apply_counter_damage(world, unit_id, debt, out_events);
    }
}

fn apply_counter_damage(
    world: &mut World,
    unit_id: UnitId,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    let Some(unit) = world.units.get_mut(unit_id) else {
        return;
    };
    let remaining = unit.take_damage(damage);
    let max = unit.stats.max_health;
    let actor = format!(
        "{} {} {}",
        log_tag(unit.team, unit.archetype),
        unit.cell.label(),
        damage
    );

    debug!(%unit_id, damage, remaining, "counterattack damage applied");
    out_events.push(Event::HealthChanged {
        unit: unit_id,
        current: remaining,
        max,
    });
    out_events.push(Event::MoveLogged {
        actor,
        action: String::from("Counterattack"),
        target: String::new(),
    });

    if remaining <= 0 {
        world.eliminate(unit_id, out_events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snipers_always_draw_fire_from_snipers() {
        assert!(counter_applies(Archetype::Sniper, Archetype::Sniper, 1));
        assert!(counter_applies(Archetype::Sniper, Archetype::Sniper, 9));
    }

    #[test]
    fn brawlers_only_return_fire_when_adjacent() {
        assert!(counter_applies(Archetype::Sniper, Archetype::Brawler, 1));
        assert!(!counter_applies(Archetype::Sniper, Archetype::Brawler, 2));
    }

    #[test]
    fn brawler_attacks_never_draw_counters() {
        assert!(!counter_applies(Archetype::Brawler, Archetype::Sniper, 1));
        assert!(!counter_applies(Archetype::Brawler, Archetype::Brawler, 1));
    }
}
