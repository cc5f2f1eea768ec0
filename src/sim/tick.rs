//! Fixed timestep simulation tick
//!
//! Core game loop that advances the arena by one step, in strict order:
//! respawn gate, player input, enemies, fuses, explosions, collisions,
//! power-ups, victory, explosion decay.

use glam::IVec2;
use rand::Rng;

use super::actor::Direction;
use super::ai::shuffled_directions;
use super::bomb::Owner;
use super::grid::Cell;
use super::state::{GameEvent, GamePhase, GameState, PowerUp, PowerUpKind};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// One-shot: drop a bomb on the player's cell
    pub place_bomb: bool,
}

impl TickInput {
    /// First held direction, in priority order up, down, left, right
    pub fn direction(&self) -> Option<Direction> {
        [
            (self.up, Direction::Up),
            (self.down, Direction::Down),
            (self.left, Direction::Left),
            (self.right, Direction::Right),
        ]
        .into_iter()
        .find_map(|(held, dir)| held.then_some(dir))
    }
}

/// Advance the game state by one timestep of `dt` seconds
pub fn tick<R: Rng + ?Sized>(state: &mut GameState, input: &TickInput, dt: f32, rng: &mut R) {
    if state.phase.is_over() {
        return;
    }

    if !state.player.is_alive() {
        handle_player_death(state);
    }
    if !state.player.is_alive() {
        return;
    }

    state.time_ticks += 1;

    apply_player_input(state, input, dt);
    step_enemies(state, dt, rng);

    let expired: Vec<u32> = state
        .bombs
        .iter_mut()
        .filter_map(|bomb| bomb.advance(dt).then_some(bomb.id))
        .collect();
    for id in expired {
        detonate(state, id, rng);
    }

    resolve_collisions(state);
    collect_powerups(state);
    check_victory(state);

    state.explosion_timer += dt;
    if state.explosion_timer >= state.tuning.explosion_clear_secs {
        state.grid.clear_explosions();
        state.explosion_timer = 0.0;
    }
}

fn handle_player_death(state: &mut GameState) {
    if state.player.has_lives() {
        let start = state.tuning.player_start;
        state.player.respawn(start);
        state.events.push(GameEvent::PlayerRespawned);
        log::debug!("Player respawned at {start} ({} lives)", state.player.lives());
    } else {
        state.phase = GamePhase::Defeated;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over after {} ticks", state.time_ticks);
    }
}

/// A cell an actor may enter: walkable terrain without a live bomb
fn is_open(state: &GameState, pos: IVec2) -> bool {
    state.grid.is_walkable(pos) && !state.bomb_at(pos)
}

fn apply_player_input(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.place_bomb && state.player.actor.can_place_bomb() {
        let pos = state.player.pos();
        if !state.bomb_at(pos) {
            state.player.actor.place_bomb();
            let range = state.player.bomb_range();
            state.spawn_bomb(Owner::Player, pos, range);
        }
    }

    state.player_move_timer += dt;
    if state.player_move_timer < state.tuning.player_move_delay {
        return;
    }
    if let Some(dir) = input.direction() {
        let target = state.player.pos() + dir.offset();
        if is_open(state, target) {
            state.player.actor.step(dir);
            state.player_move_timer = 0.0;
        }
    }
}

fn step_enemies<R: Rng + ?Sized>(state: &mut GameState, dt: f32, rng: &mut R) {
    for i in 0..state.enemies.len() {
        if !state.enemies[i].is_alive() {
            continue;
        }

        let has_bombs = state.enemies[i].actor.can_place_bomb();
        let intent = state.enemies[i]
            .brain
            .think(dt, has_bombs, &state.tuning, rng);

        let origin = state.enemies[i].pos();
        let mut moved = false;
        if intent.move_ready {
            for dir in shuffled_directions(rng) {
                let target = origin + dir.offset();
                // Enemies also shy away from live blast cells
                if is_open(state, target) && state.grid.cell(target) != Cell::Explosion {
                    state.enemies[i].actor.step(dir);
                    moved = true;
                    break;
                }
            }
        }

        // The bomb goes behind the enemy so it never walls itself in
        if intent.wants_bomb
            && moved
            && state.enemies[i].actor.can_place_bomb()
            && !state.bomb_at(origin)
        {
            state.enemies[i].actor.place_bomb();
            let range = state.tuning.enemy_bomb_range;
            state.spawn_bomb(Owner::Enemy, origin, range);
        }
    }
}

fn detonate<R: Rng + ?Sized>(state: &mut GameState, id: u32, rng: &mut R) {
    let Some(idx) = state.bombs.iter().position(|b| b.id == id) else {
        return;
    };
    let bomb = state.bombs.remove(idx);

    let destroyed = state.grid.blast_victims(bomb.pos, bomb.range);
    state.grid.carve_explosion(bomb.pos, bomb.range);
    state.events.push(GameEvent::BombExploded {
        pos: bomb.pos,
        owner: bomb.owner,
    });
    log::debug!(
        "Bomb {} exploded at {} (range {}, {} blocks destroyed)",
        bomb.id,
        bomb.pos,
        bomb.range,
        destroyed.len()
    );

    let chance = f64::from(state.tuning.powerup_spawn_chance);
    for pos in destroyed {
        if rng.random_bool(chance) && !state.powerup_at(pos) {
            let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
            let id = state.next_entity_id();
            state.powerups.push(PowerUp {
                id,
                kind,
                pos,
                collected: false,
            });
            state.events.push(GameEvent::PowerUpSpawned { pos, kind });
            log::debug!("{kind:?} power-up dropped at {pos}");
        }
    }

    match bomb.owner {
        Owner::Player => state.player.actor.return_bomb(),
        // Any living enemy gets the bomb back, not necessarily the placer
        Owner::Enemy => {
            if let Some(enemy) = state.enemies.iter_mut().find(|e| e.is_alive()) {
                enemy.actor.return_bomb();
            }
        }
    }
}

fn resolve_collisions(state: &mut GameState) {
    let player_pos = state.player.pos();
    let player_hit = state.grid.cell(player_pos) == Cell::Explosion
        || state
            .enemies
            .iter()
            .any(|e| e.is_alive() && e.pos() == player_pos);
    if player_hit && state.player.kill() {
        let lives_left = state.player.lives();
        state.events.push(GameEvent::PlayerDied { lives_left });
        log::debug!("Player died at {player_pos} ({lives_left} lives left)");
    }

    for (index, enemy) in state.enemies.iter_mut().enumerate() {
        if enemy.is_alive() && state.grid.cell(enemy.pos()) == Cell::Explosion && enemy.kill() {
            state.events.push(GameEvent::EnemyKilled { index });
            log::debug!("Enemy {index} destroyed at {}", enemy.pos());
        }
    }
}

fn collect_powerups(state: &mut GameState) {
    if !state.player.is_alive() {
        return;
    }

    let player_pos = state.player.pos();
    for powerup in state.powerups.iter_mut() {
        if powerup.collected || powerup.pos != player_pos {
            continue;
        }
        match powerup.kind {
            PowerUpKind::ExtraBomb => state.player.increase_max_bombs(),
            PowerUpKind::ExtraLife => state.player.add_life(),
            PowerUpKind::ExtraRange => state.player.increase_bomb_range(),
        }
        powerup.collected = true;
        state.events.push(GameEvent::PowerUpCollected {
            pos: powerup.pos,
            kind: powerup.kind,
        });
        log::debug!("Collected {:?}", powerup.kind);
    }
    state.powerups.retain(|p| !p.collected);
}

fn check_victory(state: &mut GameState) {
    if state.phase.is_over() || state.initial_enemies == 0 {
        return;
    }
    if state.living_enemies() == 0 {
        state.phase = GamePhase::Victorious;
        state.events.push(GameEvent::Victory);
        log::info!("All enemies destroyed after {} ticks", state.time_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{Enemy, Player};
    use crate::sim::grid::Grid;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// 9x9 arena with a wall border and nothing else
    fn open_grid() -> Grid {
        let mut grid = Grid::empty(9, 9);
        for i in 0..9 {
            grid.set(IVec2::new(i, 0), Cell::Wall);
            grid.set(IVec2::new(i, 8), Cell::Wall);
            grid.set(IVec2::new(0, i), Cell::Wall);
            grid.set(IVec2::new(8, i), Cell::Wall);
        }
        grid
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            enemy_bomb_chance: 0.0,
            powerup_spawn_chance: 0.0,
            // Enemies stand still unless a test wants them moving
            enemy_move_delay: 1000.0,
            ..Tuning::default()
        }
    }

    fn arena(tuning: Tuning, enemies: &[(i32, i32)]) -> GameState {
        let player = Player::new(
            IVec2::new(1, 1),
            tuning.player_lives,
            tuning.player_max_bombs,
            tuning.player_bomb_range,
        );
        let enemies = enemies
            .iter()
            .map(|&(x, y)| Enemy::new(IVec2::new(x, y), tuning.enemy_max_bombs))
            .collect();
        GameState::with_layout(tuning, open_grid(), player, enemies)
    }

    #[test]
    fn test_input_priority() {
        let input = TickInput {
            left: true,
            down: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Some(Direction::Down));
        assert_eq!(TickInput::default().direction(), None);
    }

    #[test]
    fn test_player_move_cadence() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        let right = TickInput {
            right: true,
            ..Default::default()
        };

        tick(&mut state, &right, 0.1, &mut rng);
        assert_eq!(state.player.pos(), IVec2::new(1, 1));
        tick(&mut state, &right, 0.1, &mut rng);
        assert_eq!(state.player.pos(), IVec2::new(2, 1));
        // Timer restarted after the step
        tick(&mut state, &right, 0.1, &mut rng);
        assert_eq!(state.player.pos(), IVec2::new(2, 1));
    }

    #[test]
    fn test_player_blocked_by_wall_and_bomb() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);

        let up = TickInput {
            up: true,
            ..Default::default()
        };
        tick(&mut state, &up, 0.2, &mut rng);
        assert_eq!(state.player.pos(), IVec2::new(1, 1));

        let id = state.next_entity_id();
        state.bombs.push(crate::sim::Bomb::new(id, Owner::Enemy, IVec2::new(2, 1), 3.0, 1));
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &right, 0.2, &mut rng);
        assert_eq!(state.player.pos(), IVec2::new(1, 1));
    }

    #[test]
    fn test_place_bomb_once_per_cell() {
        let mut tuning = quiet_tuning();
        tuning.player_max_bombs = 2;
        let mut state = arena(tuning, &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        let drop = TickInput {
            place_bomb: true,
            ..Default::default()
        };

        tick(&mut state, &drop, 0.01, &mut rng);
        tick(&mut state, &drop, 0.01, &mut rng);
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.player.actor.bomb_count(), 1);
        assert_eq!(state.bombs[0].range, state.player.bomb_range());

        let events = state.drain_events();
        let placed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BombPlaced { .. }))
            .count();
        assert_eq!(placed, 1);
    }

    #[test]
    fn test_player_bomb_returns_capacity() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.spawn_bomb(Owner::Player, IVec2::new(5, 5), 1);
        state.player.actor.place_bomb();
        assert_eq!(state.player.actor.bomb_count(), 0);

        tick(&mut state, &TickInput::default(), 3.0, &mut rng);
        assert!(state.bombs.is_empty());
        assert_eq!(state.player.actor.bomb_count(), 1);
    }

    #[test]
    fn test_enemy_bomb_returns_to_first_living_enemy() {
        let mut state = arena(quiet_tuning(), &[(7, 1), (7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.enemies[0].kill();
        state.enemies[1].actor.place_bomb();
        state.spawn_bomb(Owner::Enemy, IVec2::new(4, 4), 1);

        tick(&mut state, &TickInput::default(), 3.0, &mut rng);
        assert_eq!(state.enemies[1].actor.bomb_count(), 1);
    }

    #[test]
    fn test_enemy_bomb_capacity_lost_without_living_enemy() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.enemies[0].actor.place_bomb();
        state.enemies[0].kill();
        state.spawn_bomb(Owner::Enemy, IVec2::new(4, 4), 1);

        tick(&mut state, &TickInput::default(), 3.0, &mut rng);
        assert!(state.bombs.is_empty());
        assert_eq!(state.enemies[0].actor.bomb_count(), 0);
    }

    #[test]
    fn test_explosion_kills_player_once() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.grid.set(IVec2::new(1, 1), Cell::Explosion);

        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert!(!state.player.is_alive());
        assert_eq!(state.player.lives(), 2);

        // Next tick respawns at the start cell, which is still burning
        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert_eq!(state.player.lives(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerRespawned));
    }

    #[test]
    fn test_enemy_contact_kills_player() {
        let mut state = arena(quiet_tuning(), &[(1, 1)]);
        let mut rng = Pcg32::seed_from_u64(1);
        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert!(!state.player.is_alive());
        assert!(state.enemies[0].is_alive());
    }

    #[test]
    fn test_defeat_latches() {
        let mut tuning = quiet_tuning();
        tuning.player_lives = 1;
        let mut state = arena(tuning, &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.player.kill();

        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert_eq!(state.phase, GamePhase::Defeated);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver]);

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_powerup_collection() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        for kind in PowerUpKind::ALL {
            let id = state.next_entity_id();
            state.powerups.push(PowerUp {
                id,
                kind,
                pos: IVec2::new(1, 1),
                collected: false,
            });
        }
        let id = state.next_entity_id();
        state.powerups.push(PowerUp {
            id,
            kind: PowerUpKind::ExtraLife,
            pos: IVec2::new(3, 3),
            collected: false,
        });

        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert_eq!(state.player.lives(), 4);
        assert_eq!(state.player.actor.max_bombs(), 2);
        assert_eq!(state.player.actor.bomb_count(), 2);
        assert_eq!(state.player.bomb_range(), 3);
        assert_eq!(state.powerups.len(), 1);
        assert_eq!(state.powerups[0].pos, IVec2::new(3, 3));
    }

    #[test]
    fn test_powerup_spawns_on_destroyed_block() {
        let mut tuning = quiet_tuning();
        tuning.powerup_spawn_chance = 1.0;
        let mut state = arena(tuning, &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(5);
        state.grid.set(IVec2::new(4, 2), Cell::Block);
        state.grid.set(IVec2::new(6, 4), Cell::Block);
        state.spawn_bomb(Owner::Enemy, IVec2::new(4, 4), 3);

        tick(&mut state, &TickInput::default(), 3.0, &mut rng);
        let mut spots: Vec<IVec2> = state.powerups.iter().map(|p| p.pos).collect();
        spots.sort_by_key(|p| (p.x, p.y));
        assert_eq!(spots, vec![IVec2::new(4, 2), IVec2::new(6, 4)]);
        assert_eq!(state.grid.cell(IVec2::new(4, 2)), Cell::Empty);
    }

    #[test]
    fn test_enemy_wanders_on_cadence() {
        let mut tuning = quiet_tuning();
        tuning.enemy_move_delay = 0.3;
        let mut state = arena(tuning, &[(4, 4)]);
        let mut rng = Pcg32::seed_from_u64(11);

        tick(&mut state, &TickInput::default(), 0.1, &mut rng);
        assert_eq!(state.enemies[0].pos(), IVec2::new(4, 4));
        tick(&mut state, &TickInput::default(), 0.25, &mut rng);
        let moved = state.enemies[0].pos() - IVec2::new(4, 4);
        assert_eq!(moved.x.abs() + moved.y.abs(), 1);
    }

    #[test]
    fn test_boxed_in_enemy_stays_put() {
        let mut tuning = quiet_tuning();
        tuning.enemy_move_delay = 0.0;
        tuning.enemy_bomb_delay = 0.0;
        tuning.enemy_bomb_chance = 1.0;
        let mut state = arena(tuning, &[(4, 4)]);
        let mut rng = Pcg32::seed_from_u64(2);
        for pos in [(4, 3), (4, 5), (3, 4)] {
            state.grid.set(IVec2::new(pos.0, pos.1), Cell::Wall);
        }
        state.grid.set(IVec2::new(5, 4), Cell::Explosion);

        tick(&mut state, &TickInput::default(), 0.01, &mut rng);
        assert_eq!(state.enemies[0].pos(), IVec2::new(4, 4));
        // No move, so no bomb either
        assert!(state.bombs.is_empty());
    }

    #[test]
    fn test_enemy_never_steps_onto_bomb() {
        let mut tuning = quiet_tuning();
        tuning.enemy_move_delay = 0.0;
        let mut state = arena(tuning, &[(4, 4)]);
        let mut rng = Pcg32::seed_from_u64(2);
        for pos in [(4, 3), (4, 5), (3, 4)] {
            state.grid.set(IVec2::new(pos.0, pos.1), Cell::Wall);
        }
        state.spawn_bomb(Owner::Player, IVec2::new(5, 4), 2);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), 0.01, &mut rng);
            assert_eq!(state.enemies[0].pos(), IVec2::new(4, 4));
        }
        assert_eq!(state.bombs.len(), 1);
    }

    #[test]
    fn test_explosions_clear_on_timer() {
        let mut state = arena(quiet_tuning(), &[(7, 7)]);
        let mut rng = Pcg32::seed_from_u64(1);
        state.grid.set(IVec2::new(5, 5), Cell::Explosion);

        tick(&mut state, &TickInput::default(), 0.25, &mut rng);
        assert_eq!(state.grid.cell(IVec2::new(5, 5)), Cell::Explosion);
        tick(&mut state, &TickInput::default(), 0.25, &mut rng);
        assert_eq!(state.grid.cell(IVec2::new(5, 5)), Cell::Empty);
    }
}
