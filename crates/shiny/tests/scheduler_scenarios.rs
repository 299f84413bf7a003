//! Multi-second scheduler runs against the in-memory world.

use shinymobs_core::{PlayerId, RegistryKey, TICKS_PER_MINUTE, TICKS_PER_SECOND};
use shinymobs_shiny::{
    is_hard_shiny, is_shiny, JsonFileBackend, MemoryBackend, ProfileFallback, ShinyConfig,
    ShinyEvents, SpawnScheduler, TimerState,
};
use shinymobs_testkit::{arena_player, dark_arena, lit_arena, player_id};
use shinymobs_world::{Creatures, MemoryWorld, Players};

fn run_seconds(scheduler: &mut SpawnScheduler, world: &mut MemoryWorld, seconds: u64) -> usize {
    (0..seconds * TICKS_PER_SECOND)
        .map(|_| scheduler.tick(world).len())
        .sum()
}

fn short_config() -> ShinyConfig {
    let mut config = ShinyConfig::default();
    config.spawn.min_spawn_minutes = 1;
    config.spawn.max_spawn_minutes = 2;
    config.spawn.spawn_distance = 12;
    config
}

#[test]
fn fresh_players_have_default_preferences() {
    let scheduler = SpawnScheduler::new(ShinyConfig::default(), 0);
    for n in 0..50 {
        let id = player_id(n);
        assert!(!scheduler.preferences().is_spawn_disabled(id));
        assert!(!scheduler.preferences().is_hard_mode_enabled(id));
    }
}

#[test]
fn expired_timer_spawns_one_tracked_creature_and_rearms() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let config = ShinyConfig::default();
    let mut scheduler = SpawnScheduler::new(config.clone(), 2024);

    // First boundary initializes the timer inside the configured range.
    run_seconds(&mut scheduler, &mut world, 1);
    let initial = scheduler.timer_ticks(player).unwrap();
    let range = i64::from(config.spawn.min_spawn_minutes) * TICKS_PER_MINUTE as i64
        ..=i64::from(config.spawn.max_spawn_minutes) * TICKS_PER_MINUTE as i64;
    assert!(range.contains(&initial));

    scheduler.set_timer(player, 20);
    assert_eq!(run_seconds(&mut scheduler, &mut world, 1), 1);

    assert_eq!(scheduler.tracker().len(), 1);
    let creature = scheduler.tracker().get(player).unwrap();
    assert!(is_shiny(&world, creature));
    assert!(range.contains(&scheduler.timer_ticks(player).unwrap()));
    assert_eq!(world.inbox(player).len(), 1);
    assert!(world.inbox(player)[0].text.starts_with("⭐ A Shiny Mob has spawned at X: "));
}

#[test]
fn hour_long_session_never_exceeds_one_shiny() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut scheduler = SpawnScheduler::new(short_config(), 77);

    let spawned = run_seconds(&mut scheduler, &mut world, 60 * 60);
    assert_eq!(spawned, 1);
    assert_eq!(scheduler.tracker().len(), 1);
    assert_eq!(world.live_creatures().len(), 1);
    assert_eq!(scheduler.timer_state(player), TimerState::CountingDown {
        ticks_remaining: scheduler.timer_ticks(player).unwrap(),
    });
}

#[test]
fn killing_the_shiny_lets_the_next_one_come() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut scheduler = SpawnScheduler::new(short_config(), 5);

    let mut kills = 0;
    for _ in 0..(20 * 60) {
        run_seconds(&mut scheduler, &mut world, 1);
        if let Some(creature) = scheduler.tracker().get(player) {
            world.kill(creature);
            scheduler.on_creature_death(&mut world, creature, Some(player));
            kills += 1;
        }
    }
    // Twenty minutes with one-to-two minute intervals.
    assert!((6..=20).contains(&kills), "kills = {kills}");
    assert_eq!(
        world.player_state(player).unwrap().experience,
        100 * kills as u32
    );
}

#[test]
fn players_are_processed_independently() {
    let mut world = dark_arena(20);
    let quiet = arena_player(&mut world, 1);
    let active = arena_player(&mut world, 2);
    let mut scheduler = SpawnScheduler::new(short_config(), 8);
    scheduler.disable_spawns(&mut world, quiet);
    scheduler.set_timer(active, 20);

    assert_eq!(run_seconds(&mut scheduler, &mut world, 1), 1);
    assert_eq!(scheduler.timer_state(quiet), TimerState::Uninitialized);
    assert!(scheduler.tracker().get(quiet).is_none());
    assert!(scheduler.tracker().get(active).is_some());
}

#[test]
fn offline_players_keep_their_timer() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut scheduler = SpawnScheduler::new(short_config(), 8);
    scheduler.set_timer(player, 200);

    let info = world.player(player).unwrap();
    world.set_online(player, false);
    scheduler.on_player_logout(&info);
    run_seconds(&mut scheduler, &mut world, 30);
    assert_eq!(scheduler.timer_ticks(player), Some(200));

    world.set_online(player, true);
    run_seconds(&mut scheduler, &mut world, 1);
    assert_eq!(scheduler.timer_ticks(player), Some(180));
}

#[test]
fn lit_world_never_spawns_but_keeps_rearming() {
    let mut world = lit_arena(20);
    let player = arena_player(&mut world, 1);
    let mut scheduler = SpawnScheduler::new(short_config(), 8);
    scheduler.set_timer(player, 20);

    assert_eq!(run_seconds(&mut scheduler, &mut world, 1), 0);
    assert!(scheduler.timer_ticks(player).unwrap() >= TICKS_PER_MINUTE as i64);
    assert!(world.live_creatures().is_empty());
}

#[test]
fn hard_mode_reaches_hard_only_types() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut config = short_config();
    config.spawn.show_spawn_message = false;
    let mut scheduler = SpawnScheduler::new(config, 31);
    scheduler.set_hard_mode(player, true);

    let mut hard_seen = false;
    for _ in 0..60 {
        let report = scheduler.spawn_for(&mut world, player, None).unwrap();
        let hard_only = scheduler.registry().profile_for(&report.kind).unwrap().hard_only;
        assert_eq!(is_hard_shiny(&world, report.creature), hard_only);
        hard_seen |= hard_only;
        world.discard(report.creature);
    }
    assert!(hard_seen);
}

#[test]
fn wither_stays_plain_without_hard_mode() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut scheduler = SpawnScheduler::new(short_config(), 1);
    let wither = RegistryKey::vanilla("wither");

    assert!(scheduler.spawn_for(&mut world, player, Some(&wither)).is_err());
    assert!(scheduler.tracker().is_empty());
    assert!(world.live_creatures().is_empty());
}

#[test]
fn global_default_fallback_admits_unlisted_types() {
    let mut world = dark_arena(20);
    let player = arena_player(&mut world, 1);
    let mut config = short_config();
    config.general.profile_fallback = ProfileFallback::GlobalDefault;
    let mut scheduler = SpawnScheduler::new(config, 1);

    let pig = RegistryKey::vanilla("pig");
    let report = scheduler.spawn_for(&mut world, player, Some(&pig)).unwrap();
    assert!(is_shiny(&world, report.creature));

    // Players stay out even when every other type is admitted.
    let human = RegistryKey::vanilla("player");
    assert!(scheduler.spawn_for(&mut world, player, Some(&human)).is_err());
    assert_eq!(world.live_creatures(), vec![report.creature]);
}

#[test]
fn kill_all_reaches_untracked_stragglers() {
    let mut world = dark_arena(20);
    let a = arena_player(&mut world, 1);
    let b = arena_player(&mut world, 2);
    let mut scheduler = SpawnScheduler::new(short_config(), 4);
    scheduler.spawn_for(&mut world, a, None).unwrap();
    scheduler.spawn_for(&mut world, b, None).unwrap();
    let straggler = scheduler.spawn_for(&mut world, a, None).unwrap();
    scheduler.set_timer(b, 100);

    assert_eq!(scheduler.kill_all(&mut world), 3);
    assert!(!world.is_live(straggler.creature));
    assert!(scheduler.tracker().is_empty());
    assert_eq!(scheduler.timer_state(b), TimerState::Uninitialized);
}

#[test]
fn preferences_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = JsonFileBackend::for_world(dir.path());
    let (off, hard) = (PlayerId::from_u128(10), PlayerId::from_u128(11));

    let mut world = dark_arena(20);
    let mut first = SpawnScheduler::new(short_config(), 1);
    first.disable_spawns(&mut world, off);
    first.set_hard_mode(hard, true);
    first.preferences().save(&mut backend);

    let mut second = SpawnScheduler::new(short_config(), 1);
    second.preferences_mut().load(&backend);
    assert!(second.preferences().is_spawn_disabled(off));
    assert!(second.preferences().is_hard_mode_enabled(hard));
    assert!(!second.preferences().is_spawn_disabled(hard));
}

#[test]
fn memory_backend_round_trip_keeps_both_documents_apart() {
    let mut backend = MemoryBackend::default();
    let mut world = dark_arena(4);
    let player = PlayerId::from_u128(3);
    let mut scheduler = SpawnScheduler::new(short_config(), 1);
    scheduler.set_hard_mode(player, true);
    scheduler.preferences().save(&mut backend);

    let mut restored = SpawnScheduler::new(short_config(), 1);
    restored.preferences_mut().load(&backend);
    assert!(restored.preferences().is_hard_mode_enabled(player));
    assert!(!restored.preferences().is_spawn_disabled(player));
    restored.disable_spawns(&mut world, player);
    assert!(restored.preferences().is_spawn_disabled(player));
}
