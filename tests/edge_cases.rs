//! Edge case and boundary condition tests for the tile grid

mod common;

use common::{grid_with, init_logging, line, outlet};
use rs_trainyard::{
    mock::{ModeEvent, RecordingObserver},
    Color, Config, Dir, DirFlags, DoubleRail, EditMode, Error, RenderConfig, RenderEvent,
    SimConfig, SimOutcome, Tile, TileGrid,
};

fn tile_grid(width: usize, colors: &[Color], targets: &[Color]) -> TileGrid<RecordingObserver> {
    TileGrid::new(line(width, colors, targets), RecordingObserver::new())
}

// ============================================================================
// Run Limits
// ============================================================================

#[test]
fn step_ceiling_stops_run() {
    init_logging();
    let mut tg = tile_grid(4, &[Color::Red; 10], &[Color::Red; 10])
        .with_config(Config::default().with_sim(SimConfig::default().with_max_steps(3)));

    assert_eq!(tg.run(), SimOutcome::StepLimit);
    assert_eq!(tg.observer().steps.len(), 3);
    assert_eq!(tg.observer().outcomes, vec![SimOutcome::StepLimit]);
    assert!(tg.is_running());
}

#[test]
fn stepping_past_the_ceiling_reports_the_real_outcome() {
    init_logging();
    let mut tg = tile_grid(4, &[Color::Red; 10], &[Color::Red; 10])
        .with_config(Config::default().with_sim(SimConfig::default().with_max_steps(3)));

    assert_eq!(tg.run(), SimOutcome::StepLimit);
    while tg.step().is_some() {}
    assert!(tg.is_solved());
    assert_eq!(
        tg.observer().outcomes,
        vec![SimOutcome::StepLimit, SimOutcome::Solved]
    );
}

#[test]
fn halt_on_crash_stops_at_first_crash() {
    init_logging();
    let grid = grid_with(2, 1, vec![(0, 0, outlet(Dir::Right, &[Color::Red; 3]))]);
    let mut tg = TileGrid::new(grid, RecordingObserver::new())
        .with_config(Config::default().with_sim(SimConfig::default().with_halt_on_crash(true)));

    assert_eq!(tg.run(), SimOutcome::Failed);
    assert_eq!(tg.observer().steps.len(), 1);
}

#[test]
fn crashes_do_not_halt_by_default() {
    init_logging();
    let grid = grid_with(2, 1, vec![(0, 0, outlet(Dir::Right, &[Color::Red; 3]))]);
    let mut tg = TileGrid::new(grid, RecordingObserver::new());

    assert_eq!(tg.run(), SimOutcome::Failed);
    let obs = tg.observer();
    assert_eq!(obs.steps.len(), 3);
    assert!(obs.steps.iter().all(|s| s.has_crash()));
    assert_eq!(obs.fail_count, 1);
}

#[test]
fn unsatisfied_goal_is_incomplete() {
    init_logging();
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red, Color::Red]);
    assert_eq!(tg.run(), SimOutcome::Incomplete);
    assert!(!tg.is_solved());
}

#[test]
fn empty_grid_is_done_immediately() {
    let mut tg = TileGrid::new(rs_trainyard::Grid::new(2, 2), RecordingObserver::new());
    assert_eq!(tg.run(), SimOutcome::Solved);
    assert!(tg.observer().steps.is_empty());
}

#[test]
fn step_without_run_is_none() {
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    assert!(tg.step().is_none());
    assert!(tg.peek(3).is_empty());
    assert!(tg.step_partial(0.5).is_empty());
    assert!(tg.observer().outcomes.is_empty());
}

// ============================================================================
// Look-ahead
// ============================================================================

#[test]
fn peek_is_replayed_by_step() {
    init_logging();
    let mut tg = tile_grid(4, &[Color::Red, Color::Blue], &[Color::Red, Color::Blue]);
    tg.start_sim();

    let peeked: Vec<_> = tg.peek(2).into_iter().cloned().collect();
    assert_eq!(peeked.len(), 2);
    assert!(tg.observer().steps.is_empty());

    assert_eq!(tg.step().as_ref(), Some(&peeked[0]));
    assert_eq!(tg.step().as_ref(), Some(&peeked[1]));
    assert_eq!(tg.run(), SimOutcome::Solved);
}

#[test]
fn peek_does_not_show_unconsumed_steps() {
    init_logging();
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    tg.start_sim();
    tg.step();
    assert!(!tg.is_solved());

    assert_eq!(tg.peek(4).len(), 1);
    assert!(!tg.is_solved());
    assert!(tg.tile(1, 0).is_some_and(Tile::has_trains));
    let Some(Tile::Goal(goal)) = tg.tile(2, 0) else {
        panic!("expected a goal");
    };
    assert_eq!(goal.remaining(), Some(&[Color::Red][..]));

    tg.step();
    assert!(tg.is_solved());
    assert!(tg.tile(1, 0).is_some_and(|t| !t.has_trains()));
}

#[test]
fn peeked_crash_fails_only_when_consumed() {
    init_logging();
    let mut tg = tile_grid(3, &[Color::Blue], &[Color::Red]);
    tg.start_sim();

    let peeked = tg.peek(5);
    assert!(peeked.iter().any(|s| s.has_crash()));
    assert!(!tg.has_failed());
    assert_eq!(tg.observer().fail_count, 0);

    tg.step();
    assert!(!tg.has_failed());
    tg.step();
    assert!(tg.has_failed());
    assert_eq!(tg.observer().fail_count, 1);
}

#[test]
fn peek_is_capped() {
    let mut tg = tile_grid(4, &[Color::Red; 6], &[Color::Red; 6])
        .with_config(Config::default().with_sim(SimConfig::default().with_peek_limit(3)));
    tg.start_sim();
    assert_eq!(tg.peek(100).len(), 3);
    assert_eq!(tg.peek(1).len(), 1);
}

// ============================================================================
// Render Updates
// ============================================================================

#[test]
fn goal_marker_waits_for_progress() {
    init_logging();
    let render = RenderConfig::default().with_goal_marker_progress(0.5);
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red])
        .with_config(Config::default().with_render(render));
    tg.start_sim();
    tg.step();
    tg.step();

    assert!(tg.step_partial(0.25).is_empty());
    let due = tg.step_partial(0.75);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].tile, 2);
    assert_eq!(
        due[0].event,
        RenderEvent::GoalTargetConsumed { color: Color::Red }
    );

    let obs = tg.observer();
    assert_eq!(obs.progress, vec![0.25, 0.75]);
    assert_eq!(obs.render_updates, due);
}

#[test]
fn unplayed_updates_flush_on_next_step() {
    init_logging();
    let mut tg = tile_grid(3, &[Color::Red, Color::Red], &[Color::Red, Color::Red]);
    tg.start_sim();
    tg.step();
    tg.step();
    assert!(tg.observer().render_updates.is_empty());

    // The goal marker from step 2 was never replayed.
    tg.step();
    assert_eq!(tg.observer().render_updates.len(), 1);
    assert_eq!(tg.observer().render_updates[0].tile, 2);
}

#[test]
fn crash_update_lands_at_end_of_step() {
    init_logging();
    let grid = grid_with(2, 1, vec![(0, 0, outlet(Dir::Right, &[Color::Red]))]);
    let mut tg = TileGrid::new(grid, RecordingObserver::new());
    tg.start_sim();
    tg.step();

    assert!(tg.step_partial(0.99).is_empty());
    let due = tg.step_partial(1.0);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].tile, 0);
    assert_eq!(due[0].event, RenderEvent::Crash);
}

#[test]
fn double_rail_swaps_top_path() -> anyhow::Result<()> {
    init_logging();
    let plus = DoubleRail::new(DirFlags::HORIZONTAL, DirFlags::VERTICAL)?;
    let grid = grid_with(
        3,
        1,
        vec![
            (0, 0, outlet(Dir::Right, &[Color::Red])),
            (1, 0, Tile::DoubleRail(plus)),
            (2, 0, common::goal(&[Color::Red], &[Dir::Left])),
        ],
    );
    let mut tg = TileGrid::new(grid, RecordingObserver::new());
    tg.start_sim();
    tg.step();
    tg.step();

    let Some(Tile::DoubleRail(rail)) = tg.tile(1, 0) else {
        anyhow::bail!("expected a double rail");
    };
    assert_eq!(rail.top_index(), 1);
    let due = tg.step_partial(1.0);
    assert!(due
        .iter()
        .any(|u| u.tile == 1 && u.event == RenderEvent::PathsSwapped { top_index: 1 }));
    Ok(())
}

// ============================================================================
// Run Lifecycle
// ============================================================================

#[test]
fn restart_resets_run_state() {
    init_logging();
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    assert_eq!(tg.run(), SimOutcome::Solved);

    tg.start_sim();
    let Some(Tile::Outlet(source)) = tg.tile(0, 0) else {
        panic!("expected an outlet");
    };
    assert_eq!(source.remaining(), 1);
    assert!(!tg.is_solved());

    assert_eq!(tg.run(), SimOutcome::Solved);
    assert_eq!(
        tg.observer().outcomes,
        vec![SimOutcome::Solved, SimOutcome::Solved]
    );
}

#[test]
fn close_discards_state() {
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    tg.start_sim();
    tg.step();
    tg.close_sim();

    assert!(!tg.is_running());
    assert!(tg.stateful_tiles().all(|(_, t)| t.train_state().is_none()));
    assert!(tg.step().is_none());
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn edit_mode_transitions_notify_observer() {
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    tg.set_edit_mode(EditMode::Draw);
    tg.set_edit_mode(EditMode::Erase);
    tg.set_edit_mode(EditMode::Erase);

    assert_eq!(
        tg.observer().mode_events,
        vec![
            ModeEvent::Exit(EditMode::Off),
            ModeEvent::Enter(EditMode::Draw),
            ModeEvent::Exit(EditMode::Draw),
            ModeEvent::Enter(EditMode::Erase),
        ]
    );
}

#[test]
fn drawing_a_loop_then_undoing_it() -> anyhow::Result<()> {
    let mut tg = TileGrid::new(rs_trainyard::Grid::new(2, 2), RecordingObserver::new());
    tg.draw_rail(0, 0, Dir::Right, Dir::Down)?;
    tg.draw_rail(1, 0, Dir::Left, Dir::Down)?;
    tg.draw_rail(1, 1, Dir::Left, Dir::Up)?;
    tg.draw_rail(0, 1, Dir::Right, Dir::Up)?;
    assert!(tg.stateful_tiles().all(|(_, t)| t.is_rail()));
    assert_eq!(tg.stateful_tiles().count(), 4);

    while tg.undo() {}
    assert_eq!(tg.stateful_tiles().count(), 0);
    Ok(())
}

#[test]
fn editing_is_locked_during_a_run() {
    let mut tg = tile_grid(3, &[Color::Red], &[Color::Red]);
    tg.start_sim();
    assert!(matches!(
        tg.draw_rail(1, 0, Dir::Up, Dir::Down),
        Err(Error::SimulationRunning)
    ));
    assert!(matches!(tg.erase(1, 0), Err(Error::SimulationRunning)));
    assert!(!tg.undo());

    tg.close_sim();
    assert!(tg.draw_rail(1, 0, Dir::Up, Dir::Down).unwrap());
    assert!(matches!(tg.tile(1, 0), Some(Tile::DoubleRail(_))));
}

#[test]
fn erase_on_blank_is_a_no_op() {
    let mut tg = TileGrid::new(rs_trainyard::Grid::new(1, 1), RecordingObserver::new());
    assert!(!tg.erase(0, 0).unwrap());
    assert!(!tg.can_undo());
}
