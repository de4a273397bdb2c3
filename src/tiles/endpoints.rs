//! Outlets, where trains start, and goals, where they must end.

use alloc::vec::Vec;

use crate::color::Color;
use crate::direction::{Dir, DirFlags};
use crate::error::{Error, Result};
use crate::grid::Cursor;
use crate::render::RenderEvent;
use crate::state::{one, TrainState};
use crate::train::{Move, Train};

/// Releases its trains one per step through a single side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outlet {
    out: Dir,
    colors: Vec<Color>,
    state: Option<TrainState>,
}

impl Outlet {
    /// Outlet emitting `colors`, in order, towards `out`.
    pub fn new(out: Dir, colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            out,
            colors: colors.into_iter().collect(),
            state: None,
        }
    }

    /// Side the trains leave through.
    pub fn out(&self) -> Dir {
        self.out
    }

    /// Full departure list as configured in the level.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Trains still waiting to leave during a run.
    pub fn remaining(&self) -> usize {
        self.state.as_ref().map_or(0, TrainState::len)
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut()
    }

    pub(crate) fn init_state(&mut self) {
        let out = self.out;
        self.state = Some(TrainState::with_trains(
            self.colors.iter().map(|c| Train::new(*c, out)),
        ));
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) {
        if let Some(state) = self.state.as_mut() {
            state.deploy_one(cursor, one);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct GoalState {
    remaining: Vec<Color>,
    trains: TrainState,
}

/// Absorbs trains whose color is still wanted.
///
/// A goal consumes a train the moment it arrives, so it never holds
/// resident trains. An arrival whose color is not among the remaining
/// targets is a crash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Goal {
    targets: Vec<Color>,
    entrances: DirFlags,
    state: Option<GoalState>,
}

impl Goal {
    /// Goal wanting `targets` through the sides in `entrances`.
    pub fn new(targets: impl IntoIterator<Item = Color>, entrances: DirFlags) -> Result<Self> {
        if entrances.is_empty() {
            return Err(Error::malformed("goal needs at least one entrance"));
        }
        Ok(Self {
            targets: targets.into_iter().collect(),
            entrances,
            state: None,
        })
    }

    /// Targets as configured in the level.
    pub fn targets(&self) -> &[Color] {
        &self.targets
    }

    /// Sides that accept trains.
    pub fn entrances(&self) -> DirFlags {
        self.entrances
    }

    /// Targets not yet delivered, while a run is active.
    pub fn remaining(&self) -> Option<&[Color]> {
        self.state.as_ref().map(|s| s.remaining.as_slice())
    }

    /// True once every target has been delivered during the current run.
    pub fn is_satisfied(&self) -> bool {
        self.remaining().is_some_and(<[Color]>::is_empty)
    }

    pub(crate) fn accepts(&self, train: &Train) -> bool {
        self.entrances.contains(train.entry())
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref().map(|s| &s.trains)
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut().map(|s| &mut s.trains)
    }

    pub(crate) fn init_state(&mut self) {
        self.state = Some(GoalState {
            remaining: self.targets.clone(),
            trains: TrainState::new(),
        });
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    /// Consume an arriving train, returning the render event to show.
    pub(crate) fn receive(&mut self, train: Train) -> Option<RenderEvent> {
        let state = self.state.as_mut()?;
        match state.remaining.iter().position(|c| *c == train.color) {
            Some(i) => {
                state.remaining.remove(i);
                state.trains.record(Move::Destroy {
                    preimage: train,
                    crashed: false,
                });
                Some(RenderEvent::GoalTargetConsumed { color: train.color })
            }
            None => {
                state.trains.record(Move::Destroy {
                    preimage: train,
                    crashed: true,
                });
                Some(RenderEvent::Crash)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlet_seeds_trains_facing_out() {
        let mut outlet = Outlet::new(Dir::Down, [Color::Red, Color::Blue]);
        assert_eq!(outlet.remaining(), 0);
        outlet.init_state();
        assert_eq!(outlet.remaining(), 2);
        let trains: Vec<_> = outlet.state().unwrap().trains().copied().collect();
        assert_eq!(
            trains,
            [
                Train::new(Color::Red, Dir::Down),
                Train::new(Color::Blue, Dir::Down)
            ]
        );
        outlet.close();
        assert!(outlet.state().is_none());
    }

    #[test]
    fn goal_requires_an_entrance() {
        assert!(Goal::new([Color::Red], DirFlags::EMPTY).is_err());
    }

    #[test]
    fn goal_accepts_by_side_only() {
        let goal = Goal::new([Color::Red], DirFlags::from_dir(Dir::Left)).unwrap();
        // Heading right enters through the left side.
        assert!(goal.accepts(&Train::new(Color::Blue, Dir::Right)));
        assert!(!goal.accepts(&Train::new(Color::Red, Dir::Left)));
    }

    #[test]
    fn goal_consumes_each_target_once() {
        let mut goal = Goal::new([Color::Red, Color::Red], DirFlags::ALL).unwrap();
        goal.init_state();
        let red = Train::new(Color::Red, Dir::Up);

        assert_eq!(
            goal.receive(red),
            Some(RenderEvent::GoalTargetConsumed { color: Color::Red })
        );
        assert!(!goal.is_satisfied());
        goal.receive(red);
        assert!(goal.is_satisfied());

        // A third red is no longer wanted.
        assert_eq!(goal.receive(red), Some(RenderEvent::Crash));
        let moves = goal.state_mut().unwrap().take_deployed();
        assert_eq!(moves.iter().filter(|m| m.is_crash()).count(), 1);
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn goal_state_resets_on_close() {
        let mut goal = Goal::new([Color::Green], DirFlags::ALL).unwrap();
        assert_eq!(goal.remaining(), None);
        goal.init_state();
        goal.receive(Train::new(Color::Green, Dir::Up));
        assert!(goal.is_satisfied());
        goal.close();
        goal.init_state();
        assert_eq!(goal.remaining(), Some(&[Color::Green][..]));
    }
}
