//! Single and double rails.
//!
//! A rail path is a [`DirFlags`] with exactly two bits set: a train entering
//! through one end leaves through the other. Trains sharing a path in the
//! same step leave with the mix of their colors.
//!
//! A [`DoubleRail`] carries two paths through one cell. When they form a
//! straight "+" crossing, the paths never interact. Otherwise trains from
//! both paths that leave through the same side merge into one train.

use alloc::format;
use alloc::vec::Vec;

use crate::color::Color;
use crate::direction::{Dir, DirFlags};
use crate::error::{Error, Result};
use crate::grid::Cursor;
use crate::render::RenderEvent;
use crate::state::{merge_coincident, one, Deployment, TrainState};
use crate::train::Train;

fn check_path(path: DirFlags) -> Result<DirFlags> {
    if path.len() != 2 {
        return Err(Error::malformed(format!(
            "rail path needs exactly 2 ends, got {}",
            path.len()
        )));
    }
    Ok(path)
}

/// Mixed color of the trains on one path, or `None` if there are none.
fn path_color(trains: &[Train]) -> Option<Color> {
    let colors: Vec<Color> = trains.iter().map(|t| t.color).collect();
    Color::mix_many(&colors).ok()
}

// ============================================================================
// Single Rail
// ============================================================================

/// A rail with one path through the cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleRail {
    ends: DirFlags,
    state: Option<TrainState>,
}

impl SingleRail {
    /// Rail joining sides `a` and `b`.
    pub fn new(a: Dir, b: Dir) -> Result<Self> {
        if a == b {
            return Err(Error::malformed(format!("rail ends must differ, both are {a}")));
        }
        Ok(Self {
            ends: DirFlags::from_dirs(&[a, b]),
            state: None,
        })
    }

    /// Rail from a two-direction mask.
    pub fn from_flags(ends: DirFlags) -> Result<Self> {
        Ok(Self {
            ends: check_path(ends)?,
            state: None,
        })
    }

    /// The two ends.
    pub fn ends(&self) -> DirFlags {
        self.ends
    }

    /// Where a lone `train` leaves this rail, if it entered through an end.
    pub fn redirect(&self, train: Train) -> Option<Train> {
        self.ends
            .dir_excluding(train.entry())
            .map(|exit| train.heading(exit))
    }

    pub(crate) fn accepts(&self, train: &Train) -> bool {
        self.ends.contains(train.entry())
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut()
    }

    pub(crate) fn init_state(&mut self) {
        self.state = Some(TrainState::new());
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) {
        let ends = self.ends;
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let Ok(mixed) = Color::mix_many(&state.colors()) else {
            return;
        };
        state.deploy_all(cursor, |train| {
            ends.dir_excluding(train.entry())
                .map(|exit| one(Train::new(mixed, exit)))
                .unwrap_or_default()
        });
    }
}

// ============================================================================
// Double Rail
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
struct DoubleRailState {
    trains: TrainState,
    top_index: u8,
}

/// Two rail paths sharing one cell.
///
/// `top_index` names the path drawn on top. It alternates with every train
/// routed and has no effect on where trains go, except that a train
/// entering through a side both paths share takes the top path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoubleRail {
    paths: [DirFlags; 2],
    state: Option<DoubleRailState>,
}

impl DoubleRail {
    /// Double rail from two distinct two-end paths; `first` starts on top.
    pub fn new(first: DirFlags, second: DirFlags) -> Result<Self> {
        let (first, second) = (check_path(first)?, check_path(second)?);
        if first == second {
            return Err(Error::malformed("double rail paths must differ"));
        }
        Ok(Self {
            paths: [first, second],
            state: None,
        })
    }

    /// Both paths, in construction order.
    pub fn paths(&self) -> [DirFlags; 2] {
        self.paths
    }

    /// Index of the path drawn on top; 0 outside a run.
    pub fn top_index(&self) -> u8 {
        self.state.as_ref().map_or(0, |s| s.top_index)
    }

    /// True if the paths share a side.
    pub fn overlaps(&self) -> bool {
        !self.paths[0].is_disjoint(self.paths[1])
    }

    /// True for the straight "+" crossing, where trains pass without mixing.
    pub fn crosses_over(&self) -> bool {
        !self.overlaps() && self.paths[0].is_straight() && self.paths[1].is_straight()
    }

    pub(crate) fn accepts(&self, train: &Train) -> bool {
        (self.paths[0] | self.paths[1]).contains(train.entry())
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref().map(|s| &s.trains)
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut().map(|s| &mut s.trains)
    }

    pub(crate) fn init_state(&mut self) {
        self.state = Some(DoubleRailState {
            trains: TrainState::new(),
            top_index: 0,
        });
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) {
        let paths = self.paths;
        let crossing = self.crosses_over();
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let top = state.top_index;
        let mut routed = 0usize;
        state.trains.deploy_at_once(cursor, |trains| {
            let plan = route(paths, top, crossing, trains);
            routed = plan
                .iter()
                .map(|d| match d {
                    Deployment::Route { .. } => 1,
                    Deployment::Merge { preimages, .. } => preimages.len(),
                    Deployment::Crash { .. } => 0,
                })
                .sum();
            plan
        });

        let next = ((top as usize + routed) % 2) as u8;
        if next != top {
            state.top_index = next;
            cursor.render(RenderEvent::PathsSwapped { top_index: next });
        }
    }
}

/// Plan the departure of every resident train of a double rail.
fn route(paths: [DirFlags; 2], top: u8, crossing: bool, trains: Vec<Train>) -> Vec<Deployment> {
    let order = if top == 0 { [0, 1] } else { [1, 0] };
    let mut on_path: [Vec<Train>; 2] = [Vec::new(), Vec::new()];
    let mut plan = Vec::new();

    for train in trains {
        match order.iter().find(|&&i| paths[i].contains(train.entry())) {
            Some(&i) => on_path[i].push(train),
            None => plan.push(Deployment::Crash { preimage: train }),
        }
    }

    let mut redirected = Vec::new();
    for (path, trains) in paths.iter().zip(&on_path) {
        let Some(mixed) = path_color(trains) else {
            continue;
        };
        for train in trains {
            if let Some(exit) = path.dir_excluding(train.entry()) {
                redirected.push((*train, Train::new(mixed, exit)));
            }
        }
    }

    if crossing {
        plan.extend(
            redirected
                .into_iter()
                .map(|(preimage, image)| Deployment::Route { preimage, image }),
        );
    } else {
        plan.extend(merge_coincident(redirected));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn flags(dirs: &[Dir]) -> DirFlags {
        DirFlags::from_dirs(dirs)
    }

    #[test]
    fn single_rail_validation() {
        assert!(SingleRail::new(Dir::Up, Dir::Up).is_err());
        assert!(SingleRail::from_flags(DirFlags::ALL).is_err());
        let rail = SingleRail::new(Dir::Left, Dir::Down).unwrap();
        assert_eq!(rail.ends(), flags(&[Dir::Left, Dir::Down]));
    }

    #[test]
    fn single_rail_redirects_to_other_end() {
        let rail = SingleRail::new(Dir::Left, Dir::Down).unwrap();
        // Heading right enters on the left and turns down.
        let out = rail.redirect(Train::new(Color::Red, Dir::Right));
        assert_eq!(out, Some(Train::new(Color::Red, Dir::Down)));
        assert!(rail.accepts(&Train::new(Color::Red, Dir::Up)));
        assert!(!rail.accepts(&Train::new(Color::Red, Dir::Left)));
    }

    #[test]
    fn double_rail_validation() {
        assert!(DoubleRail::new(DirFlags::HORIZONTAL, DirFlags::HORIZONTAL).is_err());
        assert!(DoubleRail::new(DirFlags::HORIZONTAL, DirFlags::from_dir(Dir::Up)).is_err());
        assert!(DoubleRail::new(DirFlags::HORIZONTAL, DirFlags::VERTICAL).is_ok());
    }

    #[test]
    fn double_rail_geometry() {
        let plus = DoubleRail::new(DirFlags::HORIZONTAL, DirFlags::VERTICAL).unwrap();
        assert!(!plus.overlaps());
        assert!(plus.crosses_over());

        let curves = DoubleRail::new(flags(&[Dir::Left, Dir::Up]), flags(&[Dir::Right, Dir::Down]))
            .unwrap();
        assert!(!curves.overlaps());
        assert!(!curves.crosses_over());

        let fork = DoubleRail::new(flags(&[Dir::Left, Dir::Up]), flags(&[Dir::Left, Dir::Down]))
            .unwrap();
        assert!(fork.overlaps());
    }

    #[test]
    fn crossing_keeps_colors_apart() {
        let red = Train::new(Color::Red, Dir::Right);
        let blue = Train::new(Color::Blue, Dir::Up);
        let plan = route(
            [DirFlags::HORIZONTAL, DirFlags::VERTICAL],
            0,
            true,
            vec![red, blue],
        );
        assert_eq!(
            plan,
            vec![
                Deployment::Route {
                    preimage: red,
                    image: red
                },
                Deployment::Route {
                    preimage: blue,
                    image: blue
                },
            ]
        );
    }

    #[test]
    fn curved_paths_merge_on_shared_exit() {
        // Both paths leave through the left side.
        let paths = [flags(&[Dir::Left, Dir::Up]), flags(&[Dir::Left, Dir::Down])];
        // One train comes down through the top, one up through the bottom.
        let yellow = Train::new(Color::Yellow, Dir::Down);
        let blue = Train::new(Color::Blue, Dir::Up);
        let plan = route(paths, 0, false, vec![yellow, blue]);
        assert_eq!(
            plan,
            vec![Deployment::Merge {
                preimages: vec![yellow, blue],
                image: Train::new(Color::Green, Dir::Left),
            }]
        );
    }

    #[test]
    fn shared_side_takes_top_path() {
        let paths = [flags(&[Dir::Left, Dir::Up]), flags(&[Dir::Left, Dir::Down])];
        // Heading right enters through the shared left side.
        let red = Train::new(Color::Red, Dir::Right);
        let via_first = route(paths, 0, false, vec![red]);
        assert_eq!(
            via_first,
            vec![Deployment::Route {
                preimage: red,
                image: red.heading(Dir::Up)
            }]
        );
        let via_second = route(paths, 1, false, vec![red]);
        assert_eq!(
            via_second,
            vec![Deployment::Route {
                preimage: red,
                image: red.heading(Dir::Down)
            }]
        );
    }

    #[test]
    fn same_path_trains_mix_but_keep_exits() {
        let red = Train::new(Color::Red, Dir::Right);
        let blue = Train::new(Color::Blue, Dir::Left);
        let plan = route(
            [DirFlags::HORIZONTAL, DirFlags::VERTICAL],
            0,
            true,
            vec![red, blue],
        );
        let images: Vec<Train> = plan
            .iter()
            .filter_map(|d| match d {
                Deployment::Route { image, .. } => Some(*image),
                _ => None,
            })
            .collect();
        assert_eq!(
            images,
            vec![
                Train::new(Color::Purple, Dir::Right),
                Train::new(Color::Purple, Dir::Left)
            ]
        );
    }

    #[test]
    fn unmatched_entry_crashes() {
        let paths = [flags(&[Dir::Left, Dir::Up]), flags(&[Dir::Left, Dir::Down])];
        // Enters through the right side, which neither path uses.
        let red = Train::new(Color::Red, Dir::Left);
        let plan = route(paths, 0, false, vec![red]);
        assert_eq!(plan, vec![Deployment::Crash { preimage: red }]);
    }
}
