//! Per-tile train bookkeeping.
//!
//! Every stateful tile owns a [`TrainState`] while a simulation run is
//! active. It holds three lists:
//!
//! - **resident** trains, processed by the tile's next step,
//! - **pending** trains, handed over by neighbours during the current step,
//! - the **deployed** move log of the current step.
//!
//! Pending trains only become resident in [`TrainState::finalize`], which the
//! simulator calls after every tile has stepped. A train delivered during a
//! step therefore never moves twice in that step, whatever order the tiles
//! are scanned in.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use heapless::Vec as HVec;

use crate::color::Color;
use crate::grid::Cursor;
use crate::render::RenderEvent;
use crate::train::{Move, Train};

/// Trains produced from one resident train: none, one, or a split pair.
pub type Images = HVec<Train, 2>;

/// A single image.
pub fn one(train: Train) -> Images {
    let mut images = Images::new();
    let _ = images.push(train);
    images
}

/// Two images (a split).
pub fn pair(first: Train, second: Train) -> Images {
    let mut images = Images::new();
    let _ = images.push(first);
    let _ = images.push(second);
    images
}

/// Plan entry returned to [`TrainState::deploy_at_once`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deployment {
    /// One resident train leaves as `image`.
    Route {
        /// Resident train.
        preimage: Train,
        /// Train sent on.
        image: Train,
    },
    /// Several resident trains leave as a single `image`.
    Merge {
        /// Resident trains.
        preimages: Vec<Train>,
        /// Combined train sent on.
        image: Train,
    },
    /// The resident train has nowhere to go.
    Crash {
        /// Resident train.
        preimage: Train,
    },
}

/// Turn `(preimage, image)` pairs into deployments, merging every group of
/// images that leave through the same side into one train.
///
/// The merged color is [`Color::mix_many`] of the group's image colors.
/// Groups keep the order in which their first member appears, and an image
/// that takes part in a merge is never routed on its own.
pub fn merge_coincident(routed: Vec<(Train, Train)>) -> Vec<Deployment> {
    let mut groups: Vec<(Vec<Train>, Vec<Train>)> = Vec::new();
    for (preimage, image) in routed {
        match groups
            .iter_mut()
            .find(|(_, images)| images[0].dir == image.dir)
        {
            Some((preimages, images)) => {
                preimages.push(preimage);
                images.push(image);
            }
            None => groups.push((alloc::vec![preimage], alloc::vec![image])),
        }
    }

    groups
        .into_iter()
        .map(|(mut preimages, images)| {
            let first = images[0];
            if preimages.len() == 1 {
                return Deployment::Route {
                    preimage: preimages.remove(0),
                    image: first,
                };
            }
            let colors: Vec<Color> = images.iter().map(|t| t.color).collect();
            let color = Color::mix_many(&colors).unwrap_or(first.color);
            Deployment::Merge {
                preimages,
                image: first.painted(color),
            }
        })
        .collect()
}

/// Resident, pending and deployed trains of one tile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainState {
    trains: VecDeque<Train>,
    pending: Vec<Train>,
    deployed: Vec<Move>,
}

impl TrainState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// State with the given resident trains, in order.
    pub fn with_trains(trains: impl IntoIterator<Item = Train>) -> Self {
        Self {
            trains: trains.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Resident trains in FIFO order.
    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.iter()
    }

    /// Trains delivered this step.
    pub fn pending(&self) -> &[Train] {
        &self.pending
    }

    /// Moves recorded so far this step.
    pub fn deployed(&self) -> &[Move] {
        &self.deployed
    }

    /// True if any train is resident.
    pub fn has_trains(&self) -> bool {
        !self.trains.is_empty()
    }

    /// Number of resident trains.
    pub fn len(&self) -> usize {
        self.trains.len()
    }

    /// True if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Colors of the resident trains.
    pub fn colors(&self) -> Vec<Color> {
        self.trains.iter().map(|t| t.color).collect()
    }

    /// Accept a train from a neighbour; it becomes resident at [`finalize`](Self::finalize).
    pub fn receive(&mut self, train: Train) {
        self.pending.push(train);
    }

    /// Append a move to this step's log.
    pub fn record(&mut self, mv: Move) {
        self.deployed.push(mv);
    }

    /// Deploy the first resident train through `f`.
    ///
    /// Returns false if there was nothing to deploy.
    pub fn deploy_one<F>(&mut self, cursor: &mut Cursor<'_>, f: F) -> bool
    where
        F: FnOnce(Train) -> Images,
    {
        let Some(preimage) = self.trains.pop_front() else {
            return false;
        };
        let images = f(preimage);
        self.dispatch(cursor, preimage, images);
        true
    }

    /// Deploy every resident train through `f`, one at a time.
    ///
    /// Returns the number of trains deployed.
    pub fn deploy_all<F>(&mut self, cursor: &mut Cursor<'_>, mut f: F) -> usize
    where
        F: FnMut(Train) -> Images,
    {
        let mut count = 0;
        while let Some(preimage) = self.trains.pop_front() {
            let images = f(preimage);
            self.dispatch(cursor, preimage, images);
            count += 1;
        }
        count
    }

    /// Hand every resident train to `f` at once and carry out its plan.
    ///
    /// Used where trains interact, e.g. two trains leaving a double rail
    /// through the same side must merge into one.
    pub fn deploy_at_once<F>(&mut self, cursor: &mut Cursor<'_>, f: F) -> usize
    where
        F: FnOnce(Vec<Train>) -> Vec<Deployment>,
    {
        if self.trains.is_empty() {
            return 0;
        }
        let residents: Vec<Train> = self.trains.drain(..).collect();
        let count = residents.len();
        for deployment in f(residents) {
            match deployment {
                Deployment::Route { preimage, image } => {
                    self.deployed.push(Move::Pass { preimage, image });
                    self.send(cursor, image);
                }
                Deployment::Merge { preimages, image } => {
                    self.deployed.push(Move::Merge {
                        preimage: preimages,
                        image,
                    });
                    self.send(cursor, image);
                }
                Deployment::Crash { preimage } => {
                    self.deployed.push(Move::Destroy {
                        preimage,
                        crashed: true,
                    });
                    cursor.render(RenderEvent::Crash);
                }
            }
        }
        count
    }

    /// Promote pending trains to resident.
    pub fn finalize(&mut self) {
        self.trains.extend(self.pending.drain(..));
    }

    /// Take this step's move log, leaving it empty.
    pub fn take_deployed(&mut self) -> Vec<Move> {
        core::mem::take(&mut self.deployed)
    }

    fn dispatch(&mut self, cursor: &mut Cursor<'_>, preimage: Train, images: Images) {
        let mv = match images.as_slice() {
            [] => {
                log::warn!(
                    "cell {}: {} train heading {} has no exit, dropped",
                    cursor.origin(),
                    preimage.color,
                    preimage.dir
                );
                Move::Destroy {
                    preimage,
                    crashed: false,
                }
            }
            [image] => Move::Pass {
                preimage,
                image: *image,
            },
            many => Move::Split {
                preimage,
                image: many.to_vec(),
            },
        };
        self.deployed.push(mv);
        for image in images {
            self.send(cursor, image);
        }
    }

    fn send(&mut self, cursor: &mut Cursor<'_>, image: Train) {
        if !cursor.send(image) {
            self.deployed.push(Move::Destroy {
                preimage: image,
                crashed: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::direction::Dir;
    use crate::grid::Grid;
    use crate::tiles::{SingleRail, Tile};
    use alloc::vec;

    fn red(dir: Dir) -> Train {
        Train::new(Color::Red, dir)
    }

    /// 2x1 grid: cell 0 is the sender (left blank), cell 1 a horizontal rail.
    fn rail_grid() -> Grid {
        let mut grid = Grid::new(2, 1);
        let rail = SingleRail::new(Dir::Left, Dir::Right).unwrap();
        grid.set(1, 0, Tile::SingleRail(rail)).unwrap();
        grid.init_state();
        grid
    }

    #[test]
    fn finalize_promotes_pending() {
        let mut state = TrainState::new();
        state.receive(red(Dir::Up));
        assert!(!state.has_trains());
        assert_eq!(state.pending().len(), 1);

        state.finalize();
        assert!(state.has_trains());
        assert!(state.pending().is_empty());
    }

    #[test]
    fn deploy_one_is_fifo() {
        let mut grid = rail_grid();
        let mut state = TrainState::with_trains([red(Dir::Right), red(Dir::Up)]);
        let mut renders = Vec::new();
        let config = RenderConfig::default();
        let mut cursor = grid.cursor(0, &mut renders, &config);

        assert!(state.deploy_one(&mut cursor, one));
        assert_eq!(state.len(), 1);
        assert_eq!(
            state.deployed(),
            &[Move::Pass {
                preimage: red(Dir::Right),
                image: red(Dir::Right)
            }]
        );
    }

    #[test]
    fn refused_image_records_crash() {
        let mut grid = rail_grid();
        // Heading up from row 0 leaves the grid.
        let mut state = TrainState::with_trains([red(Dir::Up)]);
        let mut renders = Vec::new();
        let config = RenderConfig::default();
        let mut cursor = grid.cursor(0, &mut renders, &config);

        assert_eq!(state.deploy_all(&mut cursor, one), 1);
        let moves = state.take_deployed();
        assert_eq!(moves.len(), 2);
        assert!(matches!(moves[0], Move::Pass { .. }));
        assert!(moves[1].is_crash());
        assert!(state.deployed().is_empty());
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].event, RenderEvent::Crash);
    }

    #[test]
    fn split_images_record_split_move() {
        let mut grid = rail_grid();
        let mut state = TrainState::with_trains([red(Dir::Right)]);
        let mut renders = Vec::new();
        let config = RenderConfig::default();
        let mut cursor = grid.cursor(0, &mut renders, &config);

        state.deploy_all(&mut cursor, |t| pair(t, t.heading(Dir::Down)));
        let moves = state.take_deployed();
        assert!(matches!(&moves[0], Move::Split { image, .. } if image.len() == 2));
        // The downward half leaves the 2x1 grid.
        assert_eq!(moves.iter().filter(|m| m.is_crash()).count(), 1);
    }

    #[test]
    fn empty_images_drop_quietly() {
        let mut grid = rail_grid();
        let mut state = TrainState::with_trains([red(Dir::Right)]);
        let mut renders = Vec::new();
        let config = RenderConfig::default();
        let mut cursor = grid.cursor(0, &mut renders, &config);

        state.deploy_all(&mut cursor, |_| Images::new());
        assert_eq!(
            state.take_deployed(),
            vec![Move::Destroy {
                preimage: red(Dir::Right),
                crashed: false
            }]
        );
        assert!(renders.is_empty());
    }

    #[test]
    fn merge_coincident_groups_by_exit() {
        let a = Train::new(Color::Red, Dir::Right);
        let b = Train::new(Color::Blue, Dir::Up);
        let c = Train::new(Color::Yellow, Dir::Left);
        let plan = merge_coincident(vec![
            (a, a.heading(Dir::Left)),
            (c, c.heading(Dir::Down)),
            (b, b.heading(Dir::Left)),
        ]);

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan[0],
            Deployment::Merge {
                preimages: vec![a, b],
                image: Train::new(Color::Purple, Dir::Left),
            }
        );
        assert_eq!(
            plan[1],
            Deployment::Route {
                preimage: c,
                image: c.heading(Dir::Down)
            }
        );
    }

    #[test]
    fn deploy_at_once_records_merge_once() {
        let mut grid = rail_grid();
        let a = Train::new(Color::Red, Dir::Right);
        let b = Train::new(Color::Blue, Dir::Down);
        let mut state = TrainState::with_trains([a, b]);
        let mut renders = Vec::new();
        let config = RenderConfig::default();
        let mut cursor = grid.cursor(0, &mut renders, &config);

        let n = state.deploy_at_once(&mut cursor, |trains| {
            merge_coincident(trains.into_iter().map(|t| (t, t.heading(Dir::Right))).collect())
        });
        assert_eq!(n, 2);
        let moves = state.take_deployed();
        assert_eq!(moves.len(), 1);
        assert!(matches!(&moves[0], Move::Merge { preimage, image }
            if preimage.len() == 2 && image.color == Color::Purple));

        // The merged train reached the rail's pending queue exactly once.
        let rail = grid.tile_at(1).and_then(Tile::train_state).unwrap();
        assert_eq!(rail.pending().len(), 1);
    }
}
