//! Static course table: par and stroke index for each of the 18 holes.

use thiserror::Error;

/// Number of holes on a full course.
pub const HOLE_COUNT: u8 = 18;
/// Par used when a hole number is not part of the course.
pub const DEFAULT_PAR: u32 = 4;
/// Stroke index used when a hole number is not part of the course.
pub const DEFAULT_INDEX: u8 = 9;

/// A single hole of the course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hole {
    /// Hole number, 1..=18.
    pub number: u8,
    /// Par of the hole.
    pub par: u32,
    /// Stroke index: 1 is the hardest hole, 18 the easiest.
    pub index: u8,
    /// Optional nickname shown by the frontends.
    pub name: Option<String>,
}

impl Hole {
    fn new(number: u8, par: u32, index: u8) -> Self {
        Self {
            number,
            par,
            index,
            name: None,
        }
    }
}

/// Par and stroke index applied to a hole number, whether or not the course knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleRating {
    /// Par of the hole.
    pub par: u32,
    /// Stroke index of the hole.
    pub index: u8,
}

impl HoleRating {
    /// Rating applied to holes missing from the course table.
    pub const DEFAULT: HoleRating = HoleRating {
        par: DEFAULT_PAR,
        index: DEFAULT_INDEX,
    };
}

/// Reasons a course table is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CourseError {
    #[error("course must have exactly 18 holes, got {0}")]
    WrongHoleCount(usize),
    #[error("hole numbers must run from 1 to 18 in order (found {found} at position {position})")]
    HoleNumbering { position: usize, found: u8 },
    #[error("stroke indexes must be a permutation of 1..=18 (offending index {0})")]
    IndexPermutation(u8),
    #[error("hole {0} has a par of zero")]
    ZeroPar(u8),
}

/// Validated 18-hole course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    holes: Vec<Hole>,
}

impl Course {
    /// Build a course after checking numbering and the stroke-index permutation.
    pub fn new(mut holes: Vec<Hole>) -> Result<Self, CourseError> {
        if holes.len() != usize::from(HOLE_COUNT) {
            return Err(CourseError::WrongHoleCount(holes.len()));
        }
        holes.sort_by_key(|hole| hole.number);

        let mut seen = [false; HOLE_COUNT as usize];
        for (position, hole) in holes.iter().enumerate() {
            if usize::from(hole.number) != position + 1 {
                return Err(CourseError::HoleNumbering {
                    position,
                    found: hole.number,
                });
            }
            if hole.par == 0 {
                return Err(CourseError::ZeroPar(hole.number));
            }
            let slot = usize::from(hole.index)
                .checked_sub(1)
                .and_then(|slot| seen.get_mut(slot))
                .ok_or(CourseError::IndexPermutation(hole.index))?;
            if *slot {
                return Err(CourseError::IndexPermutation(hole.index));
            }
            *slot = true;
        }

        Ok(Self { holes })
    }

    /// All holes ordered by number.
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Look a hole up by its number.
    pub fn hole(&self, number: u8) -> Option<&Hole> {
        self.holes.iter().find(|hole| hole.number == number)
    }

    /// Par and index for `number`, falling back to [`HoleRating::DEFAULT`] for unknown holes.
    pub fn rating_for(&self, number: u8) -> HoleRating {
        self.hole(number)
            .map(|hole| HoleRating {
                par: hole.par,
                index: hole.index,
            })
            .unwrap_or(HoleRating::DEFAULT)
    }

    pub fn total_par(&self) -> u32 {
        self.holes.iter().map(|hole| hole.par).sum()
    }

    /// Par of holes 1 to 9.
    pub fn front_nine_par(&self) -> u32 {
        self.holes.iter().take(9).map(|hole| hole.par).sum()
    }

    /// Par of holes 10 to 18.
    pub fn back_nine_par(&self) -> u32 {
        self.holes.iter().skip(9).map(|hole| hole.par).sum()
    }
}

impl Default for Course {
    fn default() -> Self {
        let table: [(u32, u8); HOLE_COUNT as usize] = [
            (4, 18),
            (4, 8),
            (4, 12),
            (5, 3),
            (3, 14),
            (4, 5),
            (4, 11),
            (5, 1),
            (3, 15),
            (4, 10),
            (3, 17),
            (5, 4),
            (4, 9),
            (3, 16),
            (5, 2),
            (4, 7),
            (4, 13),
            (4, 6),
        ];
        let holes = table
            .iter()
            .zip(1u8..)
            .map(|(&(par, index), number)| Hole::new(number, par, index))
            .collect();
        Self { holes }
    }
}
