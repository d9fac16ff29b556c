// Heading register for the move-string state machine

use crate::lexer::Move;
use knot_core::Point3;

/// Which coordinate a displacement lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Horizontal heading in the x/y plane.
///
/// Turning right walks `East -> South -> West -> North -> East`; turning
/// left walks the same cycle backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compass {
    /// +x
    #[default]
    East,
    /// -y
    South,
    /// -x
    West,
    /// +y
    North,
}

impl Compass {
    pub const fn turn_right(self) -> Self {
        match self {
            Compass::East => Compass::South,
            Compass::South => Compass::West,
            Compass::West => Compass::North,
            Compass::North => Compass::East,
        }
    }

    pub const fn turn_left(self) -> Self {
        match self {
            Compass::East => Compass::North,
            Compass::North => Compass::West,
            Compass::West => Compass::South,
            Compass::South => Compass::East,
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            Compass::East | Compass::West => Axis::X,
            Compass::South | Compass::North => Axis::Y,
        }
    }

    pub const fn sign(self) -> f64 {
        match self {
            Compass::East | Compass::North => 1.0,
            Compass::South | Compass::West => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Up,
    Down,
}

impl Vertical {
    pub const fn sign(self) -> f64 {
        match self {
            Vertical::Up => 1.0,
            Vertical::Down => -1.0,
        }
    }
}

/// Current movement direction.
///
/// While `vertical` is set, moves go along z and the compass heading is
/// paused; the next turn resumes from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Heading {
    compass: Compass,
    vertical: Option<Vertical>,
}

impl Heading {
    pub const fn new() -> Self {
        Self {
            compass: Compass::East,
            vertical: None,
        }
    }

    pub const fn compass(&self) -> Compass {
        self.compass
    }

    pub const fn vertical(&self) -> Option<Vertical> {
        self.vertical
    }

    pub const fn axis(&self) -> Axis {
        match self.vertical {
            Some(_) => Axis::Z,
            None => self.compass.axis(),
        }
    }

    pub const fn sign(&self) -> f64 {
        match self.vertical {
            Some(v) => v.sign(),
            None => self.compass.sign(),
        }
    }

    /// Heading after executing `mv`
    pub const fn apply(self, mv: Move) -> Self {
        match mv {
            Move::Right => Self {
                compass: self.compass.turn_right(),
                vertical: None,
            },
            Move::Left => Self {
                compass: self.compass.turn_left(),
                vertical: None,
            },
            Move::Up => Self {
                compass: self.compass,
                vertical: Some(Vertical::Up),
            },
            Move::Down => Self {
                compass: self.compass,
                vertical: Some(Vertical::Down),
            },
        }
    }

    /// Displacement of `magnitude` units along the active direction
    pub fn step(&self, magnitude: f64) -> Point3 {
        let d = self.sign() * magnitude;
        match self.axis() {
            Axis::X => Point3::new(d, 0.0, 0.0),
            Axis::Y => Point3::new(0.0, d, 0.0),
            Axis::Z => Point3::new(0.0, 0.0, d),
        }
    }
}
