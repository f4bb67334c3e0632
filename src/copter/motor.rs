use core::ops::{Index, IndexMut};
use nalgebra::Vector3;

use crate::esc::Esc;

/// Rotor position in the X layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    FrontLeft = 0,
    FrontRight = 1,
    BackLeft = 2,
    BackRight = 3,
}

/// Propeller rotation seen from above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spin {
    Clockwise,
    CounterClockwise,
}

impl Position {
    /// Every position in command order.
    pub const ALL: [Position; 4] = [
        Position::FrontLeft,
        Position::FrontRight,
        Position::BackLeft,
        Position::BackRight,
    ];

    /// Diagonal rotors share a rotation.
    pub fn spin(self) -> Spin {
        match self {
            Position::FrontLeft | Position::BackRight => Spin::Clockwise,
            Position::FrontRight | Position::BackLeft => Spin::CounterClockwise,
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Position::FrontLeft | Position::FrontRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Position::FrontLeft | Position::BackLeft)
    }

    /// Throttle factor for a (forward, right, clockwise) demand.
    ///
    /// Moving forward lowers the nose, moving right lowers the right side
    /// and turning clockwise speeds up the clockwise pair.
    pub fn factor(self) -> Vector3<f32> {
        let sign = |positive: bool| -> f32 { if positive { 1. } else { -1. } };

        Vector3::new(
            sign(!self.is_front()),
            sign(self.is_left()),
            sign(self.spin() == Spin::Clockwise),
        )
    }
}

/// The four ESCs of a quad, indexed by [`Position`].
pub struct Motors<C> {
    escs: [Esc<C>; 4],
}

impl<C> Motors<C> {
    pub fn new(
        front_left: Esc<C>,
        front_right: Esc<C>,
        back_left: Esc<C>,
        back_right: Esc<C>,
    ) -> Self {
        Self {
            escs: [front_left, front_right, back_left, back_right],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Esc<C>)> {
        Position::ALL.into_iter().zip(self.escs.iter())
    }
}

impl<C> Index<Position> for Motors<C> {
    type Output = Esc<C>;

    fn index(&self, position: Position) -> &Esc<C> {
        &self.escs[position as usize]
    }
}

impl<C> IndexMut<Position> for Motors<C> {
    fn index_mut(&mut self, position: Position) -> &mut Esc<C> {
        &mut self.escs[position as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, Spin};
    use nalgebra::Vector3;

    #[test]
    fn factors_cancel_on_every_axis() {
        let sum = Position::ALL
            .iter()
            .fold(Vector3::zeros(), |sum, position| sum + position.factor());
        assert_eq!(sum, Vector3::zeros());
    }

    #[test]
    fn diagonal_pairs_share_spin() {
        assert_eq!(Position::FrontLeft.spin(), Position::BackRight.spin());
        assert_eq!(Position::FrontRight.spin(), Position::BackLeft.spin());
        assert_ne!(Position::FrontLeft.spin(), Spin::CounterClockwise);
    }

    #[test]
    fn layout() {
        assert_eq!(Position::FrontLeft.factor(), Vector3::new(-1., 1., 1.));
        assert_eq!(Position::FrontRight.factor(), Vector3::new(-1., -1., -1.));
        assert_eq!(Position::BackLeft.factor(), Vector3::new(1., 1., -1.));
        assert_eq!(Position::BackRight.factor(), Vector3::new(1., -1., 1.));
    }
}
