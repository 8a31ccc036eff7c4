use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// 2D vector with `f64` components, used for positions, velocities and
/// steering forces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Rescale to the given magnitude, preserving direction.
    ///
    /// A zero vector has no direction and is returned unchanged.
    pub fn scaled_to(self, magnitude: f64) -> Self {
        let length = self.length();
        if length == 0.0 {
            return self;
        }
        self * (magnitude / length)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::Vec2;

    #[test]
    fn length_of_pythagorean_triple() {
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn scaled_to_preserves_direction() {
        let v = Vec2::new(3.0, 4.0).scaled_to(10.0);
        assert!((v.x - 6.0).abs() < 1e-12);
        assert!((v.y - 8.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_to_leaves_zero_vector_unchanged() {
        assert_eq!(Vec2::ZERO.scaled_to(5.0), Vec2::ZERO);
    }
}
