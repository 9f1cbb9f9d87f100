//! Point types and geometric helpers

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Euclidean distance between two points, evaluated in double precision.
pub fn distance_between(a: &Point3f, b: &Point3f) -> f64 {
    nalgebra::distance(&a.cast::<f64>(), &b.cast::<f64>())
}

/// Point halfway between `a` and `b`.
pub fn midpoint(a: &Point3f, b: &Point3f) -> Point3f {
    nalgebra::center(a, b)
}

/// Unnormalized normal of the triangle `(a, b, c)` in double precision.
pub fn triangle_normal(a: &Point3f, b: &Point3f, c: &Point3f) -> Vector3d {
    let a = a.cast::<f64>();
    let e1 = b.cast::<f64>() - a;
    let e2 = c.cast::<f64>() - a;
    e1.cross(&e2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_between() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(3.0, 4.0, 0.0);
        assert_relative_eq!(distance_between(&a, &b), 5.0, epsilon = 1e-9);
        assert_relative_eq!(distance_between(&b, &a), 5.0, epsilon = 1e-9);
        assert_eq!(distance_between(&a, &a), 0.0);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(&Point3f::new(0.0, 2.0, 0.0), &Point3f::new(2.0, 0.0, 4.0));
        assert_eq!(m, Point3f::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn test_triangle_normal_winding() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        let c = Point3f::new(0.0, 1.0, 0.0);
        assert!(triangle_normal(&a, &b, &c).z > 0.0);
        assert!(triangle_normal(&a, &c, &b).z < 0.0);
    }
}
