use std::ops::{Add, Index, Sub};

use nalgebra::{
    ClosedAddAssign, ClosedDivAssign, ClosedMulAssign, ClosedSubAssign, Point3, Scalar, Vector3,
};
use num_traits::{One, Zero};

/// Three vertices of anything, in winding order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.0.iter()
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> Triangle<Point3<T>>
where
    T: Scalar + ClosedAddAssign + ClosedSubAssign + ClosedMulAssign,
{
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [Vector3<T>; 2] {
        [&self.0[1] - &self.0[0], &self.0[2] - &self.0[0]]
    }

    /// Returns `e2 x e1`, not normalized.
    /// For a scene wound consistently this points towards the viewer of a clockwise
    /// (as seen by that viewer) triangle, i.e. to the inside of the box test scene.
    pub fn normal(&self) -> Vector3<T> {
        let [e1, e2] = self.edges();
        e2.cross(&e1)
    }
}

impl<T> Triangle<Point3<T>>
where
    T: Scalar + ClosedAddAssign + ClosedDivAssign + Zero + From<u8>,
{
    pub fn centroid(&self) -> Point3<T> {
        Point3::from(self.0.iter().map(|p| &p.coords).sum::<Vector3<T>>() / T::from(3u8))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates<T> {
    pub u: T,
    pub v: T,
}

impl<T> BarycentricCoordinates<T>
where
    T: PartialOrd + Zero + One + Copy + Add<Output = T> + Sub<Output = T>,
{
    /// Edge inclusive containment test.
    pub fn is_inside(&self) -> bool {
        self.u >= T::zero() && self.v >= T::zero() && self.u + self.v <= T::one()
    }
}
