//! R-tree nodes for locating stops on a shape.
//!
//! Nodes are keyed on `[longitude, latitude]`. Matching is exact: a node only
//! contains a query point with identical coordinates.

use rstar::{PointDistance, RTreeObject, AABB};

#[derive(Clone, Debug)]
pub struct ShapePointNode {
    /// Position of the point in its shape's sequence
    pub index: usize,
    point: [f64; 2],
}

impl ShapePointNode {
    pub fn new(index: usize, longitude: f64, latitude: f64) -> Self {
        Self {
            index,
            point: [longitude, latitude],
        }
    }
}

impl RTreeObject for ShapePointNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for ShapePointNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.point == *point
    }
}
