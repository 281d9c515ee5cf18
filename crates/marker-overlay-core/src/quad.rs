use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Corner role inside a quadrilateral, clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadCorner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl QuadCorner {
    pub const ALL: [QuadCorner; 4] = [
        QuadCorner::TopLeft,
        QuadCorner::TopRight,
        QuadCorner::BottomRight,
        QuadCorner::BottomLeft,
    ];

    /// Position of this corner in TL, TR, BR, BL order.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            QuadCorner::TopLeft => 0,
            QuadCorner::TopRight => 1,
            QuadCorner::BottomRight => 2,
            QuadCorner::BottomLeft => 3,
        }
    }
}

/// Four image-space points in TL, TR, BR, BL order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    pub fn new(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    /// The corners of a `width × height` image: `(0,0), (w,0), (w,h), (0,h)`.
    pub fn from_size(width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self::new([
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ])
    }

    /// Axis-aligned rectangle with top-left `(x, y)`.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new([
            Point2::new(x, y),
            Point2::new(x + width, y),
            Point2::new(x + width, y + height),
            Point2::new(x, y + height),
        ])
    }

    #[inline]
    pub fn corner(&self, role: QuadCorner) -> Point2<f32> {
        self.corners[role.index()]
    }

    /// Vertices cast to integer pixels (truncation toward zero).
    pub fn pixel_vertices(&self) -> [Point2<i32>; 4] {
        self.corners.map(|p| Point2::new(p.x as i32, p.y as i32))
    }
}
