#![forbid(unsafe_code)]

//! Integer geometry primitives: points, rectangles and directed segments.
//!
//! Everything in this module is a plain value type with deterministic,
//! side-effect-free operations. Cross products widen to 64-bit before any
//! subtraction so coordinates anywhere in the `i32` range cannot overflow.

use serde::{Deserialize, Serialize};

/// An immutable integer coordinate pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`; zero iff the points coincide.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle: top-left corner plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// The rectangle grown outward by `margin` on every side.
    pub fn expanded(&self, margin: i32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// Corner points in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }

    /// True when `p` lies inside the rectangle or on its boundary.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `p` lies inside the rectangle, boundary excluded.
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// Closed intersection between the rectangle and a segment: true when the
    /// segment touches or crosses the boundary or runs through the interior.
    pub fn intersects_segment(&self, seg: &Segment) -> bool {
        if self.contains(seg.start) || self.contains(seg.end) {
            return true;
        }
        self.edges().iter().any(|e| e.intersects(seg))
    }

    fn edges(&self) -> [Segment; 4] {
        let [tl, tr, br, bl] = self.corners();
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }
}

/// A directed line between two distinct points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    /// Creates a segment between two distinct points.
    pub fn new(start: Point, end: Point) -> Self {
        debug_assert!(start != end, "degenerate segment at {start:?}");
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// A number carrying the sign of the slope: the vertical delta, negated
    /// when the segment points leftward. Not the slope itself; parallel
    /// segments of equal extent rank together, which is all the search's
    /// ordering needs.
    pub fn slope_sign(&self) -> i64 {
        let dx = i64::from(self.end.x) - i64::from(self.start.x);
        let dy = i64::from(self.end.y) - i64::from(self.start.y);
        if dx >= 0 { dy } else { -dy }
    }

    /// Cross product of the two segments' direction vectors relative to this
    /// segment's end point. The sign distinguishes left from right turns;
    /// zero means collinear.
    pub fn cross_product(&self, other: &Segment) -> i64 {
        let dx = i64::from(self.start.x) - i64::from(self.end.x);
        let dy = i64::from(self.start.y) - i64::from(self.end.y);
        let ox = i64::from(other.end.x) - i64::from(self.end.x);
        let oy = i64::from(other.end.y) - i64::from(self.end.y);
        dx * oy - dy * ox
    }

    /// Turn-ranking key for the angle between this segment and `other`:
    /// `1 + cos` when the sine term is negative, `-(1 + cos)` otherwise
    /// (cosine value, not the arc). A straight continuation yields a value
    /// near zero, a full reversal near ±2, so magnitude orders candidate
    /// turns by sharpness without an arccosine; the sign separates the two
    /// turn directions.
    pub fn cosine(&self, other: &Segment) -> f64 {
        let dx = f64::from(self.start.x) - f64::from(self.end.x);
        let dy = f64::from(self.start.y) - f64::from(self.end.y);
        let ox = f64::from(other.end.x) - f64::from(other.start.x);
        let oy = f64::from(other.end.y) - f64::from(other.start.y);
        let cos = (dx * ox + dy * oy) / (self.length() * other.length());
        let sin = dx * oy - dy * ox;
        if sin < 0.0 { 1.0 + cos } else { -(1.0 + cos) }
    }

    /// Closed segment intersection: true iff the segments cross or touch.
    ///
    /// Implemented as the straddle test: two cross-product sign comparisons
    /// per segment, no division, exact for integer inputs. When all four
    /// orientations are zero the segments are collinear and the extents
    /// decide.
    pub fn intersects(&self, other: &Segment) -> bool {
        let cross = |ax: i64, ay: i64, bx: i64, by: i64| (ax * by - ay * bx).signum();

        let su_x = i64::from(self.start.x) - i64::from(other.start.x);
        let su_y = i64::from(self.start.y) - i64::from(other.start.y);
        let sv_x = i64::from(self.end.x) - i64::from(other.start.x);
        let sv_y = i64::from(self.end.y) - i64::from(other.start.y);
        let st_x = i64::from(other.start.x) - i64::from(other.end.x);
        let st_y = i64::from(other.start.y) - i64::from(other.end.y);

        let d1 = cross(sv_x, sv_y, st_x, st_y);
        let d2 = cross(st_x, st_y, su_x, su_y);
        if d1 * d2 < 0 {
            return false;
        }

        let uv_x = i64::from(self.end.x) - i64::from(self.start.x);
        let uv_y = i64::from(self.end.y) - i64::from(self.start.y);
        let tu_x = i64::from(self.start.x) - i64::from(other.end.x);
        let tu_y = i64::from(self.start.y) - i64::from(other.end.y);

        let d3 = cross(-su_x, -su_y, uv_x, uv_y);
        let d4 = cross(uv_x, uv_y, tu_x, tu_y);
        if d3 * d4 > 0 {
            return false;
        }

        if d1 == 0 && d2 == 0 {
            // Collinear: the segments touch iff their extents overlap.
            return self.extents_overlap(other);
        }
        true
    }

    fn extents_overlap(&self, other: &Segment) -> bool {
        let (ax0, ax1) = min_max(self.start.x, self.end.x);
        let (bx0, bx1) = min_max(other.start.x, other.end.x);
        let (ay0, ay1) = min_max(self.start.y, self.end.y);
        let (by0, by1) = min_max(other.start.y, other.end.y);
        ax0 <= bx1 && bx0 <= ax1 && ay0 <= by1 && by0 <= ay1
    }
}

fn min_max(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}
