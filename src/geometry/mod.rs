//! Geometric primitives for layout analysis.
//!
//! This module provides the rectangle type used for character boxes, exclusion
//! zones and noise bands, plus the conversions between PDF points and raster
//! pixels.
//!
//! # Coordinate convention
//!
//! Every [`Rect`] in this crate is expressed in PDF points with a **top-left**
//! origin (y grows downwards), which is the convention of pdfplumber-style
//! character dumps. Boxes produced in the bottom-left convention must be passed
//! through [`flip_vertical`] at the boundary, see [`CoordinateOrigin`].

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// A 2D point in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points `(x0, y0)` and `(x1, y1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Create a rectangle from an `[x0, y0, x1, y1]` slice.
    ///
    /// Anything other than exactly four finite numbers is a caller error and
    /// is reported as [`Error::InvalidBBox`] instead of being miscomputed.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let rect = Rect::from_slice(&[1.0, 2.0, 11.0, 22.0]).unwrap();
    /// assert_eq!(rect.right(), 11.0);
    /// assert!(Rect::from_slice(&[1.0, 2.0, 3.0]).is_err());
    /// ```
    pub fn from_slice(coords: &[f32]) -> Result<Self> {
        match coords {
            [x0, y0, x1, y1] if coords.iter().all(|v| v.is_finite()) => {
                Ok(Self::from_points(*x0, *y0, *x1, *y1))
            },
            _ => Err(Error::InvalidBBox {
                found: coords.to_vec(),
            }),
        }
    }

    /// The rectangle as `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.left(), self.top(), self.right(), self.bottom()]
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// let center = rect.center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// True when the rectangle has no area (zero or negative width/height).
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Strict intersection test.
    ///
    /// Two rectangles overlap only when their intersection has positive width
    /// **and** positive height. Rectangles that merely touch along an edge,
    /// and rectangles that have collapsed (for example after [`Rect::shrink`]
    /// past their own size), never overlap anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let touching = Rect::new(100.0, 0.0, 10.0, 10.0);
    ///
    /// assert!(r1.overlaps(&r2));
    /// assert!(!r1.overlaps(&touching));
    /// ```
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (w, h) = self.intersection_extent(other);
        w > 0.0 && h > 0.0
    }

    /// Area of the intersection with another rectangle (0 when disjoint).
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let (w, h) = self.intersection_extent(other);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    fn intersection_extent(&self, other: &Rect) -> (f32, f32) {
        let w = self.right().min(other.right()) - self.left().max(other.left());
        let h = self.bottom().min(other.bottom()) - self.top().max(other.top());
        (w, h)
    }

    /// Intersection over union, in `[0, 1]`.
    ///
    /// Returns 0 when the union area is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let r2 = Rect::new(5.0, 0.0, 10.0, 10.0);
    /// assert!((r1.iou(&r2) - 50.0 / 150.0).abs() < 1e-6);
    /// assert_eq!(r1.iou(&r1), 1.0);
    /// ```
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = self.intersection_area(other);
        let union = self.area().max(0.0) + other.area().max(0.0) - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }

    /// Check if this rectangle contains a point (edges inclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::{Rect, Point};
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// assert!(rect.contains_point(&Point::new(50.0, 50.0)));
    /// assert!(!rect.contains_point(&Point::new(150.0, 150.0)));
    /// ```
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Move every edge inward by `padding` points.
    ///
    /// A padding larger than half the width or height produces an inverted
    /// rectangle, which [`Rect::overlaps`] treats as empty.
    pub fn shrink(&self, padding: f32) -> Rect {
        Rect::from_points(
            self.left() + padding,
            self.top() + padding,
            self.right() - padding,
            self.bottom() - padding,
        )
    }

    /// Multiply every coordinate by `factor`.
    pub fn scale(&self, factor: f32) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use exam_chemtext::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union.x, 0.0);
    /// assert_eq!(union.right(), 75.0);
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Compute the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

// Rects travel through JSON as `[x0, y0, x1, y1]`, the shape every producer
// of element metadata already uses.
impl Serialize for Rect {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let coords = Vec::<f32>::deserialize(deserializer)?;
        Rect::from_slice(&coords).map_err(serde::de::Error::custom)
    }
}

/// Vertical origin convention of an externally supplied box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrigin {
    /// y grows downwards from the top edge (pdfplumber, raster images)
    #[default]
    TopLeft,
    /// y grows upwards from the bottom edge (raw PDF user space)
    BottomLeft,
}

impl CoordinateOrigin {
    /// Express `rect` (given in this convention) in the crate's top-left convention.
    pub fn to_top_left(self, rect: Rect, page_height: f32) -> Rect {
        match self {
            CoordinateOrigin::TopLeft => rect,
            CoordinateOrigin::BottomLeft => flip_vertical(rect, page_height),
        }
    }
}

/// Mirror a rectangle about the page's horizontal center line.
///
/// Converts between top-left and bottom-left origins; applying it twice
/// returns the original rectangle.
///
/// # Examples
///
/// ```
/// use exam_chemtext::geometry::{flip_vertical, Rect};
///
/// // 20pt from the bottom of an 800pt page is 780pt from the top.
/// let bottom_left = Rect::from_points(10.0, 20.0, 60.0, 40.0);
/// let top_left = flip_vertical(bottom_left, 800.0);
/// assert_eq!(top_left.top(), 760.0);
/// assert_eq!(top_left.bottom(), 780.0);
/// ```
pub fn flip_vertical(rect: Rect, page_height: f32) -> Rect {
    Rect::from_points(
        rect.left(),
        page_height - rect.bottom(),
        rect.right(),
        page_height - rect.top(),
    )
}

/// Convert a box from PDF points to raster pixels rendered at `dpi`.
///
/// Pure linear scaling by `dpi / 72`; the origin convention is unchanged.
pub fn pdf_to_pixel(rect: Rect, dpi: f32) -> Rect {
    rect.scale(dpi / POINTS_PER_INCH)
}

/// Convert a box from raster pixels rendered at `dpi` to PDF points.
///
/// The DPI must be the one the producing stage rasterized at; a mismatch
/// silently misplaces every zone.
///
/// # Examples
///
/// ```
/// use exam_chemtext::geometry::{pixel_to_pdf, Rect};
///
/// let px = Rect::from_points(300.0, 600.0, 900.0, 1200.0);
/// let pt = pixel_to_pdf(px, 300.0);
/// assert!((pt.left() - 72.0).abs() < 1e-4);
/// assert!((pt.bottom() - 288.0).abs() < 1e-4);
/// ```
pub fn pixel_to_pdf(rect: Rect, dpi: f32) -> Rect {
    rect.scale(POINTS_PER_INCH / dpi)
}

/// Compute the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use exam_chemtext::geometry::{Point, euclidean_distance};
///
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
///
/// assert_eq!(euclidean_distance(&p1, &p2), 5.0);
/// ```
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f32 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}
