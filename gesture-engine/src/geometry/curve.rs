//! Polyline helpers
//!
//! Origin translation, bounding boxes and arc-length accumulation over
//! ordered point sequences. Order is significant throughout: a sequence
//! encodes progression along a trace.

use super::point::{distance, subtract, Point};

/// Axis-aligned bounding box of a point sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Bounding box of `points`, or `None` when empty
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut bbox = BoundingBox { min: first, max: first };
        for p in &points[1..] {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Largest of width and height
    pub fn max_dim(&self) -> f64 {
        self.width().max(self.height())
    }
}

/// Translate every point so the first one lands on the origin
pub fn translate_to_origin(points: &[Point]) -> Vec<Point> {
    match points.first() {
        Some(&first) => points.iter().map(|&p| subtract(p, first)).collect(),
        None => Vec::new(),
    }
}

/// Partial sums of consecutive Euclidean distances.
///
/// The result has the same length as `points`, starts at 0 and is
/// non-decreasing.
pub fn cumulative_arc_length(points: &[Point]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(points.len());
    if points.is_empty() {
        return cumulative;
    }

    let mut total = 0.0;
    cumulative.push(total);
    for w in points.windows(2) {
        total += distance(w[0], w[1]);
        cumulative.push(total);
    }
    cumulative
}

/// Total path length of a polyline
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn test_bounding_box() {
        let bbox = BoundingBox::of(&pts(&[(1.0, 5.0), (-3.0, 2.0), (4.0, -1.0)])).unwrap();
        assert_eq!(bbox.min, Point::new(-3.0, -1.0));
        assert_eq!(bbox.max, Point::new(4.0, 5.0));
        assert_eq!(bbox.width(), 7.0);
        assert_eq!(bbox.height(), 6.0);
        assert_eq!(bbox.max_dim(), 7.0);
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(BoundingBox::of(&[]).is_none());
    }

    #[test]
    fn test_bounding_box_single_point_has_zero_extent() {
        let bbox = BoundingBox::of(&pts(&[(2.0, 2.0)])).unwrap();
        assert_eq!(bbox.max_dim(), 0.0);
    }

    #[test]
    fn test_translate_to_origin() {
        let translated = translate_to_origin(&pts(&[(10.0, 20.0), (13.0, 24.0), (10.0, 30.0)]));
        assert_eq!(translated[0], Point::ORIGIN);
        assert_eq!(translated[1], Point::new(3.0, 4.0));
        assert_eq!(translated[2], Point::new(0.0, 10.0));
    }

    #[test]
    fn test_translate_empty() {
        assert!(translate_to_origin(&[]).is_empty());
    }

    #[test]
    fn test_cumulative_arc_length() {
        let cumulative = cumulative_arc_length(&pts(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0), (3.0, 4.0)]));
        assert_eq!(cumulative, vec![0.0, 3.0, 7.0, 7.0]);
    }

    #[test]
    fn test_cumulative_arc_length_is_monotonic() {
        let points: Vec<Point> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.3;
                Point::new(t.cos() * 10.0, (2.0 * t).sin() * 5.0)
            })
            .collect();
        let cumulative = cumulative_arc_length(&points);
        assert_eq!(cumulative.len(), points.len());
        assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_path_length() {
        assert!((path_length(&pts(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)])) - 7.0).abs() < 1e-12);
        assert_eq!(path_length(&pts(&[(5.0, 5.0)])), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }
}
