//! Curve Matching
//!
//! Scores a captured point sequence against one [`GestureTemplate`]. Every
//! mode first pins the capture to the origin and rescales it to the
//! template's size, so the resulting score does not depend on where or how
//! large the gesture was drawn. Lower is better; an exact match scores 0.

use super::template::GestureTemplate;
use crate::geometry::{
    cumulative_arc_length, distance_sq, scale, translate_to_origin, BoundingBox, Point,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How captured samples are put into correspondence with template samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    /// Scale by arc-length ratio, pair samples by proportional index.
    /// Score is total squared error over the captured gesture's own length,
    /// so non-zero scores shrink as the drawn gesture grows.
    IndexProportional,
    /// Scale by bounding-box ratio, pair samples by proportional index.
    /// Score is total squared error over the scale factor, so non-zero
    /// scores grow with the drawn gesture's size and a threshold tuned at
    /// one size does not transfer to another.
    BoundingBoxNormalized,
    /// Scale by arc-length ratio, pair each sample with the template point
    /// at the same fraction of total arc length.
    /// Score is the mean per-sample Euclidean distance.
    #[default]
    ArcLengthResampled,
}

impl ScoringMode {
    pub const ALL: [ScoringMode; 3] = [
        ScoringMode::IndexProportional,
        ScoringMode::BoundingBoxNormalized,
        ScoringMode::ArcLengthResampled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::IndexProportional => "index-proportional",
            ScoringMode::BoundingBoxNormalized => "bounding-box-normalized",
            ScoringMode::ArcLengthResampled => "arc-length-resampled",
        }
    }
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScoringMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScoringMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown scoring mode '{}'", s)))
    }
}

/// Result of scoring one gesture against one template
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    /// Dissimilarity used for ranking (lower is better)
    pub score: f64,
    /// Sum of per-sample Euclidean distances
    pub total_distance: f64,
    /// Sum of per-sample squared distances
    pub total_squared_error: f64,
    /// Smallest per-sample distance
    pub min_distance: f64,
    /// Largest per-sample distance
    pub max_distance: f64,
    /// Number of samples compared
    pub samples: usize,
    /// Factor applied to the captured gesture before comparison
    pub scale_factor: f64,
}

/// Running per-sample statistics
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    total_distance: f64,
    total_squared_error: f64,
    min_distance: f64,
    max_distance: f64,
    samples: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            total_distance: 0.0,
            total_squared_error: 0.0,
            min_distance: f64::INFINITY,
            max_distance: 0.0,
            samples: 0,
        }
    }

    fn add(&mut self, expected: Point, actual: Point) {
        let sq = distance_sq(expected, actual);
        let d = sq.sqrt();
        self.total_squared_error += sq;
        self.total_distance += d;
        self.min_distance = self.min_distance.min(d);
        self.max_distance = self.max_distance.max(d);
        self.samples += 1;
    }

    fn finish(self, score: f64, scale_factor: f64) -> MatchScore {
        MatchScore {
            score,
            total_distance: self.total_distance,
            total_squared_error: self.total_squared_error,
            min_distance: if self.samples == 0 { 0.0 } else { self.min_distance },
            max_distance: self.max_distance,
            samples: self.samples,
            scale_factor,
        }
    }
}

/// Scores captured gestures against templates with a fixed [`ScoringMode`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveMatcher {
    pub mode: ScoringMode,
}

impl CurveMatcher {
    pub fn new(mode: ScoringMode) -> Self {
        Self { mode }
    }

    /// Score `gesture` against `template`.
    ///
    /// Fails with [`Error::InsufficientData`] for fewer than two points and
    /// with [`Error::DegenerateGeometry`] when the gesture has no length (or
    /// no bounding-box extent in bounding-box mode).
    pub fn score(&self, template: &GestureTemplate, gesture: &[Point]) -> Result<MatchScore> {
        if gesture.len() < 2 {
            return Err(Error::InsufficientData {
                required: 2,
                actual: gesture.len(),
            });
        }
        if gesture.iter().any(|p| !p.is_finite()) {
            return Err(Error::DegenerateGeometry(
                "gesture contains a non-finite point".to_string(),
            ));
        }

        let normalized = translate_to_origin(gesture);
        match self.mode {
            ScoringMode::IndexProportional => score_index_proportional(template, &normalized),
            ScoringMode::BoundingBoxNormalized => score_bounding_box(template, &normalized),
            ScoringMode::ArcLengthResampled => score_arc_length(template, &normalized),
        }
    }
}

/// Template sample paired with gesture sample `i` of `gesture_count`
fn proportional_index(i: usize, gesture_count: usize, template_count: usize) -> usize {
    let position = i as f64 * (template_count - 1) as f64 / (gesture_count - 1) as f64;
    (position.round() as usize).min(template_count - 1)
}

/// Sum index-paired errors, skipping the shared origin at index 0
fn accumulate_by_index(template: &GestureTemplate, scaled: &[Point]) -> Accumulator {
    let reference = template.scaled_points();
    let mut acc = Accumulator::new();
    for (i, &p) in scaled.iter().enumerate().skip(1) {
        let j = proportional_index(i, scaled.len(), reference.len());
        acc.add(reference[j], p);
    }
    acc
}

fn gesture_length(normalized: &[Point]) -> Result<f64> {
    let length = cumulative_arc_length(normalized).last().copied().unwrap_or(0.0);
    if length <= 0.0 {
        return Err(Error::DegenerateGeometry(
            "gesture has zero arc length".to_string(),
        ));
    }
    Ok(length)
}

fn score_index_proportional(template: &GestureTemplate, normalized: &[Point]) -> Result<MatchScore> {
    let length = gesture_length(normalized)?;
    let factor = template.total_length() / length;
    let scaled: Vec<Point> = normalized.iter().map(|&p| scale(p, factor)).collect();

    let acc = accumulate_by_index(template, &scaled);
    // Divisor is the capture's own length before rescaling
    let score = acc.total_squared_error / length;
    Ok(acc.finish(score, factor))
}

fn score_bounding_box(template: &GestureTemplate, normalized: &[Point]) -> Result<MatchScore> {
    let extent = BoundingBox::of(normalized).map(|b| b.max_dim()).unwrap_or(0.0);
    if extent <= 0.0 {
        return Err(Error::DegenerateGeometry(
            "gesture has a zero-extent bounding box".to_string(),
        ));
    }
    let factor = template.bounding_box_max_dim() / extent;
    let scaled: Vec<Point> = normalized.iter().map(|&p| scale(p, factor)).collect();

    let acc = accumulate_by_index(template, &scaled);
    let score = acc.total_squared_error / factor;
    Ok(acc.finish(score, factor))
}

fn score_arc_length(template: &GestureTemplate, normalized: &[Point]) -> Result<MatchScore> {
    let cumulative = cumulative_arc_length(normalized);
    let length = cumulative.last().copied().unwrap_or(0.0);
    if length <= 0.0 {
        return Err(Error::DegenerateGeometry(
            "gesture has zero arc length".to_string(),
        ));
    }
    let template_length = template.total_length();
    let factor = template_length / length;

    let mut acc = Accumulator::new();
    for (&p, &along) in normalized.iter().zip(&cumulative) {
        let target = (along / length * template_length).clamp(0.0, template_length);
        let expected = template.linearize(target)?;
        acc.add(expected, scale(p, factor));
    }

    let score = acc.total_distance / acc.samples as f64;
    Ok(acc.finish(score, factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> GestureTemplate {
        let points: Vec<Point> = (0..n).map(|x| Point::new(x as f64, 0.0)).collect();
        GestureTemplate::new("line", &points).unwrap()
    }

    fn circle(n: usize) -> GestureTemplate {
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64 * std::f64::consts::TAU;
                Point::new(10.0 * t.cos(), 10.0 * t.sin())
            })
            .collect();
        GestureTemplate::new("circle", &points).unwrap()
    }

    fn transformed(points: &[Point], factor: f64, offset: Point) -> Vec<Point> {
        points
            .iter()
            .map(|p| Point::new(p.x * factor + offset.x, p.y * factor + offset.y))
            .collect()
    }

    #[test]
    fn test_self_match_is_zero_in_every_mode() {
        for template in [line(20), circle(60)] {
            for mode in ScoringMode::ALL {
                let score = CurveMatcher::new(mode)
                    .score(&template, template.scaled_points())
                    .unwrap();
                assert!(score.score.abs() < 1e-6, "{} {}: {}", template.name(), mode, score.score);
            }
        }
    }

    #[test]
    fn test_scaled_and_shifted_copy_scores_like_self_match() {
        let template = circle(80);
        for factor in [0.5, 3.0] {
            let copy = transformed(template.scaled_points(), factor, Point::new(300.0, -40.0));
            for mode in ScoringMode::ALL {
                let score = CurveMatcher::new(mode).score(&template, &copy).unwrap();
                assert!(score.score.abs() < 1e-6, "x{} {}: {}", factor, mode, score.score);
            }
        }
    }

    #[test]
    fn test_wrong_direction_scores_worse() {
        let template = line(50);
        let backwards: Vec<Point> = (0..30).map(|x| Point::new(-(x as f64), 0.0)).collect();
        let forwards: Vec<Point> = (0..30).map(|x| Point::new(x as f64 * 2.0, 0.5)).collect();
        for mode in ScoringMode::ALL {
            let matcher = CurveMatcher::new(mode);
            let bad = matcher.score(&template, &backwards).unwrap();
            let good = matcher.score(&template, &forwards).unwrap();
            assert!(good.score < bad.score, "{}", mode);
        }
    }

    #[test]
    fn test_index_proportional_hand_computed() {
        // Template: straight line to (1024, 0) in two halves
        let template = GestureTemplate::new(
            "l",
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
        )
        .unwrap();
        // Gesture bends: length 2, rescaled by 512
        let gesture = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let score = CurveMatcher::new(ScoringMode::IndexProportional)
            .score(&template, &gesture)
            .unwrap();
        // Sample 1 matches exactly; sample 2 is (512, 512) vs (1024, 0)
        let expected_sq = 512.0_f64 * 512.0 * 2.0;
        assert!((score.scale_factor - 512.0).abs() < 1e-9);
        assert!((score.total_squared_error - expected_sq).abs() < 1e-6);
        // Normalized by the unscaled gesture length of 2
        assert!((score.score - expected_sq / 2.0).abs() < 1e-9);
        assert_eq!(score.samples, 2);
        assert!(score.min_distance.abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_hand_computed() {
        let template = GestureTemplate::new(
            "l",
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
        )
        .unwrap();
        let gesture = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let score = CurveMatcher::new(ScoringMode::BoundingBoxNormalized)
            .score(&template, &gesture)
            .unwrap();
        // Gesture box is 1 x 1 -> factor 1024; sample 2 is (1024, 1024) vs (1024, 0)
        assert!((score.scale_factor - 1024.0).abs() < 1e-9);
        // Sample 1: (1024, 0) vs (512, 0)
        let expected_sq = 512.0_f64 * 512.0 + 1024.0 * 1024.0;
        assert!((score.total_squared_error - expected_sq).abs() < 1e-6);
        assert!((score.score - expected_sq / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_modes_scale_with_drawn_size() {
        let template = GestureTemplate::new(
            "l",
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)],
        )
        .unwrap();
        let small = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let large = transformed(&small, 10.0, Point::new(0.0, 0.0));

        // Rescaled samples are identical, only the divisor moves with size
        let index = CurveMatcher::new(ScoringMode::IndexProportional);
        let (a, b) = (index.score(&template, &small).unwrap(), index.score(&template, &large).unwrap());
        assert!((a.total_squared_error - b.total_squared_error).abs() < 1e-6);
        assert!((a.score - b.score * 10.0).abs() < 1e-6);

        let bbox = CurveMatcher::new(ScoringMode::BoundingBoxNormalized);
        let (a, b) = (bbox.score(&template, &small).unwrap(), bbox.score(&template, &large).unwrap());
        assert!((a.total_squared_error - b.total_squared_error).abs() < 1e-6);
        assert!((a.score * 10.0 - b.score).abs() < 1e-6);
    }

    #[test]
    fn test_arc_length_corrects_uneven_sampling() {
        let template = line(11);
        // Same line, sampled densely at the start and sparsely at the end
        let uneven: Vec<Point> = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 10.0]
            .iter()
            .map(|&x| Point::new(x, 0.0))
            .collect();
        let arc = CurveMatcher::new(ScoringMode::ArcLengthResampled)
            .score(&template, &uneven)
            .unwrap();
        let index = CurveMatcher::new(ScoringMode::IndexProportional)
            .score(&template, &uneven)
            .unwrap();
        assert!(arc.score.abs() < 1e-9);
        assert!(index.score > 1.0);
    }

    #[test]
    fn test_arc_length_summary_statistics() {
        let template = GestureTemplate::new(
            "l",
            &[Point::new(0.0, 0.0), Point::new(2.0, 0.0)],
        )
        .unwrap();
        // Gesture ends with a perpendicular hook
        let gesture = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let score = CurveMatcher::new(ScoringMode::ArcLengthResampled)
            .score(&template, &gesture)
            .unwrap();
        // factor 512: samples (0,0)->(0,0), (512,0)->(512,0), (512,512) vs (1024,0)
        let hook = (512.0_f64 * 512.0 * 2.0).sqrt();
        assert_eq!(score.samples, 3);
        assert!(score.min_distance.abs() < 1e-9);
        assert!((score.max_distance - hook).abs() < 1e-6);
        assert!((score.total_distance - hook).abs() < 1e-6);
        assert!((score.total_squared_error - hook * hook).abs() < 1e-3);
        assert!((score.score - hook / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_gesture() {
        let template = line(10);
        let dot = vec![Point::new(5.0, 5.0); 8];
        for mode in ScoringMode::ALL {
            let result = CurveMatcher::new(mode).score(&template, &dot);
            assert!(matches!(result, Err(Error::DegenerateGeometry(_))), "{}", mode);
        }
    }

    #[test]
    fn test_too_short_gesture() {
        let template = line(10);
        let result = CurveMatcher::default().score(&template, &[Point::new(1.0, 1.0)]);
        assert!(matches!(result, Err(Error::InsufficientData { actual: 1, .. })));
    }

    #[test]
    fn test_proportional_index_rounds() {
        assert_eq!(proportional_index(0, 5, 100), 0);
        assert_eq!(proportional_index(4, 5, 100), 99);
        // 1 * 99 / 4 = 24.75
        assert_eq!(proportional_index(1, 5, 100), 25);
        assert_eq!(proportional_index(2, 3, 2), 1);
    }

    #[test]
    fn test_scoring_mode_parse_and_display() {
        for mode in ScoringMode::ALL {
            assert_eq!(mode.as_str().parse::<ScoringMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), mode.as_str());
        }
        assert!("fastest".parse::<ScoringMode>().is_err());
        assert_eq!(ScoringMode::default(), ScoringMode::ArcLengthResampled);
    }
}
