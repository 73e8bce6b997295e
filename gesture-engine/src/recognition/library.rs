//! Built-in Template Library
//!
//! Simple parametrized curves registered at start-up. Coordinates follow the
//! camera frame: x grows to the right and y grows downward, so "up" is -y.

use super::classifier::TemplateRegistry;
use crate::geometry::Point;
use crate::Result;
use std::f64::consts::TAU;

/// Samples per built-in template
pub const TEMPLATE_SAMPLES: usize = 100;

pub const SWIPE_LEFT: &str = "swipe-left";
pub const SWIPE_RIGHT: &str = "swipe-right";
pub const SWIPE_UP: &str = "swipe-up";
pub const SWIPE_DOWN: &str = "swipe-down";
pub const CIRCLE_CCW: &str = "circle-ccw";
pub const CIRCLE_CW: &str = "circle-cw";

/// Straight line of `samples` unit steps along `(dx, dy)`
pub fn line(dx: f64, dy: f64, samples: usize) -> Vec<Point> {
    (0..samples)
        .map(|i| Point::new(dx * i as f64, dy * i as f64))
        .collect()
}

/// Full circle of `radius` starting at angle 0.
///
/// `direction` +1 runs counter-clockwise on screen (first heading toward -y),
/// -1 clockwise. First and last samples coincide, matching a closed
/// hand-drawn loop.
pub fn circle(radius: f64, direction: f64, samples: usize) -> Vec<Point> {
    let last = samples.saturating_sub(1).max(1) as f64;
    (0..samples)
        .map(|i| {
            let t = i as f64 / last * TAU;
            Point::new(radius * t.cos(), -direction * radius * t.sin())
        })
        .collect()
}

/// Registry holding every built-in template, in a fixed order
pub fn builtin_registry() -> Result<TemplateRegistry> {
    let mut registry = TemplateRegistry::new();
    registry.register_template(SWIPE_LEFT, &line(-1.0, 0.0, TEMPLATE_SAMPLES))?;
    registry.register_template(SWIPE_RIGHT, &line(1.0, 0.0, TEMPLATE_SAMPLES))?;
    registry.register_template(SWIPE_UP, &line(0.0, -1.0, TEMPLATE_SAMPLES))?;
    registry.register_template(SWIPE_DOWN, &line(0.0, 1.0, TEMPLATE_SAMPLES))?;
    registry.register_template(CIRCLE_CCW, &circle(10.0, 1.0, TEMPLATE_SAMPLES))?;
    registry.register_template(CIRCLE_CW, &circle(10.0, -1.0, TEMPLATE_SAMPLES))?;
    Ok(registry)
}
