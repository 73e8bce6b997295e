//! Template Registry and Classifier
//!
//! The registry is filled once at start-up and is read-only afterwards; the
//! classifier owns it behind an `Arc` so any number of classifiers (or
//! threads) can share one registry without locking.

use super::matcher::{CurveMatcher, MatchScore, ScoringMode};
use super::template::GestureTemplate;
use crate::geometry::Point;
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;

/// Ordered collection of named templates
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<GestureTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a template from `points` and register it under `name`.
    ///
    /// Construction errors are returned unchanged: a malformed template is a
    /// configuration bug and should stop start-up.
    pub fn register_template(&mut self, name: &str, points: &[Point]) -> Result<&GestureTemplate> {
        let template = GestureTemplate::new(name, points)?;
        self.insert(template)
    }

    /// Register an already-built template
    pub fn insert(&mut self, template: GestureTemplate) -> Result<&GestureTemplate> {
        if template.name().trim().is_empty() {
            return Err(Error::Registry("template name must not be empty".to_string()));
        }
        if self.get(template.name()).is_some() {
            return Err(Error::Registry(format!(
                "template '{}' is already registered",
                template.name()
            )));
        }
        self.templates.push(template);
        Ok(&self.templates[self.templates.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&GestureTemplate> {
        self.templates.iter().find(|t| t.name() == name)
    }

    /// Templates in registration order
    pub fn iter(&self) -> impl Iterator<Item = &GestureTemplate> {
        self.templates.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Outcome of classifying one gesture
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Recognition {
    /// Best template, within the rejection threshold if one is set
    Match { template: String, score: f64 },
    /// Nothing registered, or the best score exceeded the threshold
    NoMatch { best_score: Option<f64> },
}

impl Recognition {
    pub fn template(&self) -> Option<&str> {
        match self {
            Recognition::Match { template, .. } => Some(template),
            Recognition::NoMatch { .. } => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Recognition::Match { score, .. } => Some(*score),
            Recognition::NoMatch { best_score } => *best_score,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Recognition::Match { .. })
    }
}

/// Score of one template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateScore {
    pub template: String,
    #[serde(flatten)]
    pub score: MatchScore,
}

/// Full classification result: the decision plus every template's score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub recognition: Recognition,
    /// Scores in registration order
    pub scores: Vec<TemplateScore>,
}

/// Picks the registered template closest to a captured gesture
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: Arc<TemplateRegistry>,
    matcher: CurveMatcher,
    rejection_threshold: Option<f64>,
}

impl Classifier {
    /// Create a classifier that always reports the best template
    pub fn new(registry: TemplateRegistry, mode: ScoringMode) -> Self {
        Self::shared(Arc::new(registry), mode)
    }

    /// Create a classifier over a registry shared with other classifiers
    pub fn shared(registry: Arc<TemplateRegistry>, mode: ScoringMode) -> Self {
        Self {
            registry,
            matcher: CurveMatcher::new(mode),
            rejection_threshold: None,
        }
    }

    /// Report `NoMatch` whenever the best score is above `threshold`
    pub fn with_rejection_threshold(mut self, threshold: Option<f64>) -> Self {
        self.rejection_threshold = threshold;
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn mode(&self) -> ScoringMode {
        self.matcher.mode
    }

    pub fn rejection_threshold(&self) -> Option<f64> {
        self.rejection_threshold
    }

    /// Score `gesture` against every template and pick the lowest score.
    ///
    /// Ties go to the template registered first. Geometry errors from the
    /// matcher are returned as-is; they depend on the gesture, not the
    /// template, so the first one aborts the whole classification.
    pub fn classify(&self, gesture: &[Point]) -> Result<Classification> {
        let mut scores = Vec::with_capacity(self.registry.len());
        let mut best: Option<(usize, f64)> = None;

        for (index, template) in self.registry.iter().enumerate() {
            let score = self.matcher.score(template, gesture)?;
            if score.score.is_finite() && best.map_or(true, |(_, s)| score.score < s) {
                best = Some((index, score.score));
            }
            scores.push(TemplateScore {
                template: template.name().to_string(),
                score,
            });
        }

        let recognition = match best {
            Some((index, score)) if self.accepts(score) => Recognition::Match {
                template: scores[index].template.clone(),
                score,
            },
            Some((_, score)) => Recognition::NoMatch {
                best_score: Some(score),
            },
            None => Recognition::NoMatch { best_score: None },
        };

        Ok(Classification { recognition, scores })
    }

    fn accepts(&self, score: f64) -> bool {
        self.rejection_threshold.map_or(true, |limit| score <= limit)
    }
}
