//! Results with recoverable caveats
//!
//! Unit and frequency mismatches or missing reference data never abort a
//! calculation. The offending contribution is dropped and an [`Issue`] is
//! recorded next to the value. Only caller misuse becomes a [`RegimenError`].

use serde::Serialize;
use thiserror::Error;

/// Caller-visible failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegimenError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Ingredient type mismatch: expected {expected}, found {found}")]
    IngredientTypeMismatch { expected: String, found: String },
}

pub type RegimenResult<T> = Result<T, RegimenError>;

/// Kind of recoverable problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnitMismatch,
    FrequencyMismatch,
    MissingPrice,
    MissingNutritionFacts,
}

/// A recoverable problem met during a calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            ingredient: None,
            product_id: None,
            message: message.into(),
        }
    }

    pub fn for_ingredient(mut self, name: impl Into<String>) -> Self {
        self.ingredient = Some(name.into());
        self
    }

    pub fn for_product(mut self, id: impl Into<String>) -> Self {
        self.product_id = Some(id.into());
        self
    }
}

/// A value together with the issues absorbed while computing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub issues: Vec<Issue>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Record an issue. Also logged, so a running server still shows it.
    pub fn push(&mut self, issue: Issue) {
        tracing::warn!(
            kind = ?issue.kind,
            ingredient = issue.ingredient.as_deref(),
            product_id = issue.product_id.as_deref(),
            "{}",
            issue.message
        );
        self.issues.push(issue);
    }

    /// Take the issues of another outcome and return its value
    pub fn absorb<U>(&mut self, other: Outcome<U>) -> U {
        self.issues.extend(other.issues);
        other.value
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            issues: self.issues,
        }
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}
