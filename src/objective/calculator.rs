use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::map::SubjectId;
use crate::plan::{District, Plan};

/// A calculator argument: a literal number, or a subject resolved against a
/// district's computed characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    Literal(f64),
    Subject(SubjectId),
}

impl Argument {
    /// Resolve the argument. Subjects resolve to `None` without a district or
    /// when the district has no value for them.
    pub fn resolve(&self, district: Option<&District>) -> Option<f64> {
        match *self {
            Argument::Literal(value) => Some(value),
            Argument::Subject(subject) => district.and_then(|district| district.computed(subject)),
        }
    }
}

/// What a calculator is evaluated on.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    District(&'a District),
    /// The districts current at the plan's version.
    Plan(&'a Plan),
}

impl<'a> Scope<'a> {
    fn district(&self) -> Option<&'a District> {
        match *self {
            Scope::District(district) => Some(district),
            Scope::Plan(_) => None,
        }
    }
}

/// The result of a calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Score {
    Number(f64),
    Flag(bool),
}

/// A scoring calculator over district aggregates and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Calculator {
    /// Circumference of the circle with the district's area, over the
    /// district's perimeter. 1 for a circle.
    Schwartzberg,
    /// Sum of the values, per district or over every district of a plan.
    Sum { values: Vec<Argument> },
    /// `numerator / denominator`.
    Percent { numerator: Argument, denominator: Argument },
    /// Whether `value` is strictly above `threshold`.
    Threshold { value: Argument, threshold: Argument },
    /// Whether `value` is strictly between `min` and `max`.
    Range { value: Argument, min: Argument, max: Argument },
}

impl Calculator {
    /// Get a short name for this calculator (for display purposes).
    pub fn short_name(&self) -> &str {
        match self {
            Calculator::Schwartzberg => "Schwartzberg",
            Calculator::Sum { .. } => "Sum",
            Calculator::Percent { .. } => "Percent",
            Calculator::Threshold { .. } => "Threshold",
            Calculator::Range { .. } => "Range",
        }
    }

    /// Evaluate the calculator. `None` when an argument or the geometry it
    /// needs is missing.
    pub fn compute(&self, scope: Scope<'_>) -> Option<Score> {
        let district = scope.district();
        match self {
            Calculator::Schwartzberg => {
                let geom = district?.geom()?;
                let perimeter = geom.perimeter();
                if perimeter <= 0.0 {
                    return None;
                }
                let radius = (geom.area() / PI).sqrt();
                Some(Score::Number(2.0 * PI * radius / perimeter))
            }
            Calculator::Sum { values } => {
                let districts = match scope {
                    Scope::District(district) => vec![district],
                    Scope::Plan(plan) => plan.districts(),
                };
                let total = districts.into_iter()
                    .flat_map(|district| values.iter().filter_map(move |value| value.resolve(Some(district))))
                    .sum();
                Some(Score::Number(total))
            }
            Calculator::Percent { numerator, denominator } => {
                let numerator = numerator.resolve(district)?;
                let denominator = denominator.resolve(district)?;
                (denominator != 0.0).then(|| Score::Number(numerator / denominator))
            }
            Calculator::Threshold { value, threshold } => {
                Some(Score::Flag(value.resolve(district)? > threshold.resolve(district)?))
            }
            Calculator::Range { value, min, max } => {
                let value = value.resolve(district)?;
                Some(Score::Flag(value > min.resolve(district)? && value < max.resolve(district)?))
            }
        }
    }
}
