use crate::errors::GenerationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// A titled, ordered list of instructional steps.
///
/// The title and every step are non-empty and there is at least one step.
/// Steps never carry a leading "Step N:" ordinal, numbering is left to
/// whatever renders the tutorial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTutorial")]
pub struct Tutorial {
    title: String,
    steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidTutorial(String);

#[derive(Deserialize)]
struct RawTutorial {
    title: String,
    steps: Vec<String>,
}

impl TryFrom<RawTutorial> for Tutorial {
    type Error = InvalidTutorial;

    fn try_from(raw: RawTutorial) -> Result<Self, Self::Error> {
        Self::new(raw.title, raw.steps)
    }
}

impl Tutorial {
    /// Build a tutorial, trimming the title and steps and stripping any
    /// "Step N:" prefix from the steps.
    pub fn new<I, S>(title: impl Into<String>, steps: I) -> Result<Self, InvalidTutorial>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let title: String = title.into();
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(InvalidTutorial("title is empty".to_string()));
        }

        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                let step: String = step.into();
                let step = strip_step_prefix(step.trim()).trim().to_string();
                if step.is_empty() {
                    Err(InvalidTutorial(format!("step {} is empty", index + 1)))
                } else {
                    Ok(step)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if steps.is_empty() {
            return Err(InvalidTutorial("tutorial has no steps".to_string()));
        }

        Ok(Self { title, steps })
    }

    /// Parse the text of a structured model reply, failing closed on any
    /// deviation from `{ title: string, steps: string[] }`.
    pub fn from_reply(text: &str) -> Result<Self, GenerationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyReply);
        }

        let value: Value = serde_json::from_str(text).map_err(GenerationError::MalformedReply)?;
        let object = value.as_object().ok_or_else(|| {
            GenerationError::SchemaMismatch("reply is not a JSON object".to_string())
        })?;

        let title = match object.get("title") {
            Some(Value::String(title)) => title.as_str(),
            Some(_) => {
                return Err(GenerationError::SchemaMismatch(
                    "`title` is not a string".to_string(),
                ))
            }
            None => {
                return Err(GenerationError::SchemaMismatch(
                    "`title` is missing".to_string(),
                ))
            }
        };

        let steps = match object.get("steps") {
            Some(Value::Array(steps)) => steps,
            Some(_) => {
                return Err(GenerationError::SchemaMismatch(
                    "`steps` is not an array".to_string(),
                ))
            }
            None => {
                return Err(GenerationError::SchemaMismatch(
                    "`steps` is missing".to_string(),
                ))
            }
        };

        let steps = steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.as_str().ok_or_else(|| {
                    GenerationError::SchemaMismatch(format!("step {} is not a string", index + 1))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(title, steps).map_err(|error| GenerationError::SchemaMismatch(error.0))
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }
}

fn step_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"(?i)^step\s*\d+\s*:\s*").expect("valid step prefix regex"))
}

/// Remove a leading "Step N:" ordinal, in any letter case.
#[must_use]
pub fn strip_step_prefix(step: &str) -> &str {
    match step_prefix().find(step) {
        Some(found) => &step[found.end()..],
        None => step,
    }
}
