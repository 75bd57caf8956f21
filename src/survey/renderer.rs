// src/survey/renderer.rs

use serde::Serialize;
use serde_json::Value;

use crate::config::DEFAULT_MAX_SELECTIONS;
use crate::error::AppError;
use crate::models::question::{Answer, Question, QuestionOption, QuestionType, ScaleLabels};

/// Input affordance a question presents to the client, derived from its
/// declared type and constraints.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Affordance {
    SingleSelect {
        options: Vec<QuestionOption>,
    },
    MultiSelect {
        options: Vec<QuestionOption>,
        max_selections: usize,
    },
    Scale {
        min: i64,
        max: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        labels: Option<ScaleLabels>,
        /// Display value only. Defaults to `min` when nothing is stored;
        /// that default is never written back until the user interacts.
        value: i64,
    },
    TextInput {
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        multiline: bool,
    },
    /// Declared question types without a rendering implementation degrade
    /// to a placeholder instead of failing the page.
    NotImplemented {
        question_type: QuestionType,
    },
}

fn scale_bounds(question: &Question) -> (i64, i64) {
    (question.scale_min.unwrap_or(1), question.scale_max.unwrap_or(10))
}

pub fn max_selections(question: &Question) -> usize {
    question.max_selections.unwrap_or(DEFAULT_MAX_SELECTIONS)
}

/// Maps a question to its input affordance, seeded with the current value
/// where the widget needs one.
pub fn affordance(question: &Question, current: Option<&Answer>) -> Affordance {
    match question.question_type {
        QuestionType::MultipleChoice => Affordance::SingleSelect {
            options: question.options.clone().unwrap_or_default(),
        },
        QuestionType::MultipleChoiceMulti => Affordance::MultiSelect {
            options: question.options.clone().unwrap_or_default(),
            max_selections: max_selections(question),
        },
        QuestionType::OpinionScale => {
            let (min, max) = scale_bounds(question);
            let value = match current {
                Some(Answer::Scale(n)) => *n,
                _ => min,
            };
            Affordance::Scale {
                min,
                max,
                labels: question.scale_labels.clone(),
                value,
            }
        }
        QuestionType::ShortText | QuestionType::LongText => Affordance::TextInput {
            placeholder: question.placeholder.clone(),
            max_length: question.max_length,
            multiline: question.question_type == QuestionType::LongText,
        },
        QuestionType::Matrix | QuestionType::Ranking => Affordance::NotImplemented {
            question_type: question.question_type,
        },
    }
}

fn declared_values(question: &Question) -> Vec<&str> {
    question
        .options
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|o| o.value.as_str())
        .collect()
}

/// Normalizes a submitted raw value into the correctly-tagged [`Answer`]
/// for the question's type, enforcing the question's constraints:
/// choice values must be declared options, multi-select is deduped in
/// selection order and capped, scale picks are clamped to the declared
/// range, and text is cut at `max_length` without trimming.
pub fn normalize(question: &Question, raw: &Value) -> Result<Answer, AppError> {
    match question.question_type {
        QuestionType::MultipleChoice => {
            let value = raw
                .as_str()
                .ok_or_else(|| bad_shape(question, "a string"))?;
            if !declared_values(question).contains(&value) {
                return Err(AppError::BadRequest(format!(
                    "'{}' is not an option of question '{}'",
                    value, question.id
                )));
            }
            Ok(Answer::Choice(value.to_string()))
        }
        QuestionType::MultipleChoiceMulti => {
            let items = raw
                .as_array()
                .ok_or_else(|| bad_shape(question, "an array of strings"))?;
            let declared = declared_values(question);
            let cap = max_selections(question);

            let mut selected: Vec<String> = Vec::new();
            for item in items {
                let value = item
                    .as_str()
                    .ok_or_else(|| bad_shape(question, "an array of strings"))?;
                if !declared.contains(&value) {
                    return Err(AppError::BadRequest(format!(
                        "'{}' is not an option of question '{}'",
                        value, question.id
                    )));
                }
                if selected.iter().any(|s| s == value) {
                    continue;
                }
                if selected.len() < cap {
                    selected.push(value.to_string());
                }
            }
            Ok(Answer::MultiChoice(selected))
        }
        QuestionType::OpinionScale => {
            let pick = raw
                .as_i64()
                .ok_or_else(|| bad_shape(question, "a number"))?;
            let (min, max) = scale_bounds(question);
            Ok(Answer::Scale(pick.clamp(min, max)))
        }
        QuestionType::ShortText | QuestionType::LongText => {
            let text = raw
                .as_str()
                .ok_or_else(|| bad_shape(question, "a string"))?;
            let text = match question.max_length {
                Some(limit) if text.chars().count() > limit => {
                    text.chars().take(limit).collect()
                }
                _ => text.to_string(),
            };
            Ok(Answer::Text(text))
        }
        QuestionType::Matrix | QuestionType::Ranking => Err(AppError::BadRequest(format!(
            "Question type for '{}' is not yet implemented",
            question.id
        ))),
    }
}

fn bad_shape(question: &Question, expected: &str) -> AppError {
    AppError::BadRequest(format!(
        "Answer to question '{}' must be {}",
        question.id, expected
    ))
}

/// Cap-aware select/deselect: picking an already-selected value removes it,
/// picking a new value appends it unless the cap is reached (then the pick
/// is a no-op). Selection order is preserved.
pub fn toggle_selection(selected: &[String], value: &str, max: usize) -> Vec<String> {
    if selected.iter().any(|s| s == value) {
        return selected.iter().filter(|s| *s != value).cloned().collect();
    }
    let mut next = selected.to_vec();
    if next.len() < max {
        next.push(value.to_string());
    }
    next
}
