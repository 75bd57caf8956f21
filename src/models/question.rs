// src/models/question.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every question type the catalog may declare.
///
/// `Matrix` and `Ranking` are declared but have no input affordance yet;
/// the renderer surfaces them as an explicit placeholder instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    MultipleChoiceMulti,
    OpinionScale,
    ShortText,
    LongText,
    Matrix,
    Ranking,
}

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    /// The value stored in the answer map when this option is picked.
    pub value: String,
}

/// End labels shown under an opinion scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaleLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// A catalog entry. Immutable at runtime; the catalog order defines both
/// the display sequence and the progress denominator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Blocks forward navigation while unanswered.
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_labels: Option<ScaleLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
}

/// A respondent's answer to one question, tagged by shape.
///
/// Serializes untagged to the document-store representation: plain string
/// for text and single choice, string array for multi choice, number for a
/// scale pick. Deserialization is type-directed via [`Answer::from_stored`]
/// since the wire shape alone cannot distinguish text from choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Scale(i64),
    MultiChoice(Vec<String>),
    Choice(String),
    Text(String),
}

impl Answer {
    /// Reinterprets a stored JSON value as the answer variant the given
    /// question type expects. A mismatched shape yields `None` rather than
    /// an error; stale entries are preserved verbatim by the controller.
    pub fn from_stored(question_type: QuestionType, value: &Value) -> Option<Self> {
        match question_type {
            QuestionType::MultipleChoice => value.as_str().map(|s| Answer::Choice(s.to_owned())),
            QuestionType::MultipleChoiceMulti => value.as_array().map(|items| {
                Answer::MultiChoice(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_owned))
                        .collect(),
                )
            }),
            QuestionType::OpinionScale => value.as_i64().map(Answer::Scale),
            QuestionType::ShortText | QuestionType::LongText => {
                value.as_str().map(|s| Answer::Text(s.to_owned()))
            }
            QuestionType::Matrix | QuestionType::Ranking => None,
        }
    }

    /// The "unanswered" equivalence used by the required check: an empty
    /// string or empty array does not count as an answer, while a scale
    /// value of 0 does.
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Text(s) | Answer::Choice(s) => s.is_empty(),
            Answer::MultiChoice(values) => values.is_empty(),
            Answer::Scale(_) => false,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
