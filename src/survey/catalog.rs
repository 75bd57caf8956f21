// src/survey/catalog.rs

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::question::{Answer, Question, QuestionOption, QuestionType, ScaleLabels};

fn option(id: &str, label: &str, value: &str) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn base(id: &str, question_type: QuestionType, title: &str, required: bool) -> Question {
    Question {
        id: id.to_string(),
        question_type,
        title: title.to_string(),
        description: None,
        required,
        options: None,
        scale_min: None,
        scale_max: None,
        scale_labels: None,
        placeholder: None,
        max_length: None,
        max_selections: None,
    }
}

/// The compiled-in questionnaire. Order is fixed: it defines both the
/// display sequence and the progress denominator. Ids must be unique since
/// they key the answer map.
static QUESTIONS: LazyLock<Vec<Question>> = LazyLock::new(|| {
    vec![
        Question {
            options: Some(vec![
                option("opt1", "Current member of 1 club", "member_1"),
                option("opt2", "Member of 2-3 clubs", "member_2_3"),
                option("opt3", "Member of 4+ clubs", "member_4_plus"),
                option("opt4", "Frequent guest (non-member)", "frequent_guest"),
                option("opt5", "Former member", "former_member"),
            ]),
            ..base(
                "q1",
                QuestionType::MultipleChoice,
                "What is your current relationship to private members' clubs?",
                true,
            )
        },
        Question {
            description: Some("Select up to 3 options".to_string()),
            options: Some(vec![
                option("opt1", "Business meetings", "business_meetings"),
                option("opt2", "Solo work / laptop sessions", "solo_work"),
                option("opt3", "Social dining & drinks", "social_dining"),
                option("opt4", "Evening entertainment", "evening_entertainment"),
                option("opt5", "Cultural events / talks", "cultural_events"),
                option("opt6", "Wellness / fitness", "wellness"),
                option("opt7", "Overnight stays", "overnight_stays"),
            ]),
            max_selections: Some(3),
            ..base(
                "q2",
                QuestionType::MultipleChoiceMulti,
                "How do you primarily use clubs? (Select your top 3)",
                true,
            )
        },
        Question {
            description: Some("Membership fees + F&B + rooms".to_string()),
            options: Some(vec![
                option("opt1", "Under £5,000", "under_5k"),
                option("opt2", "£5,000 – £15,000", "5k_15k"),
                option("opt3", "£15,000 – £30,000", "15k_30k"),
                option("opt4", "£30,000 – £50,000", "30k_50k"),
                option("opt5", "Over £50,000", "over_50k"),
            ]),
            ..base(
                "q3",
                QuestionType::MultipleChoice,
                "What is your approximate annual spend across all clubs?",
                true,
            )
        },
        Question {
            description: Some("Rate from 1 (very weak) to 10 (exceptional)".to_string()),
            scale_min: Some(1),
            scale_max: Some(10),
            scale_labels: Some(ScaleLabels {
                min: Some("Very weak".to_string()),
                max: Some("Exceptional".to_string()),
            }),
            ..base(
                "q4",
                QuestionType::OpinionScale,
                "How well do London's leading clubs currently deliver on business utility?",
                true,
            )
        },
        Question {
            description: Some("Please share your thoughts".to_string()),
            placeholder: Some("Enter your response...".to_string()),
            max_length: Some(500),
            ..base(
                "q5",
                QuestionType::LongText,
                "What would make a new club concept compelling to you?",
                false,
            )
        },
    ]
});

/// Returns the full catalog in display order. Pure; the same sequence on
/// every call.
pub fn all() -> &'static [Question] {
    &QUESTIONS
}

/// Looks a question up by id. Not finding one is a benign outcome.
pub fn by_id(question_id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == question_id)
}

pub fn total() -> usize {
    QUESTIONS.len()
}

/// round(100 * answered_required / required), where an answer counts only
/// if present and non-empty. Defined as 0 when nothing is required.
pub fn completion_of(questions: &[Question], answers: &HashMap<String, Answer>) -> u8 {
    let required: Vec<&Question> = questions.iter().filter(|q| q.required).collect();
    if required.is_empty() {
        return 0;
    }

    let answered = required
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| !a.is_empty()))
        .count();

    ((answered as f64 / required.len() as f64) * 100.0).round() as u8
}
