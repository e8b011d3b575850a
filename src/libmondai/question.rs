use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPTION_SLOTS: usize = 4;
pub const MATCHING_SLOTS: usize = 4;
pub const ORDERING_SLOTS: usize = 5;

/// Reading passage shown before the question. Media references are opaque
/// strings (a path or data URI); nothing here ever looks inside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

/// The question stem itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[default]
    MultipleChoice,
    FillInTheBlank,
    TrueFalse,
    ShortAnswer,
    Matching,
    Ordering,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::MultipleChoice,
        QuestionKind::FillInTheBlank,
        QuestionKind::TrueFalse,
        QuestionKind::ShortAnswer,
        QuestionKind::Matching,
        QuestionKind::Ordering,
    ];

    /// Unrecognized tags fall back to multiple-choice.
    pub fn from_tag(tag: &str) -> QuestionKind {
        match tag {
            "fill-in-the-blank" => QuestionKind::FillInTheBlank,
            "true-false" => QuestionKind::TrueFalse,
            "short-answer" => QuestionKind::ShortAnswer,
            "matching" => QuestionKind::Matching,
            "ordering" => QuestionKind::Ordering,
            _ => QuestionKind::MultipleChoice,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple-choice",
            QuestionKind::FillInTheBlank => "fill-in-the-blank",
            QuestionKind::TrueFalse => "true-false",
            QuestionKind::ShortAnswer => "short-answer",
            QuestionKind::Matching => "matching",
            QuestionKind::Ordering => "ordering",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The answer payload. The serde tag doubles as the question type, so a
/// record can never carry fields belonging to another type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Answer {
    MultipleChoice {
        options: Vec<ChoiceOption>,
        correct: usize,
    },
    FillInTheBlank {
        correct_answer: String,
    },
    TrueFalse {
        correct_answer: bool,
    },
    ShortAnswer {
        correct_answer: String,
    },
    Matching {
        prompts: Vec<String>,
        answers: Vec<String>,
    },
    Ordering {
        items: Vec<String>,
    },
}

impl Answer {
    pub fn default_for(kind: QuestionKind) -> Answer {
        match kind {
            QuestionKind::MultipleChoice => Answer::MultipleChoice {
                options: vec![ChoiceOption::default(); OPTION_SLOTS],
                correct: 0,
            },
            QuestionKind::FillInTheBlank => Answer::FillInTheBlank {
                correct_answer: String::new(),
            },
            QuestionKind::TrueFalse => Answer::TrueFalse {
                correct_answer: true,
            },
            QuestionKind::ShortAnswer => Answer::ShortAnswer {
                correct_answer: String::new(),
            },
            QuestionKind::Matching => Answer::Matching {
                prompts: Vec::new(),
                answers: Vec::new(),
            },
            QuestionKind::Ordering => Answer::Ordering { items: Vec::new() },
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Answer::FillInTheBlank { .. } => QuestionKind::FillInTheBlank,
            Answer::TrueFalse { .. } => QuestionKind::TrueFalse,
            Answer::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            Answer::Matching { .. } => QuestionKind::Matching,
            Answer::Ordering { .. } => QuestionKind::Ordering,
        }
    }
}

/// A media slot on the current record. Writes are plain assignments, so a
/// rapid pair of writes to one slot is last-writer-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    ReadingImage,
    ReadingAudio,
    QuestionImage,
    OptionImage(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub reading: Reading,
    #[serde(default)]
    pub question: Stem,
    #[serde(flatten)]
    pub answer: Answer,
}

impl Default for QuestionRecord {
    fn default() -> Self {
        QuestionRecord {
            reading: Reading::default(),
            question: Stem::default(),
            answer: Answer::default_for(QuestionKind::MultipleChoice),
        }
    }
}

impl QuestionRecord {
    pub fn kind(&self) -> QuestionKind {
        self.answer.kind()
    }

    /// Builds a canonical record from an arbitrarily-shaped JSON value.
    /// Missing or ill-typed fields get their documented defaults; fields
    /// outside the allowed set for the type do not survive.
    pub fn from_loose(value: &Value) -> QuestionRecord {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(QuestionKind::from_tag)
            .unwrap_or_default();

        let mut record = QuestionRecord {
            reading: Reading {
                text: loose_text(value.get("reading"), "text"),
                image: loose_media(value.get("reading"), "image"),
                audio: loose_media(value.get("reading"), "audio"),
            },
            question: Stem {
                text: loose_text(value.get("question"), "text"),
                image: loose_media(value.get("question"), "image"),
            },
            answer: loose_answer(kind, value),
        };
        record.sanitize();
        record
    }

    /// In-place repair of a typed record: exactly 4 option slots, `correct`
    /// in range, matching sequences parallel. Idempotent.
    pub fn sanitize(&mut self) {
        match &mut self.answer {
            Answer::MultipleChoice { options, correct } => {
                options.truncate(OPTION_SLOTS);
                while options.len() < OPTION_SLOTS {
                    options.push(ChoiceOption::default());
                }
                if *correct >= OPTION_SLOTS {
                    *correct = 0;
                }
            }
            Answer::Matching { prompts, answers } => {
                let pairs = prompts.len().min(answers.len()).min(MATCHING_SLOTS);
                prompts.truncate(pairs);
                answers.truncate(pairs);
            }
            Answer::Ordering { items } => {
                items.truncate(ORDERING_SLOTS);
            }
            _ => {}
        }
    }

    /// Reassigns the question type. The old answer payload is discarded and
    /// replaced with the new type's defaults; reading and stem are kept.
    pub fn switch_kind(&mut self, kind: QuestionKind) {
        if self.kind() == kind {
            self.sanitize();
            return;
        }
        self.answer = Answer::default_for(kind);
    }

    /// Returns false when the record has no such slot (option images only
    /// exist on multiple-choice records).
    pub fn set_media(&mut self, slot: MediaSlot, blob: Option<String>) -> bool {
        match slot {
            MediaSlot::ReadingImage => {
                self.reading.image = blob;
                true
            }
            MediaSlot::ReadingAudio => {
                self.reading.audio = blob;
                true
            }
            MediaSlot::QuestionImage => {
                self.question.image = blob;
                true
            }
            MediaSlot::OptionImage(index) => match &mut self.answer {
                Answer::MultipleChoice { options, .. } if index < options.len() => {
                    options[index].image = blob;
                    true
                }
                _ => false,
            },
        }
    }
}

fn loose_text(parent: Option<&Value>, field: &str) -> String {
    parent
        .and_then(|p| p.get(field))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn loose_media(parent: Option<&Value>, field: &str) -> Option<String> {
    parent
        .and_then(|p| p.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn loose_strings(value: Option<&Value>, cap: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(cap)
                .map(|item| item.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn loose_answer(kind: QuestionKind, value: &Value) -> Answer {
    match kind {
        QuestionKind::MultipleChoice => {
            let options = value
                .get("options")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .take(OPTION_SLOTS)
                        .map(|item| ChoiceOption {
                            text: loose_text(Some(item), "text"),
                            image: loose_media(Some(item), "image"),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let correct = value
                .get("correct")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .filter(|n| *n < OPTION_SLOTS)
                .unwrap_or(0);
            Answer::MultipleChoice { options, correct }
        }
        QuestionKind::FillInTheBlank => Answer::FillInTheBlank {
            correct_answer: value
                .get("correctAnswer")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        QuestionKind::TrueFalse => Answer::TrueFalse {
            correct_answer: value
                .get("correctAnswer")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        },
        QuestionKind::ShortAnswer => Answer::ShortAnswer {
            correct_answer: value
                .get("correctAnswer")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        QuestionKind::Matching => Answer::Matching {
            prompts: loose_strings(value.get("prompts"), MATCHING_SLOTS),
            answers: loose_strings(value.get("answers"), MATCHING_SLOTS),
        },
        QuestionKind::Ordering => Answer::Ordering {
            items: loose_strings(value.get("items"), ORDERING_SLOTS),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_record_is_multiple_choice() {
        let record = QuestionRecord::default();
        assert_eq!(record.kind(), QuestionKind::MultipleChoice);
        assert_eq!(record.reading.text, "");
        assert_eq!(record.question.text, "");
        match &record.answer {
            Answer::MultipleChoice { options, correct } => {
                assert_eq!(options.len(), OPTION_SLOTS);
                assert_eq!(*correct, 0);
            }
            other => panic!("unexpected answer {:?}", other),
        }
    }

    #[test]
    fn unknown_type_falls_back_to_multiple_choice() {
        let record = QuestionRecord::from_loose(&json!({ "type": "essay" }));
        assert_eq!(record.kind(), QuestionKind::MultipleChoice);
        let record = QuestionRecord::from_loose(&json!({}));
        assert_eq!(record.kind(), QuestionKind::MultipleChoice);
    }

    #[test]
    fn options_are_padded_and_truncated_to_four() {
        let record = QuestionRecord::from_loose(&json!({
            "type": "multiple-choice",
            "options": [{ "text": "a" }, { "text": "b" }],
        }));
        match &record.answer {
            Answer::MultipleChoice { options, .. } => {
                assert_eq!(options.len(), 4);
                assert_eq!(options[0].text, "a");
                assert_eq!(options[2].text, "");
            }
            other => panic!("unexpected answer {:?}", other),
        }

        let record = QuestionRecord::from_loose(&json!({
            "type": "multiple-choice",
            "options": [
                { "text": "a" }, { "text": "b" }, { "text": "c" },
                { "text": "d" }, { "text": "e" }, { "text": "f" }
            ],
        }));
        match &record.answer {
            Answer::MultipleChoice { options, .. } => assert_eq!(options.len(), 4),
            other => panic!("unexpected answer {:?}", other),
        }
    }

    #[test]
    fn correct_index_defaults_to_zero_when_invalid() {
        for correct in [json!(7), json!(-1), json!("2"), json!(null)] {
            let record = QuestionRecord::from_loose(&json!({
                "type": "multiple-choice",
                "correct": correct,
            }));
            match &record.answer {
                Answer::MultipleChoice { correct, .. } => assert_eq!(*correct, 0),
                other => panic!("unexpected answer {:?}", other),
            }
        }
        let record = QuestionRecord::from_loose(&json!({
            "type": "multiple-choice",
            "correct": 3,
        }));
        match &record.answer {
            Answer::MultipleChoice { correct, .. } => assert_eq!(*correct, 3),
            other => panic!("unexpected answer {:?}", other),
        }
    }

    #[test]
    fn true_false_defaults_to_true_unless_strictly_boolean() {
        let record = QuestionRecord::from_loose(&json!({
            "type": "true-false",
            "correctAnswer": "false",
        }));
        assert_eq!(record.answer, Answer::TrueFalse { correct_answer: true });

        let record = QuestionRecord::from_loose(&json!({
            "type": "true-false",
            "correctAnswer": false,
        }));
        assert_eq!(record.answer, Answer::TrueFalse { correct_answer: false });
    }

    #[test]
    fn fields_of_other_types_are_purged() {
        let record = QuestionRecord::from_loose(&json!({
            "type": "ordering",
            "items": ["one", "two"],
            "options": [{ "text": "stale" }],
            "correct": 2,
            "correctAnswer": "stale",
            "prompts": ["stale"],
            "extra": "junk",
        }));
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        let mut keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["items", "question", "reading", "type"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let shapes = [
            json!({}),
            json!({ "type": "matching", "prompts": ["a", "b", "c"], "answers": ["1"] }),
            json!({ "type": "multiple-choice", "correct": 9, "options": [{ "text": 1 }] }),
            json!({ "type": "ordering", "items": ["a", "b", "c", "d", "e", "f", "g"] }),
            json!({ "reading": { "text": "passage", "image": "ref" }, "type": "short-answer" }),
        ];
        for shape in &shapes {
            let once = QuestionRecord::from_loose(shape);
            let again = QuestionRecord::from_loose(&serde_json::to_value(&once).unwrap());
            assert_eq!(once, again, "not idempotent for {}", shape);
        }
    }

    #[test]
    fn matching_sequences_are_kept_parallel() {
        let record = QuestionRecord::from_loose(&json!({
            "type": "matching",
            "prompts": ["a", "b", "c"],
            "answers": ["1"],
        }));
        assert_eq!(
            record.answer,
            Answer::Matching {
                prompts: vec!["a".to_string()],
                answers: vec!["1".to_string()],
            }
        );
    }

    #[test]
    fn switch_kind_discards_old_payload() {
        let mut record = QuestionRecord::from_loose(&json!({
            "type": "multiple-choice",
            "options": [{ "text": "a" }, { "text": "b" }, { "text": "c" }, { "text": "d" }],
            "correct": 2,
            "question": { "text": "pick one" },
        }));
        record.switch_kind(QuestionKind::TrueFalse);
        assert_eq!(record.answer, Answer::TrueFalse { correct_answer: true });
        assert_eq!(record.question.text, "pick one");

        record.switch_kind(QuestionKind::MultipleChoice);
        match &record.answer {
            Answer::MultipleChoice { options, correct } => {
                assert!(options.iter().all(|opt| opt.text.is_empty()));
                assert_eq!(*correct, 0);
            }
            other => panic!("unexpected answer {:?}", other),
        }
    }

    #[test]
    fn option_image_slot_requires_multiple_choice() {
        let mut record = QuestionRecord::default();
        assert!(record.set_media(MediaSlot::OptionImage(1), Some("blob".to_string())));
        record.switch_kind(QuestionKind::Ordering);
        assert!(!record.set_media(MediaSlot::OptionImage(1), Some("blob".to_string())));
        assert!(record.set_media(MediaSlot::ReadingAudio, Some("blob".to_string())));
        assert_eq!(record.reading.audio.as_deref(), Some("blob"));
    }
}
