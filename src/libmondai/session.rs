use crate::libmondai::question::{
    Answer, QuestionKind, QuestionRecord, MATCHING_SLOTS, OPTION_SLOTS, ORDERING_SLOTS,
};
use crate::libmondai::store::QuestionStore;

/// The buffered edit surface for one question. The presentation layer fills
/// the slots however it likes; nothing is written to the store until commit.
#[derive(Debug, Clone)]
pub struct Draft {
    pub reading_text: String,
    pub question_text: String,
    pub answer: AnswerDraft,
}

#[derive(Debug, Clone)]
pub enum AnswerDraft {
    MultipleChoice {
        options: [String; OPTION_SLOTS],
        /// Which option is marked correct; nothing marked means option 0.
        correct: Option<usize>,
    },
    FillInTheBlank {
        correct_answer: String,
    },
    TrueFalse {
        correct_answer: Option<bool>,
    },
    ShortAnswer {
        correct_answer: String,
    },
    Matching {
        pairs: [(String, String); MATCHING_SLOTS],
    },
    Ordering {
        items: [String; ORDERING_SLOTS],
    },
}

impl AnswerDraft {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerDraft::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            AnswerDraft::FillInTheBlank { .. } => QuestionKind::FillInTheBlank,
            AnswerDraft::TrueFalse { .. } => QuestionKind::TrueFalse,
            AnswerDraft::ShortAnswer { .. } => QuestionKind::ShortAnswer,
            AnswerDraft::Matching { .. } => QuestionKind::Matching,
            AnswerDraft::Ordering { .. } => QuestionKind::Ordering,
        }
    }
}

/// Binds the store's current record to one edit/save cycle. Owned by the
/// top-level controller for the duration of the interaction; the controller
/// persists and re-renders after each committed mutation.
pub struct EditorSession<'a> {
    store: &'a mut QuestionStore,
}

impl<'a> EditorSession<'a> {
    pub fn new(store: &'a mut QuestionStore) -> Self {
        EditorSession { store }
    }

    pub fn current(&mut self) -> &mut QuestionRecord {
        self.store.current_or_create()
    }

    /// Applies the draft to the current record. A type change happens first
    /// and discards the old type's payload; the draft values are then
    /// written verbatim, trimmed of surrounding whitespace.
    pub fn commit(&mut self, draft: Draft) {
        let record = self.store.current_or_create();
        if record.kind() != draft.answer.kind() {
            record.switch_kind(draft.answer.kind());
        }

        record.reading.text = draft.reading_text.trim().to_string();
        record.question.text = draft.question_text.trim().to_string();

        match draft.answer {
            AnswerDraft::MultipleChoice { options, correct } => {
                if let Answer::MultipleChoice {
                    options: slots,
                    correct: marked,
                } = &mut record.answer
                {
                    for (slot, text) in slots.iter_mut().zip(options) {
                        slot.text = text.trim().to_string();
                    }
                    *marked = correct.filter(|index| *index < OPTION_SLOTS).unwrap_or(0);
                }
            }
            AnswerDraft::FillInTheBlank { correct_answer } => {
                if let Answer::FillInTheBlank { correct_answer: slot } = &mut record.answer {
                    *slot = correct_answer.trim().to_string();
                }
            }
            AnswerDraft::TrueFalse { correct_answer } => {
                if let Answer::TrueFalse { correct_answer: slot } = &mut record.answer {
                    *slot = correct_answer.unwrap_or(true);
                }
            }
            AnswerDraft::ShortAnswer { correct_answer } => {
                if let Answer::ShortAnswer { correct_answer: slot } = &mut record.answer {
                    *slot = correct_answer.trim().to_string();
                }
            }
            AnswerDraft::Matching { pairs } => {
                if let Answer::Matching { prompts, answers } = &mut record.answer {
                    prompts.clear();
                    answers.clear();
                    // a pair survives only when both sides are non-empty
                    for (prompt, answer) in &pairs {
                        let prompt = prompt.trim();
                        let answer = answer.trim();
                        if !prompt.is_empty() && !answer.is_empty() {
                            prompts.push(prompt.to_string());
                            answers.push(answer.to_string());
                        }
                    }
                }
            }
            AnswerDraft::Ordering { items: drafted } => {
                if let Answer::Ordering { items } = &mut record.answer {
                    items.clear();
                    for item in &drafted {
                        let item = item.trim();
                        if !item.is_empty() {
                            items.push(item.to_string());
                        }
                    }
                }
            }
        }
    }

    /// Commit, then insert a fresh default question right after the cursor
    /// and move to it.
    pub fn commit_and_add_new(&mut self, draft: Draft) {
        self.commit(draft);
        let next = self.store.cursor() + 1;
        self.store.insert_at(Some(next), QuestionRecord::default());
    }
}
