use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;
use log::error;
use text_io::read;

use crate::libmondai::archive;
use crate::libmondai::db::Storage;
use crate::libmondai::question::{
    Answer, QuestionKind, QuestionRecord, MATCHING_SLOTS, OPTION_SLOTS, ORDERING_SLOTS,
};
use crate::libmondai::session::{AnswerDraft, Draft, EditorSession};
use crate::libmondai::store::QuestionStore;
use crate::libmondai::Error;
use crate::Command;

pub fn editor_loop(storage: &Storage, store: &mut QuestionStore) {
    render_list(store);
    println!("{}", "Type 'help' for the command list, 'q' to quit.".cyan());

    loop {
        let line = prompt("mondai>".cyan());
        match Command::parse(&line) {
            Command::Nothing => {}
            Command::List => render_list(store),
            Command::Show => render_detail(store.current_or_create()),
            Command::Edit(number) => {
                let index = number - 1;
                if index < store.len() {
                    edit_question(store, index);
                    persist(storage, store);
                    render_list(store);
                } else {
                    refuse_index(number);
                }
            }
            Command::New(position) => {
                store.insert_at(position, QuestionRecord::default());
                persist(storage, store);
                render_list(store);
            }
            Command::Duplicate(number) => {
                let index = number - 1;
                if index < store.len() {
                    store.duplicate_at(index);
                    persist(storage, store);
                    render_list(store);
                } else {
                    refuse_index(number);
                }
            }
            Command::Delete(number) => {
                let index = number - 1;
                if index >= store.len() {
                    refuse_index(number);
                } else if store.len() <= 1 {
                    println!("{}", Error::SoleQuestion.to_string().red());
                } else {
                    let confirmed = confirm(format!("Delete question {}?", number));
                    match store.delete_at(index, confirmed) {
                        Ok(()) => {
                            if confirmed {
                                persist(storage, store);
                                render_list(store);
                            }
                        }
                        Err(err) => println!("{}", err.to_string().red()),
                    }
                }
            }
            Command::Move { from, target, after } => {
                if from - 1 < store.len() && target - 1 < store.len() {
                    if store.move_record(from - 1, target - 1, after) {
                        persist(storage, store);
                        render_list(store);
                    }
                } else {
                    println!("{}", "Both positions must be existing questions.".yellow());
                }
            }
            Command::Media { slot, value } => {
                // media lands in storage with the next save
                let blob = if value == "-" { None } else { Some(value) };
                if store.current_or_create().set_media(slot, blob) {
                    println!("{}", "Media slot updated on the current question.".green());
                } else {
                    println!(
                        "{}",
                        "The current question has no such media slot.".yellow()
                    );
                }
            }
            Command::Import(path) => import_file(storage, store, &path),
            Command::Export(path) => export_file(store, &path),
            Command::Reset => {
                if confirm("This will erase all current questions. Continue?") {
                    storage.clear();
                    *store = QuestionStore::new();
                    render_list(store);
                }
            }
            Command::Help => print_help(),
            Command::Quit => {
                println!("{}", "Quitting!".cyan());
                return;
            }
            Command::Unknown => println!(
                "{}",
                "Unknown command. Type 'help' for the command list.".yellow()
            ),
        }
    }
}

fn persist(storage: &Storage, store: &QuestionStore) {
    match archive::to_persistable(store.records(), store.cursor()) {
        Ok(blob) => storage.save(&blob),
        Err(err) => error!("[Store] Failed to serialize questions: {}", err),
    }
}

fn render_list(store: &QuestionStore) {
    println!(
        "{}",
        format!("==========> {} questions <==========", store.len()).cyan()
    );
    for (index, record) in store.records().iter().enumerate() {
        let line = format!("{:>3}. [{}] {}", index + 1, record.kind(), preview(record));
        if index == store.cursor() {
            println!("{}", line.black().on_white());
        } else {
            println!("{}", line);
        }
    }
}

fn preview(record: &QuestionRecord) -> String {
    let text = record.question.text.trim();
    if text.is_empty() {
        return "(empty question)".to_string();
    }
    let short: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        format!("{}...", short)
    } else {
        short
    }
}

fn render_detail(record: &QuestionRecord) {
    println!("{} {}", "Type:".bold(), record.kind());
    println!(
        "{} {}{}",
        "Reading:".bold(),
        record.reading.text,
        media_markers(&[
            ("image", &record.reading.image),
            ("audio", &record.reading.audio)
        ])
    );
    println!(
        "{} {}{}",
        "Question:".bold(),
        record.question.text,
        media_markers(&[("image", &record.question.image)])
    );
    match &record.answer {
        Answer::MultipleChoice { options, correct } => {
            for (index, option) in options.iter().enumerate() {
                let marker = if index == *correct { "*" } else { " " };
                println!(
                    "  {} {}. {}{}",
                    marker.green(),
                    index + 1,
                    option.text,
                    media_markers(&[("image", &option.image)])
                );
            }
        }
        Answer::FillInTheBlank { correct_answer } | Answer::ShortAnswer { correct_answer } => {
            println!("{} {}", "Answer:".bold(), correct_answer)
        }
        Answer::TrueFalse { correct_answer } => {
            println!("{} {}", "Answer:".bold(), correct_answer)
        }
        Answer::Matching { prompts, answers } => {
            for (prompt, answer) in prompts.iter().zip(answers) {
                println!("  {} -> {}", prompt, answer);
            }
        }
        Answer::Ordering { items } => {
            for (index, item) in items.iter().enumerate() {
                println!("  {}. {}", index + 1, item);
            }
        }
    }
}

fn media_markers(slots: &[(&str, &Option<String>)]) -> String {
    let mut markers = String::new();
    for (name, value) in slots {
        if value.is_some() {
            markers.push_str(&format!(" [{}]", name));
        }
    }
    markers
}

fn edit_question(store: &mut QuestionStore, index: usize) {
    store.select(index);
    let mut session = EditorSession::new(store);
    let current = session.current().clone();
    println!("{}", format!("--- Editing question {} ---", index + 1).cyan());
    render_detail(&current);
    println!("{}", "Enter keeps the shown value, '-' clears it.".cyan());

    let kind = prompt_kind(current.kind());
    let reading_text = prompt_field("Reading text", &current.reading.text);
    let question_text = prompt_field("Question text", &current.question.text);
    let answer = prompt_answer(kind, &current);

    let draft = Draft {
        reading_text,
        question_text,
        answer,
    };
    if confirm("Save and add a new question right after?") {
        session.commit_and_add_new(draft);
    } else {
        session.commit(draft);
    }
}

fn prompt(label: impl fmt::Display) -> String {
    print!("{} ", label);
    io::stdout().flush().ok();
    let line: String = read!("{}\n");
    line
}

/// Enter keeps the current value, a single "-" clears it.
fn prompt_field(label: &str, current: &str) -> String {
    let input = prompt(format!("{} [{}]:", label, current).cyan());
    match input.trim() {
        "" => current.to_string(),
        "-" => String::new(),
        other => other.to_string(),
    }
}

fn prompt_kind(current: QuestionKind) -> QuestionKind {
    let tags: Vec<&str> = QuestionKind::ALL.iter().map(QuestionKind::tag).collect();
    println!("{}", format!("Types: {}", tags.join(", ")).cyan());
    let input = prompt(format!("Type [{}]:", current).cyan());
    let input = input.trim();
    if input.is_empty() {
        return current;
    }
    match QuestionKind::ALL.iter().find(|kind| kind.tag() == input) {
        Some(kind) => *kind,
        None => {
            println!("{}", "Unknown type, keeping the current one.".yellow());
            current
        }
    }
}

fn prompt_correct(current: Option<usize>) -> Option<usize> {
    let fallback = match current {
        Some(index) => (index + 1).to_string(),
        None => String::new(),
    };
    let input = prompt(format!("Correct option (1-{}) [{}]:", OPTION_SLOTS, fallback).cyan());
    let input = input.trim();
    if input.is_empty() {
        return current;
    }
    match input.parse::<usize>() {
        Ok(number) if (1..=OPTION_SLOTS).contains(&number) => Some(number - 1),
        _ => {
            println!(
                "{}",
                format!("There are only {} options available!", OPTION_SLOTS).bright_red()
            );
            current
        }
    }
}

fn prompt_bool(current: Option<bool>) -> Option<bool> {
    let fallback = match current {
        Some(false) => "false",
        _ => "true",
    };
    let input = prompt(format!("Correct answer (true/false) [{}]:", fallback).cyan());
    match input.trim() {
        "" => current,
        "t" | "true" => Some(true),
        "f" | "false" => Some(false),
        _ => {
            println!(
                "{}",
                "Expected true or false, keeping the current answer.".yellow()
            );
            current
        }
    }
}

fn prompt_answer(kind: QuestionKind, current: &QuestionRecord) -> AnswerDraft {
    match kind {
        QuestionKind::MultipleChoice => {
            let (current_options, current_correct) = match &current.answer {
                Answer::MultipleChoice { options, correct } => (
                    options
                        .iter()
                        .map(|option| option.text.clone())
                        .collect::<Vec<_>>(),
                    Some(*correct),
                ),
                _ => (Vec::new(), None),
            };
            let mut options: [String; OPTION_SLOTS] = Default::default();
            for (index, option) in options.iter_mut().enumerate() {
                let fallback = current_options.get(index).cloned().unwrap_or_default();
                *option = prompt_field(&format!("Option {}", index + 1), &fallback);
            }
            AnswerDraft::MultipleChoice {
                options,
                correct: prompt_correct(current_correct),
            }
        }
        QuestionKind::FillInTheBlank => {
            let fallback = match &current.answer {
                Answer::FillInTheBlank { correct_answer } => correct_answer.clone(),
                _ => String::new(),
            };
            AnswerDraft::FillInTheBlank {
                correct_answer: prompt_field("Correct answer", &fallback),
            }
        }
        QuestionKind::TrueFalse => {
            let fallback = match &current.answer {
                Answer::TrueFalse { correct_answer } => Some(*correct_answer),
                _ => None,
            };
            AnswerDraft::TrueFalse {
                correct_answer: prompt_bool(fallback),
            }
        }
        QuestionKind::ShortAnswer => {
            let fallback = match &current.answer {
                Answer::ShortAnswer { correct_answer } => correct_answer.clone(),
                _ => String::new(),
            };
            AnswerDraft::ShortAnswer {
                correct_answer: prompt_field("Correct answer", &fallback),
            }
        }
        QuestionKind::Matching => {
            let (current_prompts, current_answers) = match &current.answer {
                Answer::Matching { prompts, answers } => (prompts.clone(), answers.clone()),
                _ => (Vec::new(), Vec::new()),
            };
            let mut pairs: [(String, String); MATCHING_SLOTS] = Default::default();
            for (index, pair) in pairs.iter_mut().enumerate() {
                let prompt_fallback = current_prompts.get(index).cloned().unwrap_or_default();
                let answer_fallback = current_answers.get(index).cloned().unwrap_or_default();
                pair.0 = prompt_field(&format!("Match prompt {}", index + 1), &prompt_fallback);
                pair.1 = prompt_field(&format!("Match answer {}", index + 1), &answer_fallback);
            }
            AnswerDraft::Matching { pairs }
        }
        QuestionKind::Ordering => {
            let current_items = match &current.answer {
                Answer::Ordering { items } => items.clone(),
                _ => Vec::new(),
            };
            let mut items: [String; ORDERING_SLOTS] = Default::default();
            for (index, item) in items.iter_mut().enumerate() {
                let fallback = current_items.get(index).cloned().unwrap_or_default();
                *item = prompt_field(&format!("Item {}", index + 1), &fallback);
            }
            AnswerDraft::Ordering { items }
        }
    }
}

fn confirm(message: impl fmt::Display) -> bool {
    let input = prompt(format!("{} [y/N]:", message).yellow());
    matches!(input.trim(), "y" | "Y" | "yes")
}

fn refuse_index(number: usize) {
    println!("{}", Error::OutOfBounds(number).to_string().red());
}

fn import_file(storage: &Storage, store: &mut QuestionStore, path: &Path) {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            println!("{}", format!("Cannot read {:?}: {}", path, err).red());
            return;
        }
    };
    match archive::from_import_file(&raw) {
        Ok(records) => {
            let count = records.len();
            store.replace(records);
            store.current_or_create();
            persist(storage, store);
            render_list(store);
            println!("{}", format!("Imported {} questions.", count).green());
        }
        Err(err) => println!("{}", err.to_string().red()),
    }
}

fn export_file(store: &QuestionStore, path: &Path) {
    if store.records().is_empty() {
        println!("{}", "No questions to export!".yellow());
        return;
    }
    match archive::to_exportable(store.records()) {
        Ok(doc) => match fs::write(path, doc) {
            Ok(()) => println!(
                "{}",
                format!("Exported {} questions to {:?}.", store.len(), path).green()
            ),
            Err(err) => println!("{}", format!("Cannot write {:?}: {}", path, err).red()),
        },
        Err(err) => {
            error!("[Store] Failed to serialize questions: {}", err);
            println!("{}", "Export failed.".red());
        }
    }
}

fn print_help() {
    println!(
        "{}",
        "Commands:
  list                          show the question list
  show                          show the current question in full
  edit <n>                      edit question n
  new [n]                       add a question at the end, or insert one after question n
  dup <n>                       duplicate question n
  del <n>                       delete question n
  move <from> <target> [after]  move a question before (or after) the target position
  img reading|question <ref>    attach an image to the current question ('-' clears)
  img opt <n> <ref>             attach an image to option n (multiple-choice only)
  audio <ref>                   attach reading audio to the current question ('-' clears)
  import <file>                 replace all questions from a JSON file
  export [file]                 export the questions to a JSON file
  reset                         delete all questions and start over
  q                             quit"
            .cyan()
    );
}
