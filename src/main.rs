use clap::Parser;
use env_logger::Env;
use log::{debug, warn};
use std::path::PathBuf;

mod cli;
mod libmondai;

use crate::libmondai::archive;
use crate::libmondai::db::Storage;
use crate::libmondai::question::MediaSlot;
use crate::libmondai::store::QuestionStore;
use crate::libmondai::Error;

#[derive(Parser, Debug)]
#[command(name = "問題作ろう！ (Mondaitsukurō!)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "questions.db")]
    db: Option<PathBuf>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, PartialEq)]
enum Command {
    Nothing,
    List,
    Show,
    Edit(usize),
    New(Option<usize>),
    Duplicate(usize),
    Delete(usize),
    Move {
        from: usize,
        target: usize,
        after: bool,
    },
    Media {
        slot: MediaSlot,
        value: String,
    },
    Import(PathBuf),
    Export(PathBuf),
    Reset,
    Help,
    Quit,
    Unknown,
}

impl Command {
    /// Question positions are 1-based on the command line.
    fn parse(input: &str) -> Command {
        let mut words = input.split_whitespace();
        let head = match words.next() {
            None => return Command::Nothing,
            Some(word) => word,
        };
        match head {
            "list" | "ls" => Command::List,
            "show" => Command::Show,
            "edit" | "e" => match Self::number(words.next()) {
                Some(number) => Command::Edit(number),
                None => Command::Unknown,
            },
            "new" => match words.next() {
                None => Command::New(None),
                Some(word) => match word.parse() {
                    Ok(position) => Command::New(Some(position)),
                    Err(_) => Command::Unknown,
                },
            },
            "dup" => match Self::number(words.next()) {
                Some(number) => Command::Duplicate(number),
                None => Command::Unknown,
            },
            "del" | "rm" => match Self::number(words.next()) {
                Some(number) => Command::Delete(number),
                None => Command::Unknown,
            },
            "move" | "mv" => {
                let from = Self::number(words.next());
                let target = Self::number(words.next());
                let after = matches!(words.next(), Some("after"));
                match (from, target) {
                    (Some(from), Some(target)) => Command::Move { from, target, after },
                    _ => Command::Unknown,
                }
            }
            "img" => {
                let slot = match words.next() {
                    Some("reading") => MediaSlot::ReadingImage,
                    Some("question") => MediaSlot::QuestionImage,
                    Some("opt") => match Self::number(words.next()) {
                        Some(number) => MediaSlot::OptionImage(number - 1),
                        None => return Command::Unknown,
                    },
                    _ => return Command::Unknown,
                };
                Self::media(slot, words)
            }
            "audio" => Self::media(MediaSlot::ReadingAudio, words),
            "import" => match words.next() {
                Some(path) => Command::Import(PathBuf::from(path)),
                None => Command::Unknown,
            },
            "export" => {
                Command::Export(PathBuf::from(words.next().unwrap_or("quiz_questions.json")))
            }
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => Command::Unknown,
        }
    }

    fn number(word: Option<&str>) -> Option<usize> {
        word.and_then(|word| word.parse::<usize>().ok())
            .filter(|number| *number >= 1)
    }

    fn media<'a>(slot: MediaSlot, words: impl Iterator<Item = &'a str>) -> Command {
        let value = words.collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            Command::Unknown
        } else {
            Command::Media { slot, value }
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let db_path = args.db.unwrap_or(PathBuf::from("questions.db"));
    let storage = Storage::create_or_open(&db_path)?;
    debug!("[DB] Database Connection Successful!");

    let mut store = restore(&storage);
    store.current_or_create();

    cli::editor_loop(&storage, &mut store);

    storage.close();
    Ok(())
}

fn restore(storage: &Storage) -> QuestionStore {
    let blob = match storage.load() {
        Some(blob) => blob,
        None => return QuestionStore::new(),
    };
    match archive::from_persistable(&blob) {
        Ok((records, cursor)) => QuestionStore::from_parts(records, cursor),
        Err(err) => {
            warn!("[Store] Discarding unreadable saved questions: {}", err);
            storage.clear();
            QuestionStore::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_one_based_positions() {
        assert_eq!(Command::parse("edit 3"), Command::Edit(3));
        assert_eq!(Command::parse("  del 1 "), Command::Delete(1));
        assert_eq!(Command::parse("edit 0"), Command::Unknown);
        assert_eq!(Command::parse("edit"), Command::Unknown);
        assert_eq!(Command::parse("new"), Command::New(None));
        assert_eq!(Command::parse("new 2"), Command::New(Some(2)));
    }

    #[test]
    fn move_accepts_an_optional_after_flag() {
        assert_eq!(
            Command::parse("move 1 3"),
            Command::Move {
                from: 1,
                target: 3,
                after: false
            }
        );
        assert_eq!(
            Command::parse("mv 2 1 after"),
            Command::Move {
                from: 2,
                target: 1,
                after: true
            }
        );
        assert_eq!(Command::parse("move 2"), Command::Unknown);
    }

    #[test]
    fn media_commands_target_a_slot() {
        assert_eq!(
            Command::parse("img opt 2 data:image/png;base64,abc"),
            Command::Media {
                slot: MediaSlot::OptionImage(1),
                value: "data:image/png;base64,abc".to_string()
            }
        );
        assert_eq!(
            Command::parse("audio -"),
            Command::Media {
                slot: MediaSlot::ReadingAudio,
                value: "-".to_string()
            }
        );
        assert_eq!(Command::parse("img reading"), Command::Unknown);
    }
}
