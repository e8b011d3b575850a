use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};

mod libmondai;

use crate::libmondai::archive;
use crate::libmondai::db::Storage;

#[derive(Parser, Debug)]
#[command(name = "入出力者 (Nyūshutsuryokusha)")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = "questions.db")]
    db: Option<PathBuf>,

    json: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Import,
    Export,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let json_file = match args.json {
        Some(f) => f,
        None => {
            error!("{}", "Question file not specified!".red());
            exit(1);
        }
    };
    let db_path = args.db.unwrap_or(PathBuf::from("questions.db"));
    info!(
        "{}",
        format!("File at {:?} and Database at {:?}", json_file, db_path).cyan()
    );
    let storage = match Storage::create_or_open(&db_path) {
        Ok(s) => s,
        Err(e) => {
            error!("{}{}", "Unable to open Database: ".red(), e);
            exit(1);
        }
    };

    let ok = match args.command {
        Commands::Import => import(&storage, &json_file),
        Commands::Export => export(&storage, &json_file),
    };

    storage.close();
    if !ok {
        exit(1);
    }
}

fn import(storage: &Storage, json_file: &Path) -> bool {
    let raw = match std::fs::read_to_string(json_file) {
        Ok(raw) => raw,
        Err(err) => {
            error!("{}", format!("Cannot read {:?}: {}!", json_file, err).red());
            return false;
        }
    };
    let records = match archive::from_import_file(&raw) {
        Ok(records) => records,
        Err(err) => {
            error!("{}", format!("Malformed question file: {}!", err).red());
            return false;
        }
    };

    info!(
        "{}",
        format!("Importing data... ({} Questions)", records.len()).blue()
    );
    for (index, record) in records.iter().enumerate() {
        info!(
            "{} {}",
            "├".blue(),
            format!(
                "Question {}: [{}] {:?}",
                index + 1,
                record.kind(),
                record.question.text
            )
            .green()
        );
    }

    // imported state always starts back at the first question
    match archive::to_persistable(&records, 0) {
        Ok(blob) => {
            storage.save(&blob);
            info!("{}", format!("Imported {} questions.", records.len()).blue());
            true
        }
        Err(err) => {
            error!("{}", format!("Cannot store questions: {}!", err).red());
            false
        }
    }
}

fn export(storage: &Storage, json_file: &Path) -> bool {
    let blob = match storage.load() {
        Some(blob) => blob,
        None => {
            error!("{}", "No saved questions to export!".red());
            return false;
        }
    };
    let (records, _) = match archive::from_persistable(&blob) {
        Ok(parts) => parts,
        Err(err) => {
            error!("{}", format!("Saved questions are corrupt: {}!", err).red());
            return false;
        }
    };
    if records.is_empty() {
        error!("{}", "No questions to export!".red());
        return false;
    }

    let doc = match archive::to_exportable(&records) {
        Ok(doc) => doc,
        Err(err) => {
            error!("{}", format!("Cannot serialize questions: {}!", err).red());
            return false;
        }
    };
    match std::fs::write(json_file, doc) {
        Ok(()) => {
            info!(
                "{}",
                format!("Exported {} questions to {:?}.", records.len(), json_file).blue()
            );
            true
        }
        Err(err) => {
            error!("{}", format!("Cannot write {:?}: {}!", json_file, err).red());
            false
        }
    }
}
