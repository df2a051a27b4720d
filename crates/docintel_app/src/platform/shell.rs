use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use docintel_core::{DocumentId, ExportFormat, Phase, SummaryLength, SummaryType};
use docintel_logging::docintel_warn;

use super::app::Session;

const HELP: &str = "\
Commands:
  upload <path>              process a PDF, PNG or JPEG file
  summarize [type] [length]  summarize the current text
                             types: standard bullet executive detailed qa topics fast
                             lengths: short medium long
  analyze                    analyze the current text
  export <pdf|docx|md|txt>   export the summary (or the text)
  history [query]            list saved documents, or search them
  open <id>                  show a saved document
  delete <id>                delete a saved document
  close                      stop showing the saved document
  stats                      show aggregate statistics
  reset                      clear the current document
  dismiss                    clear the error banner
  status                     show the current phase and document
  help                       show this help
  quit                       leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShellCommand {
    Upload(PathBuf),
    Summarize {
        summary_type: Option<SummaryType>,
        length: Option<SummaryLength>,
    },
    Analyze,
    Export(ExportFormat),
    History(Option<String>),
    Open(DocumentId),
    Delete(DocumentId),
    Close,
    Stats,
    Reset,
    Dismiss,
    Status,
    Help,
    Quit,
}

pub(crate) fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "upload" | "process" => {
            if rest.is_empty() {
                return Err("usage: upload <path>".to_string());
            }
            ShellCommand::Upload(PathBuf::from(rest))
        }
        "summarize" => {
            let mut summary_type = None;
            let mut length = None;
            for arg in &args {
                if let Ok(parsed) = arg.parse::<SummaryLength>() {
                    length = Some(parsed);
                } else {
                    summary_type = Some(arg.parse::<SummaryType>().map_err(|e| e.to_string())?);
                }
            }
            ShellCommand::Summarize {
                summary_type,
                length,
            }
        }
        "analyze" => ShellCommand::Analyze,
        "export" => {
            let format = args.first().copied().unwrap_or("pdf");
            ShellCommand::Export(format.parse::<ExportFormat>().map_err(|e| e.to_string())?)
        }
        "history" | "search" => {
            ShellCommand::History(Some(rest.to_string()).filter(|query| !query.is_empty()))
        }
        "open" | "show" => ShellCommand::Open(parse_id(&args)?),
        "delete" => ShellCommand::Delete(parse_id(&args)?),
        "close" => ShellCommand::Close,
        "stats" => ShellCommand::Stats,
        "reset" => ShellCommand::Reset,
        "dismiss" => ShellCommand::Dismiss,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command {other:?}; type `help`")),
    };
    Ok(Some(command))
}

fn parse_id(args: &[&str]) -> Result<DocumentId, String> {
    args.first()
        .ok_or_else(|| "a document id is required".to_string())?
        .parse()
        .map_err(|_| "document ids are numbers".to_string())
}

/// Reads commands from stdin until `quit` or end of input.
pub fn run(session: &mut Session) -> Result<()> {
    println!("docintel shell, backend {}. Type `help` for commands.", session.base_url());
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("docintel> ");
        io::stdout().flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            return Ok(());
        }
        if let Err(err) = execute(session, command) {
            docintel_warn!("Shell command failed: {:#}", err);
            // Pipeline failures were already shown as a notice.
            if session.phase() != Phase::Error {
                println!("error: {err:#}");
            }
        }
    }
}

fn execute(session: &mut Session, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Upload(path) => {
            session.upload(&path)?;
            session.print_document();
        }
        ShellCommand::Summarize {
            summary_type,
            length,
        } => {
            let preferences = session.preferences();
            session.summarize(
                summary_type.unwrap_or(preferences.summary_type),
                length.unwrap_or(preferences.length),
            )?;
            session.print_document();
        }
        ShellCommand::Analyze => {
            session.analyze()?;
            session.print_document();
        }
        ShellCommand::Export(format) => session.export(format),
        ShellCommand::History(query) => {
            session.refresh_history();
            session.search(query.as_deref().unwrap_or(""));
            session.print_history();
        }
        ShellCommand::Open(id) => {
            session.open(id);
            session.print_document();
        }
        ShellCommand::Delete(id) => session.delete(id),
        ShellCommand::Close => {
            session.close_selection();
            session.print_document();
        }
        ShellCommand::Stats => {
            session.refresh_history();
            session.print_stats();
        }
        ShellCommand::Reset => session.reset(),
        ShellCommand::Dismiss => session.dismiss_error(),
        ShellCommand::Status => {
            session.print_status();
            session.print_document();
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }
    Ok(())
}
