mod cli;
mod platform;

use std::path::Path;

use anyhow::{bail, Result};
use clap::Parser;
use docintel_logging::{docintel_info, docintel_warn};

use cli::{Cli, Command};
use platform::app::Session;
use platform::persistence::load_local_saves;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match cli.command {
        Command::Summarize { .. } | Command::Analyze { .. } => cli.settings.single_step(),
        _ => cli.settings.clone(),
    };
    docintel_logging::initialize(
        settings.log_to.into(),
        settings.log_level.into(),
        settings.log_file.as_deref(),
    );
    docintel_info!("docintel starting: {:?}", cli.command);

    if let Command::LocalSaves = cli.command {
        print_local_saves(&settings.data_dir);
        return Ok(());
    }

    let mut session = Session::new(&settings)?;
    let online = session.check_health();
    if !online {
        docintel_warn!("Backend at {} is not reachable", session.base_url());
    }

    match cli.command {
        Command::Health => {
            if !online {
                bail!("backend at {} is not reachable", session.base_url());
            }
            println!("Backend at {} is healthy.", session.base_url());
        }
        Command::Process { file, export } => {
            session.upload(&file)?;
            session.print_document();
            if let Some(format) = export {
                session.export(format);
            }
        }
        Command::Summarize { file } => {
            let preferences = session.preferences();
            session.upload(&file)?;
            session.summarize(preferences.summary_type, preferences.length)?;
            session.print_document();
        }
        Command::Analyze { file } => {
            session.upload(&file)?;
            session.analyze()?;
            session.print_document();
        }
        Command::History { query } => {
            session.refresh_history();
            session.search(query.as_deref().unwrap_or(""));
            session.print_history();
        }
        Command::Show { id } => {
            session.open(id);
            session.print_document();
        }
        Command::Delete { id } => session.delete(id),
        Command::Stats => {
            session.refresh_history();
            session.print_stats();
        }
        Command::Shell => platform::shell::run(&mut session)?,
        Command::LocalSaves => {}
    }
    Ok(())
}

fn print_local_saves(data_dir: &Path) {
    let saves = load_local_saves(data_dir);
    if saves.is_empty() {
        println!("No local saves in {}.", data_dir.display());
        return;
    }
    for save in saves {
        println!(
            "{}  {:<32} {:<14} {} words of text",
            save.saved_at,
            save.document.filename,
            save.document.summary_type,
            save.document.text.split_whitespace().count()
        );
    }
}
