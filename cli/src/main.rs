mod args;
mod config;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use privnote_core::{
    HttpNoteService, NoteRequest, OpensslCompat, Password, Pipeline, is_pipe_or_file, read_note,
};
use std::io;
use std::process::ExitCode;
use zeroize::Zeroizing;

use crate::args::{Cli, Command};
use crate::config::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<()> {
    if let Some(Command::Completion { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "privnote", &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::resolve(&cli.note)?;

    let pipeline = Pipeline::new(OpensslCompat, HttpNoteService::privnote()?);
    pipeline.preflight()?;

    let stdin = io::stdin();
    let piped = is_pipe_or_file(&stdin).then(|| stdin.lock());
    let content = read_note(piped, settings.file.as_deref())?;

    let manual = if settings.prompt_password {
        Some(prompt_password()?)
    } else {
        settings.password
    };

    let request = NoteRequest {
        content,
        password: Password::manual_or_generated(manual)?,
        expiry: settings.expiry,
        dont_ask: settings.do_not_prompt,
        notify_email: settings.notify_email,
        notify_reference: settings.notify_reference,
    };

    let link = pipeline.submit(&request)?;

    println!("{link}");

    Ok(())
}

/// Ask on the terminal with echo disabled. Works while stdin is a pipe.
fn prompt_password() -> Result<Zeroizing<String>> {
    eprintln!("Please enter your desired password!");
    let password =
        Zeroizing::new(rpassword::prompt_password("Password: ").context("failed to read password")?);

    if password.is_empty() {
        bail!("the password must not be empty");
    }

    Ok(password)
}
