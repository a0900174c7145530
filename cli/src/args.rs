use clap::builder::{PossibleValue, PossibleValuesParser};
use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use privnote_shared::Expiry;
use std::path::PathBuf;

/// Share one-time-read secrets via privnote.com.
///
/// The note is read from a pipe or a file and encrypted on this machine. Only
/// the ciphertext is sent. Unless you choose a password, a random one is
/// generated and appended to the printed link after `#`, which browsers never
/// send to the server.
///
/// Settings come from flags, then PRIVNOTE_* environment variables, then the
/// config file (~/.privnote unless --config-file is given), then defaults.
#[derive(Parser, Debug)]
#[command(name = "privnote", author, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub note: NoteArgs,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct NoteArgs {
    /// Do not warn the reader that the note will be destroyed once opened
    #[arg(long)]
    pub do_not_prompt: bool,

    /// Destroy the note automatically after this period
    #[arg(
        short,
        long,
        value_name = "PERIOD",
        ignore_case = true,
        value_parser = expiry_values()
    )]
    pub expires: Option<String>,

    /// File to encrypt and store, piped input takes priority
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Config file to read instead of ~/.privnote
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Email to notify when the note is opened
    #[arg(long, value_name = "EMAIL")]
    pub notify_email: Option<String>,

    /// Reference included in the open notification
    #[arg(long, value_name = "TEXT")]
    pub notify_reference: Option<String>,

    /// Ask for a password the reader must enter to open the note
    ///
    /// The password is typed without echo and never appears in the link.
    #[arg(short, long)]
    pub password: bool,
}

fn expiry_values() -> PossibleValuesParser {
    PossibleValuesParser::new(
        Expiry::tokens().map(|(token, usage)| PossibleValue::new(token).help(usage)),
    )
}
