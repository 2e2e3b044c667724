use std::{
    ffi::OsString,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use crate::{
    batch::{FileOutcome, FileReport, ImportSession},
    config::{DEFAULT_SERVER_URL, DEFAULT_SETTINGS_FILE, ImportConfig, ServerUrl},
    http::{client::ApiClient, error::LinkError},
    importer::{ImportDispatcher, ParserRegistry, error::ImportError},
    link::{link_account, require_linked},
    settings::{Settings, SettingsStore, error::SettingsError},
};

const EXIT_OK: u8 = 0;
/// Exit status for a refused link code
const EXIT_LINK_FAILED: u8 = 1;
/// Exit status for transport and I/O faults
const EXIT_FATAL: u8 = 2;

/// Single-dash spellings kept from older releases, mapped to their long flag
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-am", "--add-missing"),
    ("-ha", "--hash"),
    ("-xt", "--m3u-ext"),
];

#[derive(Parser, Debug)]
#[command(name = "playlstr-import")]
#[command(version)]
#[command(about = "Import playlist to playlstr")]
pub struct Cli {
    /// Playlists to import
    pub playlists: Vec<PathBuf>,

    /// Add tracks whose local file doesn't exist (also -am)
    #[arg(long)]
    pub add_missing: bool,

    /// Use file hashes for track matching (also -ha)
    #[arg(long)]
    pub hash: bool,

    /// Website url
    #[arg(long, env = "PLAYLSTR_URL", default_value = DEFAULT_SERVER_URL)]
    pub url: String,

    /// Link with account, using a code from the website's link page
    #[arg(short, long, value_name = "CODE")]
    pub link: Option<String>,

    /// Use duration, artist, and track information from extended m3u instead of file metadata (also -xt)
    #[arg(long)]
    pub m3u_ext: bool,

    /// File to load settings from
    #[arg(short, long, env = "PLAYLSTR_SETTINGS", default_value = DEFAULT_SETTINGS_FILE)]
    pub settings_file: PathBuf,

    /// Clear a malformed settings file without asking
    #[arg(long)]
    pub reset_corrupt_settings: bool,
}

impl Cli {
    pub fn import_config(&self) -> ImportConfig {
        ImportConfig {
            add_missing: self.add_missing,
            hash: self.hash,
            prefer_ext_metadata: self.m3u_ext,
        }
    }
}

/// Rewrites legacy single-dash flags so clap does not read them as bundled short flags.
///
/// Arguments after `--` are positional and kept as they are.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(|arg| {
            if positional_only {
                return arg;
            }
            if arg.to_str() == Some("--") {
                positional_only = true;
                return arg;
            }
            LEGACY_FLAGS
                .iter()
                .find(|(legacy, _)| arg.to_str() == Some(*legacy))
                .map(|(_, long)| OsString::from(*long))
                .unwrap_or(arg)
        })
        .collect()
}

/// Entrypoint for CLI
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    info!("{cli:?}");

    match try_run(&cli, &mut io::stdin().lock(), ApiClient::new) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            error!("{e:?}");
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Runs the import, returning the process exit status
fn try_run<F>(cli: &Cli, input: &mut impl BufRead, connect: F) -> anyhow::Result<u8>
where
    F: FnOnce(ServerUrl) -> Result<ApiClient, reqwest::Error>,
{
    let link_code = cli.link.as_deref().filter(|code| !code.is_empty());
    if cli.playlists.is_empty() && link_code.is_none() {
        println!("Specify at least one playlist for importing");
        return Ok(EXIT_OK);
    }

    let server = ServerUrl::parse(&cli.url)?;
    let store = SettingsStore::new(&cli.settings_file);

    let Some(mut settings) = load_settings(&store, cli.reset_corrupt_settings, input)? else {
        return Ok(EXIT_OK);
    };

    let client = connect(server.clone()).context("failed to set up http client")?;

    if let Some(code) = link_code {
        match link_account(&client, &store, &mut settings, code) {
            Ok(()) => println!("Link successful"),
            Err(LinkError::Rejected { body, .. }) => {
                println!("Error linking account ({body}).");
                return Ok(EXIT_LINK_FAILED);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if cli.playlists.is_empty() {
        println!("Specify at least one playlist for importing");
        return Ok(EXIT_OK);
    }

    let account = match require_linked(&settings) {
        Ok(account) => account,
        Err(_) => {
            println!(
                "No account linked. Get a link code from {} and run {} -l [code]",
                server.link_help_url(),
                program_name()
            );
            return Ok(EXIT_OK);
        }
    };

    let dispatcher = ImportDispatcher::new(ParserRegistry::with_defaults(), cli.import_config());
    let session = ImportSession::new(&dispatcher, &client, account);
    session.run(&cli.playlists, |report| {
        println!("{}", describe_report(report, &dispatcher))
    })?;

    Ok(EXIT_OK)
}

/// Loads settings, offering to clear a malformed file.
///
/// Returns `None` when the user keeps the malformed file, nothing is changed then.
fn load_settings(
    store: &SettingsStore,
    reset_without_asking: bool,
    input: &mut impl BufRead,
) -> anyhow::Result<Option<Settings>> {
    match store.load() {
        Ok(settings) => Ok(Some(settings)),
        Err(e @ SettingsError::Decode { .. }) => {
            error!("{e}");
            let path = store.path().display();
            if !reset_without_asking {
                print!("Error loading settings from {path} (malformed file). Delete {path} to fix this? (y/N) ");
                io::stdout().flush()?;
                if !confirmed(input)? {
                    return Ok(None);
                }
            }
            Ok(Some(store.reset()?))
        }
        Err(e) => Err(e.into()),
    }
}

fn confirmed(input: &mut impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn describe_report(report: &FileReport, dispatcher: &ImportDispatcher) -> String {
    let path = report.path.display();
    match &report.outcome {
        FileOutcome::Imported { url, tracks, .. } => {
            format!("Imported {path} to {url} ({tracks} tracks)")
        }
        FileOutcome::Skipped(e @ ImportError::UnsupportedFormat { .. }) => format!(
            "Skipping {path}: {e}, supported: {}",
            dispatcher.registry().formats().join(", ")
        ),
        FileOutcome::Skipped(e) => format!("Skipping {path}: {e}"),
        FileOutcome::Rejected(e) => format!("Error adding {path}: {e}"),
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "playlstr-import".to_string())
}
