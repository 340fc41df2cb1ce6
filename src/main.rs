/*!
# EntryIt command-line interface

A thin binary over the `entryit` library: it loads configuration, installs
logging, opens the database and runs one subcommand on a tokio runtime.

## Usage

```text
entryit [OPTIONS] <COMMAND>

Commands:
  signup       Create an account
  write        Create or update today's entry
  show         Show today's entry, or the entry with --id
  delete       Delete today's entry
  list         Search and page through entries
  unlock       Check an entry's unlock password
  moods        List the mood catalog
  tags         List the tag catalog
  add-tag      Add a custom tag
  mood-stats   Mood counts over a date range
  word-stats   Word counts per entry over a date range
  calendar     Days with an entry in a month of the current year
  export       Export one entry, or every unlocked entry in a range
  streak       Show the current and longest streak

Options:
      --db <DB>                  Path to the database file (overrides ENTRYIT_DB)
  -u, --user <USER>              Username or email to act as
      --log-format <LOG_FORMAT>  Log output format: text or json
  -v, --verbose                  Print verbose output
```

## Configuration

- `ENTRYIT_DB`: database file (defaults to `~/.local/share/entryit/entryit.db`)
- `ENTRYIT_LOG_FORMAT`: `text` or `json`
- `RUST_LOG`: log filter
- `ENTRYIT_PASSWORD` / `ENTRYIT_LOCK_PASSWORD`: skip the password prompts
*/

use clap::Parser;
use entryit::cli::{commands, CliArgs};
use entryit::config::Config;
use entryit::errors::AppResult;
use entryit::{logging, EntryIt};
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Coordinates one invocation:
/// 1. Loads configuration and applies CLI overrides
/// 2. Initializes logging
/// 3. Opens the database on a tokio runtime
/// 4. Runs the subcommand
fn run(args: CliArgs) -> AppResult<()> {
    let mut config = Config::load()?;
    if let Some(db) = &args.db {
        config.db_path = Config::expand_path(db)?;
    }
    if let Some(format) = &args.log_format {
        config.log_format = format.parse()?;
    }
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    config.validate()?;

    logging::init(config.log_format, &config.log_level)?;
    info!("Starting entryit");
    debug!("Configuration: {:?}", config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let app = EntryIt::open(&config)?;
        commands::execute(&app, args.command, args.user).await
    })
}
