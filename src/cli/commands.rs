//! Execution of parsed subcommands against the facade.

use crate::app::EntryIt;
use crate::cli::{Command, ExportArgs, ExportFormat, ListArgs, RangeArgs, WriteArgs};
use crate::constants::{DATE_FORMAT_ISO, ENV_VAR_ENTRYIT_LOCK_PASSWORD, ENV_VAR_ENTRYIT_PASSWORD};
use crate::errors::{AppError, AppResult};
use crate::models::{DateRange, JournalSearchFilters, SaveJournalRequest, SignUpRequest};
use crate::ops::export::{DocumentRenderer, JsonRenderer, MarkdownRenderer};
use crate::validation::word_count;
use chrono::Datelike;
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// Reads a secret from `env_var`, falling back to an interactive prompt.
pub fn read_secret(env_var: &str, prompt: &str) -> AppResult<Zeroizing<String>> {
    if let Ok(value) = env::var(env_var) {
        debug!("Using secret from {}", env_var);
        return Ok(Zeroizing::new(value));
    }
    let value = rpassword::prompt_password(prompt)?;
    Ok(Zeroizing::new(value))
}

fn account_password() -> AppResult<Zeroizing<String>> {
    read_secret(ENV_VAR_ENTRYIT_PASSWORD, "Password: ")
}

fn lock_password() -> AppResult<Zeroizing<String>> {
    read_secret(ENV_VAR_ENTRYIT_LOCK_PASSWORD, "Journal lock password: ")
}

fn range(app: &EntryIt, args: RangeArgs) -> DateRange {
    DateRange::new(args.from, args.to.unwrap_or_else(|| app.today()))
}

/// Runs one subcommand, printing results to stdout.
///
/// Every command except `signup`, `moods` and `tags` logs in as `user` first.
pub async fn execute(app: &EntryIt, command: Command, user: Option<String>) -> AppResult<()> {
    let needs_login = !matches!(
        command,
        Command::Signup { .. } | Command::Moods | Command::Tags
    );
    if needs_login {
        let identifier = user.ok_or_else(|| {
            AppError::InvalidArgument("--user is required for this command".to_string())
        })?;
        let password = account_password()?;
        app.login(&identifier, &password).await?;
    }

    let mut out = io::stdout();
    match command {
        Command::Signup {
            full_name,
            email,
            username,
        } => {
            let password = account_password()?;
            let journal_lock_password = lock_password()?;
            let user_id = app
                .sign_up(SignUpRequest {
                    full_name,
                    email,
                    username,
                    password: password.as_str().to_string(),
                    journal_lock_password: journal_lock_password.as_str().to_string(),
                })
                .await?;
            writeln!(out, "Account created: {}", user_id)?;
        }
        Command::Write(args) => write_entry(app, args, &mut out).await?,
        Command::Show { id } => {
            let journal = app.get_journal(id.is_none(), id).await?;
            if journal.is_locked {
                app.unlock_journal(journal.id, &lock_password()?).await?;
            }
            let tags: Vec<&str> = journal.tags.iter().map(|t| t.name.as_str()).collect();
            writeln!(out, "{}  {}", journal.save_date.format(DATE_FORMAT_ISO), journal.title)?;
            writeln!(out, "id: {}", journal.id)?;
            writeln!(out, "words: {}", journal.word_count)?;
            if !tags.is_empty() {
                writeln!(out, "tags: {}", tags.join(", "))?;
            }
            writeln!(out)?;
            writeln!(out, "{}", journal.raw_content)?;
        }
        Command::Delete { id } => match id {
            Some(id) => {
                app.delete_journal(id).await?;
                writeln!(out, "Deleted {}", id)?;
            }
            None => {
                let counters = app.delete_today_journal().await?;
                writeln!(out, "Deleted today's entry. Current streak: {}", counters.current_streak)?;
            }
        },
        Command::List(args) => list_entries(app, args, &mut out).await?,
        Command::Unlock { id } => {
            let response = app.unlock_journal(id, &lock_password()?).await?;
            writeln!(out, "{}", response.message)?;
        }
        Command::Moods => {
            for mood in app.get_moods().await? {
                writeln!(out, "{} {:<12} {}", mood.emoji, mood.name, mood.category)?;
            }
        }
        Command::Tags => {
            for tag in app.get_tags().await? {
                writeln!(out, "{:<20} {}", tag.name, tag.tag_type)?;
            }
        }
        Command::AddTag { name } => {
            let tag = app.add_custom_tag(&name).await?;
            writeln!(out, "Added tag '{}'", tag.name)?;
        }
        Command::MoodStats(args) => {
            for entry in app.get_mood_distribution(range(app, args)).await? {
                writeln!(out, "{:>4}  {} {}", entry.count, entry.mood.emoji, entry.mood.name)?;
            }
        }
        Command::WordStats(args) => {
            for point in app.get_word_count_distributions(range(app, args)).await? {
                writeln!(out, "{}  {}", point.date.format(DATE_FORMAT_ISO), point.word_count)?;
            }
        }
        Command::Calendar { month } => {
            let month = month.unwrap_or_else(|| app.today().month());
            for date in app.get_current_month_streak(month).await? {
                writeln!(out, "{}", date.format(DATE_FORMAT_ISO))?;
            }
        }
        Command::Export(args) => export(app, args, &mut out).await?,
        Command::Streak => {
            let user = app.refresh_user().await?;
            writeln!(out, "Current streak: {}", user.current_streak)?;
            writeln!(out, "Longest streak: {}", user.longest_streak)?;
        }
    }

    out.flush()?;
    Ok(())
}

async fn write_entry(app: &EntryIt, args: WriteArgs, out: &mut impl Write) -> AppResult<()> {
    if args.secondary_moods.len() > 2 {
        return Err(AppError::InvalidArgument(
            "At most two secondary moods are allowed".to_string(),
        ));
    }

    let content = match args.content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let primary = app
        .resolve_moods(vec![args.mood])
        .await?
        .first()
        .copied()
        .ok_or_else(|| AppError::InvalidArgument("A primary mood is required".to_string()))?;
    let secondary = app.resolve_moods(args.secondary_moods).await?;
    let tag_ids = app.resolve_tags(args.tags).await?;

    let custom_password = if args.lock_custom {
        Some(lock_password()?.as_str().to_string())
    } else {
        None
    };

    let request = SaveJournalRequest {
        title: args.title,
        word_count: word_count(&content),
        content: content.clone(),
        raw_content: content,
        primary_mood: primary,
        secondary_mood1: secondary.first().copied(),
        secondary_mood2: secondary.get(1).copied(),
        lock: args.lock || args.lock_custom,
        use_default_password: args.lock,
        custom_password,
        tag_ids,
    };

    let response = app.save_journal(request).await?;
    writeln!(out, "{}", response.message)?;
    writeln!(out, "id: {}", response.journal_id)?;
    writeln!(out, "Current streak: {}", response.updated_streak)?;
    Ok(())
}

async fn list_entries(app: &EntryIt, args: ListArgs, out: &mut impl Write) -> AppResult<()> {
    let mood_ids = app.resolve_moods(args.moods).await?;
    let tag_ids = app.resolve_tags(args.tags).await?;

    let filters = JournalSearchFilters {
        search_key: args.search,
        from_date: args.from,
        to_date: args.to.unwrap_or_else(|| app.today()),
        mood_ids,
        tag_ids,
        page: args.page,
        per_page: args.per_page,
    };

    let result = app.get_journal_lists(filters).await?;
    for item in &result.results {
        let marker = if item.is_locked { "[locked]" } else { "" };
        writeln!(
            out,
            "{}  {}  {} {}",
            item.save_date.format(DATE_FORMAT_ISO),
            item.journal_id,
            item.title,
            marker
        )?;
        if let Some(info) = &item.journal_info {
            if let Some(mood) = &info.primary_mood {
                writeln!(out, "    {} {} · {} words", mood.emoji, mood.name, info.word_count)?;
            }
        }
    }
    writeln!(
        out,
        "Page {} of {} ({} entries)",
        result.current_page, result.total_pages, result.total_count
    )?;
    Ok(())
}

async fn export(app: &EntryIt, args: ExportArgs, out: &mut impl Write) -> AppResult<()> {
    let journals = match args.id {
        Some(id) => {
            let password = if app.get_journal_lock_status(id).await?.is_locked {
                Some(lock_password()?)
            } else {
                None
            };
            vec![app.export_journal(id, password.as_deref().map(String::as_str)).await?]
        }
        None => app.export_range(range(app, args.range)).await?,
    };

    let renderer: Box<dyn DocumentRenderer> = match args.format {
        ExportFormat::Markdown => Box::new(MarkdownRenderer),
        ExportFormat::Json => Box::new(JsonRenderer),
    };
    let bytes = renderer.render(&journals)?;

    match args.output {
        Some(path) => {
            let path = crate::config::Config::expand_path(&path)?;
            fs::write(&path, &bytes)?;
            writeln!(out, "Exported {} entries to {}", journals.len(), path.display())?;
        }
        None => out.write_all(&bytes)?,
    }
    Ok(())
}
