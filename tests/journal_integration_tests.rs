//! End-to-end journaling scenarios through the async facade.

mod test_helpers;

use entryit::db::Database;
use entryit::models::{DateRange, JournalSearchFilters, SaveJournalRequest};
use entryit::{ChangeEvent, EntryIt, ErrorKind};
use std::sync::Arc;
use test_helpers::{alice, date, logged_in_alice, open_app, TEST_LOCK_PASSWORD, TEST_PASSWORD};
use uuid::Uuid;

async fn first_mood(app: &EntryIt) -> Uuid {
    app.get_moods().await.expect("moods")[0].id
}

fn entry(title: &str, body: &str, mood: Uuid) -> SaveJournalRequest {
    SaveJournalRequest {
        title: title.to_string(),
        content: format!("<p>{}</p>", body),
        raw_content: body.to_string(),
        word_count: body.split_whitespace().count() as u32,
        primary_mood: mood,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_signup_and_login_by_username_or_email() {
    let (_dir, app, _clock) = open_app(date(2024, 6, 1));
    app.sign_up(alice()).await.unwrap();

    assert_eq!(app.login("alice", TEST_PASSWORD).await.unwrap().username, "alice");
    assert_eq!(app.login("alice@x.com", TEST_PASSWORD).await.unwrap().email, "alice@x.com");

    let err = app.login("alice", "wrongpw1!").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncorrectCredential);
    let err = app.login("alice@x.com", "wrongpw1!").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncorrectCredential);
    let err = app.login("nobody", TEST_PASSWORD).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = app.sign_up(alice()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Duplicate);
}

#[tokio::test]
async fn test_save_create_then_update_same_day() {
    let (_dir, app, _clock) = open_app(date(2024, 6, 1));
    logged_in_alice(&app).await;
    let mood = first_mood(&app).await;

    let created = app.save_journal(entry("Morning", "first draft", mood)).await.unwrap();
    assert!(created.message.contains("created"));
    assert_eq!(created.updated_streak, 1);
    assert_eq!(app.current_user().await.unwrap().current_streak, 1);

    let updated = app.save_journal(entry("Morning", "second draft", mood)).await.unwrap();
    assert!(updated.message.contains("updated"));
    assert_eq!(updated.updated_streak, 1);
    assert_eq!(updated.journal_id, created.journal_id);

    let view = app.get_journal(true, None).await.unwrap();
    assert_eq!(view.raw_content, "second draft");
    assert_eq!(view.word_count, 2);
}

#[tokio::test]
async fn test_streak_across_days_and_delete_today() {
    let (_dir, app, clock) = open_app(date(2024, 6, 1));
    logged_in_alice(&app).await;
    let mood = first_mood(&app).await;

    for expected in 1..=3 {
        let saved = app.save_journal(entry("Daily", "words", mood)).await.unwrap();
        assert_eq!(saved.updated_streak, expected);
        clock.advance_days(1);
    }

    // A skipped day resets the streak.
    clock.advance_days(1);
    let saved = app.save_journal(entry("Back", "again", mood)).await.unwrap();
    assert_eq!(saved.updated_streak, 1);

    let counters = app.delete_today_journal().await.unwrap();
    assert_eq!(counters.current_streak, 0);
    assert_eq!(counters.longest_streak, 3);

    let err = app.delete_today_journal().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("No journal entry for today"));
}

#[tokio::test]
async fn test_stale_session_cache_until_refresh() {
    let (_dir, writer, _clock) = open_app(date(2024, 6, 1));
    logged_in_alice(&writer).await;

    // A second handle over the same store with its own session.
    let db: Database = writer.database().clone();
    let reader = EntryIt::with_database(db, Arc::new(entryit::clock::FixedClock::new(date(2024, 6, 1))));
    reader.login("alice", TEST_PASSWORD).await.unwrap();
    assert_eq!(reader.current_user().await.unwrap().current_streak, 0);

    let mood = first_mood(&writer).await;
    writer.save_journal(entry("Today", "hello", mood)).await.unwrap();

    assert_eq!(reader.current_user().await.unwrap().current_streak, 0);
    let refreshed = reader.refresh_user().await.unwrap();
    assert_eq!(refreshed.current_streak, 1);
    assert_eq!(reader.current_user().await.unwrap().current_streak, 1);
}

#[tokio::test]
async fn test_pagination_over_25_entries() {
    let (_dir, app, clock) = open_app(date(2024, 1, 1));
    logged_in_alice(&app).await;
    let mood = first_mood(&app).await;

    for i in 0..25 {
        app.save_journal(entry(&format!("Entry {}", i), "walk", mood)).await.unwrap();
        clock.advance_days(1);
    }

    let mut filters = JournalSearchFilters::up_to(app.today());
    filters.per_page = 10;
    filters.page = 3;
    let page = app.get_journal_lists(filters).await.unwrap();

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.results.len(), 5);
    let dates: Vec<_> = page.results.iter().map(|r| r.save_date).collect();
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(*dates.last().unwrap(), date(2024, 1, 1));
}

#[tokio::test]
async fn test_locked_entry_confidentiality() {
    let (_dir, app, clock) = open_app(date(2024, 6, 1));
    logged_in_alice(&app).await;
    let mood = first_mood(&app).await;

    let mut secret = entry("Secret", "the treasure is buried", mood);
    secret.lock = true;
    secret.use_default_password = true;
    let saved = app.save_journal(secret).await.unwrap();
    clock.advance_days(1);

    let mut filters = JournalSearchFilters::up_to(app.today());
    filters.search_key = Some("Secret".to_string());
    let hits = app.get_journal_lists(filters.clone()).await.unwrap();
    assert_eq!(hits.results.len(), 1);
    assert!(hits.results[0].is_locked);
    assert!(hits.results[0].journal_info.is_none());

    filters.search_key = Some("treasure".to_string());
    assert!(app.get_journal_lists(filters).await.unwrap().results.is_empty());

    let err = app.unlock_journal(saved.journal_id, "guess").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncorrectCredential);
    assert!(app.get_journal_lock_status(saved.journal_id).await.unwrap().is_locked);

    let unlocked = app.unlock_journal(saved.journal_id, TEST_LOCK_PASSWORD).await.unwrap();
    assert!(unlocked.has_unlocked);
    assert!(app.get_journal_lock_status(saved.journal_id).await.unwrap().is_locked);
}

#[tokio::test]
async fn test_dashboard_and_export() {
    let (_dir, app, clock) = open_app(date(2024, 3, 30));
    logged_in_alice(&app).await;
    let moods = app.get_moods().await.unwrap();

    for (i, words) in ["one", "one two", "one two three"].iter().enumerate() {
        let mut request = entry(&format!("Day {}", i), words, moods[i % 2].id);
        request.tag_ids = app.resolve_tags(vec!["Work".to_string()]).await.unwrap();
        app.save_journal(request).await.unwrap();
        clock.advance_days(1);
    }

    let range = DateRange::new(None, app.today());
    let distribution = app.get_mood_distribution(range).await.unwrap();
    assert_eq!(distribution[0].mood.id, moods[0].id);
    assert_eq!(distribution[0].count, 2);

    let series = app.get_word_count_distributions(range).await.unwrap();
    let counts: Vec<u32> = series.iter().map(|p| p.word_count).collect();
    assert_eq!(counts, vec![1, 2, 3]);

    // 2024-03-30, 2024-03-31 in March; 2024-04-01 in April.
    assert_eq!(app.get_current_month_streak(3).await.unwrap().len(), 2);
    assert_eq!(app.get_current_month_streak(4).await.unwrap(), vec![date(2024, 4, 1)]);
    let err = app.get_current_month_streak(0).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let exported = app.export_range(range).await.unwrap();
    assert_eq!(exported.len(), 3);
    assert_eq!(exported[0].tags[0].name, "Work");
}

#[tokio::test]
async fn test_change_events_follow_mutations() {
    let (_dir, app, _clock) = open_app(date(2024, 6, 1));
    logged_in_alice(&app).await;
    let mut events = app.subscribe();
    let mood = first_mood(&app).await;

    let saved = app.save_journal(entry("Evented", "x", mood)).await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        ChangeEvent::JournalSaved { journal_id: saved.journal_id, current_streak: 1 }
    );

    let tag = app.add_custom_tag("Gardening").await.unwrap();
    assert_eq!(events.recv().await.unwrap(), ChangeEvent::TagAdded { tag_id: tag.id });

    app.delete_journal(saved.journal_id).await.unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        ChangeEvent::JournalDeleted { journal_id: Some(id), .. } if id == saved.journal_id
    ));

    // Failures publish nothing.
    assert!(app.delete_today_journal().await.is_err());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_requires_authentication() {
    let (_dir, app, _clock) = open_app(date(2024, 6, 1));
    let err = app.get_journal(true, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);
    let err = app.add_custom_tag("Nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationRequired);
}
