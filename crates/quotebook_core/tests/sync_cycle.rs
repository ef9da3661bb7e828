use httpmock::prelude::*;
use quotebook_core::db::open_db;
use quotebook_core::{
    CollectingNotifier, HttpQuoteRemote, KeyValueStore, KvScope, MemoryKvStore, Quote,
    QuoteRemote, QuoteService, QuoteServiceError, RemoteError, RemoteResult, RepoResult,
    SqliteKvStore, SyncError, SyncOptions, SyncService,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

fn memory_service() -> QuoteService<MemoryKvStore, MemoryKvStore> {
    QuoteService::open(MemoryKvStore::new(), MemoryKvStore::new()).unwrap()
}

fn http_remote(server: &MockServer) -> HttpQuoteRemote {
    HttpQuoteRemote::new(server.url("/quotes"), Duration::from_secs(5)).unwrap()
}

/// Scripted remote: returns queued fetch results and records publishes.
struct ScriptedRemote {
    fetches: RefCell<Vec<RemoteResult<Vec<Quote>>>>,
    published: RefCell<Vec<Vec<Quote>>>,
}

impl ScriptedRemote {
    fn new(fetches: Vec<RemoteResult<Vec<Quote>>>) -> Self {
        Self {
            fetches: RefCell::new(fetches.into_iter().rev().collect()),
            published: RefCell::new(Vec::new()),
        }
    }
}

impl QuoteRemote for ScriptedRemote {
    fn fetch_quotes(&self) -> RemoteResult<Vec<Quote>> {
        self.fetches
            .borrow_mut()
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn publish_quotes(&self, quotes: &[Quote]) -> RemoteResult<()> {
        self.published.borrow_mut().push(quotes.to_vec());
        Ok(())
    }
}

#[test]
fn http_cycle_merges_remote_and_reports_conflicts() {
    let server = MockServer::start();
    let fetch_mock = server.mock(|when, then| {
        when.method(GET).path("/quotes");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([
                {"text": "Keep pushing forward!", "category": "Grit"},
                {"text": "Remote only", "category": "Server"},
                {"title": "not a quote"}
            ]));
    });

    let mut quotes = memory_service();
    let sync = SyncService::new(http_remote(&server), SyncOptions::default());
    let mut notifier = CollectingNotifier::new();

    let report = sync.run_cycle(&mut quotes, &mut notifier).unwrap();

    fetch_mock.assert();
    assert_eq!(report.local_count, 3);
    assert_eq!(report.remote_count, 2);
    assert_eq!(report.overwritten, 1);
    assert_eq!(report.appended, 1);
    assert_eq!(report.merged_count, 4);
    assert!(!report.published);

    assert_eq!(quotes.quotes()[2], Quote::new("Keep pushing forward!", Some("Grit")));
    assert_eq!(quotes.quotes()[3], Quote::new("Remote only", Some("Server")));
    assert_eq!(notifier.messages.len(), 1);
    assert!(notifier.messages[0].contains("Keep pushing forward!"));
}

#[test]
fn http_cycle_publishes_merged_set_when_enabled() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quotes");
        then.status(200).json_body(json!([{"text": "Remote only"}]));
    });
    let publish_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/quotes")
            .header("content-type", "application/json");
        then.status(201);
    });

    let mut quotes = memory_service();
    let sync = SyncService::new(http_remote(&server), SyncOptions { publish: true });

    let report = sync
        .run_cycle(&mut quotes, &mut CollectingNotifier::new())
        .unwrap();

    publish_mock.assert();
    assert!(report.published);
    assert_eq!(report.merged_count, 4);
}

#[test]
fn http_error_status_leaves_local_set_untouched() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quotes");
        then.status(503).body("maintenance");
    });

    let mut quotes = memory_service();
    let before = quotes.quotes().to_vec();
    let sync = SyncService::new(http_remote(&server), SyncOptions::default());

    let err = sync
        .run_cycle(&mut quotes, &mut CollectingNotifier::new())
        .unwrap_err();

    match err {
        SyncError::Fetch(RemoteError::Http(status, body)) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(quotes.quotes(), before.as_slice());
}

#[test]
fn non_array_body_is_a_codec_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quotes");
        then.status(200).json_body(json!({"quotes": []}));
    });

    let err = http_remote(&server).fetch_quotes().unwrap_err();
    assert!(matches!(err, RemoteError::Codec(_)));
}

#[test]
fn periodic_sync_continues_after_failed_cycle() {
    let remote = ScriptedRemote::new(vec![
        Err(RemoteError::Network("offline".to_string())),
        Ok(vec![Quote::new("Second try", Some("Retry"))]),
    ]);
    let sync = SyncService::new(remote, SyncOptions { publish: true });
    let mut quotes = memory_service();
    let mut notifier = CollectingNotifier::new();
    let mut outcomes = Vec::new();

    let summary = sync.run_periodic(
        &mut quotes,
        &mut notifier,
        Duration::ZERO,
        Some(2),
        |cycle, result| outcomes.push((cycle, result.is_ok())),
    );

    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(outcomes, vec![(1, false), (2, true)]);
    assert_eq!(quotes.len(), 4);
    let published = sync.remote().published.borrow();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].len(), 4);
}

/// Memory store whose writes can be switched off to simulate a full disk.
struct FlakyStore {
    inner: MemoryKvStore,
    reject_writes: Rc<Cell<bool>>,
}

impl FlakyStore {
    fn check(&self) -> RepoResult<()> {
        if self.reject_writes.get() {
            return Err(rusqlite::Error::InvalidQuery.into());
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn clear(&mut self) -> RepoResult<()> {
        self.check()?;
        self.inner.clear()
    }
}

#[test]
fn cycle_keeps_quotes_written_by_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotebook.sqlite3");

    let watcher_conn = open_db(&path).unwrap();
    let mut watcher = QuoteService::open(
        SqliteKvStore::new(&watcher_conn, KvScope::Local),
        SqliteKvStore::new(&watcher_conn, KvScope::Session),
    )
    .unwrap();

    {
        let other_conn = open_db(&path).unwrap();
        let mut other = QuoteService::open(
            SqliteKvStore::new(&other_conn, KvScope::Local),
            SqliteKvStore::new(&other_conn, KvScope::Session),
        )
        .unwrap();
        other.add_quote("Added elsewhere", Some("Shared")).unwrap();
    }

    let sync = SyncService::new(
        ScriptedRemote::new(vec![Ok(vec![Quote::new("Remote", None)])]),
        SyncOptions::default(),
    );
    let report = sync
        .run_cycle(&mut watcher, &mut CollectingNotifier::new())
        .unwrap();

    assert_eq!(report.local_count, 4);
    assert_eq!(report.merged_count, 5);

    let reader = QuoteService::open(
        SqliteKvStore::new(&watcher_conn, KvScope::Local),
        SqliteKvStore::new(&watcher_conn, KvScope::Session),
    )
    .unwrap();
    let texts: Vec<&str> = reader.quotes().iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts[3], "Added elsewhere");
    assert_eq!(texts[4], "Remote");
}

#[test]
fn failed_persist_does_not_announce_conflicts() {
    let reject_writes = Rc::new(Cell::new(false));
    let local = FlakyStore {
        inner: MemoryKvStore::new(),
        reject_writes: Rc::clone(&reject_writes),
    };
    let mut quotes = QuoteService::open(local, MemoryKvStore::new()).unwrap();
    reject_writes.set(true);

    let sync = SyncService::new(
        ScriptedRemote::new(vec![Ok(vec![Quote::new(
            "Believe in yourself!",
            Some("Remote"),
        )])]),
        SyncOptions::default(),
    );
    let mut notifier = CollectingNotifier::new();

    let err = sync.run_cycle(&mut quotes, &mut notifier).unwrap_err();

    assert!(matches!(err, SyncError::Persist(QuoteServiceError::Repo(_))));
    assert!(notifier.messages.is_empty());
    assert_eq!(quotes.quotes()[0].category.as_deref(), Some("Motivation"));
}

#[test]
fn periodic_sync_with_zero_cycle_limit_runs_nothing() {
    let sync = SyncService::new(
        ScriptedRemote::new(vec![Ok(vec![Quote::new("Never fetched", None)])]),
        SyncOptions { publish: true },
    );
    let mut quotes = memory_service();
    let mut calls = 0;

    let summary = sync.run_periodic(
        &mut quotes,
        &mut CollectingNotifier::new(),
        Duration::ZERO,
        Some(0),
        |_, _| calls += 1,
    );

    assert_eq!(summary.cycles, 0);
    assert_eq!(calls, 0);
    assert_eq!(quotes.len(), 3);
    assert_eq!(sync.remote().fetches.borrow().len(), 1);
}
