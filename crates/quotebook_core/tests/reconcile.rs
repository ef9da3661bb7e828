use quotebook_core::{reconcile, reconcile_with_report, CollectingNotifier, Quote};

fn q(text: &str, category: Option<&str>) -> Quote {
    Quote {
        text: text.to_string(),
        category: category.map(str::to_string),
    }
}

fn numbered(prefix: &str, count: usize) -> Vec<Quote> {
    (0..count)
        .map(|i| q(&format!("{prefix}-{i}"), Some(prefix)))
        .collect()
}

#[test]
fn disjoint_sets_concatenate_without_notifications() {
    for (local_len, remote_len) in [(0, 0), (1, 4), (5, 2), (7, 7)] {
        let local = numbered("local", local_len);
        let remote = numbered("remote", remote_len);
        let mut notifier = CollectingNotifier::new();

        let merged = reconcile(&local, &remote, &mut notifier);

        assert_eq!(merged.len(), local_len + remote_len);
        assert_eq!(&merged[..local_len], local.as_slice());
        assert_eq!(&merged[local_len..], remote.as_slice());
        assert!(notifier.messages.is_empty());
    }
}

#[test]
fn matching_text_takes_remote_value_at_local_position() {
    let local = vec![q("first", None), q("x", Some("local")), q("last", None)];
    let remote = vec![q("extra", None), q("x", Some("remote"))];
    let mut notifier = CollectingNotifier::new();

    let report = reconcile_with_report(&local, &remote, &mut notifier);

    assert_eq!(
        report.quotes,
        vec![
            q("first", None),
            q("x", Some("remote")),
            q("last", None),
            q("extra", None),
        ]
    );
    assert_eq!(report.quotes.iter().filter(|quote| quote.text == "x").count(), 1);
    assert_eq!(report.overwritten, 1);
    assert_eq!(report.appended, 1);
    assert_eq!(notifier.messages.len(), 1);
    assert!(notifier.messages[0].contains("\"x\""));
}

#[test]
fn notification_count_equals_matched_remote_records() {
    let local = numbered("n", 6);
    let remote = vec![
        q("n-1", Some("r")),
        q("fresh", None),
        q("n-4", Some("r")),
        q("n-5", Some("r")),
    ];
    let mut notifier = CollectingNotifier::new();

    let report = reconcile_with_report(&local, &remote, &mut notifier);

    assert_eq!(report.overwritten, 3);
    assert_eq!(notifier.messages.len(), 3);
    assert_eq!(report.quotes.len(), 7);
    assert_eq!(report.quotes[0], local[0]);
    assert_eq!(report.quotes[2], local[2]);
    assert_eq!(report.quotes[3], local[3]);
}

#[test]
fn overwrite_and_duplicate_local_examples() {
    let mut notifier = CollectingNotifier::new();
    let merged = reconcile(
        &[q("a", None), q("b", None)],
        &[q("b", Some("new"))],
        &mut notifier,
    );
    assert_eq!(merged, vec![q("a", None), q("b", Some("new"))]);
    assert_eq!(notifier.messages.len(), 1);

    let mut notifier = CollectingNotifier::new();
    let merged = reconcile(
        &[q("a", None), q("a", Some("old2"))],
        &[q("a", Some("new"))],
        &mut notifier,
    );
    assert_eq!(merged, vec![q("a", Some("new")), q("a", Some("old2"))]);
    assert_eq!(notifier.messages.len(), 1);
}
