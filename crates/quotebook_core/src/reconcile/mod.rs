//! Local/remote quote set reconciliation.
//!
//! # Responsibility
//! - Merge a local and a remote quote set with a remote-wins policy.
//! - Report every overwrite through an injected notifier.
//!
//! # Invariants
//! - Pure apart from notifier calls: no storage or network I/O.
//! - Output order is local order with remote-only quotes appended.
//! - Only the first local quote with a given text is ever overwritten;
//!   later local duplicates pass through untouched.

use crate::model::quote::Quote;
use log::warn;
use std::collections::HashMap;

/// Receives one human-readable message per overwritten local quote.
pub trait ConflictNotifier {
    fn notify(&mut self, message: &str);
}

impl<F> ConflictNotifier for F
where
    F: FnMut(&str),
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Forwards conflict messages to the log as `sync_conflict` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ConflictNotifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        warn!("event=sync_conflict module=reconcile status=overwritten message={message}");
    }
}

/// Keeps conflict messages in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingNotifier {
    pub messages: Vec<String>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConflictNotifier for CollectingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Merge result with overwrite/append counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub quotes: Vec<Quote>,
    /// Remote quotes that replaced a local quote in place.
    pub overwritten: usize,
    /// Remote quotes appended because no local quote shared their text.
    pub appended: usize,
}

/// Merges `remote` into `local`; remote wins on matching text.
///
/// See [`reconcile_with_report`] for the exact rules.
pub fn reconcile<N>(local: &[Quote], remote: &[Quote], notifier: &mut N) -> Vec<Quote>
where
    N: ConflictNotifier + ?Sized,
{
    reconcile_with_report(local, remote, notifier).quotes
}

/// Merges `remote` into `local` and reports what happened.
///
/// 1. The result starts as a copy of `local`.
/// 2. For each remote quote in order, the first result entry with exactly
///    the same `text` (case-sensitive, untrimmed) is replaced in place and
///    the notifier is called once; without a match the remote quote is
///    appended.
///
/// Appended quotes take part in later lookups, so a remote set that repeats
/// a text collapses into one slot holding the last remote copy.
pub fn reconcile_with_report<N>(
    local: &[Quote],
    remote: &[Quote],
    notifier: &mut N,
) -> Reconciliation
where
    N: ConflictNotifier + ?Sized,
{
    let mut quotes = local.to_vec();
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(local.len() + remote.len());
    for (index, quote) in local.iter().enumerate() {
        slots.entry(quote.text.clone()).or_insert(index);
    }

    let mut overwritten = 0;
    let mut appended = 0;
    for incoming in remote {
        match slots.get(incoming.text.as_str()) {
            Some(&index) => {
                quotes[index] = incoming.clone();
                overwritten += 1;
                notifier.notify(&conflict_message(&incoming.text));
            }
            None => {
                slots.insert(incoming.text.clone(), quotes.len());
                quotes.push(incoming.clone());
                appended += 1;
            }
        }
    }

    Reconciliation {
        quotes,
        overwritten,
        appended,
    }
}

fn conflict_message(text: &str) -> String {
    format!("Remote copy replaced local quote \"{text}\".")
}

#[cfg(test)]
mod tests {
    use super::{reconcile, reconcile_with_report, CollectingNotifier};
    use crate::model::quote::Quote;

    fn q(text: &str, category: Option<&str>) -> Quote {
        Quote {
            text: text.to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn remote_overwrites_in_place_and_preserves_order() {
        let local = vec![q("a", None), q("b", None)];
        let remote = vec![q("b", Some("new"))];
        let mut notifier = CollectingNotifier::new();

        let merged = reconcile(&local, &remote, &mut notifier);

        assert_eq!(merged, vec![q("a", None), q("b", Some("new"))]);
        assert_eq!(notifier.messages.len(), 1);
        assert!(notifier.messages[0].contains("\"b\""));
    }

    #[test]
    fn remote_only_quotes_are_appended_without_notification() {
        let local = vec![q("a", None)];
        let remote = vec![q("z", None)];
        let mut notifier = CollectingNotifier::new();

        let merged = reconcile(&local, &remote, &mut notifier);

        assert_eq!(merged, vec![q("a", None), q("z", None)]);
        assert!(notifier.messages.is_empty());
    }

    #[test]
    fn only_first_local_duplicate_is_overwritten() {
        let local = vec![q("a", None), q("a", Some("old2"))];
        let remote = vec![q("a", Some("new"))];
        let mut notifier = CollectingNotifier::new();

        let merged = reconcile(&local, &remote, &mut notifier);

        assert_eq!(merged, vec![q("a", Some("new")), q("a", Some("old2"))]);
        assert_eq!(notifier.messages.len(), 1);
    }

    #[test]
    fn empty_inputs_are_identities() {
        let set = vec![q("x", Some("c")), q("y", None)];
        let mut notifier = CollectingNotifier::new();

        assert_eq!(reconcile(&set, &[], &mut notifier), set);
        assert_eq!(reconcile(&[], &set, &mut notifier), set);
        assert!(notifier.messages.is_empty());
    }

    #[test]
    fn comparison_is_exact() {
        let local = vec![q("Hello", None)];
        let remote = vec![q("hello", None), q("Hello ", None)];
        let mut notifier = CollectingNotifier::new();

        let report = reconcile_with_report(&local, &remote, &mut notifier);

        assert_eq!(report.quotes.len(), 3);
        assert_eq!(report.overwritten, 0);
        assert_eq!(report.appended, 2);
    }

    #[test]
    fn repeated_remote_text_collapses_into_one_slot() {
        let remote = vec![q("r", Some("first")), q("r", Some("second"))];
        let mut notifier = CollectingNotifier::new();

        let report = reconcile_with_report(&[], &remote, &mut notifier);

        assert_eq!(report.quotes, vec![q("r", Some("second"))]);
        assert_eq!(report.appended, 1);
        assert_eq!(report.overwritten, 1);
        assert_eq!(notifier.messages.len(), 1);
    }

    #[test]
    fn accepts_closure_notifier() {
        let mut seen = Vec::new();
        let merged = reconcile(&[q("k", None)], &[q("k", Some("c"))], &mut |message: &str| {
            seen.push(message.to_string())
        });
        assert_eq!(merged, vec![q("k", Some("c"))]);
        assert_eq!(seen.len(), 1);
    }
}
