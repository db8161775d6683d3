use crate::channels::telegram::{ChatTransport, Relay, Update, UpdateOutcome, UpdateSource};
use crate::shared::logging::NO_TRACE;
use crate::webhook::{Sleeper, WebhookTransport};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingDefaults {
    pub error_pause: Duration,
}

impl Default for PollingDefaults {
    fn default() -> Self {
        Self {
            error_pause: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollingReport {
    pub batches: usize,
    pub updates: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    pub poll_errors: usize,
}

/// Next offset after a batch: one past the highest update id seen.
pub fn next_offset(current: Option<i64>, batch: &[Update]) -> Option<i64> {
    batch
        .iter()
        .map(|update| update.update_id + 1)
        .max()
        .map(|next| current.map_or(next, |cur| cur.max(next)))
        .or(current)
}

/// Groups a batch by chat, keeping arrival order inside each chat.
pub fn group_by_chat(batch: Vec<Update>) -> BTreeMap<Option<i64>, Vec<Update>> {
    let mut groups: BTreeMap<Option<i64>, Vec<Update>> = BTreeMap::new();
    for update in batch {
        groups.entry(update.chat_id()).or_default().push(update);
    }
    groups
}

/// Processes one batch. Each chat gets its own scoped thread so a retry
/// sleep in one chat never stalls another; updates of a single chat stay
/// sequential.
pub fn dispatch_batch<T, S, C>(
    relay: &Relay<T, S>,
    chat: &C,
    batch: Vec<Update>,
) -> Vec<UpdateOutcome>
where
    T: WebhookTransport,
    S: Sleeper,
    C: ChatTransport + ?Sized,
{
    let groups = group_by_chat(batch);
    thread::scope(|scope| {
        let handles: Vec<_> = groups
            .into_values()
            .map(|updates| {
                scope.spawn(move || {
                    updates
                        .iter()
                        .map(|update| relay.handle_update(chat, update))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(outcomes) => outcomes,
                Err(_) => {
                    relay
                        .log()
                        .error(NO_TRACE, "dispatch.panic", "chat worker panicked");
                    Vec::new()
                }
            })
            .collect()
    })
}

/// Long-polls `source` until `stop` is set.
pub fn run_polling<T, S, C>(
    relay: &Relay<T, S>,
    client: &C,
    stop: &AtomicBool,
    defaults: &PollingDefaults,
) -> PollingReport
where
    T: WebhookTransport,
    S: Sleeper,
    C: UpdateSource + ChatTransport,
{
    let mut report = PollingReport::default();
    let mut offset: Option<i64> = None;

    while !stop.load(Ordering::Relaxed) {
        let batch = match client.next_batch(offset) {
            Ok(batch) => batch,
            Err(err) => {
                report.poll_errors += 1;
                relay
                    .log()
                    .error(NO_TRACE, "poll.failed", &err.to_string());
                thread::sleep(defaults.error_pause);
                continue;
            }
        };
        report.batches += 1;
        if batch.is_empty() {
            continue;
        }
        offset = next_offset(offset, &batch);
        report.updates += batch.len();

        for outcome in dispatch_batch(relay, client, batch) {
            match outcome {
                UpdateOutcome::Delivered { .. } => report.delivered += 1,
                UpdateOutcome::DeliveryFailed { .. } => report.delivery_failures += 1,
                _ => {}
            }
        }
    }

    relay.log().info(NO_TRACE, "poll.stopped", "polling stopped");
    report
}
