//! Integration tests for the periodic poll loop.

mod common;

use std::time::Duration;

use common::{offline_config, FakeMailbox, RecordingNotifier};
use jobwatch_core::{Pipeline, PollLoop};

async fn poll_loop(dir: &std::path::Path, mailbox: &FakeMailbox, run_on_start: bool) -> PollLoop {
    let mut config = offline_config();
    config.poll.run_on_start = run_on_start;
    let pipeline = Pipeline::load(
        &config,
        dir,
        Box::new(mailbox.clone()),
        Box::new(RecordingNotifier::default()),
    )
    .await
    .unwrap();
    PollLoop::new(pipeline, &config.poll)
}

#[tokio::test(start_paused = true)]
async fn test_first_pass_waits_one_interval() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = FakeMailbox::default();
    let poll = poll_loop(dir.path(), &mailbox, false).await;

    poll.run_until(tokio::time::sleep(Duration::from_secs(9 * 60))).await;
    assert!(mailbox.list_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_runs_every_interval_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = FakeMailbox::default();
    let poll = poll_loop(dir.path(), &mailbox, false).await;

    poll.run_until(tokio::time::sleep(Duration::from_secs(25 * 60))).await;

    // Passes at 10 and 20 minutes; the second lists from the first's checkpoint.
    let calls = mailbox.list_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], None);
    assert!(calls[1].is_some());
}

#[tokio::test(start_paused = true)]
async fn test_run_on_start_polls_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = FakeMailbox::default();
    let poll = poll_loop(dir.path(), &mailbox, true).await;

    poll.run_until(tokio::time::sleep(Duration::from_secs(5))).await;
    assert_eq!(mailbox.list_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_errors_do_not_stop_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = FakeMailbox::default();
    mailbox.push_plain("m1", "Position: Analyst");
    mailbox.break_message("m1");
    let poll = poll_loop(dir.path(), &mailbox, true).await;

    poll.run_until(tokio::time::sleep(Duration::from_secs(11 * 60))).await;

    // Both passes failed, so neither advanced the checkpoint.
    assert_eq!(mailbox.list_calls(), [None, None]);
}
