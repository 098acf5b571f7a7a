//! Integration tests for the poll-and-publish cycle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use common::{
    entry, feed, pipeline, pipeline_with, FileRenderer, FixedEnhancer, MockFetcher,
    RecordingPublisher, SlowEnhancer,
};
use newscaster_core::{
    Collaborators, EnhancedText, FeedSource, FeedWorker, Pipeline, WorkerConfig,
};

const FEED_A: &str = "https://a.example.com/rss";
const FEED_B: &str = "https://b.example.com/rss";

fn config() -> WorkerConfig {
    WorkerConfig::new().with_post_delay(std::time::Duration::ZERO)
}

fn worker(pipeline: Arc<Pipeline>) -> (FeedWorker, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    (FeedWorker::new(pipeline, config(), rx), tx)
}

#[tokio::test]
async fn test_publishes_oldest_first() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, feed(1, 3)));
    let publisher = Arc::new(RecordingPublisher::new());
    let pipeline = pipeline(&[FEED_A], fetcher, publisher.clone());
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    let texts: Vec<String> = publisher.deliveries().into_iter().map(|d| d.text).collect();
    assert_eq!(texts.len(), 3);
    assert!(texts[0].contains("Headline number 1"));
    assert!(texts[1].contains("Headline number 2"));
    assert!(texts[2].contains("Headline number 3"));
    assert!(publisher
        .deliveries()
        .iter()
        .all(|d| d.channel == "@test_channel" && !d.photo));

    let stats = pipeline.stats().snapshot();
    assert_eq!(stats.posts_sent, 3);
    assert!(stats.last_check.is_some());
    assert!(stats.last_post.is_some());
}

#[tokio::test]
async fn test_second_cycle_publishes_only_new_entries() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, feed(1, 2)));
    let publisher = Arc::new(RecordingPublisher::new());
    let pipeline = pipeline(&[FEED_A], fetcher.clone(), publisher.clone());
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;
    assert_eq!(publisher.count(), 2);

    // Same feed again: nothing new
    worker.run_cycle().await;
    assert_eq!(publisher.count(), 2);

    fetcher.set_feed(FEED_A, feed(1, 4));
    worker.run_cycle().await;

    let texts: Vec<String> = publisher.deliveries().into_iter().map(|d| d.text).collect();
    assert_eq!(texts.len(), 4);
    assert!(texts[2].contains("Headline number 3"));
    assert!(texts[3].contains("Headline number 4"));
    assert_eq!(pipeline.published().len(), 4);
}

#[tokio::test]
async fn test_failed_source_does_not_block_others() {
    // FEED_A is unknown to the fetcher and fails with 404
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_B, vec![entry(7)]));
    let publisher = Arc::new(RecordingPublisher::new());
    let pipeline = pipeline(&[FEED_A, FEED_B], fetcher.clone(), publisher.clone());
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    assert_eq!(fetcher.calls(), vec![FEED_A.to_string(), FEED_B.to_string()]);
    assert_eq!(publisher.count(), 1);
    let stats = pipeline.stats().snapshot();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.posts_sent, 1);
}

#[tokio::test]
async fn test_failed_entry_is_retried_next_cycle() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, feed(1, 3)));
    let publisher = Arc::new(RecordingPublisher::new().failing_on("Headline number 2"));
    let pipeline = pipeline(&[FEED_A], fetcher, publisher.clone());
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    assert_eq!(publisher.count(), 2);
    assert!(!pipeline.published().contains("https://news.example.com/2"));
    assert_eq!(pipeline.stats().snapshot().errors, 1);

    // Still unpublished, so it is attempted (and fails) again
    worker.run_cycle().await;
    assert_eq!(publisher.count(), 2);
    assert_eq!(pipeline.stats().snapshot().errors, 2);
}

#[tokio::test]
async fn test_empty_feed_is_not_an_error() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, Vec::new()));
    let publisher = Arc::new(RecordingPublisher::new());
    let pipeline = pipeline(&[FEED_A], fetcher, publisher.clone());
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    assert_eq!(publisher.count(), 0);
    assert_eq!(pipeline.stats().snapshot().errors, 0);
}

#[tokio::test]
async fn test_rejected_enhancement_keeps_original() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, vec![entry(1)]));
    let publisher = Arc::new(RecordingPublisher::new());
    let enhancer = Arc::new(FixedEnhancer(EnhancedText {
        title: "Short".to_string(),
        description: "A perfectly reasonable rewritten description.".to_string(),
    }));
    let pipeline = Arc::new(Pipeline::new(
        vec![FeedSource::new(FEED_A)],
        "@test_channel",
        Collaborators::new(fetcher, publisher.clone()).with_enhancer(enhancer),
    ));
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    let deliveries = publisher.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert!(deliveries[0].text.contains("Headline number 1"));
    assert!(!deliveries[0].text.contains("Short"));

    let stats = pipeline.stats().snapshot();
    assert_eq!(stats.yagpt_used, 0);
    assert_eq!(stats.yagpt_errors, 1);
    assert_eq!(stats.posts_sent, 1);
}

#[tokio::test]
async fn test_accepted_enhancement_is_published() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, vec![entry(1)]));
    let publisher = Arc::new(RecordingPublisher::new());
    let enhancer = Arc::new(FixedEnhancer(EnhancedText {
        title: "📰 A rewritten headline".to_string(),
        description: "A perfectly reasonable rewritten description.".to_string(),
    }));
    let pipeline = Arc::new(Pipeline::new(
        vec![FeedSource::new(FEED_A)],
        "@test_channel",
        Collaborators::new(fetcher, publisher.clone()).with_enhancer(enhancer),
    ));
    let (worker, _tx) = worker(Arc::clone(&pipeline));

    worker.run_cycle().await;

    let deliveries = publisher.deliveries();
    assert!(deliveries[0].text.starts_with("<b>📰 A rewritten headline</b>"));
    // The link is kept from the entry
    assert!(deliveries[0].text.contains("https://news.example.com/1"));
    assert_eq!(pipeline.stats().snapshot().yagpt_used, 1);
}

#[tokio::test]
async fn test_stop_during_formatting_drops_entry() {
    let fetcher = Arc::new(MockFetcher::new().with_feed(FEED_A, feed(1, 1)));
    let publisher = Arc::new(RecordingPublisher::new());
    let collaborators = Collaborators::new(fetcher, publisher.clone())
        .with_enhancer(Arc::new(SlowEnhancer(Duration::from_millis(200))))
        .with_renderer(Arc::new(FileRenderer::new()));
    let pipeline = pipeline_with(&[FEED_A], collaborators);
    let (worker, tx) = worker(Arc::clone(&pipeline));

    let cycle = tokio::spawn(async move { worker.run_cycle().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();
    cycle.await.unwrap();

    assert_eq!(publisher.count(), 0);
    assert!(!pipeline.published().contains(&entry(1).link.unwrap()));
    assert_eq!(pipeline.stats().snapshot().posts_sent, 0);
}
