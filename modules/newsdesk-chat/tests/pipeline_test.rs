//! End-to-end pipeline runs against mocked collaborators and canned pages.

use std::time::Duration;

use newsdesk_chat::state::{
    ERRORED_MESSAGE, NO_RESULTS_MESSAGE, NO_SCRAPES_MESSAGE, NO_SUMMARIES_MESSAGE,
    SYNTH_FAILED_MESSAGE,
};
use newsdesk_chat::testing::{
    candidate, test_config, Harness, InMemoryTranscripts, MockClassifier, MockSearch,
    MockSummarizer, MockWriter,
};
use newsdesk_chat::{Outcome, RunReport};
use newsdesk_common::Role;
use newsdesk_scraper::testing::MockPageFetcher;
use uuid::Uuid;

const KP_LINK: &str = "https://kathmandupost.com/national/2024/07/08/koshi-floods";
const NT_LINK: &str = "https://nepalitimes.com/news/koshi-floods";
const HT_LINK: &str = "https://thehimalayantimes.com/nepal/koshi-floods";

fn kathmandu_post_page(heading: &str, paragraph: &str) -> String {
    format!(
        r#"<html><body><div id="mainContent"><main><div>
        <div class="breadcrumb"></div>
        <div><div class="col-sm-8"><h1>{heading}</h1>
          <div><div><div class="subscribe--wrapperx"><section><p>{paragraph}</p></section></div></div></div>
        </div></div>
        </div></main></div></body></html>"#
    )
}

fn nepali_times_page(heading: &str, paragraph: &str) -> String {
    format!(
        r#"<html><body><div id="__next"><div><main><div>
        <div class="mainCols article"><div class="main--left"><article>
          <h1>{heading}</h1><div class="article__text"><p>{paragraph}</p></div>
        </article></div></div>
        </div></main></div></div></body></html>"#
    )
}

fn flood_fetcher() -> MockPageFetcher {
    MockPageFetcher::new()
        .on_page(
            KP_LINK,
            &kathmandu_post_page("Koshi floods kill 12", "Twelve people died in Sunsari."),
        )
        .on_page(
            NT_LINK,
            &nepali_times_page("Floods sweep east", "Officials put the toll at 10."),
        )
}

fn flood_search() -> MockSearch {
    MockSearch::returning(vec![
        candidate("Koshi floods kill 12", KP_LINK),
        candidate("Floods sweep east", NT_LINK),
        candidate("Koshi swells", HT_LINK),
    ])
}

/// Runs one streaming session with a live subscriber attached and returns
/// the report, the persisted assistant rows and the broadcast events.
async fn stream(harness: &Harness, query: &str) -> (RunReport, Vec<String>, Vec<String>) {
    let session = Uuid::new_v4();
    let mut rx = harness.bus.subscribe(session);
    let report = harness.pipeline().stream_run(session, query).await;

    let rows = harness.transcripts.contents(session, Role::Assistant);
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.session_id, session);
        assert_eq!(event.role, Role::Assistant);
        events.push(event.content);
    }
    (report, rows, events)
}

#[tokio::test]
async fn non_news_query_is_rejected_before_search() {
    let clarification = "This is a math problem, not a news query. I can only search for news and current events.";
    let harness = Harness::new()
        .classifier(MockClassifier::rejecting(clarification))
        .search(flood_search())
        .fetcher(flood_fetcher());

    let (report, rows, events) = stream(&harness, "1+1").await;

    assert_eq!(report.outcome, Outcome::Rejected);
    assert_eq!(report.message, clarification);
    assert!(!report.message.contains('2'));
    assert_eq!(rows, vec![clarification.to_string()]);
    assert_eq!(events, rows);
    assert_eq!(harness.search.calls(), 0);
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.summarizer.calls(), 0);
    assert_eq!(harness.writer.calls(), 0);
}

#[tokio::test]
async fn partial_scrape_answers_from_surviving_sources() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher());

    let (report, rows, events) = stream(&harness, "koshi flood deaths").await;

    assert_eq!(report.outcome, Outcome::Done);
    assert_eq!(harness.summarizer.calls(), 2);

    let mut sources: Vec<_> = harness
        .writer
        .received()
        .into_iter()
        .map(|s| (s.source, s.link))
        .collect();
    sources.sort();
    assert_eq!(
        sources,
        vec![
            ("Nepali Times".to_string(), NT_LINK.to_string()),
            ("The Kathmandu Post".to_string(), KP_LINK.to_string()),
        ]
    );

    assert!(report
        .message
        .contains(&format!("[The Kathmandu Post]({KP_LINK})")));
    assert!(report.message.contains(&format!("[Nepali Times]({NT_LINK})")));
    assert!(!report.message.contains("Himalayan"));

    assert_eq!(rows.len(), 6);
    assert!(rows[0].starts_with("Searching"));
    assert!(rows[1].starts_with("Found 3 news articles"));
    assert!(rows[1].contains(HT_LINK));
    assert_eq!(rows[2], "Read 2 of 3 articles.");
    assert_eq!(rows[3], "Summarizing 2 articles...");
    assert_eq!(rows[5], report.message);
    assert_eq!(events, rows);
}

#[tokio::test]
async fn summaries_keep_the_label_of_their_link() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher());

    let (report, _, _) = stream(&harness, "koshi flood deaths").await;
    assert_eq!(report.outcome, Outcome::Done);

    for s in harness.writer.received() {
        let expected = if s.link.contains("kathmandupost.com") {
            "The Kathmandu Post"
        } else {
            "Nepali Times"
        };
        assert_eq!(s.source, expected);
        assert!(s.summary.starts_with("Summary of "));
    }
}

#[tokio::test]
async fn zero_search_results_stop_the_run() {
    let harness = Harness::new().search(MockSearch::returning(Vec::new()));

    let (report, rows, events) = stream(&harness, "earthquake in kathmandu").await;

    assert_eq!(report.outcome, Outcome::NoResults);
    assert_eq!(report.message, NO_RESULTS_MESSAGE);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], NO_RESULTS_MESSAGE);
    assert_eq!(events, rows);
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.summarizer.calls(), 0);
    assert_eq!(harness.writer.calls(), 0);
}

#[tokio::test]
async fn search_failure_reads_as_no_results() {
    let harness = Harness::new().search(MockSearch::failing("403 Forbidden"));

    let (report, _, _) = stream(&harness, "earthquake in kathmandu").await;
    assert_eq!(report.outcome, Outcome::NoResults);
}

#[tokio::test]
async fn unknown_hosts_end_with_no_scrapes() {
    let harness = Harness::new().search(MockSearch::returning(vec![
        candidate("Asia floods", "https://www.bbc.com/news/world-asia-1"),
        candidate("Floods", "https://www.reuters.com/world/asia-pacific/2"),
    ]));

    let (report, rows, events) = stream(&harness, "floods").await;

    assert_eq!(report.outcome, Outcome::NoScrapes);
    assert_eq!(report.message, NO_SCRAPES_MESSAGE);
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(harness.summarizer.calls(), 0);
    assert_eq!(events, rows);
}

#[tokio::test]
async fn failed_summaries_skip_synthesis() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher())
        .summarizer(MockSummarizer::new().failing_all());

    let (report, rows, events) = stream(&harness, "koshi flood deaths").await;

    assert_eq!(report.outcome, Outcome::NoSummaries);
    assert_eq!(report.message, NO_SUMMARIES_MESSAGE);
    assert_eq!(harness.summarizer.calls(), 2);
    assert_eq!(harness.writer.calls(), 0);
    assert_eq!(rows.last().map(String::as_str), Some(NO_SUMMARIES_MESSAGE));
    assert_eq!(events, rows);
}

#[tokio::test]
async fn writer_failure_is_synth_failed() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher())
        .writer(MockWriter::failing("context length exceeded"));

    let (report, rows, events) = stream(&harness, "koshi flood deaths").await;

    assert_eq!(report.outcome, Outcome::SynthFailed);
    assert_eq!(report.message, SYNTH_FAILED_MESSAGE);
    assert_eq!(events, rows);
}

#[tokio::test]
async fn panicking_stage_is_errored_and_releases_topic() {
    let harness = Harness::new().search(MockSearch::panicking());
    let session = Uuid::new_v4();

    let report = harness.pipeline().stream_run(session, "floods").await;

    assert_eq!(report.outcome, Outcome::Errored);
    assert_eq!(report.message, ERRORED_MESSAGE);
    let rows = harness.transcripts.contents(session, Role::Assistant);
    assert_eq!(rows.last().map(String::as_str), Some(ERRORED_MESSAGE));
    assert_eq!(harness.bus.topic_count(), 0);
}

#[tokio::test]
async fn run_deadline_cancels_and_reports_error() {
    let mut config = test_config();
    config.run_deadline_secs = 1;
    config.collaborator_timeout_secs = 30;
    let harness = Harness::new()
        .config(config)
        .search(flood_search().with_delay(Duration::from_secs(20)));

    let (report, rows, events) = stream(&harness, "floods").await;

    assert_eq!(report.outcome, Outcome::Errored);
    assert_eq!(rows.last().map(String::as_str), Some(ERRORED_MESSAGE));
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(events, rows);
}

#[tokio::test]
async fn deadline_mid_publish_keeps_rows_and_events_paired() {
    let mut config = test_config();
    config.run_deadline_secs = 1;
    let harness = Harness::new()
        .config(config)
        .search(flood_search())
        .fetcher(flood_fetcher())
        .transcripts(InMemoryTranscripts::new().with_ack_delay(Duration::from_millis(700)));

    let (report, rows, events) = stream(&harness, "floods").await;

    assert_eq!(report.outcome, Outcome::Errored);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.last().map(String::as_str), Some(ERRORED_MESSAGE));
    assert_eq!(events, rows);
}

#[tokio::test]
async fn stalled_transcripts_cannot_outlive_the_deadline() {
    let mut config = test_config();
    config.run_deadline_secs = 1;
    config.persist_timeout_secs = 1;
    let harness = Harness::new()
        .config(config)
        .search(flood_search())
        .fetcher(flood_fetcher())
        .transcripts(InMemoryTranscripts::new().stalling(Duration::from_secs(3600)));

    let (report, rows, events) =
        tokio::time::timeout(Duration::from_secs(10), stream(&harness, "floods"))
            .await
            .expect("run should finish despite a stalled store");

    assert_eq!(report.outcome, Outcome::Errored);
    assert!(rows.is_empty());
    assert_eq!(events.last().map(String::as_str), Some(ERRORED_MESSAGE));
}

#[tokio::test]
async fn transcript_failure_still_broadcasts_every_message() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher())
        .transcripts(InMemoryTranscripts::failing());

    let (report, rows, events) = stream(&harness, "koshi flood deaths").await;

    assert_eq!(report.outcome, Outcome::Done);
    assert!(rows.is_empty());
    assert_eq!(events.len(), 6);
    assert_eq!(events.last(), Some(&report.message));
}

#[tokio::test]
async fn direct_answer_is_plain_and_unpublished() {
    let harness = Harness::new()
        .search(flood_search())
        .fetcher(flood_fetcher());

    let answer = harness
        .pipeline()
        .answer_direct("koshi flood deaths", false)
        .await;

    for c in ['*', '#', '[', ']'] {
        assert!(!answer.contains(c), "found {c:?} in {answer}");
    }
    assert!(answer.contains(&format!("The Kathmandu Post ({KP_LINK})")));
    assert!(answer.contains(&format!("Nepali Times ({NT_LINK})")));
    assert!(harness.transcripts.is_empty());
    assert_eq!(harness.bus.topic_count(), 0);
}

#[tokio::test]
async fn direct_answer_returns_terminal_message_on_failure() {
    let harness = Harness::new().classifier(MockClassifier::failing("timeout"));

    let answer = harness.pipeline().answer_direct("floods", true).await;
    assert_eq!(
        answer,
        "Something went wrong while processing your query. Please try again."
    );
}
