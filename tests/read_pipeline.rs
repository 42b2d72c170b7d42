//! Cache, rate limiter and dispatcher composed as readers use them.

mod common;

use common::{rpc_client, rpc_json, RecordingSource};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use near_badge::badge::{BadgeContract, Event};
use near_badge::blockchain::{QueryDispatcher, ReadPipeline, ViewResult};
use near_badge::resilience::{ManualClock, RateLimiter, ResultCache};

const CONTRACT: &str = "coba-admin.testnet";

fn pipeline_with(
    source: Arc<RecordingSource>,
    max_per_window: usize,
) -> (Arc<ReadPipeline>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let pipeline = ReadPipeline::new(
        source,
        Arc::new(RateLimiter::new(max_per_window, Duration::from_secs(60), clock.clone())),
        ResultCache::new(clock.clone(), true),
    );
    (Arc::new(pipeline), clock)
}

#[tokio::test]
async fn test_repeated_event_list_is_served_from_cache() {
    let source = Arc::new(RecordingSource::answering(&[(
        "get_all_events",
        json!([["EventA", { "description": "test" }]]),
    )]));
    let (pipeline, _clock) = pipeline_with(source.clone(), 800);

    let first = pipeline
        .view(None, CONTRACT, "get_all_events", json!({}), Duration::from_secs(60))
        .await
        .unwrap();
    let second = pipeline
        .view(None, CONTRACT, "get_all_events", json!({}), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(first, ViewResult::Value(json!([["EventA", { "description": "test" }]])));
    assert_eq!(first, second);
    assert_eq!(source.count("get_all_events"), 1);
    assert_eq!(pipeline.limiter().in_window(), 1);
}

#[tokio::test]
async fn test_typed_events_through_contract() {
    let source = Arc::new(RecordingSource::answering(&[(
        "get_all_events",
        json!([["EventA", { "description": "test", "media": "ipfs://a" }]]),
    )]));
    let (pipeline, _clock) = pipeline_with(source.clone(), 800);
    let contract = BadgeContract::new(CONTRACT, pipeline);

    let events: Vec<Event> = contract.all_events().await.unwrap().value().unwrap();
    let again = contract.all_events().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "EventA");
    assert_eq!(events[0].details.description, "test");
    assert_eq!(events[0].details.media.as_deref(), Some("ipfs://a"));
    assert_eq!(again.value().unwrap(), events);
    assert_eq!(source.count("get_all_events"), 1);
}

#[tokio::test]
async fn test_call_past_the_ceiling_is_throttled() {
    let source = Arc::new(RecordingSource::answering(&[("is_owner", json!(false))]));
    let (pipeline, _clock) = pipeline_with(source.clone(), 600);

    for i in 0..600 {
        let result = pipeline
            .view(
                None,
                CONTRACT,
                "is_owner",
                json!({ "account_id": format!("user{}.testnet", i) }),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert_eq!(result, ViewResult::Value(json!(false)), "call {} was refused", i + 1);
    }

    let last = pipeline
        .view(
            None,
            CONTRACT,
            "is_owner",
            json!({ "account_id": "user600.testnet" }),
            Duration::from_secs(60),
        )
        .await
        .unwrap();

    assert_eq!(last, ViewResult::Throttled);
    assert_eq!(source.count("is_owner"), 600);
}

#[tokio::test]
async fn test_zero_ttl_calls_count_against_the_limit() {
    let source = Arc::new(RecordingSource::answering(&[("get_managers", json!([]))]));
    let (pipeline, _clock) = pipeline_with(source.clone(), 3);

    let mut results = Vec::new();
    for _ in 0..4 {
        results.push(
            pipeline
                .view(None, CONTRACT, "get_managers", json!({}), Duration::ZERO)
                .await
                .unwrap(),
        );
    }

    assert!(results[..3].iter().all(|r| *r == ViewResult::Value(json!([]))));
    assert_eq!(results[3], ViewResult::Throttled);
    assert_eq!(source.count("get_managers"), 3);
}

#[tokio::test]
async fn test_window_slides_to_readmit_callers() {
    let source = Arc::new(RecordingSource::answering(&[("get_organizers", json!(["o.testnet"]))]));
    let (pipeline, clock) = pipeline_with(source.clone(), 2);

    for _ in 0..2 {
        pipeline
            .view(None, CONTRACT, "get_organizers", json!({}), Duration::ZERO)
            .await
            .unwrap();
    }
    let denied = pipeline
        .view(None, CONTRACT, "get_organizers", json!({}), Duration::ZERO)
        .await
        .unwrap();
    assert!(denied.is_throttled());

    clock.advance(Duration::from_secs(60));
    let still_denied = pipeline
        .view(None, CONTRACT, "get_organizers", json!({}), Duration::ZERO)
        .await
        .unwrap();
    assert!(still_denied.is_throttled());

    clock.advance(Duration::from_millis(1));
    let admitted = pipeline
        .view(None, CONTRACT, "get_organizers", json!({}), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(admitted, ViewResult::Value(json!(["o.testnet"])));
    assert_eq!(source.count("get_organizers"), 3);
}

#[tokio::test]
async fn test_expired_entry_is_fetched_again() {
    let source = Arc::new(RecordingSource::answering(&[("get_whitelist", json!(["a.near"]))]));
    let (pipeline, clock) = pipeline_with(source.clone(), 800);
    let args = json!({ "event_name": "RustConf" });
    let ttl = Duration::from_secs(30);

    pipeline.view(None, CONTRACT, "get_whitelist", args.clone(), ttl).await.unwrap();
    clock.advance(Duration::from_secs(29));
    pipeline.view(None, CONTRACT, "get_whitelist", args.clone(), ttl).await.unwrap();
    assert_eq!(source.count("get_whitelist"), 1);

    clock.advance(Duration::from_secs(2));
    pipeline.view(None, CONTRACT, "get_whitelist", args.clone(), ttl).await.unwrap();
    pipeline.view(None, CONTRACT, "get_whitelist", args, ttl).await.unwrap();
    assert_eq!(source.count("get_whitelist"), 2);
}

#[tokio::test]
async fn test_argument_order_shares_a_cache_entry() {
    let source = Arc::new(RecordingSource::answering(&[("nft_tokens_for_owner", json!([]))]));
    let (pipeline, _clock) = pipeline_with(source.clone(), 800);
    let ttl = Duration::from_secs(60);

    pipeline
        .view(
            None,
            CONTRACT,
            "nft_tokens_for_owner",
            json!({ "account_id": "a.testnet", "limit": 10 }),
            ttl,
        )
        .await
        .unwrap();
    pipeline
        .view(
            None,
            CONTRACT,
            "nft_tokens_for_owner",
            json!({ "limit": 10, "account_id": "a.testnet" }),
            ttl,
        )
        .await
        .unwrap();

    assert_eq!(source.count("nft_tokens_for_owner"), 1);
}

#[tokio::test]
async fn test_concurrent_identical_reads_share_one_fetch() {
    let server = MockServer::start_async().await;
    let rpc = server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200)
                .delay(Duration::from_millis(200))
                .json_body(rpc_json(&json!([["EventA", { "description": "test" }]])));
        })
        .await;

    let clock = Arc::new(ManualClock::new());
    let pipeline = Arc::new(ReadPipeline::new(
        Arc::new(QueryDispatcher::new(rpc_client(&[&server]))),
        Arc::new(RateLimiter::new(800, Duration::from_secs(60), clock.clone())),
        ResultCache::new(clock, true),
    ));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let pipeline = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            pipeline
                .view(None, CONTRACT, "get_all_events", json!({}), Duration::from_secs(60))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().value().is_some());
    }

    rpc.assert_hits_async(1).await;
    assert_eq!(pipeline.limiter().in_window(), 1);
}

#[tokio::test]
async fn test_full_stack_against_rpc_node() {
    let server = MockServer::start_async().await;
    let roles = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(r#""method_name":"is_organizer""#);
            then.status(200).json_body(rpc_json(&json!(true)));
        })
        .await;
    let mut others = Vec::new();
    for method in ["is_owner", "is_manager"] {
        let needle = format!(r#""method_name":"{}""#, method);
        others.push(
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/").body_contains(needle);
                    then.status(200).json_body(rpc_json(&json!(false)));
                })
                .await,
        );
    }

    let clock = Arc::new(ManualClock::new());
    let pipeline = Arc::new(ReadPipeline::new(
        Arc::new(QueryDispatcher::new(rpc_client(&[&server]))),
        Arc::new(RateLimiter::new(800, Duration::from_secs(60), clock.clone())),
        ResultCache::new(clock, true),
    ));
    let contract = BadgeContract::new(CONTRACT, pipeline);

    let first = contract.roles("alice.testnet").await.unwrap().value().unwrap();
    let second = contract.roles("alice.testnet").await.unwrap().value().unwrap();

    assert!(!first.is_owner);
    assert!(first.is_organizer);
    assert!(!first.is_manager);
    assert!(first.can_manage_events());
    assert_eq!(first, second);
    roles.assert_hits_async(1).await;
    for mock in others {
        mock.assert_hits_async(1).await;
    }
}
