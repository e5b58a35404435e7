use anyhow::Result;
use livesearch::{
    AttachOutcome, HostElement, HostError, KeyPhase, LiveSearch, LiveSearchConfig, MemoryDocument,
    Selector,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn search_host() -> (MemoryDocument, HostElement) {
    let host = MemoryDocument::new();
    let input = host.add_input("Search");
    (host, input)
}

#[tokio::test(start_paused = true)]
async fn test_missing_search_input_is_a_clean_no_op() -> Result<()> {
    let host = MemoryDocument::new();
    let mut live = LiveSearch::new(host.document());

    assert_eq!(live.attach().await?, AttachOutcome::TargetMissing);
    assert!(!live.is_attached());
    assert!(live.target().is_none());

    // An input rendered later sees no listener and no synthetic events
    let input = host.add_input("Search");
    assert_eq!(host.input_subscriber_count("Search"), 0);
    input.type_text("rust")?;
    sleep(Duration::from_secs(5)).await;
    assert!(host.bubbled_events().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_second_attach_is_an_idempotent_no_op() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());

    assert_eq!(live.attach().await?, AttachOutcome::Attached);
    assert_eq!(live.attach().await?, AttachOutcome::AlreadyAttached);
    assert!(live.is_attached());
    assert_eq!(
        live.target().and_then(|target| target.label()).as_deref(),
        Some("Search")
    );
    assert_eq!(
        host.input_subscriber_count("Search"),
        1,
        "a repeated attach must not register a second listener"
    );

    input.type_text("a")?;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        host.bubbled_events().len(),
        3,
        "one Enter sequence despite the repeated attach"
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rapid_typing_collapses_into_one_enter_sequence() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());
    live.attach().await?;

    let start = Instant::now();
    input.type_text("r")?;
    sleep(Duration::from_millis(150)).await;
    input.type_text("u")?;
    sleep(Duration::from_millis(150)).await;
    input.type_text("s")?;

    // Let the quiet period elapse with room to spare
    sleep(Duration::from_secs(2)).await;

    let bubbled = host.bubbled_events();
    assert_eq!(bubbled.len(), 3, "the burst must collapse into one sequence");
    for record in &bubbled {
        assert_eq!(
            record.at - start,
            Duration::from_millis(700),
            "dispatch is due 400ms after the last keystroke of the burst"
        );
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_pause_longer_than_debounce_fires_again() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());
    live.attach().await?;

    let start = Instant::now();
    input.type_text("a")?;
    sleep(Duration::from_millis(500)).await;
    input.type_text("b")?;
    sleep(Duration::from_secs(2)).await;

    let bubbled = host.bubbled_events();
    assert_eq!(bubbled.len(), 6, "two separate Enter sequences are expected");
    for record in &bubbled[..3] {
        assert_eq!(record.at - start, Duration::from_millis(400));
    }
    for record in &bubbled[3..] {
        assert_eq!(record.at - start, Duration::from_millis(900));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_enter_sequence_payload_and_order() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());
    live.attach().await?;

    input.type_text("query")?;
    sleep(Duration::from_secs(1)).await;

    let bubbled = host.bubbled_events();
    let phases: Vec<KeyPhase> = bubbled.iter().map(|record| record.event.phase).collect();
    assert_eq!(
        phases,
        vec![KeyPhase::KeyDown, KeyPhase::KeyUp, KeyPhase::KeyPress]
    );

    for record in &bubbled {
        assert_eq!(record.event.key, "Enter");
        assert_eq!(record.event.code, "Enter");
        assert_eq!(record.event.key_code, 13);
        assert_eq!(record.event.which, 13);
        assert!(record.event.bubbles);
    }

    // All three landed on the observed input itself
    assert_eq!(host.dispatched_on("Search").len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_nothing_fires_before_the_quiet_period() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());
    live.attach().await?;

    input.type_text("a")?;

    sleep(Duration::from_millis(399)).await;
    assert!(
        host.bubbled_events().is_empty(),
        "no dispatch before the quiet period has fully elapsed"
    );

    sleep(Duration::from_millis(2)).await;
    assert_eq!(host.bubbled_events().len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_denied_document_surfaces_access_error() {
    let (host, _input) = search_host();
    host.set_deny_access(true);

    let mut live = LiveSearch::new(host.document());
    match live.attach().await {
        Err(HostError::AccessDenied(_)) => {}
        other => panic!("Expected AccessDenied, but got {other:?}"),
    }
    assert!(!live.is_attached());
    assert_eq!(host.input_subscriber_count("Search"), 0);

    // Waiting for the target must not mask the denial either
    let mut waiting = LiveSearch::with_config(
        host.document(),
        LiveSearchConfig {
            wait_for_target: Some(Duration::from_secs(1)),
            ..Default::default()
        },
    );
    match waiting.attach().await {
        Err(HostError::AccessDenied(_)) => {}
        other => panic!("Expected AccessDenied, but got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_detach_cancels_the_pending_sequence() -> Result<()> {
    let (host, input) = search_host();
    let mut live = LiveSearch::new(host.document());
    live.attach().await?;

    input.type_text("a")?;
    sleep(Duration::from_millis(100)).await;
    live.detach();
    assert!(!live.is_attached());
    assert!(live.target().is_none());

    sleep(Duration::from_secs(2)).await;
    assert!(
        host.bubbled_events().is_empty(),
        "a canceled simulation must never fire"
    );
    assert_eq!(host.input_subscriber_count("Search"), 0);

    // Re-attach starts a fresh observation
    assert_eq!(live.attach().await?, AttachOutcome::Attached);
    input.type_text("b")?;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(host.bubbled_events().len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_selector_and_debounce_target_the_configured_input() -> Result<()> {
    let host = MemoryDocument::new();
    let decoy = host.add_input("Search");
    let filter = host.add_input_with_id("filter", "Filter");

    let mut live = LiveSearch::with_config(
        host.document(),
        LiveSearchConfig {
            selector: Selector::from("id:filter"),
            debounce: Duration::from_millis(250),
            wait_for_target: None,
        },
    );
    live.attach().await?;

    let start = Instant::now();
    filter.type_text("x")?;
    decoy.type_text("ignored")?;
    sleep(Duration::from_secs(1)).await;

    assert_eq!(host.dispatched_on("Filter").len(), 3);
    assert!(host.dispatched_on("Search").is_empty());
    for record in &host.bubbled_events() {
        assert_eq!(record.at - start, Duration::from_millis(250));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_attach_can_wait_for_a_late_search_input() -> Result<()> {
    let host = MemoryDocument::new();
    let mut live = LiveSearch::with_config(
        host.document(),
        LiveSearchConfig {
            wait_for_target: Some(Duration::from_secs(5)),
            ..Default::default()
        },
    );

    // The host renders the search input 200ms in
    let rendering_host = host.clone();
    let render = tokio::spawn(async move {
        sleep(Duration::from_millis(200)).await;
        rendering_host.add_input("Search");
    });

    assert_eq!(live.attach().await?, AttachOutcome::Attached);
    render.await?;
    assert_eq!(host.input_subscriber_count("Search"), 1);

    let input = host
        .document()
        .find_element(&Selector::from("label:Search"))?;
    input.type_text("late")?;
    sleep(Duration::from_secs(1)).await;
    assert_eq!(host.bubbled_events().len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_waiting_attach_times_out_to_target_missing() -> Result<()> {
    let host = MemoryDocument::new();
    let mut live = LiveSearch::with_config(
        host.document(),
        LiveSearchConfig {
            wait_for_target: Some(Duration::from_millis(300)),
            ..Default::default()
        },
    );

    let started = Instant::now();
    assert_eq!(live.attach().await?, AttachOutcome::TargetMissing);
    assert!(
        Instant::now() - started >= Duration::from_millis(300),
        "the full wait window should be exhausted before giving up"
    );
    assert!(!live.is_attached());
    Ok(())
}
