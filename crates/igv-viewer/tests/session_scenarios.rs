//! End-to-end session capture, restore and load scenarios

use igv_resolver::PresignError;
use igv_session::{KeyValueStore, LoadConfiguration, SessionStore, WidgetConfig};
use igv_test_utils::{FailingStore, Harness, ScriptedPresigner};
use igv_viewer::{
    ContainerId, EngineError, LoadOutcome, MountOutcome, Operation, ReferenceForm, ReferenceLoad,
    ReferenceRequest, TrackForm, ViewerController, ViewerError, ViewerEvent,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

async fn live(harness: &Harness) -> ViewerController {
    let controller = harness.controller();
    controller.mount(&ContainerId::new("igv-div")).await.unwrap();
    controller
}

fn stored(harness: &Harness) -> LoadConfiguration {
    SessionStore::new(harness.store.clone()).try_load().unwrap().unwrap()
}

fn stored_json(harness: &Harness) -> serde_json::Value {
    harness
        .store
        .get_item(igv_session::store::DEFAULT_SESSION_KEY)
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn added_track_is_resolved_and_saved_in_position() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let form = TrackForm::new("sample", "s3://my-bucket/sample.bam")
        .with_index("s3://my-bucket/sample.bam.bai");
    assert_eq!(controller.load_track(form).await.unwrap(), LoadOutcome::Loaded);

    let tracks = handle.tracks();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].url, "https://signed/sample.bam");
    assert_eq!(tracks[0].index_url.as_deref(), Some("https://signed/sample.bam.bai"));

    handle.emit(ViewerEvent::TrackDragEnd);

    let saved = stored(&harness);
    assert_eq!(saved.tracks.len(), 1);
    assert_eq!(saved.tracks[0].name, "sample");
    assert_eq!(saved.tracks[0].url, "https://signed/sample.bam");
    assert!(saved.tracks[0].is_presigned_url());
    assert!(stored_json(&harness)["reference"].get("locus").is_none());
}

#[tokio::test]
async fn every_observed_event_saves() {
    let harness = Harness::new();
    let _controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    handle.set_locus("chr8:127736069-127742951");
    let json = stored_json(&harness);
    assert_eq!(json["locus"], "chr8:127736069-127742951");
    assert!(json["reference"].get("locus").is_none());
    assert_eq!(json["reference"]["id"], "hg38");

    for event in [ViewerEvent::TrackRemoved, ViewerEvent::TrackOrderChanged] {
        harness
            .store
            .set_item(igv_session::store::DEFAULT_SESSION_KEY, serde_json::Value::Null)
            .unwrap();
        handle.emit(event);
        assert!(!stored_json(&harness).is_null(), "{event} did not save");
    }
}

#[tokio::test]
async fn track_order_follows_the_live_instance() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    for name in ["alpha", "bravo", "charlie"] {
        let form = TrackForm::new(name, format!("s3://lab/{name}.bam"));
        controller.load_track(form).await.unwrap();
    }

    handle.drag_track(2, 0);
    let names: Vec<_> = stored(&harness).tracks.into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["charlie", "alpha", "bravo"]);

    handle.remove_track(1);
    let names: Vec<_> = stored(&harness).tracks.into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["charlie", "bravo"]);
}

#[tokio::test]
async fn reload_mints_fresh_urls() {
    let harness = Harness::with_presigner(ScriptedPresigner::virtual_host());
    let controller = live(&harness).await;

    let form = TrackForm::new("sample", "my-bucket/sample.bam").with_index("my-bucket/sample.bam.bai");
    controller.load_track(form).await.unwrap();
    let first = harness.engine.last_handle().unwrap().tracks()[0].url.clone();
    assert!(first.contains("X-Amz-Signature="));
    controller.unmount().await;

    let controller = harness.controller();
    controller.mount(&ContainerId::new("igv-div")).await.unwrap();

    let restored = &harness.engine.configs()[1];
    assert_eq!(restored.tracks.len(), 1);
    assert_ne!(restored.tracks[0].url, first);
    assert!(restored.tracks[0].url.starts_with("https://my-bucket.s3.amazonaws.com/sample.bam?"));
    assert_eq!(
        harness.presigner.calls()[2..].to_vec(),
        vec!["s3://my-bucket/sample.bam", "s3://my-bucket/sample.bam.bai"]
    );
}

#[tokio::test]
async fn saved_session_restores_with_any_presigner() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let form = TrackForm::new("sample", "s3://my-bucket/sample.bam")
        .with_index("s3://my-bucket/sample.bam.bai");
    controller.load_track(form).await.unwrap();
    harness.engine.last_handle().unwrap().emit(ViewerEvent::TrackDragEnd);

    let saved = stored(&harness);
    assert_eq!(saved.tracks[0].url, "https://signed/sample.bam");
    assert_eq!(saved.tracks[0].source_url.as_deref(), Some("s3://my-bucket/sample.bam"));
    controller.unmount().await;

    for attempt in 0..2 {
        let controller = harness.controller();
        let outcome = controller.mount(&ContainerId::new("igv-div")).await.unwrap();
        assert_eq!(outcome, MountOutcome::Created);

        let restored = harness.engine.last_handle().unwrap().tracks();
        assert_eq!(restored.len(), 1, "attempt {attempt}");
        assert_eq!(restored[0].url, "https://signed/sample.bam");
        assert_eq!(restored[0].index_url.as_deref(), Some("https://signed/sample.bam.bai"));
        controller.unmount().await;
    }
    assert_eq!(
        harness.presigner.calls()[2..4].to_vec(),
        vec!["s3://my-bucket/sample.bam", "s3://my-bucket/sample.bam.bai"]
    );
}

#[tokio::test]
async fn catalog_reference_updates_title_and_session() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let outcome = controller
        .load_reference(ReferenceRequest::Catalog("mm10".to_string()))
        .await
        .unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded);
    assert_eq!(handle.reference_loads(), vec![ReferenceLoad::Genome("mm10".to_string())]);
    assert_eq!(harness.title.last().as_deref(), Some("IGV | mm10"));
    assert_eq!(stored(&harness).genome.as_deref(), Some("mm10"));
    assert_eq!(harness.presigner.call_count(), 0);
}

#[tokio::test]
async fn custom_reference_is_presigned_concurrently() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let form = ReferenceForm::new("chm13", "s3://refs/chm13.fa").with_index("s3://refs/chm13.fa.fai");
    controller
        .load_reference(ReferenceRequest::Custom(form))
        .await
        .unwrap();

    assert_eq!(harness.presigner.peak_in_flight(), 2);
    let reference = handle.reference().unwrap();
    assert_eq!(reference.fasta_url, "https://signed/chm13.fa");
    assert_eq!(reference.index_url.as_deref(), Some("https://signed/chm13.fa.fai"));
    assert_eq!(harness.title.last().as_deref(), Some("IGV | chm13"));

    let saved = stored(&harness).reference.unwrap();
    assert_eq!(saved.id.as_deref(), Some("chm13"));
    assert!(saved.is_presigned_fasta());
    assert!(saved.extra.get("locus").is_none());
}

#[tokio::test]
async fn invalid_form_never_reaches_presigner() {
    let harness = Harness::new();
    let controller = live(&harness).await;

    let err = controller
        .load_track(TrackForm::new("sample", "not-a-url"))
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::Validation(_)));
    assert_eq!(err.notification_title(Operation::Track), "Track Error");
    assert_eq!(harness.presigner.call_count(), 0);

    let err = controller
        .load_reference(ReferenceRequest::Custom(ReferenceForm::new("x", "s3://r/a.fa")))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::Validation(_)));
}

#[tokio::test]
async fn one_rejection_abandons_the_track() {
    let harness = Harness::new();
    harness.presigner.fail(
        "s3://my-bucket/sample.bam.bai",
        PresignError::NotFound("sample.bam.bai".to_string()),
    );
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let form = TrackForm::new("sample", "s3://my-bucket/sample.bam")
        .with_index("s3://my-bucket/sample.bam.bai");
    let err = controller.load_track(form).await.unwrap_err();

    assert!(matches!(err, ViewerError::Resolution(_)));
    assert!(err.to_string().contains("not found"));
    assert!(handle.tracks().is_empty());
    assert!(harness.store.is_empty());
    assert_eq!(harness.presigner.call_count(), 2);
}

#[tokio::test]
async fn engine_rejection_is_reported() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();
    handle.fail_next_load(EngineError::load("unsupported format"));

    let err = controller
        .load_track(TrackForm::new("weird", "s3://lab/weird.xyz"))
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::Engine(_)));
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn loads_require_a_live_viewer() {
    let harness = Harness::new();
    let controller = harness.controller();

    let err = controller
        .load_reference(ReferenceRequest::Catalog("hg19".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::NotLive));
    assert_eq!(harness.presigner.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn newer_reference_supersedes_slow_one() {
    let harness = Harness::new();
    harness.presigner.delay("s3://refs/slow.fa", Duration::from_millis(100));
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            let form = ReferenceForm::new("slow", "s3://refs/slow.fa");
            controller.load_reference(ReferenceRequest::Custom(form)).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let fast = controller
        .load_reference(ReferenceRequest::Catalog("mm39".to_string()))
        .await
        .unwrap();
    assert_eq!(fast, LoadOutcome::Loaded);

    assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);
    assert_eq!(handle.reference_loads(), vec![ReferenceLoad::Genome("mm39".to_string())]);
    assert_eq!(harness.title.last().as_deref(), Some("IGV | mm39"));
    assert_eq!(stored(&harness).genome.as_deref(), Some("mm39"));
}

#[tokio::test(start_paused = true)]
async fn failure_of_superseded_reference_is_not_reported() {
    let harness = Harness::new();
    harness.presigner.delay("s3://refs/slow.fa", Duration::from_millis(100));
    harness
        .presigner
        .fail("s3://refs/slow.fa", PresignError::NotFound("slow.fa".to_string()));
    let controller = live(&harness).await;

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            let form = ReferenceForm::new("slow", "s3://refs/slow.fa");
            controller.load_reference(ReferenceRequest::Custom(form)).await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let fast = controller
        .load_reference(ReferenceRequest::Catalog("mm39".to_string()))
        .await
        .unwrap();
    assert_eq!(fast, LoadOutcome::Loaded);

    assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);
    assert_eq!(harness.title.last().as_deref(), Some("IGV | mm39"));
}

#[tokio::test(start_paused = true)]
async fn engine_failure_after_unmount_is_not_reported() {
    let harness = Harness::new();
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();
    handle.set_load_delay(Duration::from_millis(50));
    handle.fail_next_load(EngineError::load("unreachable"));

    let loading = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .load_track(TrackForm::new("late-track", "s3://lab/late.bam"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.unmount().await;

    assert_eq!(loading.await.unwrap().unwrap(), LoadOutcome::Superseded);
    assert!(handle.tracks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_track_loads_both_land() {
    let harness = Harness::new();
    harness.presigner.delay("s3://lab/first.bam", Duration::from_millis(30));
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let (a, b) = tokio::join!(
        controller.load_track(TrackForm::new("first", "s3://lab/first.bam")),
        controller.load_track(TrackForm::new("second", "s3://lab/second.bam")),
    );

    assert_eq!(a.unwrap(), LoadOutcome::Loaded);
    assert_eq!(b.unwrap(), LoadOutcome::Loaded);
    let names: Vec<_> = handle.tracks().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["second", "first"]);
}

#[tokio::test(start_paused = true)]
async fn unmount_discards_in_flight_track() {
    let harness = Harness::new();
    harness.presigner.delay("s3://lab/late.bam", Duration::from_millis(50));
    let controller = live(&harness).await;
    let handle = harness.engine.last_handle().unwrap();

    let loading = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .load_track(TrackForm::new("late-track", "s3://lab/late.bam"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.unmount().await;

    assert_eq!(loading.await.unwrap().unwrap(), LoadOutcome::Superseded);
    assert!(handle.tracks().is_empty());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn failing_store_never_breaks_the_viewer() {
    let harness = Harness::new();
    let store = Arc::new(FailingStore::new());
    let handlers = harness.handlers().with_store(store.clone());
    let controller = ViewerController::new(harness.engine.clone(), handlers, &WidgetConfig::default());

    controller.mount(&ContainerId::new("igv-div")).await.unwrap();
    assert_eq!(harness.engine.configs()[0].genome.as_deref(), Some("hg38"));

    let handle = harness.engine.last_handle().unwrap();
    handle.set_locus("chr3:1-1000");
    let outcome = controller
        .load_track(TrackForm::new("sample", "s3://my-bucket/sample.bam"))
        .await
        .unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded);
    assert!(controller.is_live());
    assert_eq!(store.attempts(), 3);
}
