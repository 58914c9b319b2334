//! Mount/unmount behaviour of the viewer controller

use igv_resolver::PresignError;
use igv_session::{LoadConfiguration, TrackSpec, WidgetConfig};
use igv_test_utils::{sample_track_config, seed_session, Harness};
use igv_viewer::{
    ContainerId, EngineError, HostHandlers, LifecycleState, MountOutcome, Operation,
    ViewerController, ViewerError, ViewerEvent,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn container() -> ContainerId {
    ContainerId::new("igv-div")
}

#[tokio::test]
async fn mount_restores_default_session() {
    let harness = Harness::new();
    let controller = harness.controller();
    assert_eq!(controller.state(), LifecycleState::Unmounted);

    let outcome = controller.mount(&container()).await.unwrap();

    assert_eq!(outcome, MountOutcome::Created);
    assert_eq!(controller.state(), LifecycleState::Live);
    assert!(controller.get_browser().is_some());
    assert_eq!(harness.engine.configs()[0].genome.as_deref(), Some("hg38"));
    assert_eq!(harness.presigner.call_count(), 0);
    assert_eq!(harness.title.titles(), vec!["IGV | hg38".to_string()]);

    let handle = harness.engine.last_handle().unwrap();
    assert_eq!(handle.listener_count(), 4);
    for event in igv_viewer::OBSERVED_EVENTS {
        assert_eq!(handle.listeners_for(event), 1);
    }
}

#[tokio::test]
async fn mount_resolves_persisted_session() {
    let harness = Harness::new();
    seed_session(&harness.store, &sample_track_config());
    let controller = harness.controller();

    controller.mount(&container()).await.unwrap();

    let created = &harness.engine.configs()[0];
    assert_eq!(created.tracks[0].url, "https://signed/sample.bam");
    assert_eq!(created.tracks[0].index_url.as_deref(), Some("https://signed/sample.bam.bai"));
    assert_eq!(harness.presigner.call_count(), 2);
}

#[tokio::test]
async fn second_mount_is_noop() {
    let harness = Harness::new();
    let controller = harness.controller();

    assert_eq!(controller.mount(&container()).await.unwrap(), MountOutcome::Created);
    assert_eq!(
        controller.mount(&container()).await.unwrap(),
        MountOutcome::AlreadyMounted
    );
    assert_eq!(harness.engine.created_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_mounts_create_one_instance() {
    let harness = Harness::new();
    harness.engine.set_creation_delay(Duration::from_millis(20));
    let controller = harness.controller();

    let (container_a, container_b) = (container(), container());
    let (a, b) = tokio::join!(controller.mount(&container_a), controller.mount(&container_b));
    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o != MountOutcome::Created);

    assert_eq!(outcomes, vec![MountOutcome::Created, MountOutcome::AlreadyMounted]);
    assert_eq!(harness.engine.created_count(), 1);
    assert_eq!(harness.engine.live_count(), 1);
}

#[tokio::test]
async fn unmount_destroys_and_detaches() {
    let harness = Harness::new();
    let controller = harness.controller();
    controller.mount(&container()).await.unwrap();
    let handle = harness.engine.last_handle().unwrap();

    controller.unmount().await;

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert!(controller.get_browser().is_none());
    assert!(handle.is_destroyed());
    assert_eq!(handle.listener_count(), 0);

    controller.unmount().await;
    assert_eq!(harness.engine.destroyed_count(), 1);
}

#[tokio::test]
async fn unmount_without_instance_is_noop() {
    let harness = Harness::new();
    let controller = harness.controller();

    controller.unmount().await;

    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert_eq!(harness.engine.destroyed_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unmount_during_creation_discards_instance() {
    let harness = Harness::new();
    harness.engine.set_creation_delay(Duration::from_millis(50));
    let controller = harness.controller();

    let mounting = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.mount(&container()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(controller.state(), LifecycleState::Creating);

    controller.unmount().await;
    assert_eq!(controller.state(), LifecycleState::Unmounted);

    let outcome = mounting.await.unwrap().unwrap();
    assert_eq!(outcome, MountOutcome::Superseded);
    assert!(controller.get_browser().is_none());
    assert_eq!(harness.engine.created_count(), 1);
    assert_eq!(harness.engine.live_count(), 0);

    assert_eq!(controller.mount(&container()).await.unwrap(), MountOutcome::Created);
    assert_eq!(harness.engine.live_count(), 1);
}

#[tokio::test]
async fn resolution_failure_creates_nothing() {
    let harness = Harness::new();
    harness.presigner.fail(
        "s3://my-bucket/sample.bam.bai",
        PresignError::AccessDenied("sample.bam.bai".to_string()),
    );
    seed_session(&harness.store, &sample_track_config());
    let controller = harness.controller();

    let err = controller.mount(&container()).await.unwrap_err();

    assert!(matches!(err, ViewerError::Resolution(_)));
    assert_eq!(err.notification_title(Operation::Mount), "Viewer Error");
    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert!(controller.get_browser().is_none());
    assert_eq!(harness.engine.created_count(), 0);
}

#[tokio::test]
async fn unclassifiable_stored_session_falls_back_to_default() {
    let harness = Harness::new();
    let legacy = LoadConfiguration::for_genome("mm10")
        .with_track(TrackSpec::new("sample", "https://signed/sample.bam").presigned());
    seed_session(&harness.store, &legacy);
    let controller = harness.controller();

    assert_eq!(controller.mount(&container()).await.unwrap(), MountOutcome::Created);

    let created = &harness.engine.configs()[0];
    assert_eq!(created.genome.as_deref(), Some("hg38"));
    assert!(created.tracks.is_empty());
    assert_eq!(harness.presigner.call_count(), 0);
    assert_eq!(harness.title.last().as_deref(), Some("IGV | hg38"));
}

#[tokio::test]
async fn creation_failure_can_be_retried() {
    let harness = Harness::new();
    harness.engine.fail_next_creation(EngineError::init("container not attached"));
    let controller = harness.controller();

    let err = controller.mount(&container()).await.unwrap_err();
    assert!(matches!(err, ViewerError::InstanceCreation(_)));
    assert!(err.is_user_visible());
    assert_eq!(controller.state(), LifecycleState::Unmounted);
    assert!(controller.get_browser().is_none());

    assert_eq!(controller.mount(&container()).await.unwrap(), MountOutcome::Created);
    assert!(controller.is_live());
}

#[tokio::test]
async fn disabled_viewer_never_creates() {
    let harness = Harness::new();
    let controller = ViewerController::new(
        harness.engine.clone(),
        harness.handlers().with_enabled(false),
        &WidgetConfig::default(),
    );

    let err = controller.mount(&container()).await.unwrap_err();
    assert!(matches!(err, ViewerError::Disabled));
    assert!(!err.is_user_visible());
    assert_eq!(harness.engine.created_count(), 0);

    let controller = ViewerController::new(
        harness.engine.clone(),
        harness.handlers(),
        &WidgetConfig::default().with_enabled(false),
    );
    assert!(!controller.is_enabled());
    assert!(controller.mount(&container()).await.is_err());
}

#[tokio::test]
async fn runs_without_persistence_or_title() {
    let harness = Harness::new();
    let handlers = HostHandlers::new(harness.presigner.clone());
    let controller = ViewerController::new(harness.engine.clone(), handlers, &WidgetConfig::default());

    controller.mount(&container()).await.unwrap();
    assert!(!controller.store().is_persistent());

    let handle = harness.engine.last_handle().unwrap();
    handle.set_locus("chr2:100-200");
    handle.emit(ViewerEvent::TrackOrderChanged);

    assert!(controller.is_live());
    assert!(harness.title.titles().is_empty());
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn custom_app_name_and_session_key() {
    let harness = Harness::new();
    let config = WidgetConfig::default()
        .with_app_name("Genome Viewer")
        .with_session_key("lab-igv")
        .with_default_genome("mm39");
    let controller = ViewerController::new(harness.engine.clone(), harness.handlers(), &config);

    controller.mount(&container()).await.unwrap();
    assert_eq!(harness.title.last().as_deref(), Some("Genome Viewer | mm39"));

    harness.engine.last_handle().unwrap().set_locus("chr1:5-10");
    assert_eq!(harness.store.len(), 1);
    assert!(controller.store().try_load().unwrap().is_some());
    assert_eq!(controller.store().key(), "lab-igv");
}
