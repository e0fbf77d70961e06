//! Location acquisition, manual entry and the views that depend on them.

mod common;

use std::sync::atomic::Ordering;

use clap::Parser;
use common::{delhi, test_app, ScriptedDevice, TestApp};
use domain::models::{LocationSource, PermissionState};
use hive_logger::cli::{execute, status, Cli};
use hive_logger::AppError;

async fn run(app: &TestApp, args: &[&str]) -> Result<String, AppError> {
    let mut argv = vec!["hive-logger"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    execute(&app.ctx, cli.command).await
}

fn granted() -> ScriptedDevice {
    ScriptedDevice::new(PermissionState::Granted, Some(delhi()))
}

fn denied() -> ScriptedDevice {
    ScriptedDevice::new(PermissionState::Denied, None)
}

#[tokio::test]
async fn test_init_uses_device_fix() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;

    let out = run(&app, &["location", "init"]).await.unwrap();
    assert!(out.starts_with("Current location: 28.7041, 77.1025 (device, 0 min old)"));
    assert!(out.contains("Janpath, New Delhi, India"));
    assert!(out.ends_with("Permission: granted"));
    assert_eq!(app.device.prompts(), 1);
}

#[tokio::test]
async fn test_fresh_location_survives_restart_without_prompt() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = test_app(dir.path(), granted()).await;
        run(&app, &["location", "init"]).await.unwrap();
    }

    let app = test_app(dir.path(), granted()).await;
    app.clock.advance(30 * 60 * 1000);
    let out = run(&app, &["location", "init"]).await.unwrap();
    assert!(out.contains("(device, 30 min old)"));
    assert_eq!(app.device.prompts(), 0);
}

#[tokio::test]
async fn test_stale_location_prompts_again() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = test_app(dir.path(), granted()).await;
        run(&app, &["location", "init"]).await.unwrap();
    }

    let app = test_app(dir.path(), granted()).await;
    app.clock.advance(2 * 60 * 60 * 1000);

    // `show` never prompts; the stale reading is only reported
    let out = run(&app, &["location", "show"]).await.unwrap();
    assert!(out.starts_with("No current location"));
    assert!(out.contains("Last known: 28.7041, 77.1025 (device, 120 min old)"));
    assert_eq!(app.device.prompts(), 0);

    let out = run(&app, &["location", "init"]).await.unwrap();
    assert!(out.contains("(device, 0 min old)"));
    assert_eq!(app.device.prompts(), 1);
}

#[tokio::test]
async fn test_denied_permission_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = test_app(dir.path(), denied()).await;
        let out = run(&app, &["location", "init"]).await.unwrap();
        assert!(out.starts_with("Location unavailable: location permission denied"));
        assert!(out.contains("location manual"));
        assert_eq!(app.device.prompts(), 1);
    }

    let app = test_app(dir.path(), denied()).await;
    let out = run(&app, &["location", "init"]).await.unwrap();
    assert!(out.ends_with("Permission: denied"));
    assert_eq!(app.device.prompts(), 0);
}

#[tokio::test]
async fn test_missing_fix_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), ScriptedDevice::new(PermissionState::Granted, None)).await;

    let out = run(&app, &["location", "init"]).await.unwrap();
    assert!(out.starts_with("Location unavailable: could not get a device fix"));
    assert!(out.ends_with("Permission: granted"));
}

#[tokio::test]
async fn test_manual_entry_after_denial() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = test_app(dir.path(), denied()).await;
        run(&app, &["location", "init"]).await.unwrap();

        let out = run(&app, &["location", "manual", "Mumbai"]).await.unwrap();
        assert!(out.contains("* 1. Mumbai, Maharashtra, India"));
        assert!(out.contains("  2. Mumbai Central, Mumbai, India"));
        assert!(out.ends_with("Location set to Mumbai, Maharashtra, India"));
        assert!(app.ctx.location.is_manually_entered().await);
        assert_eq!(*app.places.queries.lock().unwrap(), vec!["Mumbai".to_string()]);
    }

    let app = test_app(dir.path(), denied()).await;
    let out = run(&app, &["location", "show"]).await.unwrap();
    assert!(out.starts_with("Current location: Mumbai, Maharashtra, India (manual entry"));
    assert!(out.ends_with("Permission: denied"));

    let snapshot = app.ctx.location.last_known().await.unwrap();
    assert_eq!(snapshot.source, LocationSource::ManualEntry);
    assert_eq!(snapshot.latitude, 19.076);
    assert_eq!(app.device.prompts(), 0);
}

#[tokio::test]
async fn test_manual_entry_pick_second() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;

    let out = run(&app, &["location", "manual", "mumbai", "--pick", "2"]).await.unwrap();
    assert!(out.contains("* 2. Mumbai Central, Mumbai, India"));
    assert!(out.ends_with("Location set to Mumbai Central, Mumbai, India"));

    let err = run(&app, &["location", "manual", "mumbai", "--pick", "5"]).await.unwrap_err();
    assert!(err.to_string().contains("only 2 suggestion(s) available"));
}

#[tokio::test]
async fn test_manual_entry_rejects_short_or_unknown_query() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), denied()).await;

    let err = run(&app, &["location", "manual", "Mu"]).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(app.places.queries.lock().unwrap().is_empty());

    let err = run(&app, &["location", "manual", "Atlantis"]).await.unwrap_err();
    assert!(err.to_string().contains("No places found for 'Atlantis'"));
    assert!(app.ctx.location.last_known().await.is_none());
}

#[tokio::test]
async fn test_clear_keeps_permission() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;
    run(&app, &["location", "init"]).await.unwrap();

    assert_eq!(run(&app, &["location", "clear"]).await.unwrap(), "Location cleared");
    let out = run(&app, &["location", "show"]).await.unwrap();
    assert!(out.starts_with("No current location"));
    assert!(!out.contains("Last known"));
    assert!(out.ends_with("Permission: granted"));
}

#[tokio::test]
async fn test_crops_near_device_location() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;

    let out = run(&app, &["crops", "--date", "2025-04-10"]).await.unwrap();
    assert!(out.starts_with("Upcoming crops (next 30 days)"));
    assert!(out.contains("Mustard  [FLOWERING NOW]"));
    assert!(out.contains("Flowering: Apr 5 - Apr 20"));
    assert!(out.contains("0.0 km away"));
    assert!(out.contains("Recommended: 4 hives/acre"));
    assert!(!out.contains("Onion"));
    assert!(!out.contains("Potato"));
    assert_eq!(app.device.prompts(), 1);
}

#[tokio::test]
async fn test_crops_without_location() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), denied()).await;

    let out = run(&app, &["crops", "--date", "2025-04-10"]).await.unwrap();
    assert!(out.starts_with("Location unavailable; distances not shown"));
    assert!(out.contains("Mustard  [FLOWERING NOW]"));
    assert!(!out.contains("km away"));

    let out = run(&app, &["crops", "--date", "2025-07-01"]).await.unwrap();
    assert!(out.ends_with("No upcoming crops found in the next 30 days"));
}

#[tokio::test]
async fn test_status_follows_probe() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;

    assert_eq!(run(&app, &["status"]).await.unwrap(), "Network: offline");
    app.probe.online.store(true, Ordering::SeqCst);
    assert_eq!(run(&app, &["status"]).await.unwrap(), "Network: online");
}

#[tokio::test(start_paused = true)]
async fn test_status_watch_reports_transitions() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path(), granted()).await;

    let mut out = Vec::new();
    let flip = async {
        // Between the second and third probe (30s interval)
        tokio::time::sleep(std::time::Duration::from_secs(45)).await;
        app.probe.online.store(true, Ordering::SeqCst);
    };
    let (reported, ()) = tokio::join!(status::watch(&app.ctx, Some(2), &mut out), flip);

    assert_eq!(reported.unwrap(), 2);
    assert_eq!(String::from_utf8(out).unwrap(), "Network: offline\nNetwork: online\n");
}
