//! Ingestion pipeline tests against in-process fakes.
//!
//! Run with: `cargo test -p reelstash-api --test ingest_test`

mod helpers;

use helpers::fakes::{ProbeBehavior, RemuxBehavior, StorageCall};
use helpers::fixtures::{is_video_key, mp4_bytes, png_bytes};
use helpers::{setup_context, TestOptions, TEST_BUCKET};
use reelstash_core::{AppError, AssetReferenceFormat};
use reelstash_processing::Orientation;
use uuid::Uuid;

#[tokio::test]
async fn test_landscape_upload_updates_record() {
    let ctx = setup_context(TestOptions::default());
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;
    let body = mp4_bytes(200 * 1024);

    let outcome = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, body.as_slice(), Some("video/mp4"))
        .await
        .unwrap();

    assert_eq!(outcome.orientation, Orientation::Landscape);
    let key = outcome.reference.key().to_string();
    assert!(is_video_key(&key, "landscape"), "key {}", key);

    assert_eq!(
        ctx.storage.calls(),
        vec![StorageCall::Upload {
            bucket: TEST_BUCKET.to_string(),
            key: key.clone(),
            content_type: "video/mp4".to_string(),
            size: body.len(),
        }]
    );

    let stored = ctx.stored_video(video.id).await;
    assert_eq!(stored.video_url, Some(format!("{},{}", TEST_BUCKET, key)));
    assert_eq!(outcome.video, stored);

    assert!(ctx.prober.saw_staged_file());
    assert_eq!(ctx.remuxer.calls(), 1);
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_orientation_selects_key_prefix() {
    for (ratio, prefix) in [("9:16", "portrait"), ("4:3", "other"), ("", "other")] {
        let ctx = setup_context(TestOptions {
            probe: ProbeBehavior::AspectRatio(ratio),
            ..Default::default()
        });
        let owner = Uuid::new_v4();
        let video = ctx.create_video(owner, None).await;

        let outcome = ctx
            .state
            .media
            .ingest
            .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
            .await
            .unwrap();

        assert!(
            is_video_key(outcome.reference.key(), prefix),
            "ratio {:?} gave key {}",
            ratio,
            outcome.reference.key()
        );
    }
}

#[tokio::test]
async fn test_url_format_writes_public_url() {
    let ctx = setup_context(TestOptions {
        format: AssetReferenceFormat::Url,
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    let outcome = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap();

    let expected = format!(
        "http://reel-videos.s3.us-east-2.amazonaws.com/{}",
        outcome.reference.key()
    );
    assert_eq!(ctx.stored_video(video.id).await.video_url, Some(expected));
}

#[tokio::test]
async fn test_non_mp4_rejected_before_any_work() {
    let ctx = setup_context(TestOptions::default());
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    // Declared as mp4, but the bytes are a PNG.
    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, png_bytes().as_slice(), Some("video/mp4"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UnsupportedMediaType(_)), "{:?}", err);
    assert!(ctx.storage.calls().is_empty());
    assert_eq!(ctx.prober.calls(), 0);
    assert_eq!(ctx.staged_files(), 0);
    assert_eq!(ctx.stored_video(video.id).await.video_url, None);
}

#[tokio::test]
async fn test_probe_failure_stops_pipeline() {
    let ctx = setup_context(TestOptions {
        probe: ProbeBehavior::Fail("moov atom not found"),
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, Some("reel-videos,landscape/old.mp4")).await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    match err {
        AppError::ExternalToolFailure { tool, diagnostics } => {
            assert_eq!(tool, "ffprobe");
            assert!(diagnostics.contains("moov atom not found"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(ctx.storage.calls().is_empty());
    assert_eq!(ctx.remuxer.calls(), 0);
    assert_eq!(ctx.staged_files(), 0);
    assert_eq!(
        ctx.stored_video(video.id).await.video_url.as_deref(),
        Some("reel-videos,landscape/old.mp4")
    );
}

#[tokio::test]
async fn test_remux_failure_removes_partial_output() {
    let ctx = setup_context(TestOptions {
        remux: RemuxBehavior::FailWithPartialOutput,
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ExternalToolFailure { .. }), "{:?}", err);
    assert_eq!(ctx.remuxer.calls(), 1);
    assert!(ctx.storage.calls().is_empty());
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_reads_path_reported_by_remuxer() {
    let ctx = setup_context(TestOptions {
        remux: RemuxBehavior::CopyElsewhere,
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;
    let body = mp4_bytes(8192);

    ctx.state
        .media
        .ingest
        .ingest(owner, video.id, body.as_slice(), None)
        .await
        .unwrap();

    let uploads = ctx.storage.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(matches!(&uploads[0], StorageCall::Upload { size, .. } if *size == body.len()));
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_reupload_deletes_previous_object_after_upload() {
    let ctx = setup_context(TestOptions::default());
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    let first = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap();
    let second = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(8192).as_slice(), None)
        .await
        .unwrap();

    assert_ne!(first.reference.key(), second.reference.key());

    let calls = ctx.storage.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[0], StorageCall::Upload { key, .. } if key == first.reference.key()));
    assert!(matches!(&calls[1], StorageCall::Upload { key, .. } if key == second.reference.key()));
    assert_eq!(
        calls[2],
        StorageCall::Delete {
            bucket: TEST_BUCKET.to_string(),
            key: first.reference.key().to_string(),
        }
    );

    assert_eq!(
        ctx.stored_video(video.id).await.video_url,
        Some(format!("{},{}", TEST_BUCKET, second.reference.key()))
    );
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_previous_reference_in_other_format_is_retired() {
    // Records written as public URLs keep retiring correctly after the
    // deployment switches to pair references.
    let ctx = setup_context(TestOptions::default());
    let owner = Uuid::new_v4();
    let video = ctx
        .create_video(
            owner,
            Some("http://legacy-bucket.s3.us-west-1.amazonaws.com/portrait/old.mp4"),
        )
        .await;

    ctx.state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap();

    assert_eq!(
        ctx.storage.deletes(),
        vec![StorageCall::Delete {
            bucket: "legacy-bucket".to_string(),
            key: "portrait/old.mp4".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_non_owner_rejected_before_reading_body() {
    let ctx = setup_context(TestOptions::default());
    let video = ctx.create_video(Uuid::new_v4(), None).await;
    let data = mp4_bytes(4096);
    let mut body = data.as_slice();

    let err = ctx
        .state
        .media
        .ingest
        .ingest(Uuid::new_v4(), video.id, &mut body, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)), "{:?}", err);
    assert_eq!(body.len(), data.len());
    assert!(ctx.storage.calls().is_empty());
    assert_eq!(ctx.prober.calls(), 0);
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let ctx = setup_context(TestOptions::default());

    let err = ctx
        .state
        .media
        .ingest
        .ingest(Uuid::new_v4(), Uuid::new_v4(), mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)), "{:?}", err);
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_failure_leaves_record_untouched() {
    let ctx = setup_context(TestOptions::default());
    ctx.storage.fail_uploads();
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, Some("reel-videos,landscape/old.mp4")).await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StoreUnavailable(_)), "{:?}", err);
    assert!(ctx.storage.deletes().is_empty());
    assert_eq!(
        ctx.stored_video(video.id).await.video_url.as_deref(),
        Some("reel-videos,landscape/old.mp4")
    );
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_delete_failure_keeps_old_reference() {
    let ctx = setup_context(TestOptions::default());
    ctx.storage.fail_deletes();
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, Some("reel-videos,landscape/old.mp4")).await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StoreUnavailable(_)), "{:?}", err);
    let calls = ctx.storage.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], StorageCall::Upload { .. }));
    assert_eq!(
        calls[1],
        StorageCall::Delete {
            bucket: TEST_BUCKET.to_string(),
            key: "landscape/old.mp4".to_string(),
        }
    );
    assert_eq!(
        ctx.stored_video(video.id).await.video_url.as_deref(),
        Some("reel-videos,landscape/old.mp4")
    );
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_unreadable_previous_reference_is_internal_error() {
    let ctx = setup_context(TestOptions::default());
    let owner = Uuid::new_v4();
    let video = ctx
        .create_video(owner, Some("https://cdn.example.com/videos/old.mp4"))
        .await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(4096).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)), "{:?}", err);
    assert!(ctx.storage.deletes().is_empty());
    assert_eq!(
        ctx.stored_video(video.id).await.video_url.as_deref(),
        Some("https://cdn.example.com/videos/old.mp4")
    );
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let ctx = setup_context(TestOptions {
        max_video_size_bytes: 64 * 1024,
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    let err = ctx
        .state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(128 * 1024).as_slice(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PayloadTooLarge(_)), "{:?}", err);
    assert_eq!(ctx.prober.calls(), 0);
    assert!(ctx.storage.calls().is_empty());
    assert_eq!(ctx.staged_files(), 0);
}

#[tokio::test]
async fn test_body_at_limit_accepted() {
    let ctx = setup_context(TestOptions {
        max_video_size_bytes: 64 * 1024,
        ..Default::default()
    });
    let owner = Uuid::new_v4();
    let video = ctx.create_video(owner, None).await;

    ctx.state
        .media
        .ingest
        .ingest(owner, video.id, mp4_bytes(64 * 1024).as_slice(), None)
        .await
        .unwrap();

    assert_eq!(ctx.storage.uploads().len(), 1);
}
