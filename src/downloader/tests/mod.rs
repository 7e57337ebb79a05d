use super::test_helpers::*;
use super::*;
use crate::types::MediaFormat;


fn downloader(fake: &FakeToolchain) -> Downloader {
    Downloader::new(Arc::new(fake.config.clone()))
}

fn video_request(quality: &str, fps: &str) -> DownloadRequest {
    let mut request = DownloadRequest::new("https://example.com/v", MediaFormat::Video);
    request.video_quality = Some(quality.into());
    request.video_fps = Some(fps.into());
    request
}

#[test]
fn validate_url_accepts_http_and_https_only() {
    assert_eq!(
        validate_url("  https://example.com/v ").unwrap(),
        "https://example.com/v"
    );
    assert!(validate_url("http://example.com").is_ok());
    assert!(validate_url("HTTPS://example.com/x").is_ok());

    for bad in ["ftp://example.com/v", "file:///etc/passwd", "example.com", "", "https://"] {
        assert!(
            matches!(validate_url(bad), Err(Error::Validation(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn prepare_scratch_dir_creates_root_and_purges_leftovers() {
    let fake = FakeToolchain::new(PRODUCES_NOTHING);
    let root = fake.config.download.scratch_dir.clone();
    std::fs::create_dir_all(root.join(uuid::Uuid::new_v4().to_string())).unwrap();
    std::fs::create_dir_all(root.join("not-a-workspace")).unwrap();

    downloader(&fake).prepare_scratch_dir().await.unwrap();

    assert!(root.is_dir());
    assert_eq!(fake.scratch_entries(), vec![root.join("not-a-workspace")]);
}

#[tokio::test]
async fn prepare_scratch_dir_keeps_leftovers_when_purge_disabled() {
    let mut fake = FakeToolchain::new(PRODUCES_NOTHING);
    fake.config.download.purge_stale_workspaces = false;
    let root = fake.config.download.scratch_dir.clone();
    let leftover = root.join(uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&leftover).unwrap();

    downloader(&fake).prepare_scratch_dir().await.unwrap();

    assert_eq!(fake.scratch_entries(), vec![leftover]);
}
