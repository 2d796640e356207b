//! Image loads against a mock server, counted on the loading bus

use blogdesk::config::ImageConfig;
use blogdesk::image_loader::{ImageError, ImageStatus, Settlement};
use blogdesk::{HttpImageLoader, ImageLoader, LoadingBus, LoadingOverlay, TrackedImage};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{StateRecorder, setup_mock_server, test_url};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[tokio::test]
async fn test_loaded_image_settles_counter_and_view() {
    let mut server = setup_mock_server().await;
    let _mock = server
        .mock("GET", "/covers/1.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_BYTES)
        .create_async()
        .await;

    let bus = LoadingBus::new();
    let recorder = StateRecorder::attach(&bus);
    let slot = TrackedImage::new(&bus);
    let loader = HttpImageLoader::default();

    let settlement = slot.load(&loader, &test_url(&server, "/covers/1.png")).await;

    assert_eq!(settlement, Some(Settlement::Applied));
    match slot.status() {
        ImageStatus::Loaded { image, .. } => {
            assert_eq!(image.content_type, "image/png");
            assert_eq!(image.bytes, PNG_BYTES);
        }
        other => panic!("Expected a loaded image, got: {other:?}"),
    }
    assert_eq!(slot.view().opacity, 1.0);
    let states = recorder.states();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].image_pending(), 1);
    assert!(!bus.is_loading());
}

#[tokio::test]
async fn test_loader_rejects_bad_responses() {
    let mut server = setup_mock_server().await;
    let _missing = server.mock("GET", "/missing.png").with_status(404).create_async().await;
    let _html = server
        .mock("GET", "/page.png")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html></html>")
        .create_async()
        .await;
    let _large = server
        .mock("GET", "/large.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(vec![0u8; 64])
        .create_async()
        .await;

    let loader = HttpImageLoader::new(ImageConfig {
        timeout: Duration::from_secs(5),
        max_size: 16,
    });

    assert_eq!(
        loader.load(&test_url(&server, "/missing.png")).await,
        Err(ImageError::Status { status: 404 })
    );
    assert!(matches!(
        loader.load(&test_url(&server, "/page.png")).await,
        Err(ImageError::NotAnImage { .. })
    ));
    assert!(matches!(
        loader.load(&test_url(&server, "/large.png")).await,
        Err(ImageError::TooLarge { limit: 16, .. })
    ));
}

#[tokio::test]
async fn test_failed_image_shows_error_and_releases_overlay() {
    let mut server = setup_mock_server().await;
    let _mock = server.mock("GET", "/avatar.png").with_status(500).create_async().await;

    let bus = LoadingBus::new();
    let overlay = LoadingOverlay::mount(&bus);
    let slot = TrackedImage::new(&bus);
    let loader: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::default());

    let handle = slot
        .spawn_load(loader, test_url(&server, "/avatar.png"))
        .expect("new source should start a load");
    assert!(overlay.is_visible());
    assert_eq!(overlay.view().label, "1 loading…");

    assert_eq!(handle.await.expect("load task should not panic"), Settlement::Applied);
    assert!(slot.status().is_failed());
    assert!(slot.view().error_label.is_some());
    assert!(!overlay.is_visible());
}

#[tokio::test]
async fn test_aborted_load_still_balances_counter() {
    // Accepts and never answers, so the load stays pending until aborted
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("listener should have an address");
    let hold = tokio::spawn(async move {
        let mut sockets = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            sockets.push(socket);
        }
    });

    let bus = LoadingBus::new();
    let slot = TrackedImage::new(&bus);
    let loader: Arc<dyn ImageLoader> = Arc::new(HttpImageLoader::default());
    let handle = slot
        .spawn_load(loader, format!("http://{addr}/slow.png"))
        .expect("new source should start a load");
    assert_eq!(bus.state().image_pending(), 1);

    handle.abort();
    assert!(handle.await.is_err());
    assert_eq!(bus.state().image_pending(), 0);
    assert_eq!(bus.metrics().snapshot().clamped_decrements, 0);

    hold.abort();
}
