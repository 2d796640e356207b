// blogdesk-fetch: fetch URLs concurrently with the global progress bar on stderr.
//
// Image URLs go through the image loader, everything else through the tracked
// HTTP client; both feed the same loading bus.

use anyhow::{Context, Result, bail};
use futures::future::join_all;
use std::io::Write;
use std::sync::Arc;

use blogdesk::config::{API_BASE_URL_ENV, ClientConfig};
use blogdesk::image_loader::{ImageStatus, Settlement};
use blogdesk::presentation::{ProgressSink, ProgressView, overlay_label};
use blogdesk::{HttpImageLoader, LoadingBus, ProgressDriver, TrackedClient, TrackedImage};

const BAR_WIDTH: usize = 40;
const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn load_config() -> Result<ClientConfig> {
    if std::env::var_os(API_BASE_URL_ENV).is_some() {
        return ClientConfig::from_env().context("Invalid client configuration");
    }
    ClientConfig::builder()
        .api_base_url("http://localhost/")
        .build()
        .context("Invalid default configuration")
}

fn stderr_sink() -> ProgressSink {
    Arc::new(|view: ProgressView| {
        let mut stderr = std::io::stderr().lock();
        let _ = if view.visible {
            write!(stderr, "\r{}", view.render_text(BAR_WIDTH))
        } else {
            writeln!(stderr, "\r{:width$}", "", width = BAR_WIDTH + 8)
        };
        let _ = stderr.flush();
    })
}

async fn fetch_page(client: &TrackedClient, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    Ok(format!("{} ({} bytes)", response.status, response.body.len()))
}

async fn fetch_image(bus: &LoadingBus, loader: &HttpImageLoader, url: &str) -> Result<String> {
    let slot = TrackedImage::new(bus);
    if slot.load(loader, url).await == Some(Settlement::Stale) {
        log::debug!("{url}: superseded before it settled");
    }
    match slot.status() {
        ImageStatus::Loaded { image, .. } => {
            Ok(format!("{} ({} bytes)", image.content_type, image.bytes.len()))
        }
        ImageStatus::Failed { reason, .. } => bail!(reason),
        other => bail!("image never settled: {other:?}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        bail!("usage: blogdesk-fetch <url>...");
    }

    let config = load_config()?;
    let bus = LoadingBus::new();
    let client = TrackedClient::with_http_client(
        config.api_base_url(),
        reqwest::Client::new(),
        config.request_timeout(),
    )?;
    client.install_loading_instrumentation(&bus);
    let loader = HttpImageLoader::new(config.image().clone());

    let driver = ProgressDriver::mount(&bus, config.progress().clone(), Some(stderr_sink()))?;
    let _status_line = bus.subscribe(|state| {
        log::debug!("{}", overlay_label(state.total_pending()));
    });

    let fetches = urls.iter().map(|url| {
        let (bus, client, loader) = (&bus, &client, &loader);
        async move {
            let result = if is_image_url(url) {
                fetch_image(bus, loader, url).await
            } else {
                fetch_page(client, url).await
            };
            (url, result)
        }
    });
    let results = join_all(fetches).await;

    // Let the bar reach 100% and hide before printing.
    tokio::time::sleep(config.progress().hide_delay).await;
    driver.unmount();

    let mut failures = 0usize;
    for (url, result) in results {
        match result {
            Ok(summary) => println!("{url}: {summary}"),
            Err(e) => {
                failures += 1;
                println!("{url}: error: {e:#}");
            }
        }
    }
    log::info!("bus metrics: {:?}", bus.metrics().snapshot());

    if failures > 0 {
        bail!("{failures} of {} fetches failed", urls.len());
    }
    Ok(())
}
