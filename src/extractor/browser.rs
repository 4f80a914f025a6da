// Headless-browser session lifecycle
//
// One isolated browser process per extraction stage. The session must be
// torn down on every exit path; an unreleased browser is a leaked process.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::errors::ExtractError;
use super::fetch::BROWSER_USER_AGENT;

/// Navigation may take this long before the stage gives up
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Browser executables probed on the host, in order
const BROWSER_BINARIES: [&str; 5] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// Launch an isolated headless browser with a fresh page carrying the
    /// desktop user agent. Fails fast with `BrowserUnavailable` when no
    /// executable can be found or started.
    pub async fn launch() -> Result<Self, ExtractError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--mute-audio");
        if let Some(path) = find_browser_executable() {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ExtractError::BrowserUnavailable)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| ExtractError::BrowserUnavailable(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    eprintln!("[Browser] Handler error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                dispose(browser, handler).await;
                return Err(ExtractError::StageFailed(e.to_string()));
            }
        };

        let override_ua = SetUserAgentOverrideParams::new(BROWSER_USER_AGENT.to_string());
        if let Err(e) = page.execute(override_ua).await {
            dispose(browser, handler).await;
            return Err(ExtractError::StageFailed(e.to_string()));
        }

        Ok(Self {
            browser,
            handler,
            page,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Navigate and wait for initial DOM construction only. Social pages
    /// keep background connections open, so full network idle is never
    /// awaited here.
    pub async fn goto(&self, url: &str) -> Result<(), ExtractError> {
        tokio::time::timeout(NAVIGATION_TIMEOUT, self.page.goto(url))
            .await
            .map_err(|_| ExtractError::StageFailed(format!("navigation to {} timed out", url)))??;
        let _ = self.page.wait_for_navigation().await;
        Ok(())
    }

    /// Tear the session down: close the browser, reap the process, stop the
    /// event pump. Callers invoke this on every exit path.
    pub async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
    }
}

fn find_browser_executable() -> Option<PathBuf> {
    for name in BROWSER_BINARIES {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    // Debian installs chromium here even when it is not on PATH
    let fallback = PathBuf::from("/usr/bin/chromium");
    fallback.exists().then_some(fallback)
}

async fn dispose(mut browser: Browser, handler: JoinHandle<()>) {
    let _ = browser.close().await;
    let _ = browser.wait().await;
    handler.abort();
}
