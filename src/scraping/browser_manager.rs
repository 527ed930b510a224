//! Native browser management using `chromiumoxide`.
//!
//! This module is the single place that knows how to:
//! * find a usable browser executable (Chrome → Chromium → Brave, cross-platform);
//! * build a headless `BrowserConfig`;
//! * launch a browser and keep its CDP handler running;
//! * wait for a page to settle after navigation.

use anyhow::{anyhow, Result};
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::config::PageSettle;

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// ── Browser executable discovery ─────────────────────────────────────────────

/// Executable names looked up on `PATH`, most preferred first.
const PATH_NAMES: &[&str] = &[
    "google-chrome",
    "chromium",
    "chromium-browser",
    "chrome",
    "brave-browser",
];

#[cfg(target_os = "linux")]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const INSTALL_PATHS: &[&str] = &[];

/// Find a Chromium-family executable: `CHROME_EXECUTABLE`, then `PATH`,
/// then the platform's usual install locations.
pub fn find_chrome_executable() -> Option<PathBuf> {
    let from_env = std::env::var_os(ENV_CHROME_EXECUTABLE)
        .map(PathBuf::from)
        .filter(|p| p.is_file());

    let on_path = || {
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .flat_map(|dir| PATH_NAMES.iter().map(move |name| dir.join(name)))
            .find(|p| p.is_file())
    };

    let installed = || {
        INSTALL_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    };

    from_env.or_else(on_path).or_else(installed)
}

// ── Headless browser config builder ──────────────────────────────────────────

/// Build a `BrowserConfig` for headless operation.
///
/// `--no-sandbox` and `--disable-dev-shm-usage` keep Chromium usable in CI
/// containers.
pub fn build_headless_config(exe: &Path, width: u32, height: u32) -> Result<BrowserConfig> {
    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg(format!("--user-agent={}", DESKTOP_USER_AGENT))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

/// Launch a headless browser and spawn the task driving its CDP connection.
///
/// Abort the returned handle after closing the browser.
pub async fn launch_headless(width: u32, height: u32) -> Result<(Browser, JoinHandle<()>)> {
    let exe = find_chrome_executable().ok_or_else(|| {
        anyhow!(
            "No browser found. Install Chrome, Chromium or Brave, or set {} to its path.",
            ENV_CHROME_EXECUTABLE
        )
    })?;

    info!("launching headless browser ({}) @ {}x{}", exe.display(), width, height);
    let config = build_headless_config(&exe, width, height)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe.display(), e))?;

    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!("CDP handler error: {}", e);
            }
        }
    });

    Ok((browser, handle))
}

// ── Settle wait ──────────────────────────────────────────────────────────────

/// `[readyState === "complete", number of loaded resources]` in one round trip.
const LOAD_STATE_JS: &str =
    "[document.readyState === 'complete', performance.getEntriesByType('resource').length]";

async fn load_state(page: &Page) -> Option<(bool, u64)> {
    page.evaluate(LOAD_STATE_JS)
        .await
        .ok()?
        .into_value::<(bool, u64)>()
        .ok()
}

/// Poll until the document is complete and no new resources have loaded for
/// `settle.quiet`, giving up after `settle.timeout`. Never fails: a page that
/// keeps loading is read as-is.
pub async fn wait_until_stable(page: &Page, settle: PageSettle) -> Result<()> {
    const POLL: Duration = Duration::from_millis(100);
    let deadline = Instant::now() + settle.timeout;
    let mut last: Option<(u64, Instant)> = None;

    while Instant::now() < deadline {
        match load_state(page).await {
            Some((true, count)) => match last {
                Some((seen, since)) if seen == count => {
                    if since.elapsed() >= settle.quiet {
                        debug!("page settled with {} resources", count);
                        return Ok(());
                    }
                }
                _ => last = Some((count, Instant::now())),
            },
            _ => last = None,
        }
        tokio::time::sleep(POLL).await;
    }

    debug!("page still loading after {:?}; reading it anyway", settle.timeout);
    Ok(())
}
