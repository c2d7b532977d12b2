use fantoccini::Client;
use fantoccini::error::CmdError;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Makes every lazy image load now and returns how many images it touched.
///
/// Switches `loading="lazy"` to eager, promotes `data-src`/`data-srcset`, then
/// scrolls to the bottom and back so scroll-triggered loaders fire too.
pub const FORCE_LAZY_IMAGES_SCRIPT: &str = r#"
const images = Array.from(document.querySelectorAll('img'));
let touched = 0;
for (const img of images) {
  let changed = false;
  if (img.getAttribute('loading') === 'lazy') {
    img.setAttribute('loading', 'eager');
    changed = true;
  }
  const src = img.getAttribute('data-src');
  if (src && img.getAttribute('src') !== src) {
    img.setAttribute('src', src);
    changed = true;
  }
  const srcset = img.getAttribute('data-srcset');
  if (srcset && img.getAttribute('srcset') !== srcset) {
    img.setAttribute('srcset', srcset);
    changed = true;
  }
  if (changed) {
    touched += 1;
  }
}
window.scrollTo(0, document.documentElement.scrollHeight);
window.scrollTo(0, 0);
return touched;
"#;

/// True once every image on the page has finished loading (or failed)
pub const IMAGES_COMPLETE_SCRIPT: &str =
    "return Array.from(document.images).every(function (img) { return img.complete; });";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads the image count returned by [`FORCE_LAZY_IMAGES_SCRIPT`]
pub fn touched_count(value: &Value) -> usize {
    value.as_u64().unwrap_or(0) as usize
}

/// Runs [`FORCE_LAZY_IMAGES_SCRIPT`] in the current page
pub async fn force_lazy_images(client: &Client) -> Result<usize, CmdError> {
    let value = client.execute(FORCE_LAZY_IMAGES_SCRIPT, Vec::new()).await?;
    let touched = touched_count(&value);
    ::log::debug!("Forced {} lazy image(s) to load", touched);
    Ok(touched)
}

/// Polls until all images are complete or `timeout` passes.
///
/// Returns whether the images completed in time.
pub async fn wait_for_images(client: &Client, timeout: Duration) -> Result<bool, CmdError> {
    let deadline = Instant::now() + timeout;
    loop {
        let complete = client.execute(IMAGES_COMPLETE_SCRIPT, Vec::new()).await?;
        if complete.as_bool().unwrap_or(false) {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            ::log::warn!("Images still loading after {:?}", timeout);
            return Ok(false);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
