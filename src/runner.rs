use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::scenarios::{self, SCENARIOS_KEY};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use url::Url;

/// Parses a target origin such as `http://localhost:3000`
pub fn parse_origin(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidOrigin(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::InvalidOrigin(raw.to_string()));
    }
    Ok(url)
}

/// Moves `raw` onto `origin`, keeping its user info, path, query and fragment
pub fn retarget_url(raw: &str, origin: &Url) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let mut moved = origin.clone();
    moved.set_username(parsed.username()).ok()?;
    moved.set_password(parsed.password()).ok()?;
    moved.set_path(parsed.path());
    moved.set_query(parsed.query());
    moved.set_fragment(parsed.fragment());
    Some(moved.to_string())
}

/// Points every scenario `url` at `origin`. `referenceUrl` is left alone.
pub fn retarget_scenarios(document: &mut Value, origin: &Url) -> usize {
    let Some(scenarios) = document
        .get_mut(SCENARIOS_KEY)
        .and_then(Value::as_array_mut)
    else {
        return 0;
    };

    let mut changed = 0;
    for scenario in scenarios.iter_mut() {
        let Some(url) = scenario.get_mut("url") else {
            continue;
        };
        let Some(moved) = url.as_str().and_then(|raw| retarget_url(raw, origin)) else {
            continue;
        };
        ::log::debug!("Retargeting scenario url {} -> {}", url, moved);
        *url = Value::String(moved);
        changed += 1;
    }
    changed
}

/// Sets the `domain` of every cookie object to `host`
pub fn retarget_cookies(cookies: &mut Value, host: &str) -> usize {
    let Some(cookies) = cookies.as_array_mut() else {
        return 0;
    };

    let mut changed = 0;
    for cookie in cookies.iter_mut().filter_map(Value::as_object_mut) {
        cookie.insert("domain".to_string(), Value::String(host.to_string()));
        changed += 1;
    }
    changed
}

/// Original bytes of a file that is about to be rewritten
#[derive(Debug)]
struct Snapshot {
    path: PathBuf,
    contents: Vec<u8>,
}

/// Puts captured files back the way they were.
///
/// Call [`RestoreGuard::restore`] to see restore errors; otherwise the files
/// are restored on drop and failures are only logged.
#[derive(Debug)]
pub struct RestoreGuard {
    snapshots: Vec<Snapshot>,
    restored: bool,
}

impl RestoreGuard {
    /// Captures the current contents of every path
    pub fn capture<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut snapshots = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let contents = std::fs::read(path).map_err(|e| Error::io(path, e))?;
            snapshots.push(Snapshot {
                path: path.to_path_buf(),
                contents,
            });
        }
        Ok(Self {
            snapshots,
            restored: false,
        })
    }

    /// Restores every captured file.
    ///
    /// A failing file does not stop the others; the first error is returned.
    pub fn restore(mut self) -> Result<()> {
        let mut first_error = None;
        for snapshot in &self.snapshots {
            match std::fs::write(&snapshot.path, &snapshot.contents) {
                Ok(()) => ::log::debug!("Restored {}", snapshot.path.display()),
                Err(e) => {
                    ::log::error!("Failed to restore {}: {}", snapshot.path.display(), e);
                    first_error.get_or_insert(Error::io(&snapshot.path, e));
                }
            }
        }
        self.restored = true;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        for snapshot in &self.snapshots {
            if let Err(e) = std::fs::write(&snapshot.path, &snapshot.contents) {
                ::log::error!("Failed to restore {}: {}", snapshot.path.display(), e);
            }
        }
    }
}

/// Rewrites the configuration and cookie files for the target origin
fn rewrite_for_origin(config: &RunConfig, origin: &Url) -> Result<()> {
    let mut document = scenarios::read_document(&config.config_path)?;
    let changed = retarget_scenarios(&mut document, origin);
    scenarios::write_document(&config.config_path, &document)?;
    ::log::info!("Pointed {} scenario(s) at {}", changed, origin);

    if let Some(cookies_path) = &config.cookies_path {
        let host = origin.host_str().unwrap_or_default();
        let contents =
            std::fs::read_to_string(cookies_path).map_err(|e| Error::io(cookies_path, e))?;
        let mut cookies: Value =
            serde_json::from_str(&contents).map_err(|e| Error::json(cookies_path, e))?;
        let changed = retarget_cookies(&mut cookies, host);
        scenarios::write_document(cookies_path, &cookies)?;
        ::log::info!("Set domain of {} cookie(s) to {}", changed, host);
    }

    Ok(())
}

/// Runs the screenshot-diff tool against temporarily rewritten files.
///
/// Returns the tool's exit code, or `None` if it was killed by a signal. The
/// configuration and cookie files are restored whatever the outcome.
pub async fn run_local(config: &RunConfig) -> Result<Option<i32>> {
    if !config.config_path.exists() {
        return Err(Error::ConfigMissing(config.config_path.clone()));
    }

    let mut paths = vec![config.config_path.clone()];
    if let Some(cookies_path) = &config.cookies_path {
        paths.push(cookies_path.clone());
    }
    let guard = RestoreGuard::capture(&paths)?;

    if let Some(origin) = &config.target_origin {
        rewrite_for_origin(config, origin)?;
    }

    let config_arg = format!("--config={}", config.config_path.display());
    ::log::info!(
        "Running {} {} {}",
        config.command,
        config.args.join(" "),
        config_arg
    );

    let status = Command::new(&config.command)
        .args(&config.args)
        .arg(&config_arg)
        .status()
        .await
        .map_err(|source| Error::Spawn {
            command: config.command.clone(),
            source,
        })?;

    guard.restore()?;

    ::log::info!("{} exited with {}", config.command, status);
    Ok(status.code())
}
