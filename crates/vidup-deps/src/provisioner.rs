//! Tool presence checks and background provisioning.

use crate::download::download_file;
use crate::error::{DepsError, DepsResult};
use crate::extract::extract_matching;
use crate::layout::{executable_name, executable_path, extract_rules};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};
use vidup_config::{user_install_root, DepsConfig};
use vidup_core::{StatusEvent, StatusUpdate, Tool};

/// Presence of one tool, for display.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    pub present: bool,
    pub path: Option<PathBuf>,
}

/// Checks for and installs FFmpeg and Real-ESRGAN.
#[derive(Clone)]
pub struct Provisioner {
    client: Client,
    config: DepsConfig,
    app_dir: PathBuf,
    fallback_root: Option<PathBuf>,
    path_lookup: bool,
}

impl Provisioner {
    /// Create a provisioner installing under `app_dir`.
    ///
    /// The per-user fallback root is resolved from the environment.
    pub fn new(config: &DepsConfig, app_dir: impl Into<PathBuf>) -> DepsResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            app_dir: app_dir.into(),
            fallback_root: user_install_root(),
            path_lookup: true,
        })
    }

    /// Override the per-user fallback root.
    pub fn with_fallback_root(mut self, root: Option<PathBuf>) -> Self {
        self.fallback_root = root;
        self
    }

    /// Disable the `PATH` lookup for FFmpeg.
    pub fn without_path_lookup(mut self) -> Self {
        self.path_lookup = false;
        self
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    fn roots(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.app_dir.as_path()).chain(self.fallback_root.as_deref())
    }

    /// Installed executable for `tool` under the app dir or the fallback root.
    pub fn installed_path(&self, tool: Tool) -> Option<PathBuf> {
        self.roots()
            .map(|root| executable_path(root, tool))
            .find(|path| path.is_file())
    }

    /// Path a tool would be run from, including `PATH` for FFmpeg.
    pub fn locate(&self, tool: Tool) -> Option<PathBuf> {
        self.installed_path(tool).or_else(|| match tool {
            Tool::Ffmpeg if self.path_lookup => which::which(executable_name(tool)).ok(),
            _ => None,
        })
    }

    /// FFmpeg is installed or resolvable on `PATH`.
    pub fn check_ffmpeg(&self) -> bool {
        self.locate(Tool::Ffmpeg).is_some()
    }

    /// The Real-ESRGAN engine is installed.
    pub fn check_realesrgan(&self) -> bool {
        self.locate(Tool::RealEsrgan).is_some()
    }

    pub fn check(&self, tool: Tool) -> bool {
        match tool {
            Tool::Ffmpeg => self.check_ffmpeg(),
            Tool::RealEsrgan => self.check_realesrgan(),
        }
    }

    /// Presence of every tool.
    pub fn status(&self) -> Vec<ToolStatus> {
        Tool::ALL
            .iter()
            .map(|&tool| {
                let path = self.locate(tool);
                ToolStatus {
                    tool,
                    present: path.is_some(),
                    path,
                }
            })
            .collect()
    }

    /// Tools that still need installing.
    pub fn missing(&self) -> Vec<Tool> {
        Tool::ALL.into_iter().filter(|&tool| !self.check(tool)).collect()
    }

    /// First root that can be created and written to.
    pub fn resolve_install_root(&self) -> DepsResult<PathBuf> {
        let mut tried = Vec::new();

        for root in self.roots() {
            if is_writable(root) {
                return Ok(root.to_path_buf());
            }
            warn!("Install directory {:?} is not writable", root);
            tried.push(root.to_path_buf());
        }

        Err(DepsError::NoWritableRoot { tried })
    }

    fn url_for(&self, tool: Tool) -> &str {
        match tool {
            Tool::Ffmpeg => &self.config.ffmpeg_url,
            Tool::RealEsrgan => &self.config.realesrgan_url,
        }
    }

    /// Download and unpack FFmpeg. Failures are logged and reported as `false`.
    pub async fn download_ffmpeg<F>(&self, on_status: &F) -> bool
    where
        F: Fn(StatusEvent),
    {
        self.download_tool(Tool::Ffmpeg, on_status).await
    }

    /// Download and unpack the Real-ESRGAN engine and models.
    pub async fn download_realesrgan<F>(&self, on_status: &F) -> bool
    where
        F: Fn(StatusEvent),
    {
        self.download_tool(Tool::RealEsrgan, on_status).await
    }

    /// Download and unpack `tool`. Failures are logged and reported as `false`.
    pub async fn download_tool<F>(&self, tool: Tool, on_status: &F) -> bool
    where
        F: Fn(StatusEvent),
    {
        match self.install(tool, on_status).await {
            Ok(files) => {
                info!("Installed {} ({} files)", tool.display_name(), files);
                on_status(StatusUpdate::with_progress(format!("{} installed", tool.display_name()), 1.0).into());
                true
            }
            Err(e) => {
                error!("Failed to install {}: {}", tool.display_name(), e);
                on_status(StatusUpdate::message(format!("{} download failed: {}", tool.display_name(), e)).into());
                false
            }
        }
    }

    async fn install<F>(&self, tool: Tool, on_status: &F) -> DepsResult<usize>
    where
        F: Fn(StatusEvent),
    {
        let root = self.resolve_install_root()?;
        let label = tool.display_name();
        let url = self.url_for(tool);

        on_status(StatusUpdate::with_progress(format!("Downloading {}...", label), 0.0).into());
        info!("Downloading {} from {}", label, url);

        // Removed on drop, whichever way this function exits.
        let archive = tempfile::Builder::new()
            .prefix("vidup-")
            .suffix(".zip")
            .tempfile()?
            .into_temp_path();

        let mut last_percent = None;
        let stall = Duration::from_secs(self.config.timeout_seconds);
        download_file(&self.client, url, &archive, stall, |progress| {
            let percent = progress.percent();
            if percent.is_none() || percent != last_percent {
                last_percent = percent;
                on_status(progress.to_status(label).into());
            }
        })
        .await?;

        on_status(StatusUpdate::message(format!("Extracting {}...", label)).into());
        let archive_path = archive.to_path_buf();
        let rules = extract_rules(tool);
        let written = tokio::task::spawn_blocking(move || extract_matching(&archive_path, &root, &rules))
            .await
            .map_err(|e| DepsError::Runtime(e.to_string()))??;

        drop(archive);

        if written.is_empty() {
            return Err(DepsError::NoMatchingEntries { tool });
        }
        Ok(written.len())
    }

    /// Install whatever is missing on a background thread.
    ///
    /// `on_status` is called from the worker thread and receives
    /// [`StatusEvent::Complete`] exactly once, after all downloads finished or
    /// failed. When nothing is missing it is called with `Complete` on the
    /// caller's thread and `None` is returned.
    pub fn ensure_dependencies<F>(&self, on_status: F) -> Option<JoinHandle<()>>
    where
        F: Fn(StatusEvent) + Send + 'static,
    {
        let missing = self.missing();
        if missing.is_empty() {
            info!("All external tools are present");
            on_status(StatusEvent::Complete);
            return None;
        }

        info!("Missing tools: {:?}", missing);
        let provisioner = self.clone();

        let handle = thread::spawn(move || {
            match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt.block_on(async {
                    for tool in missing {
                        provisioner.download_tool(tool, &on_status).await;
                    }
                }),
                Err(e) => {
                    error!("Failed to start download runtime: {}", e);
                    on_status(StatusUpdate::message(format!("Dependency download failed: {}", e)).into());
                }
            }
            on_status(StatusEvent::Complete);
        });

        Some(handle)
    }
}

fn is_writable(dir: &Path) -> bool {
    std::fs::create_dir_all(dir).is_ok() && tempfile::NamedTempFile::new_in(dir).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::test_server::{refused_url, serve, Reply};
    use crate::extract::build_zip;
    use crate::layout::tool_dir;
    use std::sync::{Arc, Mutex};

    fn provisioner(app_dir: &Path, config: DepsConfig) -> Provisioner {
        Provisioner::new(&config, app_dir)
            .unwrap()
            .with_fallback_root(None)
            .without_path_lookup()
    }

    fn place(path: PathBuf) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"stub").unwrap();
    }

    fn recorder() -> (Arc<Mutex<Vec<StatusEvent>>>, impl Fn(StatusEvent) + Send + 'static) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        (events, move |event| sink.lock().unwrap().push(event))
    }

    #[test]
    fn test_checks_follow_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let p = provisioner(dir.path(), DepsConfig::default());

        assert!(!p.check_ffmpeg());
        assert!(!p.check_realesrgan());
        assert_eq!(p.missing(), vec![Tool::Ffmpeg, Tool::RealEsrgan]);

        place(executable_path(dir.path(), Tool::Ffmpeg));
        place(executable_path(dir.path(), Tool::RealEsrgan));

        assert!(p.check_ffmpeg());
        assert!(p.check_realesrgan());
        assert!(p.missing().is_empty());
    }

    #[test]
    fn test_fallback_root_counts_as_installed() {
        let app = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let p = provisioner(app.path(), DepsConfig::default())
            .with_fallback_root(Some(user.path().to_path_buf()));

        place(executable_path(user.path(), Tool::RealEsrgan));

        assert!(p.check_realesrgan());
        assert_eq!(
            p.installed_path(Tool::RealEsrgan),
            Some(executable_path(user.path(), Tool::RealEsrgan))
        );
    }

    #[test]
    fn test_install_root_prefers_app_dir() {
        let app = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let p = provisioner(app.path(), DepsConfig::default())
            .with_fallback_root(Some(user.path().to_path_buf()));

        assert_eq!(p.resolve_install_root().unwrap(), app.path());
    }

    #[test]
    fn test_install_root_falls_back_when_app_dir_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let user = dir.path().join("user");

        let p = provisioner(&blocker.join("app"), DepsConfig::default())
            .with_fallback_root(Some(user.clone()));
        assert_eq!(p.resolve_install_root().unwrap(), user);

        let p = provisioner(&blocker.join("app"), DepsConfig::default());
        assert!(matches!(
            p.resolve_install_root(),
            Err(DepsError::NoWritableRoot { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_realesrgan_unpacks_layout() {
        let exe = executable_name(Tool::RealEsrgan);
        let archive = build_zip(&[
            (exe.as_str(), b"engine"),
            ("vcomp140.dll", b"runtime"),
            ("models/", b""),
            ("models/realesr-animevideov3-x2.bin", b"weights"),
            ("models/realesr-animevideov3-x2.param", b"graph"),
            ("input.jpg", b"sample"),
        ]);
        let base = serve(vec![Reply::Full(200, archive)]);

        let dir = tempfile::tempdir().unwrap();
        let config = DepsConfig {
            realesrgan_url: format!("{}/realesrgan.zip", base),
            timeout_seconds: 5,
            ..DepsConfig::default()
        };
        let p = provisioner(dir.path(), config);

        let (events, sink) = recorder();
        assert!(p.download_realesrgan(&sink).await);

        let engine = tool_dir(dir.path(), Tool::RealEsrgan);
        assert!(p.check_realesrgan());
        assert!(engine.join("vcomp140.dll").is_file());
        assert!(engine.join("models").join("realesr-animevideov3-x2.bin").is_file());
        assert!(engine.join("models").join("realesr-animevideov3-x2.param").is_file());
        assert!(!engine.join("input.jpg").exists());

        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, StatusEvent::Status(s) if s.message.starts_with("Extracting"))));
        assert!(!events.iter().any(StatusEvent::is_complete));
    }

    #[tokio::test]
    async fn test_download_without_matching_members_fails() {
        let base = serve(vec![Reply::Full(200, build_zip(&[("README.md", b"hi")]))]);
        let dir = tempfile::tempdir().unwrap();
        let config = DepsConfig {
            ffmpeg_url: format!("{}/ffmpeg.zip", base),
            timeout_seconds: 5,
            ..DepsConfig::default()
        };
        let p = provisioner(dir.path(), config);

        assert!(!p.download_ffmpeg(&|_: StatusEvent| {}).await);
        assert!(!p.check_ffmpeg());
    }

    #[test]
    fn test_ensure_completes_immediately_when_present() {
        let dir = tempfile::tempdir().unwrap();
        place(executable_path(dir.path(), Tool::Ffmpeg));
        place(executable_path(dir.path(), Tool::RealEsrgan));
        let p = provisioner(dir.path(), DepsConfig::default());

        let (events, sink) = recorder();
        assert!(p.ensure_dependencies(sink).is_none());

        let events = events.lock().unwrap();
        assert_eq!(events.as_slice(), &[StatusEvent::Complete]);
    }

    #[test]
    fn test_ensure_completes_once_after_failures() {
        let dir = tempfile::tempdir().unwrap();
        let config = DepsConfig {
            ffmpeg_url: refused_url(),
            realesrgan_url: refused_url(),
            timeout_seconds: 5,
            ..DepsConfig::default()
        };
        let p = provisioner(dir.path(), config);

        let (events, sink) = recorder();
        let handle = p.ensure_dependencies(sink).expect("worker should start");
        handle.join().unwrap();

        let events = events.lock().unwrap();
        let completes = events.iter().filter(|e| e.is_complete()).count();
        assert_eq!(completes, 1);
        assert!(events.last().unwrap().is_complete());

        let failures = events
            .iter()
            .filter(|e| matches!(e, StatusEvent::Status(s) if s.message.contains("download failed")))
            .count();
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_ensure_completes_when_servers_go_silent() {
        let base = serve(vec![Reply::Silent, Reply::Silent]);
        let dir = tempfile::tempdir().unwrap();
        let config = DepsConfig {
            ffmpeg_url: format!("{}/ffmpeg.zip", base),
            realesrgan_url: format!("{}/realesrgan.zip", base),
            timeout_seconds: 1,
            ..DepsConfig::default()
        };
        let p = provisioner(dir.path(), config);

        let (events, sink) = recorder();
        let handle = p.ensure_dependencies(sink).expect("worker should start");
        handle.join().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| e.is_complete()).count(), 1);
        assert!(!p.check_ffmpeg());
        assert!(!p.check_realesrgan());
    }

    #[test]
    fn test_ensure_only_downloads_missing_tool() {
        let exe = format!("bin/{}", executable_name(Tool::Ffmpeg));
        let base = serve(vec![Reply::Full(200, build_zip(&[(exe.as_str(), b"ffmpeg")]))]);

        let dir = tempfile::tempdir().unwrap();
        place(executable_path(dir.path(), Tool::RealEsrgan));
        let config = DepsConfig {
            ffmpeg_url: format!("{}/ffmpeg.zip", base),
            realesrgan_url: refused_url(),
            timeout_seconds: 5,
            ..DepsConfig::default()
        };
        let p = provisioner(dir.path(), config);

        let (events, sink) = recorder();
        p.ensure_dependencies(sink).unwrap().join().unwrap();

        assert!(p.check_ffmpeg());
        let events = events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, StatusEvent::Status(s) if s.message == "FFmpeg installed")));
        assert!(!events.iter().any(|e| matches!(e, StatusEvent::Status(s) if s.message.contains("Real-ESRGAN"))));
        assert_eq!(events.iter().filter(|e| e.is_complete()).count(), 1);
    }
}
