//! Ephemeral static file server for build-artifact mode.
//!
//! Turns a site build directory on disk into a fetchable localhost origin
//! for the duration of one run. The port is chosen by the OS; the server is
//! shut down on every exit path once the run ends.

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{error, info, instrument};

use docpress_shared::{normalize_path_segment, DocpressError, Result};

/// A running static file server scoped to one generation run.
#[derive(Debug)]
pub struct StaticSite {
    base_url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl StaticSite {
    /// Serve `root_dir` on an ephemeral localhost port, mounted under
    /// `base_path` (`"/"` mounts at the server root).
    #[instrument(skip_all, fields(root = %root_dir.display(), base_path))]
    pub async fn serve(root_dir: &Path, base_path: &str) -> Result<Self> {
        let metadata = tokio::fs::metadata(root_dir).await.map_err(|_| {
            DocpressError::config(format!(
                "could not find site build directory at '{}'; has the site been built?",
                root_dir.display()
            ))
        })?;
        if !metadata.is_dir() {
            return Err(DocpressError::config(format!(
                "'{}' is not a site build directory",
                root_dir.display()
            )));
        }

        let base = normalize_path_segment(base_path, false);
        let service = ServeDir::new(root_dir);
        let app = if base == "/" {
            Router::new().fallback_service(service)
        } else {
            Router::new().nest_service(&base, service)
        };

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.map_err(|error| {
            DocpressError::ServerStart(format!("could not bind a local port: {error}"))
        })?;
        let address: SocketAddr = listener.local_addr().map_err(|error| {
            DocpressError::ServerStart(format!("could not read the bound address: {error}"))
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(error) = serve.await {
                error!(%error, "static server stopped unexpectedly");
            }
        });

        let base_url = if base == "/" {
            format!("http://127.0.0.1:{}", address.port())
        } else {
            format!("http://127.0.0.1:{}{base}", address.port())
        };
        info!(%base_url, "serving site build directory");

        Ok(Self {
            base_url,
            shutdown: shutdown_tx,
            task,
        })
    }

    /// Root URL the site is reachable under, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture_site(dir: &Path) {
        std::fs::create_dir_all(dir.join("docs")).expect("create docs dir");
        std::fs::write(
            dir.join("docs/index.html"),
            "<html><body>docs home</body></html>",
        )
        .expect("write index");
        std::fs::write(dir.join("index.html"), "<html><body>site root</body></html>")
            .expect("write root index");
    }

    #[tokio::test]
    async fn serves_directory_index_at_the_root_mount() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture_site(dir.path());

        let site = StaticSite::serve(dir.path(), "/").await.expect("serve");
        let url = format!("{}/docs/", site.base_url());
        let body = reqwest::get(&url)
            .await
            .expect("request")
            .text()
            .await
            .expect("body");

        assert!(body.contains("docs home"));
        site.shutdown().await;
    }

    #[tokio::test]
    async fn serves_under_a_base_path_mount() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture_site(dir.path());

        let site = StaticSite::serve(dir.path(), "/base").await.expect("serve");
        assert!(site.base_url().ends_with("/base"));

        let url = format!("{}/docs/", site.base_url());
        let body = reqwest::get(&url)
            .await
            .expect("request")
            .text()
            .await
            .expect("body");

        assert!(body.contains("docs home"));
        site.shutdown().await;
    }

    #[tokio::test]
    async fn base_url_never_ends_with_a_slash() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_fixture_site(dir.path());

        let site = StaticSite::serve(dir.path(), "base/").await.expect("serve");
        assert!(site.base_url().ends_with("/base"));
        site.shutdown().await;

        let site = StaticSite::serve(dir.path(), "/").await.expect("serve");
        assert!(!site.base_url().ends_with('/'));
        site.shutdown().await;
    }

    #[tokio::test]
    async fn missing_build_directory_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("no-such-build");

        let err = StaticSite::serve(&missing, "/").await.unwrap_err();
        assert!(err.to_string().contains("has the site been built?"));
    }

    #[tokio::test]
    async fn file_instead_of_directory_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("build");
        std::fs::write(&file, "not a directory").expect("write file");

        let err = StaticSite::serve(&file, "/").await.unwrap_err();
        assert!(err.to_string().contains("is not a site build directory"));
    }
}
