//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p upscaler-api`.

pub mod fixtures;

use std::path::{Path, PathBuf};

use axum_test::TestServer;
use tempfile::TempDir;
use upscaler_api::setup::{build_state, routes};
use upscaler_core::Config;

/// Test application: server plus the temp directory backing its storage.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: PathBuf,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of every file currently in the upload directory
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Directory that holds the upload directory, outside the storage root
    pub fn outside_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Setup test app with default configuration and an isolated upload directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, letting the caller adjust the configuration first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = Config::with_upload_dir(temp_dir.path().join("uploads"));
    configure(&mut config);

    let state = build_state(config).await.expect("Failed to build state");
    let upload_dir = state.store.root().to_path_buf();
    let router = routes::setup_routes(&state.config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        temp_dir,
    }
}
