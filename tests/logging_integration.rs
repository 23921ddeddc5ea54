use iq_setup::logging;

#[test]
fn logging_init_creates_file() {
    let tmp = tempfile::tempdir().unwrap();
    let guard = logging::init(&tmp.path().join("logs"), "module-connector.log")
        .expect("logging init should succeed");
    tracing::info!("hello from the test");
    assert!(guard.path.exists());
}

#[test]
fn unwritable_log_file_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("logs");
    std::fs::create_dir_all(dir.join("setup-installer.log")).unwrap();

    let err = logging::init(&dir, "setup-installer.log").err().expect("init should fail");
    assert!(format!("{err:#}").contains("setup-installer.log"));
}
