use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use watchpost::config::WatchConfig;
use watchpost::DetectMode;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "WATCHPOST_CONFIG",
        "WATCHPOST_SERVER",
        "WATCHPOST_PORT",
        "WATCHPOST_DEBOUNCE_SECS",
        "WATCHPOST_DEVICE",
        "WATCHPOST_CASCADE",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "highlight": true,
        "console": true,
        "faces": true,
        "upload": false,
        "threading": true,
        "debounce_secs": 30,
        "cascade_path": "models/frontalface.xml",
        "server": {
            "host": "sentry.lan",
            "port": 9100
        },
        "camera": {
            "device": "stub://bench",
            "target_fps": 15,
            "width": 800,
            "height": 600
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("WATCHPOST_CONFIG", file.path());
    std::env::set_var("WATCHPOST_PORT", "9200");
    std::env::set_var("WATCHPOST_DEBOUNCE_SECS", "45");

    let cfg = WatchConfig::load().expect("load config");

    assert!(cfg.highlight);
    assert!(cfg.console);
    assert_eq!(cfg.mode, DetectMode::Faces);
    assert!(!cfg.upload);
    assert!(cfg.threading);
    assert_eq!(cfg.server, "sentry.lan");
    // Environment wins over the file.
    assert_eq!(cfg.port, 9200);
    assert_eq!(cfg.debounce, Duration::from_secs(45));
    assert_eq!(cfg.cascade_path, "models/frontalface.xml");
    assert_eq!(cfg.camera.device, "stub://bench");
    assert_eq!(cfg.camera.target_fps, 15);
    assert_eq!(cfg.camera.width, 800);
    assert_eq!(cfg.camera.height, 600);

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = WatchConfig::load().expect("load config");

    assert_eq!(cfg.server, "127.0.0.1");
    assert_eq!(cfg.port, 8000);
    assert_eq!(cfg.debounce, Duration::from_secs(10));
    assert_eq!(cfg.mode, DetectMode::People);
    assert!(cfg.upload);
    assert!(!cfg.threading);
    assert_eq!(cfg.camera.device, "stub://camera");

    clear_env();
}

#[test]
fn invalid_port_env_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("WATCHPOST_PORT", "not-a-port");
    let result = WatchConfig::load();
    assert!(result.is_err());

    clear_env();
}
