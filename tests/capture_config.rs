use std::sync::Mutex;

use tempfile::NamedTempFile;

use thermal_capture::CaptureConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "THERMAL_CONFIG",
        "THERMAL_PORT",
        "THERMAL_BAUD",
        "THERMAL_FRAMES",
        "THERMAL_FRAME_TIMEOUT_SECS",
        "THERMAL_WINDOW",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
        port = "/dev/ttyACM1"
        baud = 57600

        [grid]
        width = 16
        height = 12

        [capture]
        frames = 20
        frame_timeout_secs = 1.5
        window = 4
        countdown_secs = 0
    "#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("THERMAL_CONFIG", file.path());
    std::env::set_var("THERMAL_PORT", "stub");
    std::env::set_var("THERMAL_FRAMES", "7");

    let cfg = CaptureConfig::load().expect("load config");

    assert_eq!(cfg.port.as_deref(), Some("stub"));
    assert_eq!(cfg.baud, 57600);
    assert_eq!(cfg.width, 16);
    assert_eq!(cfg.height, 12);
    assert_eq!(cfg.frames, 7);
    assert_eq!(cfg.frame_timeout.as_secs_f64(), 1.5);
    assert_eq!(cfg.window, 4);
    assert_eq!(cfg.countdown_secs, 0);

    clear_env();
}

#[test]
fn defaults_apply_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = CaptureConfig::load().expect("load config");

    assert_eq!(cfg.port, None);
    assert_eq!(cfg.baud, 115_200);
    assert_eq!(cfg.width, 32);
    assert_eq!(cfg.height, 24);
    assert_eq!(cfg.frames, 10);
    assert_eq!(cfg.frame_timeout.as_secs_f64(), 3.0);
    assert_eq!(cfg.window, 5);
    assert_eq!(cfg.countdown_secs, 5);
}

#[test]
fn rejects_zero_frame_count() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("THERMAL_FRAMES", "0");
    assert!(CaptureConfig::load().is_err());

    clear_env();
}
