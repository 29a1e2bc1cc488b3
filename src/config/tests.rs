use super::builder::default_config_content;
use super::validation::validate_config;
use super::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, content: &str) -> PathBuf {
    let path = dir.join(CONFIG_FILE_NAME);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join(APP_NAME).join(CONFIG_FILE_NAME);

    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = Config::load();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    if let Err(e) = &result {
        eprintln!("Config::load() failed: {:?}", e);
    }
    assert!(result.is_ok());
    assert!(config_path.exists());
}

#[test]
fn test_default_config_content_parses_to_defaults() {
    let config: Config = toml::from_str(&default_config_content()).unwrap();
    assert!(validate_config(&config).is_ok());

    let settings = config.resolve();
    assert_eq!(settings.rollover_hour, DEFAULT_ROLLOVER_HOUR);
    assert_eq!(settings.show_seconds, DEFAULT_SHOW_SECONDS);
    assert_eq!(settings.sunset_api_url, DEFAULT_SUNSET_API_URL);
    assert_eq!(settings.location, None);
}

#[test]
fn test_default_config_comments_are_aligned() {
    let content = default_config_content();
    let columns: Vec<usize> = content
        .lines()
        .filter(|line| !line.starts_with("#["))
        .filter_map(|line| line.rfind("# "))
        .collect();
    assert!(!columns.is_empty());
    assert!(columns.iter().all(|c| *c == columns[0]));
}

#[test]
fn test_resolve_applies_defaults() {
    let settings = Config::default().resolve();
    assert_eq!(settings.rollover_hour, 20);
    assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(settings.retry_cooldown_secs, DEFAULT_RETRY_COOLDOWN_SECS);
    assert_eq!(settings.label, DEFAULT_LABEL);
    assert_eq!(settings.tomorrow_label, DEFAULT_TOMORROW_LABEL);
    assert!(settings.cache_file.ends_with(CACHE_FILE_NAME));
}

#[test]
fn test_resolve_keeps_user_values() {
    let config = Config {
        rollover_hour: Some(18),
        show_seconds: Some(true),
        latitude: Some(21.4225),
        longitude: Some(39.8262),
        timezone: Some("Asia/Riyadh".to_string()),
        cache_file: Some(PathBuf::from("/tmp/sunsets.json")),
        ..Default::default()
    };
    let settings = config.resolve();

    assert_eq!(settings.rollover_hour, 18);
    assert!(settings.show_seconds);
    assert_eq!(settings.cache_file, PathBuf::from("/tmp/sunsets.json"));
    let location = settings.location.unwrap();
    assert_eq!(location.latitude, 21.4225);
    assert_eq!(location.timezone, Some(chrono_tz::Asia::Riyadh));
}

#[test]
fn test_validation_rejects_out_of_range_values() {
    let bad = [
        Config {
            rollover_hour: Some(24),
            ..Default::default()
        },
        Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        },
        Config {
            retry_cooldown_secs: Some(MAXIMUM_RETRY_COOLDOWN_SECS + 1),
            ..Default::default()
        },
        Config {
            latitude: Some(91.0),
            longitude: Some(0.0),
            ..Default::default()
        },
        Config {
            latitude: Some(0.0),
            longitude: Some(-180.5),
            ..Default::default()
        },
        Config {
            sunset_api_url: Some("ftp://example.com".to_string()),
            ..Default::default()
        },
    ];

    for config in bad {
        assert!(validate_config(&config).is_err(), "accepted {config:?}");
    }
}

#[test]
fn test_validation_requires_both_coordinates() {
    let only_lat = Config {
        latitude: Some(40.0),
        ..Default::default()
    };
    let err = validate_config(&only_lat).unwrap_err();
    assert!(err.to_string().contains("longitude is missing"));

    let only_lon = Config {
        longitude: Some(40.0),
        ..Default::default()
    };
    assert!(validate_config(&only_lon).is_err());
}

#[test]
fn test_validation_checks_timezone() {
    let mut config = Config {
        latitude: Some(40.0),
        longitude: Some(29.0),
        timezone: Some("Mars/Olympus_Mons".to_string()),
        ..Default::default()
    };
    assert!(validate_config(&config).is_err());

    config.timezone = Some("Europe/Istanbul".to_string());
    assert!(validate_config(&config).is_ok());

    config.latitude = None;
    config.longitude = None;
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_load_from_path_rejects_unknown_fields() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), "rollover_hour = 19\nsunrise = 6\n");
    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_load_from_path_missing_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("absent.toml");
    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_geo_toml_overrides_coordinates() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(
        temp_dir.path(),
        "latitude = 10.0\nlongitude = 20.0\nrollover_hour = 21\n",
    );
    fs::write(
        temp_dir.path().join(GEO_FILE_NAME),
        "latitude = 52.52\nlongitude = 13.405\ntimezone = \"Europe/Berlin\"\n",
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.latitude, Some(52.52));
    assert_eq!(config.longitude, Some(13.405));
    assert_eq!(config.timezone.as_deref(), Some("Europe/Berlin"));
    assert_eq!(config.rollover_hour, Some(21));
}

#[test]
fn test_malformed_geo_toml_is_ignored() {
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), "latitude = 10.0\nlongitude = 20.0\n");
    fs::write(temp_dir.path().join(GEO_FILE_NAME), "latitude = [").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.latitude, Some(10.0));
}

#[test]
fn test_cache_path_tilde_expansion() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let temp_dir = tempdir().unwrap();
    let path = write_config(temp_dir.path(), "cache_file = \"~/sun/cache.json\"\n");

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.cache_file, Some(home.join("sun").join("cache.json")));
}
