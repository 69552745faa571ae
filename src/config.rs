use crate::model::Rules;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) enable_braille: bool,
    pub(crate) enable_bell: bool,
    pub(crate) seed: u64,
    /// How long a key counts as held after its last press or repeat, for
    /// terminals that never report releases.
    pub(crate) key_hold_ms: u64,
    pub(crate) log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            enable_braille: true,
            enable_bell: false,
            seed: 0xD06_F00D_u64,
            key_hold_ms: 550,
            log_level: "info".to_string(),
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) rules_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "dogpark", "Dogpark")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create data directory {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        rules_path: dir.join("rules.json"),
        log_path: dir.join("dogpark.log"),
    })
}

/// Reads a JSON file. A missing file gives the default; a malformed one gives
/// the default plus the parse error, so the caller can report it once logging is up.
fn read_json_or_default<T>(path: &Path) -> (T, Option<serde_json::Error>)
where
    T: Default + for<'de> Deserialize<'de>,
{
    let Ok(s) = fs::read_to_string(path) else {
        return (T::default(), None);
    };
    match serde_json::from_str::<T>(&s) {
        Ok(v) => (v, None),
        Err(err) => (T::default(), Some(err)),
    }
}

pub(crate) fn warn_malformed(path: &Path, what: &str, err: &serde_json::Error) {
    warn!(path = %path.display(), error = %err, "ignoring malformed {what}");
}

/// Settings are read before the log file is open, so the error is handed back.
pub(crate) fn load_settings(path: &Path) -> (Settings, Option<serde_json::Error>) {
    read_json_or_default(path)
}

pub(crate) fn load_rules(path: &Path) -> Rules {
    let (rules, err) = read_json_or_default(path);
    if let Some(err) = err {
        warn_malformed(path, "rules", &err);
    }
    rules
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("could not write {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("could not move {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dogpark-test-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = scratch("settings");
        let path = dir.join("settings.json");
        let s = Settings {
            fps_cap: 60,
            enable_bell: true,
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path).0, s);
        assert!(!path.with_extension("json.tmp").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_or_broken_files_fall_back_to_defaults() {
        let dir = scratch("broken");
        let (settings, err) = load_settings(&dir.join("nope.json"));
        assert_eq!(settings, Settings::default());
        assert!(err.is_none());

        let path = dir.join("settings.json");
        fs::write(&path, b"{ not json").unwrap();
        let (settings, err) = load_settings(&path);
        assert_eq!(settings, Settings::default());
        assert!(err.is_some());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn partial_rules_keep_the_other_defaults() {
        let dir = scratch("rules");
        let path = dir.join("rules.json");
        fs::write(&path, br#"{ "sleep_secs": 6.0, "apple_count": 3 }"#).unwrap();
        let rules = load_rules(&path);
        assert_eq!(rules.sleep_secs, 6.0);
        assert_eq!(rules.apple_count, 3);
        assert_eq!(rules.move_hunger_rate, Rules::default().move_hunger_rate);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn malformed_settings_are_reported_once_logging_is_up() {
        let dir = scratch("late-warning");
        let path = dir.join("settings.json");
        fs::write(&path, b"{ broken").unwrap();

        // read with no subscriber installed, the way startup does
        let (settings, err) = load_settings(&path);
        assert_eq!(settings, Settings::default());
        let err = err.expect("parse error is handed back");

        let log = Captured::default();
        let sink = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            warn_malformed(&path, "settings", &err);
        });

        let text = log.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("ignoring malformed settings"), "{text}");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn malformed_rules_warn_when_loaded() {
        let dir = scratch("rules-warning");
        let path = dir.join("rules.json");
        fs::write(&path, b"[1, 2").unwrap();

        let log = Captured::default();
        let sink = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let rules = tracing::subscriber::with_default(subscriber, || load_rules(&path));

        assert_eq!(rules.apple_count, Rules::default().apple_count);
        assert!(log.text().contains("ignoring malformed rules"), "{}", log.text());
        fs::remove_dir_all(dir).ok();
    }
}
