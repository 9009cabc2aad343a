use std::path::Path;
use std::sync::Arc;

use ansi_core::config::Settings;
use anyhow::Result;
use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::app::AppEvent;

/// Reload `path` into `settings`, then wake the main loop.
///
/// A file that no longer parses keeps the previous settings.
pub fn reload_into(path: &Path, settings: &ArcSwap<Settings>, events: &flume::Sender<AppEvent>) {
    match ansi_core::config::load_config(path) {
        Ok(new_settings) => {
            settings.store(Arc::new(new_settings));
            log::info!("Config rechargée depuis {}", path.display());
            let _ = events.send(AppEvent::ConfigReloaded);
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
        }
    }
}

/// Lance un thread qui surveille le fichier config et met à jour l'ArcSwap.
///
/// Retourne le Watcher (doit rester vivant tant que l'app tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use ansi_core::config::Settings;
/// use ansi_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let settings = Arc::new(ArcSwap::from_pointee(Settings::default()));
/// let (tx, _rx) = flume::unbounded();
/// let _watcher = spawn_config_watcher(Path::new("ansimage.toml"), &settings, tx);
/// ```
pub fn spawn_config_watcher(
    config_path: &Path,
    settings: &Arc<ArcSwap<Settings>>,
    events: flume::Sender<AppEvent>,
) -> Result<impl Watcher + use<>> {
    let settings = Arc::clone(settings);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        {
            reload_into(&path, &settings, &events);
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use ansi_core::config::Charset;

    #[test]
    fn valid_file_replaces_settings_and_wakes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\ncharset = \"braille\"").unwrap();
        let settings = ArcSwap::from_pointee(Settings::default());
        let (tx, rx) = flume::unbounded();

        reload_into(file.path(), &settings, &tx);

        assert_eq!(settings.load().render.charset, Charset::Braille);
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ConfigReloaded)));
    }

    #[test]
    fn broken_file_keeps_previous_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render\nnot toml").unwrap();
        let settings = ArcSwap::from_pointee(Settings::default());
        let (tx, rx) = flume::unbounded();

        reload_into(file.path(), &settings, &tx);

        assert_eq!(*settings.load_full(), Settings::default());
        assert!(rx.try_recv().is_err());
    }
}
