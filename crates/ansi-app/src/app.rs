use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ansi_ascii::document::fallback_text;
use ansi_ascii::encode::RenderedOutput;
use ansi_core::config::Settings;
use ansi_source::image::FileLoader;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use serde::Serialize;

use crate::cli::{Cli, OutputFormat};
use crate::context::{OutputState, RenderContext};
use crate::hotreload;
use crate::preview;

/// Longest wait for a single conversion.
pub const CONVERSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Main loop wake-up interval while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(50);

/// Events delivered to the watch loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// The config file was reloaded into the shared settings.
    ConfigReloaded,
    /// Ctrl+C.
    Quit,
}

/// JSON view of the current state.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum JsonReport<'a> {
    Rendered {
        scale: f64,
        output: &'a RenderedOutput,
    },
    Failed {
        fallback: &'a str,
        error: String,
    },
    Empty,
}

/// Serialize the current state in `format`.
///
/// # Errors
/// Returns an error if the writer fails.
pub fn write_output<W: Write>(out: &mut W, ctx: &RenderContext, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Html => {
            out.write_all(ctx.document().as_bytes())?;
            out.flush()?;
        }
        OutputFormat::Ansi => match ctx.output() {
            OutputState::Rendered(output) => preview::write_ansi(out, output)?,
            OutputState::Failed(_) => preview::write_fallback(out, fallback_text(&ctx.config().alt))?,
            OutputState::Empty => {}
        },
        OutputFormat::Json => {
            let report = match ctx.output() {
                OutputState::Rendered(output) => JsonReport::Rendered {
                    scale: ctx.scale(),
                    output,
                },
                OutputState::Failed(e) => JsonReport::Failed {
                    fallback: fallback_text(&ctx.config().alt),
                    error: e.to_string(),
                },
                OutputState::Empty => JsonReport::Empty,
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn emit(ctx: &RenderContext, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Impossible de créer {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_output(&mut writer, ctx, format)?;
            log::info!("Sortie écrite dans {}", path.display());
        }
        None => write_output(&mut io::stdout().lock(), ctx, format)?,
    }
    Ok(())
}

/// Convert once and write the result.
///
/// A failed conversion still writes the fallback and is not an error.
///
/// # Errors
/// Returns an error on bad overrides, a conversion timeout or an I/O failure.
pub fn run_once(cli: &Cli, settings: &Settings) -> Result<()> {
    let (config, viewport) = cli.apply_overrides(settings)?;
    let mut ctx = RenderContext::new(config, viewport, Arc::new(FileLoader));
    ctx.request_conversion();
    if !ctx.wait_current(CONVERSION_TIMEOUT) {
        anyhow::bail!("Conversion trop longue (> {}s)", CONVERSION_TIMEOUT.as_secs());
    }
    emit(&ctx, cli.format, cli.out.as_deref())
}

/// Apply reloaded settings (with the CLI overrides on top) to `ctx`.
///
/// Output changes surface through the next
/// [`RenderContext::poll_completions`].
///
/// # Errors
/// Returns an error if the overrides no longer apply.
pub fn apply_reload(ctx: &mut RenderContext, cli: &Cli, settings: &Settings) -> Result<()> {
    let (config, viewport) = cli.apply_overrides(settings)?;
    ctx.apply_config(config);
    if viewport != ctx.viewport() {
        ctx.set_viewport(viewport, Instant::now());
    }
    Ok(())
}

/// Convert, then keep the output in sync with the config file until Ctrl+C.
///
/// # Errors
/// Returns an error if the watcher or the signal handler cannot be set up,
/// or on an I/O failure.
pub fn run_watch(cli: &Cli, settings: Settings) -> Result<()> {
    let (config, viewport) = cli.apply_overrides(&settings)?;
    let shared = Arc::new(ArcSwap::from_pointee(settings));

    let (event_tx, event_rx) = flume::unbounded();
    let quit_tx = event_tx.clone();
    ctrlc::set_handler(move || {
        let _ = quit_tx.send(AppEvent::Quit);
    })
    .context("Impossible d'installer le handler Ctrl+C")?;
    let _watcher = hotreload::spawn_config_watcher(&cli.config, &shared, event_tx)?;
    log::info!("Surveillance de {}", cli.config.display());

    let mut ctx = RenderContext::new(config, viewport, Arc::new(FileLoader));
    ctx.request_conversion();

    loop {
        if ctx.poll_completions() {
            emit(&ctx, cli.format, cli.out.as_deref())?;
        }

        let timeout = ctx
            .next_deadline()
            .map_or(IDLE_POLL, |d| d.saturating_duration_since(Instant::now()).min(IDLE_POLL));
        match event_rx.recv_timeout(timeout) {
            Ok(AppEvent::ConfigReloaded) => {
                if let Err(e) = apply_reload(&mut ctx, cli, &shared.load()) {
                    log::warn!("Config rechargée ignorée : {e:#}");
                }
            }
            Ok(AppEvent::Quit) | Err(flume::RecvTimeoutError::Disconnected) => break,
            Err(flume::RecvTimeoutError::Timeout) => {}
        }

        if ctx.tick(Instant::now()) {
            emit(&ctx, cli.format, cli.out.as_deref())?;
        }
    }

    log::info!("Arrêt");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansi_core::config::{RenderConfig, Viewport};
    use ansi_core::error::CoreError;
    use ansi_core::frame::FrameBuffer;
    use ansi_core::traits::ImageLoader;

    struct Black;
    impl ImageLoader for Black {
        fn load(&self, locator: &str) -> Result<FrameBuffer, CoreError> {
            if locator == "black" {
                Ok(FrameBuffer::filled(100, 50, [0, 0, 0, 255]))
            } else {
                Err(CoreError::FileNotFound {
                    path: locator.into(),
                })
            }
        }
    }

    fn rendered(source: &str) -> RenderContext {
        let config = RenderConfig {
            source: source.into(),
            alt: "Logo".into(),
            ..RenderConfig::default()
        };
        let mut ctx = RenderContext::new(config, Viewport::default(), Arc::new(Black));
        ctx.request_conversion();
        assert!(ctx.wait_current(Duration::from_secs(10)));
        ctx
    }

    #[test]
    fn reload_clearing_source_is_emitted() {
        use clap::Parser;

        let mut ctx = rendered("black");
        assert!(!ctx.poll_completions());
        let cli = Cli::parse_from(["ansimage"]);

        apply_reload(&mut ctx, &cli, &Settings::default()).unwrap();

        assert!(ctx.poll_completions());
        let html = render(&ctx, OutputFormat::Html);
        assert!(html.contains("<pre style=\"--ansi-scale: 1\"></pre>"));
        assert!(!html.contains("<span"));
    }

    fn render(ctx: &RenderContext, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_output(&mut buf, ctx, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_reports_runs_and_scale() {
        let value: serde_json::Value =
            serde_json::from_str(&render(&rendered("black"), OutputFormat::Json)).unwrap();
        assert_eq!(value["status"], "rendered");
        assert_eq!(value["scale"], 1.0);
        assert_eq!(value["output"]["rows"], 20);
        assert_eq!(value["output"]["lines"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn failure_formats_show_fallback() {
        let ctx = rendered("absent.png");
        assert_eq!(render(&ctx, OutputFormat::Ansi), "Logo\n");
        let value: serde_json::Value = serde_json::from_str(&render(&ctx, OutputFormat::Json)).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["fallback"], "Logo");
        assert!(render(&ctx, OutputFormat::Html).contains(">Logo</pre>"));
    }

    #[test]
    fn html_output_goes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        emit(&rendered("black"), OutputFormat::Html, Some(&path)).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.starts_with("<div class=\"ansi-image\">"));
        // Uniform image: one run per row.
        assert_eq!(html.matches("</span>\n").count(), 20);
    }
}
