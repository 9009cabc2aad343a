use std::path::PathBuf;

use ansi_core::config::{
    Charset, ColorMode, FitMode, FontFamily, RenderConfig, Settings, SizePreset, Viewport,
};
use clap::{Parser, ValueEnum};

/// ansimage : convertit une image en art de caractères colorés.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image à convertir (chemin PNG, JPEG, BMP, GIF).
    #[arg(long, visible_alias = "src")]
    pub image: Option<String>,

    /// Libellé accessible, aussi utilisé comme texte de repli.
    #[arg(long)]
    pub alt: Option<String>,

    /// Largeur explicite en caractères (prioritaire sur --size).
    #[arg(long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Preset de taille : badge, mini, compact, standard, statement, heroic.
    #[arg(long)]
    pub size: Option<String>,

    /// Mode couleur : full, grayscale, monochrome.
    #[arg(long)]
    pub color_mode: Option<String>,

    /// Jeu de glyphes : blocks, dots, ascii, braille.
    #[arg(long)]
    pub charset: Option<String>,

    /// Ajustement : none, auto, width, height, both.
    #[arg(long)]
    pub fit: Option<String>,

    /// Police : terminal-mono, system-mono, retro-pixel.
    #[arg(long)]
    pub font_family: Option<String>,

    /// Zone hôte disponible en px, format WxH (ex: 800x600).
    #[arg(long)]
    pub viewport: Option<String>,

    /// Format de sortie.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Fichier de sortie. Défaut : stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Fichier de configuration TOML.
    #[arg(short, long, default_value = "ansimage.toml")]
    pub config: PathBuf,

    /// Surveiller la config et regénérer la sortie à chaque modification.
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Output sink format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML fragment.
    #[default]
    Html,
    /// Truecolor terminal text.
    Ansi,
    /// Run list as JSON.
    Json,
}

impl Cli {
    /// Layer the command-line overrides over the file settings.
    ///
    /// # Errors
    /// Returns an error if `--viewport` is malformed.
    pub fn apply_overrides(&self, settings: &Settings) -> anyhow::Result<(RenderConfig, Viewport)> {
        let mut config = settings.render.clone();
        if let Some(ref v) = self.image {
            config.source.clone_from(v);
        }
        if let Some(ref v) = self.alt {
            config.alt.clone_from(v);
        }
        if let Some(v) = self.width {
            config.width = Some(v);
        }
        if let Some(ref v) = self.size {
            config.size = SizePreset::parse(v);
        }
        if let Some(ref v) = self.color_mode {
            config.color_mode = ColorMode::parse(v);
        }
        if let Some(ref v) = self.charset {
            config.charset = Charset::parse(v);
        }
        if let Some(ref v) = self.fit {
            config.fit = FitMode::parse(v);
        }
        if let Some(ref v) = self.font_family {
            config.font_family = FontFamily::parse(v);
        }
        config.clamp_all();

        let viewport = match self.viewport {
            Some(ref v) => Viewport::parse(v)?,
            None => settings.viewport.unwrap_or_default(),
        };
        Ok((config, viewport))
    }
}
