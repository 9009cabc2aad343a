use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Largeur maximale acceptée pour une grille, en caractères.
pub const MAX_CHAR_WIDTH: i64 = 4096;

/// Normalize a free-form identifier before a table lookup.
///
/// Trims, lowercases and collapses every run of non-alphanumeric
/// characters into a single `-`.
///
/// # Example
/// ```
/// use ansi_core::config::normalize_key;
/// assert_eq!(normalize_key("  Terminal__Mono "), "terminal-mono");
/// assert_eq!(normalize_key("a..b"), "a-b");
/// ```
#[must_use]
pub fn normalize_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_separator = false;
    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            in_separator = false;
        } else if !in_separator {
            out.push('-');
            in_separator = true;
        }
    }
    out
}

/// Color transform applied before glyph selection.
///
/// # Example
/// ```
/// use ansi_core::config::ColorMode;
/// assert_eq!(ColorMode::parse("GrayScale"), ColorMode::Grayscale);
/// assert_eq!(ColorMode::parse("sepia"), ColorMode::Full);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ColorMode {
    /// RGB direct du pixel source.
    #[default]
    Full,
    /// Luma replicated on all three channels.
    Grayscale,
    /// Pure black or pure white, threshold at luma 127.
    Monochrome,
}

impl ColorMode {
    /// Soft-fallback parse. Unknown values give [`ColorMode::Full`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "grayscale" => Self::Grayscale,
            "monochrome" => Self::Monochrome,
            "full" => Self::Full,
            other => {
                if !other.is_empty() {
                    log::warn!("Mode couleur inconnu '{value}', utilisation de 'full'.");
                }
                Self::Full
            }
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Grayscale => "grayscale",
            Self::Monochrome => "monochrome",
        }
    }
}

/// Named glyph palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Charset {
    /// Shade blocks ` ░▒▓█`.
    #[default]
    Blocks,
    /// Dots ` ·●◉●`.
    Dots,
    /// Eleven ASCII glyphs.
    Ascii,
    /// Space plus the 63 non-empty Braille patterns.
    Braille,
}

impl Charset {
    /// Soft-fallback parse. Unknown values give [`Charset::Blocks`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "dots" => Self::Dots,
            "ascii" => Self::Ascii,
            "braille" => Self::Braille,
            "blocks" => Self::Blocks,
            other => {
                if !other.is_empty() {
                    log::warn!("Charset inconnu '{value}', utilisation de 'blocks'.");
                }
                Self::Blocks
            }
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Dots => "dots",
            Self::Ascii => "ascii",
            Self::Braille => "braille",
        }
    }
}

/// Which axes the fit engine constrains.
///
/// # Example
/// ```
/// use ansi_core::config::FitMode;
/// assert_eq!(FitMode::Auto.constrained_axes(), (true, false));
/// assert_eq!(FitMode::Both.constrained_axes(), (true, true));
/// assert!(!FitMode::None.is_enabled());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FitMode {
    /// Fit disabled, scale stays at 1.
    None,
    /// Width only (default).
    #[default]
    Auto,
    /// Width only.
    Width,
    /// Height only.
    Height,
    /// Width and height.
    Both,
}

impl FitMode {
    /// Soft-fallback parse. Unknown values give [`FitMode::Auto`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "none" => Self::None,
            "width" => Self::Width,
            "height" => Self::Height,
            "both" => Self::Both,
            "auto" => Self::Auto,
            other => {
                if !other.is_empty() {
                    log::warn!("Mode fit inconnu '{value}', utilisation de 'auto'.");
                }
                Self::Auto
            }
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Auto => "auto",
            Self::Width => "width",
            Self::Height => "height",
            Self::Both => "both",
        }
    }

    /// `(width constrained, height constrained)`.
    #[must_use]
    pub fn constrained_axes(self) -> (bool, bool) {
        match self {
            Self::None => (false, false),
            Self::Auto | Self::Width => (true, false),
            Self::Height => (false, true),
            Self::Both => (true, true),
        }
    }

    /// False only for [`FitMode::None`].
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::None
    }
}

/// Size preset: default grid width and base font size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum SizePreset {
    /// 40 columns.
    Badge,
    /// 50 columns.
    Mini,
    /// 60 columns.
    Compact,
    /// 80 columns.
    #[default]
    Standard,
    /// 100 columns.
    Statement,
    /// 120 columns.
    Heroic,
}

impl SizePreset {
    /// Soft-fallback parse. Unknown values give [`SizePreset::Standard`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "badge" => Self::Badge,
            "mini" => Self::Mini,
            "compact" => Self::Compact,
            "statement" => Self::Statement,
            "heroic" => Self::Heroic,
            "standard" => Self::Standard,
            other => {
                if !other.is_empty() {
                    log::warn!("Taille inconnue '{value}', utilisation de 'standard'.");
                }
                Self::Standard
            }
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Badge => "badge",
            Self::Mini => "mini",
            Self::Compact => "compact",
            Self::Standard => "standard",
            Self::Statement => "statement",
            Self::Heroic => "heroic",
        }
    }

    /// Grid width used when no explicit width is configured.
    #[must_use]
    pub fn char_width(self) -> u32 {
        match self {
            Self::Badge => 40,
            Self::Mini => 50,
            Self::Compact => 60,
            Self::Standard => 80,
            Self::Statement => 100,
            Self::Heroic => 120,
        }
    }

    /// CSS font-size expression emitted in the style sheet.
    #[must_use]
    pub fn font_size_css(self) -> &'static str {
        match self {
            Self::Badge => "clamp(0.5rem, 0.2vw + 0.4rem, 0.8rem)",
            Self::Mini => "clamp(0.6rem, 0.25vw + 0.5rem, 1rem)",
            Self::Compact => "clamp(0.7rem, 0.3vw + 0.6rem, 1.3rem)",
            Self::Standard => "clamp(1.1rem, 0.45vw + 0.9rem, 2.2rem)",
            Self::Statement => "clamp(1.7rem, 0.8vw + 1.4rem, 3.2rem)",
            Self::Heroic => "clamp(2.3rem, 1.1vw + 1.9rem, 4.3rem)",
        }
    }

    /// Font size in px used for offline measurement: lower bound of the
    /// CSS clamp at 16 px per rem.
    #[must_use]
    pub fn font_px(self) -> f64 {
        let rem = match self {
            Self::Badge => 0.5,
            Self::Mini => 0.6,
            Self::Compact => 0.7,
            Self::Standard => 1.1,
            Self::Statement => 1.7,
            Self::Heroic => 2.3,
        };
        rem * 16.0
    }
}

/// Monospace font stack preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    /// Inconsolata / Fira Code stack.
    #[default]
    TerminalMono,
    /// Platform UI monospace stack.
    SystemMono,
    /// Courier-style stack.
    RetroPixel,
}

impl FontFamily {
    /// Soft-fallback parse. Unknown values give [`FontFamily::TerminalMono`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match normalize_key(value).as_str() {
            "system-mono" => Self::SystemMono,
            "retro-pixel" => Self::RetroPixel,
            _ => Self::TerminalMono,
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TerminalMono => "terminal-mono",
            Self::SystemMono => "system-mono",
            Self::RetroPixel => "retro-pixel",
        }
    }

    /// CSS `font-family` value.
    #[must_use]
    pub fn css_stack(self) -> &'static str {
        match self {
            Self::TerminalMono => {
                r#"var(--font, "Inconsolata", "Fira Code", "Source Code Pro", monospace)"#
            }
            Self::SystemMono => {
                r#"ui-monospace, "SFMono-Regular", "Menlo", "Consolas", "Liberation Mono", monospace"#
            }
            Self::RetroPixel => r#""Courier New", "Lucida Console", "Monaco", monospace"#,
        }
    }
}

impl From<String> for ColorMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ColorMode> for String {
    fn from(value: ColorMode) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for Charset {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Charset> for String {
    fn from(value: Charset) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for FitMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FitMode> for String {
    fn from(value: FitMode) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for SizePreset {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SizePreset> for String {
    fn from(value: SizePreset) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for FontFamily {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FontFamily> for String {
    fn from(value: FontFamily) -> Self {
        value.as_str().to_string()
    }
}

/// Immutable snapshot of everything that shapes one conversion.
///
/// # Example
/// ```
/// use ansi_core::config::{RenderConfig, SizePreset};
/// let mut config = RenderConfig::default();
/// assert_eq!(config.target_char_width().unwrap(), 80);
/// config.size = SizePreset::Badge;
/// assert_eq!(config.target_char_width().unwrap(), 40);
/// config.width = Some(33);
/// assert_eq!(config.target_char_width().unwrap(), 33);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Opaque image locator. Empty = no image.
    pub source: String,
    /// Accessible label, also used as fallback text.
    pub alt: String,
    /// Explicit grid width in characters. Wins over `size`.
    pub width: Option<i64>,
    /// Size preset (default width and font size).
    pub size: SizePreset,
    /// Color transform.
    pub color_mode: ColorMode,
    /// Glyph palette.
    pub charset: Charset,
    /// Fit policy.
    pub fit: FitMode,
    /// Font stack preset.
    pub font_family: FontFamily,
}

impl RenderConfig {
    /// Resolve the grid width: explicit width, else the size preset.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] if the explicit width is ≤ 0.
    pub fn target_char_width(&self) -> Result<u32, CoreError> {
        match self.width {
            Some(w) if w <= 0 => Err(CoreError::dimensions(w, 0)),
            Some(w) => Ok(w.min(MAX_CHAR_WIDTH) as u32),
            None => Ok(self.size.char_width()),
        }
    }

    /// True if moving from `self` to `next` invalidates the rendered grid.
    #[must_use]
    pub fn requires_reconversion(&self, next: &RenderConfig) -> bool {
        self.source != next.source
            || self.width != next.width
            || self.size != next.size
            || self.color_mode != next.color_mode
            || self.charset != next.charset
    }

    /// Clamp numeric fields to their valid ranges.
    /// Called after TOML deserialization.
    pub fn clamp_all(&mut self) {
        if let Some(w) = self.width {
            self.width = Some(w.min(MAX_CHAR_WIDTH));
        }
    }
}

/// Host region available to the rendered output, in px.
///
/// Zero on an axis means "unknown" and leaves that axis unconstrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Viewport {
    /// Host width.
    #[serde(default)]
    pub width: f64,
    /// Parent height.
    #[serde(default)]
    pub height: f64,
}

impl Viewport {
    /// Build a viewport, clamping negative or non-finite extents to 0.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let mut v = Self { width, height };
        v.clamp_all();
        v
    }

    /// Parse `WIDTHxHEIGHT` (e.g. `1280x720`).
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the string is not two numbers.
    ///
    /// # Example
    /// ```
    /// use ansi_core::config::Viewport;
    /// let v = Viewport::parse("800x600").unwrap();
    /// assert_eq!((v.width, v.height), (800.0, 600.0));
    /// ```
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let (w, h) = value
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| CoreError::Config(format!("viewport attendu WxH : {value}")))?;
        let w: f64 = w
            .trim()
            .parse()
            .map_err(|_| CoreError::Config(format!("largeur de viewport invalide : {w}")))?;
        let h: f64 = h
            .trim()
            .parse()
            .map_err(|_| CoreError::Config(format!("hauteur de viewport invalide : {h}")))?;
        Ok(Self::new(w, h))
    }

    /// Negative or non-finite extents become 0.
    pub fn clamp_all(&mut self) {
        if !self.width.is_finite() || self.width < 0.0 {
            self.width = 0.0;
        }
        if !self.height.is_finite() || self.height < 0.0 {
            self.height = 0.0;
        }
    }
}

/// Render config plus the viewport declared next to it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Conversion settings.
    pub render: RenderConfig,
    /// Declared host region, if any.
    pub viewport: Option<Viewport>,
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    viewport: Option<Viewport>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    source: Option<String>,
    alt: Option<String>,
    width: Option<i64>,
    size: Option<SizePreset>,
    color_mode: Option<ColorMode>,
    charset: Option<Charset>,
    fit: Option<FitMode>,
    font_family: Option<FontFamily>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use ansi_core::config::{parse_config, Charset};
/// let settings = parse_config("[render]\ncharset = 'ASCII'\n").unwrap();
/// assert_eq!(settings.render.charset, Charset::Ascii);
/// assert!(settings.viewport.is_none());
/// ```
pub fn parse_config(content: &str) -> Result<Settings> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.source {
            config.source = v;
        }
        if let Some(v) = r.alt {
            config.alt = v;
        }
        if let Some(v) = r.width {
            config.width = Some(v);
        }
        if let Some(v) = r.size {
            config.size = v;
        }
        if let Some(v) = r.color_mode {
            config.color_mode = v;
        }
        if let Some(v) = r.charset {
            config.charset = v;
        }
        if let Some(v) = r.fit {
            config.fit = v;
        }
        if let Some(v) = r.font_family {
            config.font_family = v;
        }
    }

    config.clamp_all();
    let viewport = file.viewport.map(|mut v| {
        v.clamp_all();
        v
    });
    Ok(Settings {
        render: config,
        viewport,
    })
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ansi_core::config::load_config;
/// use std::path::Path;
/// let settings = load_config(Path::new("ansimage.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_key(""), "");
        assert_eq!(normalize_key("  MiXeD  "), "mixed");
        assert_eq!(normalize_key("retro   pixel"), "retro-pixel");
        assert_eq!(normalize_key("retro_-_pixel!"), "retro-pixel-");
    }

    #[test]
    fn unknown_values_fall_back() {
        assert_eq!(ColorMode::parse("neon"), ColorMode::Full);
        assert_eq!(Charset::parse(""), Charset::Blocks);
        assert_eq!(FitMode::parse("stretch"), FitMode::Auto);
        assert_eq!(SizePreset::parse("gigantic"), SizePreset::Standard);
        assert_eq!(FontFamily::parse("comic sans"), FontFamily::TerminalMono);
    }

    #[test]
    fn known_values_parse_loosely() {
        assert_eq!(ColorMode::parse(" MONOCHROME "), ColorMode::Monochrome);
        assert_eq!(FitMode::parse("Both"), FitMode::Both);
        assert_eq!(FitMode::parse("none"), FitMode::None);
        assert_eq!(SizePreset::parse("Heroic"), SizePreset::Heroic);
        assert_eq!(FontFamily::parse("System Mono"), FontFamily::SystemMono);
    }

    #[test]
    fn explicit_width_wins_and_is_validated() {
        let mut config = RenderConfig {
            size: SizePreset::Heroic,
            ..RenderConfig::default()
        };
        assert_eq!(config.target_char_width(), Ok(120));
        config.width = Some(0);
        assert!(matches!(
            config.target_char_width(),
            Err(CoreError::InvalidDimensions { width: 0, .. })
        ));
        config.width = Some(-4);
        assert!(config.target_char_width().is_err());
        config.width = Some(100_000);
        assert_eq!(config.target_char_width(), Ok(4096));
    }

    #[test]
    fn reconversion_only_for_grid_fields() {
        let base = RenderConfig::default();
        let alt_only = RenderConfig {
            alt: "logo".into(),
            fit: FitMode::Both,
            font_family: FontFamily::RetroPixel,
            ..base.clone()
        };
        assert!(!base.requires_reconversion(&alt_only));
        let charset = RenderConfig {
            charset: Charset::Dots,
            ..base.clone()
        };
        assert!(base.requires_reconversion(&charset));
    }

    #[test]
    fn viewport_parse_and_clamp() {
        assert_eq!(Viewport::parse("1280x720").ok(), Some(Viewport::new(1280.0, 720.0)));
        assert_eq!(Viewport::parse("-5x10").ok(), Some(Viewport::new(0.0, 10.0)));
        assert!(Viewport::parse("wide").is_err());
    }

    #[test]
    fn toml_partial_override() {
        let settings = parse_config(
            r#"
            [render]
            source = "logo.png"
            color_mode = "Grayscale"
            charset = "no-such-charset"
            width = 64

            [viewport]
            width = 400
            "#,
        )
        .unwrap();
        assert_eq!(settings.render.source, "logo.png");
        assert_eq!(settings.render.color_mode, ColorMode::Grayscale);
        assert_eq!(settings.render.charset, Charset::Blocks);
        assert_eq!(settings.render.width, Some(64));
        assert_eq!(settings.render.fit, FitMode::Auto);
        assert_eq!(settings.viewport, Some(Viewport::new(400.0, 0.0)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nfit = 'height'\nsize = 'mini'").unwrap();
        let settings = load_config(file.path()).unwrap();
        assert_eq!(settings.render.fit, FitMode::Height);
        assert_eq!(settings.render.size, SizePreset::Mini);
    }

    #[test]
    fn load_missing_file_fails() {
        assert!(load_config(Path::new("/nonexistent/ansimage.toml")).is_err());
    }

    #[test]
    fn serde_roundtrip_uses_canonical_names() {
        let config = RenderConfig {
            charset: Charset::Braille,
            ..RenderConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("charset = \"braille\""));
    }
}
