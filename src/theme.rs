//! Theme loading: btop-style `theme[key]="value"`, palettes, and per-floor colours.

use crate::floors::floor_hue;
use crate::game::Floor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Snake, food, ladder and chrome colours.
#[derive(Debug, Clone)]
pub struct Theme {
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub ladder: Color,
    /// Background outside the board.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, floor).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Hints and secondary text.
    pub inactive_fg: Color,
    /// Board border while the grace period runs.
    pub alert: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark hex values (same as onedark.theme).
    pub fn onedark_default() -> Self {
        Self {
            snake_head: Color::Rgb(0x98, 0xC3, 0x79),
            snake_body: Color::Rgb(0x6E, 0x9A, 0x57),
            food: Color::Rgb(0xE0, 0x6C, 0x75),
            ladder: Color::Rgb(0xE5, 0xC0, 0x7B),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            alert: Color::Rgb(0xF4, 0x3F, 0x5E),
        }
    }

    /// Load from a btop-style file; One Dark when `path` is None or missing.
    /// `palette` then overrides the play colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                log::info!("loaded theme {}", p.display());
                Self::from_map(&parse_theme_file(&s))
            }
            Some(p) => {
                log::warn!("theme {} not found, using One Dark", p.display());
                Self::onedark_default()
            }
            None => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.snake_head = Color::Rgb(0x00, 0xFF, 0x00);
                self.snake_body = Color::Rgb(0x00, 0xAA, 0x00);
                self.food = Color::Rgb(0xFF, 0x00, 0x00);
                self.ladder = Color::Rgb(0xFF, 0xFF, 0x00);
                self.alert = Color::Rgb(0xFF, 0x00, 0xFF);
            }
            crate::Palette::Colorblind => {
                // Blue snake, orange food: no red/green pairing.
                self.snake_head = Color::Rgb(0x33, 0xBB, 0xEE);
                self.snake_body = Color::Rgb(0x00, 0x77, 0xBB);
                self.food = Color::Rgb(0xEE, 0x77, 0x33);
                self.ladder = Color::Rgb(0xBB, 0xBB, 0x00);
                self.alert = Color::Rgb(0xEE, 0x33, 0x77);
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()));
        let d = Self::onedark_default();
        Self {
            snake_head: get(&["cpu_start", "mem_box"]).unwrap_or(d.snake_head),
            snake_body: get(&["cpu_mid", "proc_box"]).unwrap_or(d.snake_body),
            food: get(&["cpu_end", "temp_end"]).unwrap_or(d.food),
            ladder: get(&["title", "hi_fg"]).unwrap_or(d.ladder),
            bg: get(&["meter_bg"]).unwrap_or(d.bg),
            div_line: get(&["div_line"]).unwrap_or(d.div_line),
            main_fg: get(&["main_fg"]).unwrap_or(d.main_fg),
            title: get(&["title"]).unwrap_or(d.title),
            inactive_fg: get(&["inactive_fg"]).unwrap_or(d.inactive_fg),
            alert: get(&["temp_end", "cpu_end"]).unwrap_or(d.alert),
        }
    }

    /// Board background for a floor: hsl(hue, 50%, 20%).
    pub fn floor_bg(&self, floor: Floor) -> Color {
        hsl(f32::from(floor_hue(floor)), 0.5, 0.2)
    }

    /// Empty cell on a floor: hsl(hue, 40%, 35%) at half opacity over the background.
    pub fn floor_cell(&self, floor: Floor) -> Color {
        let hue = f32::from(floor_hue(floor));
        blend(hsl(hue, 0.4, 0.35), self.floor_bg(floor), 0.5)
    }
}

/// HSL (h in degrees, s/l in 0..=1) → RGB.
pub fn hsl(h: f32, s: f32, l: f32) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// `alpha` of `top` over `bottom`; non-RGB colours pass through as `top`.
pub fn blend(top: Color, bottom: Color, alpha: f32) -> Color {
    match (top, bottom) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| (f32::from(a) * alpha + f32::from(b) * (1.0 - alpha)).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ => top,
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(bad()),
    }
}
