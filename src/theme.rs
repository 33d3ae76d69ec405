//! Badge and chrome colors.
//! Derived from a kitty-style color file (`colorN #rrggbb`) when one is
//! available, so cards match the terminal palette.

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,        // Active borders, key hints
    pub danger: Color,        // Error banner
    pub text: Color,
    pub text_dim: Color,
    pub inactive: Color,      // Inactive borders
    pub header: Color,        // Section headings inside cards

    // Difficulty tiers
    pub good: Color,          // Low
    pub caution: Color,       // Medium
    pub warning: Color,       // High
    pub severe: Color,        // Very High
    pub neutral: Color,       // Unknown values, low volume

    // Volume tiers
    pub volume_top: Color,    // 10K+
    pub volume_high: Color,   // 1K-10K
    pub volume_mid: Color,    // 100-1K

    pub tag: Color,           // SERP feature tags
}

impl Default for Theme {
    fn default() -> Self {
        // Tailwind-ish 800 shades, readable on dark and light terminals
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(180, 190, 254),
            good: Color::Rgb(74, 222, 128),
            caution: Color::Rgb(250, 204, 21),
            warning: Color::Rgb(251, 146, 60),
            severe: Color::Rgb(248, 113, 113),
            neutral: Color::Rgb(156, 163, 175),
            volume_top: Color::Rgb(129, 140, 248),
            volume_high: Color::Rgb(96, 165, 250),
            volume_mid: Color::Rgb(56, 189, 248),
            tag: Color::Rgb(192, 132, 252),
        }
    }
}

impl Theme {
    /// Load from `path`, or the default kitty theme location, falling back to built-ins
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        match path.and_then(|p| fs::read_to_string(p).ok()) {
            Some(content) => Self::from_kitty_conf(&content),
            None => Self::default(),
        }
    }

    fn default_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("kitty/current-theme.conf"))
    }

    /// Map ANSI palette slots onto badge roles; missing slots keep defaults
    fn from_kitty_conf(content: &str) -> Self {
        let colors = Self::parse_kitty_conf(content);
        let base = Self::default();
        if colors.is_empty() {
            return base;
        }

        let pick = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|k| colors.get(*k))
                .copied()
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&["color3", "color11"], base.accent),
            danger: pick(&["color1", "color9"], base.danger),
            text: pick(&["foreground"], base.text),
            text_dim: pick(&["color8"], base.text_dim),
            inactive: pick(&["inactive_border_color", "color8"], base.inactive),
            header: pick(&["color12", "color4"], base.header),
            good: pick(&["color2", "color10"], base.good),
            caution: pick(&["color3", "color11"], base.caution),
            warning: pick(&["color9", "color11"], base.warning),
            severe: pick(&["color1", "color9"], base.severe),
            neutral: pick(&["color7", "color8"], base.neutral),
            volume_top: pick(&["color5", "color13"], base.volume_top),
            volume_high: pick(&["color4", "color12"], base.volume_high),
            volume_mid: pick(&["color6", "color14"], base.volume_mid),
            tag: pick(&["color13", "color5"], base.tag),
        }
    }

    /// Parse kitty.conf format: `key value` or `key #hexcolor`
    fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
        let mut colors = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(char::is_whitespace) {
                if let Some(color) = Self::parse_hex_color(value) {
                    colors.insert(key.trim().to_string(), color);
                }
            }
        }

        colors
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
