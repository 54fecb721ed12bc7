//! Board chrome colours from btop-style `theme[key]="value"` files. Tile colours come
//! from the tile palette and are not themable.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Empty board cells.
    pub bg: Color,
    /// Borders and separators.
    pub div_line: Color,
    /// Sidebar text.
    pub main_fg: Color,
    /// Titles and the selected menu entry.
    pub title: Color,
    /// Hints and unselected menu entries.
    pub inactive_fg: Color,
    /// Landing preview of the active piece.
    pub ghost: Color,
    /// Score popups and the row-clear flash.
    pub highlight: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const BG: Color = Color::Rgb(0x31, 0x35, 0x3F);
const DIV_LINE: Color = Color::Rgb(0x3F, 0x44, 0x4F);
const MAIN_FG: Color = Color::Rgb(0xAB, 0xB2, 0xBF);
const TITLE: Color = Color::Rgb(0xE5, 0xC0, 0x7B);
const INACTIVE_FG: Color = Color::Rgb(0x5C, 0x63, 0x70);
const HIGHLIGHT: Color = Color::Rgb(0x56, 0xB6, 0xC2);

impl Default for Theme {
    /// One Dark.
    fn default() -> Self {
        Self {
            bg: BG,
            div_line: DIV_LINE,
            main_fg: MAIN_FG,
            title: TITLE,
            inactive_fg: INACTIVE_FG,
            ghost: INACTIVE_FG,
            highlight: HIGHLIGHT,
        }
    }
}

impl Theme {
    /// Load a theme file, or One Dark when no path is given.
    ///
    /// Keys missing from the file keep their default colour.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|key| map.get(*key).and_then(|v| parse_hex(v).ok()))
                .unwrap_or(fallback)
        };
        let inactive_fg = get(&["inactive_fg"], INACTIVE_FG);
        Self {
            bg: get(&["meter_bg", "main_bg"], BG),
            div_line: get(&["div_line"], DIV_LINE),
            main_fg: get(&["main_fg"], MAIN_FG),
            title: get(&["title"], TITLE),
            inactive_fg,
            ghost: get(&["graph_text"], inactive_fg),
            highlight: get(&["hi_fg", "proc_misc"], HIGHLIGHT),
        }
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
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let (r, g, b) = match s.len() {
        6 => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        assert_eq!(parse_hex("#98C379").unwrap(), Color::Rgb(0x98, 0xC3, 0x79));
    }

    #[test]
    fn test_parse_hex_3() {
        assert_eq!(parse_hex("#FFF").unwrap(), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let map = parse_theme_file(
            "# comment\ntheme[title]='#FF0000'\ntheme[inactive_fg]=\"#010203\"\n",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.title, Color::Rgb(255, 0, 0));
        assert_eq!(theme.ghost, Color::Rgb(1, 2, 3));
        assert_eq!(theme.bg, Theme::default().bg);
    }

    #[test]
    fn test_no_path_is_one_dark() {
        assert_eq!(Theme::load(None).unwrap(), Theme::default());
    }
}
