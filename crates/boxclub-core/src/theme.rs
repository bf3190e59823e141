//! Theme registry and design-token merging
//!
//! A theme is a fixed, named set of color/style tokens. Tenants reference a
//! theme by slug and may override a few colors on top of it. Overrides
//! cascade to related surface tokens so a single override never leaves
//! mismatched surfaces:
//!
//! | Override     | Tokens written                                                         |
//! |--------------|------------------------------------------------------------------------|
//! | `primary`    | `--primary`, `--ring`                                                  |
//! | `secondary`  | `--secondary`, `--accent`                                              |
//! | `background` | `--background`, `--card`, `--popover`, `--muted`                       |
//! | `foreground` | `--foreground`, `--card-foreground`, `--popover-foreground`, `--muted-foreground` |
//!
//! ```rust
//! use boxclub_core::theme::{ThemeRegistry, CustomColors, apply_custom_colors, theme_vars};
//!
//! let registry = ThemeRegistry::builtin();
//! let theme = registry.get_theme("coffee");
//! let custom = CustomColors { primary: Some("#ABC".to_string()), ..Default::default() };
//!
//! let vars = apply_custom_colors(theme_vars(theme), Some(&custom));
//! assert_eq!(vars.get("--primary"), Some("#ABC"));
//! assert_eq!(vars.get("--ring"), Some("#ABC"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Slug of the theme returned for unknown theme slugs
pub const DEFAULT_THEME_SLUG: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

/// A named, immutable set of design tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub slug: String,
    pub name: String,
    pub mode: ThemeMode,
    pub background: String,
    pub foreground: String,
    pub card: String,
    pub card_foreground: String,
    pub popover: String,
    pub popover_foreground: String,
    pub muted: String,
    pub muted_foreground: String,
    pub border: String,
    pub input: String,
    pub primary: String,
    pub primary_foreground: String,
    pub secondary: String,
    pub secondary_foreground: String,
    pub accent: String,
    pub accent_foreground: String,
    pub destructive: String,
    pub ring: String,
    pub radius: String,
}

/// Per-tenant color overrides applied on top of the referenced theme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomColors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
}

impl CustomColors {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
            && self.secondary.is_none()
            && self.background.is_none()
            && self.foreground.is_none()
    }
}

/// CSS custom property name -> value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeVars(BTreeMap<String, String>);

impl ThemeVars {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a CSS rule, e.g. `:root { --primary: #f59e0b; }`
    pub fn to_css(&self, selector: &str) -> String {
        let mut css = format!("{} {{\n", selector);
        for (name, value) in self.iter() {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push('}');
        css
    }
}

/// Produce the CSS custom properties for a theme
pub fn theme_vars(theme: &ThemeConfig) -> ThemeVars {
    let mut vars = ThemeVars::default();
    vars.set("--background", &theme.background);
    vars.set("--foreground", &theme.foreground);
    vars.set("--card", &theme.card);
    vars.set("--card-foreground", &theme.card_foreground);
    vars.set("--popover", &theme.popover);
    vars.set("--popover-foreground", &theme.popover_foreground);
    vars.set("--muted", &theme.muted);
    vars.set("--muted-foreground", &theme.muted_foreground);
    vars.set("--border", &theme.border);
    vars.set("--input", &theme.input);
    vars.set("--primary", &theme.primary);
    vars.set("--primary-foreground", &theme.primary_foreground);
    vars.set("--secondary", &theme.secondary);
    vars.set("--secondary-foreground", &theme.secondary_foreground);
    vars.set("--accent", &theme.accent);
    vars.set("--accent-foreground", &theme.accent_foreground);
    vars.set("--destructive", &theme.destructive);
    vars.set("--ring", &theme.ring);
    vars.set("--radius", &theme.radius);
    vars
}

/// Overlay a tenant's explicit color overrides, cascading to related tokens
pub fn apply_custom_colors(mut vars: ThemeVars, custom: Option<&CustomColors>) -> ThemeVars {
    let Some(custom) = custom else {
        return vars;
    };

    if let Some(primary) = &custom.primary {
        for name in ["--primary", "--ring"] {
            vars.set(name, primary);
        }
    }

    if let Some(secondary) = &custom.secondary {
        for name in ["--secondary", "--accent"] {
            vars.set(name, secondary);
        }
    }

    if let Some(background) = &custom.background {
        for name in ["--background", "--card", "--popover", "--muted"] {
            vars.set(name, background);
        }
    }

    if let Some(foreground) = &custom.foreground {
        for name in [
            "--foreground",
            "--card-foreground",
            "--popover-foreground",
            "--muted-foreground",
        ] {
            vars.set(name, foreground);
        }
    }

    vars
}

/// Lookup table of the themes known to the platform
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: HashMap<String, ThemeConfig>,
}

impl ThemeRegistry {
    /// Registry with the built-in themes
    pub fn builtin() -> Self {
        let themes = builtin_themes()
            .into_iter()
            .map(|t| (t.slug.clone(), t))
            .collect();
        Self { themes }
    }

    /// Look up a theme, falling back to the default theme for unknown slugs
    pub fn get_theme(&self, slug: &str) -> &ThemeConfig {
        if let Some(theme) = self.themes.get(slug) {
            return theme;
        }

        debug!("Unknown theme '{}', using '{}'", slug, DEFAULT_THEME_SLUG);
        self.default_theme()
    }

    pub fn default_theme(&self) -> &ThemeConfig {
        // builtin() always registers the default theme
        &self.themes[DEFAULT_THEME_SLUG]
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.themes.contains_key(slug)
    }

    /// All theme slugs, sorted
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn light_theme(
    slug: &str,
    name: &str,
    background: &str,
    foreground: &str,
    muted: &str,
    border: &str,
    primary: &str,
    secondary: &str,
    accent: &str,
) -> ThemeConfig {
    ThemeConfig {
        slug: slug.to_string(),
        name: name.to_string(),
        mode: ThemeMode::Light,
        background: background.to_string(),
        foreground: foreground.to_string(),
        card: background.to_string(),
        card_foreground: foreground.to_string(),
        popover: background.to_string(),
        popover_foreground: foreground.to_string(),
        muted: muted.to_string(),
        muted_foreground: "#6b7280".to_string(),
        border: border.to_string(),
        input: border.to_string(),
        primary: primary.to_string(),
        primary_foreground: "#ffffff".to_string(),
        secondary: secondary.to_string(),
        secondary_foreground: foreground.to_string(),
        accent: accent.to_string(),
        accent_foreground: foreground.to_string(),
        destructive: "#dc2626".to_string(),
        ring: primary.to_string(),
        radius: "0.5rem".to_string(),
    }
}

fn builtin_themes() -> Vec<ThemeConfig> {
    let dark = ThemeConfig {
        slug: "dark".to_string(),
        name: "Dark".to_string(),
        mode: ThemeMode::Dark,
        background: "#0a0a0a".to_string(),
        foreground: "#fafafa".to_string(),
        card: "#171717".to_string(),
        card_foreground: "#fafafa".to_string(),
        popover: "#171717".to_string(),
        popover_foreground: "#fafafa".to_string(),
        muted: "#262626".to_string(),
        muted_foreground: "#a3a3a3".to_string(),
        border: "#262626".to_string(),
        input: "#262626".to_string(),
        primary: "#fafafa".to_string(),
        primary_foreground: "#171717".to_string(),
        secondary: "#262626".to_string(),
        secondary_foreground: "#fafafa".to_string(),
        accent: "#262626".to_string(),
        accent_foreground: "#fafafa".to_string(),
        destructive: "#7f1d1d".to_string(),
        ring: "#d4d4d4".to_string(),
        radius: "0.5rem".to_string(),
    };

    vec![
        light_theme(
            DEFAULT_THEME_SLUG,
            "Default",
            "#ffffff",
            "#0a0a0a",
            "#f5f5f5",
            "#e5e5e5",
            "#171717",
            "#f5f5f5",
            "#f5f5f5",
        ),
        light_theme(
            "craft-beer",
            "Craft Beer",
            "#fffbeb",
            "#1c1917",
            "#fef3c7",
            "#fde68a",
            "#d97706",
            "#78350f",
            "#fbbf24",
        ),
        light_theme(
            "coffee",
            "Coffee",
            "#faf7f2",
            "#292524",
            "#f0e9df",
            "#e7dccb",
            "#6f4e37",
            "#c8a27a",
            "#e9d5b5",
        ),
        light_theme(
            "wine",
            "Wine",
            "#fdf8f8",
            "#1f1315",
            "#f6e8ea",
            "#ecd3d7",
            "#7f1d3a",
            "#b45372",
            "#f2d7de",
        ),
        dark,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        let registry = ThemeRegistry::builtin();
        let theme = registry.get_theme("does-not-exist");
        assert_eq!(theme.slug, DEFAULT_THEME_SLUG);
    }

    #[test]
    fn test_builtin_themes_present() {
        let registry = ThemeRegistry::builtin();
        assert_eq!(
            registry.slugs(),
            vec!["coffee", "craft-beer", "dark", "default", "wine"]
        );
        assert_eq!(registry.get_theme("dark").mode, ThemeMode::Dark);
    }

    #[test]
    fn test_theme_vars_cover_all_tokens() {
        let registry = ThemeRegistry::builtin();
        let vars = theme_vars(registry.get_theme("craft-beer"));

        assert_eq!(vars.len(), 19);
        assert_eq!(vars.get("--primary"), Some("#d97706"));
        assert_eq!(vars.get("--radius"), Some("0.5rem"));
    }

    #[test]
    fn test_primary_override_touches_only_primary_and_ring() {
        let registry = ThemeRegistry::builtin();
        let base = theme_vars(registry.get_theme("wine"));
        let custom = CustomColors {
            primary: Some("#ABC".to_string()),
            ..Default::default()
        };

        let merged = apply_custom_colors(base.clone(), Some(&custom));

        for (name, value) in merged.iter() {
            match name {
                "--primary" | "--ring" => assert_eq!(value, "#ABC"),
                _ => assert_eq!(Some(value), base.get(name), "{} changed", name),
            }
        }
    }

    #[test]
    fn test_secondary_cascades_to_accent() {
        let base = theme_vars(ThemeRegistry::builtin().default_theme());
        let custom = CustomColors {
            secondary: Some("#123456".to_string()),
            ..Default::default()
        };

        let merged = apply_custom_colors(base.clone(), Some(&custom));
        assert_eq!(merged.get("--secondary"), Some("#123456"));
        assert_eq!(merged.get("--accent"), Some("#123456"));
        assert_eq!(merged.get("--primary"), base.get("--primary"));
    }

    #[test]
    fn test_background_and_foreground_cascade_to_surfaces() {
        let base = theme_vars(ThemeRegistry::builtin().default_theme());
        let custom = CustomColors {
            background: Some("#000001".to_string()),
            foreground: Some("#fffffe".to_string()),
            ..Default::default()
        };

        let merged = apply_custom_colors(base.clone(), Some(&custom));

        for name in ["--background", "--card", "--popover", "--muted"] {
            assert_eq!(merged.get(name), Some("#000001"));
        }
        for name in [
            "--foreground",
            "--card-foreground",
            "--popover-foreground",
            "--muted-foreground",
        ] {
            assert_eq!(merged.get(name), Some("#fffffe"));
        }
        assert_eq!(merged.get("--border"), base.get("--border"));
    }

    #[test]
    fn test_no_custom_colors_is_identity() {
        let base = theme_vars(ThemeRegistry::builtin().default_theme());
        assert_eq!(apply_custom_colors(base.clone(), None), base);
        assert_eq!(
            apply_custom_colors(base.clone(), Some(&CustomColors::default())),
            base
        );
        assert!(CustomColors::default().is_empty());
    }

    #[test]
    fn test_to_css() {
        let mut vars = ThemeVars::default();
        vars.set("--primary", "#111");
        vars.set("--ring", "#222");

        assert_eq!(
            vars.to_css(":root"),
            ":root {\n  --primary: #111;\n  --ring: #222;\n}"
        );
    }
}
