//! Light and dark diagram palettes.
//!
//! Each palette is a fixed mapping of named colour/style roles. The role names
//! follow Mermaid's `themeVariables` so palettes can be compared against
//! diagrams rendered elsewhere.

use mermaid_rs_renderer::Theme;

use crate::config::ThemeMode;

/// The resolved light/dark mode a diagram is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteMode {
    #[default]
    Light,
    Dark,
}

impl PaletteMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Resolve a configured theme. `Auto` uses the detected background when
    /// one is known and falls back to light.
    pub fn resolve(mode: ThemeMode, detected: Option<Self>) -> Self {
        match mode {
            ThemeMode::Light => Self::Light,
            ThemeMode::Dark => Self::Dark,
            ThemeMode::Auto => detected.unwrap_or_default(),
        }
    }

    /// Classify a terminal background colour by luma.
    pub fn from_background_rgb(r: u8, g: u8, b: u8) -> Self {
        let luma = 0.0722f32.mul_add(
            f32::from(b),
            0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
        );
        if luma >= 140.0 { Self::Light } else { Self::Dark }
    }
}

/// Named roles handed to the diagram engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub tertiary_color: &'static str,
    pub primary_text_color: &'static str,
    pub secondary_text_color: &'static str,
    pub line_color: &'static str,
    pub font_size: &'static str,
    pub node_border: &'static str,
    pub main_bkg: &'static str,
    pub alt_background: &'static str,
    pub text_color: &'static str,
    pub edge_label_background: &'static str,
    pub cluster_bkg: &'static str,
    pub cluster_border: &'static str,
    pub label_box_bkg_color: &'static str,
    pub label_box_border_color: &'static str,
    pub label_text_color: &'static str,
}

pub const DARK: Palette = Palette {
    background: "#1f2937",
    primary_color: "#3b4c6b",
    secondary_color: "#4b5c7c",
    tertiary_color: "#5b6c8c",
    primary_text_color: "#e5e7eb",
    secondary_text_color: "#d1d5db",
    line_color: "#6b7280",
    font_size: "14px",
    node_border: "#6b7280",
    main_bkg: "#374151",
    alt_background: "#4b5563",
    text_color: "#e5e7eb",
    edge_label_background: "#374151",
    cluster_bkg: "#374151",
    cluster_border: "#6b7280",
    label_box_bkg_color: "#4b5563",
    label_box_border_color: "#6b7280",
    label_text_color: "#e5e7eb",
};

pub const LIGHT: Palette = Palette {
    background: "#ffffff",
    primary_color: "#2563eb",
    secondary_color: "#3b82f6",
    tertiary_color: "#60a5fa",
    primary_text_color: "#1f2937",
    secondary_text_color: "#374151",
    line_color: "#6b7280",
    font_size: "14px",
    node_border: "#d1d5db",
    main_bkg: "#f9fafb",
    alt_background: "#f3f4f6",
    text_color: "#1f2937",
    edge_label_background: "#ffffff",
    cluster_bkg: "#f9fafb",
    cluster_border: "#d1d5db",
    label_box_bkg_color: "#f3f4f6",
    label_box_border_color: "#d1d5db",
    label_text_color: "#1f2937",
};

impl Palette {
    pub const fn for_mode(mode: PaletteMode) -> &'static Self {
        match mode {
            PaletteMode::Light => &LIGHT,
            PaletteMode::Dark => &DARK,
        }
    }

    /// All roles as `(themeVariables name, value)` pairs.
    pub const fn roles(&self) -> [(&'static str, &'static str); 18] {
        [
            ("background", self.background),
            ("primaryColor", self.primary_color),
            ("secondaryColor", self.secondary_color),
            ("tertiaryColor", self.tertiary_color),
            ("primaryTextColor", self.primary_text_color),
            ("secondaryTextColor", self.secondary_text_color),
            ("lineColor", self.line_color),
            ("fontSize", self.font_size),
            ("nodeBorder", self.node_border),
            ("mainBkg", self.main_bkg),
            ("altBackground", self.alt_background),
            ("textColor", self.text_color),
            ("edgeLabelBackground", self.edge_label_background),
            ("clusterBkg", self.cluster_bkg),
            ("clusterBorder", self.cluster_border),
            ("labelBoxBkgColor", self.label_box_bkg_color),
            ("labelBoxBorderColor", self.label_box_border_color),
            ("labelTextColor", self.label_text_color),
        ]
    }

    /// Font size in pixels, parsed from the `14px` style value.
    pub fn font_size_px(&self) -> f32 {
        self.font_size
            .trim_end_matches("px")
            .trim()
            .parse()
            .unwrap_or(14.0)
    }

    /// Build the engine theme. Node fill comes from `mainBkg`, which is what
    /// Mermaid itself does when both it and `primaryColor` are set.
    pub fn to_engine_theme(&self) -> Theme {
        Theme {
            font_size: self.font_size_px(),
            background: self.background.to_string(),
            primary_color: self.main_bkg.to_string(),
            primary_text_color: self.primary_text_color.to_string(),
            primary_border_color: self.node_border.to_string(),
            line_color: self.line_color.to_string(),
            secondary_color: self.secondary_color.to_string(),
            tertiary_color: self.tertiary_color.to_string(),
            edge_label_background: self.edge_label_background.to_string(),
            cluster_background: self.cluster_bkg.to_string(),
            cluster_border: self.cluster_border.to_string(),
            text_color: self.text_color.to_string(),
            sequence_actor_fill: self.main_bkg.to_string(),
            sequence_actor_border: self.node_border.to_string(),
            sequence_actor_line: self.line_color.to_string(),
            sequence_note_fill: self.label_box_bkg_color.to_string(),
            sequence_note_border: self.label_box_border_color.to_string(),
            sequence_activation_fill: self.alt_background.to_string(),
            sequence_activation_border: self.primary_color.to_string(),
            pie_title_text_color: self.label_text_color.to_string(),
            pie_section_text_color: self.secondary_text_color.to_string(),
            pie_legend_text_color: self.label_text_color.to_string(),
            ..Theme::modern()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_define_eighteen_distinctly_named_roles() {
        let names: std::collections::HashSet<_> =
            LIGHT.roles().iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), 18);
    }

    #[test]
    fn test_dark_and_light_differ_in_colour_roles() {
        let differing = LIGHT
            .roles()
            .iter()
            .zip(DARK.roles().iter())
            .filter(|(l, d)| l.1 != d.1)
            .count();
        // lineColor and fontSize are shared; everything else differs.
        assert_eq!(differing, 16);
    }

    #[test]
    fn test_resolve_auto_uses_detection_then_light() {
        assert_eq!(
            PaletteMode::resolve(ThemeMode::Auto, Some(PaletteMode::Dark)),
            PaletteMode::Dark
        );
        assert_eq!(PaletteMode::resolve(ThemeMode::Auto, None), PaletteMode::Light);
        assert_eq!(
            PaletteMode::resolve(ThemeMode::Dark, Some(PaletteMode::Light)),
            PaletteMode::Dark
        );
    }

    #[test]
    fn test_background_luma_classification() {
        assert_eq!(PaletteMode::from_background_rgb(255, 255, 255), PaletteMode::Light);
        assert_eq!(PaletteMode::from_background_rgb(30, 30, 46), PaletteMode::Dark);
    }

    #[test]
    fn test_engine_theme_carries_palette_colours() {
        let theme = DARK.to_engine_theme();
        assert_eq!(theme.background, "#1f2937");
        assert_eq!(theme.primary_color, "#374151");
        assert_eq!(theme.line_color, "#6b7280");
        assert!((theme.font_size - 14.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_toggled_flips_mode() {
        assert_eq!(PaletteMode::Light.toggled(), PaletteMode::Dark);
        assert!(PaletteMode::Light.toggled().is_dark());
    }
}
