#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theme {
    Light,
    Dark,
    Sepia,
}

impl Theme {
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            "sepia" => Theme::Sepia,
            _ => Theme::Light, // Default
        }
    }

    pub fn primary_color(&self) -> &str {
        match self {
            Theme::Light => "#0066cc",
            Theme::Dark => "#66b3ff",
            Theme::Sepia => "#8b4513",
        }
    }

    pub fn background_color(&self) -> &str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#1e1e1e",
            Theme::Sepia => "#f4ecd8",
        }
    }

    pub fn text_color(&self) -> &str {
        match self {
            Theme::Light => "#333333",
            Theme::Dark => "#d4d4d4",
            Theme::Sepia => "#5b4636",
        }
    }

    pub fn code_background(&self) -> &str {
        match self {
            Theme::Light => "#f5f5f5",
            Theme::Dark => "#2d2d2d",
            Theme::Sepia => "#ebe0c8",
        }
    }

    pub fn border_color(&self) -> &str {
        match self {
            Theme::Light => "#dddddd",
            Theme::Dark => "#444444",
            Theme::Sepia => "#d3c4a4",
        }
    }

    /// Stylesheet shared by the converted guides and the index page.
    pub fn stylesheet(&self) -> String {
        format!(
            r#"body {{
  max-width: 48em;
  margin: 2em auto;
  padding: 0 1em;
  font-family: "Hiragino Kaku Gothic ProN", "Yu Gothic", Meiryo, sans-serif;
  line-height: 1.8;
  color: {text};
  background: {background};
}}
h1, h2, h3 {{ color: {primary}; }}
h1 {{ border-bottom: 2px solid {primary}; padding-bottom: 0.2em; }}
a {{ color: {primary}; }}
pre, code {{ background: {code}; font-family: Consolas, Menlo, monospace; }}
pre {{ padding: 0.8em; overflow-x: auto; border: 1px solid {border}; }}
table {{ border-collapse: collapse; }}
th, td {{ border: 1px solid {border}; padding: 0.3em 0.8em; }}
blockquote {{ border-left: 4px solid {border}; margin-left: 0; padding-left: 1em; }}
"#,
            text = self.text_color(),
            background = self.background_color(),
            primary = self.primary_color(),
            code = self.code_background(),
            border = self.border_color(),
        )
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_falls_back() {
        assert_eq!(Theme::from_name("DARK"), Theme::Dark);
        assert_eq!(Theme::from_name("dracula"), Theme::Light);
    }

    #[test]
    fn test_stylesheet_uses_theme_colors() {
        let css = Theme::Sepia.stylesheet();
        assert!(css.contains("#f4ecd8"));
        assert!(css.contains("#8b4513"));
    }
}
