//! Theme identifiers offered by the settings page.

/// Themes a user can pick in the settings session.
pub const THEMES: [&str; 12] = [
    "light",
    "light_high_contrast",
    "light_tritanopia",
    "preferred_color_scheme",
    "dark",
    "dark_dimmed",
    "dark_high_contrast",
    "dark_tritanopia",
    "transparent_dark",
    "noborder_dark",
    "dark_no_border",
    "nolanlawson",
];

/// Theme used by a build when the config names none.
pub const SITE_DEFAULT_THEME: &str = "moonstomp";

/// Theme a settings session starts from when nothing usable was fetched.
pub const SESSION_DEFAULT_THEME: &str = "light";

pub fn is_known_theme(theme: &str) -> bool {
    THEMES.contains(&theme)
}
