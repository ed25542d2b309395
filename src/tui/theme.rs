use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(16, 18, 22);
pub const SURFACE: Color = Color::Rgb(24, 28, 34);
pub const BORDER: Color = Color::Rgb(48, 56, 68);
pub const TEXT: Color = Color::Rgb(220, 226, 232);
pub const TEXT_DIM: Color = Color::Rgb(112, 124, 138);
pub const ACCENT: Color = Color::Rgb(120, 170, 210);
pub const GREEN: Color = Color::Rgb(104, 168, 120);
pub const AMBER: Color = Color::Rgb(214, 168, 80);
pub const RED: Color = Color::Rgb(196, 96, 88);

/// Heatmap shades from empty to full.
pub const HEAT: [Color; 5] = [
    Color::Rgb(34, 40, 48),
    Color::Rgb(40, 72, 56),
    Color::Rgb(56, 104, 72),
    Color::Rgb(80, 140, 96),
    Color::Rgb(112, 184, 128),
];

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn border(focused: bool) -> Style {
    if focused {
        accent()
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn heat(intensity: u8) -> Style {
    Style::default().fg(HEAT[(intensity as usize).min(HEAT.len() - 1)])
}
