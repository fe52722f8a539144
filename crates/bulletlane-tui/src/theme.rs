use ratatui::style::Color;

/// Runtime theme for the bullet field and status bar
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey1: Color,
    pub grey2: Color,

    /// Bullet colors, cycled by lane
    pub lanes: Vec<Color>,

    // Semantic colors
    pub paused: Color,
    pub paused_bg: Color,
    pub warning: Color,
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey1: Color::Rgb(0x92, 0x83, 0x74),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            lanes: vec![
                Color::Rgb(0xd4, 0xbe, 0x98),
                Color::Rgb(0x7d, 0xae, 0xa3),
                Color::Rgb(0xa9, 0xb6, 0x65),
                Color::Rgb(0xd3, 0x86, 0x9b),
                Color::Rgb(0x89, 0xb4, 0x82),
                Color::Rgb(0xd8, 0xa6, 0x57),
            ],
            paused: Color::Rgb(0x28, 0x28, 0x28),
            paused_bg: Color::Rgb(0xe7, 0x8a, 0x4e),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
            accent: Color::Rgb(0x89, 0xb4, 0x82),
        }
    }
}

impl Theme {
    pub fn lane_color(&self, lane: usize) -> Color {
        if self.lanes.is_empty() {
            return self.fg0;
        }
        self.lanes[lane % self.lanes.len()]
    }
}
