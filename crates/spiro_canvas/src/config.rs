//! Canvas configuration

use spiro_core::Color;

/// Canvas configuration
#[derive(Clone, Debug)]
pub struct CanvasConfig {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Window title, for hosts that create a window
    pub title: String,
    /// Whether the host window may be resized
    pub resizable: bool,
    /// Wait for vertical blank when presenting
    pub vsync: bool,
    /// Color the target is cleared to at the start of every frame
    pub background: Option<Color>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Spirographicals".to_string(),
            resizable: true,
            vsync: true,
            background: None,
        }
    }
}

impl CanvasConfig {
    /// Create a configuration with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the target size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Clear to `color` at every `begin_frame`
    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

/// Level at which a canvas reports draws it skipped
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    #[default]
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// Skips are not reported
    Off,
}
