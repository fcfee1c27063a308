use scenery_engine::paint::Color;

/// Text block drawn in the lower-right quarter of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// One label per line, top line first.
    pub lines: Vec<String>,
    pub font: String,
    pub size: f32,
    pub color: Color,
    /// Baseline start of every line, in pixels inside the text viewport.
    pub x: i32,
    /// Baseline of the top line, in pixels above the viewport's bottom edge.
    pub top_y: i32,
    pub line_spacing: i32,
}

impl OverlayConfig {
    /// Baseline heights of the lines, top to bottom.
    pub fn baselines(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.lines.len() as i32).map(|i| self.top_y - i * self.line_spacing)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "Subject: Computer graphics".to_string(),
                "Year: 2018/19".to_string(),
                "Scene: barrel drop".to_string(),
                "Renderer: wgpu".to_string(),
                "Task: 13.1".to_string(),
            ],
            font: "Helvetica".to_string(),
            size: 12.0,
            color: Color::rgb(1.0, 1.0, 0.0),
            x: 370,
            top_y: 70,
            line_spacing: 12,
        }
    }
}

/// Options for [`World`](crate::World).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldConfig {
    /// Draw the orientation grid behind the scene.
    pub show_grid: bool,
    pub overlay: OverlayConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_baselines_step_down_by_twelve() {
        let overlay = OverlayConfig::default();
        let ys: Vec<i32> = overlay.baselines().collect();
        assert_eq!(ys, vec![70, 58, 46, 34, 22]);
    }

    #[test]
    fn grid_is_off_by_default() {
        assert!(!WorldConfig::default().show_grid);
    }
}
