use std::time::Duration;

/// Tunables of the falling-words game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub field_width: f64,
    pub field_height: f64,
    /// Horizontal room kept free at the right edge so words are not clipped.
    pub glyph_margin: f64,
    pub frames_per_second: f64,
    pub spawn_interval: Duration,
    pub starting_lives: u32,
    pub points_per_word: u32,
    /// Score step that earns a level.
    pub level_step: u32,
    pub max_level: u32,
    /// Active-word cap per level, index 0 = level 1. Levels past the end reuse the last entry.
    pub capacity_by_level: Vec<usize>,
}

impl GameConfig {
    pub const DEFAULT_FIELD_WIDTH: f64 = 900.0;
    pub const DEFAULT_FIELD_HEIGHT: f64 = 700.0;
    pub const DEFAULT_GLYPH_MARGIN: f64 = 80.0;
    pub const DEFAULT_FPS: f64 = 60.0;
    pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(2000);
    pub const DEFAULT_LIVES: u32 = 20;
    pub const DEFAULT_POINTS: u32 = 10;
    pub const DEFAULT_LEVEL_STEP: u32 = 200;
    pub const DEFAULT_MAX_LEVEL: u32 = 10;
    pub const DEFAULT_CAPACITY: [usize; 10] = [5, 8, 10, 12, 14, 16, 18, 20, 22, 24];

    /// Words allowed on the field at once at `level`.
    pub fn capacity(&self, level: u32) -> usize {
        let idx = (level.max(1) - 1) as usize;
        self.capacity_by_level
            .get(idx)
            .or(self.capacity_by_level.last())
            .copied()
            .unwrap_or(0)
    }

    /// Fall-time constant of the difficulty curve; smaller is faster.
    pub fn fall_speed(level: u32) -> f64 {
        (250.0 - 10.0 * level as f64).max(30.0)
    }

    /// Vertical step per animation frame at `level`.
    pub fn pixels_per_frame(&self, level: u32) -> f64 {
        self.field_height / (Self::fall_speed(level) * self.frames_per_second)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: Self::DEFAULT_FIELD_WIDTH,
            field_height: Self::DEFAULT_FIELD_HEIGHT,
            glyph_margin: Self::DEFAULT_GLYPH_MARGIN,
            frames_per_second: Self::DEFAULT_FPS,
            spawn_interval: Self::DEFAULT_SPAWN_INTERVAL,
            starting_lives: Self::DEFAULT_LIVES,
            points_per_word: Self::DEFAULT_POINTS,
            level_step: Self::DEFAULT_LEVEL_STEP,
            max_level: Self::DEFAULT_MAX_LEVEL,
            capacity_by_level: Self::DEFAULT_CAPACITY.to_vec(),
        }
    }
}

/// When the sentence drill scores a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Once, when the recognizer session ends.
    #[default]
    Batch,
    /// On every interim result, finalized at session end.
    Streaming,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillConfig {
    pub mode: EvaluationMode,
    /// Beginner turns end this long after the last recognized phrase.
    pub silence_cutoff: Duration,
}

impl DrillConfig {
    pub const DEFAULT_SILENCE_CUTOFF: Duration = Duration::from_millis(2000);
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            mode: EvaluationMode::Batch,
            silence_cutoff: Self::DEFAULT_SILENCE_CUTOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_steps_up_with_level() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.capacity(1), 5);
        assert_eq!(cfg.capacity(10), 24);
        assert_eq!(cfg.capacity(14), 24);
        assert_eq!(cfg.capacity(0), 5);
        let caps: Vec<usize> = (1..=10).map(|l| cfg.capacity(l)).collect();
        assert!(caps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn fall_speed_bottoms_out() {
        assert_eq!(GameConfig::fall_speed(1), 240.0);
        assert_eq!(GameConfig::fall_speed(10), 150.0);
        assert_eq!(GameConfig::fall_speed(22), 30.0);
        assert_eq!(GameConfig::fall_speed(40), 30.0);
    }

    #[test]
    fn higher_levels_fall_faster() {
        let cfg = GameConfig::default();
        let l1 = cfg.pixels_per_frame(1);
        assert!((l1 - 700.0 / (240.0 * 60.0)).abs() < 1e-12);
        assert!(cfg.pixels_per_frame(2) > l1);
    }
}
