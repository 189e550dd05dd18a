//! Engine limits and defaults.

use crate::{error::ValidationError, grid::MIN_SIDE};

/// Side of a new maze when the player does not ask for a size.
pub const DEFAULT_SIDE: usize = 5;

/// Largest side a maze may reach by default, either at start or by growing across levels.
pub const DEFAULT_MAX_SIDE: usize = 101;

/// First level rendered through a fogged viewport by default.
pub const DEFAULT_DARK_LEVEL: u32 = 5;

/// Default side of the viewport on dark levels.
pub const DEFAULT_VISIBILITY: usize = 5;

/// Tunable limits of the maze engine.
///
/// This structure holds every knob the engine exposes. The terminal front end fills it from the
/// command line; embedders build it directly or start from [`EngineConfig::default`].
#[expect(
    clippy::module_name_repetitions,
    reason = "The engine is the only thing configured here."
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Width of a new game started without an explicit size.
    pub default_width: usize,
    /// Height of a new game started without an explicit size.
    pub default_height: usize,
    /// Largest width accepted at start and reached by level growth.
    ///
    /// Mazes grow by two columns per level until they hit this cap, after which they keep the
    /// capped width.
    pub max_width: usize,
    /// Largest height accepted at start and reached by level growth.
    pub max_height: usize,
    /// First level whose board is fogged.
    pub dark_level: u32,
    /// Side of the square window visible around the player on dark levels.
    pub visibility: usize,
    /// Fixed seed for the maze generator.
    ///
    /// `None` seeds from the thread-local generator, so every run produces different mazes.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_SIDE,
            default_height: DEFAULT_SIDE,
            max_width: DEFAULT_MAX_SIDE,
            max_height: DEFAULT_MAX_SIDE,
            dark_level: DEFAULT_DARK_LEVEL,
            visibility: DEFAULT_VISIBILITY,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Checks that the configuration describes a playable engine.
    ///
    /// # Errors
    ///
    /// This function returns an error if the maximum or default sizes are below the smallest
    /// maze, if the defaults exceed the maximum, or if the dark level or viewport are zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_width < MIN_SIDE || self.max_height < MIN_SIDE {
            return Err(ValidationError::TooSmall {
                width: self.max_width,
                height: self.max_height,
                min: MIN_SIDE,
            });
        }
        if self.default_width > self.max_width || self.default_height > self.max_height {
            return Err(ValidationError::DefaultExceedsMax {
                width: self.default_width,
                height: self.default_height,
            });
        }
        self.check_size(self.default_width, self.default_height)?;
        if self.dark_level == 0 {
            return Err(ValidationError::ZeroDarkLevel);
        }
        if self.visibility == 0 {
            return Err(ValidationError::ZeroVisibility);
        }

        Ok(())
    }

    /// Checks a requested maze size against the minimum and the configured maximum.
    ///
    /// # Errors
    ///
    /// This function returns [`ValidationError::TooSmall`] or [`ValidationError::TooLarge`].
    pub const fn check_size(&self, width: usize, height: usize) -> Result<(), ValidationError> {
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(ValidationError::TooSmall {
                width,
                height,
                min: MIN_SIDE,
            });
        }
        if width > self.max_width || height > self.max_height {
            return Err(ValidationError::TooLarge {
                width,
                height,
                max_width: self.max_width,
                max_height: self.max_height,
            });
        }

        Ok(())
    }

    /// Returns the size of the maze following a level of `width` by `height`.
    ///
    /// Each side grows by two and stops at the configured maximum.
    pub fn next_size(&self, width: usize, height: usize) -> (usize, usize) {
        (
            width.saturating_add(2).min(self.max_width.max(width)),
            height.saturating_add(2).min(self.max_height.max(height)),
        )
    }

    /// Returns whether boards of `level` are fogged.
    pub const fn is_dark(&self, level: u32) -> bool {
        level >= self.dark_level
    }
}
