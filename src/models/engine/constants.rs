//! Lane geometry and timing constants shared by the engine.

/// Logical width of the play area in pixels.
pub const SCREEN_WIDTH: f64 = 800.0;
/// Logical height of the play area in pixels.
pub const SCREEN_HEIGHT: f64 = 600.0;

/// Bottom edge of the lane (the lane sits in the upper half of the screen).
pub const LANE_BOTTOM: f64 = SCREEN_HEIGHT / 2.0;
/// Height of the lane band.
pub const LANE_HEIGHT: f64 = 200.0;
/// Vertical center of the lane, where scheduled notes travel.
pub const LANE_CENTER_Y: f64 = LANE_BOTTOM - LANE_HEIGHT / 2.0;

/// Horizontal position of the hit line.
pub const HIT_LINE_X: f64 = 120.0;

/// Default visual radius of a note; also the perfect tolerance.
pub const DEFAULT_NOTE_RADIUS: f64 = 30.0;
/// Default base hit radius. Expiry happens this far past the hit line and the
/// outer judging tolerance is twice this value.
pub const DEFAULT_HIT_RADIUS: f64 = 30.0;

/// Default horizontal scroll speed in pixels per second.
pub const DEFAULT_SCROLL_SPEED: f64 = 350.0;

/// Duration of the fade and fall exit animations (seconds).
pub const NOTE_FADE_SECONDS: f64 = 0.4;
/// Downward speed of a falling note (pixels per second).
pub const NOTE_FALL_SPEED: f64 = 260.0;

/// Default per-key input cooldown (seconds).
pub const DEFAULT_KEY_COOLDOWN: f64 = 0.08;

/// Score awarded for each judgement.
pub const PERFECT_SCORE: u32 = 100;
pub const GOOD_SCORE: u32 = 50;

/// Maximum alpha value for notes and overlays.
pub const ALPHA_MAX: f64 = 255.0;
