// Window size constants
pub const DEFAULT_WINDOW_WIDTH: f32 = 1100.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 700.0;
pub const DEFAULT_WINDOW_TITLE: &str = "Compact Diff";

/// Application name and metadata constants
pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "CompactDiff";
pub const APP_NAME: &str = "Compact Diff";

/// App related Magic Numbers
pub const MAX_RECENT_FILES: usize = 10;
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_RECONCILE_DELAY_MS: u64 = 100;
