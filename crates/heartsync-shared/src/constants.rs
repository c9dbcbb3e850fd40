/// Application name
pub const APP_NAME: &str = "HeartSync";

/// Length of the short, human-shareable pairing code
pub const PAIRING_CODE_LENGTH: usize = 6;

/// Alphabet pairing codes are drawn from
pub const PAIRING_CODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// How many fresh codes sign-up tries before giving up on uniqueness
pub const MAX_PAIRING_CODE_ATTEMPTS: usize = 16;

/// Separator between the two sorted user ids of a room id
pub const ROOM_ID_SEPARATOR: char = '-';

/// Default countdown refresh interval in milliseconds
pub const COUNTDOWN_TICK_MS: u64 = 1_000;

/// Preset event colours offered by the editor; the first one is the default
pub const PRESET_COLORS: [&str; 6] = [
    "#F472B6", "#A78BFA", "#60A5FA", "#34D399", "#FBBF24", "#F87171",
];

/// Colour used when an event record carries none
pub const FALLBACK_COLOR: &str = "#A1A1AA";

/// Minimum password length accepted by the auth provider
pub const MIN_PASSWORD_LENGTH: usize = 6;
