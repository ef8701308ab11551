//! Storage key constants.

/// Keys of the persisted session record.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Refresh token
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Logged-in marker, written last
    pub const IS_LOGGED_IN: &'static str = "is_logged_in";

    /// The only value of [`Self::IS_LOGGED_IN`] that counts as logged in.
    pub const LOGGED_IN_SENTINEL: &'static str = "true";

    /// All record keys, in write order.
    pub const RECORD: [&'static str; 3] = [
        Self::ACCESS_TOKEN,
        Self::REFRESH_TOKEN,
        Self::IS_LOGGED_IN,
    ];
}
