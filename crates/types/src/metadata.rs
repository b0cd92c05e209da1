//! Token metadata keys.

/// Display name of the token.
pub const TOKEN_NAME: &str = "token_name";
/// Ticker symbol.
pub const TOKEN_SYMBOL: &str = "token_symbol";
pub const TOKEN_LOGO_URL: &str = "token_logo_url";
pub const TOKEN_WEBSITE: &str = "token_website";
/// Address allowed to run administrative operations.
pub const OPERATOR: &str = "operator";

/// Fields every conforming token must publish.
pub const REQUIRED_METADATA_KEYS: [&str; 5] =
    [TOKEN_NAME, TOKEN_SYMBOL, TOKEN_LOGO_URL, TOKEN_WEBSITE, OPERATOR];

pub const DEFAULT_TOKEN_NAME: &str = "REFLECT TOKEN";
pub const DEFAULT_TOKEN_SYMBOL: &str = "RFT";
