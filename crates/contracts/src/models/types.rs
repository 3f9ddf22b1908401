use std::borrow::Cow;

/// Venue identifier as understood by the gateway ("SMART", "CBOE", ...)
pub type Venue = Cow<'static, str>;

/// Currency code (ISO 4217) - fixed to USD for every descriptor we build
pub type Currency = Cow<'static, str>;

/// The only currency contracts are qualified in.
pub const CONTRACT_CURRENCY: &str = "USD";

/// Smart-routing venue used when a symbol has no explicit venue preferences.
pub const DEFAULT_VENUE: &str = "SMART";
