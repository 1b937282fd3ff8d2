use hyperlane_ton_api::Domain;

/// Gas limit assumed for dispatches whose metadata uses the default variant.
pub const DEFAULT_GAS_LIMIT: u64 = 50_000;
/// Exchange rates are fixed point numbers with ten decimals.
pub const TOKEN_EXCHANGE_RATE_SCALE: u64 = 10_000_000_000;
/// Domain whose gas config applies to destinations without one of their own.
pub const FALLBACK_DOMAIN: Domain = 0;
