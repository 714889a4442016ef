//! Ledger entities: accounts, assets, applications, and the world state.

pub mod account;
pub mod app;
pub mod asset;
pub mod world;

/// Minimum balance every account must keep, in micro-units.
pub const BASE_MIN_BALANCE: u64 = 10_000;

/// Additional minimum balance per opted-in asset.
pub const ASSET_MIN_BALANCE: u64 = 10_000;

/// Additional minimum balance per created or opted-in application.
pub const APP_MIN_BALANCE: u64 = 10_000;

/// Additional minimum balance per uint slot in an application schema.
pub const SCHEMA_UINT_MIN_BALANCE: u64 = 2_500;

/// Additional minimum balance per byte-slice slot in an application schema.
pub const SCHEMA_BYTES_MIN_BALANCE: u64 = 5_000;

/// Most applications one account may create.
pub const MAX_CREATED_APPS: usize = 10;

/// Most applications one account may be opted in to.
pub const MAX_OPTED_APPS: usize = 10;

/// Most assets one account may create.
pub const MAX_CREATED_ASSETS: usize = 1000;

/// Longest allowed application state key, in bytes.
pub const MAX_KEY_LEN: usize = 64;
