/// Run configuration layered from defaults, TOML file and environment
pub mod config;

/// Plain text and JSON rendering of computed statistics
pub mod formatter;

/// GitHub request gateway, transports and query definitions
pub mod github;

/// Repository collection, contribution totals, lines changed, views and the stats facade
pub mod services;

/// Core type definitions and domain models used throughout the library
pub mod types;
