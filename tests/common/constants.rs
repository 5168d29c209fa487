//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When fixture data changes (artist ids, genres, ...), update only this file.

// ============================================================================
// Fixture Artist IDs
// ============================================================================

/// Artist tagged "uk drill"
pub const DRILL_ARTIST_ID: &str = "artist-drill";

/// Artist tagged "trap"
pub const TRAP_ARTIST_ID: &str = "artist-trap";

/// Artist tagged "pop"
pub const POP_ARTIST_ID: &str = "artist-pop";

/// Artist tagged "indie rock"
pub const ROCK_ARTIST_ID: &str = "artist-rock";

/// Artist tagged "cool jazz", only reachable through the jazz backfill query
pub const JAZZ_ARTIST_ID: &str = "artist-jazz";

// ============================================================================
// Fixture Release IDs
// ============================================================================

pub const DRILL_RELEASE_ID: &str = "release-drill";
pub const TRAP_RELEASE_ID: &str = "release-trap";
pub const POP_RELEASE_ID: &str = "release-pop";
pub const ROCK_RELEASE_ID: &str = "release-rock";
pub const COMPILATION_RELEASE_ID: &str = "release-compilation";
pub const JAZZ_RELEASE_ID: &str = "release-jazz";

// ============================================================================
// Upstream Credentials
// ============================================================================

pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
