//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, upload sizes, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Username of the user registered by `TestClient::registered()`
pub const TEST_USER: &str = "testuser";

/// Password satisfying the password policy
pub const TEST_PASS: &str = "testpass1!";

/// First name of the registered test user
pub const TEST_FIRST_NAME: &str = "Tester";

// ============================================================================
// Test Songs
// ============================================================================

/// Remote video id used across playlist tests
pub const VIDEO_1_ID: &str = "dQw4w9WgXcQ";

/// A second remote video id
pub const VIDEO_2_ID: &str = "9bZkp7q19f0";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Upload limit of servers spawned with `TestServer::spawn_with_upload_limit()`
pub const SMALL_UPLOAD_LIMIT_BYTES: u64 = 1024;
