//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (catalog resources, tokens, etc.),
//! update only this file.

// ============================================================================
// Test Catalog Resources
// ============================================================================

/// Weather API resource name
pub const WEATHER_API: &str = "projects/demo/locations/europe-west1/apis/weather";

/// Weather API display name
pub const WEATHER_API_DISPLAY_NAME: &str = "Weather API";

/// Weather API v1, the fully enriched version (deployment + spec)
pub const WEATHER_V1: &str = "projects/demo/locations/europe-west1/apis/weather/versions/v1";

/// Deployment attached to Weather v1
pub const WEATHER_V1_DEPLOYMENT: &str =
    "projects/demo/locations/europe-west1/deployments/weather-prod";

/// Spec attached to Weather v1
pub const WEATHER_V1_SPEC: &str =
    "projects/demo/locations/europe-west1/apis/weather/versions/v1/specs/openapi";

/// Base64 of "openapi: 3.0.0", the way the hub ships spec contents
pub const WEATHER_SPEC_CONTENTS: &str = "b3BlbmFwaTogMy4wLjA=";

/// Payments API resource name
pub const PAYMENTS_API: &str = "projects/demo/locations/europe-west1/apis/payments";

/// Payments API display name
pub const PAYMENTS_API_DISPLAY_NAME: &str = "Payments API";

/// Payments API v1, a bare version with no deployment or spec
pub const PAYMENTS_V1: &str = "projects/demo/locations/europe-west1/apis/payments/versions/v1";

// ============================================================================
// Test Users and Tokens
// ============================================================================

/// Token the fake verifier resolves to `TEST_EMAIL`
pub const VALID_TOKEN: &str = "valid-test-token";

/// Token that verifies but carries no email claim
pub const NO_EMAIL_TOKEN: &str = "no-email-test-token";

/// Email of the pre-seeded portal developer
pub const TEST_EMAIL: &str = "dev@example.com";

/// App the pre-seeded developer already owns
pub const TEST_APP_NAME: &str = "demo-app";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Maximum time to wait for a background catalog refresh to land (milliseconds)
pub const CACHE_SETTLE_TIMEOUT_MS: u64 = 3000;

/// Polling interval when waiting for a catalog refresh (milliseconds)
pub const CACHE_SETTLE_POLL_INTERVAL_MS: u64 = 50;
