//! End-to-end tests for BoxClub
//!
//! The tests under `tests/` drive the full server router with a `Host`
//! header and a wiremock backend standing in for the tenant API.
