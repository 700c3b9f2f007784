//! Integration tests for LyngSat Wayback
//!
//! These tests use wiremock to stand in for the web archive and drive the
//! crawler, the fetch gateway and the archive index over real HTTP.

mod archive_tests;
mod common;
mod crawl_tests;
mod gateway_tests;
