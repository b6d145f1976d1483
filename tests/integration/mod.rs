//! Integration tests module
//!
//! This module organizes all integration tests for the lectio-player application.

// Import individual test modules
pub mod config_test;
pub mod guide_test;
pub mod playlist_test;
