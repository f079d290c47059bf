//! Middleware-specific tests for FluentRouter
//!
//! Tests are organized by middleware in separate modules.
//! The `interactions` module tests the layers working together.

mod forwarded_for;
mod interactions;
mod trailing_slash;
