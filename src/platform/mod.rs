//! Platform-specific Windows implementations
//!
//! This module encapsulates Win32 API interactions that are not tied to
//! the overlay window itself.

pub mod registry;
pub mod windows;
