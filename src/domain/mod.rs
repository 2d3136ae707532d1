//! Core domain - pure engagement logic with no I/O.

pub mod classify;
pub mod engagement;
pub mod extraction;
pub mod foundation;
pub mod session;
