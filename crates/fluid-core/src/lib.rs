#![forbid(unsafe_code)]

//! Core primitives for the fluid presentation framework.
//!
//! This crate holds the pieces every other `fluid-*` crate builds on:
//! continuous-coordinate geometry, spring timing parameters matching the
//! animation boundary of the host toolkit, a tick-driven one-shot
//! animator, and pan-gesture value types.
//!
//! Nothing in here touches a clock or a render surface; callers drive all
//! time via explicit `tick(delta)` calls.

pub mod animation;
pub mod geometry;
pub mod gesture;
pub mod spring;
