//! Core library for `diskdec`.
//!
//! Contains the credential types and hashing, the credential gate that
//! enforces password policy, the [`controller::VolumeController`] seam, and
//! the VeraCrypt-backed controller that drives the external encryption
//! tool. This crate knows nothing about HTTP.

pub mod controller;
pub mod credential;
pub mod error;
pub mod gate;
pub mod veracrypt;
