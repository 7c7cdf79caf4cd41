//! IBM Cloud API interaction module
//!
//! This module provides the core functionality for talking to the IBM Cloud
//! VPC and tagging APIs: authentication, HTTP client, region resolution and
//! the per-region client.
//!
//! # Module Structure
//!
//! - [`auth`] - IAM bearer-token acquisition from an API key
//! - [`client`] - Per-region VPC client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`regions`] - Region listing and lookup

pub mod auth;
pub mod client;
pub mod http;
pub mod regions;
