//! Ansible dynamic inventory for IBM Cloud VPC.
//!
//! Enumerates virtual server instances and bare metal servers in one or all
//! regions, enriches each with network, resource-group and tag metadata, and
//! renders the result as an Ansible inventory JSON document.

pub mod config;
pub mod ibm;
pub mod inventory;
