//! Packet construction and parsing, free of any socket handling.

pub mod icmp;
