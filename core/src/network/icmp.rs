//! Raw ICMPv4 echo probe.
//!
//! Opens a layer 4 transport channel, so it needs **root** (or `CAP_NET_RAW`).
//! The socket is blocking and lives on a `spawn_blocking` thread for the
//! duration of one probe.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
};
use switchwatch_common::probe::ReachabilityProbe;
use switchwatch_protocols::icmp;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpProbe;

#[async_trait]
impl ReachabilityProbe for IcmpProbe {
    async fn probe(&self, addr: IpAddr, timeout: Duration) -> anyhow::Result<bool> {
        let IpAddr::V4(target) = addr else {
            anyhow::bail!("raw ICMP probing supports IPv4 only, {addr} is IPv6");
        };
        tokio::task::spawn_blocking(move || echo(target, timeout)).await?
    }
}

fn echo(target: Ipv4Addr, timeout: Duration) -> anyhow::Result<bool> {
    let (mut tx, mut rx) = open_channel()?;
    let identifier: u16 = rand::random();
    let request: Vec<u8> = icmp::create_echo_request(identifier, 0)?;
    let packet: IcmpPacket = IcmpPacket::new(&request).context("wrapping echo request")?;

    tx.send_to(packet, IpAddr::V4(target))
        .with_context(|| format!("sending echo request to {target}"))?;

    let deadline: Instant = Instant::now() + timeout;
    let mut replies = transport::icmp_packet_iter(&mut rx);
    loop {
        let remaining: Duration = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        match replies.next_with_timeout(remaining)? {
            Some((packet, source)) if source == IpAddr::V4(target) => {
                // Other processes' pings arrive on the same raw socket.
                if let Some(reply) = icmp::parse_echo_reply(packet.packet())
                    && reply.identifier == identifier
                {
                    return Ok(true);
                }
            }
            Some(_) => continue,
            None => return Ok(false),
        }
    }
}

fn open_channel() -> anyhow::Result<(TransportSender, TransportReceiver)> {
    let (tx, rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening raw ICMP socket")?;
    Ok((tx, rx))
}
