use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};

pub const ICMP_ECHO_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8] = b"switchwatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub identifier: u16,
    pub sequence: u16,
}

/// Builds an ICMPv4 echo request (type 8) with a valid checksum.
pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    {
        let mut echo: MutableEchoRequestPacket =
            MutableEchoRequestPacket::new(&mut buffer).context("creating echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(ECHO_PAYLOAD);
        echo.set_checksum(0);
    }

    let csm: u16 = {
        let packet: IcmpPacket = IcmpPacket::new(&buffer).context("reading echo request")?;
        icmp::checksum(&packet)
    };
    MutableEchoRequestPacket::new(&mut buffer)
        .context("finalizing echo request")?
        .set_checksum(csm);

    Ok(buffer)
}

/// Returns the identifier and sequence of an echo reply, `None` for any other
/// ICMP message or a truncated packet.
pub fn parse_echo_reply(bytes: &[u8]) -> Option<EchoReply> {
    let packet: IcmpPacket = IcmpPacket::new(bytes)?;
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return None;
    }
    let reply: EchoReplyPacket = EchoReplyPacket::new(packet.packet())?;
    Some(EchoReply {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
    })
}
