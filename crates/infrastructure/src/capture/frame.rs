use std::net::Ipv4Addr;

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;
const IP_PROTO_UDP: u8 = 17;
const DNS_PORT: u16 = 53;

/// A frame too short to carry the framing layers it claims. Counted as
/// malformed by the caller; never fatal to the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedFrame;

/// The UDP payload of a demultiplexed frame plus its endpoints.
#[derive(Debug, PartialEq, Eq)]
pub struct UdpDatagram<'a> {
    pub payload: &'a [u8],
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Strip Ethernet, IPv4, and UDP framing from a captured frame, yielding
/// the UDP payload only for traffic with port 53 on either end.
///
/// Framing is carved at fixed offsets: 14-byte Ethernet header (no VLAN
/// tags, no non-Ethernet links), 20-byte IPv4 header (no IP options, no
/// IPv6), 8-byte UDP header. The IP protocol byte sits at offset 9 of
/// the IP segment; anything but UDP (17) is not inspected, including
/// TCP-carried DNS. `Ok(None)` means well-formed but not UDP/53.
pub fn demux(frame: &[u8]) -> Result<Option<UdpDatagram<'_>>, TruncatedFrame> {
    let ip = frame.get(ETHERNET_HEADER_LEN..).ok_or(TruncatedFrame)?;

    let protocol = *ip.get(9).ok_or(TruncatedFrame)?;
    if protocol != IP_PROTO_UDP {
        return Ok(None);
    }

    let src_ip = ipv4_at(ip, 12).ok_or(TruncatedFrame)?;
    let dst_ip = ipv4_at(ip, 16).ok_or(TruncatedFrame)?;

    let udp = ip.get(IPV4_HEADER_LEN..).ok_or(TruncatedFrame)?;
    let src_port = port_at(udp, 0).ok_or(TruncatedFrame)?;
    let dst_port = port_at(udp, 2).ok_or(TruncatedFrame)?;
    if src_port != DNS_PORT && dst_port != DNS_PORT {
        return Ok(None);
    }

    let payload = udp.get(UDP_HEADER_LEN..).ok_or(TruncatedFrame)?;
    Ok(Some(UdpDatagram {
        payload,
        src_ip,
        dst_ip,
        src_port,
        dst_port,
    }))
}

fn ipv4_at(bytes: &[u8], offset: usize) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

fn port_at(bytes: &[u8], offset: usize) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(offset..offset + 2)?.try_into().ok()?;
    Some(u16::from_be_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ethernet + IPv4 + UDP framing around `payload`.
    pub(crate) fn build_udp_frame(
        src_ip: [u8; 4],
        dst_ip: [u8; 4],
        src_port: u16,
        dst_port: u16,
        payload: &[u8],
    ) -> Vec<u8> {
        let mut frame = vec![0u8; ETHERNET_HEADER_LEN];
        frame[12] = 0x08; // ethertype IPv4

        let mut ip = [0u8; IPV4_HEADER_LEN];
        ip[0] = 0x45; // version 4, IHL 5
        ip[9] = IP_PROTO_UDP;
        ip[12..16].copy_from_slice(&src_ip);
        ip[16..20].copy_from_slice(&dst_ip);
        frame.extend_from_slice(&ip);

        let udp_len = (UDP_HEADER_LEN + payload.len()) as u16;
        frame.extend_from_slice(&src_port.to_be_bytes());
        frame.extend_from_slice(&dst_port.to_be_bytes());
        frame.extend_from_slice(&udp_len.to_be_bytes());
        frame.extend_from_slice(&[0, 0]); // checksum unused
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn yields_payload_for_udp_53_source() {
        let frame = build_udp_frame([8, 8, 8, 8], [10, 0, 0, 1], 53, 40000, b"abcd");
        let datagram = demux(&frame).unwrap().unwrap();
        assert_eq!(datagram.payload, b"abcd");
        assert_eq!(datagram.src_ip, Ipv4Addr::new(8, 8, 8, 8));
        assert_eq!(datagram.dst_ip, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(datagram.src_port, 53);
    }

    #[test]
    fn yields_payload_for_udp_53_destination() {
        let frame = build_udp_frame([10, 0, 0, 1], [8, 8, 8, 8], 40000, 53, b"q");
        assert!(demux(&frame).unwrap().is_some());
    }

    #[test]
    fn ignores_other_udp_ports() {
        let frame = build_udp_frame([10, 0, 0, 1], [10, 0, 0, 2], 5000, 6000, b"x");
        assert_eq!(demux(&frame).unwrap(), None);
    }

    #[test]
    fn ignores_non_udp_protocols() {
        let mut frame = build_udp_frame([10, 0, 0, 1], [8, 8, 8, 8], 40000, 53, b"x");
        frame[ETHERNET_HEADER_LEN + 9] = 6; // TCP
        assert_eq!(demux(&frame).unwrap(), None);
    }

    #[test]
    fn truncated_ethernet_is_an_error() {
        assert_eq!(demux(&[0u8; 5]), Err(TruncatedFrame));
    }

    #[test]
    fn truncated_ip_header_is_an_error() {
        // enough for the protocol byte, too short for addresses
        let mut frame = vec![0u8; ETHERNET_HEADER_LEN + 10];
        frame[ETHERNET_HEADER_LEN + 9] = IP_PROTO_UDP;
        assert_eq!(demux(&frame), Err(TruncatedFrame));
    }

    #[test]
    fn udp_53_without_full_header_is_an_error() {
        let full = build_udp_frame([10, 0, 0, 1], [8, 8, 8, 8], 53, 40000, b"");
        // cut inside the UDP header
        let cut = &full[..full.len() - 5];
        assert_eq!(demux(cut), Err(TruncatedFrame));
    }

    #[test]
    fn empty_payload_is_yielded_not_an_error() {
        let frame = build_udp_frame([10, 0, 0, 1], [8, 8, 8, 8], 53, 40000, b"");
        let datagram = demux(&frame).unwrap().unwrap();
        assert!(datagram.payload.is_empty());
    }
}
