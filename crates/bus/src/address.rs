use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Port the server listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 16384;

/// Returns the host's primary address, falling back to loopback.
///
/// Connecting a UDP socket sends no packets; it only asks the OS which local
/// interface would route outward.
pub fn primary_address() -> IpAddr {
	let routed = || -> std::io::Result<IpAddr> {
		let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
		socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1))?;
		Ok(socket.local_addr()?.ip())
	};
	match routed() {
		Ok(ip) if !ip.is_unspecified() => ip,
		Ok(_) | Err(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
	}
}
