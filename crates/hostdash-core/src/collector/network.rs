//! Addresses, interface counters, sockets, and WiFi.

use std::io;
use std::net::UdpSocket;

use super::cached::{Collect, CollectError};
use super::command::CommandRunner;
use super::fallback::{FallbackChain, ProbeResult};
use super::host::Host;
use super::parser::{
    parse_connection_counts, parse_hostname_i, parse_ifconfig_block, parse_interface_ip,
    parse_net_dev, parse_termux_wifi, parse_termux_wifi_ip, split_ifconfig_blocks,
};
use super::traits::FileSystem;
use crate::fmt::{UNKNOWN, format_bytes, iso_timestamp};
use crate::model::{ConnectionCounts, InterfaceInfo, NetworkInfo, WifiInfo};
use crate::util::non_loopback_ipv4;

/// Returns the local address the OS would route outbound traffic from.
pub type SocketProbe = fn() -> io::Result<String>;

/// Connects a UDP socket to a public address; nothing is sent.
pub fn udp_route_ip() -> io::Result<String> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip().to_string())
}

fn is_loopback(ip: &str) -> bool {
    ip == "127.0.0.1" || ip == "localhost"
}

pub struct NetworkCollector<F, R> {
    host: Host<F, R>,
    socket_probe: SocketProbe,
}

impl<F: FileSystem, R: CommandRunner> NetworkCollector<F, R> {
    pub fn new(host: Host<F, R>) -> Self {
        Self {
            host,
            socket_probe: udp_route_ip,
        }
    }

    /// Replaces the socket-based address probe.
    pub fn with_socket_probe(mut self, probe: SocketProbe) -> Self {
        self.socket_probe = probe;
        self
    }

    fn primary_ip(&self) -> String {
        FallbackChain::new("network.ip")
            .step("socket", || Ok(Some((self.socket_probe)()?)))
            .step("hostname -I", || Ok(parse_hostname_i(&self.host.run("hostname -I")?)))
            .step("ifconfig", || Ok(non_loopback_ipv4(&self.host.run("ifconfig")?)))
            .step("ip addr", || Ok(non_loopback_ipv4(&self.host.run("ip addr")?)))
            .step("termux-wifi-connectioninfo", || {
                Ok(parse_termux_wifi_ip(
                    &self.host.run("termux-wifi-connectioninfo")?,
                ))
            })
            .run_accepting(|ip| !is_loopback(ip))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn interface_ip(&self, name: &str) -> Option<String> {
        let output = self.host.run_argv(&["ip", "addr", "show", name]).ok()?;
        parse_interface_ip(&output)
    }

    /// `/proc/net/dev` is authoritative when readable, even if it only
    /// lists loopback.
    fn interfaces_from_proc(&self) -> ProbeResult<Vec<InterfaceInfo>> {
        let content = self.host.read("/proc/net/dev")?;
        let interfaces = parse_net_dev(&content)
            .into_iter()
            .filter(|row| row.name != "lo")
            .map(|row| InterfaceInfo {
                ip: self.interface_ip(&row.name),
                rx_bytes: Some(format_bytes(row.rx_bytes)),
                tx_bytes: Some(format_bytes(row.tx_bytes)),
                rx_packets: Some(row.rx_packets),
                tx_packets: Some(row.tx_packets),
                name: row.name,
            })
            .collect();
        Ok(Some(interfaces))
    }

    fn interfaces_from_ifconfig(&self) -> ProbeResult<Vec<InterfaceInfo>> {
        let output = self.host.run("ifconfig")?;
        let interfaces = split_ifconfig_blocks(&output)
            .iter()
            .filter_map(|block| parse_ifconfig_block(block))
            .filter(|iface| iface.name != "lo")
            .collect();
        Ok(Some(interfaces))
    }

    fn interfaces(&self) -> Vec<InterfaceInfo> {
        FallbackChain::new("network.interfaces")
            .step("/proc/net/dev", || self.interfaces_from_proc())
            .step("ifconfig", || self.interfaces_from_ifconfig())
            .run()
            .unwrap_or_default()
    }

    fn connections(&self) -> ConnectionCounts {
        let counts = |command: &'static str, established: &'static str| {
            move || -> ProbeResult<ConnectionCounts> {
                let output = self.host.run(command)?;
                if output.is_empty() {
                    return Ok(None);
                }
                Ok(Some(parse_connection_counts(&output, established)))
            }
        };
        FallbackChain::new("network.connections")
            .step("netstat", counts("netstat -tuln", "ESTABLISHED"))
            .step("ss", counts("ss -tuln", "ESTAB"))
            .run()
            .unwrap_or_default()
    }

    fn wifi(&self) -> Option<WifiInfo> {
        FallbackChain::new("network.wifi")
            .step("termux-wifi-connectioninfo", || {
                Ok(parse_termux_wifi(
                    &self.host.run("termux-wifi-connectioninfo")?,
                ))
            })
            .run()
    }
}

impl<F: FileSystem, R: CommandRunner> Collect for NetworkCollector<F, R> {
    type Output = NetworkInfo;
    const NAME: &'static str = "network";

    fn collect_data(&mut self) -> Result<NetworkInfo, CollectError> {
        Ok(NetworkInfo {
            timestamp: iso_timestamp(),
            ip: self.primary_ip(),
            interfaces: self.interfaces(),
            connections: self.connections(),
            wifi: self.wifi(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MockFs, MockRunner};

    fn loopback_socket() -> io::Result<String> {
        Ok("127.0.0.1".to_string())
    }

    fn unreachable_socket() -> io::Result<String> {
        Err(io::Error::from(io::ErrorKind::NetworkUnreachable))
    }

    fn lan_socket() -> io::Result<String> {
        Ok("10.1.2.3".to_string())
    }

    fn collector(fs: MockFs, runner: MockRunner, probe: SocketProbe) -> NetworkCollector<MockFs, MockRunner> {
        NetworkCollector::new(Host::new(fs, runner)).with_socket_probe(probe)
    }

    #[test]
    fn test_socket_address_wins() {
        let runner = MockRunner::new().with_output("hostname -I", "192.168.1.20");
        let c = collector(MockFs::new(), runner.clone(), lan_socket);
        assert_eq!(c.primary_ip(), "10.1.2.3");
        assert_eq!(runner.calls("hostname -I"), 0);
    }

    #[test]
    fn test_loopback_result_skipped_for_next_step() {
        let runner = MockRunner::new().with_output("hostname -I", "192.168.1.20 172.17.0.1");
        let c = collector(MockFs::new(), runner, loopback_socket);
        assert_eq!(c.primary_ip(), "192.168.1.20");
    }

    #[test]
    fn test_ip_addr_and_termux_fallbacks() {
        let runner = MockRunner::new()
            .with_output("hostname -I", "localhost")
            .with_output("ifconfig", "lo: flags=73\n        inet 127.0.0.1  netmask 255.0.0.0")
            .with_output(
                "ip addr",
                "1: lo\n    inet 127.0.0.1/8\n2: wlan0\n    inet 192.168.0.42/24",
            );
        let c = collector(MockFs::new(), runner, unreachable_socket);
        assert_eq!(c.primary_ip(), "192.168.0.42");

        let termux = MockRunner::new()
            .with_output("termux-wifi-connectioninfo", r#"{"ip": "192.168.0.77"}"#);
        let c = collector(MockFs::new(), termux, unreachable_socket);
        assert_eq!(c.primary_ip(), "192.168.0.77");
    }

    #[test]
    fn test_ip_unknown_when_all_fail() {
        let c = collector(MockFs::new(), MockRunner::new(), loopback_socket);
        assert_eq!(c.primary_ip(), UNKNOWN);
    }

    #[test]
    fn test_interfaces_from_proc_net_dev() {
        let fs = MockFs::new().with_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:    2048      10    0    0    0     0          0         0     2048      10    0    0    0     0       0          0
  eth0: 1048576    1500    0    0    0     0          0         0   524288      900    0    0    0     0       0          0
",
        );
        let runner = MockRunner::new().with_output(
            "ip addr show eth0",
            "2: eth0: <UP>\n    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0",
        );
        let c = collector(fs, runner.clone(), lan_socket);

        let ifaces = c.interfaces();
        assert_eq!(ifaces.len(), 1);
        assert_eq!(ifaces[0].name, "eth0");
        assert_eq!(ifaces[0].rx_bytes.as_deref(), Some("1.00 MB"));
        assert_eq!(ifaces[0].tx_bytes.as_deref(), Some("512.00 KB"));
        assert_eq!(ifaces[0].rx_packets, Some(1500));
        assert_eq!(ifaces[0].ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(runner.calls("ifconfig"), 0);
    }

    #[test]
    fn test_interfaces_from_ifconfig() {
        let runner = MockRunner::new().with_output(
            "ifconfig",
            "\
lo: flags=73<UP,LOOPBACK,RUNNING>  mtu 65536
        inet 127.0.0.1  netmask 255.0.0.0
wlan0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500
        inet 192.168.0.42  netmask 255.255.255.0
        RX packets 10  bytes 2048 (2.0 KiB)
        TX packets 5  bytes 1024 (1.0 KiB)
",
        );
        let c = collector(MockFs::new(), runner, lan_socket);

        let ifaces = c.interfaces();
        assert_eq!(ifaces.len(), 1);
        assert_eq!(ifaces[0].name, "wlan0");
        assert_eq!(ifaces[0].ip.as_deref(), Some("192.168.0.42"));
        assert_eq!(ifaces[0].rx_bytes.as_deref(), Some("2.00 KB"));
    }

    #[test]
    fn test_connections_fall_back_to_ss() {
        let runner = MockRunner::new().with_output(
            "ss -tuln",
            "Netid State Recv-Q Send-Q\ntcp LISTEN 0 128\nudp UNCONN 0 0\ntcp ESTAB 0 0",
        );
        let c = collector(MockFs::new(), runner, lan_socket);

        let counts = c.connections();
        assert_eq!(counts.tcp, 2);
        assert_eq!(counts.udp, 1);
        assert_eq!(counts.count, 3);
        assert_eq!(counts.listening, 1);
        assert_eq!(counts.established, 1);
    }

    #[test]
    fn test_collect_without_wifi_omits_key() {
        let mut c = collector(MockFs::new(), MockRunner::new(), lan_socket);
        let info = c.collect_data().unwrap();

        assert_eq!(info.ip, "10.1.2.3");
        assert!(info.interfaces.is_empty());
        assert_eq!(info.connections, ConnectionCounts::default());

        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("wifi").is_none());
        assert_eq!(json["connections"]["count"], 0);
    }
}
