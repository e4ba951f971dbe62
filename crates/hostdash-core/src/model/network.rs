use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub timestamp: String,
    /// Primary non-loopback IPv4 address, or `"Desconhecido"`.
    pub ip: String,
    pub interfaces: Vec<InterfaceInfo>,
    pub connections: ConnectionCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiInfo>,
}

/// One network interface. The `ifconfig` fallback may leave counters unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rx_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_packets: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Socket counts from `netstat`/`ss`; `count` is `tcp + udp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionCounts {
    pub count: usize,
    pub tcp: usize,
    pub udp: usize,
    pub listening: usize,
    pub established: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WifiInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bssid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i64>,
    /// e.g. `"72 Mbps"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_speed: Option<String>,
}

impl WifiInfo {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
