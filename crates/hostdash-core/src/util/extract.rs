//! Best-effort extraction from semi-structured tool output.
//!
//! Tools on phones, containers, and desktops disagree on output layout, so
//! these helpers never fail: they return `None` and let the caller move on
//! to the next strategy.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

/// `inet 192.168.1.10` as printed by `ip addr` and `ifconfig`.
pub static IPV4_INET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"inet\s+(?:addr:)?(\d+\.\d+\.\d+\.\d+)").expect("valid regex"));

/// Parses JSON, returning `None` instead of an error on malformed input.
pub fn parse_json_lenient(text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(v) => Some(v),
        Err(e) => {
            trace!(error = %e, "text is not valid JSON");
            None
        }
    }
}

/// Returns capture group `group` of the first match of `pattern` in `text`.
pub fn extract_first_match<'a>(text: &'a str, pattern: &Regex, group: usize) -> Option<&'a str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str())
}

/// Like [`extract_first_match`] on group 1, parsed into `T`.
pub fn extract_parsed<T: FromStr>(text: &str, pattern: &Regex) -> Option<T> {
    extract_first_match(text, pattern, 1).and_then(|s| s.trim().parse().ok())
}

/// First IPv4 address after an `inet` keyword that is not loopback.
pub fn non_loopback_ipv4(text: &str) -> Option<String> {
    IPV4_INET
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|ip| *ip != "127.0.0.1")
        .map(str::to_string)
}

/// Renders a JSON scalar as plain text (strings without quotes).
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_lenient() {
        assert_eq!(
            parse_json_lenient(r#"{"a": 1}"#),
            Some(serde_json::json!({"a": 1}))
        );
        assert_eq!(parse_json_lenient("percentage: 80"), None);
        assert_eq!(parse_json_lenient(""), None);
    }

    #[test]
    fn test_extract_first_match() {
        let re = Regex::new(r"model name\s+:\s+(.*)").unwrap();
        let text = "processor : 0\nmodel name : ARMv8 Processor\n";
        assert_eq!(extract_first_match(text, &re, 1), Some("ARMv8 Processor"));
        assert_eq!(extract_first_match("nothing", &re, 1), None);
        assert_eq!(
            extract_first_match("nothing", &re, 1).unwrap_or("Desconhecido"),
            "Desconhecido"
        );
    }

    #[test]
    fn test_extract_first_match_group_index() {
        let re = Regex::new(r"(\w+)=(\d+)").unwrap();
        assert_eq!(extract_first_match("speed=72", &re, 0), Some("speed=72"));
        assert_eq!(extract_first_match("speed=72", &re, 2), Some("72"));
        assert_eq!(extract_first_match("speed=72", &re, 3), None);
    }

    #[test]
    fn test_extract_parsed() {
        let re = Regex::new(r"percentage.*?(\d+)").unwrap();
        assert_eq!(extract_parsed::<i64>("\"percentage\": 87,", &re), Some(87));
        assert_eq!(extract_parsed::<i64>("no match", &re), None);
    }

    #[test]
    fn test_non_loopback_ipv4() {
        let text = "\
1: lo: <LOOPBACK,UP>
    inet 127.0.0.1/8 scope host lo
2: wlan0: <BROADCAST,UP>
    inet 192.168.0.42/24 brd 192.168.0.255 scope global wlan0
";
        assert_eq!(non_loopback_ipv4(text), Some("192.168.0.42".to_string()));
        assert_eq!(non_loopback_ipv4("inet 127.0.0.1"), None);
        assert_eq!(
            non_loopback_ipv4("inet addr:10.0.0.5  Bcast:10.0.0.255"),
            Some("10.0.0.5".to_string())
        );
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&serde_json::json!("13")), Some("13".into()));
        assert_eq!(value_to_string(&serde_json::json!(33)), Some("33".into()));
        assert_eq!(value_to_string(&serde_json::json!(null)), None);
    }
}
