//! Utility modules for hostdash.

mod extract;

pub use extract::{
    IPV4_INET, extract_first_match, extract_parsed, non_loopback_ipv4, parse_json_lenient,
    value_to_string,
};
