use std::collections::BTreeSet;

use serde_json::Value;

const PORT_MARKER: &str = "\"port\":";

/// Pull every port out of the discovery tool's line-oriented JSON output.
///
/// Lines that are not records, lack a port field, or carry a value outside
/// 1-65535 are skipped. The result is sorted ascending with duplicates removed;
/// an empty vector means nothing usable was found.
pub fn extract_ports(raw: &str) -> Vec<u16> {
    let mut ports = BTreeSet::new();

    for line in raw.lines() {
        if !line.contains(PORT_MARKER) {
            continue;
        }

        if let Some(port) = parse_record(line).or_else(|| scan_marker(line)) {
            ports.insert(port);
        }
    }

    ports.into_iter().collect()
}

/// Render ports the way nmap expects them for `-p`.
pub fn join_ports(ports: &[u16], separator: &str) -> String {
    ports
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn parse_record(line: &str) -> Option<u16> {
    let record: Value = serde_json::from_str(line.trim()).ok()?;
    let port = record.get("port")?.as_u64()?;
    valid_port(port)
}

// Fallback for records that are not strict JSON (truncated lines, trailing junk).
fn scan_marker(line: &str) -> Option<u16> {
    let (_, rest) = line.split_once(PORT_MARKER)?;
    let value = rest
        .split(|c: char| c == ',' || c == '}')
        .next()
        .unwrap_or_default()
        .trim();
    let port: u64 = value.parse().ok()?;
    valid_port(port)
}

fn valid_port(port: u64) -> Option<u16> {
    match u16::try_from(port) {
        Ok(0) | Err(_) => None,
        Ok(p) => Some(p),
    }
}
