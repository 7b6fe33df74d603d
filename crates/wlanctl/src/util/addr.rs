//! MAC address and hex key parsing and formatting.

/// Error type for address and key parsing.
#[derive(Debug, thiserror::Error)]
pub enum AddrError {
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid channel list: {0}")]
    InvalidChannelList(String),
}

pub type Result<T> = std::result::Result<T, AddrError>;

/// Parse a MAC address from string.
///
/// Accepts the colon-separated form (`aa:bb:cc:dd:ee:ff`) as well as
/// dashes as separators.
pub fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = s.split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(AddrError::InvalidMac(s.to_string()));
    }

    let mut mac = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || part.len() > 2 {
            return Err(AddrError::InvalidMac(s.to_string()));
        }
        mac[i] = u8::from_str_radix(part, 16).map_err(|_| AddrError::InvalidMac(s.to_string()))?;
    }

    Ok(mac)
}

/// Format a MAC address.
pub fn format_mac(bytes: &[u8]) -> String {
    if bytes.len() >= 6 {
        format!(
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    } else {
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Parse a hex string (optionally prefixed with `0x`) into bytes.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(AddrError::InvalidHex(s.to_string()));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| AddrError::InvalidHex(s.to_string()))
        })
        .collect()
}

/// Format bytes as a lowercase hex string.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mac() {
        let mac = parse_mac("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(mac, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

        let mac = parse_mac("00-11-22-33-44-55").unwrap();
        assert_eq!(mac, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn test_parse_mac_invalid() {
        assert!(parse_mac("aa:bb:cc:dd:ee").is_err());
        assert!(parse_mac("aa:bb:cc:dd:ee:gg").is_err());
        assert!(parse_mac("aaa:bb:cc:dd:ee:ff").is_err());
        assert!(parse_mac("").is_err());
    }

    #[test]
    fn test_format_mac() {
        assert_eq!(
            format_mac(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            "aa:bb:cc:dd:ee:ff"
        );
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0a0b0c").unwrap(), vec![0x0a, 0x0b, 0x0c]);
        assert_eq!(parse_hex("0xff00").unwrap(), vec![0xff, 0x00]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert_eq!(format_hex(&[0xde, 0xad]), "dead");
    }
}
