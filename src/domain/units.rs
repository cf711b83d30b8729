//! Display helpers for raw chain values

use alloy::primitives::U256;

/// Format a wei amount as ether, keeping at least one fractional digit
/// ("0.0", "1.5", "0.000000000000000001").
pub fn format_ether(wei: U256) -> String {
    format_units(wei, 18)
}

fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let frac = value % divisor;

    let frac_str = format!("{:0>width$}", frac, width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Human name for well-known chain ids
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        1 => "mainnet".to_string(),
        4 => "rinkeby".to_string(),
        5 => "goerli".to_string(),
        11_155_111 => "sepolia".to_string(),
        31_337 => "anvil".to_string(),
        other => format!("chain {other}"),
    }
}

/// Shorten an address or hash for narrow columns
pub fn short_hex(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 12 {
        return value.to_string();
    }
    format!("{}..{}", &value[..6], &value[value.len() - 4..])
}
