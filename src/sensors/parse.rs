//! Text parsers for the diagnostic sources. Each takes raw output and returns
//! `None` when nothing usable matched.

/// `vcgencmd measure_temp` prints `temp=48.3'C`.
pub fn vcgencmd_temperature(output: &str) -> Option<f32> {
    let line = output.lines().next()?;
    let start = line.find("temp=")? + "temp=".len();
    let end = line.find("'C")?;
    if end < start {
        return None;
    }
    line[start..end]
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|celsius| celsius.is_finite())
}

/// hwmon `temp*_input` holds an integer; large values are millidegrees.
pub fn hwmon_temperature(raw: &str) -> Option<f32> {
    let value: i64 = raw.split_whitespace().next()?.parse().ok()?;
    if value > 1000 {
        Some(value as f32 / 1000.0)
    } else {
        Some(value as f32)
    }
}

/// First `temp1_input` or `Core 0` line of `sensors -u`, number after the colon.
pub fn lm_sensors_temperature(output: &str) -> Option<f32> {
    let line = output
        .lines()
        .find(|line| line.contains("temp1_input") || line.contains("Core 0"))?;
    let (_, value) = line.split_once(':')?;
    leading_number(value)
}

/// `(MemTotal, MemAvailable)` from a meminfo listing.
pub fn meminfo_totals(raw: &str) -> Option<(i64, i64)> {
    let mut total = None;
    let mut available = None;
    for line in raw.lines() {
        if line.starts_with("MemTotal:") {
            total = second_field(line);
        } else if line.starts_with("MemAvailable:") {
            available = second_field(line);
        }
    }
    Some((total?, available?))
}

/// Percentage of memory in use; `None` when total is not positive.
pub fn memory_usage_percent(total: i64, available: i64) -> Option<f32> {
    if total <= 0 {
        return None;
    }
    Some(100.0 * (total - available) as f32 / total as f32)
}

/// `Use%` column of the last line of `df <mount>`.
pub fn df_use_percent(output: &str) -> Option<u8> {
    let line = output.lines().rev().find(|line| !line.trim().is_empty())?;
    let field = line.split_whitespace().nth(4)?;
    field.trim_end_matches('%').parse().ok()
}

/// `ip addr show <iface>` reports the link administratively up with an IPv4 address.
pub fn ip_link_connected(output: &str) -> bool {
    output.contains("state UP") && output.contains("inet ")
}

/// First name (in sorted order) that starts with one of `prefixes`.
pub fn first_matching_interface<'a, I>(names: I, prefixes: &[&str]) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matching: Vec<&str> = names
        .into_iter()
        .filter(|name| prefixes.iter().any(|prefix| name.starts_with(prefix)))
        .collect();
    matching.sort_unstable();
    matching.first().map(|name| name.to_string())
}

fn second_field(line: &str) -> Option<i64> {
    line.split_whitespace().nth(1)?.parse().ok()
}

// Accepts `+45.0°C`, ` 45.000`, `-3`: sign, digits and one decimal point.
fn leading_number(raw: &str) -> Option<f32> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(idx, c)| {
            !(c.is_ascii_digit() || c == '.' || (idx == 0 && (c == '+' || c == '-')))
        })
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());
    trimmed[..end]
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcgencmd_output() {
        assert_eq!(vcgencmd_temperature("temp=48.3'C\n"), Some(48.3));
        assert_eq!(vcgencmd_temperature("temp=61.0'C"), Some(61.0));
        assert_eq!(vcgencmd_temperature("error=1 error_msg=\"nope\""), None);
        assert_eq!(vcgencmd_temperature("temp=abc'C"), None);
        assert_eq!(vcgencmd_temperature(""), None);
    }

    #[test]
    fn non_finite_temperatures_are_rejected() {
        assert_eq!(vcgencmd_temperature("temp=nan'C"), None);
        assert_eq!(vcgencmd_temperature("temp=inf'C"), None);
        assert_eq!(vcgencmd_temperature("temp=-infinity'C"), None);
        let huge = format!("  temp1_input: {}.0\n", "9".repeat(45));
        assert_eq!(lm_sensors_temperature(&huge), None);
    }

    #[test]
    fn hwmon_millidegrees_and_degrees() {
        assert_eq!(hwmon_temperature("45123\n"), Some(45.123));
        assert_eq!(hwmon_temperature("1000"), Some(1000.0));
        assert_eq!(hwmon_temperature("42"), Some(42.0));
        assert_eq!(hwmon_temperature("garbage"), None);
        assert_eq!(hwmon_temperature(""), None);
    }

    #[test]
    fn lm_sensors_first_match_only() {
        let raw = "cpu_thermal-virtual-0\nAdapter: Virtual device\ntemp1:\n  temp1_input: 47.250\n  temp1_crit: 110.000\n";
        assert_eq!(lm_sensors_temperature(raw), Some(47.25));

        let coretemp = "Core 0:        +45.0°C  (high = +80.0°C)\n";
        assert_eq!(lm_sensors_temperature(coretemp), Some(45.0));

        // `-u` puts the Core 0 header on its own line with nothing after the colon.
        let header_first = "Core 0:\n  temp2_input: 44.000\n  temp1_input: 30.0\n";
        assert_eq!(lm_sensors_temperature(header_first), None);

        assert_eq!(lm_sensors_temperature("fan1: 1200 RPM\n"), None);
    }

    #[test]
    fn meminfo_requires_both_keys() {
        let raw = "MemTotal:        1000 kB\nMemFree:          100 kB\nMemAvailable:     250 kB\n";
        assert_eq!(meminfo_totals(raw), Some((1000, 250)));
        assert_eq!(meminfo_totals("MemTotal: 1000 kB\n"), None);
        assert_eq!(meminfo_totals(""), None);
    }

    #[test]
    fn memory_percent() {
        assert_eq!(memory_usage_percent(1000, 250), Some(75.0));
        assert_eq!(memory_usage_percent(0, 0), None);
        assert_eq!(memory_usage_percent(-5, 0), None);
    }

    #[test]
    fn df_output() {
        let raw = "Filesystem     1K-blocks    Used Available Use% Mounted on\n/dev/root       14892324 5712308   8542676  41% /\n";
        assert_eq!(df_use_percent(raw), Some(41));
        assert_eq!(df_use_percent("Filesystem 1K-blocks\n"), None);
        assert_eq!(df_use_percent(""), None);
    }

    #[test]
    fn ip_addr_needs_up_and_address() {
        let up = "2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc mq state UP group default qlen 1000\n    inet 192.168.1.20/24 brd 192.168.1.255 scope global eth0\n";
        assert!(ip_link_connected(up));
        let no_addr = "2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP\n    inet6 fe80::1/64 scope link\n";
        assert!(!ip_link_connected(no_addr));
        let down = "3: wlan0: <BROADCAST,MULTICAST> mtu 1500 state DOWN\n    inet 10.0.0.2/24\n";
        assert!(!ip_link_connected(down));
    }

    #[test]
    fn wireless_interface_discovery() {
        let prefixes = ["wlan", "wlp", "wifi"];
        let names = ["lo", "wlp2s0", "eth0", "wlan0"];
        assert_eq!(
            first_matching_interface(names, &prefixes),
            Some("wlan0".to_string())
        );
        assert_eq!(first_matching_interface(["lo", "eth0"], &prefixes), None);
    }
}
