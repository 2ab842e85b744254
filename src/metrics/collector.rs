//! Kernel counter table reading.
//!
//! Both tables are read whole every tick. A line that does not carry the
//! expected number of numeric fields is skipped; only failing to read the
//! file itself is an error.

use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use crate::metrics::data::{DiskCounters, InterfaceCounters};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Fields per block-device line: major, minor, name and eleven counters.
pub const DISKSTATS_MIN_FIELDS: usize = 14;

/// Numeric fields after the `name:` column of a network-interface line.
pub const NET_DEV_COUNTER_FIELDS: usize = 16;

/// Header lines at the top of the network-interface table.
const NET_DEV_HEADER_LINES: usize = 2;

/// Reads the block-device and network-interface counter tables.
#[derive(Debug, Clone)]
pub struct CounterSampler {
    diskstats_path: PathBuf,
    net_dev_path: PathBuf,
    watched_disks: Vec<String>,
    loopback_prefix: String,
}

impl CounterSampler {
    /// Create a sampler for the configured sources and watch list.
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            diskstats_path: config.diskstats_path.clone(),
            net_dev_path: config.net_dev_path.clone(),
            watched_disks: config.watched_disks.clone(),
            loopback_prefix: config.loopback_prefix.clone(),
        }
    }

    /// Counters for watched disks present in the block-device table.
    pub fn read_disks(&self) -> Result<Vec<DiskCounters>> {
        let content = read_source(&self.diskstats_path)?;
        Ok(parse_diskstats(&content)
            .into_iter()
            .filter(|c| self.watched_disks.iter().any(|w| *w == c.device))
            .collect())
    }

    /// Counters for every non-loopback interface, in table order.
    pub fn read_interfaces(&self) -> Result<Vec<InterfaceCounters>> {
        let content = read_source(&self.net_dev_path)?;
        Ok(parse_net_dev(&content, &self.loopback_prefix))
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| DaemonError::counter_source(path, e))
}

/// Parse the block-device table.
///
/// Format (first fourteen columns, newer kernels append more):
/// ```text
/// major minor name rd_ios rd_merges rd_sectors rd_ticks
///     wr_ios wr_merges wr_sectors wr_ticks in_flight io_ticks time_in_queue
/// ```
pub fn parse_diskstats(content: &str) -> Vec<DiskCounters> {
    content.lines().filter_map(parse_diskstats_line).collect()
}

fn parse_diskstats_line(line: &str) -> Option<DiskCounters> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < DISKSTATS_MIN_FIELDS {
        trace!("short diskstats line skipped: {:?}", line);
        return None;
    }

    parts[0].parse::<u32>().ok()?;
    parts[1].parse::<u32>().ok()?;

    let counters = parse_counters(&parts[3..DISKSTATS_MIN_FIELDS])?;

    Some(DiskCounters {
        device: parts[2].to_string(),
        sectors_read: counters[2],
        sectors_written: counters[6],
        io_time_ms: counters[9],
    })
}

/// Parse the network-interface table, dropping interfaces whose name starts
/// with `loopback_prefix`.
///
/// Format, after two header lines:
/// ```text
///   eth0: rx_bytes rx_packets rx_errs rx_drop rx_fifo rx_frame rx_compressed rx_multicast
///         tx_bytes tx_packets ...
/// ```
pub fn parse_net_dev(content: &str, loopback_prefix: &str) -> Vec<InterfaceCounters> {
    content
        .lines()
        .skip(NET_DEV_HEADER_LINES)
        .filter_map(parse_net_dev_line)
        .filter(|c| !c.interface.starts_with(loopback_prefix))
        .collect()
}

fn parse_net_dev_line(line: &str) -> Option<InterfaceCounters> {
    let (name, rest) = line.split_once(':')?;
    let interface = name.trim();
    if interface.is_empty() {
        return None;
    }

    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < NET_DEV_COUNTER_FIELDS {
        trace!("short net/dev line skipped: {:?}", line);
        return None;
    }
    let counters = parse_counters(&parts[..NET_DEV_COUNTER_FIELDS])?;

    Some(InterfaceCounters {
        interface: interface.to_string(),
        rx_bytes: counters[0],
        tx_bytes: counters[8],
    })
}

fn parse_counters(fields: &[&str]) -> Option<Vec<u64>> {
    fields.iter().map(|f| f.parse::<u64>().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS: &str = "\
   8       0 sda 1200 30 96000 4000 800 20 64000 3000 0 5000 7000
   8       1 sda1 1100 30 95000 3900 790 20 63000 2900 0 4900 6800
 259       0 nvme0n1 500 0 40000 100 900 0 72000 200 0 300 300 0 0 0 0 0 0
   7       0 loop0 10 0 80 1 0 0 0 0 0 1 1
   8      16 sdb 12 0 96
garbage line
";

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  5000      50    0    0    0     0          0         0     5000      50    0    0    0     0       0          0
  eth0: 120000    900    0    0    0     0          0        10    80000     700    0    0    0     0       0          0
 wlan0:1000 10 0 0 0 0 0 0 2000 20 0 0 0 0 0 0
  bad0: 1 2 3
";

    #[test]
    fn test_parse_diskstats_extracts_counters() {
        let disks = parse_diskstats(DISKSTATS);
        let names: Vec<&str> = disks.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, vec!["sda", "sda1", "nvme0n1", "loop0"]);

        let sda = &disks[0];
        assert_eq!(sda.sectors_read, 96000);
        assert_eq!(sda.sectors_written, 64000);
        assert_eq!(sda.io_time_ms, 5000);

        let nvme = &disks[2];
        assert_eq!(nvme.sectors_written, 72000);
        assert_eq!(nvme.io_time_ms, 300);
    }

    #[test]
    fn test_parse_diskstats_skips_non_numeric_counters() {
        let disks = parse_diskstats("8 0 sda 1 2 x 4 5 6 7 8 9 10 11\n");
        assert!(disks.is_empty());
    }

    #[test]
    fn test_parse_net_dev_skips_headers_and_loopback() {
        let ifaces = parse_net_dev(NET_DEV, "lo");
        assert_eq!(ifaces.len(), 2);

        assert_eq!(ifaces[0].interface, "eth0");
        assert_eq!(ifaces[0].rx_bytes, 120000);
        assert_eq!(ifaces[0].tx_bytes, 80000);

        // No space after the colon.
        assert_eq!(ifaces[1].interface, "wlan0");
        assert_eq!(ifaces[1].rx_bytes, 1000);
        assert_eq!(ifaces[1].tx_bytes, 2000);
    }

    #[test]
    fn test_sampler_filters_watch_list() {
        let dir = tempfile::tempdir().unwrap();
        let diskstats = dir.path().join("diskstats");
        let net_dev = dir.path().join("net_dev");
        fs::write(&diskstats, DISKSTATS).unwrap();
        fs::write(&net_dev, NET_DEV).unwrap();

        let config = DaemonConfig::default().with_sources(&diskstats, &net_dev);
        let sampler = CounterSampler::new(&config);

        let disks = sampler.read_disks().unwrap();
        let names: Vec<&str> = disks.iter().map(|d| d.device.as_str()).collect();
        assert_eq!(names, vec!["sda", "nvme0n1"]);

        assert_eq!(sampler.read_interfaces().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaemonConfig::default()
            .with_sources(dir.path().join("nope"), dir.path().join("nope_either"));
        let sampler = CounterSampler::new(&config);

        assert!(matches!(
            sampler.read_disks(),
            Err(DaemonError::CounterSource { .. })
        ));
        assert!(sampler.read_interfaces().is_err());
    }
}
