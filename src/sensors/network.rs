use super::{parse, Chain, CommandRunner, LinkStatus, Source, WIRELESS_PREFIXES};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub fn default_chain(
    net_class_dir: &Path,
    ethernet_iface: &str,
    runner: Arc<dyn CommandRunner>,
) -> Chain<LinkStatus> {
    Chain::new(LinkStatus::default()).then(IpLinkProbe::new(net_class_dir, ethernet_iface, runner))
}

/// Checks each link with `ip addr show`: up and holding an IPv4 address.
pub struct IpLinkProbe {
    net_class_dir: PathBuf,
    ethernet_iface: String,
    runner: Arc<dyn CommandRunner>,
}

impl IpLinkProbe {
    pub fn new(net_class_dir: &Path, ethernet_iface: &str, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            net_class_dir: net_class_dir.to_path_buf(),
            ethernet_iface: ethernet_iface.to_string(),
            runner,
        }
    }

    pub fn interface_connected(&self, iface: &str) -> bool {
        self.runner
            .run("ip", &["addr", "show", iface])
            .map(|output| parse::ip_link_connected(&output))
            .unwrap_or(false)
    }

    /// First wireless-looking entry under the net class directory.
    pub fn wireless_interface(&self) -> Option<String> {
        let entries = fs::read_dir(&self.net_class_dir).ok()?;
        let names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        parse::first_matching_interface(names.iter().map(String::as_str), &WIRELESS_PREFIXES)
    }
}

impl Source<LinkStatus> for IpLinkProbe {
    fn name(&self) -> &str {
        "ip"
    }

    fn read(&self) -> Option<LinkStatus> {
        let ethernet = self.interface_connected(&self.ethernet_iface);
        let wifi = self
            .wireless_interface()
            .map(|iface| self.interface_connected(&iface))
            .unwrap_or(false);
        Some(LinkStatus { wifi, ethernet })
    }
}
