//! Startup banner: device address and start time.
//!
//! ```text
//! Current IP (time started):
//!     192.168.1.40
//!     2026-10-16 08:12:03
//! ```

use std::net::IpAddr;

use chrono::{DateTime, Local, TimeZone};
use log::info;

use crate::app::ports::{BannerSink, NetworkInfo};

pub const NO_ADDRESS: &str = "NO IP ADDRESS FOUND";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn is_loopback(addr: &str) -> bool {
    let bare = addr.split('%').next().unwrap_or(addr);
    bare.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

/// First non-loopback address of the requested family.
///
/// IPv6 results lose their `%zone` suffix and are uppercased.
pub fn select_address(addresses: &[String], prefer_ipv4: bool) -> Option<String> {
    addresses
        .iter()
        .filter(|a| !is_loopback(a))
        .find_map(|a| {
            let is_v4 = !a.contains(':');
            match (prefer_ipv4, is_v4) {
                (true, true) => Some(a.clone()),
                (false, false) => {
                    let bare = a.split('%').next().unwrap_or(a);
                    Some(bare.to_uppercase())
                }
                _ => None,
            }
        })
}

pub fn banner_text<Tz>(address: Option<&str>, started: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: core::fmt::Display,
{
    format!(
        "Current IP (time started):\n    {}\n    {}",
        address.unwrap_or(NO_ADDRESS),
        started.format(TIMESTAMP_FORMAT)
    )
}

/// Build and show the banner. IPv4 wins; IPv6 is the fallback.
pub fn show_startup_banner(net: &impl NetworkInfo, sink: &mut impl BannerSink) {
    let addresses = net.addresses();
    let address = select_address(&addresses, true).or_else(|| select_address(&addresses, false));
    sink.show_banner(&banner_text(address.as_deref(), &Local::now()));
}

/// Banner written to the console.
#[derive(Debug, Default)]
pub struct LogBanner;

impl BannerSink for LogBanner {
    fn show_banner(&mut self, text: &str) {
        for line in text.lines() {
            info!("BANNER | {}", line.trim());
        }
    }
}
