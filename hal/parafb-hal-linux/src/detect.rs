//! Host SoC detection
//!
//! The MMIO bus only knows the BCM283x GPIO register layout. A Pi 5 routes
//! the header through RP1 and must be refused before anything is mapped.

use std::fs;

use tracing::{debug, warn};

use crate::error::BusError;

const CPUINFO: &str = "/proc/cpuinfo";

/// New-style revision code flag
const REVISION_NEW_STYLE: u32 = 1 << 23;

/// Board type field of a new-style revision code for the Pi 5
const BOARD_TYPE_PI5: u32 = 0x17;

/// GPIO block family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostChip {
    /// BCM2835/6/7/2711 GPIO block
    Bcm283x,
    /// RP1 south bridge (Pi 5)
    Rp1,
}

/// What `/proc/cpuinfo` says about the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub chip: HostChip,
    /// Raw revision code, if one was present
    pub revision: Option<u32>,
    /// Model string, if one was present
    pub model: Option<String>,
}

/// Classify a host from the text of `/proc/cpuinfo`
///
/// Hosts with no revision line are assumed to be BCM283x.
pub fn detect_host(cpuinfo: &str) -> HostInfo {
    let mut revision = None;
    let mut model = None;

    for line in cpuinfo.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Revision" => revision = u32::from_str_radix(value, 16).ok(),
            "Model" => model = Some(value.to_string()),
            _ => {}
        }
    }

    let pi5_model = model.as_deref().is_some_and(|m| m.contains("Pi 5"));
    let pi5_revision = revision
        .is_some_and(|rev| rev & REVISION_NEW_STYLE != 0 && (rev >> 4) & 0xFF == BOARD_TYPE_PI5);

    let chip = if pi5_model || pi5_revision {
        HostChip::Rp1
    } else {
        HostChip::Bcm283x
    };

    HostInfo {
        chip,
        revision,
        model,
    }
}

/// Read `/proc/cpuinfo` and refuse unsupported hosts
pub fn check_host() -> Result<HostInfo, BusError> {
    let text = fs::read_to_string(CPUINFO).map_err(|source| BusError::CpuInfo {
        path: CPUINFO,
        source,
    })?;

    let info = detect_host(&text);
    match info.revision {
        Some(rev) => debug!("Host revision {:06x}, model {:?}", rev, info.model),
        None => warn!("No revision in {}, assuming BCM283x GPIO layout", CPUINFO),
    }

    if info.chip == HostChip::Rp1 {
        let name = info.model.clone().unwrap_or_else(|| "Raspberry Pi 5".to_string());
        return Err(BusError::UnsupportedHost(name));
    }

    Ok(info)
}
