// Machine Description
//
// The user-supplied view of the virtual machine a change is planned
// against: size, boot generation, guest OS and attached disks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod action;

pub use action::{Action, ActionKind};

/// Boot image generation of a VM or supported by a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    Gen1,
    Gen2,
}

impl Generation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Gen1 => "Gen1",
            Generation::Gen2 => "Gen2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsFamily {
    Linux,
    Windows,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "Linux",
            OsFamily::Windows => "Windows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskRole {
    Os,
    Data,
    Temp,
}

impl DiskRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskRole::Os => "os",
            DiskRole::Data => "data",
            DiskRole::Temp => "temp",
        }
    }
}

/// Managed disk storage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "StandardSSD_LRS")]
    StandardSsdLrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(rename = "UltraSSD_LRS")]
    UltraSsdLrs,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::StandardLrs => "Standard_LRS",
            StorageType::StandardSsdLrs => "StandardSSD_LRS",
            StorageType::PremiumLrs => "Premium_LRS",
            StorageType::UltraSsdLrs => "UltraSSD_LRS",
        }
    }
}

/// Guest-level storage arrangement of a disk.
///
/// Linux guests use `raw`, `lvm` and the `raid*` variants; Windows guests
/// use `raw`, `storage-spaces`, `striped` and `mirrored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiskTopology {
    Raw,
    Lvm,
    Raid0,
    Raid1,
    Raid5,
    StorageSpaces,
    Striped,
    Mirrored,
}

impl DiskTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskTopology::Raw => "raw",
            DiskTopology::Lvm => "lvm",
            DiskTopology::Raid0 => "raid0",
            DiskTopology::Raid1 => "raid1",
            DiskTopology::Raid5 => "raid5",
            DiskTopology::StorageSpaces => "storage-spaces",
            DiskTopology::Striped => "striped",
            DiskTopology::Mirrored => "mirrored",
        }
    }

    pub fn is_raid(&self) -> bool {
        matches!(
            self,
            DiskTopology::Raid0 | DiskTopology::Raid1 | DiskTopology::Raid5
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    pub sku: String,
    pub generation: Generation,
    #[serde(default)]
    pub zonal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsConfig {
    pub family: OsFamily,
    #[serde(default)]
    pub distro: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskConfig {
    pub lun: u32,
    #[serde(default)]
    pub name: String,
    pub role: DiskRole,
    #[serde(rename = "sizeGB")]
    pub size_gb: u64,
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<DiskTopology>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_letter: Option<String>,
}

/// Current shape of the machine a change is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDescription {
    pub vm: VmConfig,
    pub os: OsConfig,
    #[serde(default)]
    pub disks: Vec<DiskConfig>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("duplicate disk lun {0}")]
    DuplicateLun(u32),

    #[error("expected exactly one os disk, found {0}")]
    OsDiskCount(usize),
}

impl MachineDescription {
    /// Check the structural invariants of a machine description.
    ///
    /// The impact engine does not call this; it is meant for the input
    /// boundary where descriptions arrive from files or forms.
    pub fn validate(&self) -> Result<(), MachineError> {
        let mut seen = HashSet::new();
        for disk in &self.disks {
            if !seen.insert(disk.lun) {
                return Err(MachineError::DuplicateLun(disk.lun));
            }
        }

        let os_disks = self
            .disks
            .iter()
            .filter(|d| d.role == DiskRole::Os)
            .count();
        if os_disks != 1 {
            return Err(MachineError::OsDiskCount(os_disks));
        }

        Ok(())
    }

    pub fn disk(&self, lun: u32) -> Option<&DiskConfig> {
        self.disks.iter().find(|d| d.lun == lun)
    }

    pub fn data_disks(&self) -> impl Iterator<Item = &DiskConfig> {
        self.disks.iter().filter(|d| d.role == DiskRole::Data)
    }
}
