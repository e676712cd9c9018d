// Action Request
//
// The change a user intends to apply to a machine, plus the
// kind-specific parameters rules may inspect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of changes the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "ResizeVM")]
    ResizeVm,
    #[serde(rename = "ResizeOSDisk")]
    ResizeOsDisk,
    #[serde(rename = "ResizeDataDisk")]
    ResizeDataDisk,
    #[serde(rename = "DetachDisk")]
    DetachDisk,
    #[serde(rename = "RedeployVM")]
    RedeployVm,
    #[serde(rename = "EnableEncryption")]
    EnableEncryption,
    #[serde(rename = "ChangeZone")]
    ChangeZone,
    #[serde(rename = "CrossRegionMove")]
    CrossRegionMove,
    #[serde(rename = "StopVM")]
    StopVm,
    #[serde(rename = "DeallocateVM")]
    DeallocateVm,
    #[serde(rename = "CaptureVM")]
    CaptureVm,
    #[serde(rename = "AddNIC")]
    AddNic,
    #[serde(rename = "RemoveNIC")]
    RemoveNic,
    #[serde(rename = "RestoreVM")]
    RestoreVm,
    #[serde(rename = "SwapOSDisk")]
    SwapOsDisk,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::ResizeVm,
        ActionKind::ResizeOsDisk,
        ActionKind::ResizeDataDisk,
        ActionKind::DetachDisk,
        ActionKind::RedeployVm,
        ActionKind::EnableEncryption,
        ActionKind::ChangeZone,
        ActionKind::CrossRegionMove,
        ActionKind::StopVm,
        ActionKind::DeallocateVm,
        ActionKind::CaptureVm,
        ActionKind::AddNic,
        ActionKind::RemoveNic,
        ActionKind::RestoreVm,
        ActionKind::SwapOsDisk,
    ];

    /// Wire name, as used in knowledge-base `actions` lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ResizeVm => "ResizeVM",
            ActionKind::ResizeOsDisk => "ResizeOSDisk",
            ActionKind::ResizeDataDisk => "ResizeDataDisk",
            ActionKind::DetachDisk => "DetachDisk",
            ActionKind::RedeployVm => "RedeployVM",
            ActionKind::EnableEncryption => "EnableEncryption",
            ActionKind::ChangeZone => "ChangeZone",
            ActionKind::CrossRegionMove => "CrossRegionMove",
            ActionKind::StopVm => "StopVM",
            ActionKind::DeallocateVm => "DeallocateVM",
            ActionKind::CaptureVm => "CaptureVM",
            ActionKind::AddNic => "AddNIC",
            ActionKind::RemoveNic => "RemoveNIC",
            ActionKind::RestoreVm => "RestoreVM",
            ActionKind::SwapOsDisk => "SwapOSDisk",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActionKind::ResizeVm => "Resize VM",
            ActionKind::ResizeOsDisk => "Resize OS Disk",
            ActionKind::ResizeDataDisk => "Resize Data Disk",
            ActionKind::DetachDisk => "Detach Disk",
            ActionKind::RedeployVm => "Redeploy VM",
            ActionKind::EnableEncryption => "Disk Encryption",
            ActionKind::ChangeZone => "Change Availability Zone",
            ActionKind::CrossRegionMove => "Cross-Region Move",
            ActionKind::StopVm => "Stop VM",
            ActionKind::DeallocateVm => "Deallocate VM",
            ActionKind::CaptureVm => "Capture VM",
            ActionKind::AddNic => "Add Network Interface",
            ActionKind::RemoveNic => "Remove Network Interface",
            ActionKind::RestoreVm => "Restore VM",
            ActionKind::SwapOsDisk => "Swap OS Disk",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid action type: {0}")]
pub struct UnknownActionKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownActionKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionOperation {
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionTarget {
    Os,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestoreType {
    #[serde(rename = "newVM")]
    NewVm,
    ReplaceExisting,
    DisksOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapSource {
    Snapshot,
    Disk,
    Backup,
}

impl EncryptionOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionOperation::Enable => "enable",
            EncryptionOperation::Disable => "disable",
        }
    }
}

impl EncryptionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionTarget::Os => "os",
            EncryptionTarget::All => "all",
        }
    }
}

impl RestoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreType::NewVm => "newVM",
            RestoreType::ReplaceExisting => "replaceExisting",
            RestoreType::DisksOnly => "disksOnly",
        }
    }
}

impl SwapSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapSource::Snapshot => "snapshot",
            SwapSource::Disk => "disk",
            SwapSource::Backup => "backup",
        }
    }
}

/// A requested change plus its optional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lun: Option<u32>,
    #[serde(default, rename = "targetSizeGB", skip_serializing_if = "Option::is_none")]
    pub target_size_gb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_operation: Option<EncryptionOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_target: Option<EncryptionTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generalize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_type: Option<RestoreType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_source: Option<SwapSource>,
}

impl Action {
    /// An action of the given kind with no parameters.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            target_sku: None,
            target_lun: None,
            target_size_gb: None,
            encryption_operation: None,
            encryption_target: None,
            generalize: None,
            nic_count: None,
            restore_type: None,
            swap_source: None,
        }
    }

    pub fn with_target_sku(mut self, sku: impl Into<String>) -> Self {
        self.target_sku = Some(sku.into());
        self
    }

    pub fn with_target_lun(mut self, lun: u32) -> Self {
        self.target_lun = Some(lun);
        self
    }

    pub fn with_encryption(mut self, op: EncryptionOperation, target: EncryptionTarget) -> Self {
        self.encryption_operation = Some(op);
        self.encryption_target = Some(target);
        self
    }

    /// Human-readable label, refined by the action's parameters where
    /// they change what the user is actually doing.
    pub fn display_name(&self) -> String {
        match self.kind {
            ActionKind::EnableEncryption => {
                if let Some(op) = self.encryption_operation {
                    let operation = match op {
                        EncryptionOperation::Enable => "Enable",
                        EncryptionOperation::Disable => "Disable",
                    };
                    let target = match self.encryption_target {
                        Some(EncryptionTarget::All) => "All Disks",
                        _ => "OS Disk",
                    };
                    return format!("{operation} Disk Encryption ({target})");
                }
            }
            ActionKind::CaptureVm => {
                if let Some(generalize) = self.generalize {
                    return if generalize {
                        "Capture VM (Generalized)".into()
                    } else {
                        "Capture VM (Specialized)".into()
                    };
                }
            }
            ActionKind::RestoreVm => {
                if let Some(restore) = self.restore_type {
                    return match restore {
                        RestoreType::NewVm => "Restore to New VM",
                        RestoreType::ReplaceExisting => "Restore & Replace Existing",
                        RestoreType::DisksOnly => "Restore Disks Only",
                    }
                    .into();
                }
            }
            ActionKind::SwapOsDisk => {
                if let Some(source) = self.swap_source {
                    return match source {
                        SwapSource::Snapshot => "Swap OS Disk (from Snapshot)",
                        SwapSource::Disk => "Swap OS Disk (from Disk)",
                        SwapSource::Backup => "Swap OS Disk (from Backup)",
                    }
                    .into();
                }
            }
            _ => {}
        }

        self.kind.display_name().into()
    }
}
