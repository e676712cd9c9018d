// Evaluation Context
//
// The read-only view rules are matched against: machine attributes
// joined with their SKU records, disk aggregates, the targeted disk
// and the action itself. Built per evaluation and dropped afterwards.

use serde_json::Value;

use crate::catalog::{SkuCatalog, SkuRecord};
use crate::model::{
    Action, DiskConfig, DiskTopology, MachineDescription, OsConfig, StorageType, VmConfig,
};

/// Reasons a context cannot be built.
///
/// These are the only failures that abort an evaluation; the display
/// text is shown to users verbatim.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Invalid or unsupported VM SKU: {0}")]
    InvalidSourceSku(String),

    #[error("Invalid or unsupported target VM SKU: {0}")]
    InvalidTargetSku(String),
}

#[derive(Debug, Clone, Copy)]
pub struct VmFacts<'a> {
    pub config: &'a VmConfig,
    pub sku: &'a SkuRecord,
    /// Power state is not modelled; machines are assumed running.
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskFacts {
    /// Data disks only.
    pub count: usize,
    pub has_ultra_ssd: bool,
    pub has_lvm: bool,
    pub has_raid: bool,
}

impl DiskFacts {
    fn collect(machine: &MachineDescription) -> Self {
        let disks = &machine.disks;
        Self {
            count: machine.data_disks().count(),
            has_ultra_ssd: disks
                .iter()
                .any(|d| d.storage_type == StorageType::UltraSsdLrs),
            has_lvm: disks.iter().any(|d| d.topology == Some(DiskTopology::Lvm)),
            has_raid: disks
                .iter()
                .any(|d| d.topology.is_some_and(|t| t.is_raid())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TargetFacts<'a> {
    pub sku: &'a SkuRecord,
    /// Approximation of "must move to different hardware".
    pub requires_deallocation: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub vm: VmFacts<'a>,
    pub os: &'a OsConfig,
    pub disks: DiskFacts,
    pub disk: Option<&'a DiskConfig>,
    pub target_sku: Option<TargetFacts<'a>>,
    pub action: &'a Action,
}

impl<'a> EvalContext<'a> {
    pub fn build<C>(
        machine: &'a MachineDescription,
        action: &'a Action,
        catalog: &'a C,
    ) -> Result<Self, ContextError>
    where
        C: SkuCatalog + ?Sized,
    {
        let source = catalog
            .lookup(&machine.vm.sku)
            .ok_or_else(|| ContextError::InvalidSourceSku(machine.vm.sku.clone()))?;

        let target_sku = match action.target_sku.as_deref() {
            Some(name) => {
                let sku = catalog
                    .lookup(name)
                    .ok_or_else(|| ContextError::InvalidTargetSku(name.to_string()))?;
                Some(TargetFacts {
                    sku,
                    requires_deallocation: sku.family != source.family,
                })
            }
            None => None,
        };

        Ok(Self {
            vm: VmFacts {
                config: &machine.vm,
                sku: source,
                running: true,
            },
            os: &machine.os,
            disks: DiskFacts::collect(machine),
            disk: action.target_lun.and_then(|lun| machine.disk(lun)),
            target_sku,
            action,
        })
    }

    /// Look up a `section.field` path.
    ///
    /// Returns `None` ("undefined") for unknown sections, unknown fields,
    /// deeper paths and optional values that are absent.
    pub fn resolve(&self, path: &str) -> Option<Value> {
        let (section, field) = path.split_once('.')?;
        if field.contains('.') {
            return None;
        }

        match section {
            "vm" => self.vm_field(field),
            "os" => self.os_field(field),
            "disks" => self.disks_field(field),
            "disk" => self.disk.and_then(|d| disk_field(d, field)),
            "targetSku" => self.target_sku.and_then(|t| target_field(&t, field)),
            "action" => self.action_field(field),
            _ => None,
        }
    }

    fn vm_field(&self, field: &str) -> Option<Value> {
        let vm = &self.vm;
        Some(match field {
            "sku" => vm.config.sku.as_str().into(),
            "generation" => vm.config.generation.as_str().into(),
            "zonal" => vm.config.zonal.into(),
            "zone" => vm.config.zone.as_deref()?.into(),
            "family" => vm.sku.family.as_str().into(),
            "processor" => vm.sku.processor.as_str().into(),
            "hasTempDisk" => vm.sku.has_temp_disk().into(),
            "tempDiskSize" => vm.sku.temp_disk_gb.into(),
            "running" => vm.running.into(),
            _ => return None,
        })
    }

    fn os_field(&self, field: &str) -> Option<Value> {
        Some(match field {
            "family" => self.os.family.as_str().into(),
            "distro" => self.os.distro.as_str().into(),
            "version" => self.os.version.as_str().into(),
            _ => return None,
        })
    }

    fn disks_field(&self, field: &str) -> Option<Value> {
        Some(match field {
            "count" => self.disks.count.into(),
            "hasUltraSSD" => self.disks.has_ultra_ssd.into(),
            "hasLVM" => self.disks.has_lvm.into(),
            "hasRAID" => self.disks.has_raid.into(),
            _ => return None,
        })
    }

    fn action_field(&self, field: &str) -> Option<Value> {
        let action = self.action;
        Some(match field {
            "type" => action.kind.as_str().into(),
            "targetSku" => action.target_sku.as_deref()?.into(),
            "targetLun" => action.target_lun?.into(),
            "targetSizeGB" => action.target_size_gb?.into(),
            "encryptionOperation" => action.encryption_operation?.as_str().into(),
            "encryptionTarget" => action.encryption_target?.as_str().into(),
            "generalize" => action.generalize?.into(),
            "nicCount" => action.nic_count?.into(),
            "restoreType" => action.restore_type?.as_str().into(),
            "swapSource" => action.swap_source?.as_str().into(),
            _ => return None,
        })
    }
}

fn disk_field(disk: &DiskConfig, field: &str) -> Option<Value> {
    Some(match field {
        "lun" => disk.lun.into(),
        "name" => disk.name.as_str().into(),
        "role" => disk.role.as_str().into(),
        "sizeGB" => disk.size_gb.into(),
        "type" => disk.storage_type.as_str().into(),
        "topology" => disk.topology?.as_str().into(),
        "vg" => disk.vg.as_deref()?.into(),
        "lv" => disk.lv.as_deref()?.into(),
        "mount" => disk.mount.as_deref()?.into(),
        "driveLetter" => disk.drive_letter.as_deref()?.into(),
        _ => return None,
    })
}

fn target_field(target: &TargetFacts<'_>, field: &str) -> Option<Value> {
    let sku = target.sku;
    Some(match field {
        "name" => sku.name.as_str().into(),
        "family" => sku.family.as_str().into(),
        "vCPUs" => sku.vcpus.into(),
        "memoryGB" => sku.memory_gb.into(),
        "maxDataDisks" => sku.max_data_disks.into(),
        "tempDiskGB" => sku.temp_disk_gb.into(),
        "premiumIO" => sku.premium_io.into(),
        "acceleratedNetworking" => sku.accelerated_networking.into(),
        "generation" => Value::Array(
            sku.generation
                .iter()
                .map(|g| Value::from(g.as_str()))
                .collect(),
        ),
        "processor" => sku.processor.as_str().into(),
        "requiresDeallocation" => target.requires_deallocation.into(),
        _ => return None,
    })
}
