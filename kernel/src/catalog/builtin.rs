// Built-in SKU reference data.

use super::{Processor, SkuRecord};
use crate::model::Generation::{self, Gen1, Gen2};

const GEN2: &[Generation] = &[Gen2];
const BOTH: &[Generation] = &[Gen1, Gen2];

struct Row {
    name: &'static str,
    family: &'static str,
    vcpus: u32,
    memory_gb: u32,
    max_data_disks: u32,
    temp_disk_gb: u64,
    accelerated_networking: bool,
    generation: &'static [Generation],
    processor: Processor,
}

#[allow(clippy::too_many_arguments)]
const fn row(
    name: &'static str,
    family: &'static str,
    vcpus: u32,
    memory_gb: u32,
    max_data_disks: u32,
    temp_disk_gb: u64,
    generation: &'static [Generation],
    processor: Processor,
) -> Row {
    Row {
        name,
        family,
        vcpus,
        memory_gb,
        max_data_disks,
        temp_disk_gb,
        accelerated_networking: true,
        generation,
        processor,
    }
}

// B-series burstable sizes lack accelerated networking.
const fn burstable(
    name: &'static str,
    family: &'static str,
    vcpus: u32,
    memory_gb: u32,
    max_data_disks: u32,
    temp_disk_gb: u64,
) -> Row {
    Row {
        accelerated_networking: false,
        ..row(name, family, vcpus, memory_gb, max_data_disks, temp_disk_gb, BOTH, Processor::Intel)
    }
}

use Processor::{Amd, Arm, Intel};

const ROWS: &[Row] = &[
    // D-series v5, Intel
    row("Standard_D2s_v5", "Dsv5", 2, 8, 4, 0, GEN2, Intel),
    row("Standard_D4s_v5", "Dsv5", 4, 16, 8, 0, GEN2, Intel),
    row("Standard_D8s_v5", "Dsv5", 8, 32, 16, 0, GEN2, Intel),
    row("Standard_D16s_v5", "Dsv5", 16, 64, 32, 0, GEN2, Intel),
    // D-series v5, AMD
    row("Standard_D2as_v5", "Dasv5", 2, 8, 4, 0, GEN2, Amd),
    row("Standard_D4as_v5", "Dasv5", 4, 16, 8, 0, GEN2, Amd),
    row("Standard_D8as_v5", "Dasv5", 8, 32, 16, 0, GEN2, Amd),
    row("Standard_D16as_v5", "Dasv5", 16, 64, 32, 0, GEN2, Amd),
    // D-series v4 with temp disk
    row("Standard_D2ds_v4", "Ddsv4", 2, 8, 4, 75, BOTH, Intel),
    row("Standard_D4ds_v4", "Ddsv4", 4, 16, 8, 150, BOTH, Intel),
    row("Standard_D8ds_v4", "Ddsv4", 8, 32, 16, 300, BOTH, Intel),
    // E-series v3
    row("Standard_E2s_v3", "Esv3", 2, 16, 4, 32, BOTH, Intel),
    row("Standard_E4s_v3", "Esv3", 4, 32, 8, 64, BOTH, Intel),
    row("Standard_E8s_v3", "Esv3", 8, 64, 16, 128, BOTH, Intel),
    row("Standard_E16s_v3", "Esv3", 16, 128, 32, 256, BOTH, Intel),
    // E-series v4
    row("Standard_E2s_v4", "Esv4", 2, 16, 4, 32, BOTH, Intel),
    row("Standard_E4s_v4", "Esv4", 4, 32, 8, 64, BOTH, Intel),
    row("Standard_E8s_v4", "Esv4", 8, 64, 16, 128, BOTH, Intel),
    row("Standard_E16s_v4", "Esv4", 16, 128, 32, 256, BOTH, Intel),
    // E-series v5, Intel
    row("Standard_E2s_v5", "Esv5", 2, 16, 4, 0, GEN2, Intel),
    row("Standard_E4s_v5", "Esv5", 4, 32, 8, 0, GEN2, Intel),
    row("Standard_E8s_v5", "Esv5", 8, 64, 16, 0, GEN2, Intel),
    // E-series v5, AMD
    row("Standard_E2as_v5", "Easv5", 2, 16, 4, 0, GEN2, Amd),
    row("Standard_E4as_v5", "Easv5", 4, 32, 8, 0, GEN2, Amd),
    row("Standard_E8as_v5", "Easv5", 8, 64, 16, 0, GEN2, Amd),
    // F-series v2
    row("Standard_F2s_v2", "Fsv2", 2, 4, 4, 16, BOTH, Intel),
    row("Standard_F4s_v2", "Fsv2", 4, 8, 8, 32, BOTH, Intel),
    row("Standard_F8s_v2", "Fsv2", 8, 16, 16, 64, BOTH, Intel),
    // B-series
    burstable("Standard_B2s", "Bs", 2, 4, 4, 8),
    burstable("Standard_B2ms", "Bms", 2, 8, 4, 16),
    burstable("Standard_B4ms", "Bms", 4, 16, 8, 32),
    // L-series v2, storage optimized
    row("Standard_L8s_v2", "Lsv2", 8, 64, 16, 80, BOTH, Amd),
    row("Standard_L16s_v2", "Lsv2", 16, 128, 32, 160, BOTH, Amd),
    // NC-series v3, GPU
    row("Standard_NC6s_v3", "NCsv3", 6, 112, 12, 736, BOTH, Intel),
    row("Standard_NC12s_v3", "NCsv3", 12, 224, 24, 1474, BOTH, Intel),
    // D-series pls v5, ARM
    row("Standard_D2pls_v5", "Dplsv5", 2, 4, 4, 0, GEN2, Arm),
    row("Standard_D4pls_v5", "Dplsv5", 4, 8, 8, 0, GEN2, Arm),
];

pub(super) fn records() -> Vec<SkuRecord> {
    ROWS.iter()
        .map(|r| SkuRecord {
            name: r.name.to_string(),
            family: r.family.to_string(),
            vcpus: r.vcpus,
            memory_gb: f64::from(r.memory_gb),
            max_data_disks: r.max_data_disks,
            temp_disk_gb: r.temp_disk_gb,
            premium_io: true,
            accelerated_networking: r.accelerated_networking,
            generation: r.generation.to_vec(),
            processor: r.processor,
        })
        .collect()
}
