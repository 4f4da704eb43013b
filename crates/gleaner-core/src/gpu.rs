//! Static GPU reference data.
//!
//! Not produced by scraping: a compiled-in table used to enrich node
//! GRES descriptors into a human-readable form.

use serde::Serialize;

/// Reference data for one GPU model, keyed by canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpuSpec {
    pub name: &'static str,
    pub vendor: &'static str,
    pub vram_gb: u32,
    pub cuda_cores: u32,
    pub tensor_cores: u32,
    pub tflops_fp32: f32,
}

pub const GPU_SPECS: &[GpuSpec] = &[
    GpuSpec {
        name: "p100",
        vendor: "nvidia",
        vram_gb: 16,
        cuda_cores: 3584,
        tensor_cores: 0,
        tflops_fp32: 9.3,
    },
    GpuSpec {
        name: "v100",
        vendor: "nvidia",
        vram_gb: 16,
        cuda_cores: 5120,
        tensor_cores: 640,
        tflops_fp32: 14.0,
    },
    GpuSpec {
        name: "v100l",
        vendor: "nvidia",
        vram_gb: 32,
        cuda_cores: 5120,
        tensor_cores: 640,
        tflops_fp32: 14.0,
    },
    GpuSpec {
        name: "t4",
        vendor: "nvidia",
        vram_gb: 16,
        cuda_cores: 2560,
        tensor_cores: 320,
        tflops_fp32: 8.1,
    },
    GpuSpec {
        name: "rtx8000",
        vendor: "nvidia",
        vram_gb: 48,
        cuda_cores: 4608,
        tensor_cores: 576,
        tflops_fp32: 16.3,
    },
    GpuSpec {
        name: "a100",
        vendor: "nvidia",
        vram_gb: 40,
        cuda_cores: 6912,
        tensor_cores: 432,
        tflops_fp32: 19.5,
    },
    GpuSpec {
        name: "a100l",
        vendor: "nvidia",
        vram_gb: 80,
        cuda_cores: 6912,
        tensor_cores: 432,
        tflops_fp32: 19.5,
    },
];

/// Look up reference data by canonical GPU name.
pub fn gpu_spec(name: &str) -> Option<&'static GpuSpec> {
    GPU_SPECS.iter().find(|spec| spec.name == name)
}

/// (base name, memory GB) -> display name.
///
/// Some sites report a GPU model under its base name regardless of the
/// memory capacity of the variant actually installed; the feature
/// string carries the capacity. This is a fixed lookup, not a general
/// rule.
const MEMORY_VARIANTS: &[(&str, u32, &str)] = &[
    ("v100", 16, "v100"),
    ("v100", 32, "v100l"),
    ("a100", 40, "a100"),
    ("a100", 80, "a100l"),
];

/// Resolve the display name for a GPU given its reported base name and
/// the memory capacity taken from the node's feature string.
///
/// Returns None when the combination is not in the table; callers keep
/// the base name in that case.
pub fn gpu_display_name(base: &str, memory_gb: u32) -> Option<&'static str> {
    MEMORY_VARIANTS
        .iter()
        .find(|(name, gb, _)| *name == base && *gb == memory_gb)
        .map(|(_, _, display)| *display)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_spec_lookup() {
        let v100 = gpu_spec("v100").unwrap();
        assert_eq!(v100.vram_gb, 16);
        assert_eq!(v100.vendor, "nvidia");
        assert!(gpu_spec("mystery9000").is_none());
    }

    #[test]
    fn test_display_name_variants() {
        assert_eq!(gpu_display_name("v100", 32), Some("v100l"));
        assert_eq!(gpu_display_name("v100", 16), Some("v100"));
        assert_eq!(gpu_display_name("a100", 80), Some("a100l"));
        assert_eq!(gpu_display_name("v100", 48), None);
        assert_eq!(gpu_display_name("t4", 16), None);
    }

    #[test]
    fn test_variants_point_at_real_specs() {
        for (_, _, display) in MEMORY_VARIANTS {
            assert!(gpu_spec(display).is_some(), "{display} missing from GPU_SPECS");
        }
    }
}
