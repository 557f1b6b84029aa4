// src/tweaks/cpu.rs

use super::{MsrBitSpec, MsrFeature};

// MSRC001_0015 [Hardware Configuration] (Core::X86::Msr::HWCR)
// 25 CpbDis: core performance boost disable. Read-write. Reset: 0. 0=CPB is
// requested to be enabled. 1=CPB is disabled. If core performance boost is
// disabled while a core is in a boosted P-state, the core automatically
// transitions to the highest performance non-boosted P-state.
pub const HWCR: u32 = 0xC001_0015;

// MSRC001_0292 [Core C6 Configuration]: bit 32 gates whether a core may
// enter CC6 at all.
pub const CC6_CONFIG: u32 = 0xC001_0292;

// MSRC001_0296 [C-state Configuration]: CCR0_CC6EN (bit 6), CCR1_CC6EN
// (bit 14) and CCR2_CC6EN (bit 22) select C6 as the action for the three
// C-state control ranges.
pub const CSTATE_CONFIG: u32 = 0xC001_0296;

/// Core Performance Boost. The hardware bit is a disable flag, so the
/// polarity is inverted: boost is enabled while CpbDis is clear.
pub fn core_performance_boost() -> MsrFeature {
    const BITS: &[MsrBitSpec] = &[MsrBitSpec {
        msr: HWCR,
        bit: 25,
        set_when_enabled: false,
    }];
    MsrFeature {
        label: "Processor boosting",
        bits: BITS,
    }
}

/// C6 C-state. Entering C6 takes both the CC6 gate and the per-range
/// C-state selectors, so the feature spans two registers.
pub fn c6_cstate() -> MsrFeature {
    const BITS: &[MsrBitSpec] = &[
        MsrBitSpec {
            msr: CC6_CONFIG,
            bit: 32,
            set_when_enabled: true,
        },
        MsrBitSpec {
            msr: CSTATE_CONFIG,
            bit: 6,
            set_when_enabled: true,
        },
        MsrBitSpec {
            msr: CSTATE_CONFIG,
            bit: 14,
            set_when_enabled: true,
        },
        MsrBitSpec {
            msr: CSTATE_CONFIG,
            bit: 22,
            set_when_enabled: true,
        },
    ];
    MsrFeature {
        label: "C6 C-state",
        bits: BITS,
    }
}
