/// Why an attack cannot be made right now.
///
/// Produced by [`crate::env::RulesOracle::classify_shot`]; every non-`Ok`
/// variant maps to a recovery strategy in the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ShotAssessment {
    Ok,
    NoAmmo,
    NotEnoughAp,
    ArmCrippled,
    BothArmsCrippled,
    OutOfRange,
    AimBlocked,
    TargetDead,
}

impl ShotAssessment {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Problems that movement or a reload can fix.
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Ok | Self::OutOfRange | Self::NoAmmo)
    }

    /// No weapon swap, reload or approach can make this target attackable.
    pub fn rules_out_target(self) -> bool {
        matches!(self, Self::AimBlocked | Self::TargetDead)
    }
}

/// Whether firing a weapon now would endanger the attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponSafety {
    Safe,
    /// Unsafe; becomes safe once `distance` tiles separate the attacker
    /// from the target.
    Unsafe { distance: u32 },
}

impl WeaponSafety {
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }
}
