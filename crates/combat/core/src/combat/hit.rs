/// Body location targeted by an attack.
///
/// The first eight are called-shot locations in catalog order;
/// [`HitLocation::Uncalled`] is a plain attack.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
    strum::IntoStaticStr, strum::VariantArray,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HitLocation {
    Head,
    LeftArm,
    RightArm,
    #[default]
    Torso,
    RightLeg,
    LeftLeg,
    Eyes,
    Groin,
    Uncalled,
}

impl HitLocation {
    /// Locations with their own taunt range.
    pub const SPECIFIC_COUNT: usize = 8;

    /// Called-shot locations, indexable by a 0..8 roll.
    pub const SPECIFIC: [Self; Self::SPECIFIC_COUNT] = [
        Self::Head,
        Self::LeftArm,
        Self::RightArm,
        Self::Torso,
        Self::RightLeg,
        Self::LeftLeg,
        Self::Eyes,
        Self::Groin,
    ];

    /// Index into `0..=8`, `Uncalled` last.
    pub fn from_roll(roll: u32) -> Self {
        usize::try_from(roll)
            .ok()
            .and_then(|index| Self::SPECIFIC.get(index).copied())
            .unwrap_or(Self::Uncalled)
    }

    /// Slot in the per-location taunt table; an uncalled hit lands on the torso.
    pub fn message_slot(self) -> usize {
        match self {
            Self::Uncalled => Self::Torso.message_slot(),
            specific => Self::SPECIFIC
                .iter()
                .position(|location| *location == specific)
                .unwrap_or(3),
        }
    }

    /// Prefix of this location's keys in the profile configuration.
    pub fn config_key(self) -> &'static str {
        self.into()
    }
}

/// How a weapon is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum HitMode {
    /// Bare hands, no item involved.
    Punch,
    Primary,
    /// Area, burst or thrown use of the weapon.
    Secondary,
}
