use bitflags::bitflags;

bitflags! {
    /// Persistent damage and status conditions of a combatant.
    ///
    /// The world owns these bits; the planner only reads them, except for
    /// the hurt-too-much check which intersects them with a profile mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DamageFlags: u16 {
        const DEAD            = 1 << 0;
        const KNOCKED_OUT     = 1 << 1;
        const KNOCKED_DOWN    = 1 << 2;
        const CRIP_LEG_LEFT   = 1 << 3;
        const CRIP_LEG_RIGHT  = 1 << 4;
        const CRIP_ARM_LEFT   = 1 << 5;
        const CRIP_ARM_RIGHT  = 1 << 6;
        const BLIND           = 1 << 7;
        const ON_FIRE         = 1 << 8;
        const LOSE_TURN       = 1 << 9;

        const CRIP_LEGS = Self::CRIP_LEG_LEFT.bits() | Self::CRIP_LEG_RIGHT.bits();
        const CRIP_ARMS = Self::CRIP_ARM_LEFT.bits() | Self::CRIP_ARM_RIGHT.bits();
        const CRIP_ANY  = Self::CRIP_LEGS.bits() | Self::CRIP_ARMS.bits();
    }
}

impl DamageFlags {
    /// Dead or knocked out: cannot act and is not worth targeting.
    pub fn is_incapacitated(self) -> bool {
        self.intersects(Self::DEAD | Self::KNOCKED_OUT)
    }

    pub fn both_arms_crippled(self) -> bool {
        self.contains(Self::CRIP_ARMS)
    }

    pub fn any_arm_crippled(self) -> bool {
        self.intersects(Self::CRIP_ARMS)
    }
}

bitflags! {
    /// Transient combat maneuver state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ManeuverFlags: u8 {
        /// Noticed the fight and wants in.
        const ENGAGING    = 1 << 0;
        /// Far enough from the threat; stops attacking until re-engaged.
        const DISENGAGING = 1 << 1;
        const FLEEING     = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_cripple_masks_cover_both_limbs() {
        assert!(DamageFlags::CRIP_ARMS.both_arms_crippled());
        assert!(!DamageFlags::CRIP_ARM_LEFT.both_arms_crippled());
        assert!(DamageFlags::CRIP_ARM_RIGHT.any_arm_crippled());
        assert!(DamageFlags::CRIP_ANY.contains(DamageFlags::CRIP_LEG_LEFT));
    }
}
