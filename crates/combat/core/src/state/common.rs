use std::fmt;

/// Unique identifier for any combatant tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this combatant is the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Faction membership. Combatants on the same team never target each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u32);

impl TeamId {
    /// The player's own team; party members share it.
    pub const PLAYER: Self = Self(0);
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.0)
    }
}

/// Handle to a concrete item instance (in an inventory or on the ground).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Prototype identifier shared by every instance of the same item type.
///
/// Behavior profiles name their favourite drugs by prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtoId(pub i32);

/// Opaque tile index on the encounter map.
///
/// The planner never decomposes a tile; adjacency, rotation and distance
/// are answered by [`crate::env::SpatialOracle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile(pub i32);

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}", self.0)
    }
}

/// One of the six facings of a hex tile, numbered clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation(u8);

impl Rotation {
    pub const COUNT: u8 = 6;

    /// Builds a rotation, wrapping values outside `0..6`.
    pub const fn new(value: u8) -> Self {
        Self(value % Self::COUNT)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Turns clockwise by `steps` facings.
    #[must_use]
    pub const fn turned(self, steps: u8) -> Self {
        Self((self.0 + steps % Self::COUNT) % Self::COUNT)
    }

    /// The facing one step clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        self.turned(1)
    }

    /// The facing one step counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        self.turned(Self::COUNT - 1)
    }
}

/// Current and maximum value pair (hit points, action points).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self { current, maximum }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Removes `amount`, flooring at zero.
    pub fn spend(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Adds `amount`, capped at the maximum.
    pub fn restore(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.maximum);
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// `percent` of the maximum, rounded down.
    pub fn fraction(&self, percent: u32) -> u32 {
        self.maximum * percent / 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_in_both_directions() {
        let facing = Rotation::new(5);
        assert_eq!(facing.clockwise(), Rotation::new(0));
        assert_eq!(Rotation::new(0).counter_clockwise(), Rotation::new(5));
        assert_eq!(facing.turned(13), Rotation::new(0));
    }

    #[test]
    fn meter_spend_floors_at_zero() {
        let mut ap = ResourceMeter::full(3);
        ap.spend(2);
        ap.spend(2);
        assert_eq!(ap.current, 0);
        ap.restore(10);
        assert_eq!(ap.current, 3);
    }
}
