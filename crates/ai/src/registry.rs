//! Behavior Profile Store.
//!
//! [`BehaviorRegistry`] owns every loaded [`BehaviorProfile`] for the life of
//! the process. Lookups never fail: an unknown id resolves to the profile
//! loaded first, which acts as the designated fallback.
//!
//! The setters mirror what scripts are allowed to change at runtime. They
//! take the raw script value and reject anything outside the setting's
//! range, leaving the profile untouched.

use std::collections::HashMap;

use combat_core::{
    AreaAttackMode, AttackWho, BehaviorProfile, BestWeapon, ChemUse, CombatantState, Disposition,
    DistancePref, ProfileId, ProfileOverride, ProfileSetting, RunAwayMode, SettingError,
};

use crate::error::RegistryError;

/// Process-scoped store of behavior profiles keyed by [`ProfileId`].
#[derive(Clone, Debug)]
pub struct BehaviorRegistry {
    profiles: Vec<BehaviorProfile>,
    index: HashMap<ProfileId, usize>,
}

impl BehaviorRegistry {
    /// Index of the fallback profile.
    pub const FALLBACK: usize = 0;

    /// Builds the registry. The first profile becomes the fallback.
    pub fn new(profiles: Vec<BehaviorProfile>) -> Result<Self, RegistryError> {
        if profiles.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut index = HashMap::with_capacity(profiles.len());
        for (position, profile) in profiles.iter().enumerate() {
            if index.insert(profile.id, position).is_some() {
                return Err(RegistryError::Duplicate(profile.id));
            }
        }

        Ok(Self { profiles, index })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, id: ProfileId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorProfile> {
        self.profiles.iter()
    }

    pub fn fallback(&self) -> &BehaviorProfile {
        &self.profiles[Self::FALLBACK]
    }

    /// Resolves a profile id, falling back to the default profile.
    pub fn get(&self, id: ProfileId) -> &BehaviorProfile {
        &self.profiles[self.position(id)]
    }

    /// Resolves the profile a combatant is currently bound to.
    pub fn for_combatant(&self, combatant: &CombatantState) -> &BehaviorProfile {
        self.get(combatant.profile)
    }

    fn position(&self, id: ProfileId) -> usize {
        match self.index.get(&id) {
            Some(position) => *position,
            None => {
                tracing::warn!(
                    "{} not found, using fallback profile '{}'",
                    id,
                    self.profiles[Self::FALLBACK].name
                );
                Self::FALLBACK
            }
        }
    }

    fn profile_mut(&mut self, combatant: &CombatantState) -> &mut BehaviorProfile {
        let position = self.position(combatant.profile);
        &mut self.profiles[position]
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn area_attack_mode(&self, combatant: &CombatantState) -> Option<AreaAttackMode> {
        self.for_combatant(combatant).area_attack_mode
    }

    /// Configured run-away bucket, or the one implied by the profile's
    /// `min_hp` for this combatant's maximum HP.
    pub fn run_away_mode(&self, combatant: &CombatantState) -> Option<RunAwayMode> {
        self.for_combatant(combatant)
            .effective_run_away_mode(combatant.hp.maximum)
    }

    pub fn best_weapon(&self, combatant: &CombatantState) -> Option<BestWeapon> {
        self.for_combatant(combatant).best_weapon
    }

    pub fn distance(&self, combatant: &CombatantState) -> Option<DistancePref> {
        self.for_combatant(combatant).distance
    }

    pub fn attack_who(&self, combatant: &CombatantState) -> Option<AttackWho> {
        self.for_combatant(combatant).attack_who
    }

    pub fn chem_use(&self, combatant: &CombatantState) -> Option<ChemUse> {
        self.for_combatant(combatant).chem_use
    }

    pub fn disposition(&self, combatant: &CombatantState) -> Option<Disposition> {
        self.for_combatant(combatant).disposition
    }

    // ========================================================================
    // Setters
    // ========================================================================

    pub fn set_distance(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let distance = validate::<DistancePref>("distance", value)?;
        self.profile_mut(combatant).distance = Some(distance);
        Ok(())
    }

    pub fn set_best_weapon(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let best_weapon = validate::<BestWeapon>("best_weapon", value)?;
        self.profile_mut(combatant).best_weapon = Some(best_weapon);
        Ok(())
    }

    pub fn set_attack_who(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let attack_who = validate::<AttackWho>("attack_who", value)?;
        self.profile_mut(combatant).attack_who = Some(attack_who);
        Ok(())
    }

    pub fn set_chem_use(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let chem_use = validate::<ChemUse>("chem_use", value)?;
        self.profile_mut(combatant).chem_use = Some(chem_use);
        Ok(())
    }

    pub fn set_area_attack_mode(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let mode = validate::<AreaAttackMode>("area_attack_mode", value)?;
        self.profile_mut(combatant).area_attack_mode = Some(mode);
        Ok(())
    }

    /// Sets the run-away bucket and recomputes `min_hp` from the
    /// combatant's maximum HP, so the morale check uses the new bucket.
    pub fn set_run_away_mode(
        &mut self,
        combatant: &CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let mode = validate::<RunAwayMode>("run_away_mode", value)?;
        let min_hp = mode.min_hp(combatant.hp.maximum);
        let profile = self.profile_mut(combatant);
        profile.run_away_mode = Some(mode);
        profile.min_hp = i32::try_from(min_hp).unwrap_or(i32::MAX);
        Ok(())
    }

    /// Rebinds a party member to the sibling profile of another tier.
    ///
    /// Tiers of one companion use consecutive ids counting down from the
    /// `custom` tier, so the new id is the current id shifted by the
    /// difference between the tiers.
    pub fn set_disposition(
        &self,
        combatant: &mut CombatantState,
        value: i32,
    ) -> Result<(), SettingError> {
        let requested = validate::<Disposition>("disposition", value)?;
        let not_party = SettingError::NotAPartyMember {
            combatant: combatant.id,
        };
        if !combatant.party_member {
            return Err(not_party);
        }

        let profile = self.for_combatant(combatant);
        let current = profile.disposition.ok_or(not_party)?;
        let sibling = ProfileId(profile.id.0 - (requested.index() - current.index()));
        if !self.contains(sibling) {
            tracing::warn!(
                "{} switches to missing {} for disposition {}",
                combatant.id,
                sibling,
                requested
            );
        }

        tracing::debug!(
            "{} disposition {} -> {} ({})",
            combatant.id,
            current,
            requested,
            sibling
        );
        combatant.profile = sibling;
        Ok(())
    }

    // ========================================================================
    // Party overrides
    // ========================================================================

    /// Override records for the given party, in party order.
    ///
    /// Only companions on their `custom` tier carry player edits, so only
    /// those profiles are exported.
    pub fn party_overrides(&self, party: &[ProfileId]) -> Vec<ProfileOverride> {
        party
            .iter()
            .map(|id| self.get(*id))
            .filter(|profile| profile.disposition == Some(Disposition::Custom))
            .map(ProfileOverride::from)
            .collect()
    }

    /// Restores override records read from a save.
    ///
    /// Returns how many records matched a loaded profile.
    pub fn apply_overrides(&mut self, records: &[ProfileOverride]) -> usize {
        let mut applied = 0;
        for record in records {
            match self.index.get(&record.id()) {
                Some(position) => {
                    self.profiles[*position].apply_override(record);
                    applied += 1;
                }
                None => tracing::warn!("override for unknown {} ignored", record.id()),
            }
        }
        applied
    }
}

fn validate<T: ProfileSetting>(setting: &'static str, value: i32) -> Result<T, SettingError> {
    T::from_index(value).ok_or(SettingError::OutOfRange {
        setting,
        value,
        limit: T::count(),
    })
}

#[cfg(test)]
mod tests {
    use combat_core::{CombatantId, TeamId, Tile};
    use strum::VariantArray;

    use super::*;

    fn profile(name: &str, id: i32) -> BehaviorProfile {
        BehaviorProfile::new(name, ProfileId(id))
    }

    fn companion_family() -> Vec<BehaviorProfile> {
        let mut profiles = vec![profile("Default", 0)];
        for (offset, disposition) in Disposition::VARIANTS.iter().enumerate() {
            let mut tier = profile(disposition.as_ref(), 1600 - offset as i32);
            tier.disposition = Some(*disposition);
            profiles.push(tier);
        }
        profiles
    }

    fn critter(profile: i32) -> CombatantState {
        CombatantState::new(CombatantId(5), TeamId(1), ProfileId(profile), Tile(0))
    }

    #[test]
    fn unknown_id_resolves_to_fallback() {
        let registry = BehaviorRegistry::new(vec![profile("Default", 3), profile("Guard", 9)])
            .unwrap();
        assert_eq!(registry.get(ProfileId(12345)).name, "Default");
        assert_eq!(registry.get(ProfileId(9)).name, "Guard");
    }

    #[test]
    fn empty_and_duplicate_registries_are_rejected() {
        assert_eq!(
            BehaviorRegistry::new(Vec::new()).unwrap_err(),
            RegistryError::Empty
        );
        let error = BehaviorRegistry::new(vec![profile("A", 1), profile("B", 1)]).unwrap_err();
        assert_eq!(error, RegistryError::Duplicate(ProfileId(1)));
    }

    #[test]
    fn setters_reject_out_of_range_values() {
        let mut registry = BehaviorRegistry::new(vec![profile("Guard", 1)]).unwrap();
        let guard = critter(1);

        assert!(registry.set_attack_who(&guard, 5).is_err());
        assert!(registry.set_attack_who(&guard, -1).is_err());
        assert!(registry.set_best_weapon(&guard, 8).is_err());
        assert!(registry.set_chem_use(&guard, 6).is_err());
        assert!(registry.set_area_attack_mode(&guard, 5).is_err());
        assert!(registry.set_distance(&guard, 5).is_err());
        assert_eq!(registry.attack_who(&guard), None);

        registry.set_attack_who(&guard, 2).unwrap();
        assert_eq!(registry.attack_who(&guard), Some(AttackWho::Weakest));
        registry.set_distance(&guard, 4).unwrap();
        assert_eq!(registry.distance(&guard), Some(DistancePref::Stay));
    }

    #[test]
    fn run_away_mode_recomputes_min_hp() {
        let mut registry = BehaviorRegistry::new(vec![profile("Guard", 1)]).unwrap();
        let guard = critter(1).with_hp(40, 50);

        registry.set_run_away_mode(&guard, 2).unwrap();
        let stored = registry.get(ProfileId(1));
        assert_eq!(stored.min_hp, 50 - 50 * 40 / 100);
        assert_eq!(registry.run_away_mode(&guard), Some(RunAwayMode::Bleeding));

        let before = registry.get(ProfileId(1)).clone();
        assert!(registry.set_run_away_mode(&guard, 6).is_err());
        assert_eq!(registry.get(ProfileId(1)), &before);
    }

    #[test]
    fn disposition_switches_to_sibling_profile() {
        let registry = BehaviorRegistry::new(companion_family()).unwrap();
        let mut dog = critter(1600).in_party();

        registry.set_disposition(&mut dog, 4).unwrap();
        assert_eq!(dog.profile, ProfileId(1596));
        assert_eq!(registry.disposition(&dog), Some(Disposition::Berserk));

        registry.set_disposition(&mut dog, 1).unwrap();
        assert_eq!(dog.profile, ProfileId(1599));

        assert!(registry.set_disposition(&mut dog, 5).is_err());
        assert_eq!(dog.profile, ProfileId(1599));
    }

    #[test]
    fn disposition_requires_party_member() {
        let registry = BehaviorRegistry::new(companion_family()).unwrap();
        let mut stranger = critter(1600);
        assert_eq!(
            registry.set_disposition(&mut stranger, 2),
            Err(SettingError::NotAPartyMember {
                combatant: CombatantId(5)
            })
        );
    }

    #[test]
    fn only_custom_tiers_are_exported() {
        let mut registry = BehaviorRegistry::new(companion_family()).unwrap();
        let records = registry.party_overrides(&[ProfileId(1598), ProfileId(1600)]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].packet_num, 1600);

        let mut edited = records[0];
        edited.min_hp = 17;
        assert_eq!(registry.apply_overrides(&[edited]), 1);
        assert_eq!(registry.get(ProfileId(1600)).min_hp, 17);
    }
}
