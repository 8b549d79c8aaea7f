//! Behavior profile loader.
//!
//! Profiles live in one section-keyed text file:
//!
//! ```text
//! ; comment
//! [Raider Leader]
//! packet_num=12
//! max_dist=8
//! attack_who=strongest
//! hurt_too_much=blind,crippled_legs
//! chem_primary_desire=40,81
//! ```
//!
//! Every integer key is mandatory; a missing or malformed one aborts the
//! whole load. Unknown enum strings leave the setting unset and are logged.

use std::path::Path;
use std::str::FromStr;

use combat_core::{
    AreaAttackMode, AttackWho, BehaviorProfile, BestWeapon, ChemUse, CombatConfig, DamageFlags,
    Disposition, DistancePref, HitLocation, HurtTooMuch, MessageRange, ProfileId, ProtoId,
    RunAwayMode,
};

use crate::loaders::{LoadResult, read_file};

/// Loader for the behavior profile file.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load every profile from a file, in file order.
    pub fn load(path: &Path) -> LoadResult<Vec<BehaviorProfile>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load profiles {}: {}", path.display(), e))
    }

    /// Parse profile text.
    pub fn parse(source: &str) -> LoadResult<Vec<BehaviorProfile>> {
        let sections = parse_sections(source)?;
        if sections.is_empty() {
            anyhow::bail!("no profile sections found");
        }
        sections.iter().map(Section::build_profile).collect()
    }
}

struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

fn parse_sections(source: &str) -> LoadResult<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();

    for (number, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| anyhow::anyhow!("line {}: unterminated section header", number + 1))?
                .trim();
            sections.push(Section {
                name: name.to_string(),
                entries: Vec::new(),
            });
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("line {}: expected key=value", number + 1))?;
        let section = sections
            .last_mut()
            .ok_or_else(|| anyhow::anyhow!("line {}: entry outside of a section", number + 1))?;
        section
            .entries
            .push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    Ok(sections)
}

fn strip_comment(line: &str) -> &str {
    let line = line.split(';').next().unwrap_or_default();
    if line.trim_start().starts_with('#') {
        ""
    } else {
        line
    }
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn int(&self, key: &str) -> LoadResult<i32> {
        let value = self
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("[{}] is missing integer key '{}'", self.name, key))?;
        value.parse().map_err(|_| {
            anyhow::anyhow!(
                "[{}] key '{}' is not an integer: '{}'",
                self.name,
                key,
                value
            )
        })
    }

    fn range(&self, prefix: &str) -> LoadResult<MessageRange> {
        Ok(MessageRange::new(
            self.int(&format!("{prefix}_start"))?,
            self.int(&format!("{prefix}_end"))?,
        ))
    }

    fn setting<T: FromStr>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match T::from_str(value) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                if !value.eq_ignore_ascii_case("none") {
                    tracing::warn!("[{}] unrecognized {} '{}'", self.name, key, value);
                }
                None
            }
        }
    }

    fn hurt_mask(&self) -> DamageFlags {
        let Some(value) = self.get("hurt_too_much") else {
            return DamageFlags::empty();
        };
        value
            .split(',')
            .map(str::trim)
            .filter(|flag| !flag.is_empty())
            .fold(DamageFlags::empty(), |mask, flag| {
                match HurtTooMuch::from_str(flag) {
                    Ok(hurt) => mask | hurt.mask(),
                    Err(_) => {
                        tracing::warn!("[{}] unrecognized flag: {}", self.name, flag);
                        mask
                    }
                }
            })
    }

    fn primary_desires(&self, profile: &mut BehaviorProfile) -> LoadResult<()> {
        let Some(value) = self.get("chem_primary_desire") else {
            return Ok(());
        };
        for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let proto: i32 = item.parse().map_err(|_| {
                anyhow::anyhow!(
                    "[{}] chem_primary_desire entry is not an integer: '{}'",
                    self.name,
                    item
                )
            })?;
            if proto < 0 {
                continue;
            }
            if profile.chem_primary_desire.try_push(ProtoId(proto)).is_err() {
                tracing::warn!(
                    "[{}] more than {} primary desires, ignoring {}",
                    self.name,
                    CombatConfig::MAX_PRIMARY_DESIRES,
                    proto
                );
            }
        }
        Ok(())
    }

    fn build_profile(&self) -> LoadResult<BehaviorProfile> {
        let mut profile = BehaviorProfile::new(&self.name, ProfileId(self.int("packet_num")?));

        profile.max_dist = self.int("max_dist")?;
        profile.min_to_hit = self.int("min_to_hit")?;
        profile.min_hp = self.int("min_hp")?;
        profile.aggression = self.int("aggression")?;
        profile.hurt_too_much = self.hurt_mask();
        profile.secondary_freq = self.int("secondary_freq")?;
        profile.called_freq = self.int("called_freq")?;
        profile.font = self.int("font")?;
        profile.color = self.int("color")?;
        profile.outline_color = self.int("outline_color")?;
        profile.chance = self.int("chance")?;

        profile.taunts.run = self.range("run")?;
        profile.taunts.movement = self.range("move")?;
        profile.taunts.attack = self.range("attack")?;
        profile.taunts.miss = self.range("miss")?;
        for (slot, location) in HitLocation::SPECIFIC.iter().enumerate() {
            profile.taunts.hit[slot] = self.range(&format!("hit_{}", location.config_key()))?;
        }
        // Stored one past the configured end; saves carry the stored value.
        profile.taunts.hit[HitLocation::Groin.message_slot()].end += 1;

        profile.area_attack_mode = self.setting::<AreaAttackMode>("area_attack_mode");
        profile.run_away_mode = self.setting::<RunAwayMode>("run_away_mode");
        profile.best_weapon = self.setting::<BestWeapon>("best_weapon");
        profile.distance = self.setting::<DistancePref>("distance");
        profile.attack_who = self.setting::<AttackWho>("attack_who");
        profile.chem_use = self.setting::<ChemUse>("chem_use");
        self.primary_desires(&mut profile)?;
        profile.disposition = self.setting::<Disposition>("disposition");
        profile.body_type = self.get("body_type").map(str::to_string);
        profile.general_type = self.get("general_type").map(str::to_string);

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, packet: i32, extra: &str) -> String {
        let mut text = format!(
            "[{name}]\npacket_num={packet}\nmax_dist=8\nmin_to_hit=40\nmin_hp=10\naggression=50\n\
             secondary_freq=4\ncalled_freq=6\nfont=101\ncolor=2\noutline_color=0\nchance=30\n\
             run_start=100\nrun_end=104\nmove_start=110\nmove_end=112\nattack_start=120\n\
             attack_end=125\nmiss_start=130\nmiss_end=132\n"
        );
        for (index, location) in HitLocation::SPECIFIC.iter().enumerate() {
            let base = 200 + 10 * index as i32;
            text.push_str(&format!(
                "hit_{key}_start={base}\nhit_{key}_end={end}\n",
                key = location.config_key(),
                end = base + 2
            ));
        }
        text.push_str(extra);
        text
    }

    #[test]
    fn parses_numeric_fields_and_enums() {
        let source = section(
            "Raider",
            12,
            "area_attack_mode=be_careful\nbest_weapon=ranged_over_melee\ndistance=snipe\n\
             attack_who=Weakest\nchem_use=stims_when_hurt_lots\nrun_away_mode=bleeding\n\
             hurt_too_much=blind, crippled_legs\nchem_primary_desire=40,81\n\
             body_type=Biped ; comment\n",
        );
        let profiles = ProfileLoader::parse(&source).unwrap();
        let raider = &profiles[0];

        assert_eq!(raider.name, "Raider");
        assert_eq!(raider.id, ProfileId(12));
        assert_eq!(raider.min_to_hit, 40);
        assert_eq!(raider.taunts.run, MessageRange::new(100, 104));
        assert_eq!(raider.area_attack_mode, Some(AreaAttackMode::BeCareful));
        assert_eq!(raider.attack_who, Some(AttackWho::Weakest));
        assert_eq!(raider.run_away_mode, Some(RunAwayMode::Bleeding));
        assert_eq!(
            raider.hurt_too_much,
            DamageFlags::BLIND | DamageFlags::CRIP_LEGS
        );
        assert_eq!(
            raider.chem_primary_desire.as_slice(),
            &[ProtoId(40), ProtoId(81)]
        );
        assert_eq!(raider.body_type.as_deref(), Some("Biped"));
    }

    #[test]
    fn groin_end_is_stored_one_higher() {
        let profiles = ProfileLoader::parse(&section("Dog", 3, "")).unwrap();
        let groin = profiles[0].taunts.hit[HitLocation::Groin.message_slot()];
        assert_eq!(groin, MessageRange::new(270, 273));
        let head = profiles[0].taunts.hit[HitLocation::Head.message_slot()];
        assert_eq!(head, MessageRange::new(200, 202));
    }

    #[test]
    fn unknown_enum_leaves_setting_unset() {
        let source = section("Odd", 4, "attack_who=everyone\ndisposition=none\n");
        let profiles = ProfileLoader::parse(&source).unwrap();
        assert_eq!(profiles[0].attack_who, None);
        assert_eq!(profiles[0].disposition, None);
    }

    #[test]
    fn missing_integer_aborts_load() {
        let source = section("Good", 1, "") + &section("Broken", 2, "").replace("chance=30\n", "");
        let error = ProfileLoader::parse(&source).unwrap_err().to_string();
        assert!(error.contains("[Broken]"), "{error}");
        assert!(error.contains("chance"), "{error}");
    }

    #[test]
    fn malformed_integer_aborts_load() {
        let source = section("Bad", 1, "").replace("max_dist=8", "max_dist=far");
        assert!(ProfileLoader::parse(&source).is_err());
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(ProfileLoader::parse("; nothing here\n").is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai.txt");
        std::fs::write(&path, section("Guard", 7, "")).unwrap();
        let profiles = ProfileLoader::load(&path).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, ProfileId(7));
    }
}
