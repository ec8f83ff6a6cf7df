/// Static rules configuration passed to the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RulesConfig {
    /// Attribute keys that describe an item and are never inherited by the
    /// character owning it. Used by the `ActorInheritable` attribute filter.
    pub item_only_attributes: Vec<String>,

    /// Upper bound on nested owned-entity prerequisite checks.
    pub max_prerequisite_depth: usize,
}

impl RulesConfig {
    // ===== defaults =====
    pub const DEFAULT_ITEM_ONLY_ATTRIBUTES: &'static [&'static str] = &[
        "damage",
        "stunDamage",
        "damageType",
        "stunSetting",
        "toHitModifier",
        "ammo",
        "hands",
        "weaponRange",
        "rateOfFire",
        "upgradeSlots",
        "upgradePoints",
        "cost",
        "weight",
        "size",
    ];
    pub const DEFAULT_MAX_PREREQUISITE_DEPTH: usize = 32;

    pub fn new() -> Self {
        Self {
            item_only_attributes: Self::DEFAULT_ITEM_ONLY_ATTRIBUTES
                .iter()
                .map(|key| (*key).to_owned())
                .collect(),
            max_prerequisite_depth: Self::DEFAULT_MAX_PREREQUISITE_DEPTH,
        }
    }

    pub fn is_item_only(&self, key: &str) -> bool {
        self.item_only_attributes.iter().any(|denied| denied == key)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}
