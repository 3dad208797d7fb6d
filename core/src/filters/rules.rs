//! Filter rules
//!
//! A rule is one editable setting of a list (its columns, a boolean switch,
//! a price expression...). Rules are stateless; their values live on the
//! [`FilterConfiguration`] so a single rule instance serves every list.

use std::borrow::Cow;

use tally_types::{AcquisitionReason, FilterCategory, FilterType, FilterTypes, SourceCategory};

use super::FilterConfiguration;

pub trait FilterRule {
    type Value;

    fn key(&self) -> &str;

    fn name(&self) -> &str;

    fn help_text(&self) -> &str;

    fn category(&self) -> FilterCategory;

    /// List types the rule can be edited in
    fn available_in(&self) -> FilterTypes;

    fn default_value(&self) -> Self::Value;

    fn current_value(&self, configuration: &FilterConfiguration) -> Self::Value;

    fn update_filter_configuration(
        &self,
        configuration: &mut FilterConfiguration,
        value: Self::Value,
    );

    fn reset_filter(&self, configuration: &mut FilterConfiguration) {
        self.update_filter_configuration(configuration, self.default_value());
    }

    fn has_value_set(&self, configuration: &FilterConfiguration) -> bool;

    fn is_available_in(&self, filter_type: FilterType) -> bool {
        self.available_in().contains(filter_type)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Boolean Rules
// ═══════════════════════════════════════════════════════════════════════════

/// A switch stored in `boolean_filters`. Unset means "use the default".
#[derive(Debug, Clone)]
pub struct BooleanRule {
    pub key: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub help_text: Cow<'static, str>,
    pub category: FilterCategory,
    pub available_in: FilterTypes,
    /// What an unset value means
    pub default: bool,
}

impl BooleanRule {
    /// Effective value: the stored one, or the default when unset
    pub fn enabled(&self, configuration: &FilterConfiguration) -> bool {
        self.current_value(configuration).unwrap_or(self.default)
    }
}

impl FilterRule for BooleanRule {
    type Value = Option<bool>;

    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn help_text(&self) -> &str {
        &self.help_text
    }

    fn category(&self) -> FilterCategory {
        self.category
    }

    fn available_in(&self) -> FilterTypes {
        self.available_in
    }

    fn default_value(&self) -> Option<bool> {
        None
    }

    fn current_value(&self, configuration: &FilterConfiguration) -> Option<bool> {
        configuration.boolean_filters.get(self.key.as_ref()).copied()
    }

    fn update_filter_configuration(
        &self,
        configuration: &mut FilterConfiguration,
        value: Option<bool>,
    ) {
        match value {
            Some(v) => {
                configuration.boolean_filters.insert(self.key.to_string(), v);
            }
            None => {
                configuration.boolean_filters.remove(self.key.as_ref());
            }
        }
    }

    fn has_value_set(&self, configuration: &FilterConfiguration) -> bool {
        configuration.boolean_filters.contains_key(self.key.as_ref())
    }
}

/// Free-form expression stored in `string_filters` (e.g. `<=100`)
#[derive(Debug, Clone)]
pub struct StringRule {
    pub key: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub help_text: Cow<'static, str>,
    pub category: FilterCategory,
    pub available_in: FilterTypes,
}

impl FilterRule for StringRule {
    type Value = String;

    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn help_text(&self) -> &str {
        &self.help_text
    }

    fn category(&self) -> FilterCategory {
        self.category
    }

    fn available_in(&self) -> FilterTypes {
        self.available_in
    }

    fn default_value(&self) -> String {
        String::new()
    }

    fn current_value(&self, configuration: &FilterConfiguration) -> String {
        configuration
            .string_filters
            .get(self.key.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn update_filter_configuration(&self, configuration: &mut FilterConfiguration, value: String) {
        if value.is_empty() {
            configuration.string_filters.remove(self.key.as_ref());
        } else {
            configuration.string_filters.insert(self.key.to_string(), value);
        }
    }

    fn has_value_set(&self, configuration: &FilterConfiguration) -> bool {
        configuration
            .string_filters
            .get(self.key.as_ref())
            .is_some_and(|v| !v.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Known Rules
// ═══════════════════════════════════════════════════════════════════════════

const ITEM_LISTS: FilterTypes = FilterTypes::of(&[
    FilterType::SearchFilter,
    FilterType::SortingFilter,
    FilterType::GameItemFilter,
    FilterType::CuratedList,
]);

/// Only show items marked as favourites
pub fn favourites_rule() -> BooleanRule {
    BooleanRule {
        key: Cow::Borrowed("Favourites"),
        name: Cow::Borrowed("Favourites"),
        help_text: Cow::Borrowed("Only show items that have been marked as a favourite."),
        category: FilterCategory::Basic,
        available_in: ITEM_LISTS,
        default: false,
    }
}

/// Only show items obtainable from a given source
pub fn source_category_rule(source: SourceCategory) -> BooleanRule {
    BooleanRule {
        key: Cow::Owned(format!("HasSource{source}")),
        name: Cow::Owned(format!("Source: {source}")),
        help_text: Cow::Owned(format!("Only show items that can be obtained via {source}.")),
        category: FilterCategory::Acquisition,
        available_in: ITEM_LISTS,
        default: false,
    }
}

/// Price the item can be bought from a vendor for, as a comparison expression
pub fn buy_from_vendor_price_rule() -> StringRule {
    StringRule {
        key: Cow::Borrowed("BuyFromVendorPrice"),
        name: Cow::Borrowed("Buy from Vendor Price"),
        help_text: Cow::Borrowed(
            "The price when bought from a vendor. Supports !, <, >, <=, >= and ranges.",
        ),
        category: FilterCategory::Acquisition,
        available_in: ITEM_LISTS,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Craft Tracking Toggles
// ═══════════════════════════════════════════════════════════════════════════

/// Per-acquisition-reason switches deciding which item gains count towards a
/// craft list. Every reason is tracked unless switched off on the list.
#[derive(Debug, Clone)]
pub struct TrackingToggles {
    rules: [BooleanRule; 6],
}

impl Default for TrackingToggles {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingToggles {
    pub fn new() -> Self {
        Self {
            rules: AcquisitionReason::ALL.map(tracking_rule),
        }
    }

    pub fn rule(&self, reason: AcquisitionReason) -> &BooleanRule {
        &self.rules[reason_index(reason)]
    }

    /// Whether items gained for `reason` count towards the list
    pub fn tracks(&self, reason: AcquisitionReason, configuration: &FilterConfiguration) -> bool {
        self.rule(reason).enabled(configuration)
    }

    pub fn set_tracking(
        &self,
        reason: AcquisitionReason,
        configuration: &mut FilterConfiguration,
        track: bool,
    ) {
        self.rule(reason)
            .update_filter_configuration(configuration, Some(track));
    }

    pub fn iter(&self) -> impl Iterator<Item = (AcquisitionReason, &BooleanRule)> {
        AcquisitionReason::ALL.into_iter().zip(self.rules.iter())
    }
}

fn reason_index(reason: AcquisitionReason) -> usize {
    match reason {
        AcquisitionReason::Crafting => 0,
        AcquisitionReason::Gathering => 1,
        AcquisitionReason::Shopping => 2,
        AcquisitionReason::CombatDrop => 3,
        AcquisitionReason::Other => 4,
        AcquisitionReason::Marketboard => 5,
    }
}

fn tracking_rule(reason: AcquisitionReason) -> BooleanRule {
    let (key, name) = match reason {
        AcquisitionReason::Crafting => ("CraftTrackerTrackCrafts", "Track Crafts"),
        AcquisitionReason::Gathering => ("CraftTrackerTrackGathering", "Track Gathering"),
        AcquisitionReason::Shopping => ("CraftTrackerTrackShopping", "Track Shopping"),
        AcquisitionReason::CombatDrop => ("CraftTrackerTrackCombatDrop", "Track Combat Drops"),
        AcquisitionReason::Other => ("CraftTrackerTrackOther", "Track Other"),
        AcquisitionReason::Marketboard => ("CraftTrackerTrackMarketBoard", "Track Marketboard"),
    };
    BooleanRule {
        key: Cow::Borrowed(key),
        name: Cow::Borrowed(name),
        help_text: Cow::Owned(format!(
            "Should items acquired through {reason} count towards this craft list?"
        )),
        category: FilterCategory::CraftTracking,
        available_in: FilterTypes::of(&[FilterType::CraftFilter]),
        default: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::CraftListMode;

    #[test]
    fn test_tracking_defaults_to_true() {
        let toggles = TrackingToggles::new();
        let list = FilterConfiguration::new_craft_list("Goal", CraftListMode::Normal);
        for reason in AcquisitionReason::ALL {
            assert!(toggles.tracks(reason, &list));
            assert!(!toggles.rule(reason).has_value_set(&list));
        }
    }

    #[test]
    fn test_tracking_switch_is_per_reason() {
        let toggles = TrackingToggles::new();
        let mut list = FilterConfiguration::new_craft_list("Goal", CraftListMode::Normal);
        toggles.set_tracking(AcquisitionReason::Gathering, &mut list, false);

        assert!(!toggles.tracks(AcquisitionReason::Gathering, &list));
        assert!(toggles.tracks(AcquisitionReason::Shopping, &list));
        assert_eq!(
            list.boolean_filters.get("CraftTrackerTrackGathering"),
            Some(&false)
        );

        toggles.rule(AcquisitionReason::Gathering).reset_filter(&mut list);
        assert!(toggles.tracks(AcquisitionReason::Gathering, &list));
    }

    #[test]
    fn test_rule_keys_are_distinct() {
        let toggles = TrackingToggles::new();
        let mut keys: Vec<&str> = toggles.iter().map(|(_, r)| r.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
        assert!(toggles.iter().all(|(_, r)| r.is_available_in(FilterType::CraftFilter)));
        assert!(toggles.iter().all(|(_, r)| !r.is_available_in(FilterType::SearchFilter)));
    }

    #[test]
    fn test_string_rule_empty_clears() {
        let rule = buy_from_vendor_price_rule();
        let mut list = FilterConfiguration::new("Cheap", FilterType::SearchFilter);
        rule.update_filter_configuration(&mut list, "<=100".to_string());
        assert!(rule.has_value_set(&list));
        assert_eq!(rule.current_value(&list), "<=100");

        rule.reset_filter(&mut list);
        assert!(!rule.has_value_set(&list));
        assert!(list.string_filters.is_empty());
    }

    #[test]
    fn test_source_category_rule_key() {
        let rule = source_category_rule(SourceCategory::Shop);
        assert_eq!(rule.key(), "HasSourceShop");
        let mut list = FilterConfiguration::new("Shop", FilterType::SearchFilter);
        assert!(!rule.enabled(&list));
        rule.update_filter_configuration(&mut list, Some(true));
        assert!(rule.enabled(&list));
    }
}
