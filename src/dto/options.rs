use serde::Deserialize;
use validator::Validate;

use crate::dao::models::{OptionUpdate, OptionsPatch, SwitchingMode};
use crate::dto::validation::{validate_group_sizes, validate_proportion, validate_tracks};

/// Partial options update as received from an admin client.
///
/// Absent fields are left untouched. The group count, the switch counter and
/// the clock have dedicated operations and cannot be set here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OptionalOptions {
    /// Seconds per project, at least 1.
    #[validate(range(min = 1))]
    pub judging_timer: Option<i64>,
    /// Minimum views per project.
    #[validate(range(min = 0))]
    pub min_views: Option<i64>,
    /// Propagate clock changes to storage.
    pub clock_sync: Option<bool>,
    /// Judge by track.
    pub judge_tracks: Option<bool>,
    /// Track names, non-blank and unique.
    #[validate(custom(function = "validate_tracks"))]
    pub tracks: Option<Vec<String>>,
    /// Split projects across groups.
    pub multi_group: Option<bool>,
    /// Capacity per group, each at least 1.
    #[validate(custom(function = "validate_group_sizes"))]
    pub group_sizes: Option<Vec<i64>>,
    /// Group switching policy.
    pub switching_mode: Option<SwitchingMode>,
    /// Proportion of a group seen before an automatic switch, in `[0, 1]`.
    #[validate(custom(function = "validate_proportion_by_value"))]
    pub auto_switch_prop: Option<f64>,
}

// The validator derive passes `Copy` fields by value.
fn validate_proportion_by_value(value: f64) -> Result<(), validator::ValidationError> {
    validate_proportion(&value)
}

impl From<OptionalOptions> for OptionsPatch {
    fn from(value: OptionalOptions) -> Self {
        let OptionalOptions {
            judging_timer,
            min_views,
            clock_sync,
            judge_tracks,
            tracks,
            multi_group,
            group_sizes,
            switching_mode,
            auto_switch_prop,
        } = value;

        let updates = [
            judging_timer.map(OptionUpdate::JudgingTimer),
            min_views.map(OptionUpdate::MinViews),
            clock_sync.map(OptionUpdate::ClockSync),
            judge_tracks.map(OptionUpdate::JudgeTracks),
            tracks.map(OptionUpdate::Tracks),
            multi_group.map(OptionUpdate::MultiGroup),
            group_sizes.map(OptionUpdate::GroupSizes),
            switching_mode.map(OptionUpdate::SwitchingMode),
            auto_switch_prop.map(OptionUpdate::AutoSwitchProp),
        ];

        updates
            .into_iter()
            .flatten()
            .fold(OptionsPatch::new(), OptionsPatch::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_produce_empty_patch() {
        let request: OptionalOptions = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_ok());
        assert!(OptionsPatch::from(request).is_empty());
    }

    #[test]
    fn present_fields_become_updates() {
        let request: OptionalOptions =
            serde_json::from_str(r#"{"min_views": 4, "switching_mode": "manual"}"#).unwrap();
        let patch = OptionsPatch::from(request);

        assert_eq!(
            patch,
            OptionsPatch::new()
                .with(OptionUpdate::MinViews(4))
                .with(OptionUpdate::SwitchingMode(SwitchingMode::Manual))
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let request = OptionalOptions {
            auto_switch_prop: Some(1.5),
            ..OptionalOptions::default()
        };
        assert!(request.validate().is_err());

        let request = OptionalOptions {
            auto_switch_prop: Some(f64::NAN),
            ..OptionalOptions::default()
        };
        assert!(request.validate().is_err());

        let request = OptionalOptions {
            judging_timer: Some(0),
            ..OptionalOptions::default()
        };
        assert!(request.validate().is_err());

        let request = OptionalOptions {
            group_sizes: Some(vec![30, 0]),
            ..OptionalOptions::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn counters_cannot_be_set_through_partial_update() {
        let result = serde_json::from_str::<OptionalOptions>(r#"{"manual_switches": 3}"#);
        assert!(result.is_err());
    }
}
