//! Update documents for the `options` collection.
//!
//! The collection holds a single document and every query uses the empty
//! filter, so deployments created by earlier releases keep working.

use mongodb::bson::{Bson, Document, doc};

use crate::{
    dao::models::{OptionUpdate, OptionsPatch},
    state::clock::ClockState,
};

/// Filter matching the one options document.
pub fn singleton_filter() -> Document {
    doc! {}
}

/// `$set` document for the fields carried by `patch`.
pub fn set_fields_update(patch: OptionsPatch) -> Document {
    let mut fields = Document::new();
    for update in patch {
        let key = update.field();
        fields.insert(key, update_value(update));
    }
    doc! { "$set": fields }
}

/// `$set` document replacing the embedded clock.
pub fn set_clock_update(clock: &ClockState) -> Document {
    doc! {
        "$set": {
            "clock": {
                "start_time": clock.start_time,
                "pause_time": clock.pause_time,
                "running": clock.running,
            }
        }
    }
}

/// `$set` document writing the group count and sizes together.
pub fn set_group_layout_update(num_groups: i64, group_sizes: Vec<i64>) -> Document {
    doc! {
        "$set": {
            "num_groups": num_groups,
            "group_sizes": group_sizes,
        }
    }
}

/// `$inc` document bumping the manual switch counter.
pub fn increment_manual_switches_update() -> Document {
    doc! { "$inc": { "manual_switches": 1_i64 } }
}

fn update_value(update: OptionUpdate) -> Bson {
    match update {
        OptionUpdate::JudgingTimer(value) | OptionUpdate::MinViews(value) => Bson::Int64(value),
        OptionUpdate::ClockSync(value)
        | OptionUpdate::JudgeTracks(value)
        | OptionUpdate::MultiGroup(value) => Bson::Boolean(value),
        OptionUpdate::Tracks(tracks) => Bson::Array(tracks.into_iter().map(Bson::String).collect()),
        OptionUpdate::GroupSizes(sizes) => Bson::Array(sizes.into_iter().map(Bson::Int64).collect()),
        OptionUpdate::SwitchingMode(mode) => Bson::String(mode.as_str().to_owned()),
        OptionUpdate::AutoSwitchProp(value) => Bson::Double(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::SwitchingMode;

    #[test]
    fn set_fields_only_lists_present_fields() {
        let patch = OptionsPatch::new()
            .with(OptionUpdate::MinViews(4))
            .with(OptionUpdate::Tracks(vec!["hardware".into()]))
            .with(OptionUpdate::SwitchingMode(SwitchingMode::Manual));

        assert_eq!(
            set_fields_update(patch),
            doc! {
                "$set": {
                    "min_views": 4_i64,
                    "tracks": ["hardware"],
                    "switching_mode": "manual",
                }
            }
        );
    }

    #[test]
    fn empty_patch_yields_empty_set() {
        assert_eq!(set_fields_update(OptionsPatch::new()), doc! { "$set": {} });
    }

    #[test]
    fn clock_is_set_as_embedded_document() {
        let clock = ClockState {
            start_time: 10,
            pause_time: 20,
            running: true,
        };
        assert_eq!(
            set_clock_update(&clock),
            doc! { "$set": { "clock": { "start_time": 10_i64, "pause_time": 20_i64, "running": true } } }
        );
    }

    #[test]
    fn manual_switches_use_increment() {
        assert_eq!(
            increment_manual_switches_update(),
            doc! { "$inc": { "manual_switches": 1_i64 } }
        );
    }
}
