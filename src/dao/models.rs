use serde::{Deserialize, Serialize};

use crate::state::clock::ClockState;

/// Capacity given to a group created by a group-count change.
pub const DEFAULT_GROUP_SIZE: i64 = 30;

/// How judges are moved between groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchingMode {
    /// Judges switch automatically once enough of their group has been seen.
    #[default]
    Auto,
    /// Judges only switch when an admin triggers it.
    Manual,
}

impl SwitchingMode {
    /// Storage representation of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchingMode::Auto => "auto",
            SwitchingMode::Manual => "manual",
        }
    }
}

/// Singleton configuration record of a judging event.
///
/// Missing fields in a persisted record fall back to [`Options::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Seconds a judge gets per project.
    pub judging_timer: i64,
    /// Minimum number of times each project should be seen.
    pub min_views: i64,
    /// Whether clock changes are propagated to storage.
    pub clock_sync: bool,
    /// Whether judging is split by tracks.
    pub judge_tracks: bool,
    /// Track names available for judging.
    pub tracks: Vec<String>,
    /// Whether projects are split across several groups.
    pub multi_group: bool,
    /// Number of judging groups.
    pub num_groups: i64,
    /// Capacity of each group, in group order.
    pub group_sizes: Vec<i64>,
    /// Group switching policy.
    pub switching_mode: SwitchingMode,
    /// Proportion of a group a judge must see before an automatic switch.
    pub auto_switch_prop: f64,
    /// Number of admin-triggered switches so far.
    pub manual_switches: i64,
    /// Judging clock.
    pub clock: ClockState,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            judging_timer: 300,
            min_views: 3,
            clock_sync: false,
            judge_tracks: false,
            tracks: Vec::new(),
            multi_group: false,
            num_groups: 3,
            group_sizes: vec![DEFAULT_GROUP_SIZE; 3],
            switching_mode: SwitchingMode::Auto,
            auto_switch_prop: 0.1,
            manual_switches: 0,
            clock: ClockState::new(),
        }
    }
}

/// New value for a single options field.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionUpdate {
    /// Replace `judging_timer`.
    JudgingTimer(i64),
    /// Replace `min_views`.
    MinViews(i64),
    /// Replace `clock_sync`.
    ClockSync(bool),
    /// Replace `judge_tracks`.
    JudgeTracks(bool),
    /// Replace `tracks`.
    Tracks(Vec<String>),
    /// Replace `multi_group`.
    MultiGroup(bool),
    /// Replace `group_sizes`.
    GroupSizes(Vec<i64>),
    /// Replace `switching_mode`.
    SwitchingMode(SwitchingMode),
    /// Replace `auto_switch_prop`.
    AutoSwitchProp(f64),
}

impl OptionUpdate {
    /// Storage key of the field this update targets.
    pub fn field(&self) -> &'static str {
        match self {
            OptionUpdate::JudgingTimer(_) => "judging_timer",
            OptionUpdate::MinViews(_) => "min_views",
            OptionUpdate::ClockSync(_) => "clock_sync",
            OptionUpdate::JudgeTracks(_) => "judge_tracks",
            OptionUpdate::Tracks(_) => "tracks",
            OptionUpdate::MultiGroup(_) => "multi_group",
            OptionUpdate::GroupSizes(_) => "group_sizes",
            OptionUpdate::SwitchingMode(_) => "switching_mode",
            OptionUpdate::AutoSwitchProp(_) => "auto_switch_prop",
        }
    }

    /// Write the new value into `options`.
    pub fn apply(self, options: &mut Options) {
        match self {
            OptionUpdate::JudgingTimer(value) => options.judging_timer = value,
            OptionUpdate::MinViews(value) => options.min_views = value,
            OptionUpdate::ClockSync(value) => options.clock_sync = value,
            OptionUpdate::JudgeTracks(value) => options.judge_tracks = value,
            OptionUpdate::Tracks(value) => options.tracks = value,
            OptionUpdate::MultiGroup(value) => options.multi_group = value,
            OptionUpdate::GroupSizes(value) => options.group_sizes = value,
            OptionUpdate::SwitchingMode(value) => options.switching_mode = value,
            OptionUpdate::AutoSwitchProp(value) => options.auto_switch_prop = value,
        }
    }
}

/// Set of field updates applied to the options record in one write.
///
/// Fields without an update are left untouched. Each field appears at most
/// once; pushing a second update for the same field replaces the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsPatch {
    updates: Vec<OptionUpdate>,
}

impl OptionsPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`OptionsPatch::push`].
    pub fn with(mut self, update: OptionUpdate) -> Self {
        self.push(update);
        self
    }

    /// Add an update, replacing any earlier update of the same field.
    pub fn push(&mut self, update: OptionUpdate) {
        let field = update.field();
        self.updates.retain(|existing| existing.field() != field);
        self.updates.push(update);
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Storage keys touched by the patch.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.updates.iter().map(OptionUpdate::field)
    }

    /// Apply every update to `options`.
    pub fn apply_to(self, options: &mut Options) {
        for update in self.updates {
            update.apply(options);
        }
    }
}

impl IntoIterator for OptionsPatch {
    type Item = OptionUpdate;
    type IntoIter = std::vec::IntoIter<OptionUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}
