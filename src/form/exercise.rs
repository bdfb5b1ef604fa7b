use crate::form::rules::{
    chest_fly::ChestFly, lat_pulldown::LatPulldown, lateral_raise::LateralRaise,
    leg_extension::LegExtension, preacher_curl::PreacherCurl, push_up::PushUp,
    rear_delt_fly::RearDeltFly, shoulder_press::ShoulderPress, squat::Squat,
    tricep_pushdown::TricepPushdown, upper_back_row::UpperBackRow, RuleGroup,
};

/// Exercises with a form rule group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExerciseKey {
    Squat,
    PushUp,
    LatPulldown,
    TricepPushdown,
    ChestFly,
    UpperBackRow,
    PreacherCurl,
    LateralRaise,
    ShoulderPress,
    LegExtension,
    RearDeltFly,
}

pub(crate) const ALL_EXERCISES: [ExerciseKey; 11] = [
    ExerciseKey::Squat,
    ExerciseKey::PushUp,
    ExerciseKey::LatPulldown,
    ExerciseKey::TricepPushdown,
    ExerciseKey::ChestFly,
    ExerciseKey::UpperBackRow,
    ExerciseKey::PreacherCurl,
    ExerciseKey::LateralRaise,
    ExerciseKey::ShoulderPress,
    ExerciseKey::LegExtension,
    ExerciseKey::RearDeltFly,
];

/// Lowercase `name` and strip spaces and hyphens.
pub(crate) fn normalize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|&c| c != ' ' && c != '-')
        .collect()
}

impl ExerciseKey {
    /// Match a free-text exercise name against the supported set.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        Some(match normalize(name).as_str() {
            "squat" => Self::Squat,
            "pushup" => Self::PushUp,
            "latpulldown" => Self::LatPulldown,
            "triceppushdown" => Self::TricepPushdown,
            "chestfly" => Self::ChestFly,
            "upperbackrow" => Self::UpperBackRow,
            "preachercurl" | "preachercurls" => Self::PreacherCurl,
            "lateralraise" | "lateralraises" => Self::LateralRaise,
            "shoulderpress" => Self::ShoulderPress,
            "legextension" | "legextensions" => Self::LegExtension,
            "reardeltfly" | "reardeltflies" => Self::RearDeltFly,
            _ => return None,
        })
    }

    pub(crate) fn key(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::PushUp => "pushup",
            Self::LatPulldown => "latpulldown",
            Self::TricepPushdown => "triceppushdown",
            Self::ChestFly => "chestfly",
            Self::UpperBackRow => "upperbackrow",
            Self::PreacherCurl => "preachercurl",
            Self::LateralRaise => "lateralraise",
            Self::ShoulderPress => "shoulderpress",
            Self::LegExtension => "legextension",
            Self::RearDeltFly => "reardeltfly",
        }
    }

    pub(crate) fn rule_group(self) -> &'static dyn RuleGroup {
        match self {
            Self::Squat => &Squat,
            Self::PushUp => &PushUp,
            Self::LatPulldown => &LatPulldown,
            Self::TricepPushdown => &TricepPushdown,
            Self::ChestFly => &ChestFly,
            Self::UpperBackRow => &UpperBackRow,
            Self::PreacherCurl => &PreacherCurl,
            Self::LateralRaise => &LateralRaise,
            Self::ShoulderPress => &ShoulderPress,
            Self::LegExtension => &LegExtension,
            Self::RearDeltFly => &RearDeltFly,
        }
    }
}
