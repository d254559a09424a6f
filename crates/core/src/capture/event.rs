use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RiftChartError;

/// Chart difficulty, stored in captures by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    /// Position of the difficulty in ascending order, starting at 0.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Impossible => "Impossible",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Difficulty {
    type Error = RiftChartError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(RiftChartError::UnknownDifficulty(value))
    }
}

/// Kind of a recorded gameplay occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Hit,
    Miss,
    Overpress,
    HoldSegment,
    HoldComplete,
    VibeGained,
    VibeActivated,
    VibeEnded,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Hit,
        EventType::Miss,
        EventType::Overpress,
        EventType::HoldSegment,
        EventType::HoldComplete,
        EventType::VibeGained,
        EventType::VibeActivated,
        EventType::VibeEnded,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Hit => "Hit",
            EventType::Miss => "Miss",
            EventType::Overpress => "Overpress",
            EventType::HoldSegment => "Hold Segment",
            EventType::HoldComplete => "Hold Complete",
            EventType::VibeGained => "Vibe Gained",
            EventType::VibeActivated => "Vibe Activated",
            EventType::VibeEnded => "Vibe Ended",
        }
    }
}

impl TryFrom<i32> for EventType {
    type Error = RiftChartError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(RiftChartError::UnknownEventType(value))
    }
}

/// Enemy attached to an event. [`EnemyType::Wyrm`] marks a sustained note;
/// the trailing food variants are pickups that share the lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyType {
    #[default]
    None,
    GreenSlime,
    BlueSlime,
    YellowSlime,
    BlueBat,
    YellowBat,
    RedBat,
    GreenZombie,
    BlueZombie,
    RedZombie,
    WhiteSkeleton,
    WhiteShieldSkeleton,
    WhiteDoubleShieldSkeleton,
    YellowSkeleton,
    YellowShieldSkeleton,
    BlackSkeleton,
    BlackShieldSkeleton,
    BlueArmadillo,
    RedArmadillo,
    YellowArmadillo,
    Wyrm,
    GreenHarpy,
    BlueHarpy,
    RedHarpy,
    Blademaster,
    BlueBlademaster,
    YellowBlademaster,
    WhiteSkull,
    BlueSkull,
    RedSkull,
    Apple,
    Cheese,
    Drumstick,
    Ham,
}

impl EnemyType {
    pub const ALL: [EnemyType; 34] = [
        EnemyType::None,
        EnemyType::GreenSlime,
        EnemyType::BlueSlime,
        EnemyType::YellowSlime,
        EnemyType::BlueBat,
        EnemyType::YellowBat,
        EnemyType::RedBat,
        EnemyType::GreenZombie,
        EnemyType::BlueZombie,
        EnemyType::RedZombie,
        EnemyType::WhiteSkeleton,
        EnemyType::WhiteShieldSkeleton,
        EnemyType::WhiteDoubleShieldSkeleton,
        EnemyType::YellowSkeleton,
        EnemyType::YellowShieldSkeleton,
        EnemyType::BlackSkeleton,
        EnemyType::BlackShieldSkeleton,
        EnemyType::BlueArmadillo,
        EnemyType::RedArmadillo,
        EnemyType::YellowArmadillo,
        EnemyType::Wyrm,
        EnemyType::GreenHarpy,
        EnemyType::BlueHarpy,
        EnemyType::RedHarpy,
        EnemyType::Blademaster,
        EnemyType::BlueBlademaster,
        EnemyType::YellowBlademaster,
        EnemyType::WhiteSkull,
        EnemyType::BlueSkull,
        EnemyType::RedSkull,
        EnemyType::Apple,
        EnemyType::Cheese,
        EnemyType::Drumstick,
        EnemyType::Ham,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn is_wyrm(self) -> bool {
        self == EnemyType::Wyrm
    }
}

impl TryFrom<i32> for EnemyType {
    type Error = RiftChartError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or(RiftChartError::UnknownEnemyType(value))
    }
}

/// One recorded gameplay occurrence, in capture order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub time: f64,
    pub beat: f64,
    pub target_time: f64,
    /// Rounded to three decimals when decoded so that beat equality holds
    /// across capture jitter.
    pub target_beat: f64,
    pub enemy_type: EnemyType,
    pub column: i32,
    pub total_score: i32,
    pub base_score: i32,
    pub base_score_multiplier: i32,
    pub vibe_score_multiplier: i32,
    pub bonus_score: i32,
    /// Flag recorded by the game. Informational only.
    pub is_vibe: bool,
}

impl Event {
    /// Creates an event with zeroed timing and scores. Mostly useful for
    /// building fixtures.
    pub fn new(
        event_type: EventType,
        enemy_type: EnemyType,
        target_beat: f64,
        column: i32,
    ) -> Self {
        Self {
            event_type,
            time: 0.0,
            beat: target_beat,
            target_time: 0.0,
            target_beat,
            enemy_type,
            column,
            total_score: 0,
            base_score: 0,
            base_score_multiplier: 0,
            vibe_score_multiplier: 0,
            bonus_score: 0,
            is_vibe: false,
        }
    }
}

/// Rounds a beat to three decimal places.
///
/// Rounding goes through the exact decimal expansion, so binary ties such as
/// `1.0625` land on the even digit. Negative zero comes back as `0.0`.
pub fn round_beat(beat: f64) -> f64 {
    format!("{beat:.3}").parse::<f64>().unwrap_or(beat) + 0.0
}
