use anyhow::Context;
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use std::str::FromStr;

const KST_OFFSET_SECS: i32 = 9 * 3600;

// Runs before noon KST publish the morning edition.
const MORNING_CUTOFF_HOUR_KST: u32 = 12;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    pub fn title(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning Briefing: 간밤의 미장 & 국장 프리뷰",
            TimeOfDay::Evening => "Evening Briefing: 오늘 국장 마감 & 미장 프리뷰",
        }
    }

    /// What the narrative should focus on for this edition.
    pub fn prompt_context(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "간밤의 미국 시장 주요 이슈와 오늘 한국 시장 관전 포인트",
            TimeOfDay::Evening => {
                "오늘 한국 시장 주요 이슈와 마감 상황, 그리고 오늘 밤 미국 시장 관전 포인트"
            }
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "am" => Ok(TimeOfDay::Morning),
            "evening" | "pm" => Ok(TimeOfDay::Evening),
            other => anyhow::bail!("unknown edition: {other} (expected morning|evening)"),
        }
    }
}

/// Resolved once at run start and threaded through the pipeline as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edition {
    pub time_of_day: TimeOfDay,
    pub title: &'static str,
    pub generated_at: DateTime<FixedOffset>,
}

impl Edition {
    pub fn generated_at_display(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub fn resolve_edition(
    time_of_day_arg: Option<TimeOfDay>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<Edition> {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).context("invalid KST offset")?;
    let now_kst = now_utc.with_timezone(&kst);

    let time_of_day = time_of_day_arg.unwrap_or(if now_kst.hour() < MORNING_CUTOFF_HOUR_KST {
        TimeOfDay::Morning
    } else {
        TimeOfDay::Evening
    });

    Ok(Edition {
        time_of_day,
        title: time_of_day.title(),
        generated_at: now_kst,
    })
}
