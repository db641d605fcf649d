use crate::analyzer::stats::percent;
use crate::model::{Activity, Routine, Weekday};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgendaItem {
    pub routine_id: String,
    pub routine_name: String,
    pub routine_color: String,
    pub activity: Activity,
    pub end_time: String,
}

/// Everything scheduled on a single day across the active routines.
#[derive(Debug, Clone, Serialize)]
pub struct Agenda {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub items: Vec<AgendaItem>,
    pub completed: usize,
    pub completion_percent: u32,
}

impl Agenda {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_minutes(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.activity.duration_minutes))
            .sum()
    }
}

pub fn build_agenda(routines: &[Routine], date: NaiveDate) -> Agenda {
    let mut items = routines
        .iter()
        .filter(|routine| routine.active && routine.applies_on(date))
        .flat_map(|routine| {
            routine.activities.iter().map(|activity| AgendaItem {
                routine_id: routine.id.clone(),
                routine_name: routine.name.clone(),
                routine_color: routine.color.clone(),
                end_time: activity.end_time_label(),
                activity: activity.clone(),
            })
        })
        .collect::<Vec<_>>();

    items.sort_by_key(|item| item.activity.start_minutes());

    let completed = items.iter().filter(|item| item.activity.completed).count();
    let completion_percent = percent(completed, items.len());

    Agenda {
        date,
        weekday: Weekday::of(date),
        items,
        completed,
        completion_percent,
    }
}
