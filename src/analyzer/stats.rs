use crate::model::{Activity, Category, Priority, Routine, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_routines: usize,
    pub active_routines: usize,
    pub total_activities: usize,
    pub completed_activities: usize,
    pub total_estimated_minutes: u64,
    pub total_completed_minutes: u64,
    pub completion_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub routines: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub activities_by_category: BTreeMap<String, usize>,
    pub activities_by_priority: BTreeMap<String, usize>,
    pub completion_by_category: BTreeMap<String, u32>,
    pub activities_by_period: BTreeMap<String, usize>,
    pub routines_by_weekday: Vec<WeekdayCount>,
    pub average_duration_minutes: u64,
}

pub fn compute_statistics(routines: &[Routine]) -> Statistics {
    let mut stats = routines
        .iter()
        .fold(Statistics::default(), |mut acc, routine| {
            acc.total_routines += 1;
            acc.active_routines += usize::from(routine.active);

            for activity in &routine.activities {
                let minutes = u64::from(activity.duration_minutes);
                acc.total_activities += 1;
                acc.total_estimated_minutes += minutes;

                if activity.completed {
                    acc.completed_activities += 1;
                    acc.total_completed_minutes += minutes;
                }
            }

            acc
        });

    stats.completion_percent = percent(stats.completed_activities, stats.total_activities);
    stats
}

pub fn compute_breakdown(routines: &[Routine]) -> Breakdown {
    let activities = routines
        .iter()
        .flat_map(|routine| routine.activities.iter())
        .collect::<Vec<_>>();

    let activities_by_category = Category::ALL
        .into_iter()
        .map(|category| {
            let count = activities
                .iter()
                .filter(|activity| activity.category == category)
                .count();
            (category.as_str().to_string(), count)
        })
        .collect::<BTreeMap<_, _>>();

    let activities_by_priority = Priority::ALL
        .into_iter()
        .map(|priority| {
            let count = activities
                .iter()
                .filter(|activity| activity.priority == priority)
                .count();
            (priority.as_str().to_string(), count)
        })
        .collect::<BTreeMap<_, _>>();

    let completion_by_category = Category::ALL
        .into_iter()
        .map(|category| {
            let (done, total) = activities
                .iter()
                .filter(|activity| activity.category == category)
                .fold((0, 0), |(done, total), activity| {
                    (done + usize::from(activity.completed), total + 1)
                });
            (category.as_str().to_string(), percent(done, total))
        })
        .collect::<BTreeMap<_, _>>();

    let activities_by_period = activities.iter().fold(
        day_periods()
            .into_iter()
            .map(|period| (period.to_string(), 0))
            .collect::<BTreeMap<_, _>>(),
        |mut acc, activity| {
            *acc.entry(day_period(activity).to_string()).or_insert(0) += 1;
            acc
        },
    );

    let routines_by_weekday = Weekday::ALL
        .into_iter()
        .map(|day| WeekdayCount {
            weekday: day.as_str().to_string(),
            routines: routines
                .iter()
                .filter(|routine| routine.weekdays.contains(&day))
                .count(),
        })
        .collect::<Vec<_>>();

    let total_minutes = activities
        .iter()
        .map(|activity| u64::from(activity.duration_minutes))
        .sum::<u64>();
    let average_duration_minutes = if activities.is_empty() {
        0
    } else {
        (total_minutes as f64 / activities.len() as f64).round() as u64
    };

    Breakdown {
        activities_by_category,
        activities_by_priority,
        completion_by_category,
        activities_by_period,
        routines_by_weekday,
        average_duration_minutes,
    }
}

/// Rounded percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }

    (part as f64 / whole as f64 * 100.0).round() as u32
}

fn day_periods() -> Vec<&'static str> {
    vec!["00-05 night", "06-11 morning", "12-17 afternoon", "18-23 evening"]
}

fn day_period(activity: &Activity) -> &'static str {
    let periods = day_periods();
    let index = (activity.start_minutes() / 60 / 6) as usize;
    periods.get(index).copied().unwrap_or("18-23 evening")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn activity(start: &str, minutes: u32, completed: bool, category: Category) -> Activity {
        Activity {
            id: format!("{start}-{minutes}"),
            title: "Task".to_string(),
            description: None,
            completed,
            start_time: NaiveTime::parse_from_str(start, "%H:%M").expect("time"),
            duration_minutes: minutes,
            priority: Priority::High,
            category,
        }
    }

    fn routine(active: bool, weekdays: &[Weekday], activities: Vec<Activity>) -> Routine {
        Routine {
            id: format!("r-{}", activities.len()),
            name: "Routine".to_string(),
            description: None,
            activities,
            start_date: None,
            end_date: None,
            color: "#000000".to_string(),
            active,
            weekdays: weekdays.iter().copied().collect(),
        }
    }

    fn routines() -> Vec<Routine> {
        vec![
            routine(
                true,
                &Weekday::WORKDAYS,
                vec![
                    activity("06:00", 10, true, Category::Health),
                    activity("13:30", 20, false, Category::Work),
                    activity("19:00", 30, true, Category::Study),
                ],
            ),
            routine(false, &[Weekday::Sat], Vec::new()),
        ]
    }

    #[test]
    fn statistics_count_and_sum() {
        let stats = compute_statistics(&routines());

        assert_eq!(
            stats,
            Statistics {
                total_routines: 2,
                active_routines: 1,
                total_activities: 3,
                completed_activities: 2,
                total_estimated_minutes: 60,
                total_completed_minutes: 40,
                completion_percent: 67,
            }
        );
        assert!(stats.completed_activities <= stats.total_activities);
    }

    #[test]
    fn statistics_of_nothing_are_zero() {
        assert_eq!(compute_statistics(&[]), Statistics::default());
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 8), 13);
    }

    #[test]
    fn breakdown_groups_by_category_period_and_weekday() {
        let breakdown = compute_breakdown(&routines());

        assert_eq!(breakdown.activities_by_category["health"], 1);
        assert_eq!(breakdown.activities_by_category["leisure"], 0);
        assert_eq!(breakdown.activities_by_priority["high"], 3);
        assert_eq!(breakdown.completion_by_category["work"], 0);
        assert_eq!(breakdown.completion_by_category["study"], 100);
        assert_eq!(breakdown.activities_by_period["06-11 morning"], 1);
        assert_eq!(breakdown.activities_by_period["12-17 afternoon"], 1);
        assert_eq!(breakdown.activities_by_period["18-23 evening"], 1);
        assert_eq!(breakdown.activities_by_period["00-05 night"], 0);
        assert_eq!(breakdown.average_duration_minutes, 20);

        let saturday = breakdown
            .routines_by_weekday
            .iter()
            .find(|count| count.weekday == "sat")
            .expect("saturday present");
        assert_eq!(saturday.routines, 1);
        assert_eq!(breakdown.routines_by_weekday.len(), 7);
    }
}
