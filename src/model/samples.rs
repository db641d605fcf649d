use crate::model::activity::{Activity, Category, Priority};
use crate::model::routine::{Routine, Weekday};
use chrono::{NaiveDate, NaiveTime};

/// Routines shown on first launch, before anything has been saved.
pub fn sample_routines() -> Vec<Routine> {
    vec![
        Routine {
            id: "sample-1".to_string(),
            name: "🌅 Morning Routine".to_string(),
            description: Some("An energizing routine to start the day right".to_string()),
            activities: vec![
                sample_activity("sample-1-1", "Wake up at 6:00", "06:00", 5, Priority::High, Category::Personal),
                sample_activity("sample-1-2", "Drink a glass of water", "06:05", 2, Priority::High, Category::Health),
                sample_activity("sample-1-3", "Stretch", "06:10", 10, Priority::Medium, Category::Health),
                sample_activity("sample-1-4", "Meditate 15 minutes", "06:20", 15, Priority::Medium, Category::Personal),
                sample_activity("sample-1-5", "Have breakfast", "06:35", 20, Priority::High, Category::Health),
            ],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
            color: "#4ade80".to_string(),
            active: true,
            weekdays: Weekday::ALL.into_iter().collect(),
        },
        Routine {
            id: "sample-2".to_string(),
            name: "💼 Work Routine".to_string(),
            description: Some("Organization and focus during working hours".to_string()),
            activities: vec![
                sample_activity("sample-2-1", "Review today's agenda", "08:00", 10, Priority::High, Category::Work),
                sample_activity("sample-2-2", "Answer important email", "08:10", 30, Priority::High, Category::Work),
                sample_activity("sample-2-3", "Deep work on the main project", "09:00", 120, Priority::High, Category::Work),
            ],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
            color: "#3b82f6".to_string(),
            active: true,
            weekdays: Weekday::WORKDAYS.into_iter().collect(),
        },
    ]
}

fn sample_activity(
    id: &str,
    title: &str,
    start: &str,
    minutes: u32,
    priority: Priority,
    category: Category,
) -> Activity {
    Activity {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        completed: false,
        start_time: NaiveTime::parse_from_str(start, "%H:%M").unwrap_or(NaiveTime::MIN),
        duration_minutes: minutes,
        priority,
        category,
    }
}
