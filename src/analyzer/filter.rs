use crate::model::{FilterConfig, Routine, SortDirection, SortKey};
use chrono::NaiveDate;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub fn filter_and_sort<'a>(routines: &'a [Routine], filters: &FilterConfig) -> Vec<&'a Routine> {
    let needle = filters.text_needle();

    let mut selected = routines
        .iter()
        .filter(|routine| matches_text(routine, needle.as_deref()))
        .filter(|routine| filters.active.is_none_or(|active| routine.active == active))
        .filter(|routine| matches_activity_filters(routine, filters))
        .collect::<Vec<_>>();

    selected.sort_by(|left, right| {
        let ordering = compare(left, right, filters.sort_key);
        match filters.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    selected
}

fn matches_text(routine: &Routine, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };

    routine.name.to_lowercase().contains(needle)
        || routine
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
        || routine
            .activities
            .iter()
            .any(|activity| activity.title.to_lowercase().contains(needle))
}

/// Category, priority and completion must all hold for the same activity.
fn matches_activity_filters(routine: &Routine, filters: &FilterConfig) -> bool {
    if !filters.has_activity_filters() {
        return true;
    }

    routine.activities.iter().any(|activity| {
        filters
            .category
            .is_none_or(|category| activity.category == category)
            && filters
                .priority
                .is_none_or(|priority| activity.priority == priority)
            && filters
                .completed
                .is_none_or(|completed| activity.completed == completed)
    })
}

fn compare(left: &Routine, right: &Routine, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => compare_names(&left.name, &right.name),
        SortKey::CreationDate => start_or_epoch(left).cmp(&start_or_epoch(right)),
        SortKey::Progress => left.progress_ratio().total_cmp(&right.progress_ratio()),
        SortKey::Category => first_category(left).cmp(&first_category(right)),
        SortKey::ActivityCount => left.activities.len().cmp(&right.activities.len()),
    }
}

/// Accents and case are ignored first, so "Água" sorts with the a's and
/// "apple" next to "Apple". Ties fall back to case, then exact bytes.
fn compare_names(left: &str, right: &str) -> Ordering {
    name_key(left)
        .cmp(&name_key(right))
        .then_with(|| left.to_lowercase().cmp(&right.to_lowercase()))
        .then_with(|| left.cmp(right))
}

fn name_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn start_or_epoch(routine: &Routine) -> NaiveDate {
    routine.start_date.unwrap_or(NaiveDate::MIN)
}

fn first_category(routine: &Routine) -> &'static str {
    routine
        .activities
        .first()
        .map(|activity| activity.category.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activity, Category, Priority, Weekday};
    use chrono::NaiveTime;

    fn activity(id: &str, title: &str, completed: bool, category: Category) -> Activity {
        Activity {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            completed,
            start_time: NaiveTime::from_hms_opt(6, 0, 0).expect("time"),
            duration_minutes: 10,
            priority: Priority::Medium,
            category,
        }
    }

    fn routine(id: &str, name: &str, activities: Vec<Activity>) -> Routine {
        Routine {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            activities,
            start_date: None,
            end_date: None,
            color: "#3b82f6".to_string(),
            active: true,
            weekdays: Weekday::ALL.into_iter().collect(),
        }
    }

    fn names(routines: &[&Routine]) -> Vec<String> {
        routines.iter().map(|routine| routine.name.clone()).collect()
    }

    fn scenario() -> Vec<Routine> {
        vec![
            routine(
                "b",
                "B",
                vec![
                    activity("a1", "Run", true, Category::Health),
                    activity("a2", "Swim", false, Category::Health),
                ],
            ),
            routine("a", "A", Vec::new()),
        ]
    }

    fn sorted(routines: &[Routine], key: SortKey, direction: SortDirection) -> Vec<String> {
        let filters = FilterConfig {
            sort_key: key,
            sort_direction: direction,
            ..FilterConfig::default()
        };
        names(&filter_and_sort(routines, &filters))
    }

    #[test]
    fn sorts_by_name_and_progress() {
        let routines = scenario();

        assert_eq!(sorted(&routines, SortKey::Name, SortDirection::Asc), ["A", "B"]);
        assert_eq!(sorted(&routines, SortKey::Progress, SortDirection::Asc), ["A", "B"]);
        assert_eq!(sorted(&routines, SortKey::ActivityCount, SortDirection::Desc), ["B", "A"]);
    }

    #[test]
    fn descending_name_is_exact_reverse() {
        let routines = vec![
            routine("1", "walk", Vec::new()),
            routine("2", "Breakfast", Vec::new()),
            routine("3", "Yoga", Vec::new()),
            routine("4", "Commute", Vec::new()),
        ];

        let ascending = sorted(&routines, SortKey::Name, SortDirection::Asc);
        let mut descending = sorted(&routines, SortKey::Name, SortDirection::Desc);
        descending.reverse();

        assert_eq!(ascending, ["Breakfast", "Commute", "walk", "Yoga"]);
        assert_eq!(ascending, descending);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let routines = vec![
            routine("1", "Zumba", Vec::new()),
            routine("2", "Água", Vec::new()),
            routine("3", "Banho", Vec::new()),
            routine("4", "Élan", Vec::new()),
        ];

        let ascending = sorted(&routines, SortKey::Name, SortDirection::Asc);
        let mut descending = sorted(&routines, SortKey::Name, SortDirection::Desc);
        descending.reverse();

        assert_eq!(ascending, ["Água", "Banho", "Élan", "Zumba"]);
        assert_eq!(ascending, descending);
    }

    #[test]
    fn folded_ties_still_have_a_total_order() {
        let routines = vec![
            routine("1", "élan", Vec::new()),
            routine("2", "Élan", Vec::new()),
            routine("3", "Elan", Vec::new()),
            routine("4", "elan", Vec::new()),
        ];

        assert_eq!(
            sorted(&routines, SortKey::Name, SortDirection::Asc),
            ["Elan", "elan", "Élan", "élan"]
        );
    }

    #[test]
    fn category_sort_uses_first_activity_only() {
        let routines = vec![
            routine("w", "Job", vec![activity("w1", "Email", false, Category::Work)]),
            routine("e", "Empty", Vec::new()),
            routine(
                "h",
                "Gym",
                vec![
                    activity("h1", "Lift", false, Category::Health),
                    activity("h2", "Plan week", false, Category::Work),
                ],
            ),
        ];

        assert_eq!(
            sorted(&routines, SortKey::Category, SortDirection::Asc),
            ["Empty", "Gym", "Job"]
        );
    }

    #[test]
    fn creation_date_puts_missing_dates_first() {
        let mut dated = routine("d", "Dated", Vec::new());
        dated.start_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let routines = vec![dated, routine("u", "Undated", Vec::new())];

        assert_eq!(
            sorted(&routines, SortKey::CreationDate, SortDirection::Asc),
            ["Undated", "Dated"]
        );
    }

    #[test]
    fn text_filter_searches_activity_titles() {
        let routines = vec![
            routine(
                "m",
                "Morning",
                vec![activity("m1", "Meditar 15 minutos", false, Category::Personal)],
            ),
            routine("w", "Work", vec![activity("w1", "Email", false, Category::Work)]),
        ];
        let filters = FilterConfig {
            text: Some("MEDIT".to_string()),
            ..FilterConfig::default()
        };

        assert_eq!(names(&filter_and_sort(&routines, &filters)), ["Morning"]);
    }

    #[test]
    fn activity_filters_must_match_the_same_activity() {
        let routines = scenario();

        let joint = FilterConfig {
            category: Some(Category::Health),
            completed: Some(true),
            ..FilterConfig::default()
        };
        assert_eq!(names(&filter_and_sort(&routines, &joint)), ["B"]);

        let impossible = FilterConfig {
            category: Some(Category::Work),
            completed: Some(true),
            ..FilterConfig::default()
        };
        assert!(filter_and_sort(&routines, &impossible).is_empty());
    }

    #[test]
    fn filtered_never_exceeds_input() {
        let mut routines = scenario();
        routines[1].active = false;

        let configs = [
            FilterConfig::default(),
            FilterConfig {
                active: Some(false),
                ..FilterConfig::default()
            },
            FilterConfig {
                priority: Some(Priority::High),
                ..FilterConfig::default()
            },
            FilterConfig {
                text: Some(String::new()),
                ..FilterConfig::default()
            },
        ];

        let counts = configs
            .iter()
            .map(|filters| filter_and_sort(&routines, filters).len())
            .collect::<Vec<_>>();

        assert!(counts.iter().all(|count| *count <= routines.len()));
        assert_eq!(counts, [2, 1, 0, 2]);
    }
}
