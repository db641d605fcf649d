//! Versioned persisted layout and the upgrade step run at load time.
//!
//! Current state is stored as `{ "schemaVersion": 2, "routines": [...] }`.
//! Anything older is a bare array of routines written by the first
//! generation of the tracker, which used Portuguese field names, numeric
//! weekdays and the duplicated `tempoEstimado` duration.

use crate::model::routine::{Routine, Weekday};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SCHEMA_VERSION: u32 = 2;
const LEGACY_SCHEMA_VERSION: u32 = 1;

const ROUTINE_KEYS: [(&str, &str); 8] = [
    ("nome", "name"),
    ("descricao", "description"),
    ("atividades", "activities"),
    ("dataInicio", "startDate"),
    ("dataFim", "endDate"),
    ("cor", "color"),
    ("ativa", "active"),
    ("diasSemana", "weekdays"),
];

const ACTIVITY_KEYS: [(&str, &str); 7] = [
    ("titulo", "title"),
    ("descricao", "description"),
    ("concluida", "completed"),
    ("horarioInicio", "startTime"),
    ("duracao", "durationMinutes"),
    ("prioridade", "priority"),
    ("categoria", "category"),
];

const PRIORITY_VALUES: [(&str, &str); 4] = [
    ("baixa", "low"),
    ("media", "medium"),
    ("média", "medium"),
    ("alta", "high"),
];

const CATEGORY_VALUES: [(&str, &str); 6] = [
    ("trabalho", "work"),
    ("pessoal", "personal"),
    ("saude", "health"),
    ("saúde", "health"),
    ("estudo", "study"),
    ("lazer", "leisure"),
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub schema_version: u32,
    pub routines: &'a [Routine],
}

impl<'a> Snapshot<'a> {
    pub fn new(routines: &'a [Routine]) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            routines,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    schema_version: u32,
    routines: Value,
}

#[derive(Debug)]
pub struct Migrated {
    pub routines: Vec<Routine>,
    pub from_version: u32,
}

impl Migrated {
    pub fn was_upgraded(&self) -> bool {
        self.from_version < SCHEMA_VERSION
    }
}

pub fn upgrade(raw: Value) -> Result<Migrated> {
    let (from_version, routines) = match raw {
        Value::Array(_) => (LEGACY_SCHEMA_VERSION, raw),
        Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(raw)
                .context("Persisted state is not a versioned routine envelope")?;
            (envelope.schema_version, envelope.routines)
        }
        other => bail!("Unexpected persisted state: expected an array or an object, found {other}"),
    };

    if from_version > SCHEMA_VERSION {
        bail!(
            "Persisted schema version {from_version} is newer than the supported version {SCHEMA_VERSION}"
        );
    }

    let routines = if from_version < SCHEMA_VERSION {
        upgrade_legacy(routines)?
    } else {
        serde_json::from_value(routines).context("Failed to parse persisted routines")?
    };

    Ok(Migrated {
        routines,
        from_version,
    })
}

fn upgrade_legacy(raw: Value) -> Result<Vec<Routine>> {
    let Value::Array(items) = raw else {
        bail!("Legacy routines must be a JSON array");
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            legacy_routine(item)
                .with_context(|| format!("Failed to migrate legacy routine #{}", index + 1))
        })
        .collect()
}

fn legacy_routine(item: Value) -> Result<Routine> {
    let Value::Object(mut fields) = item else {
        bail!("Legacy routine is not a JSON object");
    };

    rename_keys(&mut fields, &ROUTINE_KEYS);

    if let Some(Value::Array(activities)) = fields.get_mut("activities") {
        activities
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .for_each(legacy_activity);
    }

    normalize_date(&mut fields, "startDate");
    normalize_date(&mut fields, "endDate");

    let weekdays = legacy_weekdays(fields.remove("weekdays"))?;
    fields.insert("weekdays".to_string(), Value::Array(weekdays));
    fields.entry("active").or_insert(Value::Bool(true));

    serde_json::from_value(Value::Object(fields))
        .context("Legacy routine does not match the routine schema")
}

fn legacy_activity(fields: &mut Map<String, Value>) {
    rename_keys(fields, &ACTIVITY_KEYS);

    let estimated = fields.remove("tempoEstimado");
    let has_duration = fields
        .get("durationMinutes")
        .is_some_and(|value| !value.is_null());
    if !has_duration {
        fields.insert(
            "durationMinutes".to_string(),
            estimated.filter(Value::is_number).unwrap_or(Value::from(0)),
        );
    }

    if let Some(minutes) = fields.get("durationMinutes").and_then(Value::as_f64) {
        fields.insert(
            "durationMinutes".to_string(),
            Value::from(minutes.max(0.0).round() as u64),
        );
    }

    map_value(fields, "priority", &PRIORITY_VALUES);
    map_value(fields, "category", &CATEGORY_VALUES);
}

/// Pre-weekday routines applied every day. Numeric days count from Sunday.
fn legacy_weekdays(raw: Option<Value>) -> Result<Vec<Value>> {
    let every_day = || {
        Weekday::ALL
            .iter()
            .map(|day| Value::from(day.as_str()))
            .collect::<Vec<_>>()
    };

    match raw {
        None | Some(Value::Null) => Ok(every_day()),
        Some(Value::Array(days)) => days
            .into_iter()
            .map(|day| {
                let weekday = match &day {
                    Value::Number(number) => number.as_u64().and_then(Weekday::from_index),
                    Value::String(name) => name.parse::<Weekday>().ok(),
                    _ => None,
                };
                weekday
                    .map(|weekday| Value::from(weekday.as_str()))
                    .with_context(|| format!("Unsupported legacy weekday: {day}"))
            })
            .collect(),
        Some(other) => bail!("Legacy weekdays must be an array, found {other}"),
    }
}

fn rename_keys(fields: &mut Map<String, Value>, pairs: &[(&str, &str)]) {
    for (legacy, current) in pairs {
        if let Some(value) = fields.remove(*legacy) {
            fields.entry(*current).or_insert(value);
        }
    }
}

fn map_value(fields: &mut Map<String, Value>, key: &str, pairs: &[(&str, &str)]) {
    let Some(Value::String(raw)) = fields.get(key) else {
        return;
    };

    let normalized = raw.trim().to_lowercase();
    let mapped = pairs
        .iter()
        .find(|(legacy, _)| *legacy == normalized)
        .map(|(_, current)| (*current).to_string())
        .unwrap_or(normalized);

    fields.insert(key.to_string(), Value::String(mapped));
}

/// JavaScript `Date` values were stored as full ISO date-times.
fn normalize_date(fields: &mut Map<String, Value>, key: &str) {
    match fields.get(key) {
        Some(Value::Null) => {
            fields.remove(key);
        }
        Some(Value::String(raw)) => {
            let date = raw.get(..10).unwrap_or(raw.as_str()).to_string();
            fields.insert(key.to_string(), Value::String(date));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Priority};
    use chrono::NaiveDate;
    use serde_json::json;

    fn legacy_morning() -> Value {
        json!([{
            "id": "exemplo-1",
            "nome": "Rotina Matinal",
            "descricao": "Comecar bem o dia",
            "atividades": [{
                "id": "ativ-1-4",
                "titulo": "Meditar 15 minutos",
                "concluida": true,
                "horarioInicio": "06:20",
                "duracao": 15,
                "tempoEstimado": 15,
                "prioridade": "media",
                "categoria": "pessoal"
            }, {
                "id": "ativ-1-5",
                "titulo": "Tomar cafe da manha",
                "concluida": false,
                "horarioInicio": "06:35",
                "tempoEstimado": 20,
                "prioridade": "alta",
                "categoria": "saude"
            }],
            "dataInicio": "2024-01-01T00:00:00.000Z",
            "cor": "#4ade80",
            "ativa": true,
            "diasSemana": [1, 2, 3, 4, 5]
        }])
    }

    #[test]
    fn upgrades_legacy_portuguese_array() {
        let migrated = upgrade(legacy_morning()).expect("legacy data migrates");
        assert!(migrated.was_upgraded());

        let routine = &migrated.routines[0];
        assert_eq!(routine.name, "Rotina Matinal");
        assert_eq!(routine.color, "#4ade80");
        assert_eq!(
            routine.start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            routine.weekdays.iter().copied().collect::<Vec<_>>(),
            Weekday::WORKDAYS.to_vec()
        );

        let meditate = &routine.activities[0];
        assert!(meditate.completed);
        assert_eq!(meditate.priority, Priority::Medium);
        assert_eq!(meditate.category, Category::Personal);
        assert_eq!(meditate.duration_minutes, 15);

        let breakfast = &routine.activities[1];
        assert_eq!(breakfast.duration_minutes, 20);
        assert_eq!(breakfast.category, Category::Health);
        assert_eq!(breakfast.priority, Priority::High);
    }

    #[test]
    fn routines_without_weekdays_run_every_day() {
        let mut raw = legacy_morning();
        raw[0]
            .as_object_mut()
            .expect("object")
            .remove("diasSemana");

        let migrated = upgrade(raw).expect("migrates");
        assert_eq!(migrated.routines[0].weekdays.len(), 7);
    }

    #[test]
    fn current_envelope_is_read_as_is() {
        let legacy = upgrade(legacy_morning()).expect("migrates").routines;
        let raw = serde_json::to_value(Snapshot::new(&legacy)).expect("serialize");
        assert_eq!(raw["schemaVersion"], SCHEMA_VERSION);

        let migrated = upgrade(raw).expect("reads");
        assert!(!migrated.was_upgraded());
        assert_eq!(migrated.routines, legacy);
    }

    #[test]
    fn rejects_newer_schema() {
        let raw = json!({ "schemaVersion": SCHEMA_VERSION + 1, "routines": [] });
        let error = upgrade(raw).expect_err("newer schema is rejected");
        assert!(error.to_string().contains("newer"));
    }

    #[test]
    fn rejects_scalar_state() {
        assert!(upgrade(json!("routines")).is_err());
    }

    #[test]
    fn rejects_unknown_legacy_weekday() {
        let mut raw = legacy_morning();
        raw[0]["diasSemana"] = json!([9]);
        assert!(upgrade(raw).is_err());
    }
}
