use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// One executed user action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    /// Wall-clock time of day, `HH:MM:SS` (UTC).
    pub time: String,
    pub action: String,
    pub arguments: String,
}

/// Append-only, in-memory history of user actions.
#[derive(Clone, Debug, Default)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: &str, arguments: impl Into<String>) {
        self.push(ActionRecord {
            time: time_of_day(SystemTime::now()),
            action: action.to_string(),
            arguments: arguments.into(),
        });
    }

    pub fn push(&mut self, record: ActionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.action.as_str())
    }
}

/// `HH:MM:SS` of `time` in UTC.
pub fn time_of_day(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        % 86_400;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn formats_time_of_day() {
        let t = UNIX_EPOCH + Duration::from_secs(3 * 86_400 + 13 * 3600 + 5 * 60 + 9);
        assert_eq!(time_of_day(t), "13:05:09");
    }
}
