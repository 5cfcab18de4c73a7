// Alarm domain model and change detection

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub severity: String,
}

/// The subset of an alarm compared to decide whether it is materially new.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmSignature {
    pub id: String,
    pub status: String,
    pub severity: String,
}

impl AlarmSignature {
    fn of(record: &AlarmRecord) -> Self {
        Self {
            id: record.id.clone(),
            status: record.status.clone(),
            severity: record.severity.clone(),
        }
    }
}

/// Tracks the most recently observed alarm and flags a change only when its
/// `(id, status, severity)` signature differs from the last one seen, so a
/// notification fires once per distinct alarm state rather than every poll.
#[derive(Debug, Default)]
pub struct AlarmWatcher {
    last_seen: Option<AlarmSignature>,
    current: Option<AlarmRecord>,
}

impl AlarmWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the newest alarm from a poll. `None` means the platform returned
    /// no alarms; the previously surfaced alarm stays as-is. Returns whether
    /// the surfaced alarm changed.
    pub fn observe(&mut self, candidate: Option<AlarmRecord>) -> bool {
        let Some(record) = candidate else {
            return false;
        };
        let signature = AlarmSignature::of(&record);
        if self.last_seen.as_ref() == Some(&signature) {
            return false;
        }
        self.last_seen = Some(signature);
        self.current = Some(record);
        true
    }

    /// The alarm currently surfaced to the UI, if any.
    pub fn current(&self) -> Option<&AlarmRecord> {
        self.current.as_ref()
    }
}
