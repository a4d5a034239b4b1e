use crate::boundary::starts_unit;
use crate::classify::{CapacityFigures, Classifier, LineClass};
use crate::record::UnitRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDraft {
    pub record: UnitRecord,
    pub numbers_captured: bool,
}

impl UnitDraft {
    fn new(name: &str) -> Self {
        Self {
            record: UnitRecord::named(name),
            numbers_captured: false,
        }
    }

    fn apply(&mut self, class: LineClass) {
        match class {
            LineClass::Updated(value) => set_once(&mut self.record.updated_at, value),
            LineClass::Message(value) => set_once(&mut self.record.message, value),
            LineClass::Capacity(figures) | LineClass::LooseNumbers(figures) => {
                self.capture_numbers(figures)
            }
            LineClass::Boilerplate | LineClass::Unclassified => {}
        }
    }

    fn capture_numbers(&mut self, figures: CapacityFigures) {
        if self.numbers_captured {
            return;
        }
        self.record.free_beds = figures.free_beds;
        self.record.waiting_referrals = figures.waiting_referrals;
        self.numbers_captured = true;
    }
}

fn set_once(field: &mut String, value: String) {
    if field.is_empty() {
        *field = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssemblerState {
    #[default]
    NoCurrentUnit,
    BuildingUnit(UnitDraft),
}

/// Holds at most one open record; every other record is already closed.
#[derive(Debug, Default)]
pub struct RecordAssembler {
    state: AssemblerState,
    finished: Vec<UnitRecord>,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AssemblerState {
        &self.state
    }

    /// Closes the open record, if any, and starts a new one.
    pub fn open_unit(&mut self, name: &str) {
        self.close_current();
        self.state = AssemblerState::BuildingUnit(UnitDraft::new(name));
    }

    /// Lines seen before the first unit are dropped.
    pub fn apply(&mut self, class: LineClass) {
        if let AssemblerState::BuildingUnit(draft) = &mut self.state {
            draft.apply(class);
        }
    }

    pub fn finish(mut self) -> Vec<UnitRecord> {
        self.close_current();
        self.finished
    }

    fn close_current(&mut self) {
        if let AssemblerState::BuildingUnit(draft) = std::mem::take(&mut self.state) {
            self.finished.push(draft.record);
        }
    }
}

/// Single forward pass: boundary check first, classification otherwise.
pub fn extract_units(lines: &[String], classifier: &Classifier) -> Vec<UnitRecord> {
    let mut assembler = RecordAssembler::new();
    for (pos, line) in lines.iter().enumerate() {
        if starts_unit(lines, pos, classifier.labels()) {
            assembler.open_unit(line);
            continue;
        }
        if matches!(assembler.state(), AssemblerState::BuildingUnit(_)) {
            assembler.apply(classifier.classify(line));
        }
    }
    assembler.finish()
}
