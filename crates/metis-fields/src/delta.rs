//! Read-only comparison of two slot arrays.
//!
//! A [`DeltaView`] pairs a current [`ValueSlots`] with the version it was
//! checkpointed from and reports, per field, the current value, the prior
//! value and the [`DifferenceResult`] between them.

use metis_types::{DifferenceResult, ValueFormatter};

use crate::catalog::FieldDescriptor;
use crate::slots::{SlotValue, ValueSlots};

/// Borrowed view of `current` against `previous`.
#[derive(Clone, Copy, Debug)]
pub struct DeltaView<'a> {
    current: &'a ValueSlots,
    previous: &'a ValueSlots,
}

impl<'a> DeltaView<'a> {
    pub fn new(current: &'a ValueSlots, previous: &'a ValueSlots) -> Self {
        Self { current, previous }
    }

    pub fn current(&self) -> &'a ValueSlots {
        self.current
    }

    pub fn previous(&self) -> &'a ValueSlots {
        self.previous
    }

    /// Version tag of the current side.
    pub fn version(&self) -> u32 {
        self.current.version()
    }

    pub fn entry(&self, field: &'a FieldDescriptor) -> FieldDelta<'a> {
        FieldDelta {
            field,
            value: self.current.get(field),
            previous: self.previous.get(field),
            difference: self.difference(field),
        }
    }

    pub fn value(&self, field: &FieldDescriptor) -> Option<&'a SlotValue> {
        self.current.get(field)
    }

    pub fn previous_value(&self, field: &FieldDescriptor) -> Option<&'a SlotValue> {
        self.previous.get(field)
    }

    /// `Identical` for fields outside equality checks.
    pub fn difference(&self, field: &FieldDescriptor) -> DifferenceResult {
        self.current.field_changed(field, self.previous)
    }

    /// One entry per catalog field, ancestors first.
    pub fn iter(&self) -> impl Iterator<Item = FieldDelta<'a>> + 'a {
        let view = *self;
        self.current
            .catalog()
            .iter_fields()
            .map(move |field| view.entry(field))
    }

    /// Entries whose difference is not `Identical`.
    pub fn changed(&self) -> impl Iterator<Item = FieldDelta<'a>> + 'a {
        self.iter().filter(|delta| !delta.difference.is_identical())
    }

    /// Aggregate difference of the two sides.
    pub fn differs(&self) -> DifferenceResult {
        self.current.differs(self.previous)
    }
}

/// One field's entry in a [`DeltaView`].
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDelta<'a> {
    pub field: &'a FieldDescriptor,
    pub value: Option<&'a SlotValue>,
    pub previous: Option<&'a SlotValue>,
    pub difference: DifferenceResult,
}

impl FieldDelta<'_> {
    /// One audit line: `name: previous -> current (difference)`.
    pub fn describe(&self, formatter: &dyn ValueFormatter) -> String {
        let render = |slot: Option<&SlotValue>| {
            formatter.format_optional(slot.map(SlotValue::value).as_ref())
        };
        format!(
            "{}: {} -> {} ({})",
            self.field,
            render(self.previous),
            render(self.value),
            self.difference
        )
    }
}
