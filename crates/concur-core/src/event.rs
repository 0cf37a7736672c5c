//! START/END events reconstructed from request intervals.

use std::fmt;

use rayon::slice::ParallelSliceMut;

use crate::record::Interval;
use crate::timestamp::Timestamp;

/// Whether a request began or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    End,
}

impl EventKind {
    /// Change in concurrency caused by this event.
    pub const fn delta(self) -> i64 {
        match self {
            Self::Start => 1,
            Self::End => -1,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "START",
            Self::End => "END",
        };
        write!(f, "{s}")
    }
}

/// A request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

impl Event {
    pub const fn start(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            kind: EventKind::Start,
        }
    }

    pub const fn end(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            kind: EventKind::End,
        }
    }
}

/// Collects events in encounter order until the stream is sealed.
#[derive(Debug, Default)]
pub struct EventStreamBuilder {
    events: Vec<Event>,
}

impl EventStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the START and END of one request, in that order.
    pub fn push_interval(&mut self, interval: &Interval) {
        self.events.push(Event::start(interval.start));
        self.events.push(Event::end(interval.end));
    }

    /// Adds a single event. Used for logs that carry unmatched boundaries.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sorts by timestamp and seals the stream.
    ///
    /// The sort is stable: events sharing a timestamp keep the order in
    /// which they were pushed.
    pub fn build(mut self) -> EventStream {
        tracing::info!(events = self.events.len(), "sorting events");
        self.events.par_sort_by_key(|event| event.timestamp);
        EventStream {
            events: self.events,
        }
    }
}

/// Events in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStream {
    events: Vec<Event>,
}

impl EventStream {
    /// Builds a sorted stream from events in encounter order.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut builder = EventStreamBuilder::new();
        for event in events {
            builder.push(event);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The earliest event, if any.
    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventStream {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
