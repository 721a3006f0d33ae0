//! Recordings and the in-memory recording library

use serde::{Deserialize, Serialize};

use crate::error::{AtelierError, Result};

/// Unique recording identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordingId(pub u64);

/// A finished capture: a name plus its encoded audio payload
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: RecordingId,
    pub name: String,
    /// Encoded audio (WAV container)
    pub payload: Vec<u8>,
    pub duration_secs: f64,
}

impl Recording {
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Ordered collection of saved recordings, lost when the process exits
#[derive(Debug, Default)]
pub struct RecordingLibrary {
    recordings: Vec<Recording>,
    selected: Option<RecordingId>,
    next_id: u64,
}

impl RecordingLibrary {
    pub const DEFAULT_NAME: &'static str = "My Recording";

    pub fn new() -> Self {
        Self {
            recordings: Vec::new(),
            selected: None,
            next_id: 1,
        }
    }

    pub fn add(&mut self, name: impl Into<String>, payload: Vec<u8>, duration_secs: f64) -> RecordingId {
        let id = RecordingId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.recordings.push(Recording {
            id,
            name: name.into(),
            payload,
            duration_secs,
        });
        id
    }

    /// Remove by id; clears the selection if it pointed at the removed recording
    pub fn remove(&mut self, id: RecordingId) -> Result<Recording> {
        let pos = self
            .recordings
            .iter()
            .position(|r| r.id == id)
            .ok_or(AtelierError::RecordingNotFound(id.0))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.recordings.remove(pos))
    }

    pub fn get(&self, id: RecordingId) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    pub fn select(&mut self, id: RecordingId) -> Result<()> {
        if self.get(id).is_none() {
            return Err(AtelierError::RecordingNotFound(id.0));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn selected(&self) -> Option<&Recording> {
        self.get(self.selected?)
    }

    pub fn selected_id(&self) -> Option<RecordingId> {
        self.selected
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.iter()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Title suggested for the next take after a save
    pub fn next_default_name(&self) -> String {
        format!("{} {}", Self::DEFAULT_NAME, self.recordings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_order_and_unique_ids() {
        let mut lib = RecordingLibrary::new();
        let a = lib.add("first", vec![1], 1.0);
        let b = lib.add("second", vec![2], 2.0);
        assert_ne!(a, b);
        let names: Vec<_> = lib.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut lib = RecordingLibrary::new();
        let a = lib.add("a", vec![], 0.0);
        let b = lib.add("b", vec![], 0.0);
        lib.select(a).unwrap();

        let removed = lib.remove(a).unwrap();
        assert_eq!(removed.name, "a");
        assert!(lib.selected().is_none());
        assert_eq!(lib.len(), 1);
        assert!(lib.get(b).is_some());

        assert!(matches!(lib.remove(a), Err(AtelierError::RecordingNotFound(_))));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut lib = RecordingLibrary::new();
        let a = lib.add("a", vec![], 0.0);
        lib.remove(a).unwrap();
        let b = lib.add("b", vec![], 0.0);
        assert!(b > a);
    }

    #[test]
    fn test_select_unknown_fails() {
        let mut lib = RecordingLibrary::default();
        assert!(lib.select(RecordingId(42)).is_err());
        let id = lib.add("x", vec![], 0.0);
        lib.select(id).unwrap();
        assert_eq!(lib.selected().map(|r| r.id), Some(id));
    }

    #[test]
    fn test_next_default_name() {
        let mut lib = RecordingLibrary::new();
        lib.add(RecordingLibrary::DEFAULT_NAME, vec![], 0.0);
        assert_eq!(lib.next_default_name(), "My Recording 1");
        lib.add("take", vec![], 0.0);
        assert_eq!(lib.next_default_name(), "My Recording 2");
    }
}
