use log::debug;

use crate::libmondai::question::QuestionRecord;
use crate::libmondai::Error;

/// The ordered question list plus the cursor of the question currently open
/// in the editor. Stale indices coming from the presentation layer are
/// ignored; indices typed by the user are the caller's problem.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    records: Vec<QuestionRecord>,
    cursor: usize,
}

impl Default for QuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionStore {
    pub fn new() -> Self {
        QuestionStore {
            records: vec![QuestionRecord::default()],
            cursor: 0,
        }
    }

    /// Rebuilds a store from restored state. An out-of-range cursor falls
    /// back to 0; an empty record list is re-seeded on first access.
    pub fn from_parts(records: Vec<QuestionRecord>, cursor: usize) -> Self {
        let cursor = if cursor < records.len() { cursor } else { 0 };
        QuestionStore { records, cursor }
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seeds a default record when the list is empty, then returns the
    /// record under the cursor, repaired in place.
    pub fn current_or_create(&mut self) -> &mut QuestionRecord {
        if self.records.is_empty() {
            debug!("[Store] Empty list, seeding a default question");
            self.records.push(QuestionRecord::default());
            self.cursor = 0;
        }
        if self.cursor >= self.records.len() {
            self.cursor = 0;
        }
        let record = &mut self.records[self.cursor];
        record.sanitize();
        record
    }

    /// `None` appends; so does an index past the end. The cursor moves to
    /// the inserted record.
    pub fn insert_at(&mut self, index: Option<usize>, record: QuestionRecord) {
        match index {
            Some(index) if index <= self.records.len() => {
                self.records.insert(index, record);
                self.cursor = index;
            }
            _ => {
                self.records.push(record);
                self.cursor = self.records.len() - 1;
            }
        }
    }

    /// Deep-copies the record at `index` and places the copy right after it.
    pub fn duplicate_at(&mut self, index: usize) {
        if index >= self.records.len() {
            debug!("[Store] Duplicate index {} out of bounds, ignoring", index);
            return;
        }
        let copy = self.records[index].clone();
        self.records.insert(index + 1, copy);
        self.cursor = index + 1;
    }

    /// Refuses to delete the last remaining question. An unconfirmed or
    /// out-of-bounds delete is a no-op.
    pub fn delete_at(&mut self, index: usize, confirmed: bool) -> Result<(), Error> {
        if self.records.len() <= 1 {
            return Err(Error::SoleQuestion);
        }
        if !confirmed {
            return Ok(());
        }
        if index >= self.records.len() {
            debug!("[Store] Delete index {} out of bounds, ignoring", index);
            return Ok(());
        }
        self.records.remove(index);
        if self.cursor >= index {
            self.cursor = self.cursor.saturating_sub(1);
        }
        Ok(())
    }

    pub fn select(&mut self, index: usize) {
        if index >= self.records.len() {
            debug!("[Store] Select index {} out of bounds, ignoring", index);
            return;
        }
        self.cursor = index;
    }

    /// Splice-move for drag reordering. `target` is the list position the
    /// record was dropped onto and `drop_after` whether the drop point was
    /// below that row's midpoint. Returns false when nothing moved, in which
    /// case the caller neither persists nor re-renders.
    ///
    /// The cursor follows the record it pointed at: it moves with the
    /// dragged record, and shifts by one when the move crosses over it.
    pub fn move_record(&mut self, from: usize, target: usize, drop_after: bool) -> bool {
        let len = self.records.len();
        if from >= len || target >= len {
            debug!("[Store] Move {} -> {} out of bounds, ignoring", from, target);
            return false;
        }
        let to = target + usize::from(drop_after);
        if from == to {
            return false;
        }

        let record = self.records.remove(from);
        let dest = if to > from { to - 1 } else { to };
        self.records.insert(dest, record);

        if self.cursor == from {
            self.cursor = dest;
        } else if from < self.cursor && to > self.cursor {
            self.cursor -= 1;
        } else if from > self.cursor && to <= self.cursor {
            self.cursor += 1;
        }
        true
    }

    /// Full replacement, as after a file import. Cursor resets to 0.
    pub fn replace(&mut self, records: Vec<QuestionRecord>) {
        self.records = records;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libmondai::question::{MediaSlot, QuestionKind};

    fn store_of(texts: &[&str]) -> QuestionStore {
        let records = texts
            .iter()
            .map(|text| {
                let mut record = QuestionRecord::default();
                record.question.text = text.to_string();
                record
            })
            .collect();
        QuestionStore::from_parts(records, 0)
    }

    fn texts(store: &QuestionStore) -> Vec<&str> {
        store
            .records()
            .iter()
            .map(|record| record.question.text.as_str())
            .collect()
    }

    #[test]
    fn new_store_is_seeded() {
        let store = QuestionStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn current_or_create_seeds_an_empty_store() {
        let mut store = QuestionStore::from_parts(Vec::new(), 5);
        let record = store.current_or_create();
        assert_eq!(record.kind(), QuestionKind::MultipleChoice);
        assert_eq!(store.len(), 1);
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn insert_at_end_and_at_index() {
        let mut store = store_of(&["a", "b"]);
        store.insert_at(None, QuestionRecord::default());
        assert_eq!(store.cursor(), 2);
        assert_eq!(store.len(), 3);

        store.insert_at(Some(1), QuestionRecord::default());
        assert_eq!(store.cursor(), 1);
        assert_eq!(texts(&store), ["a", "", "b", ""]);

        // past the end appends
        store.insert_at(Some(99), QuestionRecord::default());
        assert_eq!(store.cursor(), 4);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn duplicate_is_a_deep_copy() {
        let mut store = store_of(&["a", "b"]);
        store.records[0].reading.image = Some("original".to_string());
        store.duplicate_at(0);
        assert_eq!(texts(&store), ["a", "a", "b"]);
        assert_eq!(store.cursor(), 1);

        // mutating the copy's media must not touch the source
        store.records[1].set_media(MediaSlot::ReadingImage, Some("changed".to_string()));
        assert_eq!(store.records[0].reading.image.as_deref(), Some("original"));

        store.duplicate_at(42);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn sole_question_cannot_be_deleted() {
        let mut store = QuestionStore::new();
        assert!(matches!(
            store.delete_at(0, true),
            Err(Error::SoleQuestion)
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unconfirmed_delete_is_a_no_op() {
        let mut store = store_of(&["a", "b"]);
        assert!(store.delete_at(0, false).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_adjusts_the_cursor() {
        let mut store = store_of(&["a", "b", "c"]);
        store.select(2);
        store.delete_at(1, true).unwrap();
        assert_eq!(texts(&store), ["a", "c"]);
        assert_eq!(store.cursor(), 1);

        // deleting behind the cursor leaves it on the same record
        let mut store = store_of(&["a", "b", "c"]);
        store.select(0);
        store.delete_at(2, true).unwrap();
        assert_eq!(store.cursor(), 0);

        // deleting the first record clamps at zero
        let mut store = store_of(&["a", "b"]);
        store.select(0);
        store.delete_at(0, true).unwrap();
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn select_ignores_stale_indices() {
        let mut store = store_of(&["a", "b"]);
        store.select(1);
        store.select(7);
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn move_before_a_later_target() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        store.select(2);
        assert!(store.move_record(0, 2, false));
        assert_eq!(texts(&store), ["b", "a", "c", "d"]);
        // cursor still points at "c"
        assert_eq!(store.records()[store.cursor()].question.text, "c");
    }

    #[test]
    fn move_after_the_last_target() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        store.select(0);
        assert!(store.move_record(0, 3, true));
        assert_eq!(texts(&store), ["b", "c", "d", "a"]);
        assert_eq!(store.cursor(), 3);
    }

    #[test]
    fn move_backwards_shifts_the_cursor_forward() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        store.select(1);
        assert!(store.move_record(3, 0, false));
        assert_eq!(texts(&store), ["d", "a", "b", "c"]);
        assert_eq!(store.records()[store.cursor()].question.text, "b");
    }

    #[test]
    fn move_across_the_cursor_shifts_it_back() {
        let mut store = store_of(&["a", "b", "c", "d"]);
        store.select(1);
        assert!(store.move_record(0, 3, true));
        assert_eq!(texts(&store), ["b", "c", "d", "a"]);
        assert_eq!(store.records()[store.cursor()].question.text, "b");
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn dropping_a_record_onto_itself_is_a_no_op() {
        let mut store = store_of(&["a", "b", "c"]);
        assert!(!store.move_record(1, 1, false));
        assert!(!store.move_record(1, 0, true));
        assert!(!store.move_record(7, 0, false));
        assert_eq!(texts(&store), ["a", "b", "c"]);
    }

    #[test]
    fn cursor_stays_valid_across_mixed_operations() {
        let mut store = QuestionStore::new();
        store.insert_at(None, QuestionRecord::default());
        store.insert_at(Some(0), QuestionRecord::default());
        store.duplicate_at(1);
        store.move_record(3, 0, false);
        store.delete_at(0, true).unwrap();
        store.move_record(1, 2, true);
        store.delete_at(2, true).unwrap();
        store.select(1);
        store.delete_at(1, true).unwrap();
        assert!(store.cursor() < store.len());
        assert!(!store.is_empty());
    }
}
