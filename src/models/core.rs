//! Core data structures for the screenplay editor engine
//!
//! This module defines the Document → Page → Element tree and the
//! character-offset addressing used by the derived views. Pages are
//! presentational containers only; every derivation pass walks the
//! flattened element sequence in document order.

use serde::{Deserialize, Serialize};

use super::elements::{ElementKind, MarkSet};

/// A contiguous piece of element text carrying one set of inline marks
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub marks: MarkSet,
}

impl TextRun {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, MarkSet::EMPTY)
    }

    /// Length in characters, not bytes
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Convert a character offset into a byte offset for string surgery
fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// The atomic editable unit: one screenplay line with a semantic kind.
///
/// An element with no runs is valid; it represents a just-created line the
/// cursor policies treat specially.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub runs: Vec<TextRun>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind, runs: Vec::new() }
    }

    pub fn with_text(kind: ElementKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() { Vec::new() } else { vec![TextRun::plain(text)] };
        Self { kind, runs }
    }

    /// Flattened plain text: concatenation of all runs, marks ignored
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Text of the first run only, which is what occurrence counting reads
    pub fn first_run_text(&self) -> &str {
        self.runs.first().map(|r| r.text.as_str()).unwrap_or("")
    }

    /// Length in characters across all runs
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.is_empty())
    }

    /// Replace the whole content with a single unmarked run
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.runs.clear();
        if !text.is_empty() {
            self.runs.push(TextRun::plain(text));
        }
    }

    /// Marks governing the cursor at `offset`: the run ending at or
    /// containing the previous character, or the first run when the cursor
    /// sits at the element start.
    pub fn marks_at(&self, offset: usize) -> MarkSet {
        if self.runs.is_empty() {
            return MarkSet::EMPTY;
        }
        if offset == 0 {
            return self.runs[0].marks;
        }
        let mut acc = 0;
        for run in &self.runs {
            acc += run.len();
            if offset <= acc {
                return run.marks;
            }
        }
        self.runs[self.runs.len() - 1].marks
    }

    /// Locate the run containing a character offset, preferring to attach
    /// to the end of the previous run at boundaries so typed text inherits
    /// the marks before the cursor.
    fn run_at(&self, offset: usize) -> Option<(usize, usize)> {
        let mut acc = 0;
        for (idx, run) in self.runs.iter().enumerate() {
            let len = run.len();
            if offset <= acc + len {
                return Some((idx, offset - acc));
            }
            acc += len;
        }
        self.runs
            .last()
            .map(|r| (self.runs.len() - 1, r.len()))
    }

    /// Insert text at a character offset. At a run boundary with a
    /// different mark set, a fresh run is spliced in; otherwise the text
    /// joins the surrounding run and inherits its marks.
    pub fn insert_text(&mut self, offset: usize, text: &str, marks: MarkSet) {
        if text.is_empty() {
            return;
        }
        if self.runs.is_empty() {
            self.runs.push(TextRun::new(text, marks));
            return;
        }
        let (idx, inner) = match self.run_at(offset) {
            Some(found) => found,
            None => return,
        };
        let run_len = self.runs[idx].len();
        if self.runs[idx].marks != marks && (inner == 0 || inner == run_len) {
            let insert_at = if inner == 0 { idx } else { idx + 1 };
            self.runs.insert(insert_at, TextRun::new(text, marks));
            return;
        }
        let at = byte_offset(&self.runs[idx].text, inner);
        self.runs[idx].text.insert_str(at, text);
    }

    /// Delete the character range [start, end) across runs
    pub fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut acc = 0;
        for run in &mut self.runs {
            let len = run.len();
            let run_start = acc;
            let run_end = acc + len;
            acc = run_end;

            let cut_start = start.max(run_start);
            let cut_end = end.min(run_end);
            if cut_start >= cut_end {
                continue;
            }
            let from = byte_offset(&run.text, cut_start - run_start);
            let to = byte_offset(&run.text, cut_end - run_start);
            run.text.replace_range(from..to, "");
        }
        self.runs.retain(|r| !r.is_empty());
    }

    /// Split at a character offset, keeping the head in place and returning
    /// the tail as a new element of the same kind with marks preserved.
    pub fn split_at(&mut self, offset: usize) -> Element {
        let mut tail = Element::new(self.kind);
        let mut acc = 0;
        let mut head_runs: Vec<TextRun> = Vec::new();
        for run in self.runs.drain(..) {
            let len = run.len();
            if acc + len <= offset {
                acc += len;
                head_runs.push(run);
            } else if acc >= offset {
                tail.runs.push(run);
            } else {
                let split = byte_offset(&run.text, offset - acc);
                let head_text = run.text[..split].to_string();
                let tail_text = run.text[split..].to_string();
                acc += len;
                if !head_text.is_empty() {
                    head_runs.push(TextRun::new(head_text, run.marks));
                }
                if !tail_text.is_empty() {
                    tail.runs.push(TextRun::new(tail_text, run.marks));
                }
            }
        }
        self.runs = head_runs;
        tail
    }
}

/// Presentational container of elements; a pagination unit, never a
/// semantic one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    /// A fresh page holds one empty action element; an empty page is
    /// invalid.
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new(ElementKind::Action)],
        }
    }

    pub fn ensure_non_empty(&mut self) {
        if self.elements.is_empty() {
            log::debug!("repairing empty page with default action element");
            self.elements.push(Element::new(ElementKind::Action));
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// A position inside the flattened element sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub element: usize,
    pub offset: usize,
}

/// Root container owning the ordered pages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Minimal valid document: one page, one empty action element
    pub fn new() -> Self {
        Self { pages: vec![Page::new()] }
    }

    /// The default screenplay a fresh project opens with: two pages, each
    /// holding one empty action element.
    pub fn default_screenplay() -> Self {
        Self {
            pages: vec![Page::new(), Page::new()],
        }
    }

    /// Repair the structural invariants: at least one page, at least one
    /// element per page.
    pub fn ensure_invariants(&mut self) {
        if self.pages.is_empty() {
            log::debug!("repairing empty document with default page");
            self.pages.push(Page::new());
        }
        for page in &mut self.pages {
            page.ensure_non_empty();
        }
    }

    /// Flattened elements across all pages, in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements().nth(index)
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.pages
            .iter_mut()
            .flat_map(|p| p.elements.iter_mut())
            .nth(index)
    }

    /// Map a flat element index to (page index, index within page)
    fn page_slot(&self, index: usize) -> Option<(usize, usize)> {
        let mut remaining = index;
        for (page_idx, page) in self.pages.iter().enumerate() {
            if remaining < page.elements.len() {
                return Some((page_idx, remaining));
            }
            remaining -= page.elements.len();
        }
        None
    }

    /// Page index holding the element at a flat index
    pub fn page_of(&self, index: usize) -> Option<usize> {
        self.page_slot(index).map(|(page, _)| page)
    }

    /// Insert a new empty element of `kind` right after the element at
    /// `index`, on the same page. Returns the new element's flat index.
    pub fn insert_element_after(&mut self, index: usize, kind: ElementKind) -> Option<usize> {
        let (page_idx, slot) = self.page_slot(index)?;
        self.pages[page_idx]
            .elements
            .insert(slot + 1, Element::new(kind));
        Some(index + 1)
    }

    /// Insert an element already carrying content after `index`
    pub fn insert_after(&mut self, index: usize, element: Element) -> Option<usize> {
        let (page_idx, slot) = self.page_slot(index)?;
        self.pages[page_idx].elements.insert(slot + 1, element);
        Some(index + 1)
    }

    /// Remove the element at a flat index. A page emptied by the removal is
    /// dropped while other pages remain; the last page is repaired with a
    /// default action element instead.
    pub fn remove_element(&mut self, index: usize) -> Option<Element> {
        let (page_idx, slot) = self.page_slot(index)?;
        let removed = self.pages[page_idx].elements.remove(slot);
        if self.pages[page_idx].elements.is_empty() && self.pages.len() > 1 {
            self.pages.remove(page_idx);
        } else {
            self.pages[page_idx].ensure_non_empty();
        }
        Some(removed)
    }

    /// Insert a fresh page after the page at `page_index`
    pub fn insert_page_after(&mut self, page_index: usize) {
        let at = (page_index + 1).min(self.pages.len());
        self.pages.insert(at, Page::new());
    }

    /// Global character offset of an element's opening boundary.
    ///
    /// The walk starts at 1; every element spans `text_len + 2` (a
    /// two-character line terminator), and a `none` element spans exactly 2.
    pub fn offset_of_element(&self, index: usize) -> Option<usize> {
        let mut cursor = 1usize;
        for (idx, element) in self.elements().enumerate() {
            if idx == index {
                return Some(cursor);
            }
            cursor += element_span(element);
        }
        None
    }

    /// Offset one past the final element, closing the last scene's span
    pub fn end_offset(&self) -> usize {
        1 + self.elements().map(element_span).sum::<usize>()
    }

    /// Map a global character offset back into the element it falls in,
    /// clamping past-the-end offsets to the end of the last element.
    pub fn locate(&self, offset: usize) -> Option<Location> {
        let count = self.element_count();
        if count == 0 {
            return None;
        }
        let mut cursor = 1usize;
        for (idx, element) in self.elements().enumerate() {
            let span = element_span(element);
            if offset < cursor + span {
                let inner = offset
                    .saturating_sub(cursor + 1)
                    .min(element.text_len());
                return Some(Location {
                    element: idx,
                    offset: inner,
                });
            }
            cursor += span;
        }
        let last = count - 1;
        self.element(last).map(|e| Location {
            element: last,
            offset: e.text_len(),
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Character span an element contributes to the global offset walk
pub fn element_span(element: &Element) -> usize {
    if element.kind == ElementKind::None {
        2
    } else {
        element.text_len() + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::elements::Mark;

    fn doc_with(elements: Vec<Element>) -> Document {
        Document {
            pages: vec![Page { elements }],
        }
    }

    #[test]
    fn test_default_screenplay_shape() {
        let doc = Document::default_screenplay();
        assert_eq!(doc.pages.len(), 2);
        for page in &doc.pages {
            assert_eq!(page.elements.len(), 1);
            assert_eq!(page.elements[0].kind, ElementKind::Action);
            assert!(page.elements[0].is_empty());
        }
    }

    #[test]
    fn test_invariant_repair() {
        let mut doc = Document { pages: vec![] };
        doc.ensure_invariants();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].elements.len(), 1);
    }

    #[test]
    fn test_flatten_text_across_runs() {
        let element = Element {
            kind: ElementKind::Action,
            runs: vec![
                TextRun::plain("He walks "),
                TextRun::new("slowly", MarkSet::single(Mark::Italic)),
            ],
        };
        assert_eq!(element.text(), "He walks slowly");
        assert_eq!(element.first_run_text(), "He walks ");
        assert_eq!(element.text_len(), 15);
    }

    #[test]
    fn test_insert_text_inherits_surrounding_marks() {
        let mut element = Element::with_text(ElementKind::Dialogue, "hello");
        element.insert_text(5, " there", MarkSet::EMPTY);
        assert_eq!(element.text(), "hello there");
        assert_eq!(element.runs.len(), 1);
    }

    #[test]
    fn test_insert_text_new_marks_at_boundary() {
        let mut element = Element::with_text(ElementKind::Dialogue, "loud");
        element.insert_text(4, "er", MarkSet::single(Mark::Bold));
        assert_eq!(element.runs.len(), 2);
        assert_eq!(element.text(), "louder");
        assert!(element.runs[1].marks.contains(Mark::Bold));
    }

    #[test]
    fn test_split_at_preserves_marks() {
        let mut element = Element {
            kind: ElementKind::Action,
            runs: vec![
                TextRun::plain("abc"),
                TextRun::new("def", MarkSet::single(Mark::Bold)),
            ],
        };
        let tail = element.split_at(4);
        assert_eq!(element.text(), "abcd");
        assert_eq!(tail.text(), "ef");
        assert_eq!(tail.kind, ElementKind::Action);
        assert!(tail.runs[0].marks.contains(Mark::Bold));
    }

    #[test]
    fn test_delete_range_across_runs() {
        let mut element = Element {
            kind: ElementKind::Action,
            runs: vec![TextRun::plain("abc"), TextRun::plain("def")],
        };
        element.delete_range(2, 4);
        assert_eq!(element.text(), "abef");
    }

    #[test]
    fn test_offset_walk_and_locate() {
        let doc = doc_with(vec![
            Element::with_text(ElementKind::Scene, "INT. HOUSE"),
            Element::with_text(ElementKind::Action, "He walks in."),
        ]);
        // first element opens at 1, spans 10 + 2
        assert_eq!(doc.offset_of_element(0), Some(1));
        assert_eq!(doc.offset_of_element(1), Some(13));
        assert_eq!(doc.end_offset(), 27);

        // offset 2 is the first character of the scene heading
        let loc = doc.locate(2).unwrap();
        assert_eq!(loc, Location { element: 0, offset: 0 });

        // offset 14 is the first character of the action line
        let loc = doc.locate(14).unwrap();
        assert_eq!(loc, Location { element: 1, offset: 0 });

        // past-the-end clamps to the last element's end
        let loc = doc.locate(999).unwrap();
        assert_eq!(loc, Location { element: 1, offset: 12 });
    }

    #[test]
    fn test_none_element_spans_two() {
        let doc = doc_with(vec![
            Element::new(ElementKind::None),
            Element::with_text(ElementKind::Action, "x"),
        ]);
        assert_eq!(doc.offset_of_element(1), Some(3));
    }

    #[test]
    fn test_remove_element_repairs_page() {
        let mut doc = doc_with(vec![Element::with_text(ElementKind::Action, "only")]);
        doc.remove_element(0);
        assert_eq!(doc.element_count(), 1);
        assert!(doc.element(0).unwrap().is_empty());
    }

    #[test]
    fn test_remove_last_element_drops_emptied_page() {
        let mut doc = Document {
            pages: vec![
                Page {
                    elements: vec![Element::with_text(ElementKind::Action, "a")],
                },
                Page {
                    elements: vec![Element::with_text(ElementKind::Action, "b")],
                },
            ],
        };
        doc.remove_element(1);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.element_count(), 1);
        assert_eq!(doc.element(0).unwrap().text(), "a");
    }

    #[test]
    fn test_insert_page_after_and_page_of() {
        let mut doc = Document::new();
        doc.insert_page_after(0);
        assert_eq!(doc.pages.len(), 2);
        // the fresh page carries its default action element
        assert_eq!(doc.pages[1].elements.len(), 1);
        assert_eq!(doc.page_of(0), Some(0));
        assert_eq!(doc.page_of(1), Some(1));
        assert_eq!(doc.page_of(2), None);
    }

    #[test]
    fn test_insert_element_after_crosses_pages() {
        let mut doc = Document {
            pages: vec![
                Page {
                    elements: vec![Element::with_text(ElementKind::Action, "a")],
                },
                Page {
                    elements: vec![Element::with_text(ElementKind::Action, "b")],
                },
            ],
        };
        let idx = doc.insert_element_after(1, ElementKind::Dialogue).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(doc.pages[1].elements.len(), 2);
        assert_eq!(doc.element(2).unwrap().kind, ElementKind::Dialogue);
    }
}
