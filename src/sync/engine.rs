use super::typewriter::{RevealStep, Typewriter};
use crate::lyrics::{LyricsDocument, TimedLine};
use std::sync::Arc;

/// Whatever displays the lyrics
pub trait LyricsView {
    fn clear_active(&mut self);
    fn mark_active(&mut self, index: usize);
    /// Bring `index` to the middle of the visible area
    fn scroll_to(&mut self, index: usize);
    /// Show only `words` of line `index` (typewriter progress)
    fn reveal(&mut self, index: usize, words: &[String]);
}

/// Position of one synchronized playback session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    pub active_line: Option<usize>,
    pub last_queried_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    Idle,
    Syncing(PlaybackCursor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Index of the last line starting at or before `position_secs`.
/// `lines` must be sorted by time.
pub fn active_line_at(lines: &[TimedLine], position_secs: f64) -> Option<usize> {
    lines
        .partition_point(|l| l.time_secs <= position_secs)
        .checked_sub(1)
}

/// Drives line highlighting from the player's position.
///
/// The engine keeps no clock of its own: every `sample` is given the
/// position the player last reported.
pub struct SyncEngine {
    document: Option<Arc<LyricsDocument>>,
    state: SyncState,
    typewriter: Typewriter,
    typewriter_enabled: bool,
}

impl SyncEngine {
    pub fn new(typewriter: Typewriter, typewriter_enabled: bool) -> Self {
        Self {
            document: None,
            state: SyncState::Idle,
            typewriter,
            typewriter_enabled,
        }
    }

    /// Swap in the lyrics of a new track. Ends any running session.
    pub fn load(&mut self, document: Option<Arc<LyricsDocument>>, view: &mut impl LyricsView) {
        self.stop();
        view.clear_active();
        self.document = document;
    }

    /// Begin syncing. Only possible with at least one timed line.
    pub fn start(&mut self) -> bool {
        if self.is_syncing() {
            return true;
        }
        if !self.document.as_ref().is_some_and(|d| d.is_synced()) {
            return false;
        }
        self.state = SyncState::Syncing(PlaybackCursor {
            active_line: None,
            last_queried_secs: 0.0,
        });
        tracing::debug!("lyrics sync started");
        true
    }

    /// End the session and cancel any reveal in flight
    pub fn stop(&mut self) {
        self.typewriter.cancel();
        if self.is_syncing() {
            tracing::debug!("lyrics sync stopped");
        }
        self.state = SyncState::Idle;
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self.state, SyncState::Syncing(_))
    }

    pub fn active_line(&self) -> Option<usize> {
        match self.state {
            SyncState::Syncing(cursor) => cursor.active_line,
            SyncState::Idle => None,
        }
    }

    /// Feed the current playback position. Returns the change if the active
    /// line moved.
    pub fn sample(&mut self, position_secs: f64, view: &mut impl LyricsView) -> Option<LineChange> {
        let SyncState::Syncing(mut cursor) = self.state else {
            return None;
        };
        let document = self.document.as_ref()?;

        let current = active_line_at(&document.lines, position_secs);
        cursor.last_queried_secs = position_secs;
        let previous = cursor.active_line;

        if current == previous {
            self.state = SyncState::Syncing(cursor);
            return None;
        }

        view.clear_active();
        match current {
            Some(index) => {
                view.mark_active(index);
                view.scroll_to(index);
                if self.typewriter_enabled {
                    let words = &document.lines[index].words;
                    view.reveal(index, &[]);
                    self.typewriter.start(index, words);
                } else {
                    self.typewriter.cancel();
                }
            }
            None => self.typewriter.cancel(),
        }

        cursor.active_line = current;
        self.state = SyncState::Syncing(cursor);
        Some(LineChange { previous, current })
    }

    /// Apply a typewriter step. Stale steps are dropped.
    pub fn handle_reveal(&mut self, step: RevealStep, view: &mut impl LyricsView) -> bool {
        if self.active_line() != Some(step.line) {
            return false;
        }
        match self.typewriter.accept(&step) {
            Some((line, words)) => {
                view.reveal(line, words);
                true
            }
            None => false,
        }
    }

    pub fn typewriter_enabled(&self) -> bool {
        self.typewriter_enabled
    }

    /// Turning the typewriter off shows the active line in full right away
    pub fn set_typewriter_enabled(&mut self, enabled: bool, view: &mut impl LyricsView) {
        self.typewriter_enabled = enabled;
        if enabled {
            return;
        }
        self.typewriter.cancel();
        if let (Some(index), Some(document)) = (self.active_line(), self.document.as_ref()) {
            view.reveal(index, &document.lines[index].words);
        }
    }

    /// Playback time to seek to when the user picks line `index`
    pub fn seek_target(&self, index: usize) -> Option<f64> {
        self.document
            .as_ref()
            .and_then(|d| d.lines.get(index))
            .map(|l| l.time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Default)]
    struct RecordingView {
        active: Option<usize>,
        scrolled_to: Vec<usize>,
        revealed: Vec<(usize, String)>,
    }

    impl LyricsView for RecordingView {
        fn clear_active(&mut self) {
            self.active = None;
        }

        fn mark_active(&mut self, index: usize) {
            self.active = Some(index);
        }

        fn scroll_to(&mut self, index: usize) {
            self.scrolled_to.push(index);
        }

        fn reveal(&mut self, index: usize, words: &[String]) {
            self.revealed.push((index, words.join(" ")));
        }
    }

    fn document(lrc: &str) -> Arc<LyricsDocument> {
        Arc::new(LyricsDocument::parse(lrc))
    }

    fn engine(typewriter: bool) -> (SyncEngine, mpsc::Receiver<RevealStep>) {
        let (tx, rx) = mpsc::channel(64);
        let tw = Typewriter::new(Duration::from_millis(50), tx);
        (SyncEngine::new(tw, typewriter), rx)
    }

    #[test]
    fn test_active_line_at() {
        let doc = document("[00:00.00]a\n[00:02.00]b\n[00:05.50]c");
        assert_eq!(active_line_at(&doc.lines, -0.5), None);
        assert_eq!(active_line_at(&doc.lines, 0.0), Some(0));
        assert_eq!(active_line_at(&doc.lines, 1.99), Some(0));
        assert_eq!(active_line_at(&doc.lines, 2.0), Some(1));
        assert_eq!(active_line_at(&doc.lines, 600.0), Some(2));
        assert_eq!(active_line_at(&[], 3.0), None);
    }

    #[test]
    fn test_sample_sequence() {
        let (mut engine, _rx) = engine(false);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:00.00]a\n[00:02.00]b\n[00:05.50]c")), &mut view);
        assert!(engine.start());

        let mut observed = Vec::new();
        for t in [0.0, 1.0, 2.1, 5.0, 6.0] {
            engine.sample(t, &mut view);
            observed.push(engine.active_line());
        }

        assert_eq!(observed, vec![Some(0), Some(0), Some(1), Some(1), Some(2)]);
        assert_eq!(view.scrolled_to, vec![0, 1, 2]);
        assert_eq!(view.active, Some(2));
        assert_eq!(
            engine.state(),
            SyncState::Syncing(PlaybackCursor {
                active_line: Some(2),
                last_queried_secs: 6.0
            })
        );
    }

    #[test]
    fn test_before_first_line_has_no_active_line() {
        let (mut engine, _rx) = engine(false);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:03.00]late start")), &mut view);
        engine.start();

        assert_eq!(engine.sample(1.0, &mut view), None);
        assert_eq!(engine.active_line(), None);
        assert_eq!(
            engine.sample(3.0, &mut view),
            Some(LineChange {
                previous: None,
                current: Some(0)
            })
        );
    }

    #[test]
    fn test_seek_back_recomputes_through_normal_scan() {
        let (mut engine, _rx) = engine(false);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:01.00]a\n[00:04.00]b\n[00:08.00]c")), &mut view);
        engine.start();
        engine.sample(9.0, &mut view);

        let target = engine.seek_target(1).unwrap();
        assert_eq!(target, 4.0);
        engine.sample(target, &mut view);
        assert_eq!(engine.active_line(), Some(1));

        engine.sample(0.5, &mut view);
        assert_eq!(engine.active_line(), None);
        assert_eq!(view.active, None);
        assert_eq!(engine.seek_target(7), None);
    }

    #[test]
    fn test_cannot_start_without_timed_lines() {
        let (mut engine, _rx) = engine(false);
        let mut view = RecordingView::default();
        assert!(!engine.start());

        engine.load(Some(Arc::new(LyricsDocument::plain("no timing"))), &mut view);
        assert!(!engine.start());
        assert_eq!(engine.sample(5.0, &mut view), None);
        assert_eq!(engine.state(), SyncState::Idle);
    }

    #[test]
    fn test_stop_and_track_change_end_session() {
        let (mut engine, _rx) = engine(false);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:00.00]a\n[00:02.00]b")), &mut view);
        engine.start();
        engine.sample(2.5, &mut view);

        engine.stop();
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.sample(0.0, &mut view), None);

        engine.start();
        engine.load(Some(document("[00:00.00]new")), &mut view);
        assert!(!engine.is_syncing());
        assert_eq!(view.active, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_line_change_cancels_previous_reveal() {
        let (mut engine, mut rx) = engine(true);
        let mut view = RecordingView::default();
        engine.load(
            Some(document("[00:00.00]first line has words\n[00:01.00]second line")),
            &mut view,
        );
        engine.start();

        engine.sample(0.1, &mut view);
        tokio::task::yield_now().await;
        engine.sample(1.2, &mut view);

        while let Ok(Some(step)) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            engine.handle_reveal(step, &mut view);
        }

        let switch = view
            .revealed
            .iter()
            .position(|(line, words)| *line == 1 && words.is_empty())
            .unwrap();
        assert!(view.revealed[switch..].iter().all(|(line, _)| *line == 1));
        assert_eq!(view.revealed.last().unwrap(), &(1, "second line".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_reveal() {
        let (mut engine, mut rx) = engine(true);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:00.00]one two three")), &mut view);
        engine.start();
        engine.sample(0.0, &mut view);
        tokio::task::yield_now().await;
        engine.stop();

        while let Ok(Some(step)) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            assert!(!engine.handle_reveal(step, &mut view));
        }
        assert_eq!(view.revealed, vec![(0, String::new())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_typewriter_shows_full_line() {
        let (mut engine, _rx) = engine(true);
        let mut view = RecordingView::default();
        engine.load(Some(document("[00:00.00]one two three")), &mut view);
        engine.start();
        engine.sample(0.0, &mut view);

        engine.set_typewriter_enabled(false, &mut view);
        assert_eq!(view.revealed.last().unwrap(), &(0, "one two three".to_string()));
        assert!(!engine.typewriter_enabled());
    }
}
