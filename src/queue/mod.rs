use crate::content::Track;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }
}

/// The play order over the catalog
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    current_index: Option<usize>,
    shuffle_enabled: bool,
    shuffle_order: Vec<usize>,
    repeat: RepeatMode,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue and point at `start`
    pub fn replace(&mut self, tracks: Vec<Track>, start: usize) {
        self.tracks = tracks;
        self.current_index = (start < self.tracks.len()).then_some(start);
        self.rebuild_shuffle_order();
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle_enabled = !self.shuffle_enabled;
        self.rebuild_shuffle_order();
    }

    pub fn is_shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    /// Skip forward. Wraps only with repeat-all.
    pub fn advance(&mut self) -> Option<&Track> {
        let current = self.current_index?;
        let next = self
            .next_index(current)
            .or_else(|| (self.repeat == RepeatMode::All).then(|| self.first_index()).flatten())?;
        self.current_index = Some(next);
        self.tracks.get(next)
    }

    pub fn go_back(&mut self) -> Option<&Track> {
        let current = self.current_index?;
        let prev = self.prev_index(current)?;
        self.current_index = Some(prev);
        self.tracks.get(prev)
    }

    /// What to play once the current track finishes on its own
    pub fn on_track_ended(&mut self) -> Option<&Track> {
        if self.repeat == RepeatMode::One {
            return self.current_track();
        }
        self.advance()
    }

    fn first_index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else if self.shuffle_enabled {
            self.shuffle_order.first().copied()
        } else {
            Some(0)
        }
    }

    fn next_index(&self, current: usize) -> Option<usize> {
        if self.shuffle_enabled && !self.shuffle_order.is_empty() {
            let pos = self.shuffle_order.iter().position(|&x| x == current)?;
            self.shuffle_order.get(pos + 1).copied()
        } else {
            (current + 1 < self.tracks.len()).then_some(current + 1)
        }
    }

    fn prev_index(&self, current: usize) -> Option<usize> {
        if self.shuffle_enabled && !self.shuffle_order.is_empty() {
            let pos = self.shuffle_order.iter().position(|&x| x == current)?;
            pos.checked_sub(1).map(|p| self.shuffle_order[p])
        } else {
            current.checked_sub(1)
        }
    }

    fn rebuild_shuffle_order(&mut self) {
        if !self.shuffle_enabled || self.tracks.is_empty() {
            self.shuffle_order.clear();
            return;
        }

        let mut rng = rand::rng();
        self.shuffle_order = (0..self.tracks.len()).collect();
        self.shuffle_order.shuffle(&mut rng);

        // The playing track leads the shuffled order.
        if let Some(current) = self.current_index
            && let Some(pos) = self.shuffle_order.iter().position(|&x| x == current)
        {
            self.shuffle_order.swap(0, pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: "Juice WRLD".to_string(),
            album: None,
            duration: Some("3:00".to_string()),
            audio_url: format!("music/{}.mp3", id),
            image_url: None,
            lrc_file: None,
        }
    }

    fn three() -> Vec<Track> {
        vec![make_track("1"), make_track("2"), make_track("3")]
    }

    #[test]
    fn test_replace_points_at_start() {
        let mut queue = Queue::new();
        queue.replace(three(), 1);
        assert_eq!(queue.current_track().unwrap().id, "2");

        queue.replace(three(), 9);
        assert!(queue.current_track().is_none());
        assert!(queue.advance().is_none());
    }

    #[test]
    fn test_advance_stops_at_end_without_repeat() {
        let mut queue = Queue::new();
        queue.replace(three(), 0);

        assert_eq!(queue.advance().unwrap().id, "2");
        assert_eq!(queue.advance().unwrap().id, "3");
        assert!(queue.advance().is_none());
        assert!(queue.on_track_ended().is_none());
        assert_eq!(queue.go_back().unwrap().id, "2");
    }

    #[test]
    fn test_repeat_modes() {
        let mut queue = Queue::new();
        queue.replace(three(), 2);

        assert_eq!(queue.cycle_repeat(), RepeatMode::All);
        assert_eq!(queue.on_track_ended().unwrap().id, "1");

        assert_eq!(queue.cycle_repeat(), RepeatMode::One);
        assert_eq!(queue.on_track_ended().unwrap().id, "1");
        // Manual skip still moves on.
        assert_eq!(queue.advance().unwrap().id, "2");

        assert_eq!(queue.cycle_repeat(), RepeatMode::Off);
    }

    #[test]
    fn test_shuffle_visits_every_track_once() {
        let mut queue = Queue::new();
        queue.replace(three(), 1);
        queue.toggle_shuffle();
        assert!(queue.is_shuffle_enabled());

        let mut seen = vec![queue.current_track().unwrap().id.clone()];
        while let Some(t) = queue.advance() {
            seen.push(t.id.clone());
        }
        assert_eq!(seen[0], "2");
        seen.sort();
        assert_eq!(seen, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_empty_queue_has_nothing_to_play() {
        let mut queue = Queue::new();
        queue.replace(Vec::new(), 0);

        assert!(queue.current_track().is_none());
        assert!(queue.advance().is_none());
        assert!(queue.go_back().is_none());
        assert!(queue.on_track_ended().is_none());
    }
}
