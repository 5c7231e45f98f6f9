//! Word-by-word reveal of the active lyric line
//!
//! Each reveal runs as its own timer task and reports progress as
//! [`RevealStep`]s over a channel. Steps carry the generation they were
//! started with; once a reveal is cancelled or replaced, its steps are
//! rejected by [`Typewriter::accept`] even if they are already queued.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStep {
    pub generation: u64,
    pub line: usize,
    /// Number of words visible after this step
    pub visible: usize,
}

#[derive(Debug)]
struct Reveal {
    line: usize,
    words: Vec<String>,
}

#[derive(Debug)]
pub struct Typewriter {
    delay: Duration,
    tx: mpsc::Sender<RevealStep>,
    generation: u64,
    current: Option<Reveal>,
    task: Option<JoinHandle<()>>,
}

impl Typewriter {
    pub fn new(delay: Duration, tx: mpsc::Sender<RevealStep>) -> Self {
        Self {
            delay,
            tx,
            generation: 0,
            current: None,
            task: None,
        }
    }

    /// Start revealing `words` for `line`, replacing any reveal in flight.
    /// The first word is shown immediately, the rest one per delay.
    pub fn start(&mut self, line: usize, words: &[String]) {
        self.cancel();
        if words.is_empty() {
            return;
        }

        let generation = self.generation;
        let count = words.len();
        let delay = self.delay;
        let tx = self.tx.clone();

        self.current = Some(Reveal {
            line,
            words: words.to_vec(),
        });
        self.task = Some(tokio::spawn(async move {
            for visible in 1..=count {
                let step = RevealStep {
                    generation,
                    line,
                    visible,
                };
                if tx.send(step).await.is_err() {
                    break;
                }
                if visible < count {
                    tokio::time::sleep(delay).await;
                }
            }
        }));
    }

    /// Stop the reveal in flight. Steps it already queued become stale.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.current = None;
        self.generation += 1;
    }

    /// The words to show for `step`, or `None` if the step is stale
    pub fn accept(&self, step: &RevealStep) -> Option<(usize, &[String])> {
        let reveal = self.current.as_ref()?;
        if step.generation != self.generation || step.line != reveal.line {
            return None;
        }
        let visible = step.visible.min(reveal.words.len());
        Some((reveal.line, &reveal.words[..visible]))
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    /// Drain every step the typewriter produces until the channel goes quiet
    async fn drain(rx: &mut mpsc::Receiver<RevealStep>) -> Vec<RevealStep> {
        let mut steps = Vec::new();
        while let Ok(Some(step)) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            steps.push(step);
        }
        steps
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveals_one_word_per_delay() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut tw = Typewriter::new(Duration::from_millis(50), tx);
        let start = tokio::time::Instant::now();

        tw.start(3, &words("never gonna give"));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let step = rx.recv().await.unwrap();
            let (line, shown) = tw.accept(&step).unwrap();
            seen.push((line, shown.join(" "), start.elapsed().as_millis()));
        }

        assert_eq!(
            seen,
            vec![
                (3, "never".to_string(), 0),
                (3, "never gonna".to_string(), 50),
                (3, "never gonna give".to_string(), 100),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_lines_never_shows_old_words() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut tw = Typewriter::new(Duration::from_millis(50), tx);

        tw.start(0, &words("alpha beta gamma delta"));
        // Let line 0 get its first word out before the switch.
        tokio::task::yield_now().await;
        tw.start(1, &words("one two"));

        let steps = drain(&mut rx).await;
        let accepted: Vec<(usize, Vec<String>)> = steps
            .iter()
            .filter_map(|s| tw.accept(s).map(|(l, w)| (l, w.to_vec())))
            .collect();

        assert_eq!(
            accepted,
            vec![(1, words("one")), (1, words("one two"))]
        );
        assert!(accepted.iter().all(|(line, _)| *line == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_rejects_queued_steps() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut tw = Typewriter::new(Duration::from_millis(50), tx);

        tw.start(2, &words("a b c"));
        tokio::task::yield_now().await;
        tw.cancel();

        let steps = drain(&mut rx).await;
        assert!(steps.iter().all(|s| tw.accept(s).is_none()));
        assert!(tw.task.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_words_start_nothing() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut tw = Typewriter::new(Duration::from_millis(50), tx);

        tw.start(0, &[]);
        assert!(tw.task.is_none());
        assert!(drain(&mut rx).await.is_empty());
    }
}
