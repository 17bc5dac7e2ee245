//! Terminal rendering of purge progress.
//!
//! Interactive terminals get an indicatif bar with report lines printed above
//! it. Anything else (pipes, log files) gets plain lines only.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use vblkpurge_lib::progress::{ProgressCallback, ProgressId, ProgressInfo};

/// Plain-line callback for non-interactive output.
pub struct LineProgressCallback {
    totals: Mutex<HashMap<u64, (u64, u64)>>,
    next_id: Mutex<u64>,
}

impl LineProgressCallback {
    pub fn new() -> Self {
        Self {
            totals: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    fn print_line(&self, line: &str) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

impl Default for LineProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for LineProgressCallback {
    fn start(&self, info: ProgressInfo) -> ProgressId {
        let id = self.next_id();
        self.totals
            .lock()
            .unwrap()
            .insert(id, (info.current, info.total));
        self.print_line(&info.message);
        ProgressId(id)
    }

    fn update_message(&self, _id: ProgressId, _message: String) {}

    fn increment(&self, id: ProgressId, delta: u64) {
        if let Some((current, _)) = self.totals.lock().unwrap().get_mut(&id.0) {
            *current = current.saturating_add(delta);
        }
    }

    fn finish(&self, id: ProgressId, final_message: String) {
        let counts = self.totals.lock().unwrap().remove(&id.0);
        match counts {
            Some((current, total)) => {
                self.print_line(&format!("{} ({}/{})", final_message, current, total))
            }
            None => self.print_line(&final_message),
        }
    }

    fn println(&self, line: String) {
        self.print_line(&line);
    }
}

/// indicatif based callback for interactive terminals.
pub struct IndicatifProgressCallback {
    multi_progress: MultiProgress,
    progress_bars: Arc<Mutex<HashMap<u64, ProgressBar>>>,
    next_id: Arc<Mutex<u64>>,
}

impl IndicatifProgressCallback {
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            progress_bars: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }
}

impl Default for IndicatifProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for IndicatifProgressCallback {
    fn start(&self, info: ProgressInfo) -> ProgressId {
        let id = self.next_id();

        let bar = self.multi_progress.add(ProgressBar::new(info.total));
        bar.set_style(
            ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message(info.message);
        bar.set_position(info.current);

        self.progress_bars.lock().unwrap().insert(id, bar);

        ProgressId(id)
    }

    fn update_message(&self, id: ProgressId, message: String) {
        if let Ok(bars) = self.progress_bars.lock()
            && let Some(bar) = bars.get(&id.0)
        {
            bar.set_message(message);
        }
    }

    fn increment(&self, id: ProgressId, delta: u64) {
        if let Ok(bars) = self.progress_bars.lock()
            && let Some(bar) = bars.get(&id.0)
        {
            bar.inc(delta);
        }
    }

    fn finish(&self, id: ProgressId, final_message: String) {
        if let Ok(mut bars) = self.progress_bars.lock()
            && let Some(bar) = bars.remove(&id.0)
        {
            bar.finish_with_message(final_message);
        }
    }

    fn println(&self, line: String) {
        let _ = self.multi_progress.println(line);
    }
}

pub fn create_progress_callback() -> Arc<dyn ProgressCallback> {
    if io::stdout().is_terminal() {
        Arc::new(IndicatifProgressCallback::new())
    } else {
        Arc::new(LineProgressCallback::new())
    }
}
