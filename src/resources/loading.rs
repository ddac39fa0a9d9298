//! Progress tracking for the texture loads.
//!
//! Every tracked load calls [`LoadingManager::item_start`] before it begins and
//! [`LoadingManager::item_end`] once it finished, whether it succeeded or not.
//! Each end yields a [`LoadProgress`] that the [`ProgressBar`] turns into the
//! horizontal scale of its fill.

/// How a finished load counts towards the loading bar.
#[derive(Clone, Copy, Debug)]
pub enum Finished<'a> {
    Loaded(&'a str),
    Failed(&'a str, &'a anyhow::Error),
    /// Loads the manager never started, such as the skybox and the models.
    Untracked,
}

/// One progress notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub url: String,
    pub items_loaded: usize,
    pub items_total: usize,
}

impl LoadProgress {
    pub fn ratio(&self) -> f32 {
        if self.items_total == 0 {
            1.0
        } else {
            self.items_loaded as f32 / self.items_total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.items_loaded >= self.items_total
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadingManager {
    items_loaded: usize,
    items_total: usize,
    failed: Vec<String>,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_start(&mut self, url: &str) {
        self.items_total += 1;
        log::debug!("loading {url} ({} tracked)", self.items_total);
    }

    pub fn item_end(&mut self, url: &str) -> LoadProgress {
        self.items_loaded = (self.items_loaded + 1).min(self.items_total);
        LoadProgress {
            url: url.to_string(),
            items_loaded: self.items_loaded,
            items_total: self.items_total,
        }
    }

    /// Records the failure and ends the item, so a broken asset never blocks completion.
    pub fn item_error(&mut self, url: &str, error: &anyhow::Error) -> LoadProgress {
        log::warn!("failed to load {url}: {error:#}");
        self.failed.push(url.to_string());
        self.item_end(url)
    }

    /// Ends a tracked item and moves `bar` along. Untracked loads change neither.
    pub fn finish(&mut self, bar: &mut ProgressBar, finished: Finished<'_>) -> Option<LoadProgress> {
        let progress = match finished {
            Finished::Loaded(url) => self.item_end(url),
            Finished::Failed(url, error) => self.item_error(url, error),
            Finished::Untracked => return None,
        };
        bar.on_progress(&progress);
        Some(progress)
    }

    pub fn items_loaded(&self) -> usize {
        self.items_loaded
    }

    pub fn items_total(&self) -> usize {
        self.items_total
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.items_loaded == self.items_total
    }
}

/// The loading bar: visible with an empty fill until every item finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressBar {
    scale_x: f32,
    visible: bool,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBar {
    pub fn new() -> Self {
        Self {
            scale_x: 0.0,
            visible: true,
        }
    }

    pub fn on_progress(&mut self, progress: &LoadProgress) {
        self.scale_x = progress.ratio();
        if progress.is_complete() {
            self.on_load();
        }
    }

    pub fn on_load(&mut self) {
        self.visible = false;
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// CSS transform for the `.progressbar` element.
    pub fn css_transform(&self) -> String {
        format!("scaleX({})", self.scale_x)
    }
}
