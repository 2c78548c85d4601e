//! Debounced auto-preview.
//!
//! Every committed model change is handed to [`PreviewScheduler::notify`],
//! usually through a [`PreviewNotifier`] attached to the editor session.
//! The scheduler waits until no change has arrived for the quiet period,
//! then renders the latest snapshot. Requests are never cancelled; a
//! response is published only if no newer request has fired since.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use trackcut_common::{Debouncer, EditorConfig, TrackcutResult};
use trackcut_edit_core::ChangeSink;
use trackcut_project_model::Project;

use crate::service::{RenderOutput, RenderService, RenderStatus};

/// Latest published preview.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    Idle,
    Ready { generation: u64, url: String },
    /// Timeline has no clips.
    Empty { generation: u64 },
    Failed { generation: u64, message: String },
}

impl PreviewState {
    pub fn generation(&self) -> u64 {
        match self {
            PreviewState::Idle => 0,
            PreviewState::Ready { generation, .. }
            | PreviewState::Empty { generation }
            | PreviewState::Failed { generation, .. } => *generation,
        }
    }

    fn from_result(generation: u64, result: TrackcutResult<RenderOutput>) -> Self {
        match result {
            Ok(out) if out.is_ready() => PreviewState::Ready {
                generation,
                url: out.url,
            },
            Ok(RenderOutput {
                status: RenderStatus::Empty,
                ..
            }) => PreviewState::Empty { generation },
            Ok(out) => PreviewState::Failed {
                generation,
                message: format!("preview finished with status {:?}", out.status),
            },
            Err(e) => PreviewState::Failed {
                generation,
                message: e.to_string(),
            },
        }
    }
}

/// Cloneable sender of snapshots into a running [`PreviewScheduler`].
#[derive(Debug, Clone)]
pub struct PreviewNotifier {
    changes: mpsc::UnboundedSender<Project>,
}

impl PreviewNotifier {
    /// Report a committed change. Restarts the quiet period.
    pub fn notify(&self, project: Project) {
        if self.changes.send(project).is_err() {
            tracing::warn!("Preview task is gone; change ignored");
        }
    }
}

impl ChangeSink for PreviewNotifier {
    fn project_changed(&self, revision: u64, project: &Project) {
        tracing::trace!(revision, "Queueing preview");
        self.notify(project.clone());
    }
}

/// Handle to the background preview task.
pub struct PreviewScheduler {
    notifier: PreviewNotifier,
    stop: oneshot::Sender<()>,
    state: watch::Receiver<PreviewState>,
    task: JoinHandle<()>,
}

impl PreviewScheduler {
    /// Start the scheduler on the current tokio runtime.
    pub fn spawn<R>(service: Arc<R>, delay: Duration) -> Self
    where
        R: RenderService + 'static,
    {
        let (changes, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let (state_tx, state) = watch::channel(PreviewState::Idle);
        let debouncer = Debouncer::new(delay);
        tracing::debug!(
            delay_ms = debouncer.delay().as_millis() as u64,
            "Preview scheduler started"
        );
        let task = tokio::spawn(run(service, debouncer, rx, stop_rx, state_tx));
        Self {
            notifier: PreviewNotifier { changes },
            stop,
            state,
            task,
        }
    }

    /// Start the scheduler with the configured quiet period.
    pub fn from_config<R>(service: Arc<R>, config: &EditorConfig) -> Self
    where
        R: RenderService + 'static,
    {
        Self::spawn(service, config.preview_debounce())
    }

    /// Handle for feeding snapshots from elsewhere, typically passed to
    /// `EditorSession::set_change_sink`.
    pub fn notifier(&self) -> PreviewNotifier {
        self.notifier.clone()
    }

    /// Report a committed change. Restarts the quiet period.
    pub fn notify(&self, project: Project) {
        self.notifier.notify(project);
    }

    /// Most recently published preview.
    pub fn current(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.clone()
    }

    /// Stop accepting changes and wait for the task to drain. Changes
    /// already sent are still rendered; later ones from notifiers are
    /// ignored.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Preview task ended abnormally");
        }
    }
}

async fn run<R>(
    service: Arc<R>,
    mut debouncer: Debouncer,
    mut changes: mpsc::UnboundedReceiver<Project>,
    mut stop: oneshot::Receiver<()>,
    state: watch::Sender<PreviewState>,
) where
    R: RenderService + 'static,
{
    let (done_tx, mut done) = mpsc::unbounded_channel::<(u64, TrackcutResult<RenderOutput>)>();
    let mut pending: Option<Project> = None;
    let mut open = true;
    let mut outstanding = 0usize;

    while open || pending.is_some() || outstanding > 0 {
        let deadline = debouncer
            .deadline()
            .map(Instant::from_std)
            .unwrap_or_else(Instant::now);

        tokio::select! {
            change = changes.recv(), if open => match change {
                Some(project) => {
                    pending = Some(project);
                    debouncer.touch(Instant::now().into_std());
                }
                None => open = false,
            },
            _ = &mut stop, if open => {
                open = false;
                while let Ok(project) = changes.try_recv() {
                    pending = Some(project);
                    debouncer.touch(Instant::now().into_std());
                }
            },
            _ = tokio::time::sleep_until(deadline), if debouncer.is_pending() => {
                let Some(generation) = debouncer.poll(Instant::now().into_std()) else {
                    continue;
                };
                let Some(project) = pending.take() else {
                    continue;
                };
                tracing::debug!(generation, clips = project.clip_count(), "Requesting preview");
                outstanding += 1;
                let service = Arc::clone(&service);
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let result = service.request_preview(&project).await;
                    let _ = done_tx.send((generation, result));
                });
            },
            Some((generation, result)) = done.recv(), if outstanding > 0 => {
                outstanding -= 1;
                if !debouncer.is_latest(generation) {
                    tracing::debug!(generation, latest = debouncer.latest_generation(), "Discarding stale preview");
                    continue;
                }
                let next = PreviewState::from_result(generation, result);
                if let PreviewState::Failed { message, .. } = &next {
                    tracing::warn!(generation, %message, "Preview failed");
                }
                state.send_replace(next);
            },
            else => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use trackcut_edit_core::{EditorSession, PlacementMode};
    use trackcut_project_model::{Asset, AssetLibrary, Clip, MediaKind};

    use crate::test_support::FakeRenderService;

    const DELAY: Duration = Duration::from_millis(1000);

    fn project_with_clip(id: &str) -> Project {
        let mut project = Project::with_layout(1);
        project.id = id.to_string();
        project
            .insert_clip(Clip {
                id: "c1".to_string(),
                track_id: "audio-1".to_string(),
                source_path: "media/uploads/a.wav".to_string(),
                start_time: 0.0,
                end_time: 2.0,
                source_start: 0.0,
                kind: MediaKind::Audio,
                volume: 1.0,
                speed: 1.0,
                z_index: 0,
                linked_id: None,
            })
            .unwrap();
        project
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_sends_one_request() {
        let service = Arc::new(FakeRenderService::default());
        let scheduler = PreviewScheduler::spawn(service.clone(), DELAY);

        for _ in 0..5 {
            scheduler.notify(project_with_clip("p1"));
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(service.preview_count(), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(service.preview_count(), 1);
        assert!(matches!(scheduler.current(), PreviewState::Ready { generation: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_timeline_reports_empty() {
        let service = Arc::new(FakeRenderService::default());
        let scheduler = PreviewScheduler::spawn(service, DELAY);

        scheduler.notify(Project::with_layout(1));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;
        assert_eq!(scheduler.current(), PreviewState::Empty { generation: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_response_is_discarded() {
        let service = Arc::new(FakeRenderService {
            preview_latencies: Mutex::new(VecDeque::from([
                Duration::from_secs(5),
                Duration::from_millis(10),
            ])),
            ..Default::default()
        });
        let scheduler = PreviewScheduler::spawn(service.clone(), DELAY);

        scheduler.notify(project_with_clip("p1"));
        tokio::time::sleep(Duration::from_millis(1100)).await; // first request fires, slow
        scheduler.notify(project_with_clip("p2"));
        tokio::time::sleep(Duration::from_millis(1100)).await; // second fires and returns
        settle().await;
        let after_second = scheduler.current();
        assert!(matches!(
            &after_second,
            PreviewState::Ready { generation: 2, url } if url.contains("p2")
        ));

        tokio::time::sleep(Duration::from_secs(5)).await; // first finally returns
        settle().await;
        assert_eq!(scheduler.current(), after_second);
        assert_eq!(service.preview_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_change() {
        let service = Arc::new(FakeRenderService::default());
        let scheduler = PreviewScheduler::spawn(service.clone(), DELAY);
        let mut updates = scheduler.subscribe();

        scheduler.notify(project_with_clip("p1"));
        let waiter = tokio::spawn(async move {
            updates.changed().await.unwrap();
            updates.borrow().generation()
        });
        scheduler.shutdown().await;
        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(service.preview_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_edits_preview_final_snapshot() {
        let service = Arc::new(FakeRenderService::default());
        let config = EditorConfig {
            preview_debounce_ms: 500,
            ..EditorConfig::default()
        };
        let scheduler = PreviewScheduler::from_config(service.clone(), &config);

        let mut library = AssetLibrary::new();
        library.register(Asset {
            id: "snd".to_string(),
            filename: "snd.wav".to_string(),
            url: "/uploads/snd.wav".to_string(),
            kind: MediaKind::Audio,
            duration: 2.0,
        });
        let mut session = EditorSession::new(Project::with_layout(1), library, config);
        session.set_change_sink(Arc::new(scheduler.notifier()));

        let mut last = None;
        for _ in 0..3 {
            last = Some(session.place("snd", None, PlacementMode::Append).unwrap());
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let last = last.unwrap();
        session.set_volume(&last.clip_id, 0.5).unwrap();
        assert_eq!(service.preview_count(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        settle().await;
        assert_eq!(service.preview_count(), 1);
        let rendered = service.previews.lock().unwrap().clone();
        assert_eq!(rendered, vec![session.project().clone()]);
        assert_eq!(rendered[0].clip(&last.clip_id).unwrap().volume, 0.5);
        assert!(matches!(scheduler.current(), PreviewState::Ready { generation: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_does_not_wait_for_live_notifiers() {
        let service = Arc::new(FakeRenderService::default());
        let scheduler = PreviewScheduler::spawn(service.clone(), DELAY);
        let notifier = scheduler.notifier();

        notifier.notify(project_with_clip("p1"));
        scheduler.shutdown().await;
        assert_eq!(service.preview_count(), 1);

        // The task is gone; this is dropped with a warning.
        notifier.notify(project_with_clip("p2"));
        assert_eq!(service.preview_count(), 1);
    }
}
