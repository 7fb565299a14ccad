//! Scene mount
//!
//! Binds a [`VisibilityGate`] to at most one scene. Gate actions are applied
//! as they arrive; construction is asynchronous, so the mount also handles
//! the cases where the gate changes its mind while a scene is being built:
//!
//! - unmounted before construction settles: the new scene is disposed
//!   immediately and never started
//! - scrolled away before construction settles: the scene is kept paused
//!   until the next true verdict
//!
//! Spawning requires a Tokio runtime.

use async_trait::async_trait;
use palette::NumericColorMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::gate::{GateAction, Presentation, QualityProfile, Rect, VisibilityGate};
use crate::manager::{SceneManager, SceneState};

/// Input handed to a [`SceneFactory`]
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRequest {
    /// Palette colors read at construction time
    pub colors: NumericColorMap,
    /// Quality settings for this device
    pub quality: QualityProfile,
}

/// Builds scenes for a mount
#[async_trait]
pub trait SceneFactory: Send + Sync {
    /// Construct a scene with its generators; the scene is returned unstarted
    async fn create(&self, request: SceneRequest) -> Result<SceneManager>;
}

/// Observable mount status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStatus {
    /// No scene requested yet
    Idle,
    /// Construction in flight
    Constructing,
    /// Scene available in the given state
    Ready(SceneState),
    /// Construction failed; the gradient stays up
    Failed,
    /// Unmounted
    Disposed,
}

enum MountPhase {
    Idle,
    Constructing,
    Ready(SceneManager),
    Failed,
    Disposed,
}

struct MountInner {
    gate: VisibilityGate,
    phase: MountPhase,
    constructions: usize,
}

/// One scene slot on the page
#[derive(Clone)]
pub struct SceneMount {
    inner: Arc<Mutex<MountInner>>,
    factory: Arc<dyn SceneFactory>,
    colors: NumericColorMap,
}

impl SceneMount {
    /// Create a mount; nothing is constructed until the gate first opens
    pub fn new(
        gate: VisibilityGate,
        factory: Arc<dyn SceneFactory>,
        colors: NumericColorMap,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MountInner {
                gate,
                phase: MountPhase::Idle,
                constructions: 0,
            })),
            factory,
            colors,
        }
    }

    /// Intersection changed
    ///
    /// Returns the construction task when this event started one.
    pub fn set_intersecting(&self, intersecting: bool) -> Option<JoinHandle<()>> {
        let action = self.inner.lock().gate.set_intersecting(intersecting);
        self.apply(action)
    }

    /// Element or viewport geometry changed
    pub fn observe_geometry(&self, element: Rect, viewport: Rect) -> Option<JoinHandle<()>> {
        let action = self.inner.lock().gate.observe_geometry(element, viewport);
        self.apply(action)
    }

    /// OS reduced-motion preference changed
    pub fn set_os_reduced_motion(&self, reduced: Option<bool>) -> Option<JoinHandle<()>> {
        let action = self.inner.lock().gate.set_os_reduced_motion(reduced);
        self.apply(action)
    }

    /// Manual reduced-motion override changed
    pub fn set_motion_override(&self, reduced: Option<bool>) -> Option<JoinHandle<()>> {
        let action = self.inner.lock().gate.set_motion_override(reduced);
        self.apply(action)
    }

    /// Tear down the mount; a construction still in flight is disposed on arrival
    pub fn unmount(&self) {
        let mut inner = self.inner.lock();
        inner.gate.unmount();
        let phase = std::mem::replace(&mut inner.phase, MountPhase::Disposed);
        if let MountPhase::Ready(mut scene) = phase {
            scene.dispose();
        }
        debug!("Scene mount unmounted");
    }

    /// Animated scene or static gradient
    pub fn presentation(&self) -> Presentation {
        self.inner.lock().gate.presentation()
    }

    /// Current status
    pub fn status(&self) -> MountStatus {
        match &self.inner.lock().phase {
            MountPhase::Idle => MountStatus::Idle,
            MountPhase::Constructing => MountStatus::Constructing,
            MountPhase::Ready(scene) => MountStatus::Ready(scene.state()),
            MountPhase::Failed => MountStatus::Failed,
            MountPhase::Disposed => MountStatus::Disposed,
        }
    }

    /// Number of constructions started; never more than one
    pub fn construction_count(&self) -> usize {
        self.inner.lock().constructions
    }

    /// Run `f` against the scene if one is ready
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut SceneManager) -> R) -> Option<R> {
        match &mut self.inner.lock().phase {
            MountPhase::Ready(scene) => Some(f(scene)),
            _ => None,
        }
    }

    fn apply(&self, action: GateAction) -> Option<JoinHandle<()>> {
        let mut inner = self.inner.lock();
        match action {
            GateAction::None => None,
            GateAction::Initialize => {
                if !matches!(inner.phase, MountPhase::Idle) {
                    return None;
                }
                inner.phase = MountPhase::Constructing;
                inner.constructions += 1;
                let request = SceneRequest {
                    colors: self.colors.clone(),
                    quality: inner.gate.quality().clone(),
                };
                drop(inner);
                Some(self.spawn_construction(request))
            }
            GateAction::Start => {
                if let MountPhase::Ready(scene) = &mut inner.phase {
                    scene.start();
                }
                None
            }
            GateAction::Stop => {
                if let MountPhase::Ready(scene) = &mut inner.phase {
                    scene.stop();
                }
                None
            }
            GateAction::Dispose => {
                let phase = std::mem::replace(&mut inner.phase, MountPhase::Disposed);
                if let MountPhase::Ready(mut scene) = phase {
                    scene.dispose();
                }
                None
            }
        }
    }

    fn spawn_construction(&self, request: SceneRequest) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let factory = Arc::clone(&self.factory);

        tokio::spawn(async move {
            let result = factory.create(request).await;
            let mut inner = inner.lock();

            match result {
                Ok(mut scene) => {
                    if matches!(inner.phase, MountPhase::Disposed) {
                        debug!("Scene settled after unmount, disposing");
                        scene.dispose();
                        return;
                    }
                    if inner.gate.is_running() {
                        scene.start();
                    }
                    info!(state = %scene.state(), "Scene ready");
                    inner.phase = MountPhase::Ready(scene);
                }
                Err(e) => {
                    warn!(error = %e, "Scene construction failed, keeping static gradient");
                    if !matches!(inner.phase, MountPhase::Disposed) {
                        inner.phase = MountPhase::Failed;
                    }
                }
            }
        })
    }
}

impl std::fmt::Debug for SceneMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneMount")
            .field("status", &self.status())
            .field("constructions", &self.construction_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateConfig, MotionPreference};
    use crate::resources::ResourceKind;
    use crate::test_utils::{StaticProbe, TestSceneFactory};
    use palette::builtin_registry;

    fn mount_with(factory: Arc<TestSceneFactory>, probe: &StaticProbe) -> SceneMount {
        let gate = VisibilityGate::new(GateConfig::default(), probe, MotionPreference::default());
        let colors = builtin_registry().context_for("midnight-river").numeric().clone();
        SceneMount::new(gate, factory, colors)
    }

    #[tokio::test]
    async fn test_first_intersection_constructs_and_starts() {
        let factory = Arc::new(TestSceneFactory::new());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());

        let task = mount.set_intersecting(true).expect("construction spawned");
        task.await.unwrap();

        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Running));
        assert_eq!(mount.construction_count(), 1);
        assert_eq!(mount.with_scene(|s| s.generator_count()), Some(4));
        assert_eq!(factory.built()[0].scheduler.active_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_intersection_constructs_once() {
        let factory = Arc::new(TestSceneFactory::new());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());

        let task = mount.set_intersecting(true).unwrap();
        assert!(mount.set_intersecting(true).is_none());
        task.await.unwrap();
        assert!(mount.set_intersecting(false).is_none());
        assert!(mount.set_intersecting(true).is_none());

        assert_eq!(factory.calls(), 1);
        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Running));
    }

    #[tokio::test]
    async fn test_unmount_during_construction_disposes_on_arrival() {
        let factory = Arc::new(TestSceneFactory::held());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());

        let task = mount.set_intersecting(true).unwrap();
        assert_eq!(mount.status(), MountStatus::Constructing);
        mount.unmount();
        factory.release();
        task.await.unwrap();

        let built = factory.built();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].surface.log().disposed, 1);
        assert_eq!(built[0].scheduler.requested(), 0);
        assert_eq!(factory.tracker().live(), 0);
        assert_eq!(mount.status(), MountStatus::Disposed);
    }

    #[tokio::test]
    async fn test_scrolled_away_during_construction_stays_paused() {
        let factory = Arc::new(TestSceneFactory::held());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());

        let task = mount.set_intersecting(true).unwrap();
        mount.set_intersecting(false);
        factory.release();
        task.await.unwrap();

        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Constructed));
        assert_eq!(factory.built()[0].scheduler.requested(), 0);

        mount.set_intersecting(true);
        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Running));
    }

    #[tokio::test]
    async fn test_failed_construction_keeps_gradient() {
        let factory = Arc::new(TestSceneFactory::failing());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());

        mount.set_intersecting(true).unwrap().await.unwrap();

        assert_eq!(mount.status(), MountStatus::Failed);
        assert!(mount.set_intersecting(false).is_none());
        assert!(mount.set_intersecting(true).is_none());
        assert_eq!(factory.calls(), 1);
    }

    #[tokio::test]
    async fn test_reduced_motion_pauses_running_scene() {
        let factory = Arc::new(TestSceneFactory::new());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());
        mount.set_intersecting(true).unwrap().await.unwrap();

        mount.set_os_reduced_motion(Some(true));
        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Paused));
        assert_eq!(mount.presentation(), Presentation::StaticGradient);

        mount.set_motion_override(Some(false));
        assert_eq!(mount.status(), MountStatus::Ready(SceneState::Running));
        assert_eq!(mount.presentation(), Presentation::Animated);
    }

    #[tokio::test]
    async fn test_unmount_releases_everything() {
        let factory = Arc::new(TestSceneFactory::new());
        let mount = mount_with(factory.clone(), &StaticProbe::capable());
        mount.set_intersecting(true).unwrap().await.unwrap();

        mount.unmount();
        mount.unmount();

        assert_eq!(factory.built()[0].surface.log().disposed, 1);
        assert_eq!(factory.tracker().released(ResourceKind::Surface), 1);
        assert_eq!(factory.tracker().live(), 0);
    }

    #[tokio::test]
    async fn test_no_webgl_never_constructs() {
        let factory = Arc::new(TestSceneFactory::new());
        let mount = mount_with(factory.clone(), &StaticProbe::without_webgl());

        assert!(mount.set_intersecting(true).is_none());
        assert_eq!(mount.status(), MountStatus::Idle);
        assert_eq!(mount.presentation(), Presentation::StaticGradient);
        assert_eq!(factory.calls(), 0);
    }
}
