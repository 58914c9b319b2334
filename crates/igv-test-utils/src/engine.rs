use async_trait::async_trait;
use igv_session::{LoadConfiguration, ReferenceSpec, SessionState, TrackSpec};
use igv_viewer::{
    ContainerId, EngineError, EventCallback, ReferenceLoad, SubscriptionId, ViewerEvent,
    ViewerHandle, VisualizationEngine,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct BrowserState {
    genome: Option<String>,
    reference: Option<ReferenceSpec>,
    tracks: Vec<TrackSpec>,
    locus: String,
}

/// In-memory stand-in for a live browser
pub struct FakeHandle {
    state: Mutex<BrowserState>,
    listeners: Mutex<Vec<(SubscriptionId, ViewerEvent, EventCallback)>>,
    next_id: AtomicU64,
    destroyed: AtomicBool,
    reference_loads: Mutex<Vec<ReferenceLoad>>,
    load_failure: Mutex<Option<EngineError>>,
    load_delay: Mutex<Option<Duration>>,
}

impl std::fmt::Debug for FakeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeHandle")
            .field("state", &*self.state.lock())
            .field("listeners", &self.listener_count())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl FakeHandle {
    pub fn from_config(config: &LoadConfiguration) -> Self {
        Self {
            state: Mutex::new(BrowserState {
                genome: config.genome.clone(),
                reference: config.reference.clone(),
                tracks: config.tracks.clone(),
                locus: "chr1:1-100000".to_string(),
            }),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
            reference_loads: Mutex::new(Vec::new()),
            load_failure: Mutex::new(None),
            load_delay: Mutex::new(None),
        }
    }

    pub fn tracks(&self) -> Vec<TrackSpec> {
        self.state.lock().tracks.clone()
    }

    pub fn reference(&self) -> Option<ReferenceSpec> {
        self.state.lock().reference.clone()
    }

    pub fn reference_loads(&self) -> Vec<ReferenceLoad> {
        self.reference_loads.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn listeners_for(&self, event: ViewerEvent) -> usize {
        self.listeners.lock().iter().filter(|(_, e, _)| *e == event).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Fail the next reference or track load
    pub fn fail_next_load(&self, error: EngineError) {
        *self.load_failure.lock() = Some(error);
    }

    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock() = Some(delay);
    }

    /// Fire `event` as the engine would
    pub fn emit(&self, event: ViewerEvent) {
        let callbacks: Vec<EventCallback> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(event);
        }
    }

    pub fn set_locus(&self, locus: &str) {
        self.state.lock().locus = locus.to_string();
        self.emit(ViewerEvent::LocusChange);
    }

    /// Drag a track to a new position
    pub fn drag_track(&self, from: usize, to: usize) {
        {
            let mut state = self.state.lock();
            let track = state.tracks.remove(from);
            state.tracks.insert(to, track);
        }
        self.emit(ViewerEvent::TrackDragEnd);
        self.emit(ViewerEvent::TrackOrderChanged);
    }

    pub fn remove_track(&self, index: usize) {
        self.state.lock().tracks.remove(index);
        self.emit(ViewerEvent::TrackRemoved);
    }

    fn mark_destroyed(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }

    async fn before_load(&self) -> Result<(), EngineError> {
        if self.is_destroyed() {
            return Err(EngineError::Destroyed);
        }
        let delay = *self.load_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.load_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ViewerHandle for FakeHandle {
    async fn load_reference(&self, reference: ReferenceLoad) -> Result<(), EngineError> {
        self.before_load().await?;
        self.reference_loads.lock().push(reference.clone());
        let mut state = self.state.lock();
        match reference {
            ReferenceLoad::Genome(id) => {
                state.genome = Some(id);
                state.reference = None;
            }
            ReferenceLoad::Custom(spec) => {
                state.genome = None;
                state.reference = Some(spec);
            }
        }
        Ok(())
    }

    async fn load_track(&self, track: TrackSpec) -> Result<(), EngineError> {
        self.before_load().await?;
        self.state.lock().tracks.push(track);
        Ok(())
    }

    /// Mirrors the engine: the reference node carries the current locus
    fn serialize_state(&self) -> SessionState {
        let state = self.state.lock();
        let mut value = json!({
            "locus": state.locus,
            "tracks": state.tracks,
        });
        match &state.reference {
            Some(spec) => {
                let mut reference = serde_json::to_value(spec).unwrap_or(Value::Null);
                if let Some(node) = reference.as_object_mut() {
                    node.insert("locus".to_string(), json!(state.locus));
                }
                value["reference"] = reference;
            }
            None => {
                value["genome"] = json!(state.genome);
                value["reference"] = json!({ "id": state.genome, "locus": state.locus });
            }
        }
        SessionState::from_value(value)
    }

    fn genome_id(&self) -> Option<String> {
        let state = self.state.lock();
        state
            .reference
            .as_ref()
            .and_then(|r| r.id.clone().or_else(|| r.name.clone()))
            .or_else(|| state.genome.clone())
    }

    fn on(&self, event: ViewerEvent, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.listeners.lock().push((id, event, callback));
        id
    }

    fn off(&self, id: SubscriptionId) {
        self.listeners.lock().retain(|(sid, _, _)| *sid != id);
    }
}

/// Engine creating [`FakeHandle`]s
#[derive(Debug, Default)]
pub struct FakeEngine {
    handles: Mutex<Vec<Arc<FakeHandle>>>,
    created: AtomicUsize,
    destroyed: AtomicUsize,
    creation_failure: Mutex<Option<EngineError>>,
    creation_delay: Mutex<Option<Duration>>,
    configs: Mutex<Vec<LoadConfiguration>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_creation(&self, error: EngineError) {
        *self.creation_failure.lock() = Some(error);
    }

    pub fn set_creation_delay(&self, delay: Duration) {
        *self.creation_delay.lock() = Some(delay);
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn destroyed_count(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Instances created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.handles.lock().iter().filter(|h| !h.is_destroyed()).count()
    }

    pub fn last_handle(&self) -> Option<Arc<FakeHandle>> {
        self.handles.lock().last().cloned()
    }

    /// Configurations passed to `create_instance`
    pub fn configs(&self) -> Vec<LoadConfiguration> {
        self.configs.lock().clone()
    }
}

#[async_trait]
impl VisualizationEngine for FakeEngine {
    async fn create_instance(
        &self,
        _container: &ContainerId,
        config: &LoadConfiguration,
    ) -> Result<Arc<dyn ViewerHandle>, EngineError> {
        let delay = *self.creation_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.creation_failure.lock().take() {
            return Err(err);
        }

        self.configs.lock().push(config.clone());
        let handle = Arc::new(FakeHandle::from_config(config));
        self.handles.lock().push(handle.clone());
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(handle)
    }

    async fn destroy_instance(&self, handle: Arc<dyn ViewerHandle>) {
        let target = Arc::as_ptr(&handle).cast::<()>();
        if let Some(fake) = self
            .handles
            .lock()
            .iter()
            .find(|h| Arc::as_ptr(*h).cast::<()>() == target)
        {
            fake.mark_destroyed();
        }
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
