//! Dashboard controller
//!
//! Owns the dashboard state, the preference store and the embed provider,
//! and processes commands from the frontend and from drag/drop handlers
//! through a single crossbeam channel. Everything runs on the frontend's
//! thread: gesture callbacks only enqueue, `drain` applies.

use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use twitchwall::command::{DashboardCommand, DashboardState, Transition};
use twitchwall::reconciler::parse_streamer_list;
use twitchwall::registry::StreamRegistry;

use crate::data::PreferenceStore;
use crate::error::Result;
use crate::providers::{
    DragDropProvider, EmbedHandle, EmbedOptions, EmbedProvider, ReorderGesture, ResizeGesture,
    StreamerSource,
};

pub struct DashboardController {
    state: DashboardState,
    prefs: PreferenceStore,
    embeds: Box<dyn EmbedProvider>,
    options: EmbedOptions,
    /// Live embeds by tile id
    handles: HashMap<String, EmbedHandle>,
    cmd_tx: Sender<DashboardCommand>,
    cmd_rx: Receiver<DashboardCommand>,
}

impl DashboardController {
    pub fn new(
        prefs: PreferenceStore,
        embeds: Box<dyn EmbedProvider>,
        options: EmbedOptions,
    ) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        Self {
            state: DashboardState::new(),
            prefs,
            embeds,
            options,
            handles: HashMap::new(),
            cmd_tx,
            cmd_rx,
        }
    }

    /// Fetch the streamer list, reconcile, render, then attach gestures
    ///
    /// The list is fetched once. On failure the error is logged, the
    /// dashboard stays empty and the error is returned for display; there
    /// is no retry. Drag/drop handlers are attached only after the layout
    /// is established, so no gesture can act on a half-built dashboard.
    pub fn start(
        &mut self,
        source: &dyn StreamerSource,
        dragdrop: &mut dyn DragDropProvider,
    ) -> Result<usize> {
        let result = match source.fetch() {
            Ok(text) => {
                let names = parse_streamer_list(&text);
                let saved = self.prefs.saved_layout();
                self.state = DashboardState::reconciled(&names, &saved);
                self.render_all();

                let registry = self.state.registry();
                info!(
                    source = source.location(),
                    tiles = registry.len(),
                    hidden = registry.hidden_ids().len(),
                    "Dashboard ready"
                );
                Ok(registry.len())
            }
            Err(e) => {
                error!(source = source.location(), "Error fetching streamers list: {e}");
                self.state = DashboardState::new();
                self.render_all();
                Err(e)
            }
        };

        self.attach(dragdrop);
        result
    }

    fn attach(&self, dragdrop: &mut dyn DragDropProvider) {
        let tx = self.cmd_tx.clone();
        dragdrop.on_reorder(Box::new(move |gesture: ReorderGesture| {
            let _ = tx.send(DashboardCommand::Reorder {
                id: gesture.id,
                placement: gesture.placement,
            });
        }));

        let tx = self.cmd_tx.clone();
        dragdrop.on_resize(Box::new(move |gesture: ResizeGesture| {
            let _ = tx.send(DashboardCommand::Resize {
                id: gesture.id,
                size: gesture.size,
            });
        }));
    }

    /// Sender for queueing commands from callbacks
    pub fn sender(&self) -> Sender<DashboardCommand> {
        self.cmd_tx.clone()
    }

    /// Apply a command, persist its effects and update embeds
    pub fn handle(&mut self, command: DashboardCommand) -> Result<Transition> {
        let transition = match self.state.apply(&command) {
            Ok(t) => t,
            Err(e) => {
                warn!(?command, "Command ignored: {e}");
                return Err(e.into());
            }
        };

        self.persist(&transition);
        if transition.rebuilt {
            self.render_all();
        } else {
            for id in &transition.added {
                self.render(id);
            }
        }
        Ok(transition)
    }

    /// Handle every queued command. Returns how many applied cleanly.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(command) = self.cmd_rx.try_recv() {
            if self.handle(command).is_ok() {
                handled += 1;
            }
        }
        handled
    }

    fn persist(&mut self, transition: &Transition) {
        if transition.clear_preferences {
            self.prefs.clear();
        }
        for (id, hidden) in &transition.hidden_changes {
            self.prefs.set_hidden(id, *hidden);
        }
        if transition.save_order {
            self.prefs.save_order(&self.state.registry().order());
        }
    }

    /// Recreate the embed of every tile
    fn render_all(&mut self) {
        for handle in std::mem::take(&mut self.handles).into_values() {
            self.embeds.destroy(&handle);
        }
        for id in self.state.registry().order() {
            self.render(&id);
        }
    }

    fn render(&mut self, id: &str) {
        let Some(entry) = self.state.registry().get(id) else {
            return;
        };
        let tile = entry.id.clone();
        let channel = entry.channel.clone();
        match self.embeds.create(&entry.embed_id(), &channel, &self.options) {
            Ok(handle) => {
                debug!(tile = %tile, provider = self.embeds.name(), "Tile rendered");
                self.handles.insert(tile, handle);
            }
            Err(e) => warn!(tile = %tile, "Embed not created: {e}"),
        }
    }

    // === Queries ===

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn registry(&self) -> &StreamRegistry {
        self.state.registry()
    }

    /// Embed of a tile (id in either form)
    pub fn embed(&self, id: &str) -> Option<&EmbedHandle> {
        let entry = self.state.registry().get(id)?;
        self.handles.get(&entry.id)
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.prefs
    }

    /// Give back the preference store (ends the session)
    pub fn into_preferences(self) -> PreferenceStore {
        self.prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::providers::KeyboardDragDrop;
    use std::sync::{Arc, Mutex};
    use twitchwall::registry::Placement;
    use twitchwall::resize::TileSize;

    /// Streamer list held in memory
    struct StaticSource(&'static str);

    impl StreamerSource for StaticSource {
        fn location(&self) -> &str {
            "memory"
        }

        fn fetch(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Source that always fails
    struct FailingSource;

    impl StreamerSource for FailingSource {
        fn location(&self) -> &str {
            "nowhere"
        }

        fn fetch(&self) -> Result<String> {
            Err(AppError::Source("offline".to_string()))
        }
    }

    /// Embed provider that records create/destroy calls
    #[derive(Clone, Default)]
    struct RecordingEmbeds {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingEmbeds {
        fn events(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl EmbedProvider for RecordingEmbeds {
        fn name(&self) -> &'static str {
            "Recording"
        }

        fn create(
            &mut self,
            container_id: &str,
            channel: &str,
            _options: &EmbedOptions,
        ) -> Result<EmbedHandle> {
            self.log.lock().unwrap().push(format!("create {container_id}"));
            Ok(EmbedHandle {
                container_id: container_id.to_string(),
                channel: channel.to_string(),
                url: format!("embed://{channel}"),
            })
        }

        fn destroy(&mut self, handle: &EmbedHandle) {
            self.log
                .lock()
                .unwrap()
                .push(format!("destroy {}", handle.container_id));
        }
    }

    fn options() -> EmbedOptions {
        EmbedOptions {
            width: "100%".to_string(),
            height: "100%".to_string(),
            parent_domains: vec!["localhost".to_string()],
            muted: false,
        }
    }

    fn controller(prefs: PreferenceStore) -> (DashboardController, RecordingEmbeds) {
        let embeds = RecordingEmbeds::default();
        let ctrl = DashboardController::new(prefs, Box::new(embeds.clone()), options());
        (ctrl, embeds)
    }

    fn started(
        list: &'static str,
        prefs: PreferenceStore,
    ) -> (DashboardController, RecordingEmbeds, KeyboardDragDrop) {
        let (mut ctrl, embeds) = controller(prefs);
        let mut dnd = KeyboardDragDrop::new();
        ctrl.start(&StaticSource(list), &mut dnd).unwrap();
        (ctrl, embeds, dnd)
    }

    fn visible(ctrl: &DashboardController) -> Vec<bool> {
        ctrl.registry().entries().iter().map(|e| e.is_visible()).collect()
    }

    #[test]
    fn test_start_without_saved_state() {
        let (ctrl, embeds, dnd) = started("a\nb\nc\n", PreferenceStore::in_memory());
        assert_eq!(ctrl.registry().channels(), ["a", "b", "c"]);
        assert_eq!(visible(&ctrl), [true, true, true]);
        assert_eq!(
            embeds.events(),
            ["create twitch-embed-a", "create twitch-embed-b", "create twitch-embed-c"]
        );
        assert_eq!(ctrl.embed("b").unwrap().url, "embed://b");
        assert!(dnd.is_attached());
    }

    #[test]
    fn test_start_applies_saved_order() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.save_order(&["c", "a"]);
        let (ctrl, _, _) = started("a\nb\nc", prefs);
        assert_eq!(ctrl.registry().channels(), ["c", "a", "b"]);
    }

    #[test]
    fn test_start_applies_hidden_set() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.set_hidden("stream-div-a", true);
        let (ctrl, embeds, _) = started("a\nb", prefs);
        assert_eq!(ctrl.registry().channels(), ["a", "b"]);
        assert_eq!(visible(&ctrl), [false, true]);
        // Hidden tiles are still rendered, just not displayed
        assert_eq!(embeds.events().len(), 2);
    }

    #[test]
    fn test_fetch_failure_leaves_empty_dashboard() {
        let (mut ctrl, embeds) = controller(PreferenceStore::in_memory());
        let mut dnd = KeyboardDragDrop::new();
        let result = ctrl.start(&FailingSource, &mut dnd);
        assert!(matches!(result, Err(AppError::Source(_))));
        assert!(ctrl.registry().is_empty());
        assert!(embeds.events().is_empty());
    }

    #[test]
    fn test_hide_and_unhide_persist() {
        let (mut ctrl, _, _) = started("a\nb", PreferenceStore::in_memory());
        ctrl.handle(DashboardCommand::Hide("stream-div-a".into())).unwrap();
        assert!(ctrl.preferences().is_hidden("stream-div-a"));

        ctrl.handle(DashboardCommand::Unhide("a".into())).unwrap();
        assert!(!ctrl.preferences().is_hidden("stream-div-a"));
    }

    #[test]
    fn test_hide_unknown_persists_nothing() {
        let (mut ctrl, _, _) = started("a", PreferenceStore::in_memory());
        let t = ctrl.handle(DashboardCommand::Hide("stream-div-zzz".into())).unwrap();
        assert!(t.is_noop());
        assert!(ctrl.preferences().kv().is_empty());
    }

    #[test]
    fn test_hidden_survives_restart() {
        let (mut ctrl, _, _) = started("a\nb", PreferenceStore::in_memory());
        ctrl.handle(DashboardCommand::Hide("b".into())).unwrap();
        let prefs = ctrl.into_preferences();

        let (ctrl, _, _) = started("a\nb", prefs);
        assert_eq!(visible(&ctrl), [true, false]);
    }

    #[test]
    fn test_drop_persists_order_once() {
        let (mut ctrl, _, mut dnd) = started("a\nb\nc", PreferenceStore::in_memory());
        let order = ctrl.registry().order();

        dnd.grab(&order, "stream-div-c");
        dnd.move_by(order.len(), -1);
        dnd.move_by(order.len(), -1);
        assert_eq!(ctrl.drain(), 0);
        assert!(ctrl.preferences().load_order().is_empty());

        dnd.drop_grabbed(&order);
        assert_eq!(ctrl.drain(), 1);
        assert_eq!(ctrl.registry().channels(), ["c", "a", "b"]);
        assert_eq!(
            ctrl.preferences().load_order(),
            ["stream-div-c", "stream-div-a", "stream-div-b"]
        );
    }

    #[test]
    fn test_reorder_round_trips_through_restart() {
        let (mut ctrl, _, _) = started("a\nb\nc", PreferenceStore::in_memory());
        ctrl.handle(DashboardCommand::Reorder {
            id: "a".into(),
            placement: Placement::After("c".into()),
        })
        .unwrap();
        let before = ctrl.registry().order();
        let prefs = ctrl.into_preferences();

        let (ctrl, _, _) = started("a\nb\nc", prefs);
        assert_eq!(ctrl.registry().order(), before);
    }

    #[test]
    fn test_reorder_unknown_is_error() {
        let (mut ctrl, _, _) = started("a", PreferenceStore::in_memory());
        let result = ctrl.handle(DashboardCommand::Reorder {
            id: "x".into(),
            placement: Placement::Before("a".into()),
        });
        assert!(matches!(result, Err(AppError::Layout(_))));
    }

    #[test]
    fn test_add_streams_renders_new_tiles() {
        let (mut ctrl, embeds, _) = started("a\nb", PreferenceStore::in_memory());
        let t = ctrl.handle(DashboardCommand::AddStreams("d\ne".into())).unwrap();
        assert_eq!(t.added, ["stream-div-d", "stream-div-e"]);
        assert_eq!(ctrl.registry().channels(), ["a", "b", "d", "e"]);
        assert_eq!(visible(&ctrl), [true, true, true, true]);
        assert_eq!(
            embeds.events()[2..],
            ["create twitch-embed-d", "create twitch-embed-e"]
        );
        assert!(ctrl.embed("stream-div-e").is_some());
    }

    #[test]
    fn test_added_stream_clears_stale_hidden_flag() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.set_hidden("stream-div-b", true);
        let (mut ctrl, _, _) = started("a", prefs);
        assert!(ctrl.registry().get("b").is_none());

        ctrl.handle(DashboardCommand::AddStreams("b".into())).unwrap();
        assert!(ctrl.registry().get("b").unwrap().is_visible());
        assert!(!ctrl.preferences().is_hidden("stream-div-b"));
    }

    #[test]
    fn test_reset_layout() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.save_order(&["c", "a"]);
        prefs.set_hidden("stream-div-b", true);
        let (mut ctrl, embeds, _) = started("a\nb\nc", prefs);
        assert_eq!(ctrl.registry().channels(), ["c", "a", "b"]);

        ctrl.handle(DashboardCommand::ResetLayout).unwrap();
        assert_eq!(ctrl.registry().channels(), ["a", "b", "c"]);
        assert_eq!(visible(&ctrl), [true, true, true]);
        assert!(ctrl.preferences().saved_layout().is_empty());

        // Every embed is torn down and recreated
        let events = embeds.events();
        assert_eq!(events.iter().filter(|e| e.starts_with("destroy")).count(), 3);
        assert_eq!(events.iter().filter(|e| e.starts_with("create")).count(), 6);

        // A fresh start with the cleared store gives the same baseline
        let prefs = ctrl.into_preferences();
        let (ctrl, _, _) = started("a\nb\nc", prefs);
        assert_eq!(ctrl.registry().channels(), ["a", "b", "c"]);
        assert_eq!(visible(&ctrl), [true, true, true]);
    }

    #[test]
    fn test_unhide_all_clears_flags() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.set_hidden("a", true);
        prefs.set_hidden("b", true);
        let (mut ctrl, _, _) = started("a\nb", prefs);

        ctrl.handle(DashboardCommand::UnhideAll).unwrap();
        assert_eq!(visible(&ctrl), [true, true]);
        assert!(ctrl.preferences().hidden_ids().is_empty());
    }

    #[test]
    fn test_resize_gesture_goes_through_queue() {
        let (mut ctrl, _, mut dnd) = started("a", PreferenceStore::in_memory());
        dnd.resize("stream-div-a", TileSize::new(200, 700));
        assert_eq!(ctrl.drain(), 1);
        assert_eq!(
            ctrl.registry().get("a").unwrap().size,
            Some(TileSize::new(300, 700))
        );
    }

    #[test]
    fn test_sender_queues_commands() {
        let (mut ctrl, _, _) = started("a\nb", PreferenceStore::in_memory());
        let tx = ctrl.sender();
        tx.send(DashboardCommand::Hide("a".into())).unwrap();
        tx.send(DashboardCommand::Hide("missing".into())).unwrap();
        tx.send(DashboardCommand::Resize {
            id: "missing".into(),
            size: TileSize::MIN,
        })
        .unwrap();
        assert_eq!(ctrl.drain(), 2);
        assert_eq!(visible(&ctrl), [false, true]);
    }
}
