// renderer/batch.rs
use std::collections::{BTreeMap, VecDeque};

use crate::renderer::flags::RenderFlags;
use crate::renderer::group::{GroupKind, RenderGroup, GROUP_COUNT};
use crate::renderer::state::{DrawCall, RendererState};
use crate::renderer::technique::{TechniqueId, TechniqueRange};
use crate::scene::ObjectId;

/// One registered drawable under a technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassItem {
    pub technique: TechniqueId,
    pub object: ObjectId,
}

/// Technique-ordered lists with a cursor over an active window.
///
/// Rendering or discarding an item consumes it, so overlapping windows in
/// later steps never see it again this frame.
#[derive(Debug)]
pub struct PassList {
    passes: BTreeMap<TechniqueId, VecDeque<ObjectId>>,
    window: TechniqueRange,
    current: Option<TechniqueId>,
}

impl PassList {
    pub fn new() -> Self {
        Self {
            passes: BTreeMap::new(),
            window: TechniqueRange::ALL,
            current: None,
        }
    }

    pub fn add(&mut self, technique: TechniqueId, object: ObjectId) {
        self.passes.entry(technique).or_default().push_back(object);
    }

    pub fn begin_window(&mut self, window: TechniqueRange) {
        self.window = window;
        self.current = None;
    }

    /// Moves the cursor to the next item inside the window. Returns false
    /// once the window is exhausted.
    pub fn produce_next(&mut self) -> bool {
        let from = self.current.unwrap_or(self.window.start());
        self.current = self
            .passes
            .range(from..=self.window.end())
            .find(|(_, objects)| !objects.is_empty())
            .map(|(technique, _)| *technique);
        self.current.is_some()
    }

    pub fn current_technique(&self) -> Option<TechniqueId> {
        self.current
    }

    pub fn current(&self) -> Option<PassItem> {
        let technique = self.current?;
        let object = *self.passes.get(&technique)?.front()?;
        Some(PassItem { technique, object })
    }

    /// Drops the current item without drawing it, then advances.
    pub fn discard_next(&mut self) -> bool {
        self.pop_current();
        self.produce_next()
    }

    /// Draws the current item, then advances.
    pub fn render_next(&mut self, flags: RenderFlags, state: &mut dyn RendererState) -> bool {
        if let Some(item) = self.pop_current() {
            state.draw(&DrawCall {
                technique: item.technique,
                object: item.object,
                flags,
            });
        }
        self.produce_next()
    }

    /// Draws everything left, ascending by technique, ignoring the window.
    pub fn render_all(&mut self, flags: RenderFlags, state: &mut dyn RendererState) -> usize {
        self.begin_window(TechniqueRange::new(0, TechniqueId::MAX));
        let mut drawn = 0;
        let mut pending = self.produce_next();
        while pending {
            drawn += 1;
            pending = self.render_next(flags, state);
        }
        drawn
    }

    pub fn has_technique(&self, technique: TechniqueId) -> bool {
        self.passes
            .get(&technique)
            .is_some_and(|objects| !objects.is_empty())
    }

    pub fn len(&self) -> usize {
        self.passes.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.values().all(VecDeque::is_empty)
    }

    pub fn clear(&mut self) {
        self.passes.clear();
        self.current = None;
    }

    fn pop_current(&mut self) -> Option<PassItem> {
        let technique = self.current?;
        let objects = self.passes.get_mut(&technique)?;
        let object = objects.pop_front()?;
        if objects.is_empty() {
            self.passes.remove(&technique);
        }
        Some(PassItem { technique, object })
    }
}

impl Default for PassList {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame-scoped assignment of registered objects to groups.
#[derive(Debug)]
pub struct BatchClassifier {
    main: PassList,
    groups: [Option<RenderGroup>; GROUP_COUNT],
    decals: Vec<PassItem>,
    blended_decals: Vec<PassItem>,
}

impl BatchClassifier {
    /// Classifier without any groups; everything lands in the main lists.
    pub fn new() -> Self {
        Self {
            main: PassList::new(),
            groups: std::array::from_fn(|_| None),
            decals: Vec::new(),
            blended_decals: Vec::new(),
        }
    }

    /// Classifier with every named group set up for iteration.
    pub fn standard() -> Self {
        let mut classifier = Self::new();
        for kind in GroupKind::NAMED {
            classifier.setup_group(RenderGroup::new(kind));
        }
        classifier
    }

    pub fn setup_group(&mut self, group: RenderGroup) {
        log::debug!(
            "Setting up group {} (precompiled: {})",
            group.kind().name(),
            group.is_precompiled()
        );
        let index = group.kind().index();
        self.groups[index] = Some(group);
    }

    pub fn group(&self, kind: GroupKind) -> Option<&RenderGroup> {
        self.groups[kind.index()].as_ref()
    }

    pub fn group_mut(&mut self, kind: GroupKind) -> Option<&mut RenderGroup> {
        self.groups[kind.index()].as_mut()
    }

    pub fn main(&self) -> &PassList {
        &self.main
    }

    /// Lists iterated for a render step: the main lists for the wildcard,
    /// otherwise the group's own lists when the group exists.
    pub fn passes_mut(&mut self, group: Option<GroupKind>) -> Option<&mut PassList> {
        match group {
            None => Some(&mut self.main),
            Some(kind) => self.group_mut(kind).map(RenderGroup::passes_mut),
        }
    }

    /// Adds an item to `group`, falling back to the main lists when that
    /// group was never set up.
    pub fn add(&mut self, item: PassItem, group: Option<GroupKind>) {
        match group.and_then(|kind| self.groups[kind.index()].as_mut()) {
            Some(group) => group.add(item.technique, item.object),
            None => self.main.add(item.technique, item.object),
        }
    }

    pub fn add_decal(&mut self, item: PassItem, blended: bool) {
        if blended {
            self.blended_decals.push(item);
        } else {
            self.decals.push(item);
        }
    }

    pub fn decals(&self, blended: bool) -> &[PassItem] {
        if blended {
            &self.blended_decals
        } else {
            &self.decals
        }
    }

    pub fn take_decals(&mut self, blended: bool) -> Vec<PassItem> {
        if blended {
            std::mem::take(&mut self.blended_decals)
        } else {
            std::mem::take(&mut self.decals)
        }
    }

    /// True when the main lists hold both techniques.
    pub fn has_technique_passes(&self, first: TechniqueId, second: TechniqueId) -> bool {
        self.main.has_technique(first) && self.main.has_technique(second)
    }

    pub fn item_count(&self) -> usize {
        let grouped: usize = self
            .groups
            .iter()
            .flatten()
            .map(|group| group.passes().len())
            .sum();
        self.main.len() + grouped + self.decals.len() + self.blended_decals.len()
    }

    /// Resets every list for the next frame. Group definitions survive.
    pub fn clear(&mut self) {
        self.main.clear();
        for group in self.groups.iter_mut().flatten() {
            group.unregister();
        }
        self.decals.clear();
        self.blended_decals.clear();
    }
}

impl Default for BatchClassifier {
    fn default() -> Self {
        Self::new()
    }
}
