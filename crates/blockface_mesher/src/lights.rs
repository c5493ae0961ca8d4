//! Point lights attached to light-emitting voxels.
//!
//! [`LightTracker`] remembers which cells of a chunk own a light. The lights themselves live
//! wherever a [`LightFactory`] puts them; [`LightArena`] is a plain handle table.

use blockface_shared::block::VoxelLight;
use blockface_shared::color::LightColor;
use blockface_shared::coords::{ChunkPos, LocalPos};
use glam::Vec3;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Everything needed to spawn one point light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightRequest {
    pub color: LightColor,
    pub range: f32,
    pub intensity: f32,
    /// Position relative to `anchor`'s origin.
    pub local_position: Vec3,
    pub anchor: ChunkPos,
}

impl LightRequest {
    pub fn world_position(&self) -> Vec3 {
        self.anchor.origin().as_vec3() + self.local_position
    }
}

pub trait LightFactory {
    type Handle;

    fn create(&mut self, request: &LightRequest) -> Self::Handle;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Per-chunk map from cell to the light spawned for it.
#[derive(Debug)]
pub struct LightTracker<H> {
    anchor: ChunkPos,
    lights: FxHashMap<LocalPos, H>,
}

impl<H> LightTracker<H> {
    pub fn new(anchor: ChunkPos) -> Self {
        Self {
            anchor,
            lights: FxHashMap::default(),
        }
    }

    pub fn anchor(&self) -> ChunkPos {
        self.anchor
    }

    pub fn get(&self, pos: LocalPos) -> Option<&H> {
        self.lights.get(&pos)
    }

    pub fn contains(&self, pos: LocalPos) -> bool {
        self.lights.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = LocalPos> + '_ {
        self.lights.keys().copied()
    }

    /// Destroys and forgets the light at `pos`. Returns whether there was one.
    pub fn retire<F>(&mut self, pos: LocalPos, factory: &mut F) -> bool
    where
        F: LightFactory<Handle = H>,
    {
        let Some(handle) = self.lights.remove(&pos) else {
            return false;
        };
        factory.destroy(handle);
        true
    }

    /// Spawns a light at `pos` unless one is already tracked there. Returns whether one was
    /// created.
    ///
    /// An existing light is left as is, even if `light` describes different parameters.
    pub fn ensure<F>(
        &mut self,
        pos: LocalPos,
        light: &VoxelLight,
        local_position: Vec3,
        factory: &mut F,
    ) -> bool
    where
        F: LightFactory<Handle = H>,
    {
        if self.lights.contains_key(&pos) {
            return false;
        }

        let request = LightRequest {
            color: light.color,
            range: light.range,
            intensity: light.intensity,
            local_position,
            anchor: self.anchor,
        };
        let handle = factory.create(&request);
        self.lights.insert(pos, handle);
        true
    }

    /// Destroys every tracked light.
    pub fn clear<F>(&mut self, factory: &mut F)
    where
        F: LightFactory<Handle = H>,
    {
        if !self.lights.is_empty() {
            debug!(
                "Releasing {} lights of chunk {:?}",
                self.lights.len(),
                self.anchor
            );
        }
        for (_, handle) in self.lights.drain() {
            factory.destroy(handle);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LightHandle {
    index: u32,
    generation: u32,
}

impl LightHandle {
    pub fn index(self) -> u32 {
        self.index
    }
}

#[derive(Debug)]
struct LightSlot {
    generation: u32,
    light: Option<LightRequest>,
}

/// Slot table of live lights. Freed slots are reused with a bumped generation, so stale handles
/// never alias a newer light.
#[derive(Debug, Default)]
pub struct LightArena {
    slots: Vec<LightSlot>,
    free: Vec<u32>,
    live: usize,
}

impl LightArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: LightHandle) -> Option<&LightRequest> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.light.as_ref())
    }

    pub fn world_position(&self, handle: LightHandle) -> Option<Vec3> {
        self.get(handle).map(LightRequest::world_position)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (LightHandle, &LightRequest)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.light.as_ref().map(|light| {
                (
                    LightHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    light,
                )
            })
        })
    }
}

impl LightFactory for LightArena {
    type Handle = LightHandle;

    fn create(&mut self, request: &LightRequest) -> LightHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.light = Some(*request);
            return LightHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(LightSlot {
            generation: 0,
            light: Some(*request),
        });
        LightHandle {
            index,
            generation: 0,
        }
    }

    fn destroy(&mut self, handle: LightHandle) {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.light.is_some())
        else {
            warn!("Ignoring destroy of stale light handle {handle:?}");
            return;
        };

        slot.light = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
    }
}

#[cfg(test)]
mod tests {
    use blockface_shared::block::VoxelLight;
    use blockface_shared::color::LightColor;
    use blockface_shared::coords::{ChunkPos, LocalPos};
    use glam::Vec3;

    use super::{LightArena, LightFactory, LightTracker};

    fn torch() -> VoxelLight {
        VoxelLight {
            color: LightColor::rgb(1.0, 0.5, 0.25),
            range: 10.0,
            intensity: 2.0,
        }
    }

    #[test]
    fn ensure_creates_once_and_retire_destroys() {
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::new(1, 0, -1));
        let pos = LocalPos::new(4, 5, 6);

        assert!(tracker.ensure(pos, &torch(), pos.center(), &mut arena));
        assert!(!tracker.ensure(pos, &torch(), pos.center(), &mut arena));
        assert_eq!(tracker.len(), 1);
        assert_eq!(arena.len(), 1);

        let handle = *tracker.get(pos).expect("light should be tracked");
        let light = arena.get(handle).expect("light should be alive");
        assert_eq!(light.local_position, Vec3::new(4.5, 5.5, 6.5));
        assert_eq!(light.range, 10.0);
        assert_eq!(light.intensity, 2.0);
        assert_eq!(light.anchor, ChunkPos::new(1, 0, -1));
        assert_eq!(
            arena.world_position(handle),
            Some(Vec3::new(36.5, 5.5, -25.5))
        );

        assert!(tracker.retire(pos, &mut arena));
        assert!(!tracker.retire(pos, &mut arena));
        assert!(tracker.is_empty());
        assert!(arena.is_empty());
        assert!(arena.get(handle).is_none());
    }

    #[test]
    fn ensure_keeps_existing_light_parameters() {
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());
        let pos = LocalPos::new(0, 0, 0);
        tracker.ensure(pos, &torch(), pos.center(), &mut arena);

        let brighter = VoxelLight {
            intensity: 9.0,
            ..torch()
        };
        assert!(!tracker.ensure(pos, &brighter, pos.center(), &mut arena));

        let handle = *tracker.get(pos).expect("tracked");
        assert_eq!(arena.get(handle).map(|light| light.intensity), Some(2.0));
    }

    #[test]
    fn clear_destroys_every_light() {
        let mut arena = LightArena::new();
        let mut tracker = LightTracker::new(ChunkPos::default());
        for x in 0..4 {
            let pos = LocalPos::new(x, 1, 1);
            tracker.ensure(pos, &torch(), pos.center(), &mut arena);
        }
        assert_eq!(arena.len(), 4);

        tracker.clear(&mut arena);
        assert!(tracker.is_empty());
        assert!(arena.is_empty());
        assert_eq!(arena.iter().count(), 0);
    }

    #[test]
    fn arena_reuses_slots_and_rejects_stale_handles() {
        let mut arena = LightArena::new();
        let request = super::LightRequest {
            color: LightColor::WHITE,
            range: 1.0,
            intensity: 1.0,
            local_position: Vec3::ZERO,
            anchor: ChunkPos::default(),
        };

        let first = arena.create(&request);
        arena.destroy(first);
        let second = arena.create(&request);

        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
        assert!(arena.get(second).is_some());

        // destroying the stale handle must not free the live light
        arena.destroy(first);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(second).is_some());
    }
}
