//! One tile of the picture: its latest samples and the observers that draw it.

use crate::colorizers::Colorizer;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Everything an observer needs to turn samples into pixels.
#[derive(Clone, Debug)]
pub struct TileSettings {
    pub colorizer: Colorizer,
    pub max_iterations: u32,
    pub tile_size: u32,
}

/// Observer of a [`TileModel`]. Callbacks run synchronously, in registration
/// order, on the thread that changed the tile.
pub trait TileListener {
    /// The tile received a new sample buffer.
    fn on_data_update(&self, samples: &Rc<[u32]>, settings: &TileSettings);

    /// The tile's colouring changed; previously computed colours are stale.
    fn on_settings_update(&self, samples: &Rc<[u32]>, settings: &TileSettings);
}

pub struct TileModel {
    samples: Rc<[u32]>,
    settings: TileSettings,
    listeners: RefCell<Vec<Weak<dyn TileListener>>>,
}

impl TileModel {
    pub fn new(colorizer: Colorizer, max_iterations: u32, tile_size: u32) -> Self {
        Self {
            samples: Rc::from(Vec::new()),
            settings: TileSettings {
                colorizer,
                max_iterations,
                tile_size,
            },
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Latest samples; empty until the first update.
    pub fn samples(&self) -> &[u32] {
        &self.samples
    }

    pub fn settings(&self) -> &TileSettings {
        &self.settings
    }

    pub fn has_data(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Register `listener`. Registering the same listener twice is a no-op.
    ///
    /// The tile only holds a weak reference; a listener that is dropped
    /// simply stops being notified.
    pub fn register_listener(&self, listener: &Rc<dyn TileListener>) {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|l| l.strong_count() > 0);
        if !listeners.iter().any(|l| same_listener(l, listener)) {
            listeners.push(Rc::downgrade(listener));
        }
    }

    /// Remove `listener`. Removing one that is not registered is a no-op.
    pub fn remove_listener(&self, listener: &Rc<dyn TileListener>) {
        self.listeners
            .borrow_mut()
            .retain(|l| l.strong_count() > 0 && !same_listener(l, listener));
    }

    /// Detach every listener.
    pub fn detach_all(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Replace the sample buffer and notify every listener.
    pub fn update(&mut self, samples: Vec<u32>) {
        self.samples = Rc::from(samples);
        for listener in self.live_listeners() {
            listener.on_data_update(&self.samples, &self.settings);
        }
    }

    /// Swap the colorizer and notify every listener. Samples are untouched.
    pub fn set_colorizer(&mut self, colorizer: Colorizer) {
        self.settings.colorizer = colorizer;
        for listener in self.live_listeners() {
            listener.on_settings_update(&self.samples, &self.settings);
        }
    }

    /// Snapshot of live listeners so callbacks may (de)register freely.
    fn live_listeners(&self) -> Vec<Rc<dyn TileListener>> {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|l| l.strong_count() > 0);
        listeners.iter().filter_map(Weak::upgrade).collect()
    }
}

fn same_listener(weak: &Weak<dyn TileListener>, listener: &Rc<dyn TileListener>) -> bool {
    std::ptr::addr_eq(weak.as_ptr(), Rc::as_ptr(listener))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Recorder {
        data_updates: RefCell<Vec<Vec<u32>>>,
        settings_updates: Cell<usize>,
    }

    impl TileListener for Recorder {
        fn on_data_update(&self, samples: &Rc<[u32]>, _settings: &TileSettings) {
            self.data_updates.borrow_mut().push(samples.to_vec());
        }

        fn on_settings_update(&self, _samples: &Rc<[u32]>, _settings: &TileSettings) {
            self.settings_updates.set(self.settings_updates.get() + 1);
        }
    }

    fn tile() -> TileModel {
        TileModel::new(Colorizer::blank(), 100, 2)
    }

    fn make_recorder() -> (Rc<Recorder>, Rc<dyn TileListener>) {
        let recorder = Rc::new(Recorder::default());
        let listener: Rc<dyn TileListener> = recorder.clone();
        (recorder, listener)
    }

    #[test]
    fn update_replaces_samples_and_notifies() {
        let mut tile = tile();
        let (recorder, listener) = make_recorder();
        tile.register_listener(&listener);

        tile.update(vec![1, 2, 3, 4]);
        tile.update(vec![5, 6, 7, 8]);

        assert_eq!(tile.samples(), &[5, 6, 7, 8]);
        assert_eq!(
            *recorder.data_updates.borrow(),
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]
        );
    }

    #[test]
    fn registering_twice_notifies_once() {
        let mut tile = tile();
        let (recorder, listener) = make_recorder();
        tile.register_listener(&listener);
        tile.register_listener(&listener);

        tile.update(vec![1, 1, 1, 1]);

        assert_eq!(tile.listener_count(), 1);
        assert_eq!(recorder.data_updates.borrow().len(), 1);
    }

    #[test]
    fn removing_absent_listener_is_a_no_op() {
        let tile = tile();
        let (_recorder, listener) = make_recorder();
        tile.remove_listener(&listener);
        tile.remove_listener(&listener);
        assert_eq!(tile.listener_count(), 0);
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let mut tile = tile();
        let (recorder, listener) = make_recorder();
        let (other, other_listener) = make_recorder();
        tile.register_listener(&listener);
        tile.register_listener(&other_listener);
        tile.remove_listener(&listener);

        tile.update(vec![3, 3, 3, 3]);

        assert!(recorder.data_updates.borrow().is_empty());
        assert_eq!(other.data_updates.borrow().len(), 1);
    }

    #[test]
    fn dropped_listener_is_pruned_silently() {
        let mut tile = tile();
        let (recorder, listener) = make_recorder();
        tile.register_listener(&listener);
        drop(listener);
        drop(recorder);

        tile.update(vec![0, 0, 0, 0]);
        assert_eq!(tile.listener_count(), 0);
    }

    #[test]
    fn set_colorizer_notifies_settings_without_touching_samples() {
        let mut tile = tile();
        let (recorder, listener) = make_recorder();
        tile.register_listener(&listener);
        tile.update(vec![4, 3, 2, 1]);

        let colorizer = Colorizer::new("Red", |_, _| [255, 0, 0]);
        tile.set_colorizer(colorizer.clone());

        assert_eq!(recorder.settings_updates.get(), 1);
        assert_eq!(recorder.data_updates.borrow().len(), 1);
        assert_eq!(tile.samples(), &[4, 3, 2, 1]);
        assert!(tile.settings().colorizer.ptr_eq(&colorizer));
    }

    /// Holds the only strong reference to itself and releases it when called.
    struct ReleasesItself {
        keep_alive: RefCell<Option<Rc<dyn TileListener>>>,
        calls: Cell<usize>,
    }

    impl TileListener for ReleasesItself {
        fn on_data_update(&self, _samples: &Rc<[u32]>, _settings: &TileSettings) {
            self.calls.set(self.calls.get() + 1);
            self.keep_alive.borrow_mut().take();
        }

        fn on_settings_update(&self, _samples: &Rc<[u32]>, _settings: &TileSettings) {}
    }

    #[test]
    fn listener_released_during_notification_is_pruned() {
        let mut tile = tile();
        let concrete = Rc::new(ReleasesItself {
            keep_alive: RefCell::new(None),
            calls: Cell::new(0),
        });
        let listener: Rc<dyn TileListener> = concrete.clone();
        tile.register_listener(&listener);
        *concrete.keep_alive.borrow_mut() = Some(listener);
        let weak = Rc::downgrade(&concrete);
        drop(concrete);

        tile.update(vec![1, 2, 3, 4]);
        assert!(weak.upgrade().is_none());

        tile.update(vec![1, 2, 3, 4]);
        assert_eq!(tile.listener_count(), 0);
    }

    #[test]
    fn new_tile_is_empty() {
        let tile = tile();
        assert!(!tile.has_data());
        assert!(tile.samples().is_empty());
        assert_eq!(tile.settings().tile_size, 2);
        assert_eq!(tile.settings().max_iterations, 100);
    }
}
