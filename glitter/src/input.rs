use rustc_hash::FxHashSet;

/// Escape closes the loop; every other key is folded into `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Which keys are currently held down.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: FxHashSet<Key>,
}

impl InputState {
    pub fn apply_key(&mut self, key: Key, state: KeyState) {
        match state {
            KeyState::Pressed => {
                self.keys_down.insert(key);
            }
            KeyState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Forget held keys, e.g. when the window loses focus and release
    /// events would go elsewhere.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }
}
