// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rand::seq::IndexedRandom;

/// Picks one item for an auto-resolved step.
pub trait ItemChooser {
    /// Returns one of `items`, or `None` if it is empty.
    fn choose<'a>(&mut self, items: &'a [String]) -> Option<&'a String>;
}

/// Uniform choice backed by the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl ItemChooser for RandomChooser {
    fn choose<'a>(&mut self, items: &'a [String]) -> Option<&'a String> {
        items.choose(&mut rand::rng())
    }
}
