use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::color::convert::Fish;
use crate::color::profile::PixelFormat;
use crate::foundation::core::{ColorSpace, LayerColorSpace};

const N: usize = ColorSpace::COUNT;

type FishTable = [[Fish; N]; N];

struct CacheState {
    // The tag and the table it describes live under one lock, so no reader can pair a
    // new tag with an old table.
    format: Option<PixelFormat>,
    table: FishTable,
}

/// Lazily built `[from][to]` table of converters for one pixel format.
///
/// Readers share a read lock. When the required format differs from the cached one the
/// whole table is rebuilt once under the write lock; concurrent callers that lose the race
/// find the rebuilt table on recheck and do not rebuild again.
pub struct ConversionCache {
    state: RwLock<CacheState>,
    rebuilds: AtomicU64,
}

impl ConversionCache {
    /// An empty cache; the first lookup builds the table.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                format: None,
                table: [[Fish::Unavailable; N]; N],
            }),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// The converter for `from -> to` under `format`. `Auto` on either side means no
    /// conversion is needed.
    pub fn get(&self, format: &PixelFormat, from: LayerColorSpace, to: LayerColorSpace) -> Fish {
        let (Some(from), Some(to)) = (from.concrete(), to.concrete()) else {
            return Fish::Identity;
        };

        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.format.as_ref() == Some(format) {
                return state.table[from.index()][to.index()];
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.format.as_ref() != Some(format) {
            state.table = build_table(format);
            state.format = Some(*format);
            self.rebuilds.fetch_add(1, Ordering::Relaxed);
        }
        // Read the cell before releasing the write lock; re-locking for read could observe
        // a table rebuilt for somebody else's format.
        state.table[from.index()][to.index()]
    }

    /// Format the current table was built for, if any.
    pub fn cached_format(&self) -> Option<PixelFormat> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .format
    }

    /// Drop the table; the next lookup rebuilds it.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.format = None;
    }

    /// How many times the table has been built.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }
}

impl Default for ConversionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConversionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionCache")
            .field("format", &self.cached_format())
            .field("rebuilds", &self.rebuild_count())
            .finish()
    }
}

fn build_table(format: &PixelFormat) -> FishTable {
    let mut table = [[Fish::Identity; N]; N];
    let mut missing = 0usize;
    for from in ColorSpace::ALL {
        for to in ColorSpace::ALL {
            let fish = Fish::between(from, to, format.profile);
            if !fish.is_available() {
                missing += 1;
                tracing::warn!(?from, ?to, "no converter available for this profile");
            }
            table[from.index()][to.index()] = fish;
        }
    }
    tracing::debug!(space = ?format.space, missing, "rebuilt conversion table");
    table
}

#[cfg(test)]
#[path = "../../tests/unit/color/cache.rs"]
mod tests;
