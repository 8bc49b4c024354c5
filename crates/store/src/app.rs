#![forbid(unsafe_code)]

use crate::notice::Notices;
use crate::slice::Slice;
use fm_core::model::{Branch, Building, Floor, Space};
use fm_core::{Entity, EntityKind};

/// Every client-side slice plus the notice queue. Built once and passed by reference.
#[derive(Debug, Default)]
pub struct AppStore {
    branches: Slice<Branch>,
    buildings: Slice<Building>,
    floors: Slice<Floor>,
    spaces: Slice<Space>,
    notices: Notices,
}

/// Entities that own a slice in [`AppStore`].
pub trait Stored: Entity {
    fn slice(store: &AppStore) -> &Slice<Self>;
    fn slice_mut(store: &mut AppStore) -> &mut Slice<Self>;
}

macro_rules! stored {
    ($entity:ty, $field:ident) => {
        impl Stored for $entity {
            fn slice(store: &AppStore) -> &Slice<Self> {
                &store.$field
            }

            fn slice_mut(store: &mut AppStore) -> &mut Slice<Self> {
                &mut store.$field
            }
        }
    };
}

stored!(Branch, branches);
stored!(Building, buildings);
stored!(Floor, floors);
stored!(Space, spaces);

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice<E: Stored>(&self) -> &Slice<E> {
        E::slice(self)
    }

    pub fn slice_mut<E: Stored>(&mut self) -> &mut Slice<E> {
        E::slice_mut(self)
    }

    pub fn branches(&self) -> &Slice<Branch> {
        &self.branches
    }

    pub fn buildings(&self) -> &Slice<Building> {
        &self.buildings
    }

    pub fn floors(&self) -> &Slice<Floor> {
        &self.floors
    }

    pub fn spaces(&self) -> &Slice<Space> {
        &self.spaces
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    /// Slice errors currently set, in kind order.
    pub fn errors(&self) -> Vec<(EntityKind, &str)> {
        let all = [
            (EntityKind::Branch, self.branches.error()),
            (EntityKind::Building, self.buildings.error()),
            (EntityKind::Floor, self.floors.error()),
            (EntityKind::Space, self.spaces.error()),
        ];
        all.into_iter()
            .filter_map(|(kind, error)| error.map(|message| (kind, message)))
            .collect()
    }
}
