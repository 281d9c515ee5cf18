use marker_overlay_core::QuadCorner;
use serde::{Deserialize, Serialize};

/// Ids of the four markers on the reference card (TL, TR, BR, BL).
pub const REFERENCE_MARKER_IDS: [u32; 4] = [923, 1001, 241, 1007];

/// Physical layout of the four corner markers.
///
/// `ids[i]` is the marker sitting at corner role `QuadCorner::ALL[i]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerLayout {
    pub ids: [u32; 4],
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            ids: REFERENCE_MARKER_IDS,
        }
    }
}

impl MarkerLayout {
    pub fn new(ids: [u32; 4]) -> Self {
        Self { ids }
    }

    /// Expected marker id for a corner role.
    #[inline]
    pub fn id_for(&self, role: QuadCorner) -> u32 {
        self.ids[role.index()]
    }

    /// Corner role a marker id plays, if it belongs to the layout.
    pub fn role_of(&self, id: u32) -> Option<QuadCorner> {
        QuadCorner::ALL.into_iter().find(|&r| self.id_for(r) == id)
    }

    /// First id listed for more than one role, if any.
    ///
    /// A usable layout names four different markers.
    pub fn duplicate_id(&self) -> Option<u32> {
        self.ids
            .iter()
            .enumerate()
            .find(|&(i, id)| self.ids[i + 1..].contains(id))
            .map(|(_, &id)| id)
    }

    /// `(role, id)` pairs in TL, TR, BR, BL order.
    pub fn roles(&self) -> impl Iterator<Item = (QuadCorner, u32)> + '_ {
        QuadCorner::ALL.into_iter().map(|r| (r, self.id_for(r)))
    }
}
