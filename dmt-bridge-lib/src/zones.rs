use crate::error::BridgeError;

/// One panel slider mapped to one amplifier zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Variable-pointer address of the slider on the panel.
    pub vp_addr: u16,
    /// Opaque zone identifier used in amplifier request bodies.
    pub zone_id: u32,
    /// Ordinal of the zone in the amplifier's zone-controls URL space.
    pub ordinal: u32,
    /// Human-readable zone name, used only for logging.
    pub name: String,
}

/// Immutable mapping from panel variable addresses to amplifier zones.
///
/// The table is fixed at configuration time and small (well under ten
/// entries), so resolution is a linear scan.
#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    entries: Vec<ZoneEntry>,
}

impl ZoneTable {
    /// Build a table, rejecting duplicate variable addresses as a
    /// configuration error.
    pub fn new(entries: Vec<ZoneEntry>) -> Result<Self, BridgeError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.vp_addr == entry.vp_addr) {
                return Err(BridgeError::DuplicateZone(entry.vp_addr));
            }
        }
        Ok(Self { entries })
    }

    /// Find the zone registered for a variable address, if any.
    pub fn resolve(&self, vp_addr: u16) -> Option<&ZoneEntry> {
        self.entries.iter().find(|e| e.vp_addr == vp_addr)
    }

    pub fn entries(&self) -> &[ZoneEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
