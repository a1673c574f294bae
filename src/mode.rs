//! Beacon operating modes and the indicator levels derived from them.

/// Operating mode of the beacon. Exactly one lives in the coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeaconMode {
    /// Not advertising, not connected.
    Idle,
    /// Broadcasting beacon frames, not connectable.
    #[default]
    NonConnectableAdvertising,
    /// Accepting incoming connections.
    ConnectableAdvertising,
    /// An active link exists.
    Connected,
}

impl BeaconMode {
    /// Whether the protocol engine is broadcasting in this mode.
    pub fn is_advertising(self) -> bool {
        matches!(
            self,
            BeaconMode::NonConnectableAdvertising | BeaconMode::ConnectableAdvertising
        )
    }
}

/// Logical indicator outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// On while a link is up.
    Connected,
    /// On while connectable advertising is running.
    Advertising,
    /// On while the processor is awake; driven by the main loop.
    Awake,
}

/// Indicator flags mirrored from [`BeaconMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorState {
    pub connected_indicator: bool,
    pub advertising_indicator: bool,
}

impl IndicatorState {
    /// The only valid indicator levels for `mode`.
    pub const fn for_mode(mode: BeaconMode) -> Self {
        Self {
            connected_indicator: matches!(mode, BeaconMode::Connected),
            advertising_indicator: matches!(mode, BeaconMode::ConnectableAdvertising),
        }
    }

    /// Indicators whose level differs between `self` and `next`, paired
    /// with the level they must take.
    pub fn changes_to(self, next: Self) -> impl Iterator<Item = (Indicator, bool)> {
        let connected = (self.connected_indicator != next.connected_indicator)
            .then_some((Indicator::Connected, next.connected_indicator));
        let advertising = (self.advertising_indicator != next.advertising_indicator)
            .then_some((Indicator::Advertising, next.advertising_indicator));
        connected.into_iter().chain(advertising)
    }
}
